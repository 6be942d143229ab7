//! Vocabulary extraction from page text

use serde::Deserialize;
use std::collections::BTreeSet;
use unicode_segmentation::UnicodeSegmentation;

/// How the token collection of a page is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorMode {
    /// Sorted, deduplicated, lowercased tokens; rendered one per line
    #[default]
    VocabularySet,
    /// Tokens in document order, case and duplicates kept; rendered space separated
    TokenStream,
}

/// The token collection written for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabArtifact {
    pub mode: ExtractorMode,
    pub tokens: Vec<String>,
}

impl VocabArtifact {
    /// Serialized artifact content
    pub fn render(&self) -> String {
        match self.mode {
            ExtractorMode::VocabularySet => self.tokens.join("\n"),
            ExtractorMode::TokenStream => self.tokens.join(" "),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Pluggable token extraction
pub trait TokenExtractor: Send + Sync {
    fn extract(&self, text: &str) -> VocabArtifact;
}

/// Unicode word tokenizer
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    mode: ExtractorMode,
    alphabetic_only: bool,
}

impl Tokenizer {
    pub fn new(mode: ExtractorMode, alphabetic_only: bool) -> Self {
        Self {
            mode,
            alphabetic_only,
        }
    }

    fn keep(&self, word: &str) -> bool {
        !self.alphabetic_only || word.chars().all(char::is_alphabetic)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(ExtractorMode::default(), true)
    }
}

impl TokenExtractor for Tokenizer {
    fn extract(&self, text: &str) -> VocabArtifact {
        let words = text.unicode_words().filter(|w| self.keep(w));

        let tokens = match self.mode {
            ExtractorMode::VocabularySet => words
                .map(str::to_lowercase)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            ExtractorMode::TokenStream => words.map(str::to_string).collect(),
        };

        VocabArtifact {
            mode: self.mode,
            tokens,
        }
    }
}
