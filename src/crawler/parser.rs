//! Content processing for fetched pages
//!
//! This module turns a fetched HTML body into:
//! - A token collection (via the configured [`TokenExtractor`])
//! - The in-prefix links to follow, already canonicalized

use crate::crawler::tokenizer::{TokenExtractor, Tokenizer, VocabArtifact};
use crate::url::{CanonicalUrl, Canonicalizer};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text is never vocabulary
const NON_CONTENT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ProcessedPage {
    /// Tokens for the vocabulary artifact
    pub vocabulary: VocabArtifact,

    /// In-prefix links in document order, without duplicates
    pub links: Vec<CanonicalUrl>,

    /// Links dropped because they were malformed, excluded or out of prefix
    pub rejected_links: usize,
}

/// Extracts tokens and same-site links from fetched pages
pub struct ContentProcessor {
    canonicalizer: Canonicalizer,
    extractor: Box<dyn TokenExtractor>,
}

impl ContentProcessor {
    pub fn new(canonicalizer: Canonicalizer, tokenizer: Tokenizer) -> Self {
        Self::with_extractor(canonicalizer, Box::new(tokenizer))
    }

    /// Uses a custom extractor in place of the built-in tokenizer
    pub fn with_extractor(canonicalizer: Canonicalizer, extractor: Box<dyn TokenExtractor>) -> Self {
        Self {
            canonicalizer,
            extractor,
        }
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Processes a fetched body
    ///
    /// # Arguments
    ///
    /// * `html` - The page body
    /// * `page_url` - The URL the body was served from; relative links resolve against it
    /// * `prefix` - The seed's canonical prefix; links outside it are discarded
    ///
    /// # Example
    ///
    /// ```
    /// use lexicrawl::crawler::{ContentProcessor, Tokenizer};
    /// use lexicrawl::url::{CanonicalUrl, Canonicalizer};
    /// use url::Url;
    ///
    /// let processor = ContentProcessor::new(Canonicalizer::default(), Tokenizer::default());
    /// let prefix: CanonicalUrl = "https://site.test/shop/".parse().unwrap();
    /// let page = Url::parse("https://site.test/shop").unwrap();
    /// let html = r#"<a href="/shop/item1">Item</a><a href="https://other.test/">Out</a>"#;
    ///
    /// let processed = processor.process(html, &page, &prefix);
    /// assert_eq!(processed.links.len(), 1);
    /// assert_eq!(processed.links[0].to_string(), "https://site.test/shop/item1");
    /// ```
    pub fn process(&self, html: &str, page_url: &Url, prefix: &CanonicalUrl) -> ProcessedPage {
        let document = Html::parse_document(html);

        let vocabulary = self.extractor.extract(&extract_text(&document));
        let (links, rejected_links) = self.extract_links(&document, page_url, prefix);

        ProcessedPage {
            vocabulary,
            links,
            rejected_links,
        }
    }

    fn extract_links(
        &self,
        document: &Html,
        page_url: &Url,
        prefix: &CanonicalUrl,
    ) -> (Vec<CanonicalUrl>, usize) {
        let mut links = Vec::new();
        let mut seen = HashSet::new();
        let mut rejected = 0;

        let Ok(a_selector) = Selector::parse("a[href]") else {
            return (links, rejected);
        };

        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if is_non_navigational(href) {
                continue;
            }

            let link = self
                .canonicalizer
                .resolve(page_url, href)
                .and_then(|url| url.check_within(prefix).map(|()| url));
            match link {
                Ok(url) => {
                    if seen.insert(url.clone()) {
                        links.push(url);
                    }
                }
                Err(e) => {
                    tracing::trace!("Discarding link '{}': {}", href, e);
                    rejected += 1;
                }
            }
        }

        (links, rejected)
    }
}

/// Links that never lead to another page
fn is_non_navigational(href: &str) -> bool {
    let href = href.trim();
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
}

/// Collects visible text, separating text nodes with spaces
fn extract_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| NON_CONTENT_ELEMENTS.contains(&el.value().name()));
        if hidden {
            continue;
        }

        text.push_str(fragment);
        text.push(' ');
    }

    text
}
