use crate::url::CanonicalUrl;
use crate::{UrlError, UrlResult};
use url::Url;

/// Turns raw or relative URLs into [`CanonicalUrl`] values
///
/// # Canonicalization Steps
///
/// 1. Parse the URL (or resolve it against the page it was found on);
///    the parser percent-encodes unsafe characters
/// 2. Require an `http`/`https` scheme and a non-empty host
/// 3. Drop credentials, query and fragment
/// 4. Normalize the path:
///    - Remove dot segments (. and ..) and empty segments
///    - Remove trailing slashes (the site root becomes the empty path)
/// 5. Reject the URL if its host or path contains an exclusion pattern
///    (case-insensitive)
///
/// # Examples
///
/// ```
/// use lexicrawl::url::Canonicalizer;
///
/// let canonicalizer = Canonicalizer::new(["login"]);
/// let url = canonicalizer.canonicalize("https://Example.com/docs/?page=2#top").unwrap();
/// assert_eq!(url.to_string(), "https://example.com/docs");
/// assert!(canonicalizer.canonicalize("https://example.com/login").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer {
    exclude_patterns: Vec<String>,
}

impl Canonicalizer {
    /// Creates a canonicalizer rejecting URLs that contain any of `patterns`
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            exclude_patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Canonicalizes an absolute URL string
    pub fn canonicalize(&self, raw: &str) -> UrlResult<CanonicalUrl> {
        let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
        self.finish(url)
    }

    /// Resolves `href` against the page it was discovered on, then canonicalizes
    pub fn resolve(&self, base: &Url, href: &str) -> UrlResult<CanonicalUrl> {
        let url = base
            .join(href.trim())
            .map_err(|e| UrlError::Parse(e.to_string()))?;
        self.finish(url)
    }

    fn finish(&self, mut url: Url) -> UrlResult<CanonicalUrl> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return Err(UrlError::MissingHost),
        }

        // Both only fail for cannot-be-a-base URLs, which http(s) never are
        let _ = url.set_username("");
        let _ = url.set_password(None);
        url.set_query(None);
        url.set_fragment(None);

        let path = normalize_path(url.path());
        url.set_path(if path.is_empty() { "/" } else { &path });

        let canonical = CanonicalUrl::from_normalized(url, path)?;
        self.check_exclusions(&canonical)?;
        Ok(canonical)
    }

    fn check_exclusions(&self, url: &CanonicalUrl) -> UrlResult<()> {
        let host = url.host().to_lowercase();
        let path = url.path().to_lowercase();

        match self
            .exclude_patterns
            .iter()
            .find(|pattern| host.contains(pattern.as_str()) || path.contains(pattern.as_str()))
        {
            Some(pattern) => Err(UrlError::Excluded(pattern.clone())),
            None => Ok(()),
        }
    }
}

/// Normalizes a URL path by removing dot segments, empty segments and
/// trailing slashes. The root path normalizes to the empty string.
fn normalize_path(path: &str) -> String {
    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            // Skip empty segments (from multiple slashes) and current directory markers
            "" | "." => continue,
            // Parent directory - pop the last segment if possible
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return String::new();
    }

    format!("/{}", normalized_segments.join("/"))
}
