use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use url::Url;

use crate::url::Canonicalizer;
use crate::{UrlError, UrlResult};

/// A URL reduced to `{scheme, host, port, path}`
///
/// No query, no fragment, no trailing slash. Equality, hashing and ordering
/// look only at the structured parts, so two spellings of the same page
/// (`/a/`, `/a?x=1`, `/a#top`) compare equal.
///
/// The port is kept only when it differs from the scheme default.
#[derive(Debug, Clone)]
pub struct CanonicalUrl {
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
    url: Url,
}

impl CanonicalUrl {
    /// Builds the canonical value from a URL whose query and fragment are
    /// already stripped and whose path is already normalized.
    pub(crate) fn from_normalized(url: Url, path: String) -> UrlResult<Self> {
        let host = url.host_str().ok_or(UrlError::MissingHost)?.to_string();
        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port(),
            path,
            url,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Normalized path, empty for the site root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The fetchable form of this URL
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// `scheme://host[:port]`, the key politeness state is kept under
    pub fn origin(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.host, port),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }

    /// Location of this host's robots.txt
    pub fn robots_url(&self) -> String {
        format!("{}/robots.txt", self.origin())
    }

    /// Returns true if this URL lies inside `prefix`
    ///
    /// Scheme, host and port must match exactly; the path must equal the
    /// prefix path or continue it at a segment boundary, so `/shop` contains
    /// `/shop/item1` but not `/shopping`.
    pub fn is_within(&self, prefix: &CanonicalUrl) -> bool {
        if self.scheme != prefix.scheme || self.host != prefix.host || self.port != prefix.port {
            return false;
        }

        if prefix.path.is_empty() || self.path == prefix.path {
            return true;
        }

        self.path
            .strip_prefix(prefix.path.as_str())
            .map_or(false, |rest| rest.starts_with('/'))
    }

    /// Like [`is_within`](Self::is_within), but names the prefix on failure
    pub fn check_within(&self, prefix: &CanonicalUrl) -> UrlResult<()> {
        if self.is_within(prefix) {
            Ok(())
        } else {
            Err(UrlError::OutOfPrefix(prefix.to_string()))
        }
    }

    fn key(&self) -> (&str, &str, Option<u16>, &str) {
        (&self.scheme, &self.host, self.port, &self.path)
    }
}

impl PartialEq for CanonicalUrl {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for CanonicalUrl {}

impl Hash for CanonicalUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for CanonicalUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin(), self.path)
    }
}

/// Parses an already-canonical line (e.g. from the visited ledger)
///
/// Exclusion patterns are not applied here: whatever was recorded stays
/// recorded.
impl FromStr for CanonicalUrl {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Canonicalizer::default().canonicalize(s)
    }
}
