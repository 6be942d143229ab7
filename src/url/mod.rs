//! URL handling module for Lexicrawl
//!
//! This module provides the structured [`CanonicalUrl`] value, the
//! [`Canonicalizer`] that produces it, and the stable id derived from it.

mod canonical;
mod normalize;

pub use canonical::CanonicalUrl;
pub use normalize::Canonicalizer;

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest
pub const STABLE_ID_LEN: usize = 16;

/// Derives the stable identifier of a canonical URL
///
/// The id is the first 16 hex characters of the SHA-256 digest of the
/// canonical string form. It is a pure function of the URL, so it never
/// changes between invocations or runs.
///
/// # Examples
///
/// ```
/// use lexicrawl::url::{stable_id, CanonicalUrl};
///
/// let url: CanonicalUrl = "https://example.com/a".parse().unwrap();
/// assert_eq!(stable_id(&url), "2dce0a4c50441bfc");
/// ```
pub fn stable_id(url: &CanonicalUrl) -> String {
    stable_id_of(&url.to_string())
}

/// Truncated SHA-256 hex digest of an arbitrary key
///
/// [`stable_id`] is this applied to the canonical string. The ledger also
/// uses it to derive a fallback id when a URL's own id is already taken.
pub fn stable_id_of(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(STABLE_ID_LEN);
    id
}
