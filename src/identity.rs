//! Article Identity
//!
//! Stable article identifiers for providers that do not ship one:
//! - Canonical URL normalization (fragments and tracking params dropped)
//! - SHA-256 over the canonical URL, or over title + date when no URL exists

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use url::Url;

/// Length of the hex digest prefix used in article ids
const ID_HASH_LEN: usize = 16;

/// Computes SHA-256 hash of content
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Normalizes URL to canonical form
/// - Removes fragments (#...)
/// - Removes tracking parameters (utm_*, fbclid, etc.)
/// - Lowercase scheme and host
/// - Sorts query parameters
pub fn canonicalize_url(url_str: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(url_str)?;

    url.set_fragment(None);

    let tracking_params: HashSet<&str> = [
        "utm_source", "utm_medium", "utm_campaign", "utm_term", "utm_content",
        "fbclid", "gclid", "msclkid", "mc_cid", "mc_eid", "_ga", "_gl",
        "CMP", "at_medium", "at_campaign",
    ]
    .into_iter()
    .collect();

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !tracking_params.contains(key.as_ref()))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    url.set_query(None);
    if !params.is_empty() {
        params.sort_by(|a, b| a.0.cmp(&b.0));
        url.query_pairs_mut().extend_pairs(params);
    }

    // Url already lowercases scheme and host; paths stay case-sensitive.
    Ok(url.to_string())
}

/// Derives an article id from its URL, falling back to title + timestamp
/// for records whose URL is missing or unparseable.
pub fn article_id(provider_prefix: &str, url: Option<&str>, title: &str, published_at: &str) -> String {
    let basis = match url.map(canonicalize_url) {
        Some(Ok(canonical)) => canonical,
        Some(Err(_)) | None => format!("{}|{}", title.trim().to_lowercase(), published_at),
    };
    let hash = compute_hash(&basis);
    format!("{}-{}", provider_prefix, &hash[..ID_HASH_LEN])
}
