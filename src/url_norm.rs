//! URL normalization and fingerprinting.
//!
//! Equivalent product URLs (tracking params, `www.`, case, fragments, query
//! order) must hash to the same cache key, otherwise every share link gets
//! its own analysis.

use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

/// Query parameters stripped before fingerprinting. Matched
/// case-insensitively on the key.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "ref",
    "referrer",
    "source",
    "campaign",
    "gclid",
    "fbclid",
    "_encoding",
    "psc",
    "qid",
    "sr",
    "keywords",
    "ie",
];

/// Canonicalize a product URL.
///
/// Lowercases scheme and host, strips `www.`, trailing path slash, tracking
/// parameters, fragment, and userinfo, and sorts the surviving query
/// parameters. Returns the input unchanged when it does not parse; the
/// pipeline never fails on a weird-but-fetchable URL.
pub fn normalize_url(raw: &str) -> String {
    match try_normalize(raw) {
        Some(normalized) => {
            if normalized != raw {
                debug!(original = raw, normalized = %normalized, "normalized URL");
            }
            normalized
        }
        None => raw.to_string(),
    }
}

/// 64-hex SHA-256 over the canonical UTF-8 bytes.
pub fn fingerprint(raw: &str) -> String {
    let normalized = normalize_url(raw);
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(digest)
}

/// Parse check used by the gateway before accepting a request: http(s)
/// scheme and a non-empty host.
pub fn is_valid_product_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().map(|h| !h.is_empty()).unwrap_or(false)
        }
        Err(_) => false,
    }
}

fn try_normalize(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;

    let scheme = url.scheme().to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return None;
    }

    let mut host = url.host_str()?.to_ascii_lowercase();
    if let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }

    let path = url.path().trim_end_matches('/');

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| {
            let key = k.to_ascii_lowercase();
            !TRACKING_PARAMS.contains(&key.as_str())
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    let mut normalized = format!("{scheme}://{host}");
    if let Some(port) = url.port() {
        normalized.push_str(&format!(":{port}"));
    }
    normalized.push_str(path);
    if !params.is_empty() {
        let query: Vec<String> = params
            .into_iter()
            .map(|(k, v)| if v.is_empty() { k } else { format!("{k}={v}") })
            .collect();
        normalized.push('?');
        normalized.push_str(&query.join("&"));
    }

    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tracking_params_and_www() {
        let a = fingerprint("https://www.Amazon.in/dp/X?utm_source=a&ref=b");
        let b = fingerprint("https://amazon.in/dp/X");
        assert_eq!(a, b);
    }

    #[test]
    fn stable_under_param_order_and_fragment() {
        let a = fingerprint("https://flipkart.com/item?b=2&a=1#reviews");
        let b = fingerprint("https://flipkart.com/item?a=1&b=2");
        assert_eq!(a, b);
    }

    #[test]
    fn trailing_slash_is_cosmetic() {
        assert_eq!(
            fingerprint("https://amazon.in/dp/X/"),
            fingerprint("https://amazon.in/dp/X")
        );
    }

    #[test]
    fn essential_params_survive_and_distinguish() {
        assert_ne!(
            fingerprint("https://amazon.in/dp?pid=1"),
            fingerprint("https://amazon.in/dp?pid=2")
        );
        assert_eq!(
            normalize_url("https://amazon.in/dp?pid=1&qid=123"),
            "https://amazon.in/dp?pid=1"
        );
    }

    #[test]
    fn unparseable_input_passes_through() {
        assert_eq!(normalize_url("not a url"), "not a url");
        // Still hashable, so the pipeline can proceed and fail later at the
        // request-validation layer.
        assert_eq!(fingerprint("not a url").len(), 64);
    }

    #[test]
    fn non_http_scheme_passes_through() {
        assert_eq!(
            normalize_url("ftp://amazon.in/dp/X"),
            "ftp://amazon.in/dp/X"
        );
        assert!(!is_valid_product_url("ftp://amazon.in/dp/X"));
        assert!(is_valid_product_url("https://amazon.in/dp/X"));
    }

    #[test]
    fn explicit_port_is_preserved() {
        assert_eq!(
            normalize_url("https://amazon.in:8443/dp/X/"),
            "https://amazon.in:8443/dp/X"
        );
    }

    #[test]
    fn fingerprint_is_64_hex() {
        let fp = fingerprint("https://amazon.in/dp/X");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
