//! URL canonicalization for source identity
//!
//! Two raw URLs that canonicalize identically must map to the same
//! EvidenceSource row. The storage layer enforces that with a uniqueness
//! constraint on the canonical URL; this module guarantees the mapping
//! is deterministic.

use thiserror::Error;
use url::Url;

/// Errors that can occur during canonicalization
#[derive(Error, Debug)]
pub enum CanonicalizeError {
    /// URL failed to parse at all
    #[error("Invalid URL '{0}': {1}")]
    Parse(String, url::ParseError),

    /// URL parsed but has no host component
    #[error("URL has no host: {0}")]
    NoHost(String),

    /// URL scheme cannot be rewritten to https
    #[error("Unsupported scheme '{1}' in URL: {0}")]
    UnsupportedScheme(String, String),
}

/// Query parameters stripped during canonicalization (tracking noise)
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "dclid", "msclkid", "igshid", "mc_cid", "mc_eid", "ref", "ref_src",
    "source", "cmpid",
];

/// A canonicalized source URL plus its extracted domain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl {
    url: String,
    domain: String,
}

impl CanonicalUrl {
    /// The canonical URL string (source identity key)
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The lower-cased host with any leading `www.` removed
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl std::fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Canonicalize a raw URL for use as a source identity
///
/// - scheme normalized to `https`; schemes that cannot be rewritten
///   (non-special ones like `gopher`) are rejected
/// - tracking query parameters stripped (all `utm_*` plus click-ids)
/// - trailing slash stripped except for the root path
/// - host lower-cased; `www.` stripped for domain extraction
pub fn canonicalize(raw: &str) -> Result<CanonicalUrl, CanonicalizeError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| CanonicalizeError::Parse(raw.to_string(), e))?;

    let host = url
        .host_str()
        .ok_or_else(|| CanonicalizeError::NoHost(raw.to_string()))?
        .to_lowercase();

    // Url lower-cases registered hosts on parse, but set explicitly so the
    // contract does not depend on that behavior.
    url.set_host(Some(&host))
        .map_err(|e| CanonicalizeError::Parse(raw.to_string(), e))?;

    // http -> https is allowed; non-special schemes (gopher, data, ...)
    // cannot be rewritten and are rejected outright
    if url.scheme() != "https" && url.set_scheme("https").is_err() {
        return Err(CanonicalizeError::UnsupportedScheme(
            raw.to_string(),
            url.scheme().to_string(),
        ));
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        // Re-encode through the serializer so structural characters that
        // were percent-encoded inside values stay encoded; joining the
        // decoded pairs by hand would conflate `?q=a%26b` with `?q=a&b=`.
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&kept)
            .finish();
        url.set_query(Some(&query));
    }

    url.set_fragment(None);

    let mut canonical = url.to_string();
    // Strip the trailing slash except for the bare root path
    if canonical.ends_with('/') && url.path() != "/" {
        canonical.pop();
    }

    let domain = host.strip_prefix("www.").unwrap_or(&host).to_string();

    Ok(CanonicalUrl { url: canonical, domain })
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}
