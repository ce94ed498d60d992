//! Trust tiers and the source-domain classifier

/// Coarse reliability rank of a source domain
///
/// Ordered so that `Authoritative > Standard > Low`, which makes
/// "highest tier among an event's evidence" well defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrustTier {
    /// Social platforms, forums, unvetted aggregators
    Low,

    /// Everything not on either allow-list
    Standard,

    /// Vendor/official sites and primary outlets
    Authoritative,
}

impl TrustTier {
    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TrustTier::Authoritative => "authoritative",
            TrustTier::Standard => "standard",
            TrustTier::Low => "low",
        }
    }

    /// Parse a tier from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "authoritative" => Some(TrustTier::Authoritative),
            "standard" => Some(TrustTier::Standard),
            "low" => Some(TrustTier::Low),
            _ => None,
        }
    }
}

impl std::str::FromStr for TrustTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid trust tier: {}", s))
    }
}

/// Vendor and official sites whose subdomains inherit the tier
const AUTHORITATIVE_DOMAINS: &[&str] = &[
    "openai.com",
    "anthropic.com",
    "deepmind.google",
    "blog.google",
    "ai.meta.com",
    "microsoft.com",
    "nvidia.com",
    "mistral.ai",
    "cohere.com",
    "stability.ai",
    "huggingface.co",
    "arxiv.org",
    "x.ai",
];

/// Social platforms and forums where anyone can post
const LOW_TRUST_DOMAINS: &[&str] = &[
    "reddit.com",
    "news.ycombinator.com",
    "twitter.com",
    "x.com",
    "medium.com",
    "substack.com",
    "quora.com",
    "4chan.org",
    "lobste.rs",
];

/// Maps a source domain to a trust tier
///
/// Pure and deterministic. Classification happens exactly once, at
/// EvidenceSource creation; the tier is immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct TrustClassifier {
    extra_authoritative: Vec<String>,
    extra_low: Vec<String>,
}

impl TrustClassifier {
    /// Create a classifier with the built-in allow-lists only
    pub fn new() -> Self {
        Self::default()
    }

    /// Add deployment-specific authoritative domains
    pub fn with_authoritative(mut self, domains: Vec<String>) -> Self {
        self.extra_authoritative = domains;
        self
    }

    /// Add deployment-specific low-trust domains
    pub fn with_low_trust(mut self, domains: Vec<String>) -> Self {
        self.extra_low = domains;
        self
    }

    /// Classify a domain into a trust tier
    ///
    /// Matching is suffix-based so subdomains inherit the tier of their
    /// parent: `blog.openai.com` is authoritative because `openai.com` is.
    /// Anything on neither list is `Standard`.
    pub fn classify(&self, domain: &str) -> TrustTier {
        let domain = domain.to_lowercase();

        if AUTHORITATIVE_DOMAINS
            .iter()
            .copied()
            .chain(self.extra_authoritative.iter().map(String::as_str))
            .any(|d| domain_matches(&domain, d))
        {
            return TrustTier::Authoritative;
        }

        if LOW_TRUST_DOMAINS
            .iter()
            .copied()
            .chain(self.extra_low.iter().map(String::as_str))
            .any(|d| domain_matches(&domain, d))
        {
            return TrustTier::Low;
        }

        TrustTier::Standard
    }
}

/// Suffix match on label boundaries: `blog.openai.com` matches
/// `openai.com`, but `notopenai.com` does not.
fn domain_matches(domain: &str, suffix: &str) -> bool {
    domain == suffix || domain.ends_with(&format!(".{}", suffix))
}
