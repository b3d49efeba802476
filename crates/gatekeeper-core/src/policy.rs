//! Rate limit policies - named, immutable configurations resolved at startup.

use std::fmt;

/// Sealed set of policy identifiers.
///
/// Unknown names fall back to [`PolicyName::Default`] so a typo in wiring
/// never leaves an endpoint unprotected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyName {
    Default,
    Burst,
    Login,
    Register,
    PasswordReset,
    PortfolioRead,
    PortfolioWrite,
    Export,
    PdfGenerate,
    Contact,
    Message,
    GithubImport,
    /// Backs the catch-all middleware, independent of per-endpoint policies.
    Global,
}

impl PolicyName {
    /// Parse a policy name. Returns `None` for unknown names; use
    /// [`RateLimitPolicy::resolve`] for the defaulting variant.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "default" => Some(Self::Default),
            "burst" => Some(Self::Burst),
            "login" => Some(Self::Login),
            "register" => Some(Self::Register),
            "password_reset" => Some(Self::PasswordReset),
            "portfolio_read" => Some(Self::PortfolioRead),
            "portfolio_write" => Some(Self::PortfolioWrite),
            "export" => Some(Self::Export),
            "pdf_generate" => Some(Self::PdfGenerate),
            "contact" => Some(Self::Contact),
            "message" => Some(Self::Message),
            "github_import" => Some(Self::GithubImport),
            "global" => Some(Self::Global),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Burst => "burst",
            Self::Login => "login",
            Self::Register => "register",
            Self::PasswordReset => "password_reset",
            Self::PortfolioRead => "portfolio_read",
            Self::PortfolioWrite => "portfolio_write",
            Self::Export => "export",
            Self::PdfGenerate => "pdf_generate",
            Self::Contact => "contact",
            Self::Message => "message",
            Self::GithubImport => "github_import",
            Self::Global => "global",
        }
    }

    /// All per-endpoint policy names (excludes `Global`).
    pub fn all() -> &'static [PolicyName] {
        &[
            Self::Default,
            Self::Burst,
            Self::Login,
            Self::Register,
            Self::PasswordReset,
            Self::PortfolioRead,
            Self::PortfolioWrite,
            Self::Export,
            Self::PdfGenerate,
            Self::Contact,
            Self::Message,
            Self::GithubImport,
        ]
    }
}

impl fmt::Display for PolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default burst allowance for token-bucket policies.
const DEFAULT_BURST: u32 = 10;

/// An immutable named rate limit configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitPolicy {
    pub name: PolicyName,
    /// Requests allowed per interval.
    pub rate: u32,
    /// Counting window in seconds.
    pub interval_secs: u64,
    /// Extra capacity above `rate`; consumed only by the token bucket.
    pub burst: u32,
    /// When set, a denied identifier is blocked outright for this long.
    pub block_duration_secs: Option<u64>,
}

impl RateLimitPolicy {
    fn new(name: PolicyName, rate: u32, interval_secs: u64) -> Self {
        Self {
            name,
            rate,
            interval_secs,
            burst: DEFAULT_BURST,
            block_duration_secs: None,
        }
    }

    /// Look up the static policy table.
    pub fn named(name: PolicyName) -> Self {
        match name {
            PolicyName::Default => Self::new(name, 1000, 3600),
            PolicyName::Burst => Self::new(name, 100, 60),
            PolicyName::Login => Self::new(name, 5, 300),
            PolicyName::Register => Self::new(name, 3, 3600),
            PolicyName::PasswordReset => Self::new(name, 3, 3600),
            PolicyName::PortfolioRead => Self::new(name, 500, 3600),
            PolicyName::PortfolioWrite => Self::new(name, 100, 3600),
            PolicyName::Export => Self::new(name, 10, 3600),
            PolicyName::PdfGenerate => Self::new(name, 20, 3600),
            PolicyName::Contact => Self::new(name, 10, 3600),
            PolicyName::Message => Self::new(name, 50, 3600),
            PolicyName::GithubImport => Self::new(name, 10, 3600),
            PolicyName::Global => Self::global(),
        }
    }

    /// Resolve a policy by name, falling back to `default` when unknown.
    pub fn resolve(name: &str) -> Self {
        match PolicyName::parse(name) {
            Some(n) => Self::named(n),
            None => Self::named(PolicyName::Default),
        }
    }

    /// The policy applied by the catch-all middleware.
    pub fn global() -> Self {
        Self {
            name: PolicyName::Global,
            rate: 1000,
            interval_secs: 3600,
            burst: 100,
            block_duration_secs: None,
        }
    }

    pub fn with_block_duration(mut self, secs: u64) -> Self {
        self.block_duration_secs = Some(secs);
        self
    }
}

/// Which limiter algorithm a wrapper should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmKind {
    TokenBucket,
    SlidingWindow,
    FixedWindow,
}

impl AlgorithmKind {
    /// Key namespace for this algorithm. Prefixing keeps counter state of
    /// different algorithms from colliding under the same policy.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::TokenBucket => "token_bucket",
            Self::SlidingWindow => "sliding_window",
            Self::FixedWindow => "fixed_window",
        }
    }

    /// Parse an algorithm name, defaulting to the token bucket.
    pub fn resolve(s: &str) -> Self {
        match s {
            "sliding_window" => Self::SlidingWindow,
            "fixed_window" => Self::FixedWindow,
            _ => Self::TokenBucket,
        }
    }
}

/// Identifier strategy for a wrapped endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Key by client IP.
    Ip,
    /// Key by authenticated principal, falling back to IP when anonymous.
    User,
    /// Key by principal and IP combined, for stricter dual-keyed limits.
    IpUser,
}
