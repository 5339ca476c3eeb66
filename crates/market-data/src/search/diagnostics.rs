//! Per-provider diagnostics for a search.

use std::fmt;

use serde::Serialize;

use crate::models::{ProviderId, SearchResult};

/// How a single provider step ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AttemptStatus {
    /// The provider answered. `accepted` counts entries kept after dedup and
    /// truncation.
    Answered { returned: usize, accepted: usize },
    /// The provider was not usable (e.g. no API key configured).
    Skipped { reason: String },
    /// The provider returned an error.
    Failed { reason: String },
    /// The provider did not answer within the per-provider timeout.
    TimedOut,
    /// The provider panicked; results gathered so far were kept.
    Panicked,
}

/// Record of one provider step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    #[serde(flatten)]
    pub status: AttemptStatus,
}

impl ProviderAttempt {
    pub fn new(provider: impl Into<ProviderId>, status: AttemptStatus) -> Self {
        Self {
            provider: provider.into(),
            status,
        }
    }

    /// Number of results this provider contributed.
    pub fn accepted(&self) -> usize {
        match self.status {
            AttemptStatus::Answered { accepted, .. } => accepted,
            _ => 0,
        }
    }
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            AttemptStatus::Answered { returned, accepted } => {
                write!(f, "{}: {}/{} accepted", self.provider, accepted, returned)
            }
            AttemptStatus::Skipped { reason } => write!(f, "{}: skipped ({})", self.provider, reason),
            AttemptStatus::Failed { reason } => write!(f, "{}: failed ({})", self.provider, reason),
            AttemptStatus::TimedOut => write!(f, "{}: timed out", self.provider),
            AttemptStatus::Panicked => write!(f, "{}: panicked", self.provider),
        }
    }
}

/// Results of a search plus the trail of providers consulted.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    /// The trimmed query.
    pub query: String,
    pub results: Vec<SearchResult>,
    /// One entry per provider called, in call order.
    pub attempts: Vec<ProviderAttempt>,
}

impl SearchOutcome {
    pub(crate) fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
            attempts: Vec::new(),
        }
    }

    /// Whether the given provider was called.
    pub fn consulted(&self, provider: &str) -> bool {
        self.attempts.iter().any(|a| a.provider == provider)
    }
}
