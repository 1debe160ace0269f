use serde::{Deserialize, Serialize};

/// How the fake backend answers one turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetOutcome {
    /// Reply with an assistant message carrying this text.
    #[serde(rename = "reply")]
    Reply(String),
    /// Deny the request as if the usage allowance was exhausted.
    #[serde(rename = "quota_exceeded")]
    QuotaExceeded,
    /// Fail the request as a generic server error.
    #[serde(rename = "server_error")]
    ServerError,
}

/// The preset response for an assistant turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// The outcome of this turn.
    pub outcome: PresetOutcome,
    /// If set, the request will fail with a server error in the first
    /// `failures` attempts before producing `outcome`.
    pub failures: Option<u64>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` replying with the given text.
    #[inline]
    pub fn with_reply<S: Into<String>>(content: S) -> Self {
        Self {
            outcome: PresetOutcome::Reply(content.into()),
            failures: None,
        }
    }

    /// Creates a `PresetResponse` with the specified outcome.
    #[inline]
    pub fn with_outcome(outcome: PresetOutcome) -> Self {
        Self {
            outcome,
            failures: None,
        }
    }

    /// Sets failure times before the preset outcome is produced.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }
}
