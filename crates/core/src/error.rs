use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::time::Duration;

use converse_model::{CompletionError, ErrorKind};

/// Why a submission did not produce a new turn.
///
/// None of these are fatal: the session stays usable and its history is
/// exactly what it was before the submission.
#[derive(Debug)]
pub enum SubmissionError {
    /// The prompt was empty. Nothing was sent.
    EmptyPrompt,
    /// Another submission is still in flight. Nothing was sent.
    Busy,
    /// The backend denied the request because the usage allowance is
    /// exhausted.
    QuotaExceeded(Box<dyn CompletionError>),
    /// Any other failure, including timeouts.
    Transport(Box<dyn CompletionError>),
}

impl SubmissionError {
    pub(crate) fn from_completion_error(err: Box<dyn CompletionError>) -> Self {
        match err.kind() {
            ErrorKind::QuotaExceeded => SubmissionError::QuotaExceeded(err),
            ErrorKind::Other => SubmissionError::Transport(err),
        }
    }

    /// Returns `true` if the error was raised locally, before anything was
    /// sent to the backend.
    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(self, SubmissionError::EmptyPrompt | SubmissionError::Busy)
    }
}

impl Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::EmptyPrompt => write!(f, "Prompt cannot be empty"),
            SubmissionError::Busy => {
                write!(f, "A submission is already in progress")
            }
            SubmissionError::QuotaExceeded(err) => {
                write!(f, "Quota exceeded: {err}")
            }
            SubmissionError::Transport(err) => {
                write!(f, "Request failed: {err}")
            }
        }
    }
}

impl StdError for SubmissionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SubmissionError::EmptyPrompt | SubmissionError::Busy => None,
            SubmissionError::QuotaExceeded(err)
            | SubmissionError::Transport(err) => {
                Some(&**err as &(dyn StdError + 'static))
            }
        }
    }
}

/// The backend did not answer within the request timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutError(
    /// The timeout that expired.
    pub Duration,
);

impl Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no reply within {:?}", self.0)
    }
}

impl StdError for TimeoutError {}

impl CompletionError for TimeoutError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}
