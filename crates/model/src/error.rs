use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend denied the request because the caller has exhausted
    /// its usage allowance (or is otherwise not authorized to continue).
    QuotaExceeded,
    /// Any other errors, including transport and decoding failures.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::QuotaExceeded => write!(f, "Quota exceeded"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
