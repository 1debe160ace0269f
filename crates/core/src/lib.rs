//! Core logic of a conversation page: the session controller, its history,
//! and how the exchange is turned into display markup.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod collaborator;
pub mod conversation;
mod error;
pub mod format;
mod model_client;
pub mod render;
mod session;

pub use error::{SubmissionError, TimeoutError};
pub use session::{
    DEFAULT_REQUEST_TIMEOUT, EMPTY_PROMPT_MESSAGE, GENERIC_FAILURE_MESSAGE,
    Session, SessionBuilder, SessionSnapshot, SubmissionState,
};
