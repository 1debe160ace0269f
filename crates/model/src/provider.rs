use std::error::Error;

use crate::error::ErrorKind;
use crate::message::{CompletionRequest, Message};

/// The error type for a completion provider.
pub trait CompletionError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a completion backend, which answers a
/// conversation history with the next assistant message.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the provider should be prepared for being dropped anytime.
pub trait CompletionProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: CompletionError;

    /// Sends the request to the backend and resolves to the reply.
    ///
    /// Each call performs exactly one round trip; retrying is up to the
    /// caller. The returned future must not borrow `self`, and dropping
    /// it should abandon the request.
    fn complete(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>> + Send + 'static;
}
