use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::pin::Pin;
use std::sync::Arc;

use converse_model::{
    CompletionError, CompletionProvider, CompletionRequest, ErrorKind, Message,
};
use tracing::Instrument;

type CompleteResult = Result<Message, Box<dyn CompletionError>>;
type BoxedCompleteFuture = Pin<Box<dyn Future<Output = CompleteResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(CompletionRequest) -> BoxedCompleteFuture + Send + Sync>;

/// A wrapper around a completion provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: CompletionProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.complete(&req);
            let message_count = req.messages.len();
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let reply_or_err = fut.await;
                    handle_reply::<P>(reply_or_err)
                }
                .instrument(trace_span!("model client req", message_count)),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the assistant reply.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the future abandons the
    /// request without touching any state.
    #[inline]
    pub async fn complete(&self, req: CompletionRequest) -> CompleteResult {
        (self.handler_fn)(req).await
    }
}

/// Returned when the backend answers with something other than an
/// assistant message.
#[derive(Debug)]
pub struct UnexpectedReplyError;

impl Display for UnexpectedReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "the backend did not reply with an assistant message".fmt(f)
    }
}

impl StdError for UnexpectedReplyError {}

impl CompletionError for UnexpectedReplyError {
    #[inline]
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

fn handle_reply<P: CompletionProvider + 'static>(
    reply_or_err: Result<Message, P::Error>,
) -> CompleteResult {
    let reply = match reply_or_err {
        Ok(reply) => reply,
        Err(err) => {
            error!("got an error: {err:?}");
            return Err(Box::new(err));
        }
    };

    match reply {
        Message::Assistant { .. } => {
            trace!("finished a request");
            Ok(reply)
        }
        Message::User { .. } => {
            error!("got a non-assistant reply: {reply:?}");
            Err(Box::new(UnexpectedReplyError))
        }
    }
}
