//! A local fake completion backend for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use converse_model::{
    CompletionError, CompletionProvider, CompletionRequest, ErrorKind, Message,
};
use tokio::time::sleep;

pub use preset::*;

/// How many completions the hosted service grants a free account.
pub const FREE_TIER_REQUESTS: u64 = 5;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl CompletionError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Shared {
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
    // Attempts seen by each turn, used to honor `PresetResponse::failures`.
    attempts: Mutex<Vec<u64>>,
    granted: Mutex<u64>,
}

/// A local fake completion backend for testing purpose.
///
/// Before sending requests, you need to setup the conversation script, which
/// is how the backend should answer each turn. The turn is selected by the
/// number of user messages in the request, so the first request answers with
/// the first preset, the follow-up with the second one, and so on. If there
/// are no enough presets in the script, an error will be returned.
///
/// Clones share the call log, so a test can keep one clone around to inspect
/// what the code under test has sent.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestCompletionProvider {
    script: Vec<PresetResponse>,
    delay: Option<Duration>,
    quota: Option<u64>,
    shared: Arc<Shared>,
}

impl TestCompletionProvider {
    #[inline]
    pub fn add_response(&mut self, preset: PresetResponse) {
        self.script.push(preset);
    }

    #[inline]
    pub fn add_reply<S: Into<String>>(&mut self, content: S) {
        self.add_response(PresetResponse::with_reply(content));
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Denies every request once `requests` completions have been granted,
    /// the way the hosted service treats a free account.
    #[inline]
    pub fn set_quota(&mut self, requests: u64) {
        self.quota = Some(requests);
    }

    /// Returns how many requests have been received.
    #[inline]
    pub fn call_count(&self) -> usize {
        self.shared.calls.load(Ordering::SeqCst)
    }

    /// Returns all requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.shared
            .requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn answer(&self, req: &CompletionRequest) -> Result<Message, Error> {
        let turn = req.messages.len() / 2;
        if !matches!(req.messages.last(), Some(Message::User { .. })) {
            return Err(Error {
                message: "request does not end with a user message",
                kind: ErrorKind::Other,
            });
        }
        let Some(preset) = self.script.get(turn) else {
            return Err(Error {
                message: "no enough steps",
                kind: ErrorKind::Other,
            });
        };

        let attempt = {
            let mut attempts = self.shared.attempts.lock().map_err(|_| Error {
                message: "poisoned",
                kind: ErrorKind::Other,
            })?;
            if attempts.len() <= turn {
                attempts.resize(turn + 1, 0);
            }
            attempts[turn] += 1;
            attempts[turn]
        };
        if attempt <= preset.failures.unwrap_or(0) {
            return Err(Error {
                message: "preset failure",
                kind: ErrorKind::Other,
            });
        }

        let content = match &preset.outcome {
            PresetOutcome::Reply(content) => content.clone(),
            PresetOutcome::QuotaExceeded => {
                return Err(Error {
                    message: "preset quota denial",
                    kind: ErrorKind::QuotaExceeded,
                });
            }
            PresetOutcome::ServerError => {
                return Err(Error {
                    message: "preset server error",
                    kind: ErrorKind::Other,
                });
            }
        };

        if let Some(quota) = self.quota {
            let mut granted = self.shared.granted.lock().map_err(|_| Error {
                message: "poisoned",
                kind: ErrorKind::Other,
            })?;
            if *granted >= quota {
                return Err(Error {
                    message: "free tier exhausted",
                    kind: ErrorKind::QuotaExceeded,
                });
            }
            *granted += 1;
        }

        Ok(Message::assistant(content))
    }
}

impl CompletionProvider for TestCompletionProvider {
    type Error = crate::Error;

    fn complete(
        &self,
        req: &CompletionRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>> + Send + 'static
    {
        self.shared.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.shared.requests.lock() {
            requests.push(req.clone());
        }

        let result = self.answer(req);
        let delay = self.delay.unwrap_or(Duration::from_millis(1));
        async move {
            sleep(delay).await;
            result
        }
    }
}
