mod builder;
mod state;
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use converse_model::{CompletionError, CompletionRequest, Message};
use tokio::sync::watch;
use tokio::time::timeout;

pub use builder::SessionBuilder;
pub use state::{SessionSnapshot, SubmissionState};

use crate::collaborator::{Notifier, UpgradePrompt};
use crate::error::{SubmissionError, TimeoutError};
use crate::model_client::ModelClient;

/// Feedback shown next to the prompt input when it is submitted empty.
pub const EMPTY_PROMPT_MESSAGE: &str = "Prompt cannot be empty";

/// What the user is told when a submission fails for any reason other than
/// an exhausted quota.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong.";

/// How long a submission waits for the backend unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A conversation session: the history of one conversation plus the prompt
/// input that extends it.
///
/// At most one submission is in flight at a time. Every change is published
/// as a whole [`SessionSnapshot`], both to the `on_change` callback and to
/// [`Session::subscribe`] receivers.
///
/// Cloning a `Session` yields another handle to the same conversation.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    model_client: ModelClient,
    upgrade_prompt: Arc<dyn UpgradePrompt>,
    notifier: Arc<dyn Notifier>,
    request_timeout: Duration,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    on_change: Option<Box<dyn Fn(&SessionSnapshot) + Send + Sync>>,
}

impl Inner {
    /// Applies `f` as one atomic transition and notifies observers if it
    /// reports a change.
    fn transition(&self, f: impl FnOnce(&mut SessionSnapshot) -> bool) -> bool {
        let mut published = None;
        let changed = self.snapshot_tx.send_if_modified(|snapshot| {
            let changed = f(snapshot);
            // Captured under the lock so each callback sees its own state.
            if changed && self.on_change.is_some() {
                published = Some(snapshot.clone());
            }
            changed
        });
        if let (Some(on_change), Some(snapshot)) = (&self.on_change, published) {
            on_change(&snapshot);
        }
        changed
    }
}

impl Session {
    fn from_builder(builder: SessionBuilder) -> Self {
        let SessionBuilder {
            model_client,
            upgrade_prompt,
            notifier,
            request_timeout,
            on_change,
        } = builder;

        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                model_client,
                upgrade_prompt,
                notifier,
                request_timeout,
                snapshot_tx,
                on_change,
            }),
        }
    }

    /// Returns a copy of the current state.
    #[inline]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Returns a receiver that observes every state change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Replaces the contents of the prompt input.
    ///
    /// Returns `false` without doing anything while a submission is in
    /// flight, since the input is disabled then.
    pub fn set_draft<S: Into<String>>(&self, draft: S) -> bool {
        let draft = draft.into();
        let mut accepted = false;
        self.inner.transition(|snapshot| {
            if snapshot.is_submitting() {
                return false;
            }
            accepted = true;
            let changed =
                snapshot.draft != draft || snapshot.prompt_error.is_some();
            snapshot.draft = draft;
            snapshot.prompt_error = None;
            changed
        });
        accepted
    }

    /// Forgets the conversation, e.g. when the user leaves the page.
    ///
    /// Returns `false` without doing anything while a submission is in
    /// flight.
    pub fn reset(&self) -> bool {
        let mut accepted = false;
        self.inner.transition(|snapshot| {
            if snapshot.is_submitting() {
                return false;
            }
            accepted = true;
            let changed = *snapshot != SessionSnapshot::default();
            *snapshot = SessionSnapshot::default();
            changed
        });
        if accepted {
            debug!("session reset");
        }
        accepted
    }

    /// Submits the current contents of the prompt input.
    ///
    /// See [`Session::submit`].
    pub async fn submit_draft(&self) -> Result<(), SubmissionError> {
        let draft = self.inner.snapshot_tx.borrow().draft.clone();
        self.submit(draft).await
    }

    /// Sends `prompt` with the conversation so far and records the reply.
    ///
    /// On success the prompt and the reply are appended together and the
    /// prompt input is cleared. On failure the conversation is left as it
    /// was: a quota denial opens the upgrade prompt, anything else is
    /// reported through the notifier. Either way the session is idle again
    /// when this returns.
    ///
    /// # Cancel safety
    ///
    /// Dropping the returned future abandons the request; the session
    /// goes back to idle with its history untouched.
    pub async fn submit<S: Into<String>>(
        &self,
        prompt: S,
    ) -> Result<(), SubmissionError> {
        let prompt = prompt.into();
        let user_msg = Message::user(prompt.as_str());

        let mut started = Err(SubmissionError::Busy);
        self.inner.transition(|snapshot| {
            if snapshot.is_submitting() {
                return false;
            }
            if prompt.is_empty() {
                started = Err(SubmissionError::EmptyPrompt);
                let changed = snapshot.prompt_error.is_none();
                snapshot.prompt_error = Some(EMPTY_PROMPT_MESSAGE);
                return changed;
            }
            let mut messages = snapshot.conversation.messages().to_vec();
            messages.push(user_msg.clone());
            started = Ok(CompletionRequest { messages });
            snapshot.state = SubmissionState::Submitting;
            snapshot.prompt_error = None;
            true
        });
        let request = match started {
            Ok(request) => request,
            Err(err) => {
                debug!("submission rejected: {err}");
                return Err(err);
            }
        };

        let guard = SubmittingGuard::new(&self.inner);
        let request_timeout = self.inner.request_timeout;
        debug!("submitting a prompt with {} messages", request.messages.len());
        let reply_or_err = timeout(
            request_timeout,
            self.inner.model_client.complete(request),
        )
        .await
        .unwrap_or_else(|_| {
            let err: Box<dyn CompletionError> =
                Box::new(TimeoutError(request_timeout));
            Err(err)
        });

        let err = match reply_or_err {
            Ok(reply) => {
                guard.finish(|snapshot| {
                    snapshot.conversation.push_turn(user_msg, reply);
                    snapshot.draft.clear();
                });
                info!("turn completed");
                return Ok(());
            }
            Err(err) => {
                drop(guard);
                SubmissionError::from_completion_error(err)
            }
        };

        warn!("submission failed: {err}");
        match &err {
            SubmissionError::QuotaExceeded(_) => self.inner.upgrade_prompt.open(),
            _ => self.inner.notifier.error(GENERIC_FAILURE_MESSAGE),
        }
        Err(err)
    }
}

/// Returns the session to idle when dropped, unless [`finish`] already did.
///
/// [`finish`]: SubmittingGuard::finish
struct SubmittingGuard<'a> {
    inner: &'a Inner,
    armed: bool,
}

impl<'a> SubmittingGuard<'a> {
    #[inline]
    fn new(inner: &'a Inner) -> Self {
        Self { inner, armed: true }
    }

    /// Applies `f` and returns to idle in the same transition.
    fn finish(mut self, f: impl FnOnce(&mut SessionSnapshot)) {
        self.armed = false;
        self.inner.transition(|snapshot| {
            f(snapshot);
            snapshot.state = SubmissionState::Idle;
            true
        });
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.inner.transition(|snapshot| {
            snapshot.state = SubmissionState::Idle;
            true
        });
    }
}
