use std::sync::Arc;
use std::time::Duration;

use converse_model::CompletionProvider;

use super::{DEFAULT_REQUEST_TIMEOUT, Session, SessionSnapshot};
use crate::collaborator::{Notifier, Silent, UpgradePrompt};
use crate::model_client::ModelClient;

/// [`Session`] builder.
pub struct SessionBuilder {
    pub(crate) model_client: ModelClient,
    pub(crate) upgrade_prompt: Arc<dyn UpgradePrompt>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) request_timeout: Duration,
    pub(crate) on_change: Option<Box<dyn Fn(&SessionSnapshot) + Send + Sync>>,
}

impl SessionBuilder {
    /// Creates a new builder with the specified completion provider.
    #[inline]
    pub fn with_completion_provider<P: CompletionProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            upgrade_prompt: Arc::new(Silent),
            notifier: Arc::new(Silent),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            on_change: None,
        }
    }

    /// Sets the dialog opened when the backend reports an exhausted quota.
    #[inline]
    pub fn with_upgrade_prompt(
        mut self,
        upgrade_prompt: Arc<dyn UpgradePrompt>,
    ) -> Self {
        self.upgrade_prompt = upgrade_prompt;
        self
    }

    /// Sets where generic failures are reported.
    #[inline]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Sets how long a submission may wait for the backend.
    #[inline]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Attaches a callback to be invoked after every state change.
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn(&SessionSnapshot) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    /// Builds the session.
    #[inline]
    pub fn build(self) -> Session {
        Session::from_builder(self)
    }
}
