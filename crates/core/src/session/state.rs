use crate::conversation::Conversation;

/// Whether a submission is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SubmissionState {
    /// Ready to accept a prompt.
    #[default]
    Idle,
    /// Waiting for the backend; the input is disabled.
    Submitting,
}

/// Everything an observer of a session can see.
///
/// Each change to a session produces a new snapshot in a single step, so a
/// snapshot never shows a user message without its reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub(crate) conversation: Conversation,
    pub(crate) state: SubmissionState,
    pub(crate) draft: String,
    pub(crate) prompt_error: Option<&'static str>,
}

impl SessionSnapshot {
    /// Returns the conversation so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the submission state.
    #[inline]
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Returns `true` while the input and the submit control are disabled.
    #[inline]
    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    /// Returns the current contents of the prompt input.
    #[inline]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Returns the inline feedback for the prompt input, if any.
    #[inline]
    pub fn prompt_error(&self) -> Option<&'static str> {
        self.prompt_error
    }
}
