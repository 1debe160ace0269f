//! Interfaces to the parts of the page the session does not own.
//!
//! The session only signals them; showing a modal or a toast is entirely up
//! to the host.

/// The dialog offering a subscription upgrade.
pub trait UpgradePrompt: Send + Sync {
    /// Shows the dialog.
    fn open(&self);

    /// Hides the dialog.
    fn close(&self);
}

/// Transient, non-blocking notifications (toasts).
pub trait Notifier: Send + Sync {
    /// Reports a failure to the user.
    fn error(&self, message: &str);
}

/// A collaborator that ignores every signal, used when the host doesn't
/// provide one.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl UpgradePrompt for Silent {
    #[inline]
    fn open(&self) {}

    #[inline]
    fn close(&self) {}
}

impl Notifier for Silent {
    #[inline]
    fn error(&self, _message: &str) {}
}
