use std::sync::atomic::{AtomicBool, Ordering};

use converse_core::collaborator::{Notifier, UpgradePrompt};
use owo_colors::OwoColorize;

pub const BAR_CHAR: &str = "▎";

/// Prints the upgrade offer once per denial and remembers whether it is
/// still on screen.
#[derive(Default)]
pub struct UpgradeBanner {
    open: AtomicBool,
}

impl UpgradeBanner {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl UpgradePrompt for UpgradeBanner {
    fn open(&self) {
        if self.open.swap(true, Ordering::SeqCst) {
            return;
        }
        let bar = BAR_CHAR.bright_magenta();
        println!("\n{bar}✨ You have used up your free generations.");
        println!("{bar}Upgrade to Pro to keep the conversation going.\n");
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

/// Prints failures the way a toast would show them.
pub struct Toast;

impl Notifier for Toast {
    fn error(&self, message: &str) {
        eprintln!("{}❌ {}", BAR_CHAR.bright_red(), message.bright_white());
    }
}
