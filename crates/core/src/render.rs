//! Turning a session into something a page can display.

use std::fmt::Write as _;

use crate::SessionSnapshot;
use crate::format::{escape_html, format_for_display};

/// Label shown in place of the conversation before anything is said.
pub const EMPTY_LABEL: &str = "No conversation started.";

/// Where assistant replies come from, which decides whether they are
/// escaped before formatting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentTrust {
    /// Escape replies, so markup in them shows up as text.
    #[default]
    Untrusted,
    /// Format replies as they are. Only for a backend served from the same
    /// origin that is known to never echo foreign markup.
    SameOrigin,
}

/// One exchange, ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedTurn {
    /// The user's prompt as plain text.
    pub user_text: String,
    /// The assistant's reply as markup, see [`format_for_display`].
    pub assistant_markup: Option<String>,
}

/// The conversation area of the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Whether the loader is shown.
    pub loading: bool,
    /// Placeholder shown when there is nothing else to show.
    pub empty_label: Option<&'static str>,
    /// The exchanges, oldest first.
    pub turns: Vec<RenderedTurn>,
}

impl Page {
    /// Renders the given session state.
    pub fn from_snapshot(snapshot: &SessionSnapshot, trust: ContentTrust) -> Self {
        let conversation = snapshot.conversation();
        let loading = snapshot.is_submitting();
        let empty_label =
            (conversation.is_empty() && !loading).then_some(EMPTY_LABEL);
        let turns = conversation
            .turns()
            .map(|turn| RenderedTurn {
                user_text: turn.user.to_owned(),
                assistant_markup: turn.assistant.map(|text| match trust {
                    ContentTrust::Untrusted => {
                        format_for_display(&escape_html(text))
                    }
                    ContentTrust::SameOrigin => format_for_display(text),
                }),
            })
            .collect();
        Self {
            loading,
            empty_label,
            turns,
        }
    }

    /// Writes the page as a standalone HTML fragment.
    pub fn to_html(&self) -> String {
        let mut html = String::from(r#"<div class="conversation">"#);
        if self.loading {
            html.push_str(r#"<div class="loader">Thinking...</div>"#);
        }
        if let Some(label) = self.empty_label {
            // Infallible for `String`.
            let _ = write!(html, r#"<div class="empty">{label}</div>"#);
        }
        for turn in &self.turns {
            let _ = write!(
                html,
                r#"<div class="turn"><div class="message user"><p>{}</p></div>"#,
                escape_html(&turn.user_text)
            );
            if let Some(markup) = &turn.assistant_markup {
                let _ = write!(
                    html,
                    r#"<div class="message assistant">{markup}</div>"#
                );
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
        html
    }
}
