//! Lightweight markdown-like formatting for assistant replies.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^\n\r\x{2028}\x{2029}]*?)\*\*")
        .expect("emphasis pattern is valid")
});

/// Converts an assistant reply to display markup.
///
/// Three rules are applied in order:
///
/// 1. `**X**` becomes `<strong>X</strong>` (shortest match, never across
///    a line or paragraph separator).
/// 2. Every list marker `- ` is preceded by a `<br>`.
/// 3. The text is split on blank lines and each fragment is wrapped in a
///    `<p>` element.
///
/// The input is not escaped. Pass it through [`escape_html`] first unless
/// it comes from a source you trust.
///
/// ```
/// use converse_core::format::format_for_display;
///
/// assert_eq!(
///     format_for_display("**hi** there"),
///     "<p><strong>hi</strong> there</p>"
/// );
/// ```
pub fn format_for_display(text: &str) -> String {
    let text = emphasize(text);
    let text = text.replace("- ", "<br>- ");
    text.split("\n\n").map(|p| format!("<p>{p}</p>")).collect()
}

#[inline]
fn emphasize(text: &str) -> Cow<'_, str> {
    EMPHASIS.replace_all(text, "<strong>$1</strong>")
}

/// Escapes the characters that are significant in HTML.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
