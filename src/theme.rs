//! Styling for the form. A `Theme` value is threaded through rendering
//! instead of styling globals.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Focused controls and the active tab.
    pub focused: Style,
    /// Everything that is not focused.
    pub blurred: Style,
    /// Success feedback line.
    pub success: Style,
    /// Error feedback and inline field errors.
    pub error: Style,
    /// Muted labels and help text.
    pub muted: Style,
    /// Window borders.
    pub border: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focused: Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            blurred: Style::new().fg(Color::Gray),
            success: Style::new().fg(Color::Green),
            error: Style::new().fg(Color::Red),
            muted: Style::new().fg(Color::DarkGray),
            border: Style::new().fg(Color::DarkGray),
        }
    }
}
