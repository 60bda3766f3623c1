//! Activity-log types for the TUI panel.

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Severity of an activity-log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    /// Story narration and choice transcript lines.
    Story,
}

/// One timestamped line in the activity panel.
#[derive(Clone, Debug)]
pub struct LogLine {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogLine {
    /// Render as a styled ratatui line: dim timestamp, level-colored text.
    pub fn render(&self) -> Line<'_> {
        let style = match self.level {
            LogLevel::Info => Style::default().fg(Color::Gray),
            LogLevel::Warn => Style::default().fg(Color::Yellow),
            LogLevel::Error => Style::default().fg(Color::Red),
            LogLevel::Story => Style::default().fg(Color::White),
        };
        Line::from(vec![
            Span::styled(
                format!("{} ", self.timestamp),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(self.message.as_str(), style),
        ])
    }
}
