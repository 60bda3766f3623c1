//! Terminal UI rendering — layout, status bar, story panel, and activity log.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::constants::STORY_PANEL_HEIGHT;
use crate::story::sequencer::Message;

use super::App;

impl App {
    /// Render the full TUI frame: status bar, story panel, activity log,
    /// and input prompt.
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(STORY_PANEL_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        // ── Status bar ───────────────────────────────────────────────
        let header_line = Line::from(vec![
            Span::styled("Service: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.service_status_label(),
                Style::default().fg(self.service_status_color()),
            ),
            Span::styled("  Story: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.story_status_label(),
                Style::default().fg(self.story_status_color()),
            ),
        ]);
        frame.render_widget(Paragraph::new(header_line), chunks[0]);

        // ── Story panel ──────────────────────────────────────────────
        let title = if self.sequencer.remaining() > 0 {
            format!(" Story ({} more) ", self.sequencer.remaining())
        } else {
            " Story ".to_string()
        };
        let story_panel = Paragraph::new(self.story_panel_text())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(story_panel, chunks[1]);

        // ── Activity log ─────────────────────────────────────────────
        let inner_width = chunks[2].width.saturating_sub(2);
        let inner_height = chunks[2].height.saturating_sub(2) as usize;

        // Build the log paragraph with wrapping so we can query its
        // rendered line count (ratatui 0.30 native API).
        let log_lines: Vec<Line> = self.logs.iter().map(|l| l.render()).collect();
        let log_paragraph = Paragraph::new(Text::from(log_lines)).wrap(Wrap { trim: true });

        let total_visual = log_paragraph.line_count(inner_width);
        let max_scroll = total_visual.saturating_sub(inner_height);

        // Clamp scroll_offset (lines from the bottom) to valid range.
        if (self.scroll_offset as usize) > max_scroll {
            self.scroll_offset = max_scroll as u16;
        }
        let top_row = max_scroll.saturating_sub(self.scroll_offset as usize) as u16;

        let scroll_indicator = if self.scroll_offset > 0 {
            format!(" Activity [↑{}] ", self.scroll_offset)
        } else {
            " Activity ".to_string()
        };

        let log_panel = log_paragraph
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(scroll_indicator),
            )
            .scroll((top_row, 0));
        frame.render_widget(log_panel, chunks[2]);

        // ── Input prompt ─────────────────────────────────────────────
        let input_panel = Paragraph::new(self.input.as_str())
            .block(Block::default().borders(Borders::ALL).title(" Command "));
        frame.render_widget(input_panel, chunks[3]);

        let input_width = chunks[3].width.saturating_sub(2) as usize;
        let cursor = self.cursor.min(input_width);
        frame.set_cursor_position(Position::new(
            chunks[3].x + 1 + cursor as u16,
            chunks[3].y + 1,
        ));
    }

    // ── Story panel content ──────────────────────────────────────────

    fn story_panel_text(&self) -> Text<'_> {
        let hint_style = Style::default().fg(Color::DarkGray);

        match self.sequencer.current() {
            None => Text::from(Line::styled(
                "No story message. /launch <path> to start.",
                hint_style,
            )),
            Some(Message::Advance { text }) => {
                let mut lines: Vec<Line> = text.lines().map(Line::from).collect();
                lines.push(Line::default());
                lines.push(Line::styled("[Enter] continue", hint_style));
                Text::from(lines)
            }
            Some(Message::Choice { text, options }) => {
                let mut lines: Vec<Line> = text.lines().map(Line::from).collect();
                lines.push(Line::default());
                for (i, option) in options.iter().enumerate() {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("  {}. ", i + 1),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::styled(option.as_str(), Style::default().fg(Color::Cyan)),
                    ]));
                }
                lines.push(Line::styled("press a number to choose", hint_style));
                Text::from(lines)
            }
        }
    }

    // ── Status-bar helpers ───────────────────────────────────────────

    fn service_status_label(&self) -> String {
        if self.story.is_some() {
            format!("{} (connected)", self.service_config.bus_name)
        } else {
            format!("{} (offline)", self.service_config.bus_name)
        }
    }

    fn service_status_color(&self) -> Color {
        if self.story.is_some() {
            Color::Green
        } else {
            Color::Red
        }
    }

    fn story_status_label(&self) -> String {
        match self.sequencer.current() {
            None => "idle".to_string(),
            Some(Message::Advance { .. }) => {
                format!("reading ({} queued)", self.sequencer.remaining())
            }
            Some(Message::Choice { options, .. }) => {
                format!("choice ({} options)", options.len())
            }
        }
    }

    fn story_status_color(&self) -> Color {
        match self.sequencer.current() {
            None => Color::DarkGray,
            Some(Message::Advance { .. }) => Color::Green,
            Some(Message::Choice { .. }) => Color::Magenta,
        }
    }
}
