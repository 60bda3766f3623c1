//! Application core — state, lifecycle, and event dispatch.
//!
//! The [`App`] struct holds all runtime state and is the single entry point
//! for the rest of the binary.  Heavy concerns are delegated to focused
//! submodules:
//!
//! | Module       | Responsibility                              |
//! |--------------|---------------------------------------------|
//! | `commands`   | Slash-command dispatch & story handlers     |
//! | `input`      | Text-input editing (cursor, history, etc.)  |
//! | `logging`    | `LogLevel`, `LogLine` for the activity panel |
//! | `ui`         | TUI rendering & status-bar helpers          |

mod commands;
mod input;
mod logging;
mod ui;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::constants::MAX_LOGS;
use crate::story::config::{ServiceConfig, ServiceSource};
use crate::story::dbus::{DbusStoryClient, ServiceEvent};
use crate::story::sequencer::{Message, Sequencer};

use self::logging::{LogLevel, LogLine};

// ── Application state ────────────────────────────────────────────────

/// Top-level application state.
///
/// Fields use `pub(crate)` visibility so that the sibling submodules
/// (`commands`, `ui`, …) can access them directly while keeping them hidden
/// from the rest of the crate.
pub struct App {
    pub(crate) runtime: Runtime,
    pub(crate) input: String,
    pub(crate) cursor: usize,
    pub(crate) input_history: Vec<String>,
    pub(crate) history_index: Option<usize>,
    pub(crate) history_stash: String,
    pub(crate) logs: Vec<LogLine>,
    pub(crate) service_config: ServiceConfig,
    pub(crate) service_source: ServiceSource,
    pub(crate) story: Option<DbusStoryClient>,
    pub(crate) sequencer: Sequencer,
    pub(crate) service_events_tx: mpsc::UnboundedSender<ServiceEvent>,
    pub(crate) service_events: mpsc::UnboundedReceiver<ServiceEvent>,
    pub(crate) scroll_offset: u16,
    pub(crate) should_quit: bool,
}

// ── Lifecycle ────────────────────────────────────────────────────────

impl App {
    /// Create and initialise a new application instance.
    pub fn new() -> Result<Self> {
        let runtime = Runtime::new().context("create tokio runtime")?;
        let (service_config, service_source) = ServiceConfig::load()?;
        let (service_events_tx, service_events) = mpsc::unbounded_channel();

        let mut app = App {
            runtime,
            input: String::new(),
            cursor: 0,
            input_history: Vec::new(),
            history_index: None,
            history_stash: String::new(),
            logs: Vec::new(),
            service_config,
            service_source,
            story: None,
            sequencer: Sequencer::new(),
            service_events_tx,
            service_events,
            scroll_offset: 0,
            should_quit: false,
        };

        app.log(
            LogLevel::Info,
            format!(
                "Story service config loaded from {}.",
                app.service_source.label(),
            ),
        );
        app.connect_service();
        app.log(
            LogLevel::Info,
            "Type /help for commands. /launch <path> starts a story.".to_string(),
        );

        Ok(app)
    }

    /// Whether the user has requested to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Drain pending service notifications into the activity log.
    ///
    /// Called once per draw tick, before rendering, so signal traffic shows
    /// up without any extra wake-up machinery.
    pub fn poll_service_events(&mut self) {
        while let Ok(event) = self.service_events.try_recv() {
            match event {
                ServiceEvent::Changed => self.log(
                    LogLevel::Info,
                    "Story state changed on the service side. /output re-reads it.".to_string(),
                ),
                ServiceEvent::Reset => self.log(
                    LogLevel::Info,
                    "The service restarted the story.".to_string(),
                ),
            }
        }
    }
}

// ── Event handling ───────────────────────────────────────────────────

impl App {
    /// Route a terminal event to the appropriate handler.
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            self.handle_key(key)?;
        }
        Ok(())
    }

    /// Dispatch a key press to input editing, commands, or story control.
    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match key {
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.should_quit = true,

            KeyEvent {
                code: KeyCode::Char('l'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.logs.clear(),

            KeyEvent { code, .. } => match code {
                KeyCode::Char(ch) => {
                    if self.handle_choice_shortcut(ch) {
                        return Ok(());
                    }
                    self.scroll_offset = 0; // snap to bottom on new input
                    self.insert_char(ch);
                }
                KeyCode::Backspace => self.backspace(),
                KeyCode::Delete => self.delete(),
                KeyCode::Left => self.move_cursor_left(),
                KeyCode::Right => self.move_cursor_right(),
                KeyCode::Home => self.move_cursor_home(),
                KeyCode::End => self.move_cursor_end(),
                KeyCode::Up => self.history_prev(),
                KeyCode::Down => self.history_next(),
                KeyCode::PageUp => self.scroll_up(10),
                KeyCode::PageDown => self.scroll_down(10),
                KeyCode::Enter => {
                    self.scroll_offset = 0; // snap to bottom on submit
                    self.submit_input()?;
                }
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            },
        }
        Ok(())
    }

    /// With an empty input line and a choice on screen, a bare digit picks
    /// that option directly. Returns `true` when the key was consumed.
    fn handle_choice_shortcut(&mut self, ch: char) -> bool {
        if !self.input.is_empty() {
            return false;
        }
        if !matches!(self.sequencer.current(), Some(Message::Choice { .. })) {
            return false;
        }
        match ch.to_digit(10) {
            Some(number) if number >= 1 => {
                self.choose_option(number - 1);
                true
            }
            _ => false,
        }
    }

    /// Submit the current input line for processing.
    fn submit_input(&mut self) -> Result<()> {
        let line = self.input.trim().to_string();
        self.input.clear();
        self.cursor = 0;
        self.history_index = None;

        if line.is_empty() {
            // Bare Enter drives the story forward.
            if self.sequencer.current().is_some() {
                self.advance_story();
            }
            return Ok(());
        }

        self.input_history.push(line.clone());

        if line.starts_with('/') {
            self.handle_command(&line)?;
        } else if let Ok(number) = line.parse::<u32>() {
            if number >= 1 {
                self.choose_option(number - 1);
            } else {
                self.log(LogLevel::Warn, "Options are numbered from 1.".to_string());
            }
        } else {
            self.log(
                LogLevel::Warn,
                format!("Not a command: {line}. /help lists commands."),
            );
        }

        Ok(())
    }
}

// ── Scrolling ────────────────────────────────────────────────────────

impl App {
    /// Scroll the activity log up by `n` lines.
    pub(crate) fn scroll_up(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(n);
    }

    /// Scroll the activity log down by `n` lines (towards the latest).
    pub(crate) fn scroll_down(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }
}

// ── Logging ──────────────────────────────────────────────────────────

/// Log a `Warn`/`Error` message, attaching `[file:line]` in debug-logs builds.
///
/// In release (no `debug-logs` feature) this behaves like `self.log()`.
///
/// ```ignore
/// log_src!(self, LogLevel::Warn, format!("something broke: {err:#}"));
/// ```
macro_rules! log_src {
    ($app:expr, $level:expr, $msg:expr) => {{
        #[cfg(feature = "debug-logs")]
        {
            let loc = format!("{}:{}", file!(), line!());
            $app.log_with_src($level, $msg, &loc);
        }
        #[cfg(not(feature = "debug-logs"))]
        {
            $app.log($level, $msg);
        }
    }};
}
pub(crate) use log_src;

impl App {
    /// Append a message to the activity log.
    pub(crate) fn log(&mut self, level: LogLevel, message: String) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.logs.push(LogLine {
            timestamp,
            level,
            message,
        });
        if self.logs.len() > MAX_LOGS {
            let overflow = self.logs.len() - MAX_LOGS;
            self.logs.drain(0..overflow);
        }
    }

    /// Append a message with a source location suffix (debug-logs builds only).
    #[cfg(feature = "debug-logs")]
    pub(crate) fn log_with_src(&mut self, level: LogLevel, message: String, src: &str) {
        let tagged = match level {
            LogLevel::Warn | LogLevel::Error => format!("{message}  [{src}]"),
            _ => message,
        };
        self.log(level, tagged);
    }
}
