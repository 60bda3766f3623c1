//! Slash-command dispatch and story control handlers.
//!
//! Every `/command` typed by the user is routed through [`App::handle_command`]
//! and dispatched to the matching handler method in this module. The story
//! handlers are thin: they gate on connection and display state, delegate to
//! the sequencer, and report the outcome in the activity log.

use anyhow::Result;

use crate::story::StoryService;
use crate::story::sequencer::Message;
use crate::util::expand_path;

use super::App;
use super::log_src;
use super::logging::LogLevel;

// ── Command dispatch ─────────────────────────────────────────────────

impl App {
    /// Route a slash-command to the matching handler.
    pub(crate) fn handle_command(&mut self, line: &str) -> Result<()> {
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "/help" => self.show_help(),
            "/quit" | "/exit" => self.should_quit = true,
            "/clear" => self.logs.clear(),
            "/connect" => self.connect_service(),
            "/launch" | "/run" => {
                let path = parts.next().map(str::to_string);
                self.launch_story(path);
            }
            "/next" | "/advance" => self.advance_story(),
            "/choose" => match parts.next().map(str::parse::<u32>) {
                Some(Ok(number)) if number >= 1 => self.choose_option(number - 1),
                _ => log_src!(
                    self,
                    LogLevel::Warn,
                    "Usage: /choose <number> (1-based)".to_string()
                ),
            },
            "/output" => self.refetch_output(),
            "/options" => self.list_options(),
            "/var" => match parts.next() {
                Some(name) => self.show_var(name),
                None => log_src!(self, LogLevel::Warn, "Usage: /var <name>".to_string()),
            },
            "/status" => self.show_status(),
            "/reset" => self.reset_story(),
            _ => log_src!(self, LogLevel::Warn, format!("Unknown command: {cmd}")),
        }

        Ok(())
    }
}

// ── Help ─────────────────────────────────────────────────────────────

impl App {
    fn show_help(&mut self) {
        let lines = [
            "Story",
            "  /launch [path]        Start a story script (falls back to the configured default)",
            "  Enter                 Continue to the next paragraph",
            "  1-9 or <n> + Enter    Pick a branch when choices are shown",
            "  /next                 Continue (same as bare Enter)",
            "  /choose <n>           Pick a branch by number",
            "  /output               Re-read the current output from the service",
            "  /options              Show the pending choices",
            "  /reset                Restart the current story",
            "",
            "Service",
            "  /connect              Retry the session-bus connection",
            "  /status               Connection, config source, and finished flag",
            "  /var <name>           Read a story variable",
            "",
            "General",
            "  /clear  or Ctrl+L     Clear the activity log",
            "  PageUp / PageDown     Scroll the activity log",
            "  /quit                 Exit",
        ];
        for line in lines {
            self.log(LogLevel::Info, line.to_string());
        }
    }
}

// ── Connection ───────────────────────────────────────────────────────

impl App {
    /// Connect (or reconnect) to the story service on the session bus.
    pub(crate) fn connect_service(&mut self) {
        let result = crate::story::dbus::DbusStoryClient::connect(
            &self.service_config,
            self.runtime.handle().clone(),
            self.service_events_tx.clone(),
        );
        match result {
            Ok(client) => {
                self.story = Some(client);
                self.log(
                    LogLevel::Info,
                    format!("Connected to {} on the session bus.", self.service_config.bus_name),
                );
            }
            Err(err) => {
                self.story = None;
                log_src!(
                    self,
                    LogLevel::Error,
                    format!("Could not reach the story service: {err}")
                );
                self.log(
                    LogLevel::Info,
                    "Is the service running? /connect retries.".to_string(),
                );
            }
        }
    }
}

// ── Story control ────────────────────────────────────────────────────

impl App {
    /// Launch a script, replacing whatever story was in progress.
    pub(crate) fn launch_story(&mut self, path: Option<String>) {
        let raw = match path.or_else(|| self.service_config.default_script.clone()) {
            Some(raw) => raw,
            None => {
                log_src!(
                    self,
                    LogLevel::Warn,
                    "Usage: /launch <path> (no default_script configured)".to_string()
                );
                return;
            }
        };
        let path = expand_path(&raw).display().to_string();

        let result = match self.story.as_mut() {
            Some(client) => self.sequencer.user_launch(client, &path),
            None => {
                self.log_not_connected();
                return;
            }
        };

        match result {
            Ok(()) => {
                self.log(LogLevel::Info, format!("Launched {path}"));
                if self.sequencer.is_idle() {
                    self.log(LogLevel::Info, "The story produced no output.".to_string());
                } else {
                    self.show_current();
                }
            }
            Err(err) => log_src!(self, LogLevel::Error, format!("Launch failed: {err}")),
        }
    }

    /// Dismiss the current message and show the next queued paragraph.
    pub(crate) fn advance_story(&mut self) {
        match self.sequencer.current() {
            None => self.log(
                LogLevel::Info,
                "Nothing to advance. /launch <path> starts a story.".to_string(),
            ),
            Some(Message::Choice { .. }) => self.log(
                LogLevel::Info,
                "This message needs a choice — pick an option number.".to_string(),
            ),
            Some(Message::Advance { .. }) => {
                self.sequencer.user_advance();
                if self.sequencer.is_idle() {
                    self.log(LogLevel::Info, "End of story output.".to_string());
                } else {
                    self.show_current();
                }
            }
        }
    }

    /// Pick the branch at `option` (0-based) on the displayed message.
    pub(crate) fn choose_option(&mut self, option: u32) {
        // The label lookup is only for the transcript; the index itself is
        // forwarded unchecked and the service is the validator.
        let label = match self.sequencer.current() {
            Some(Message::Choice { options, .. }) => options.get(option as usize).cloned(),
            _ => {
                self.log(LogLevel::Warn, "No choice is pending.".to_string());
                return;
            }
        };
        if let Some(label) = label {
            self.log(LogLevel::Story, format!("→ {label}"));
        }

        let result = match self.story.as_mut() {
            Some(client) => self.sequencer.user_choose(client, option),
            None => {
                self.log_not_connected();
                return;
            }
        };

        match result {
            Ok(()) => {
                if self.sequencer.is_idle() {
                    self.log(LogLevel::Info, "End of story output.".to_string());
                } else {
                    self.show_current();
                }
            }
            Err(err) => log_src!(self, LogLevel::Error, format!("Choice failed: {err}")),
        }
    }

    /// Re-read the full current output without advancing the story.
    pub(crate) fn refetch_output(&mut self) {
        let result = match self.story.as_mut() {
            Some(client) => client
                .output()
                .and_then(|groups| client.options().map(|options| (groups, options))),
            None => {
                self.log_not_connected();
                return;
            }
        };

        match result {
            Ok((groups, options)) => {
                self.sequencer.start_sequence(groups, options);
                if self.sequencer.is_idle() {
                    self.log(LogLevel::Info, "The story has no current output.".to_string());
                } else {
                    self.show_current();
                }
            }
            Err(err) => log_src!(self, LogLevel::Error, format!("Output fetch failed: {err}")),
        }
    }

    /// List the currently valid choices as reported by the service.
    pub(crate) fn list_options(&mut self) {
        let result = match self.story.as_mut() {
            Some(client) => client.options(),
            None => {
                self.log_not_connected();
                return;
            }
        };

        match result {
            Ok(options) if options.is_empty() => {
                self.log(LogLevel::Info, "No choice is pending.".to_string());
            }
            Ok(options) => {
                for (i, option) in options.iter().enumerate() {
                    self.log(LogLevel::Info, format!("  {}. {option}", i + 1));
                }
            }
            Err(err) => log_src!(self, LogLevel::Error, format!("Options fetch failed: {err}")),
        }
    }

    /// Read a story variable and print it.
    pub(crate) fn show_var(&mut self, name: &str) {
        let result = match self.story.as_mut() {
            Some(client) => client.var(name),
            None => {
                self.log_not_connected();
                return;
            }
        };

        match result {
            Ok(value) => self.log(LogLevel::Info, format!("{name} = {value}")),
            Err(err) => log_src!(self, LogLevel::Error, format!("Variable read failed: {err}")),
        }
    }

    /// Report connection state, config source, and the remote finished flag.
    pub(crate) fn show_status(&mut self) {
        self.log(
            LogLevel::Info,
            format!(
                "Service: {} at {} (config: {})",
                self.service_config.bus_name,
                self.service_config.object_path,
                self.service_source.label(),
            ),
        );

        let finished = match self.story.as_mut() {
            Some(client) => client.finished(),
            None => {
                self.log(LogLevel::Info, "Not connected.".to_string());
                return;
            }
        };

        match finished {
            Ok(true) => self.log(LogLevel::Info, "Story: finished.".to_string()),
            Ok(false) => {
                let state = match self.sequencer.current() {
                    None => "idle".to_string(),
                    Some(Message::Advance { .. }) => {
                        format!("reading ({} queued)", self.sequencer.remaining())
                    }
                    Some(Message::Choice { options, .. }) => {
                        format!("waiting on a choice ({} options)", options.len())
                    }
                };
                self.log(LogLevel::Info, format!("Story: {state}."));
            }
            Err(err) => log_src!(self, LogLevel::Error, format!("Status fetch failed: {err}")),
        }
    }

    /// Restart the current story from the beginning.
    pub(crate) fn reset_story(&mut self) {
        let result = match self.story.as_mut() {
            Some(client) => client.reset(),
            None => {
                self.log_not_connected();
                return;
            }
        };

        match result {
            Ok(()) => {
                // The queued paragraphs belong to the pre-reset story.
                self.sequencer.start_sequence(Vec::new(), Vec::new());
                self.log(
                    LogLevel::Info,
                    "Story reset. /output shows the opening.".to_string(),
                );
            }
            Err(err) => log_src!(self, LogLevel::Error, format!("Reset failed: {err}")),
        }
    }
}

// ── Transcript ───────────────────────────────────────────────────────

impl App {
    /// Append the displayed message to the activity log as transcript.
    pub(crate) fn show_current(&mut self) {
        let Some(current) = self.sequencer.current().cloned() else {
            return;
        };

        for line in current.text().lines() {
            self.log(LogLevel::Story, line.to_string());
        }
        if let Message::Choice { options, .. } = current {
            for (i, option) in options.iter().enumerate() {
                self.log(LogLevel::Story, format!("  {}. {option}", i + 1));
            }
        }
    }

    fn log_not_connected(&mut self) {
        log_src!(
            self,
            LogLevel::Warn,
            "Not connected to the story service. /connect retries.".to_string()
        );
    }
}
