use crate::config::Config;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pomo_core::{
    parse, Command, DayReport, JsonlStore, Outcome, SessionController, SessionKind, SessionStore,
    TickOutcome,
};
use tracing::{info, warn};

/// Longest line the prompt accepts.
pub const INPUT_LIMIT: usize = 20;

#[derive(Debug, Default, Clone, PartialEq)]
pub enum View {
    #[default]
    Prompt,
    Report(DayReport),
}

pub struct App<S = JsonlStore> {
    pub controller: SessionController<S>,
    pub input: String,
    /// Transient message under the prompt, cleared on the next keystroke.
    pub error: Option<String>,
    pub view: View,
    pub config: Config,
    pub should_quit: bool,
    restart_ticker: bool,
}

impl<S: SessionStore> App<S> {
    pub fn new(controller: SessionController<S>, config: Config) -> Self {
        Self {
            controller,
            input: String::new(),
            error: None,
            view: View::Prompt,
            config,
            should_quit: false,
            restart_ticker: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: DateTime<Local>) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Mid-session the prompt is gone; only stop and quit keys count.
        if !self.controller.is_idle() {
            match key.code {
                KeyCode::Char('x') => self.submit(Command::Stop, now),
                KeyCode::Char('q') | KeyCode::Esc => self.submit(Command::Quit, now),
                _ => {}
            }
            return;
        }

        if matches!(self.view, View::Report(_)) {
            match key.code {
                KeyCode::Char('x') => {
                    self.view = View::Prompt;
                    self.input.clear();
                }
                KeyCode::Esc => self.should_quit = true,
                _ => {}
            }
            return;
        }

        self.error = None;
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input);
                self.submit(parse(&line), now);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                if self.input.chars().count() < INPUT_LIMIT {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }

    pub fn submit(&mut self, command: Command, now: DateTime<Local>) {
        match self.controller.handle(command, now) {
            Outcome::Started(kind) => {
                info!(%kind, "started from prompt");
                self.view = View::Prompt;
                self.restart_ticker = true;
            }
            Outcome::Report(report) => self.view = View::Report(report),
            Outcome::Quit => self.should_quit = true,
            Outcome::Invalid(e) => self.error = Some(e.to_string()),
            Outcome::StoreFailed(e) => self.error = Some(e.to_string()),
            Outcome::Stopped | Outcome::Ignored => {}
        }
    }

    pub fn on_tick(&mut self, now: DateTime<Local>) {
        let report = self.controller.tick(now);
        if let Some(e) = report.error {
            self.error = Some(e.to_string());
        }
        if let TickOutcome::Finished { kind, .. } = report.outcome {
            self.notify_finished(kind);
        }
    }

    /// True once after a session starts, so the caller can realign its
    /// one-second ticker to the start instant.
    pub fn take_ticker_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_ticker)
    }

    fn notify_finished(&self, kind: SessionKind) {
        if !self.config.notifications {
            return;
        }
        let body = match kind {
            SessionKind::Work => "Work session complete. Time for a break.",
            SessionKind::Break => "Break is over. Ready for the next session?",
        };
        self.send_notification("pomo", body);
    }

    fn send_notification(&self, title: &str, body: &str) {
        if let Err(e) = notify_rust::Notification::new()
            .summary(title)
            .body(body)
            .appname("pomo")
            .show()
        {
            warn!("Failed to send notification: {}", e);
        }
    }
}
