//! Shared plumbing for the demos: terminal setup and the UI loop state.

#![allow(dead_code)]

use crossterm::{cursor, execute, terminal};
use fadestream::render::{Modifiers, Rgb, Style};
use fadestream::{
    chunk, ChatView, ConsumerConfig, Conversation, ConversationError, FadeClock, FadeConfig,
    FrameTicker, OutputBuffer, StreamConsumer, StreamStatus, Transport, Turn, TurnOutcome,
};
use std::fs::File;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Rows below the conversation: one for the prompt, one for the status line.
const FOOTER_ROWS: u16 = 2;

/// Raw mode and the alternate screen, restored on drop.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Send logs to `path`; the screen belongs to the UI.
pub fn init_logging(path: &str) {
    match File::create(path) {
        Ok(file) => {
            if let Err(e) = fadestream::logging::init(fadestream::logging::DEFAULT_FILTER, Mutex::new(file)) {
                eprintln!("logging disabled: {e}");
            }
        }
        Err(e) => eprintln!("cannot create {path}: {e}"),
    }
}

/// Everything the UI loop owns.
pub struct App {
    pub conversation: Conversation,
    pub consumer: Option<StreamConsumer>,
    pub config: ConsumerConfig,
    pub input: String,
    pub status: String,
    clock: FadeClock,
    view: ChatView,
    out: OutputBuffer,
    width: u16,
    height: u16,
}

impl App {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            conversation: Conversation::new(),
            consumer: None,
            config: ConsumerConfig::default(),
            input: String::new(),
            status: String::new(),
            clock: FadeClock::new(FadeConfig::default()),
            view: ChatView::new(0, width, height.saturating_sub(FOOTER_ROWS)),
            out: OutputBuffer::new(),
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.view.set_area(0, width, height.saturating_sub(FOOTER_ROWS));
    }

    /// Submit `text` and start consuming the transport built for its turn.
    ///
    /// Returns `false` if the conversation rejected the text.
    pub fn submit<T, F>(&mut self, text: &str, open: F) -> bool
    where
        T: Transport + Send + 'static,
        F: FnOnce(&Turn) -> T,
    {
        let turn = match self.conversation.submit(text) {
            Ok(turn) => turn,
            Err(ConversationError::Busy) => {
                self.status = "Still answering. Press Esc to stop the reply.".to_string();
                return false;
            }
            Err(e) => {
                self.status = e.to_string();
                return false;
            }
        };

        let transport = open(&turn);
        let message_id = turn.message_id();
        self.clock.reset();
        match StreamConsumer::spawn(transport, turn, self.config.clone()) {
            Ok(consumer) => {
                info!(reply = %consumer.message_id(), "reply started");
                self.consumer = Some(consumer);
                self.status.clear();
            }
            Err(e) => {
                warn!(error = %e, "cannot spawn consumer");
                self.status = format!("cannot start reply: {e}");
                let outcome = TurnOutcome {
                    message_id,
                    content: self.config.error_notice.clone(),
                    status: StreamStatus::Failed(e.to_string()),
                };
                if let Err(e) = self.conversation.seal(outcome) {
                    warn!(error = %e, "cannot seal reply");
                }
            }
        }
        true
    }

    pub fn cancel(&self) {
        if let Some(consumer) = &self.consumer {
            consumer.cancel();
        }
    }

    /// Apply the newest snapshot and seal a finished turn.
    ///
    /// Returns `true` if anything changed.
    pub fn pump(&mut self, now: Instant) -> bool {
        let Some(consumer) = &self.consumer else {
            return false;
        };

        let mut changed = false;
        if let Some(snapshot) = consumer.poll_latest() {
            self.conversation.apply(snapshot.message_id, &snapshot.content);
            self.clock.observe(&snapshot.units, now);
            changed = true;
        }

        if consumer.is_finished() {
            if let Some(consumer) = self.consumer.take() {
                let outcome = consumer.join();
                self.clock.observe(&chunk(&outcome.content), now);
                if outcome.status.is_failed() {
                    self.status = format!("reply failed: {:?}", outcome.status);
                }
                if let Err(e) = self.conversation.seal(outcome) {
                    warn!(error = %e, "cannot seal reply");
                }
                changed = true;
            }
        }
        changed
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.consumer.is_some() || self.clock.is_animating(now)
    }

    pub fn draw(&mut self, now: Instant) -> io::Result<()> {
        self.out.clear();
        self.view
            .render(&self.conversation, &self.clock, now, &mut self.out);

        let base = Style::default();
        let prompt_row = self.height.saturating_sub(2);
        self.out.cursor_move(0, prompt_row);
        self.out.set_style(base.with_fg(Rgb::WHITE).with_modifiers(Modifiers::BOLD));
        self.out.write_str("> ");
        self.out.set_style(base.with_fg(Rgb::WHITE));
        self.out.write_str(&self.input);
        self.out.clear_to_eol();

        self.out.cursor_move(0, prompt_row + 1);
        self.out.set_style(base.with_modifiers(Modifiers::DIM));
        self.out.write_str(&self.status);
        self.out.clear_to_eol();
        self.out.reset_attrs();

        let mut stdout = io::stdout();
        self.out.flush_to(&mut stdout)?;
        stdout.flush()
    }
}

/// Spawn the repaint ticker at the fade frame rate.
pub fn spawn_ticker() -> io::Result<FrameTicker> {
    FrameTicker::spawn(FadeConfig::default().frame_interval)
}

/// How long the loop waits for a tick before checking input again.
pub const IDLE_WAIT: Duration = Duration::from_millis(50);
