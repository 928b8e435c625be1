//! Replay Demo: streams canned replies through the full pipeline offline.
//!
//! Each reply is encoded as `data:` frames, cut into uneven byte chunks (so
//! characters and lines straddle reads) and delivered with a delay per
//! chunk, like a provider would.
//!
//! Enter: next reply | Esc: stop the reply | q: quit

#[path = "support.rs"]
mod support;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use fadestream::{ScriptedTransport, Transport, TransportError};
use std::thread;
use std::time::{Duration, Instant};
use support::{App, TerminalGuard, IDLE_WAIT};

const SCRIPT: &[(&str, &str)] = &[
    (
        "What does this demo show?",
        "Every word of this reply fades in as it arrives.\n\nThe bytes are split at odd places, even inside multi-byte characters like “these quotes” or ü, and still decode to the same text.",
    ),
    (
        "And a longer answer?",
        "Sure. Words that are already visible never fade in twice:\nthe chunker only ever appends units, or lets the last word grow.\n\nBlank lines are kept, and long lines wrap at word boundaries so nothing jumps around while the reply streams in.",
    ),
];

/// Delivers scripted chunks with a delay, like a network would.
struct Paced {
    inner: ScriptedTransport,
    delay: Duration,
}

impl Transport for Paced {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        thread::sleep(self.delay);
        self.inner.next_chunk()
    }
}

/// Encode `text` as a stream body, a few characters per frame.
fn encode(text: &str) -> Vec<u8> {
    let chars: Vec<char> = text.chars().collect();
    let mut body = String::from(": replay\n\n");
    for (i, piece) in chars.chunks(3).enumerate() {
        let delta: String = piece.iter().collect();
        let frame = serde_json::json!({"choices": [{"index": 0, "delta": {"content": delta}}]});
        body.push_str("data: ");
        body.push_str(&frame.to_string());
        body.push_str(if i % 4 == 0 { "\r\n\r\n" } else { "\n\n" });
    }
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

fn main() -> std::io::Result<()> {
    support::init_logging("fadestream-replay.log");

    let (width, height) = terminal::size()?;
    let _guard = TerminalGuard::enter()?;
    let ticker = support::spawn_ticker()?;
    let mut app = App::new(width, height);
    let mut next = 0usize;
    app.status = "Enter: next reply | Esc: stop | q: quit".to_string();
    app.draw(Instant::now())?;

    'main: loop {
        // Wait for a frame tick, or time out to check input.
        let _ = ticker.receiver().recv_timeout(support::IDLE_WAIT);

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') => break 'main,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break 'main,
                    KeyCode::Esc => app.cancel(),
                    KeyCode::Enter => {
                        let (question, answer) = SCRIPT[next % SCRIPT.len()];
                        let started = app.submit(question, |_| Paced {
                            inner: ScriptedTransport::split_every(&encode(answer), 17),
                            delay: Duration::from_millis(40),
                        });
                        if started {
                            next += 1;
                        }
                    }
                    _ => {}
                },
                Event::Resize(w, h) => app.resize(w, h),
                _ => {}
            }
        }

        let now = Instant::now();
        app.pump(now);
        if app.is_animating(now) {
            ticker.resume();
        } else {
            ticker.pause();
        }
        app.draw(now)?;
    }

    ticker.join();
    Ok(())
}
