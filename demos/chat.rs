//! Chat Demo: talks to an OpenAI-compatible endpoint.
//!
//! Reads `OPENAI_API_KEY`, `OPENAI_MODEL` (default `gpt-4.1-nano`) and
//! `OPENAI_BASE_URL` from the environment. Logs go to `fadestream-chat.log`;
//! set `FADESTREAM_LOG=debug` for more.
//!
//! Enter: send | Esc: stop the reply | Ctrl-C: quit

#[path = "support.rs"]
mod support;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use fadestream::{OpenAiClient, ProviderConfig};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use support::{App, TerminalGuard};

fn main() -> ExitCode {
    support::init_logging("fadestream-chat.log");

    let client = match ProviderConfig::from_env().map(OpenAiClient::new) {
        Ok(Ok(client)) => client,
        Ok(Err(e)) | Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&client) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("terminal error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(client: &OpenAiClient) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let _guard = TerminalGuard::enter()?;
    let ticker = support::spawn_ticker()?;
    let mut app = App::new(width, height);
    app.status = format!("model {} | Enter: send | Esc: stop | Ctrl-C: quit", client.config().model);
    app.draw(Instant::now())?;

    'main: loop {
        let _ = ticker.receiver().recv_timeout(support::IDLE_WAIT);

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break 'main,
                    KeyCode::Char(c) => app.input.push(c),
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Esc => app.cancel(),
                    KeyCode::Enter => {
                        let text = app.input.clone();
                        let consumer = app.config.clone();
                        // A rejected submit keeps the draft.
                        if app.submit(&text, |turn| client.stream(turn.history(), &consumer)) {
                            app.input.clear();
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
