mod app;
mod app_core;
mod bridge;
mod host;
mod logging;
mod model;
mod msg;
mod settings;
mod view;

use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use app::App;
use bridge::CapabilityRegistry;
use model::config::AppConfig;
use msg::Msg;

fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Logging goes to the session file (never stdout) from here on.
    let core = Arc::new(app_core::Core::init(config.core_config())?);

    let settings = core.settings_snapshot()?;
    tracing::info!(
        target: "aknet",
        sampling_rate = settings.audio.sampling_rate,
        buffer_size = settings.audio.buffer_size,
        "audio settings loaded"
    );

    let mut registry = CapabilityRegistry::new();
    host::expose_all(&mut registry, Arc::clone(&core))?;
    let app = App::new(Arc::new(registry))?;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, app, Duration::from_millis(config.ui.tick_ms));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(target: "aknet", "event loop failed: {e:?}");
        eprintln!("aknet error: {e:?}");
    }

    core.shutdown();
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    tick: Duration,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Msg>();

    // Input thread — reads terminal events and forwards as Msg
    let tx_input = tx.clone();
    thread::spawn(move || {
        loop {
            if let Ok(event) = event::read() {
                let msg = match event {
                    Event::Key(k) => Msg::Key(k),
                    Event::Mouse(m) => Msg::Mouse(m),
                    Event::Resize(w, h) => Msg::Resize(w, h),
                    _ => continue,
                };
                if tx_input.send(msg).is_err() {
                    break;
                }
            }
        }
    });

    // Tick thread — periodic redraw
    let tx_tick = tx;
    thread::spawn(move || {
        loop {
            thread::sleep(tick);
            if tx_tick.send(Msg::Tick).is_err() {
                break;
            }
        }
    });

    terminal.draw(|f| app.view(f))?;

    // ── Main event loop ──
    loop {
        // Batch-drain all pending messages
        let first = rx.recv()?;
        app.update(first)?;

        while let Ok(msg) = rx.try_recv() {
            app.update(msg)?;
        }

        if app.should_quit {
            tracing::info!(target: "aknet", "quit requested");
            break;
        }

        terminal.draw(|f| app.view(f))?;
    }

    Ok(())
}
