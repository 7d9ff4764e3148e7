// SPDX-License-Identifier: MIT
#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod config;
mod sampler;
mod sys;
mod tui;

use std::io::{self, IsTerminal, Stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::sampler::SystemSampler;
use crate::sampler::profile::Profiler;
use crate::tui::app::App;
use crate::tui::input::handle_key;
use crate::tui::theme;

// Short enough that a keypress never waits perceptibly, long enough that an
// idle loop barely wakes.
const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(
    name = "ktop",
    version,
    about = "ktop: terminal monitor for CPU, memory, network and GPU load"
)]
struct Cli {
    /// Refresh interval in seconds
    #[arg(short = 'r', long = "refresh", default_value_t = 1.0)]
    refresh: f64,
    /// Initial theme (overrides the saved config)
    #[arg(long)]
    theme: Option<String>,
    /// Simulation mode: inject synthetic OOM events and write profiling
    /// summaries to the diagnostic log
    #[arg(long)]
    sim: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !io::stdout().is_terminal() {
        bail!("ktop requires an interactive terminal");
    }
    if !cli.refresh.is_finite() || cli.refresh <= 0.0 {
        bail!("refresh interval must be a positive number of seconds");
    }
    let refresh = Duration::from_secs_f64(cli.refresh.clamp(0.1, 3600.0));

    let shutdown = install_signal_handler()?;
    let theme = cli
        .theme
        .or_else(config::load_theme_name)
        .map_or(&theme::THEMES[0], |name| theme::by_name(&name));

    // Probes open before the terminal switches modes so a fatal environment
    // produces a readable diagnostic.
    let mut sampler = SystemSampler::new(cli.sim)?;
    let mut profiler = Profiler::new(cli.sim);
    let mut app = App::new(theme, refresh, sampler.gpu_count());

    let mut guard = TerminalGuard::new()?;
    let result = run_loop(
        &shutdown,
        &mut sampler,
        &mut profiler,
        &mut app,
        &mut guard.terminal,
        refresh,
    );
    drop(guard);
    result
}

// ---------------------------------------------------------------------------
// Signal handling
// ---------------------------------------------------------------------------

fn install_signal_handler() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))
        .context("failed to register SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown))
        .context("failed to register SIGTERM handler")?;
    Ok(shutdown)
}

// ---------------------------------------------------------------------------
// Terminal raw-mode guard
// ---------------------------------------------------------------------------

/// Owns raw mode and the alternate screen. Dropping it restores the
/// original terminal on every exit path, including early error returns.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(error) = crossterm::execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(error).context("failed to enter alternate screen");
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(error) => {
                let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                Err(error).context("failed to create terminal")
            }
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

// ---------------------------------------------------------------------------
// Render/input loop
// ---------------------------------------------------------------------------

fn run_loop(
    shutdown: &Arc<AtomicBool>,
    sampler: &mut SystemSampler,
    profiler: &mut Profiler,
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    interval: Duration,
) -> Result<()> {
    // First sample immediately: it seeds the delta baselines and gives the
    // first frame data instead of an empty screen.
    app.update_frame(sampler.sample(Instant::now(), profiler));
    let mut last_sample = Instant::now();
    terminal
        .draw(|frame| app.render(frame))
        .context("failed to draw frame")?;

    loop {
        if shutdown.load(Ordering::Relaxed) || app.should_quit {
            break;
        }

        let elapsed = last_sample.elapsed();
        let poll_timeout = if elapsed >= interval {
            Duration::ZERO
        } else {
            EVENT_POLL_TIMEOUT.min(interval - elapsed)
        };

        let mut needs_redraw = false;

        // crossterm assembles multi-byte escape sequences into one event, so
        // arrow keys arrive whole rather than as a stray Esc plus garbage.
        if event::poll(poll_timeout).context("failed to poll events")?
            && let Event::Key(key) = event::read().context("failed to read event")?
            && key.kind == KeyEventKind::Press
        {
            let action = handle_key(key, app.picker.is_some());
            if let Some(applied) = app.handle_action(action) {
                // Persistence failure must not take down a running monitor.
                let _ = config::save_theme_name(applied);
            }
            needs_redraw = true;
        }

        if last_sample.elapsed() >= interval {
            let now = Instant::now();
            app.update_frame(sampler.sample(now, profiler));
            profiler.maybe_flush(now);
            last_sample = now;
            needs_redraw = true;
        }

        if needs_redraw {
            terminal
                .draw(|frame| app.render(frame))
                .context("failed to draw frame")?;
        }
    }

    Ok(())
}
