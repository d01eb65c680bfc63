use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use crossterm::event::{self, Event};
use grid_snake::config::{EngineConfig, INPUT_POLL_INTERVAL};
use grid_snake::engine::{Engine, RunSummary};
use grid_snake::events::{EventKind, GameEvent};
use grid_snake::input::{Steering, input_for_key};
use grid_snake::renderer::HudInfo;
use grid_snake::terminal_runtime::TerminalSession;
use tracing::{Level, info};

#[derive(Debug, Parser)]
#[command(name = "grid-snake")]
#[command(version, about = "Turn-based grid Snake")]
struct Cli {
    /// Front end to drive the engine with
    #[arg(long, value_enum, default_value_t = Mode::Terminal)]
    mode: Mode,

    /// JSON file with engine settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid height in cells
    #[arg(long)]
    rows: Option<u16>,

    /// Grid width in cells
    #[arg(long)]
    cols: Option<u16>,

    /// End the run when the snake hits the grid edge
    #[arg(long, conflicts_with = "wrap")]
    borders: bool,

    /// Wrap around grid edges
    #[arg(long)]
    wrap: bool,

    /// Initial delay between ticks in milliseconds
    #[arg(long = "tick-rate")]
    tick_rate: Option<u64>,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Stop a headless run after this many ticks (at least one)
    #[arg(
        long = "max-ticks",
        default_value_t = 200,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    max_ticks: u64,

    /// Raise log verbosity (headless mode)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Play in the terminal with arrow keys or WASD
    Terminal,
    /// Run without a UI, log events to stderr and print the result as JSON
    Headless,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = engine_config(&cli)?;
    let engine = match cli.seed {
        Some(seed) => Engine::new_with_seed(config, seed)?,
        None => Engine::new(config)?,
    };

    let summary = match cli.mode {
        Mode::Terminal => run_terminal(engine)?,
        Mode::Headless => run_headless(engine, cli.max_ticks, cli.verbose)?,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    if let Some(tick_rate) = cli.tick_rate {
        config.tick_rate_ms = tick_rate;
    }
    if cli.borders {
        config.borders = true;
    }
    if cli.wrap {
        config.borders = false;
    }

    config.validate()?;
    Ok(config)
}

fn run_headless(mut engine: Engine, max_ticks: u64, verbose: u8) -> Result<RunSummary> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let steering = engine.steering();
    engine.subscribe(EventKind::Tick, move |event, _| {
        if let GameEvent::Tick(tick) = event {
            if tick + 1 >= max_ticks {
                steering.stop();
            }
        }
    });
    engine.subscribe(EventKind::GameOver, |_, state| {
        info!(score = state.score(), "game over");
    });

    Ok(engine.run()?)
}

fn run_terminal(mut engine: Engine) -> Result<RunSummary> {
    let session = TerminalSession::enter(engine.state().grid()).context("opening the terminal")?;
    let session = Rc::new(RefCell::new(session));
    let hud = Rc::new(RefCell::new(HudInfo::default()));
    let draw_error = Rc::new(RefCell::new(None::<io::Error>));
    let steering = engine.steering();

    {
        let hud = Rc::clone(&hud);
        engine.subscribe(EventKind::Tick, move |event, _| {
            if let GameEvent::Tick(tick) = event {
                hud.borrow_mut().tick = *tick;
            }
        });
    }
    {
        let hud = Rc::clone(&hud);
        engine.subscribe(EventKind::GameOver, move |_, _| {
            hud.borrow_mut().game_over = true;
        });
    }
    for kind in [EventKind::GameStart, EventKind::Move, EventKind::GameEnd] {
        let session = Rc::clone(&session);
        let hud = Rc::clone(&hud);
        let draw_error = Rc::clone(&draw_error);
        let steering = steering.clone();
        engine.subscribe(kind, move |_, state| {
            if let Err(error) = session.borrow_mut().draw(state, *hud.borrow()) {
                draw_error.borrow_mut().get_or_insert(error);
                steering.stop();
            }
        });
    }

    let input = spawn_input_thread(steering.clone());
    let summary = engine.run();

    // Keep the final board on screen until the player quits.
    while !steering.stop_requested() {
        thread::sleep(INPUT_POLL_INTERVAL);
    }
    let input_result = input.join();
    drop(engine);
    drop(session);

    if let Some(error) = draw_error.borrow_mut().take() {
        return Err(error).context("drawing the board");
    }
    match input_result {
        Ok(result) => result.context("reading keyboard input")?,
        Err(_) => anyhow::bail!("input thread panicked"),
    }

    Ok(summary?)
}

fn spawn_input_thread(steering: Steering) -> thread::JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        let result = forward_keys(&steering);
        steering.stop();
        result
    })
}

fn forward_keys(steering: &Steering) -> io::Result<()> {
    while !steering.stop_requested() {
        if !event::poll(INPUT_POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if let Some(input) = input_for_key(key) {
                steering.send(input);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn zero_max_ticks_is_rejected() {
        assert!(Cli::try_parse_from(["grid-snake", "--mode", "headless", "--max-ticks", "0"]).is_err());
    }

    #[test]
    fn max_ticks_defaults_and_accepts_one() {
        let cli = Cli::try_parse_from(["grid-snake"]).expect("defaults parse");
        assert_eq!(cli.max_ticks, 200);

        let cli = Cli::try_parse_from(["grid-snake", "--max-ticks", "1"]).expect("one tick parses");
        assert_eq!(cli.max_ticks, 1);
    }

    #[test]
    fn borders_and_wrap_conflict() {
        assert!(Cli::try_parse_from(["grid-snake", "--borders", "--wrap"]).is_err());
    }
}
