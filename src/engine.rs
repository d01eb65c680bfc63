use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::{EngineConfig, STEERING_QUEUE_DEPTH};
use crate::error::{ConfigError, EngineError, GridFullError};
use crate::events::{EventBus, EventKind, GameEvent, ListenerId};
use crate::food::place_food;
use crate::game::{Collision, GameState, NextMove};
use crate::input::{Direction, Steering};
use crate::snake::{Coordinate, Snake};

/// What a single processed tick did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    Moved,
    Ate,
    Blocked(Collision),
    /// A stop request ended the run before the tick was processed.
    Stopped,
}

/// Final figures of a finished run.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct RunSummary {
    pub score: u32,
    pub consumed: u32,
    pub final_tick: u64,
    pub length: usize,
    pub elapsed_ms: u64,
}

/// Snake state machine driven by a fixed-delay tick loop.
#[derive(Debug)]
pub struct Engine {
    state: GameState,
    events: EventBus,
    rng: StdRng,
    locked: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    inbox: Receiver<Direction>,
    outbox: SyncSender<Direction>,
    next_tick: u64,
    start: Option<Instant>,
    end: Option<u64>,
}

impl Engine {
    /// Creates an engine with the starting snake and an entropy-seeded RNG.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a deterministic engine for tests and reproducible runs.
    pub fn new_with_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let (outbox, inbox) = mpsc::sync_channel(STEERING_QUEUE_DEPTH);
        let snake = Snake::starting(config.grid());

        Ok(Self {
            state: GameState::new(&config, snake),
            events: EventBus::new(),
            rng,
            locked: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            inbox,
            outbox,
            next_tick: 0,
            start: None,
            end: None,
        })
    }

    /// Replaces the starting snake with explicit segments (first is head).
    pub fn with_body(
        mut self,
        segments: Vec<Coordinate>,
        heading: Direction,
    ) -> Result<Self, ConfigError> {
        let snake = Snake::from_segments(segments, heading, self.state.grid())?;
        self.state.replace_snake(snake);
        Ok(self)
    }

    /// Read-only view handed to renderers.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn rows(&self) -> u16 {
        self.state.rows()
    }

    #[must_use]
    pub fn cols(&self) -> u16 {
        self.state.cols()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.state.score()
    }

    #[must_use]
    pub fn consumed(&self) -> u32 {
        self.state.consumed()
    }

    #[must_use]
    pub fn heading(&self) -> Direction {
        self.state.heading()
    }

    #[must_use]
    pub fn tick_rate(&self) -> Duration {
        self.state.tick_rate()
    }

    #[must_use]
    pub fn is_food_at(&self, row: i32, col: i32) -> bool {
        self.state.is_food_at(row, col)
    }

    #[must_use]
    pub fn is_tail_at(&self, row: i32, col: i32) -> bool {
        self.state.is_tail_at(row, col)
    }

    #[must_use]
    pub fn next_coordinate(&self) -> NextMove {
        self.state.next_coordinate()
    }

    /// Turns the snake. Ignored while a tick is in progress or when the
    /// request is not a perpendicular turn.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.is_locked() {
            return;
        }

        if self.state.turn(direction) {
            trace!(?direction, "heading changed");
        }
    }

    /// Switches between wall collisions (`true`) and wrap-around (`false`).
    pub fn set_borders(&mut self, borders: bool) {
        self.state.set_borders(borders);
    }

    /// Puts food on a random free cell.
    pub fn place_food(&mut self) -> Result<Coordinate, GridFullError> {
        let food = place_food(&mut self.rng, self.state.grid(), self.state.snake())?;
        self.state.set_food(Some(food));
        Ok(food)
    }

    /// Puts food on a chosen cell. Refused when the cell is outside the grid or under the snake.
    pub fn place_food_at(&mut self, coordinate: Coordinate) -> bool {
        if !coordinate.is_within_bounds(self.state.grid()) || self.state.snake().occupies(coordinate)
        {
            return false;
        }

        self.state.set_food(Some(coordinate));
        true
    }

    pub fn clear_food(&mut self) {
        self.state.set_food(None);
    }

    /// Returns a handle for an input collaborator, usable from another thread.
    #[must_use]
    pub fn steering(&self) -> Steering {
        Steering::new(
            self.outbox.clone(),
            Arc::clone(&self.locked),
            Arc::clone(&self.stop),
        )
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent, &GameState) + 'static,
    {
        self.events.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    /// Tick index the run ended on, once it has ended.
    #[must_use]
    pub fn end_tick(&self) -> Option<u64> {
        self.end
    }

    /// Places the initial food.
    pub fn setup(&mut self) -> Result<(), GridFullError> {
        self.place_food().map(|_| ())
    }

    /// Runs one loop iteration without pausing.
    ///
    /// Applies at most one queued heading request, then processes the move
    /// with the lock held.
    pub fn tick(&mut self) -> Result<TickOutcome, EngineError> {
        if self.end.is_some() {
            return Err(EngineError::AlreadyFinished);
        }

        if self.stop.load(Ordering::Acquire) {
            self.finish(self.last_tick());
            return Ok(TickOutcome::Stopped);
        }

        if let Ok(direction) = self.inbox.try_recv() {
            self.set_direction(direction);
        }

        let tick = self.next_tick;
        self.next_tick += 1;

        self.lock();
        trace!(tick, "tick");
        self.events.emit(GameEvent::Tick(tick), &self.state);
        let outcome = self.on_tick(tick);
        self.unlock();

        let outcome = outcome.inspect_err(|_| self.finish(tick))?;
        if self.stop.load(Ordering::Acquire) {
            self.finish(tick);
        }

        Ok(outcome)
    }

    fn on_tick(&mut self, tick: u64) -> Result<TickOutcome, GridFullError> {
        let next = match self.state.next_coordinate() {
            NextMove::Open(next) => next,
            NextMove::Blocked(collision) => {
                debug!(tick, ?collision, "move blocked");
                self.finish(tick);
                self.events.emit(GameEvent::GameOver, &self.state);
                return Ok(TickOutcome::Blocked(collision));
            }
        };

        let ate = self.state.advance(next);
        if ate {
            self.level_up();
            self.place_food()?;
        }

        self.events.emit(GameEvent::Move, &self.state);
        Ok(if ate {
            TickOutcome::Ate
        } else {
            TickOutcome::Moved
        })
    }

    fn level_up(&mut self) {
        let tick_rate = self.state.speed_up();
        debug!(
            consumed = self.state.consumed(),
            ?tick_rate,
            "level up"
        );
        self.events.emit(GameEvent::LevelUp, &self.state);
    }

    /// Plays the run to its end, sleeping the current tick rate between ticks.
    pub fn run(&mut self) -> Result<RunSummary, EngineError> {
        self.run_with_pacer(thread::sleep)
    }

    /// Same loop as [`Engine::run`] with a caller-supplied pause between ticks.
    pub fn run_with_pacer<P>(&mut self, mut pacer: P) -> Result<RunSummary, EngineError>
    where
        P: FnMut(Duration),
    {
        if self.end.is_some() {
            return Err(EngineError::AlreadyFinished);
        }

        self.start = Some(Instant::now());
        info!(
            rows = self.state.rows(),
            cols = self.state.cols(),
            borders = self.state.borders(),
            "game start"
        );
        self.events.emit(GameEvent::GameStart, &self.state);

        let result = self.drive(&mut pacer);

        let final_tick = self.end.unwrap_or_else(|| self.last_tick());
        self.events.emit(GameEvent::GameEnd(final_tick), &self.state);
        result?;

        let summary = self.summary(final_tick);
        info!(
            score = summary.score,
            consumed = summary.consumed,
            final_tick,
            "game end"
        );
        Ok(summary)
    }

    fn drive<P>(&mut self, pacer: &mut P) -> Result<(), EngineError>
    where
        P: FnMut(Duration),
    {
        if let Err(error) = self.setup() {
            self.finish(0);
            return Err(error.into());
        }

        loop {
            self.tick()?;
            if self.is_finished() {
                return Ok(());
            }
            pacer(self.state.tick_rate());
        }
    }

    fn summary(&self, final_tick: u64) -> RunSummary {
        let elapsed = self.start.map_or(Duration::ZERO, |start| start.elapsed());

        RunSummary {
            score: self.state.score(),
            consumed: self.state.consumed(),
            final_tick,
            length: self.state.snake().len(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn last_tick(&self) -> u64 {
        self.next_tick.saturating_sub(1)
    }

    fn finish(&mut self, tick: u64) {
        self.end.get_or_insert(tick);
    }

    fn lock(&self) {
        self.locked.store(true, Ordering::Release);
    }

    fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}
