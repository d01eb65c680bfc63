use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Deserialize, Serialize};

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Returns the two headings reachable from `self` in one turn.
    #[must_use]
    pub fn allowed_turns(self) -> [Self; 2] {
        match self {
            Self::Up | Self::Down => [Self::Left, Self::Right],
            Self::Left | Self::Right => [Self::Up, Self::Down],
        }
    }
}

/// High-level input events produced by an input collaborator.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Direction(Direction),
    Quit,
}

/// Returns whether a heading change is legal: only perpendicular turns are.
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    current.allowed_turns().contains(&next)
}

/// Maps a terminal key press to a game input.
#[must_use]
pub fn input_for_key(key: KeyEvent) -> Option<GameInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W') => Some(GameInput::Direction(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s' | 'S') => Some(GameInput::Direction(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a' | 'A') => Some(GameInput::Direction(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d' | 'D') => {
            Some(GameInput::Direction(Direction::Right))
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(GameInput::Quit)
        }
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(GameInput::Quit),
        _ => None,
    }
}

/// Cloneable handle an input collaborator uses to reach a running engine.
///
/// Heading requests are queued and applied by the engine at the start of a
/// tick, one per tick. Requests made while a tick is being processed, or once
/// the queue is full, are dropped.
#[derive(Debug, Clone)]
pub struct Steering {
    sender: SyncSender<Direction>,
    locked: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl Steering {
    pub(crate) fn new(
        sender: SyncSender<Direction>,
        locked: Arc<AtomicBool>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            sender,
            locked,
            stop,
        }
    }

    /// Queues a heading request. Returns `false` when it was dropped.
    pub fn steer(&self, direction: Direction) -> bool {
        if self.locked.load(Ordering::Acquire) {
            return false;
        }

        self.sender.try_send(direction).is_ok()
    }

    /// Asks the engine to end the run before its next pause.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Routes one input event. Returns `false` when a heading request was dropped.
    pub fn send(&self, input: GameInput) -> bool {
        match input {
            GameInput::Direction(direction) => self.steer(direction),
            GameInput::Quit => {
                self.stop();
                true
            }
        }
    }

    /// Returns true once a stop has been requested.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;

    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

    use super::{Direction, GameInput, Steering, direction_change_is_valid, input_for_key};

    #[test]
    fn opposite_direction_is_correct() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
    }

    #[test]
    fn only_perpendicular_turns_are_valid() {
        for current in Direction::ALL {
            assert!(!direction_change_is_valid(current, current.opposite()));
            assert!(!direction_change_is_valid(current, current));
            for turn in current.allowed_turns() {
                assert!(direction_change_is_valid(current, turn));
                assert_ne!(turn, current.opposite());
            }
        }
    }

    #[test]
    fn arrow_and_wasd_keys_map_to_directions() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(
            input_for_key(press(KeyCode::Up)),
            Some(GameInput::Direction(Direction::Up))
        );
        assert_eq!(
            input_for_key(press(KeyCode::Char('a'))),
            Some(GameInput::Direction(Direction::Left))
        );
        assert_eq!(input_for_key(press(KeyCode::Char('q'))), Some(GameInput::Quit));
        assert_eq!(input_for_key(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut release = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;

        assert_eq!(input_for_key(release), None);
    }

    #[test]
    fn steering_drops_requests_while_locked_or_full() {
        let (sender, receiver) = mpsc::sync_channel(1);
        let locked = Arc::new(AtomicBool::new(false));
        let steering = Steering::new(sender, Arc::clone(&locked), Arc::new(AtomicBool::new(false)));

        locked.store(true, Ordering::Release);
        assert!(!steering.steer(Direction::Left));

        locked.store(false, Ordering::Release);
        assert!(steering.steer(Direction::Left));
        assert!(!steering.steer(Direction::Right));

        assert_eq!(receiver.try_recv(), Ok(Direction::Left));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn quit_input_requests_stop() {
        let (sender, _receiver) = mpsc::sync_channel(1);
        let steering = Steering::new(
            sender,
            Arc::new(AtomicBool::new(false)),
            Arc::new(AtomicBool::new(false)),
        );

        assert!(!steering.stop_requested());
        steering.send(GameInput::Quit);
        assert!(steering.stop_requested());
    }
}
