use std::collections::HashMap;
use std::fmt;

use crate::game::GameState;

/// Notification names a listener can subscribe to.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EventKind {
    GameStart,
    Tick,
    Move,
    LevelUp,
    GameOver,
    GameEnd,
}

impl EventKind {
    /// Returns the wire name of the notification.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GameStart => "gamestart",
            Self::Tick => "tick",
            Self::Move => "move",
            Self::LevelUp => "levelup",
            Self::GameOver => "gameover",
            Self::GameEnd => "gameend",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A notification together with its payload.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameEvent {
    GameStart,
    /// Tick index, starting at 0. Emitted before the tick is processed.
    Tick(u64),
    Move,
    LevelUp,
    GameOver,
    /// Index of the final tick.
    GameEnd(u64),
}

impl GameEvent {
    #[must_use]
    pub fn kind(self) -> EventKind {
        match self {
            Self::GameStart => EventKind::GameStart,
            Self::Tick(_) => EventKind::Tick,
            Self::Move => EventKind::Move,
            Self::LevelUp => EventKind::LevelUp,
            Self::GameOver => EventKind::GameOver,
            Self::GameEnd(_) => EventKind::GameEnd,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked with the event and a read-only view of the game.
pub type Listener = Box<dyn FnMut(&GameEvent, &GameState)>;

/// Registry of listeners per notification, kept in subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent, &GameState) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false when it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(index) = listeners.iter().position(|(existing, _)| *existing == id) {
                listeners.remove(index);
                return true;
            }
        }

        false
    }

    pub fn emit(&mut self, event: GameEvent, state: &GameState) {
        let Some(listeners) = self.listeners.get_mut(&event.kind()) else {
            return;
        };

        for (_, listener) in listeners.iter_mut() {
            listener(&event, state);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<_> = self
            .listeners
            .iter()
            .map(|(kind, listeners)| (kind.name(), listeners.len()))
            .collect();
        counts.sort_unstable();

        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::config::EngineConfig;
    use crate::game::GameState;
    use crate::snake::Snake;

    use super::{EventBus, EventKind, GameEvent};

    fn state() -> GameState {
        let config = EngineConfig::default();
        GameState::new(&config, Snake::starting(config.grid()))
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        for label in ["first", "second"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(EventKind::Tick, move |event, _| {
                seen.borrow_mut().push((label, *event));
            });
        }

        bus.emit(GameEvent::Tick(3), &state());

        assert_eq!(
            *seen.borrow(),
            vec![("first", GameEvent::Tick(3)), ("second", GameEvent::Tick(3))]
        );
    }

    #[test]
    fn events_only_reach_their_own_kind() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&hits);
        bus.subscribe(EventKind::LevelUp, move |_, _| *counter.borrow_mut() += 1);

        bus.emit(GameEvent::Move, &state());
        bus.emit(GameEvent::LevelUp, &state());

        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&hits);
        let id = bus.subscribe(EventKind::Move, move |_, _| *counter.borrow_mut() += 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));

        bus.emit(GameEvent::Move, &state());
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn listeners_read_the_state_they_are_given() {
        let rows = Rc::new(RefCell::new(None));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&rows);
        bus.subscribe(EventKind::GameStart, move |_, state| {
            *sink.borrow_mut() = Some((state.rows(), state.cols()));
        });

        bus.emit(GameEvent::GameStart, &state());

        assert_eq!(*rows.borrow(), Some((16, 32)));
    }

    #[test]
    fn event_names_match_wire_format() {
        assert_eq!(EventKind::GameStart.to_string(), "gamestart");
        assert_eq!(GameEvent::GameEnd(4).kind().name(), "gameend");
    }
}
