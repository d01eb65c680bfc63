//! Turn-based grid Snake.
//!
//! [`engine::Engine`] owns the game state and drives it from a fixed-delay tick
//! loop. Presentation and input live outside the engine: renderers subscribe to
//! [`events::EventKind`] notifications and read a [`game::GameState`] view,
//! input handlers talk to the engine through an [`input::Steering`] handle.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod food;
pub mod game;
pub mod input;
pub mod renderer;
pub mod snake;
pub mod terminal_runtime;
