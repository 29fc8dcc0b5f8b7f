//! Core Connect Four rules: board representation, players, the game engine
//! with its selection and placement commands, and engine notifications.

mod board;
mod engine;
mod events;
mod player;

pub use board::{Board, Cell, Position};
pub use engine::{
    EngineError, GameEngine, GameOutcome, GamePhase, MoveError, Placement, CONNECT,
};
pub use events::{GameEvent, GameObserver};
pub use player::{PlayerId, PlayerRoster};
