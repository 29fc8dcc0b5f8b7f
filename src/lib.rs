//! # Connect Four Engine
//!
//! Rules engine for a Connect Four style game. A [`game::GameEngine`] owns a
//! width x height board, the turn order, and the active column. Callers move
//! or set the selection and confirm placements; the engine drops the piece,
//! checks for four in a row and for a full board, and notifies observers
//! synchronously.
//!
//! ## Modules
//!
//! - [`game`]: Board, players, engine, and engine notifications
//! - [`script`]: Line-oriented command scripts for headless replays
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod config;
pub mod error;
pub mod game;
pub mod script;
