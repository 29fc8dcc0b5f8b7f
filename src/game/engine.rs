use std::fmt;

use tracing::{debug, info};

use super::board::{Board, Position};
use super::events::{GameEvent, GameObserver};
use super::player::{PlayerId, PlayerRoster};
use crate::config::AppConfig;

/// Pieces in a row needed to win
pub const CONNECT: usize = 4;

/// One direction per axis; the opposite direction is walked as well.
const AXES: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Idle,
    Active,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(PlayerId),
    Draw,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Winner(player) => write!(f, "{player} won!"),
            GameOutcome::Draw => write!(f, "Tie"),
        }
    }
}

/// Why a command was rejected. A rejected command notifies nobody and changes
/// nothing, except that [`MoveError::InvalidCell`] clears the selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("game has not started")]
    NotActive,

    #[error("game has already started")]
    AlreadyStarted,

    #[error("game is over")]
    GameOver,

    #[error("no column selected")]
    NoSelection,

    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("cell {0} is not on the board")]
    InvalidCell(usize),

    #[error("{0} is not in this game")]
    UnknownPlayer(PlayerId),

    #[error("{player} tried to move, but it is {expected}'s turn")]
    OutOfTurn { player: PlayerId, expected: PlayerId },
}

/// Errors raised while building an engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("board dimensions must be non-zero and at most {max} cells (got {width}x{height})", max = Board::MAX_CELLS)]
    InvalidDimensions { width: usize, height: usize },

    #[error("a game needs at least one player")]
    NoPlayers,

    #[error("first player index {index} is out of range for {count} players")]
    InvalidFirstPlayer { index: usize, count: usize },
}

/// A piece that was committed to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: Position,
    pub player: PlayerId,
    /// Set when this placement ended the game
    pub outcome: Option<GameOutcome>,
}

/// One game session: board, turn order, column selection, and outcome.
///
/// Phases only move forward (`Idle -> Active -> Over`). To play again, build
/// a new engine.
pub struct GameEngine {
    board: Board,
    players: PlayerRoster,
    current: usize,
    turn: PlayerId,
    active_column: Option<usize>,
    phase: GamePhase,
    outcome: Option<GameOutcome>,
    observers: Vec<Box<dyn GameObserver + Send>>,
}

impl GameEngine {
    /// Create an idle engine with an empty `width` x `height` board. The first
    /// roster entry moves first.
    pub fn new(width: usize, height: usize, players: PlayerRoster) -> Result<Self, EngineError> {
        let board =
            Board::new(width, height).ok_or(EngineError::InvalidDimensions { width, height })?;
        let turn = players.get(0).ok_or(EngineError::NoPlayers)?;

        Ok(GameEngine {
            board,
            players,
            current: 0,
            turn,
            active_column: None,
            phase: GamePhase::Idle,
            outcome: None,
            observers: Vec::new(),
        })
    }

    /// Build an engine from the `[board]` and `[players]` config sections
    pub fn from_config(config: &AppConfig) -> Result<Self, EngineError> {
        GameEngine::new(
            config.board.width,
            config.board.height,
            PlayerRoster::with_players(config.players.count),
        )?
        .with_first_player(config.players.first)
    }

    /// Choose which roster entry opens the game
    pub fn with_first_player(mut self, index: usize) -> Result<Self, EngineError> {
        self.turn = self
            .players
            .get(index)
            .ok_or(EngineError::InvalidFirstPlayer {
                index,
                count: self.players.len(),
            })?;
        self.current = index;
        Ok(self)
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn subscribe(&mut self, observer: impl GameObserver + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Move from `Idle` to `Active`
    pub fn start(&mut self) -> Result<(), MoveError> {
        match self.phase {
            GamePhase::Idle => {
                self.phase = GamePhase::Active;
                info!(
                    width = self.board.width(),
                    height = self.board.height(),
                    players = self.players.len(),
                    first = %self.current_player(),
                    "game started"
                );
                Ok(())
            }
            GamePhase::Active => Err(MoveError::AlreadyStarted),
            GamePhase::Over => Err(MoveError::GameOver),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &PlayerRoster {
        &self.players
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::Over
    }

    /// Position in turn order of the player to move
    pub fn current_player_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> PlayerId {
        self.turn
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn active_column(&self) -> Option<usize> {
        self.active_column
    }

    /// Where a piece dropped into the active column would land
    pub fn target_cell(&self) -> Option<Position> {
        self.active_column
            .and_then(|col| self.board.drop_target(col))
    }

    /// Shift the active column by `direction`, wrapping around the board
    /// edges. With nothing selected the shift starts from just left of
    /// column 0. Zero does nothing.
    pub fn move_selection(&mut self, direction: isize) -> Result<Option<Position>, MoveError> {
        self.ensure_selectable()?;
        if direction == 0 {
            return Ok(self.target_cell());
        }

        let width = self.board.width() as isize;
        let current = self.active_column.map_or(-1, |col| col as isize);
        let mut next = current.saturating_add(direction);
        if next < 0 {
            next = width - 1;
        }
        Ok(self.activate((next % width) as usize))
    }

    /// Make `col mod width` the active column
    pub fn select_column(&mut self, col: usize) -> Result<Option<Position>, MoveError> {
        self.ensure_selectable()?;
        Ok(self.activate(col % self.board.width()))
    }

    /// Make the column holding the cell at linear index `index` active.
    ///
    /// This is how a pointer over a cell selects its column. An index past the
    /// end of the board clears the selection, so a pointer leaving the grid
    /// disarms the next drop. Nobody is notified in that case.
    pub fn select_cell(&mut self, index: usize) -> Result<Option<Position>, MoveError> {
        self.ensure_selectable()?;
        let Some(position) = self.board.position_of(index) else {
            self.active_column = None;
            let err = MoveError::InvalidCell(index);
            debug!(error = %err, "selection cleared");
            return Err(err);
        };
        Ok(self.activate(position.col))
    }

    /// Drop a piece for `player` into the active column.
    ///
    /// On success the cell is occupied and observers see, in order: the
    /// occupied cell, then either the win or the full board, or otherwise
    /// the next player's turn.
    pub fn confirm_placement(&mut self, player: PlayerId) -> Result<Placement, MoveError> {
        self.place(player)
            .inspect_err(|e| debug!(%player, error = %e, "placement rejected"))
    }

    /// Drop a piece for whoever is to move
    pub fn confirm_current(&mut self) -> Result<Placement, MoveError> {
        self.confirm_placement(self.current_player())
    }

    fn place(&mut self, player: PlayerId) -> Result<Placement, MoveError> {
        match self.phase {
            GamePhase::Idle => return Err(MoveError::NotActive),
            GamePhase::Over => return Err(MoveError::GameOver),
            GamePhase::Active => {}
        }
        let column = self.active_column.ok_or(MoveError::NoSelection)?;
        let index = self
            .players
            .find(player)
            .ok_or(MoveError::UnknownPlayer(player))?;
        if index != self.current {
            return Err(MoveError::OutOfTurn {
                player,
                expected: self.current_player(),
            });
        }
        let position = self
            .board
            .drop_target(column)
            .ok_or(MoveError::ColumnFull { column })?;

        self.board.set(position.col, position.row, player);
        debug!(%player, %position, "cell occupied");
        self.emit(GameEvent::CellOccupied {
            position,
            occupant: player,
        });

        let outcome = if self.connects(position, player) {
            Some(GameOutcome::Winner(player))
        } else if self.board.is_full() {
            Some(GameOutcome::Draw)
        } else {
            None
        };

        match outcome {
            Some(outcome) => self.finish(outcome),
            None => self.advance_turn(),
        }

        Ok(Placement {
            position,
            player,
            outcome,
        })
    }

    /// Check whether the piece at `position` completes a run of `CONNECT`
    fn connects(&self, position: Position, player: PlayerId) -> bool {
        AXES.iter().any(|&(dc, dr)| {
            let run = 1
                + self.board.count_from(position, dc, dr, player)
                + self.board.count_from(position, -dc, -dr, player);
            run >= CONNECT
        })
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.phase = GamePhase::Over;
        self.outcome = Some(outcome);
        self.active_column = None;
        match outcome {
            GameOutcome::Winner(winner) => {
                info!(%winner, "connection found");
                self.emit(GameEvent::ConnectionFound { winner });
            }
            GameOutcome::Draw => {
                info!("board filled without a winner");
                self.emit(GameEvent::BoardFilled);
            }
        }
    }

    /// Hand the turn to the next roster entry, wrapping to the first
    fn advance_turn(&mut self) {
        let index = (self.current + 1) % self.players.len();
        if let Some(next) = self.players.get(index) {
            self.current = index;
            self.turn = next;
            self.emit(GameEvent::TurnChanged { next });
        }
    }

    fn ensure_selectable(&self) -> Result<(), MoveError> {
        if self.phase == GamePhase::Over {
            return Err(MoveError::GameOver);
        }
        Ok(())
    }

    fn activate(&mut self, column: usize) -> Option<Position> {
        self.active_column = Some(column);
        let target = self.board.drop_target(column);
        debug!(column, ?target, "active column changed");
        self.emit(GameEvent::ActiveColumnChanged { column, target });
        target
    }

    fn emit(&mut self, event: GameEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("board", &self.board)
            .field("players", &self.players)
            .field("current", &self.current)
            .field("turn", &self.turn)
            .field("active_column", &self.active_column)
            .field("phase", &self.phase)
            .field("outcome", &self.outcome)
            .field("observers", &self.observers.len())
            .finish()
    }
}
