use std::fmt;
use std::sync::mpsc::Sender;

use super::board::Position;
use super::player::PlayerId;

/// Notification emitted by the engine while a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    CellOccupied {
        position: Position,
        occupant: PlayerId,
    },
    /// `target` is where the next piece in `column` would land, `None` when full
    ActiveColumnChanged {
        column: usize,
        target: Option<Position>,
    },
    ConnectionFound {
        winner: PlayerId,
    },
    BoardFilled,
    TurnChanged {
        next: PlayerId,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::CellOccupied { position, occupant } => {
                write!(f, "{occupant} occupied {position}")
            }
            GameEvent::ActiveColumnChanged {
                column,
                target: Some(target),
            } => write!(f, "column {column} active, next cell {target}"),
            GameEvent::ActiveColumnChanged { column, target: None } => {
                write!(f, "column {column} active, column is full")
            }
            GameEvent::ConnectionFound { winner } => write!(f, "{winner} connected four"),
            GameEvent::BoardFilled => write!(f, "board filled"),
            GameEvent::TurnChanged { next } => write!(f, "{next} to move"),
        }
    }
}

/// Receives engine notifications synchronously, inside the triggering command.
///
/// Implementors either override [`GameObserver::on_event`] to see every event
/// as a value, or the individual callbacks they care about. Every callback
/// defaults to doing nothing.
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::CellOccupied { position, occupant } => {
                self.on_cell_occupied(position, occupant)
            }
            GameEvent::ActiveColumnChanged { column, target } => {
                self.on_active_column_changed(column, target)
            }
            GameEvent::ConnectionFound { winner } => self.on_connection_found(winner),
            GameEvent::BoardFilled => self.on_board_filled(),
            GameEvent::TurnChanged { next } => self.on_turn_changed(next),
        }
    }

    fn on_cell_occupied(&mut self, _position: Position, _occupant: PlayerId) {}

    fn on_active_column_changed(&mut self, _column: usize, _target: Option<Position>) {}

    fn on_connection_found(&mut self, _winner: PlayerId) {}

    fn on_board_filled(&mut self) {}

    fn on_turn_changed(&mut self, _next: PlayerId) {}
}

/// Forwards every event into a channel. A dropped receiver is not an error;
/// the events are discarded.
impl GameObserver for Sender<GameEvent> {
    fn on_event(&mut self, event: &GameEvent) {
        let _ = self.send(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[derive(Default)]
    struct Counter {
        occupied: usize,
        wins: Vec<PlayerId>,
        fills: usize,
    }

    impl GameObserver for Counter {
        fn on_cell_occupied(&mut self, _position: Position, _occupant: PlayerId) {
            self.occupied += 1;
        }

        fn on_connection_found(&mut self, winner: PlayerId) {
            self.wins.push(winner);
        }

        fn on_board_filled(&mut self) {
            self.fills += 1;
        }
    }

    #[test]
    fn test_on_event_dispatches_to_callbacks() {
        let mut counter = Counter::default();
        counter.on_event(&GameEvent::CellOccupied {
            position: Position::new(0, 0),
            occupant: PlayerId(1),
        });
        counter.on_event(&GameEvent::ConnectionFound { winner: PlayerId(1) });
        counter.on_event(&GameEvent::BoardFilled);
        counter.on_event(&GameEvent::TurnChanged { next: PlayerId(0) });

        assert_eq!(counter.occupied, 1);
        assert_eq!(counter.wins, vec![PlayerId(1)]);
        assert_eq!(counter.fills, 1);
    }

    #[test]
    fn test_sender_forwards_events() {
        let (mut tx, rx) = mpsc::channel();
        tx.on_event(&GameEvent::BoardFilled);
        assert_eq!(rx.try_recv(), Ok(GameEvent::BoardFilled));
    }

    #[test]
    fn test_sender_with_dropped_receiver_is_silent() {
        let (mut tx, rx) = mpsc::channel();
        drop(rx);
        tx.on_event(&GameEvent::BoardFilled);
    }

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::CellOccupied {
            position: Position::new(2, 0),
            occupant: PlayerId(1),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"event":"cell_occupied","position":{"col":2,"row":0},"occupant":1}"#
        );
    }

    #[test]
    fn test_event_display() {
        let event = GameEvent::ActiveColumnChanged {
            column: 3,
            target: None,
        };
        assert_eq!(event.to_string(), "column 3 active, column is full");
    }
}
