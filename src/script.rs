//! Line-oriented command scripts for driving an engine without a UI.
//!
//! Each line holds one command; blank lines and `#` comments are skipped.
//!
//! | Command          | Effect                                      |
//! |------------------|---------------------------------------------|
//! | `left` / `right` | move the selection one column               |
//! | `move <delta>`   | move the selection by a signed delta        |
//! | `select <col>`   | select a column                             |
//! | `cell <index>`   | select the column of a linear cell index    |
//! | `drop`           | place for the player to move                |
//! | `drop <player>`  | place for a specific player                 |
//! | `board`          | print the board                             |

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver};

use tracing::{debug, warn};

use crate::error::ScriptError;
use crate::game::{GameEngine, GameEvent, MoveError, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(isize),
    Select(usize),
    Cell(usize),
    Drop(Option<PlayerId>),
    Board,
}

/// A command together with the script line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse one line. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Command>, ScriptError> {
    let text = text.split('#').next().unwrap_or("").trim();
    let mut words = text.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let bad = |expected: &'static str| ScriptError::BadArgument {
        line,
        command: name.to_string(),
        expected,
    };

    let command = match (name.to_ascii_lowercase().as_str(), arg) {
        ("left", None) => Command::Move(-1),
        ("right", None) => Command::Move(1),
        ("move", Some(a)) => Command::Move(a.parse().map_err(|_| bad("a signed delta"))?),
        ("move", None) => return Err(bad("a signed delta")),
        ("select", Some(a)) => Command::Select(a.parse().map_err(|_| bad("a column number"))?),
        ("select", None) => return Err(bad("a column number")),
        ("cell", Some(a)) => Command::Cell(a.parse().map_err(|_| bad("a cell index"))?),
        ("cell", None) => return Err(bad("a cell index")),
        ("drop", None) => Command::Drop(None),
        ("drop", Some(a)) => Command::Drop(Some(PlayerId(
            a.parse().map_err(|_| bad("a player index"))?,
        ))),
        ("board", None) => Command::Board,
        ("left" | "right" | "board", Some(_)) => return Err(bad("no argument")),
        _ => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: name.to_string(),
            })
        }
    };

    if words.next().is_some() {
        return Err(bad("at most one argument"));
    }
    Ok(Some(command))
}

/// Parse a whole script. Line numbers start at 1.
pub fn parse_script(reader: impl BufRead) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut script = Vec::new();
    for (i, text) in reader.lines().enumerate() {
        let line = i + 1;
        if let Some(command) = parse_line(line, &text?)? {
            script.push(ScriptLine { line, command });
        }
    }
    Ok(script)
}

/// Runs scripts against an engine and writes what happens.
pub struct Replay {
    engine: GameEngine,
    events: Receiver<GameEvent>,
    format: OutputFormat,
}

impl Replay {
    /// Subscribe to `engine` and start the game
    pub fn new(mut engine: GameEngine, format: OutputFormat) -> Result<Self, MoveError> {
        let (tx, rx) = mpsc::channel();
        engine.subscribe(tx);
        engine.start()?;
        Ok(Replay {
            engine,
            events: rx,
            format,
        })
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Apply every command in order. Rejected commands are reported and
    /// skipped. Ends with a summary line.
    pub fn run<W: Write>(&mut self, script: &[ScriptLine], out: &mut W) -> Result<(), ScriptError> {
        for step in script {
            debug!(line = step.line, command = ?step.command, "applying command");
            let result = match step.command {
                Command::Board => {
                    self.write_board(out)?;
                    Ok(())
                }
                command => self.apply(command),
            };
            if let Err(e) = result {
                warn!(line = step.line, error = %e, "command rejected");
                self.write_rejected(step.line, &e, out)?;
            }
            self.write_events(out)?;
        }
        self.write_summary(out)?;
        Ok(())
    }

    fn apply(&mut self, command: Command) -> Result<(), MoveError> {
        match command {
            Command::Move(delta) => self.engine.move_selection(delta).map(|_| ()),
            Command::Select(col) => self.engine.select_column(col).map(|_| ()),
            Command::Cell(index) => self.engine.select_cell(index).map(|_| ()),
            Command::Drop(None) => self.engine.confirm_current().map(|_| ()),
            Command::Drop(Some(player)) => self.engine.confirm_placement(player).map(|_| ()),
            Command::Board => Ok(()),
        }
    }

    fn write_events<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        for event in self.events.try_iter() {
            match self.format {
                OutputFormat::Text => writeln!(out, "{event}")?,
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&event)?)?,
            }
        }
        Ok(())
    }

    fn write_rejected<W: Write>(
        &self,
        line: usize,
        error: &MoveError,
        out: &mut W,
    ) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(out, "line {line}: rejected: {error}"),
            OutputFormat::Json => writeln!(
                out,
                "{}",
                serde_json::json!({
                    "event": "rejected",
                    "line": line,
                    "error": error.to_string(),
                })
            ),
        }
    }

    fn write_board<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let board = self.engine.board();
        match self.format {
            OutputFormat::Text => write!(out, "{board}"),
            OutputFormat::Json => {
                let rows: Vec<String> = board.to_string().lines().map(str::to_string).collect();
                writeln!(
                    out,
                    "{}",
                    serde_json::json!({ "event": "board", "rows": rows })
                )
            }
        }
    }

    fn write_summary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let result = match self.engine.outcome() {
            Some(outcome) => outcome.to_string(),
            None => "in progress".to_string(),
        };
        match self.format {
            OutputFormat::Text => writeln!(out, "Result: {result}"),
            OutputFormat::Json => writeln!(
                out,
                "{}",
                serde_json::json!({
                    "event": "finished",
                    "phase": self.engine.phase(),
                    "result": result,
                })
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameOutcome, PlayerRoster};

    fn replay(width: usize, height: usize, format: OutputFormat) -> Replay {
        let engine = GameEngine::new(width, height, PlayerRoster::with_players(2)).unwrap();
        Replay::new(engine, format).unwrap()
    }

    fn run_text(replay: &mut Replay, script: &str) -> String {
        let script = parse_script(script.as_bytes()).unwrap();
        let mut out = Vec::new();
        replay.run(&script, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_line_commands() {
        assert_eq!(parse_line(1, "left").unwrap(), Some(Command::Move(-1)));
        assert_eq!(parse_line(1, "RIGHT").unwrap(), Some(Command::Move(1)));
        assert_eq!(parse_line(1, "move -3").unwrap(), Some(Command::Move(-3)));
        assert_eq!(parse_line(1, "select 4").unwrap(), Some(Command::Select(4)));
        assert_eq!(parse_line(1, "cell 12").unwrap(), Some(Command::Cell(12)));
        assert_eq!(parse_line(1, "drop").unwrap(), Some(Command::Drop(None)));
        assert_eq!(
            parse_line(1, "drop 1").unwrap(),
            Some(Command::Drop(Some(PlayerId(1))))
        );
        assert_eq!(parse_line(1, "board # show it").unwrap(), Some(Command::Board));
    }

    #[test]
    fn test_parse_line_skips_blank_and_comments() {
        assert_eq!(parse_line(1, "").unwrap(), None);
        assert_eq!(parse_line(1, "   # nothing here").unwrap(), None);
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(matches!(
            parse_line(2, "jump"),
            Err(ScriptError::UnknownCommand { line: 2, .. })
        ));
        assert!(matches!(
            parse_line(3, "select x"),
            Err(ScriptError::BadArgument { line: 3, .. })
        ));
        assert!(matches!(
            parse_line(4, "select"),
            Err(ScriptError::BadArgument { line: 4, .. })
        ));
        assert!(matches!(
            parse_line(5, "left 2"),
            Err(ScriptError::BadArgument { line: 5, .. })
        ));
        assert!(matches!(
            parse_line(6, "select 1 2"),
            Err(ScriptError::BadArgument { line: 6, .. })
        ));
    }

    #[test]
    fn test_parse_script_keeps_line_numbers() {
        let script = parse_script("# opening\nselect 3\n\ndrop\n".as_bytes()).unwrap();
        assert_eq!(
            script,
            vec![
                ScriptLine {
                    line: 2,
                    command: Command::Select(3)
                },
                ScriptLine {
                    line: 4,
                    command: Command::Drop(None)
                },
            ]
        );
    }

    #[test]
    fn test_replay_vertical_win() {
        let mut replay = replay(4, 4, OutputFormat::Text);
        let script = "select 0\ndrop\nright\ndrop\nleft\ndrop\nright\ndrop\nleft\ndrop\nright\ndrop\nleft\ndrop\n";
        let out = run_text(&mut replay, script);

        assert_eq!(
            replay.engine().outcome(),
            Some(GameOutcome::Winner(PlayerId(0)))
        );
        assert!(out.contains("Player 0 connected four"));
        assert!(out.ends_with("Result: Player 0 won!\n"));
    }

    #[test]
    fn test_replay_reports_rejections_and_continues() {
        let mut replay = replay(4, 4, OutputFormat::Text);
        let out = run_text(&mut replay, "drop\ndrop 1\nselect 2\ndrop\n");

        assert!(out.contains("line 1: rejected: no column selected"));
        assert!(out.contains("line 2: rejected:"));
        assert!(out.contains("Player 0 occupied (2, 0)"));
        assert!(out.ends_with("Result: in progress\n"));
    }

    #[test]
    fn test_replay_board_command() {
        let mut replay = replay(3, 2, OutputFormat::Text);
        let out = run_text(&mut replay, "select 1\ndrop\nboard\n");
        assert!(out.contains("...\n.0.\n"));
    }

    #[test]
    fn test_replay_json_output() {
        let mut replay = replay(1, 4, OutputFormat::Json);
        let out = run_text(&mut replay, "select 0\ndrop\ndrop\ndrop\ndrop\n");

        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert!(lines.iter().any(|v| v["event"] == "board_filled"));
        let last = lines.last().unwrap();
        assert_eq!(last["event"], "finished");
        assert_eq!(last["phase"], "over");
        assert_eq!(last["result"], "Tie");
    }
}
