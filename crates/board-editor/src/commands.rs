//! Board-level commands.
//!
//! These are the four signals the rest of the UI can raise at the board
//! without holding a reference to it: toolbar buttons, the layers panel
//! and change listeners all speak in these names. They parse from their
//! wire names (`board:undo`, …; the `board:` prefix is optional) and are
//! executed by `BoardEngine::dispatch`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardCommand {
    Undo,
    Redo,
    /// Record the current board, then empty it.
    Clear,
    /// Record the current board as an undo step.
    Commit,
}

impl BoardCommand {
    pub const ALL: [BoardCommand; 4] = [
        BoardCommand::Undo,
        BoardCommand::Redo,
        BoardCommand::Clear,
        BoardCommand::Commit,
    ];

    /// Wire name, e.g. `board:undo`.
    pub fn signal(self) -> &'static str {
        match self {
            BoardCommand::Undo => "board:undo",
            BoardCommand::Redo => "board:redo",
            BoardCommand::Clear => "board:clear",
            BoardCommand::Commit => "board:commit",
        }
    }
}

impl fmt::Display for BoardCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signal())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown board command: {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for BoardCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix("board:").unwrap_or(name);
        match name {
            "undo" => Ok(BoardCommand::Undo),
            "redo" => Ok(BoardCommand::Redo),
            "clear" => Ok(BoardCommand::Clear),
            "commit" => Ok(BoardCommand::Commit),
            _ => Err(UnknownCommand(s.to_string())),
        }
    }
}
