//! Textual command grammar: `""`, `R`, `<`, `>`, `Q`, `F <col> <jewel> <jewel> <jewel>`.

use crate::error::{GameError, Result};
use crate::field::Jewel;
use std::str::FromStr;

/// Exact length of a spawn directive such as `F 3 S T V`.
const SPAWN_LEN: usize = 9;

/// One parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Clear matches, then one gravity step.
    Tick,
    Rotate,
    MoveLeft,
    MoveRight,
    Quit,
    /// Column is 1-based; jewels are top to bottom.
    Spawn { column: usize, jewels: [Jewel; 3] },
}

/// What the driver should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

impl FromStr for Command {
    type Err = GameError;

    fn from_str(line: &str) -> Result<Self> {
        match line {
            "" => Ok(Self::Tick),
            "R" => Ok(Self::Rotate),
            "<" => Ok(Self::MoveLeft),
            ">" => Ok(Self::MoveRight),
            "Q" => Ok(Self::Quit),
            _ if line.starts_with('F') && line.chars().count() == SPAWN_LEN => parse_spawn(line),
            _ => Err(GameError::InvalidCommand(line.to_string())),
        }
    }
}

fn parse_spawn(line: &str) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [tag, column, top, middle, bottom] = tokens[..] else {
        return Err(GameError::InvalidCommand(line.to_string()));
    };
    if tag != "F" {
        return Err(GameError::InvalidCommand(line.to_string()));
    }
    let column = column
        .parse::<usize>()
        .map_err(|_| GameError::ColumnOutOfRange(column.to_string()))?;
    let jewels = [top.parse()?, middle.parse()?, bottom.parse()?];
    Ok(Command::Spawn { column, jewels })
}
