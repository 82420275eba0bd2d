//! JSON snapshots of a game for deterministic fixtures.
//!
//! A snapshot carries the tile matrix (`values[row][col]`, row 0 at the
//! bottom, 0 for empty), score, max score, the over flag and the max piece.
//! Unlike `Game::from_values`, loading a snapshot validates its contents and
//! reports problems as `SnapshotError` instead of panicking.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::grid::is_valid_value;
use crate::engine::{Game, MAX_PIECE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub values: Vec<Vec<u32>>,
    pub score: u64,
    #[serde(default)]
    pub max_score: u64,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default = "default_max_piece")]
    pub max_piece: u32,
}

fn default_max_piece() -> u32 {
    MAX_PIECE
}

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot has no rows")]
    Empty,
    #[error("row {row} has {len} cells, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    #[error("invalid tile value {value} at column {col}, row {row}")]
    BadTile { value: u32, col: usize, row: usize },
    #[error("invalid max piece {0}")]
    BadMaxPiece(u32),
}

impl Snapshot {
    /// Capture the current state of `game`.
    pub fn from_game(game: &Game) -> Self {
        Snapshot {
            values: game.grid().to_values(),
            score: game.score(),
            max_score: game.max_score(),
            game_over: game.is_over(),
            max_piece: game.max_piece(),
        }
    }

    /// Check shape and tile values.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let size = self.values.len();
        if size == 0 {
            return Err(SnapshotError::Empty);
        }
        if !is_valid_value(self.max_piece) {
            return Err(SnapshotError::BadMaxPiece(self.max_piece));
        }
        for (row, line) in self.values.iter().enumerate() {
            if line.len() != size {
                return Err(SnapshotError::NotSquare {
                    row,
                    len: line.len(),
                    size,
                });
            }
            if let Some((col, &value)) = line
                .iter()
                .enumerate()
                .find(|(_, v)| **v != 0 && !is_valid_value(**v))
            {
                return Err(SnapshotError::BadTile { value, col, row });
            }
        }
        Ok(())
    }

    /// Validate and build the game this snapshot describes.
    ///
    /// Every field is restored as stored; the over flag is not re-evaluated.
    pub fn into_game(self) -> Result<Game, SnapshotError> {
        self.validate()?;
        Ok(Game::from_parts(
            &self.values,
            self.score,
            self.max_score,
            self.game_over,
            self.max_piece,
        ))
    }
}

pub fn to_json_string(snapshot: &Snapshot) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn from_json_str(json: &str) -> Result<Snapshot, SnapshotError> {
    Ok(serde_json::from_str(json)?)
}

/// Write a snapshot as pretty JSON.
pub fn write_json_to_path<P: AsRef<Path>>(
    path: P,
    snapshot: &Snapshot,
) -> Result<(), SnapshotError> {
    fs::write(path, to_json_string(snapshot)?)?;
    Ok(())
}

/// Read a snapshot from JSON. The result is not validated until `into_game`.
pub fn read_json_from_path<P: AsRef<Path>>(path: P) -> Result<Snapshot, SnapshotError> {
    let data = fs::read_to_string(path)?;
    from_json_str(&data)
}
