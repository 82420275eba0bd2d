use std::io::Read;
use std::path::Path;

use crate::engine::grid::is_valid_value;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("board size must be positive")]
    ZeroSize,
    #[error("max piece {0} is not a power of two >= 2")]
    BadMaxPiece(u32),
    #[error("start_tiles {start} exceeds the {cells} cells on the board")]
    TooManyStartTiles { start: usize, cells: usize },
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub board: Board,
    #[serde(default)]
    pub play: Play,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Board {
    #[serde(default = "defaults::size")]
    pub size: usize,
    /// Reaching a tile of this value ends the game.
    #[serde(default = "defaults::max_piece")]
    pub max_piece: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            size: defaults::size(),
            max_piece: defaults::max_piece(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Play {
    /// RNG seed for tile spawns and the random policy. Unseeded if absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "defaults::max_moves")]
    pub max_moves: u64,
    /// Merge lines on the rayon pool during tilts.
    #[serde(default)]
    pub parallel_lines: bool,
    #[serde(default = "defaults::start_tiles")]
    pub start_tiles: usize,
}

impl Default for Play {
    fn default() -> Self {
        Self {
            seed: None,
            max_moves: defaults::max_moves(),
            parallel_lines: false,
            start_tiles: defaults::start_tiles(),
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if !is_valid_value(self.board.max_piece) {
            return Err(ConfigError::BadMaxPiece(self.board.max_piece));
        }
        let cells = self.board.size * self.board.size;
        if self.play.start_tiles > cells {
            return Err(ConfigError::TooManyStartTiles {
                start: self.play.start_tiles,
                cells,
            });
        }
        Ok(())
    }
}

mod defaults {
    pub fn size() -> usize { 4 }
    pub fn max_piece() -> u32 { crate::engine::MAX_PIECE }
    pub fn max_moves() -> u64 { 10_000 }
    pub fn start_tiles() -> usize { 2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.board.size, 4);
        assert_eq!(cfg.board.max_piece, 2048);
        assert_eq!(cfg.play.start_tiles, 2);
    }

    #[test]
    fn reads_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            "[board]\nsize = 5\nmax_piece = 4096\n\n[play]\nseed = 9\nparallel_lines = true"
        )
        .unwrap();
        let cfg = Config::from_toml(tmp.path()).unwrap();
        assert_eq!(cfg.board.size, 5);
        assert_eq!(cfg.board.max_piece, 4096);
        assert_eq!(cfg.play.seed, Some(9));
        assert!(cfg.play.parallel_lines);
        assert_eq!(cfg.play.max_moves, 10_000);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            Config::from_toml_str("[board]\nsize = 0").unwrap_err(),
            ConfigError::ZeroSize
        ));
        assert!(matches!(
            Config::from_toml_str("[board]\nmax_piece = 1000").unwrap_err(),
            ConfigError::BadMaxPiece(1000)
        ));
        assert!(matches!(
            Config::from_toml_str("[board]\nsize = 1\n[play]\nstart_tiles = 2").unwrap_err(),
            ConfigError::TooManyStartTiles { start: 2, cells: 1 }
        ));
        assert!(matches!(
            Config::from_toml_str("[board\n").unwrap_err(),
            ConfigError::Toml(_)
        ));
    }
}
