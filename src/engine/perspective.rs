use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A direction to tilt the board toward.
///
/// Each direction defines a view of the board in which tiles always slide
/// toward increasing logical row. `North` is the identity view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Map logical (`col`, `row`) in this direction's view to physical
    /// coordinates on a `size` x `size` board.
    #[inline]
    pub fn to_physical(self, col: usize, row: usize, size: usize) -> (usize, usize) {
        let n = size - 1;
        match self {
            Direction::North => (col, row),
            Direction::East => (row, n - col),
            Direction::South => (n - col, n - row),
            Direction::West => (n - row, col),
        }
    }

    /// Inverse of [`Direction::to_physical`].
    #[inline]
    pub fn to_logical(self, col: usize, row: usize, size: usize) -> (usize, usize) {
        let n = size - 1;
        match self {
            Direction::North => (col, row),
            Direction::East => (n - row, col),
            Direction::South => (n - col, n - row),
            Direction::West => (row, n - col),
        }
    }

    /// Single-letter code used by scripted move strings.
    pub fn code(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        }
    }

    /// Parse a single move character: `NESW` or the arrow-style `URDL`.
    pub fn from_code(c: char) -> Option<Direction> {
        match c.to_ascii_uppercase() {
            'N' | 'U' => Some(Direction::North),
            'E' | 'R' => Some(Direction::East),
            'S' | 'D' => Some(Direction::South),
            'W' | 'L' => Some(Direction::West),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown direction: {0:?}")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "up" => Ok(Direction::North),
            "east" | "right" => Ok(Direction::East),
            "south" | "down" => Ok(Direction::South),
            "west" | "left" => Ok(Direction::West),
            other => {
                let mut chars = other.chars();
                match (chars.next().and_then(Direction::from_code), chars.next()) {
                    (Some(dir), None) => Ok(dir),
                    _ => Err(ParseDirectionError(s.to_string())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_cell() {
        for size in 1..6 {
            for dir in Direction::ALL {
                for col in 0..size {
                    for row in 0..size {
                        let (pc, pr) = dir.to_physical(col, row, size);
                        assert!(pc < size && pr < size);
                        assert_eq!(dir.to_logical(pc, pr, size), (col, row), "{dir} {size}");
                    }
                }
            }
        }
    }

    #[test]
    fn increasing_logical_row_points_toward_direction() {
        let size = 4;
        // Step from logical row 1 to 2 in column 1 and compare the physical delta.
        let delta = |dir: Direction| {
            let (c0, r0) = dir.to_physical(1, 1, size);
            let (c1, r1) = dir.to_physical(1, 2, size);
            (c1 as i64 - c0 as i64, r1 as i64 - r0 as i64)
        };
        assert_eq!(delta(Direction::North), (0, 1));
        assert_eq!(delta(Direction::South), (0, -1));
        assert_eq!(delta(Direction::East), (1, 0));
        assert_eq!(delta(Direction::West), (-1, 0));
    }

    #[test]
    fn parses_names_and_codes() {
        assert_eq!("up".parse::<Direction>(), Ok(Direction::North));
        assert_eq!("West".parse::<Direction>(), Ok(Direction::West));
        assert_eq!("r".parse::<Direction>(), Ok(Direction::East));
        assert_eq!("S".parse::<Direction>(), Ok(Direction::South));
        assert!("sideways".parse::<Direction>().is_err());
        for dir in Direction::ALL {
            assert_eq!(Direction::from_code(dir.code()), Some(dir));
        }
    }
}
