//! tilt-2048: the state and turn rule of a sliding-merge tile puzzle
//!
//! This crate provides:
//! - A square `Grid` and a `Game` with the player-facing operations
//!   (`tilt`, `add_tile`, `clear`, ...)
//! - The tilt/merge transition (`engine::merge_line`, `engine::tilt_grid`) and terminal detection
//! - JSON snapshots for deterministic fixtures (`snapshot` module)
//! - TOML configuration for the bundled CLI (`config` module)
//!
//! Quick start:
//! ```
//! use tilt_2048::engine::{Direction, Game, Tile};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut game = Game::new(4);
//! game.add_tile(Tile::new(2, 0, 0));
//! game.add_random_tile(&mut rng);
//!
//! if game.tilt(Direction::West) {
//!     game.add_random_tile(&mut rng);
//! }
//! assert!(!game.game_over());
//! println!("{game}");
//! ```
//!
//! Fixtures start from an explicit matrix, `values[row][col]` with row 0 at the bottom:
//! ```
//! use tilt_2048::engine::{Direction, Game};
//!
//! let mut game = Game::from_values(
//!     &[vec![2, 0], vec![2, 4]],
//!     0, 0, false,
//! );
//! assert!(game.tilt(Direction::South));
//! assert_eq!(game.tile(0, 0), Some(4));
//! assert_eq!(game.score(), 4);
//! ```
//!
pub mod config;
pub mod engine;
pub mod snapshot;
