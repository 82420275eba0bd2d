//! Engine module: square grid storage, the tilt/merge transition and
//! terminal detection, wrapped by the player-facing `Game`.
//!
//! - `Game` holds grid, score, max score and the over flag.
//! - Free functions in `ops` work on a bare `Grid` when no game state is needed.
//! - `perspective` maps the four directions onto one canonical "slide north" frame.

pub mod grid;
mod ops;
pub mod perspective;
pub mod spawn;
pub mod state;

pub use grid::{Grid, Tile};
pub use perspective::{Direction, ParseDirectionError};
pub use state::{Change, Game, Listener, MAX_PIECE};

pub use ops::{
    at_least_one_move_exists, empty_space_exists, is_game_over, max_tile_exists, merge_line,
    merged_value, tilt_grid, LineOutcome, TiltOutcome,
};
