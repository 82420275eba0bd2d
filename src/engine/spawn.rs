use rand::Rng;

use super::grid::Tile;
use super::state::Game;

/// 2 with probability 0.9, otherwise 4.
pub fn random_tile_value<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    if rng.gen_range(0..10) < 9 {
        2
    } else {
        4
    }
}

impl Game {
    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty cell.
    ///
    /// Returns the placed tile, or `None` when the board is full.
    ///
    /// ```
    /// use tilt_2048::engine::Game;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let mut g = Game::new(4);
    /// assert!(g.add_random_tile(&mut rng).is_some());
    /// assert_eq!(g.grid().count_empty(), 15);
    /// ```
    pub fn add_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Tile> {
        let empty = self.grid().empty_cells();
        if empty.is_empty() {
            return None;
        }
        let (col, row) = empty[rng.gen_range(0..empty.len())];
        let tile = Tile::new(random_tile_value(rng), col, row);
        self.add_tile(tile);
        Some(tile)
    }
}
