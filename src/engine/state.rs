use std::fmt;
use std::hash::{Hash, Hasher};

use log::{debug, info};

use super::grid::{is_valid_value, Grid, Tile};
use super::ops::{self, TiltOutcome};
use super::perspective::Direction;

/// Default largest piece value; reaching it ends the game.
pub const MAX_PIECE: u32 = 2048;

/// What a state-altering call did, handed to every registered [`Listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Cleared,
    TileAdded(Tile),
    MaxPieceSet(u32),
    Tilted {
        direction: Direction,
        outcome: TiltOutcome,
    },
}

/// Receives one notification per state-altering call on a [`Game`].
///
/// No-op tilts are never reported.
pub trait Listener {
    fn state_changed(&mut self, game: &Game, change: Change);
}

impl<F> Listener for F
where
    F: FnMut(&Game, Change),
{
    fn state_changed(&mut self, game: &Game, change: Change) {
        self(game, change)
    }
}

/// The state of one game: grid, score, max score and the over flag.
///
/// Equality and hashing are structural over those fields (and the max piece);
/// registered listeners take no part in either and are not cloned.
pub struct Game {
    grid: Grid,
    score: u64,
    max_score: u64,
    game_over: bool,
    max_piece: u32,
    parallel_lines: bool,
    listeners: Vec<Box<dyn Listener>>,
}

impl Game {
    /// A new game on an empty `size` x `size` board with score 0.
    ///
    /// ```
    /// use tilt_2048::engine::Game;
    /// let g = Game::new(4);
    /// assert_eq!(g.size(), 4);
    /// assert_eq!(g.score(), 0);
    /// ```
    pub fn new(size: usize) -> Self {
        Game::with_max_piece(size, MAX_PIECE)
    }

    /// Like [`Game::new`] but ending the game at `max_piece` instead of 2048.
    pub fn with_max_piece(size: usize, max_piece: u32) -> Self {
        assert!(
            is_valid_value(max_piece),
            "max piece {max_piece} is not a power of two >= 2"
        );
        Game {
            grid: Grid::new(size),
            score: 0,
            max_score: 0,
            game_over: false,
            max_piece,
            parallel_lines: false,
            listeners: Vec::new(),
        }
    }

    /// A game whose tiles are `values[row][col]` (row 0 at the bottom, 0 for
    /// empty), with the given score, max score and over flag. Used for fixtures.
    ///
    /// ```
    /// use tilt_2048::engine::Game;
    /// let g = Game::from_values(&[vec![2, 0], vec![0, 4]], 12, 40, false);
    /// assert_eq!(g.tile(1, 1), Some(4));
    /// assert_eq!(g.max_score(), 40);
    /// ```
    pub fn from_values(
        values: &[Vec<u32>],
        score: u64,
        max_score: u64,
        game_over: bool,
    ) -> Self {
        Game::from_parts(values, score, max_score, game_over, MAX_PIECE)
    }

    /// Restore every field as given, without re-evaluating the over flag.
    pub(crate) fn from_parts(
        values: &[Vec<u32>],
        score: u64,
        max_score: u64,
        game_over: bool,
        max_piece: u32,
    ) -> Self {
        let mut game = Game::with_max_piece(values.len(), max_piece);
        game.grid = Grid::from_values(values);
        game.score = score;
        game.max_score = max_score;
        game.game_over = game_over;
        game
    }

    /// Set the largest piece value and re-evaluate the over flag.
    ///
    /// Listeners hear about it only if the max piece, over flag or max score changed.
    pub fn set_max_piece(&mut self, max_piece: u32) {
        assert!(
            is_valid_value(max_piece),
            "max piece {max_piece} is not a power of two >= 2"
        );
        let before = (self.max_piece, self.game_over, self.max_score);
        self.max_piece = max_piece;
        self.check_game_over();
        if before != (self.max_piece, self.game_over, self.max_score) {
            self.notify(Change::MaxPieceSet(max_piece));
        }
    }

    /// Merge lines on the rayon pool during tilts.
    pub fn set_parallel_lines(&mut self, parallel: bool) {
        self.parallel_lines = parallel;
    }

    /// Register a listener for state changes.
    pub fn subscribe<L: Listener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    /// Tile value at (`col`, `row`), `None` if empty.
    #[inline]
    pub fn tile(&self, col: usize, row: usize) -> Option<u32> {
        self.grid.get(col, row)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Best score seen; updated whenever the game is observed to be over.
    #[inline]
    pub fn max_score(&self) -> u64 {
        self.max_score
    }

    #[inline]
    pub fn max_piece(&self) -> u32 {
        self.max_piece
    }

    /// Over flag as last evaluated, without re-checking the grid.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// Re-evaluate and return whether the game is over, latching the max score.
    pub fn game_over(&mut self) -> bool {
        self.check_game_over();
        self.game_over
    }

    /// Empty the board and reset score and over flag. Max score is kept.
    ///
    /// Clearing an already empty, unscored, running game notifies nobody.
    pub fn clear(&mut self) {
        let was_blank = self.score == 0 && !self.game_over && self.grid.tiles().next().is_none();
        self.score = 0;
        self.game_over = false;
        self.grid.clear();
        self.check_game_over();
        if !was_blank {
            self.notify(Change::Cleared);
        }
    }

    /// Put `tile` on the board. Panics if its cell is occupied.
    pub fn add_tile(&mut self, tile: Tile) {
        self.grid.place(tile);
        self.check_game_over();
        self.notify(Change::TileAdded(tile));
    }

    /// Tilt the board toward `direction`. Returns true iff the board changed.
    ///
    /// ```
    /// use tilt_2048::engine::{Direction, Game};
    /// let mut g = Game::from_values(&[vec![2, 0], vec![2, 0]], 0, 0, false);
    /// assert!(g.tilt(Direction::North));
    /// assert_eq!(g.tile(0, 1), Some(4));
    /// assert_eq!(g.score(), 4);
    /// assert!(!g.tilt(Direction::North));
    /// ```
    pub fn tilt(&mut self, direction: Direction) -> bool {
        self.tilt_with_outcome(direction).changed
    }

    /// Like [`Game::tilt`], returning the merge count and score gained too.
    pub fn tilt_with_outcome(&mut self, direction: Direction) -> TiltOutcome {
        let outcome = ops::tilt_grid(&mut self.grid, direction, self.parallel_lines);
        self.score += outcome.score;
        self.check_game_over();
        debug!(
            "tilt {direction}: changed={} merges={} gained={} score={}",
            outcome.changed, outcome.merges, outcome.score, self.score
        );
        if outcome.changed {
            self.notify(Change::Tilted { direction, outcome });
        }
        outcome
    }

    fn check_game_over(&mut self) {
        let over = ops::is_game_over(&self.grid, self.max_piece);
        if over {
            if !self.game_over {
                info!(
                    "game over: score={} highest tile={}",
                    self.score,
                    self.grid.highest_tile()
                );
            }
            self.max_score = self.max_score.max(self.score);
        }
        self.game_over = over;
    }

    fn notify(&mut self, change: Change) {
        if self.listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in listeners.iter_mut() {
            listener.state_changed(self, change);
        }
        self.listeners = listeners;
    }
}

impl Clone for Game {
    fn clone(&self) -> Self {
        Game {
            grid: self.grid.clone(),
            score: self.score,
            max_score: self.max_score,
            game_over: self.game_over,
            max_piece: self.max_piece,
            parallel_lines: self.parallel_lines,
            listeners: Vec::new(),
        }
    }
}

impl PartialEq for Game {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid
            && self.score == other.score
            && self.max_score == other.max_score
            && self.game_over == other.game_over
            && self.max_piece == other.max_piece
    }
}

impl Eq for Game {}

impl Hash for Game {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.grid.hash(state);
        self.score.hash(state);
        self.max_score.hash(state);
        self.game_over.hash(state);
        self.max_piece.hash(state);
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("grid", &self.grid)
            .field("score", &self.score)
            .field("max_score", &self.max_score)
            .field("game_over", &self.game_over)
            .field("max_piece", &self.max_piece)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Canonical text dump: top row first, `|%4d` cells, then score line.
///
/// The over status is evaluated from the grid, and the max score shown is
/// the value `game_over()` would latch.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "[")?;
        let size = self.size();
        for row in (0..size).rev() {
            for col in 0..size {
                match self.tile(col, row) {
                    Some(value) => write!(f, "|{value:4}")?,
                    None => write!(f, "|    ")?,
                }
            }
            writeln!(f, "|")?;
        }
        let over = ops::is_game_over(&self.grid, self.max_piece);
        let max_score = if over {
            self.max_score.max(self.score)
        } else {
            self.max_score
        };
        writeln!(
            f,
            "] {} (max: {}) (game is {}) ",
            self.score,
            max_score,
            if over { "over" } else { "not over" }
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder(game: &mut Game) -> Rc<RefCell<Vec<Change>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        game.subscribe(move |_: &Game, change: Change| sink.borrow_mut().push(change));
        log
    }

    #[test]
    fn triple_merge_column() {
        // column 0 holds [2, 2, 2, 4] from row 0 up
        let mut g = Game::from_values(
            &[
                vec![2, 0, 0, 0],
                vec![2, 0, 0, 0],
                vec![2, 0, 0, 0],
                vec![4, 0, 0, 0],
            ],
            0,
            0,
            false,
        );
        assert!(g.tilt(Direction::North));
        assert_eq!(g.tile(0, 0), None);
        assert_eq!(g.tile(0, 1), Some(2));
        assert_eq!(g.tile(0, 2), Some(4));
        assert_eq!(g.tile(0, 3), Some(4));
        assert_eq!(g.score(), 4);
    }

    #[test]
    fn simple_slide_scores_nothing() {
        let mut g = Game::new(4);
        g.add_tile(Tile::new(2, 0, 1));
        assert!(g.tilt(Direction::North));
        assert_eq!(g.tile(0, 3), Some(2));
        assert_eq!(g.tile(0, 1), None);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn deadlock_is_over_and_latches_max_score() {
        let mut g = Game::from_values(&[vec![2, 4], vec![4, 2]], 30, 10, false);
        assert!(!g.is_over());
        assert!(g.game_over());
        assert_eq!(g.max_score(), 30);
    }

    #[test]
    fn max_tile_wins() {
        let mut g = Game::from_values(
            &[vec![2048, 0, 0], vec![0, 0, 0], vec![0, 0, 0]],
            0,
            0,
            false,
        );
        assert!(g.game_over());

        let mut g = Game::with_max_piece(2, 8);
        g.add_tile(Tile::new(4, 0, 0));
        g.add_tile(Tile::new(4, 0, 1));
        assert!(!g.is_over());
        g.tilt(Direction::North);
        assert!(g.is_over());
        assert_eq!(g.max_score(), 8);
    }

    #[test]
    fn clear_resets_score_but_keeps_max() {
        let mut g = Game::from_values(&[vec![2, 4], vec![4, 2]], 16, 0, true);
        assert!(g.game_over());
        g.clear();
        assert_eq!(g.score(), 0);
        assert_eq!(g.max_score(), 16);
        assert!(!g.is_over());
        assert_eq!(g.grid().count_empty(), 4);
    }

    #[test]
    #[should_panic(expected = "already occupied")]
    fn add_tile_on_occupied_cell_panics() {
        let mut g = Game::new(4);
        g.add_tile(Tile::new(2, 3, 3));
        g.add_tile(Tile::new(2, 3, 3));
    }

    #[test]
    fn notifies_once_per_change_and_never_for_no_ops() {
        let mut g = Game::new(4);
        let log = recorder(&mut g);
        g.add_tile(Tile::new(2, 0, 3));
        assert!(!g.tilt(Direction::North));
        assert!(g.tilt(Direction::East));
        g.clear();
        let seen = log.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], Change::TileAdded(Tile::new(2, 0, 3)));
        assert!(matches!(
            seen[1],
            Change::Tilted { direction: Direction::East, outcome } if outcome.changed
        ));
        assert_eq!(seen[2], Change::Cleared);
    }

    #[test]
    fn clearing_a_blank_game_is_silent() {
        let mut g = Game::new(3);
        let log = recorder(&mut g);
        g.clear();
        assert!(log.borrow().is_empty());
        g.add_tile(Tile::new(4, 1, 1));
        g.clear();
        g.clear();
        assert_eq!(*log.borrow(), vec![Change::TileAdded(Tile::new(4, 1, 1)), Change::Cleared]);
    }

    #[test]
    fn max_piece_change_notifies_when_state_moves() {
        let mut g = Game::from_values(&[vec![16, 0], vec![0, 0]], 10, 0, false);
        let log = recorder(&mut g);
        g.set_max_piece(2048);
        assert!(log.borrow().is_empty());

        g.set_max_piece(16);
        assert!(g.is_over());
        assert_eq!(g.max_score(), 10);
        assert_eq!(*log.borrow(), vec![Change::MaxPieceSet(16)]);

        g.set_max_piece(16);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn tilting_largest_tiles_is_a_no_op() {
        let big = 1u32 << 31;
        let mut g = Game::from_values(&[vec![big, 0], vec![big, 0]], 0, 0, false);
        assert!(!g.tilt(Direction::North));
        assert_eq!(g.tile(0, 0), Some(big));
        assert_eq!(g.tile(0, 1), Some(big));
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn listener_sees_updated_state() {
        let mut g = Game::from_values(&[vec![0, 0], vec![2, 2]], 0, 0, false);
        let scores = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&scores);
        g.subscribe(move |game: &Game, _: Change| sink.borrow_mut().push(game.score()));
        g.tilt(Direction::West);
        assert_eq!(*scores.borrow(), vec![4]);
    }

    #[test]
    fn equality_is_structural() {
        let a = Game::from_values(&[vec![2, 0], vec![0, 0]], 4, 8, false);
        let mut b = a.clone();
        b.subscribe(|_: &Game, _: Change| {});
        assert_eq!(a, b);
        b.add_tile(Tile::new(2, 1, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn dump_matches_canonical_layout() {
        let g = Game::from_values(&[vec![2, 0], vec![0, 1024]], 12, 40, false);
        let expected = "\n[\n|    |1024|\n|   2|    |\n] 12 (max: 40) (game is not over) \n";
        assert_eq!(g.to_string(), expected);

        let over = Game::from_values(&[vec![2, 4], vec![4, 2]], 50, 40, false);
        assert!(over.to_string().ends_with("] 50 (max: 50) (game is over) \n"));
    }
}
