use rayon::prelude::*;

use super::grid::Grid;
use super::perspective::Direction;

/// Per-slot annotation for a single line merge. Lives only for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    Unmerged(u32),
    Merged(u32),
}

impl Slot {
    #[inline]
    fn value(self) -> Option<u32> {
        match self {
            Slot::Empty => None,
            Slot::Unmerged(v) | Slot::Merged(v) => Some(v),
        }
    }
}

/// Value produced by merging two `value` tiles, `None` once doubling would overflow `u32`.
///
/// Tiles that cannot double are treated as unequal to every neighbour.
#[inline]
pub fn merged_value(value: u32) -> Option<u32> {
    value.checked_mul(2)
}

/// Result of sliding/merging one line toward its last index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineOutcome {
    pub cells: Vec<Option<u32>>,
    pub changed: bool,
    pub score: u64,
    pub merges: usize,
}

/// Aggregate result of a tilt over the whole grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TiltOutcome {
    pub changed: bool,
    pub score: u64,
    pub merges: usize,
}

/// Slide and merge `line` toward index `len - 1` (the wall).
///
/// Scans from the wall inward, tracking the nearest empty slot. A slot that
/// received a merge is marked and never merges again in the same call, so of
/// three equal tiles the two closest to the wall merge and the third slides.
///
/// ```
/// use tilt_2048::engine::merge_line;
/// let out = merge_line(&[Some(2), Some(2), Some(2), Some(4)]);
/// assert_eq!(out.cells, vec![None, Some(2), Some(4), Some(4)]);
/// assert_eq!(out.score, 4);
/// ```
pub fn merge_line(line: &[Option<u32>]) -> LineOutcome {
    let len = line.len();
    let mut slots: Vec<Slot> = line
        .iter()
        .map(|c| c.map_or(Slot::Empty, Slot::Unmerged))
        .collect();
    let mut first_empty: Option<usize> = None;
    let mut changed = false;
    let mut score = 0u64;
    let mut merges = 0usize;

    for row in (0..len).rev() {
        let Slot::Unmerged(value) = slots[row] else {
            if first_empty.is_none() {
                first_empty = Some(row);
            }
            continue;
        };
        match first_empty {
            None => {
                // Packed against the wall so far: only the tile directly ahead can merge.
                let ahead_equal = row + 1 < len && slots[row + 1] == Slot::Unmerged(value);
                if let Some(doubled) = merged_value(value).filter(|_| ahead_equal) {
                    slots[row + 1] = Slot::Merged(doubled);
                    slots[row] = Slot::Empty;
                    score += doubled as u64;
                    merges += 1;
                    changed = true;
                    first_empty = Some(row);
                }
            }
            Some(target) => {
                slots[row] = Slot::Empty;
                changed = true;
                match (slots.get(target + 1), merged_value(value)) {
                    (Some(&Slot::Unmerged(ahead)), Some(doubled)) if ahead == value => {
                        slots[target + 1] = Slot::Merged(doubled);
                        score += doubled as u64;
                        merges += 1;
                    }
                    _ => {
                        slots[target] = Slot::Unmerged(value);
                        // target > row, and every slot between them is now empty.
                        first_empty = Some(target - 1);
                    }
                }
            }
        }
    }

    LineOutcome {
        cells: slots.into_iter().map(Slot::value).collect(),
        changed,
        score,
        merges,
    }
}

fn logical_line(grid: &Grid, direction: Direction, col: usize) -> Vec<Option<u32>> {
    let size = grid.size();
    (0..size)
        .map(|row| {
            let (pc, pr) = direction.to_physical(col, row, size);
            grid.get(pc, pr)
        })
        .collect()
}

/// Tilt every line of `grid` toward `direction` in place.
///
/// Lines never read or write each other's cells, so with `parallel` set they
/// are merged on the rayon pool; the result is identical either way.
pub fn tilt_grid(grid: &mut Grid, direction: Direction, parallel: bool) -> TiltOutcome {
    let size = grid.size();
    let view: &Grid = grid;
    let lines: Vec<LineOutcome> = if parallel {
        (0..size)
            .into_par_iter()
            .map(|col| merge_line(&logical_line(view, direction, col)))
            .collect()
    } else {
        (0..size)
            .map(|col| merge_line(&logical_line(view, direction, col)))
            .collect()
    };

    let mut outcome = TiltOutcome::default();
    for (col, line) in lines.into_iter().enumerate() {
        outcome.changed |= line.changed;
        outcome.score += line.score;
        outcome.merges += line.merges;
        if !line.changed {
            continue;
        }
        for (row, cell) in line.cells.into_iter().enumerate() {
            let (pc, pr) = direction.to_physical(col, row, size);
            grid.set(pc, pr, cell);
        }
    }
    outcome
}

/// True if at least one cell is empty.
pub fn empty_space_exists(grid: &Grid) -> bool {
    grid.count_empty() > 0
}

/// True if any tile equals `max_piece`.
pub fn max_tile_exists(grid: &Grid, max_piece: u32) -> bool {
    grid.tiles().any(|t| t.value == max_piece)
}

/// True if an empty cell exists or two orthogonal neighbours share a mergeable value.
pub fn at_least_one_move_exists(grid: &Grid) -> bool {
    if empty_space_exists(grid) {
        return true;
    }
    let size = grid.size();
    for col in 0..size {
        for row in 0..size {
            let value = grid.get(col, row);
            if value.and_then(merged_value).is_none() {
                continue;
            }
            if col + 1 < size && grid.get(col + 1, row) == value {
                return true;
            }
            if row + 1 < size && grid.get(col, row + 1) == value {
                return true;
            }
        }
    }
    false
}

/// Game over: a `max_piece` tile exists, or no tilt can change the grid.
pub fn is_game_over(grid: &Grid, max_piece: u32) -> bool {
    max_tile_exists(grid, max_piece) || !at_least_one_move_exists(grid)
}
