use rand::Rng;

use crate::grid::{CellType, Grid};

/// Offsets to the cells two steps away: up, down, left, right.
const CARVE_OFFSETS: [(i32, i32); 4] = [(-2, 0), (2, 0), (0, -2), (0, 2)];

/// One move of the recursive backtracker.
///
/// Looks at the cell on top of `stack`. If some cell two steps away is still a
/// wall, picks one at random, opens it together with the wall cell in between
/// and pushes it. Otherwise the top is a dead end and gets popped.
///
/// Returns `false` once the stack is empty.
pub(super) fn carve_step<R: Rng>(
    grid: &mut Grid,
    stack: &mut Vec<usize>,
    candidates: &mut Vec<usize>,
    rng: &mut R,
) -> bool {
    let Some(&current) = stack.last() else {
        return false;
    };

    candidates.clear();
    candidates.extend(
        CARVE_OFFSETS
            .iter()
            .filter_map(|&offset| grid.offset(current, offset))
            .filter(|&idx| grid.kind_at(idx) == CellType::Wall),
    );

    if candidates.is_empty() {
        // Dead end, backtrack
        stack.pop();
        return !stack.is_empty();
    }

    let next = candidates[rng.random_range(0..candidates.len())];
    let (r, c) = grid.coord_of(current);
    let (nr, nc) = grid.coord_of(next);
    // The wall between the two cells sits at their midpoint
    let between = grid.index_of(((r + nr) / 2, (c + nc) / 2));
    grid.set_kind_at(between, CellType::Empty);
    grid.set_kind_at(next, CellType::Empty);
    stack.push(next);
    tracing::trace!("[maze] carved {:?} -> {:?}", (r, c), (nr, nc));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_carves_through_the_midpoint() {
        let mut grid = Grid::new(1, 3, None);
        grid.fill_with_walls();
        grid.set_cell_type((0, 0), CellType::Empty);
        let mut stack = vec![0];
        let mut candidates = Vec::new();
        let mut rng = StdRng::seed_from_u64(7);

        assert!(carve_step(&mut grid, &mut stack, &mut candidates, &mut rng));
        assert_eq!(stack, vec![0, 2]);
        assert_eq!(grid.count(CellType::Empty), 3);

        // (0,2) has nowhere to go, then (0,0) has nowhere to go
        assert!(carve_step(&mut grid, &mut stack, &mut candidates, &mut rng));
        assert!(!carve_step(&mut grid, &mut stack, &mut candidates, &mut rng));
        assert!(stack.is_empty());
    }
}
