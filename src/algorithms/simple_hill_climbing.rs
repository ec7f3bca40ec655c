//! Simple hill climbing.
//!
//! Moves to the first neighbour that looks closer to a goal than the current
//! node and gives up when none does. Neighbours that don't improve never make
//! it into the tree.

use crate::expander::TreeExpander;
use crate::grid::Grid;
use crate::movement::MovementError;
use crate::search::SearchTreeIndex;

pub(crate) fn expand(
    expander: &mut TreeExpander,
    grid: &Grid,
) -> Result<Option<SearchTreeIndex>, MovementError> {
    let strategy = expander.strategy();
    let mut current = expander.tree().root();

    'climb: loop {
        if grid.is_goal(&expander.tree()[current].state().position()) {
            return Ok(Some(current));
        }
        let h = expander.apply_heuristic(grid, current);

        while let Some(operand) = expander.select_operand(grid, current) {
            let state = expander.successor(grid, current, operand)?;
            if expander.evaluate(grid, &state) < h {
                current = expander.grow(current, state);
                continue 'climb;
            }
        }

        log::debug!("{strategy}: stuck at {}", expander.tree()[current].state());
        return Ok(None);
    }
}
