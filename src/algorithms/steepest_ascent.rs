//! Steepest-ascent hill climbing.
//!
//! Looks at every neighbour of the current node and moves to the one that
//! looks closest to a goal, if it beats the current node. Ties go to the
//! neighbour offered first. Only the chosen neighbour is added to the tree.

use crate::cost::Cost;
use crate::expander::TreeExpander;
use crate::grid::Grid;
use crate::movement::MovementError;
use crate::search::SearchTreeIndex;
use crate::state::MazeState;

pub(crate) fn expand(
    expander: &mut TreeExpander,
    grid: &Grid,
) -> Result<Option<SearchTreeIndex>, MovementError> {
    let strategy = expander.strategy();
    let mut current = expander.tree().root();

    loop {
        if grid.is_goal(&expander.tree()[current].state().position()) {
            return Ok(Some(current));
        }
        let h = expander.apply_heuristic(grid, current);

        // One generation of siblings.
        let mut best: Option<(Cost, MazeState)> = None;
        while let Some(operand) = expander.select_operand(grid, current) {
            let state = expander.successor(grid, current, operand)?;
            let sibling_h = expander.evaluate(grid, &state);
            if best.as_ref().is_none_or(|(best_h, _)| sibling_h < *best_h) {
                best = Some((sibling_h, state));
            }
        }

        match best {
            Some((best_h, state)) if best_h < h => {
                current = expander.grow(current, state);
            }
            _ => {
                log::debug!("{strategy}: stuck at {}", expander.tree()[current].state());
                return Ok(None);
            }
        }
    }
}
