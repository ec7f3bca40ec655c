//! Best-first search.
//!
//! Keeps a globally sorted open list and always expands its best node. A
//! position that is already pending or closed is never generated twice, and
//! a closed position is never reopened.

use crate::cost::Cost;
use crate::expander::TreeExpander;
use crate::grid::Grid;
use crate::movement::MovementError;
use crate::search::SearchTreeIndex;
use crate::state::MazeState;

use super::frontier::Frontier;

/// Ranks nodes by their heuristic estimate alone.
pub(crate) fn expand(
    expander: &mut TreeExpander,
    grid: &Grid,
) -> Result<Option<SearchTreeIndex>, MovementError> {
    expand_ordered(expander, grid, |expander, grid, state| {
        expander.evaluate(grid, state)
    })
}

/// Shared loop of the frontier strategies, ranking nodes with `key`.
///
/// Successors the strategy doesn't admit are dropped before they get a node.
pub(crate) fn expand_ordered<K>(
    expander: &mut TreeExpander,
    grid: &Grid,
    key: K,
) -> Result<Option<SearchTreeIndex>, MovementError>
where
    K: Fn(&TreeExpander, &Grid, &MazeState) -> Cost,
{
    let strategy = expander.strategy();
    let mut frontier = Frontier::new();

    let root = expander.tree().root();
    let root_state = expander.tree()[root].state();
    frontier.push(key(&*expander, grid, root_state), root, root_state.position());

    while let Some(best) = frontier.pop() {
        if grid.is_goal(&best.position) {
            return Ok(Some(best.node_index));
        }
        frontier.close(best.position);
        log::trace!("{strategy}: expanding {} (key={})", best.position, best.key);

        while let Some(operand) = expander.select_operand(grid, best.node_index) {
            if frontier.seen(&operand) {
                continue;
            }
            let state = expander.successor(grid, best.node_index, operand)?;
            if !strategy.admits(grid, state.g()) {
                log::trace!("{strategy}: pruned {state}");
                continue;
            }
            let k = key(&*expander, grid, &state);
            let child = expander.grow(best.node_index, state);
            frontier.push(k, child, operand);
        }
        verify(expander, &frontier);
    }

    Ok(None)
}

#[inline(always)]
#[cfg(not(feature = "verify"))]
fn verify(_expander: &TreeExpander, _frontier: &Frontier) {
    // All good... (hopefully)
}
#[cfg(feature = "verify")]
fn verify(expander: &TreeExpander, frontier: &Frontier) {
    assert!(frontier.open().is_sorted());
    for entry in frontier.open().iter() {
        let state = expander.tree()[entry.node_index].state();
        assert!(state.weight_is_fresh(), "Stale weight on {state}");
        assert!(!frontier.is_closed(&entry.position));
        assert_eq!(state.position(), entry.position);
        if let Some(weight) = state.weight() {
            assert_eq!(weight, entry.key);
        }
    }
}
