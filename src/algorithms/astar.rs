//! A* search.
//!
//! Same frontier as best-first, ranked by `f = g + h` and bounded by the grid
//! threshold. Closed positions stay closed even if a cheaper path shows up
//! later, so the first path found is only optimal with consistent estimates.

use crate::expander::TreeExpander;
use crate::grid::Grid;
use crate::movement::MovementError;
use crate::search::SearchTreeIndex;

use super::best_first::expand_ordered;

pub(crate) fn expand(
    expander: &mut TreeExpander,
    grid: &Grid,
) -> Result<Option<SearchTreeIndex>, MovementError> {
    debug_assert!(expander.strategy().weighted());
    expand_ordered(expander, grid, |expander, grid, state| match state.weight() {
        Some(weight) => weight,
        // Only reachable if the root was seeded without a weighting.
        None => expander.evaluate(grid, state).saturating_add(state.g()),
    })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use crate::cost::Cost;
    use crate::expander::Strategy;
    use crate::expander::TreeExpander;
    use crate::grid::Grid;
    use crate::heuristic::Heuristic;
    use crate::movement::Position;

    #[test]
    fn finds_the_cheapest_path() {
        // The straight line is expensive, the detour is cheap.
        let grid = Grid::try_from(indoc! {"
            1 9 9 9
            1 9 9 9
            1 9 9 9
            1 1 1 0
        "})
        .unwrap();
        let mut expander = TreeExpander::new(Strategy::AStar, Heuristic::Uninformed);
        let outcome = expander.resolve(&grid).unwrap();
        let solution = outcome.solution().unwrap();

        assert_eq!(solution.cost, 4);
        assert_eq!(grid.path_cost(&solution.path), Some(4));
        assert_eq!(solution.path.first(), Some(&Position::ORIGIN));
        assert_eq!(solution.path.last(), Some(&Position::new(3, 3)));
    }

    #[test]
    fn threshold_prunes_expensive_branches() {
        let mut grid = Grid::try_from(indoc! {"
            1 5 0
            # 5 #
            # # #
        "})
        .unwrap();
        let mut expander = TreeExpander::new(Strategy::AStar, Heuristic::Diagonal);

        grid.set_threshold(4);
        assert!(!expander.resolve(&grid).unwrap().is_solved());

        grid.set_threshold(5);
        let outcome = expander.resolve(&grid).unwrap();
        assert_eq!(outcome.solution().map(|s| s.cost), Some(5));
    }

    #[test]
    fn weights_are_never_stale() {
        let grid = Grid::try_from(indoc! {"
            1 2 3 4
            4 # 2 1
            1 3 # 2
            2 1 1 0
        "})
        .unwrap();
        for h in Heuristic::ALL {
            let mut expander = TreeExpander::new(Strategy::AStar, h);
            assert!(expander.resolve(&grid).unwrap().is_solved());

            let tree = expander.tree();
            let mut pending = vec![tree.root()];
            while let Some(index) = pending.pop() {
                let state = tree[index].state();
                let expected: Cost = h.estimate(&grid, state) + state.g();
                assert_eq!(state.weight(), Some(expected));
                pending.extend(tree[index].children().iter().copied());
            }
        }
    }
}
