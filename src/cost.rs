/// Accumulated traversal cost, also used for heuristic estimates.
///
/// Cell costs are unsigned, a cost of `0` marks a goal cell.
pub type Cost = u32;

/// Estimate returned when no goal can be reached at all.
pub const UNREACHABLE: Cost = Cost::MAX;
