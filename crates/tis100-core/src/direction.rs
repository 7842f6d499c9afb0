//! Port directions.
//!
//! A node exchanges values with its four orthogonal neighbors through
//! directional ports. `Any` and `Last` are addressing modes recognized by
//! the instruction grammar but are never stored as an adjacency — they
//! resolve to one of the four cardinal directions at rendezvous time.

use crate::error::CoreError;

/// The four cardinal neighbor directions, plus the two addressing modes
/// (`Any`, `Last`) a program may target a port instruction with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The neighbor above this node.
    Up,
    /// The neighbor to the right of this node.
    Right,
    /// The neighbor below this node.
    Down,
    /// The neighbor to the left of this node.
    Left,
    /// Any neighbor currently attempting the opposite-facing operation.
    /// Resolved by probing [`ANY_PROBE_ORDER`] and committing to the first
    /// match.
    Any,
    /// The direction most recently resolved by an `Any` operation on this
    /// node. Stalls indefinitely if no `Any` has ever resolved.
    Last,
}

/// The four cardinal directions, in the fixed order `Any` probes them.
///
/// This order is an explicit, documented tie-break (spec.md §9 leaves the
/// choice open); it is never varied at runtime.
pub const ANY_PROBE_ORDER: [Direction; 4] =
    [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

impl Direction {
    /// The direction facing the opposite way.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownDirection`] if called on `Any`/`Last`,
    /// which have no opposite — this should never happen for a well-formed
    /// program, since only cardinal directions are ever stored as an
    /// issued read/write's `direction`.
    pub fn reverse(self) -> Result<Direction, CoreError> {
        match self {
            Direction::Up => Ok(Direction::Down),
            Direction::Down => Ok(Direction::Up),
            Direction::Right => Ok(Direction::Left),
            Direction::Left => Ok(Direction::Right),
            other => Err(CoreError::UnknownDirection(format!("{other:?}"))),
        }
    }
}
