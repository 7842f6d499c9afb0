//! The grid driver: a process-wide monotonic cycle counter and the
//! per-cycle fan-out of `step()` calls across an arena of nodes.

use crate::direction::Direction;
use crate::error::{CoreError, GridError};
use crate::node::{Mode, Node};
use crate::rendezvous;

/// A stable handle to a node inside a [`Grid`]'s arena.
///
/// Neighbors are represented as indices into the arena rather than cyclic
/// owning references (spec.md §9), so that a rendezvous can obtain two
/// disjoint `&mut Node` borrows — one into the reading node, one into the
/// writing neighbor — without interior mutability or unsafe aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Owns every node in the simulation and the global cycle counter.
///
/// `global_cycle` is a property of the driver, not of any node: it is
/// threaded into each node's step as an explicit parameter rather than
/// read from process-wide mutable state (spec.md §9).
#[derive(Debug, Default)]
pub struct Grid {
    nodes: Vec<Node>,
    global_cycle: u64,
}

impl Grid {
    /// An empty grid at cycle zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node into the arena and return a handle to it.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Read-only access to a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Mutable access to a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// The number of cycles this grid has completed.
    #[must_use]
    pub fn global_cycle(&self) -> u64 {
        self.global_cycle
    }

    /// Set node `a`'s neighbor at `dir` to `b`, and symmetrically set `b`'s
    /// neighbor at the reverse direction to `a`.
    ///
    /// # Panics
    ///
    /// Panics if `dir` is not a cardinal direction (`Any`/`Last` name no
    /// adjacency slot).
    pub fn connect(&mut self, a: NodeId, dir: Direction, b: NodeId) {
        let reverse = dir
            .reverse()
            .expect("Grid::connect requires a cardinal direction");
        set_neighbor(&mut self.nodes[a.0], dir, Some(b));
        set_neighbor(&mut self.nodes[b.0], reverse, Some(a));
    }

    /// Obtain disjoint mutable references to two distinct nodes.
    ///
    /// # Panics
    ///
    /// Panics if `a == b` — a node never rendezvous with itself.
    pub(crate) fn nodes_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node, &mut Node) {
        assert_ne!(a.0, b.0, "a node cannot rendezvous with itself");
        if a.0 < b.0 {
            let (left, right) = self.nodes.split_at_mut(b.0);
            (&mut left[a.0], &mut right[0])
        } else {
            let (left, right) = self.nodes.split_at_mut(a.0);
            (&mut right[0], &mut left[b.0])
        }
    }

    /// Run one tick: call `step()` on every node in arena order, then
    /// increment `global_cycle`.
    ///
    /// Rendezvous completes correctly under any fixed order (the `Pass`/
    /// `Run` rule in spec.md §4.5 and [`crate::rendezvous`] makes the
    /// result independent of iteration order); this driver always uses
    /// arena insertion order.
    ///
    /// # Errors
    ///
    /// Returns the first [`GridError`] raised by a node's `RUN`-mode
    /// decode/execution, wrapping which node raised it. The remaining
    /// nodes in this tick are not stepped, and `global_cycle` is not
    /// incremented, once an error is returned.
    pub fn step(&mut self) -> Result<(), GridError> {
        let cycle = self.global_cycle;
        for i in 0..self.nodes.len() {
            self.step_node(NodeId(i), cycle)
                .map_err(|source| GridError { node: NodeId(i), source })?;
        }
        self.global_cycle += 1;
        Ok(())
    }

    /// Run `n` ticks, stopping at the first error.
    ///
    /// # Errors
    ///
    /// See [`Grid::step`].
    pub fn step_many(&mut self, n: usize) -> Result<(), GridError> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    fn step_node(&mut self, id: NodeId, cycle: u64) -> Result<(), CoreError> {
        let mode = self.nodes[id.0].mode;
        match mode {
            Mode::Run => self.nodes[id.0].execute_run(cycle)?,
            Mode::Read { .. } => {
                rendezvous::attempt_read(self, id, cycle);
            }
            Mode::Write { .. } => {
                // Passive: consumed only by a neighbor's successful read.
            }
            Mode::Pass => self.nodes[id.0].complete_pass(),
        }
        self.nodes[id.0].cycle += 1;
        Ok(())
    }
}

fn set_neighbor(node: &mut Node, dir: Direction, id: Option<NodeId>) {
    match dir {
        Direction::Up => node.set_up(id),
        Direction::Right => node.set_right(id),
        Direction::Down => node.set_down(id),
        Direction::Left => node.set_left(id),
        Direction::Any | Direction::Last => {
            unreachable!("Grid::connect guarantees dir is cardinal")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn add_node_returns_distinct_ids() {
        let mut grid = Grid::new();
        let a = grid.add_node(Node::new("nop", None));
        let b = grid.add_node(Node::new("nop", None));
        assert_ne!(a, b);
    }

    #[test]
    fn connect_is_symmetric() {
        let mut grid = Grid::new();
        let a = grid.add_node(Node::new("nop", None));
        let b = grid.add_node(Node::new("nop", None));
        grid.connect(a, Direction::Right, b);
        assert_eq!(grid.node(a).neighbor(Direction::Right), Some(b));
        assert_eq!(grid.node(b).neighbor(Direction::Left), Some(a));
    }

    #[test]
    fn global_cycle_increments_once_per_tick() {
        let mut grid = Grid::new();
        grid.add_node(Node::new("nop", None));
        grid.step_many(3).unwrap();
        assert_eq!(grid.global_cycle(), 3);
    }

    #[test]
    fn decode_error_propagates_with_node_identity() {
        let mut grid = Grid::new();
        let a = grid.add_node(Node::new("frobnicate", None));
        let err = grid.step().unwrap_err();
        assert_eq!(err.node, a);
    }
}
