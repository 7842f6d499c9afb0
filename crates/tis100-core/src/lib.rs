//! A cycle-accurate simulator for a grid of small, independently-executing
//! compute nodes inspired by the TIS-100 puzzle architecture.
//!
//! Each node runs a tiny assembly program against a fixed-size register
//! file (`ACC`/`BAK`) and exchanges values with its four orthogonal
//! neighbors through blocking, unbuffered ports. This crate implements:
//!
//! - the per-node execution engine (instruction decode and state machine), and
//! - the inter-node port handshake that synchronizes reads and writes
//!   across neighbors under a globally stepped simulation clock.
//!
//! A textual REPL, pretty-printing of node state, and a host driver binary
//! are deliberately out of scope — this crate is the engine a driver is
//! built on top of.
//!
//! # Example
//!
//! ```
//! use tis100_core::{Direction, Grid, Node};
//!
//! let mut grid = Grid::new();
//! let a = grid.add_node(Node::new("mov 12, right\nnop", Some("a")));
//! let b = grid.add_node(Node::new("mov left, acc\nnop", Some("b")));
//! grid.connect(a, Direction::Right, b);
//!
//! grid.step_many(2).unwrap();
//! assert_eq!(grid.node(b).acc, 12);
//! ```

#![warn(missing_docs)]

mod direction;
mod error;
mod grid;
mod instruction;
pub mod limits;
mod node;
mod operand;
pub mod parser;
mod rendezvous;

pub use direction::{Direction, ANY_PROBE_ORDER};
pub use error::{CoreError, GridError};
pub use grid::{Grid, NodeId};
pub use instruction::{decode, Instruction};
pub use node::{Mode, Node};
pub use operand::{Operand, ReadDest};
