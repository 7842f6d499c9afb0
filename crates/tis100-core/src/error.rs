//! Error taxonomy for the execution engine.
//!
//! Errors abort the current [`crate::Node::step`] call. Decode always
//! precedes mutation, so no partial register state survives a raised error.
//! Stalls (an unfulfilled `READ`/`WRITE`) are not represented here — they are
//! expected, ordinary node states, not failures.

/// Errors raised while decoding or executing a node's program.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A jump or branch referenced a label that does not exist in the
    /// node's label table. Raised at execution time, not at parse time.
    #[error("unknown label: {0}")]
    UnknownLabel(String),

    /// A decoded line does not match any instruction form in the grammar.
    #[error("illegal instruction: {0}")]
    IllegalInstruction(String),

    /// A direction-keyed lookup received a tag that does not name one of
    /// the four cardinal neighbors. This is an internal invariant — it
    /// should never arise from a well-formed program.
    #[error("unknown direction: {0}")]
    UnknownDirection(String),
}

/// Result type for node decode/execution.
pub type Result<T> = std::result::Result<T, CoreError>;

/// An error raised while stepping a specific node inside a [`crate::Grid`].
///
/// Wraps the originating node's identity alongside its [`CoreError`], since
/// the error alone does not say which node in the arena produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("node {node:?}: {source}")]
pub struct GridError {
    /// The node that raised the error.
    pub node: crate::grid::NodeId,
    /// The underlying error.
    #[source]
    pub source: CoreError,
}
