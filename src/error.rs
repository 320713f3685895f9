use thiserror::Error;

/// Errors reported by the ordered containers in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// An order statistic was requested from a tree with no nodes.
    /// Carries the name of the offending operation.
    #[error("{0} on empty search tree")]
    EmptySearchTree(&'static str),
}
