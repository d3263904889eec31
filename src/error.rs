/// Errors surfaced by router construction and mutation.
///
/// Routing itself never fails: an empty ring yields `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// Replica indices of a physical node would no longer fit into `u32`.
    #[error("too many virtual nodes for {node}: {existing} existing + {requested} requested")]
    TooManyVirtualNodes {
        /// Key of the physical node being added.
        node: String,
        /// Virtual nodes the physical node already owns.
        existing: usize,
        /// Virtual nodes requested by the call.
        requested: usize,
    },
}

pub type Result<T> = std::result::Result<T, RouterError>;
