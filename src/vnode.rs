use {
    crate::RingNode,
    std::{fmt, sync::Arc},
};

/// One of the ring positions held on behalf of a physical node.
///
/// The physical node is shared, not owned: all replicas of a node point to
/// the same `Arc`. The physical key is captured on creation, so ownership
/// checks never call back into [`RingNode::key`].
#[derive(Debug)]
pub struct VirtualNode<N> {
    node: Arc<N>,
    physical_key: String,
    replica: u32,
}

impl<N: RingNode> VirtualNode<N> {
    pub fn new(node: Arc<N>, replica: u32) -> Self {
        let physical_key = node.key().into_owned();
        Self {
            node,
            physical_key,
            replica,
        }
    }

    /// Key that is hashed to place this replica on the ring.
    ///
    /// ```
    /// use {std::sync::Arc, vnode_router::VirtualNode};
    ///
    /// let vnode = VirtualNode::new(Arc::new("cache-1"), 3);
    /// assert_eq!(vnode.key(), "cache-1-3");
    /// ```
    pub fn key(&self) -> String {
        format!("{}-{}", self.physical_key, self.replica)
    }

    /// Returns `true` if this replica was created for `node`.
    ///
    /// Identity is decided by key equality alone.
    pub fn is_virtual_node_of(&self, node: &N) -> bool {
        self.belongs_to(&node.key())
    }
}

impl<N> VirtualNode<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn shared_node(&self) -> &Arc<N> {
        &self.node
    }

    pub fn physical_key(&self) -> &str {
        &self.physical_key
    }

    pub fn replica(&self) -> u32 {
        self.replica
    }

    pub(crate) fn belongs_to(&self, physical_key: &str) -> bool {
        self.physical_key == physical_key
    }
}

impl<N> Clone for VirtualNode<N> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            physical_key: self.physical_key.clone(),
            replica: self.replica,
        }
    }
}

impl<N> fmt::Display for VirtualNode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.physical_key, self.replica)
    }
}
