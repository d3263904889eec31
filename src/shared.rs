use {
    crate::{ConsistentHashRouter, DefaultHashing, HashingFunction, Result, RingNode},
    parking_lot::{RwLock, RwLockReadGuard},
    std::sync::Arc,
};

/// Router that can be mutated and queried from many threads at once.
///
/// A read-write lock guards the whole ring: `add_node` and `remove_node`
/// hold the write lock for the full membership change, so a concurrent
/// `route_node` sees the ring either before or after it, never half-way.
/// Clones share the same ring.
pub struct SharedRouter<N: RingNode, H = DefaultHashing> {
    inner: Arc<RwLock<ConsistentHashRouter<N, H>>>,
}

impl<N: RingNode, H> Clone for SharedRouter<N, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: RingNode, H> From<ConsistentHashRouter<N, H>> for SharedRouter<N, H> {
    fn from(router: ConsistentHashRouter<N, H>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(router)),
        }
    }
}

impl<N: RingNode> SharedRouter<N> {
    pub fn new(nodes: impl IntoIterator<Item = N>, vnode_count: usize) -> Result<Self> {
        ConsistentHashRouter::new(nodes, vnode_count).map(Self::from)
    }
}

impl<N: RingNode, H: HashingFunction> SharedRouter<N, H> {
    pub fn add_node(&self, node: impl Into<Arc<N>>, vnode_count: usize) -> Result<()> {
        self.inner.write().add_node(node, vnode_count)
    }

    pub fn remove_node(&self, node: &N) -> usize {
        self.inner.write().remove_node(node)
    }

    /// Routes a key; the owner is returned as an owned handle since the
    /// read lock is released on return.
    pub fn route_node(&self, key: &str) -> Option<Arc<N>> {
        self.inner.read().route_node(key).map(|token| token.shared())
    }

    pub fn replicas(&self, key: &str, k: usize) -> Vec<Arc<N>> {
        self.inner
            .read()
            .replicas(key, k)
            .iter()
            .map(|token| token.shared())
            .collect()
    }

    pub fn existing_replicas(&self, node: &N) -> usize {
        self.inner.read().existing_replicas(node)
    }

    /// Runs several membership changes as one atomic step.
    ///
    /// ```
    /// use vnode_router::SharedRouter;
    ///
    /// let router = SharedRouter::new(["old"], 8).unwrap();
    /// router
    ///     .update(|ring| {
    ///         ring.remove_node(&"old");
    ///         ring.add_node("new", 8)
    ///     })
    ///     .unwrap();
    /// assert_eq!(*router.route_node("k").unwrap(), "new");
    /// ```
    pub fn update<T>(&self, f: impl FnOnce(&mut ConsistentHashRouter<N, H>) -> T) -> T {
        f(&mut self.inner.write())
    }

    /// Locks the ring for reading; useful to route a batch of keys against a
    /// single ring state. Mutations wait until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, ConsistentHashRouter<N, H>> {
        self.inner.read()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }
}
