use crate::{
    ConsistentHashRouter,
    DefaultHashing,
    HashingFunction,
    Result,
    RingNode,
    SharedRouter,
    DEFAULT_VIRTUAL_NODE_COUNT,
};

/// Collects router settings before placing any node on the ring.
///
/// # Examples
///
/// ```
/// use vnode_router::{ConsistentHashRouter, Xxh3Hashing};
///
/// let router = ConsistentHashRouter::builder()
///     .nodes(["db-1", "db-2", "db-3"])
///     .virtual_nodes(32)
///     .hasher(Xxh3Hashing::with_seed(7))
///     .build()
///     .unwrap();
/// assert_eq!(router.len(), 96);
/// ```
#[derive(Debug, Clone)]
pub struct RouterBuilder<N, H = DefaultHashing> {
    nodes: Vec<N>,
    virtual_nodes: usize,
    hashing: H,
}

impl<N: RingNode> Default for RouterBuilder<N> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            virtual_nodes: DEFAULT_VIRTUAL_NODE_COUNT,
            hashing: DefaultHashing::new(),
        }
    }
}

impl<N: RingNode> RouterBuilder<N> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N: RingNode, H: HashingFunction> RouterBuilder<N, H> {
    pub fn node(mut self, node: N) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn nodes(mut self, nodes: impl IntoIterator<Item = N>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Virtual nodes given to each initial node.
    pub fn virtual_nodes(mut self, count: usize) -> Self {
        self.virtual_nodes = count;
        self
    }

    /// Replaces the hashing function; nodes collected so far are kept.
    pub fn hasher<G: HashingFunction>(self, hashing: G) -> RouterBuilder<N, G> {
        RouterBuilder {
            nodes: self.nodes,
            virtual_nodes: self.virtual_nodes,
            hashing,
        }
    }

    pub fn build(self) -> Result<ConsistentHashRouter<N, H>> {
        ConsistentHashRouter::with_hasher(self.nodes, self.virtual_nodes, self.hashing)
    }

    pub fn build_shared(self) -> Result<SharedRouter<N, H>> {
        self.build().map(SharedRouter::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let router = RouterBuilder::new().node("a").build().unwrap();
        assert_eq!(router.existing_replicas(&"a"), DEFAULT_VIRTUAL_NODE_COUNT);
    }

    #[test]
    fn custom_hasher_keeps_nodes() {
        let router = RouterBuilder::new()
            .nodes(["a", "b"])
            .virtual_nodes(2)
            .hasher(|key: &str| key.bytes().fold(0u64, |h, b| h * 31 + u64::from(b)))
            .build()
            .unwrap();
        assert_eq!(router.node_count(), 2);
        assert_eq!(router.len(), 4);
    }

    #[test]
    fn empty_builder_routes_nothing() {
        let shared = RouterBuilder::<String>::new().build_shared().unwrap();
        assert!(shared.route_node("key").is_none());
    }
}
