#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

mod builder;
mod error;
mod hashing;
mod iter;
mod range;
mod shared;
mod token;
mod vnode;

use {
    crate::{
        iter::RingWalk,
        RingDirection::{Clockwise, CounterClockwise},
    },
    crossbeam_skiplist::SkipMap,
    std::{
        borrow::Cow,
        collections::HashSet,
        ops::Bound::{Excluded, Unbounded},
        sync::Arc,
    },
    tracing::{debug, trace, warn},
};
pub use {
    builder::RouterBuilder,
    error::{Result, RouterError},
    hashing::*,
    range::KeyRange,
    shared::SharedRouter,
    token::RingToken,
    vnode::VirtualNode,
};

/// Physical node that serves as a destination for routed keys.
///
/// The key is the node's identity: it is hashed (with a replica suffix) to
/// place the node's virtual nodes, and two nodes with equal keys are the same
/// node as far as the router is concerned. It must stay stable for as long
/// as the node is on the ring.
pub trait RingNode: Send + Sync + 'static {
    fn key(&self) -> Cow<'_, str>;
}

impl RingNode for String {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl RingNode for &'static str {
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl<N: RingNode + ?Sized> RingNode for Arc<N> {
    fn key(&self) -> Cow<'_, str> {
        (**self).key()
    }
}

/// Number of virtual nodes a physical node gets when none is specified.
pub const DEFAULT_VIRTUAL_NODE_COUNT: usize = 160;

/// Position on the ring.
pub type RingPosition = u64;

/// Defines the direction in which the ring is traversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingDirection {
    Clockwise,
    CounterClockwise,
}

/// Consistent hash router.
///
/// Every physical node is expanded into a number of virtual nodes, each
/// placed on the ring at the hash of `"{node key}-{replica index}"`. A key is
/// routed to the first virtual node at or after the key's own position,
/// wrapping around to the smallest position at the end of the ring.
///
/// Mutation requires `&mut self` while routing only needs `&self`, so a
/// router shared between threads must be wrapped; [`SharedRouter`] does this
/// with a read-write lock.
pub struct ConsistentHashRouter<N: RingNode, H = DefaultHashing> {
    /// Hashing function used to compute ring positions.
    hashing: H,

    /// Virtual nodes keyed by their ring position (sorted in ascending order).
    ring: SkipMap<RingPosition, VirtualNode<N>>,
}

impl<N: RingNode> Default for ConsistentHashRouter<N> {
    fn default() -> Self {
        Self::empty(DefaultHashing::new())
    }
}

impl<N: RingNode> ConsistentHashRouter<N> {
    /// Creates a router using MD5-based positions.
    ///
    /// Each of `nodes` is added with `vnode_count` virtual nodes. An empty
    /// node list yields an empty, but usable, router.
    ///
    /// # Examples
    ///
    /// ```
    /// use vnode_router::ConsistentHashRouter;
    ///
    /// let router = ConsistentHashRouter::new(["cache-1", "cache-2"], 10).unwrap();
    /// assert_eq!(router.len(), 20);
    ///
    /// let owner = router.route_node("user:42").unwrap();
    /// assert!(*owner == "cache-1" || *owner == "cache-2");
    /// ```
    pub fn new(nodes: impl IntoIterator<Item = N>, vnode_count: usize) -> Result<Self> {
        Self::with_hasher(nodes, vnode_count, DefaultHashing::new())
    }

    /// Returns a builder starting from an empty node list,
    /// [`DEFAULT_VIRTUAL_NODE_COUNT`] replicas and the default hashing.
    pub fn builder() -> RouterBuilder<N> {
        RouterBuilder::new()
    }
}

impl<N: RingNode, H: HashingFunction> ConsistentHashRouter<N, H> {
    /// Creates a router with a custom hashing function.
    ///
    /// # Examples
    ///
    /// ```
    /// use vnode_router::{ConsistentHashRouter, Xxh3Hashing};
    ///
    /// let router =
    ///     ConsistentHashRouter::with_hasher(["a", "b"], 4, Xxh3Hashing::new()).unwrap();
    /// assert_eq!(router.node_count(), 2);
    /// ```
    pub fn with_hasher(
        nodes: impl IntoIterator<Item = N>,
        vnode_count: usize,
        hashing: H,
    ) -> Result<Self> {
        let mut router = Self::empty(hashing);
        for node in nodes {
            router.add_node(node, vnode_count)?;
        }
        Ok(router)
    }

    pub(crate) fn empty(hashing: H) -> Self {
        Self {
            hashing,
            ring: SkipMap::new(),
        }
    }

    pub fn hashing_function(&self) -> &H {
        &self.hashing
    }

    /// Adds `vnode_count` virtual nodes for a physical node.
    ///
    /// Replica indices continue after the replicas the node already has, so
    /// calling this repeatedly grows the node's share of the ring. A count of
    /// zero is accepted and changes nothing.
    ///
    /// A virtual node hashed to an occupied position replaces the previous
    /// occupant.
    ///
    /// # Errors
    ///
    /// Fails with [`RouterError::TooManyVirtualNodes`] if replica indices
    /// would overflow `u32`. The ring is left untouched in that case.
    pub fn add_node(&mut self, node: impl Into<Arc<N>>, vnode_count: usize) -> Result<()> {
        let node = node.into();
        let key = node.key().into_owned();
        let existing = self.replica_count(&key);

        let first = u32::try_from(existing).ok();
        let end = existing
            .checked_add(vnode_count)
            .and_then(|end| u32::try_from(end).ok());
        let (Some(first), Some(end)) = (first, end) else {
            return Err(RouterError::TooManyVirtualNodes {
                node: key,
                existing,
                requested: vnode_count,
            });
        };

        for replica in first..end {
            let vnode = VirtualNode::new(Arc::clone(&node), replica);
            let pos = self.hashing.hash(&vnode.key());
            if let Some(occupant) = self.ring.get(&pos) {
                if !occupant.value().belongs_to(&key) {
                    warn!(
                        position = pos,
                        previous = %occupant.value(),
                        replacement = %vnode,
                        "virtual node collision, replacing previous owner"
                    );
                }
            }
            self.ring.insert(pos, vnode);
        }

        debug!(
            node = %key,
            added = vnode_count,
            existing,
            ring_size = self.ring.len(),
            "added node to ring"
        );
        Ok(())
    }

    /// Removes every virtual node of a physical node.
    ///
    /// Returns the number of virtual nodes removed; removing a node that is
    /// not on the ring is a no-op returning `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vnode_router::ConsistentHashRouter;
    ///
    /// let mut router = ConsistentHashRouter::new(["a", "b"], 3).unwrap();
    /// assert_eq!(router.remove_node(&"a"), 3);
    /// assert_eq!(router.remove_node(&"a"), 0);
    /// ```
    pub fn remove_node(&mut self, node: &N) -> usize {
        let key = node.key();
        let mut removed = 0;
        for entry in self.ring.iter() {
            if entry.value().belongs_to(&key) && entry.remove() {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(
                node = %key,
                removed,
                ring_size = self.ring.len(),
                "removed node from ring"
            );
        }
        removed
    }

    /// Returns the token of the virtual node that owns the given key.
    ///
    /// The owner is the first virtual node at or after the key's position,
    /// clockwise. Returns `None` only when the ring is empty.
    pub fn route_node(&self, key: &str) -> Option<RingToken<'_, N>> {
        let pos = self.position(key);
        let token = self.tokens(pos, Clockwise).next();
        if let Some(token) = &token {
            trace!(
                key,
                position = pos,
                owner = %token.virtual_node(),
                owner_position = token.position(),
                "routed key"
            );
        }
        token
    }

    /// Number of virtual nodes on the ring belonging to `node`.
    pub fn existing_replicas(&self, node: &N) -> usize {
        self.replica_count(&node.key())
    }

    fn replica_count(&self, physical_key: &str) -> usize {
        self.ring
            .iter()
            .filter(|entry| entry.value().belongs_to(physical_key))
            .count()
    }

    /// Returns up to `k` distinct physical nodes responsible for the key.
    ///
    /// The first node is the primary node responsible for the key. It is
    /// guaranteed that the first node is the same as the one returned by
    /// [`route_node()`](Self::route_node). Further nodes are found by walking
    /// clockwise and skipping virtual nodes of physical nodes already
    /// selected.
    pub fn replicas(&self, key: &str, k: usize) -> Vec<RingToken<'_, N>> {
        let mut selected: Vec<RingToken<'_, N>> = Vec::with_capacity(k);
        if k == 0 {
            return selected;
        }
        for token in self.tokens(self.position(key), Clockwise) {
            if selected
                .iter()
                .any(|chosen| chosen.physical_key() == token.physical_key())
            {
                continue;
            }
            selected.push(token);
            if selected.len() == k {
                break;
            }
        }
        selected
    }

    /// Returns intervals of the key space controlled by the given node.
    ///
    /// A virtual node at position `p` owns `(q, p]`, where `q` is the position
    /// of the virtual node preceding it counter-clockwise. Consecutive
    /// virtual nodes of the same physical node are coalesced into a single
    /// interval. Knowing these intervals is what allows moving data before a
    /// node is removed.
    ///
    /// Whenever the node has no virtual nodes on the ring, `None` is returned.
    pub fn intervals(&self, node: &N) -> Option<Vec<KeyRange<RingPosition>>> {
        let key = node.key();
        let owned = self
            .ring
            .iter()
            .map(|entry| (*entry.key(), entry.value().belongs_to(&key)))
            .collect::<Vec<_>>();

        if !owned.iter().any(|&(_, mine)| mine) {
            return None;
        }
        // Every range starts right after a foreign virtual node.
        let Some(pivot) = owned.iter().position(|&(_, mine)| !mine) else {
            return Some(vec![KeyRange::whole_ring()]);
        };

        let mut ranges = Vec::new();
        let mut start = owned[pivot].0;
        let mut end = None;
        for step in 1..=owned.len() {
            let (pos, mine) = owned[(pivot + step) % owned.len()];
            if mine {
                end = Some(pos);
            } else {
                if let Some(end) = end.take() {
                    ranges.push(KeyRange::new(start, end));
                }
                start = pos;
            }
        }
        Some(ranges)
    }

    /// Returns ring position to which a given key will be assigned.
    pub fn position(&self, key: &str) -> RingPosition {
        self.hashing.hash(key)
    }

    /// Returns virtual node positions (tokens) starting from the given
    /// location on the ring.
    ///
    /// Clockwise traversal starts at the first position `>= start`;
    /// counter-clockwise traversal starts at the last position `<= start`.
    /// Either way every virtual node is visited exactly once, wrapping past
    /// the end (or the beginning) of the ring.
    pub fn tokens(
        &self,
        start: RingPosition,
        dir: RingDirection,
    ) -> impl DoubleEndedIterator<Item = RingToken<'_, N>> + '_ {
        match dir {
            Clockwise => RingWalk::Clockwise(
                self.ring
                    .range(start..)
                    .chain(self.ring.range(..start)),
            ),
            CounterClockwise => RingWalk::CounterClockwise(
                self.ring
                    .range(..=start)
                    .rev()
                    .chain(self.ring.range((Excluded(start), Unbounded)).rev()),
            ),
        }
        .map(Into::into)
    }

    /// Returns distinct physical nodes, in ring order of their first virtual
    /// node.
    pub fn nodes(&self) -> Vec<Arc<N>> {
        let mut seen = HashSet::new();
        self.ring
            .iter()
            .filter(|entry| seen.insert(entry.value().physical_key().to_owned()))
            .map(|entry| Arc::clone(entry.value().shared_node()))
            .collect()
    }

    /// Number of distinct physical nodes on the ring.
    pub fn node_count(&self) -> usize {
        self.ring
            .iter()
            .map(|entry| entry.value().physical_key().to_owned())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn contains_node(&self, node: &N) -> bool {
        let key = node.key();
        self.ring.iter().any(|entry| entry.value().belongs_to(&key))
    }

    /// Returns the number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` if the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Places virtual nodes at fixed positions; routed keys are numbers.
    fn fixed(key: &str) -> RingPosition {
        match key {
            "a-0" => 100,
            "b-0" => 200,
            "c-0" => 300,
            "a-1" => 400,
            "x-0" => 200,
            other => other.parse().unwrap_or(0),
        }
    }

    fn fixed_router() -> ConsistentHashRouter<&'static str, fn(&str) -> RingPosition> {
        ConsistentHashRouter::with_hasher(["a", "b", "c"], 1, fixed as fn(&str) -> RingPosition)
            .unwrap()
    }

    #[track_caller]
    fn assert_walk(
        router: &ConsistentHashRouter<&'static str, fn(&str) -> RingPosition>,
        start: RingPosition,
        dir: RingDirection,
        expected: Vec<&'static str>,
    ) {
        let walked = router
            .tokens(start, dir)
            .map(|token| *token.node())
            .collect::<Vec<_>>();
        assert_eq!(walked, expected);
    }

    #[test]
    fn successor_routing() {
        let router = fixed_router();
        assert_eq!(*router.route_node("0").unwrap(), "a");
        assert_eq!(*router.route_node("100").unwrap(), "a");
        assert_eq!(*router.route_node("101").unwrap(), "b");
        assert_eq!(*router.route_node("200").unwrap(), "b");
        assert_eq!(*router.route_node("250").unwrap(), "c");
    }

    #[test]
    fn routing_wraps_around() {
        let router = fixed_router();
        let max = u64::MAX.to_string();
        for key in ["301", "1000", max.as_str()] {
            let token = router.route_node(key).unwrap();
            assert_eq!(*token, "a");
            assert_eq!(token.position(), 100);
        }
    }

    #[test]
    fn tokens_corner_cases() {
        let router = fixed_router();
        let test_cases = vec![
            (0, Clockwise, vec!["a", "b", "c"]),
            (0, CounterClockwise, vec!["c", "b", "a"]),
            (100, Clockwise, vec!["a", "b", "c"]),
            (100, CounterClockwise, vec!["a", "c", "b"]),
            (150, Clockwise, vec!["b", "c", "a"]),
            (150, CounterClockwise, vec!["a", "c", "b"]),
            (u64::MAX, Clockwise, vec!["a", "b", "c"]),
            (u64::MAX, CounterClockwise, vec!["c", "b", "a"]),
        ];
        for (start, dir, expected) in test_cases {
            assert_walk(&router, start, dir, expected);
        }
    }

    #[test]
    fn incremental_replicas_continue_numbering() {
        let mut router = fixed_router();
        assert_eq!(router.existing_replicas(&"a"), 1);

        router.add_node("a", 1).unwrap();
        assert_eq!(router.existing_replicas(&"a"), 2);
        let replicas = router
            .tokens(0, Clockwise)
            .filter(|token| *token == "a")
            .map(|token| (token.position(), token.virtual_node().replica()))
            .collect::<Vec<_>>();
        assert_eq!(replicas, vec![(100, 0), (400, 1)]);

        // Keys past `c` now stop at the second replica of `a`.
        assert_eq!(router.route_node("350").unwrap().position(), 400);
    }

    #[test]
    fn collision_last_write_wins() {
        let mut router = fixed_router();
        router.add_node("x", 1).unwrap();

        assert_eq!(router.len(), 3);
        assert_eq!(*router.route_node("150").unwrap(), "x");
        assert_eq!(router.existing_replicas(&"b"), 0);
        assert!(!router.contains_node(&"b"));

        assert_eq!(router.remove_node(&"x"), 1);
        assert_eq!(*router.route_node("150").unwrap(), "c");
    }

    #[test]
    fn zero_replicas_is_noop() {
        let mut router = fixed_router();
        router.add_node("d", 0).unwrap();
        assert_eq!(router.len(), 3);
        assert!(!router.contains_node(&"d"));
    }

    #[test]
    fn replica_index_overflow_leaves_ring_untouched() {
        let mut router = fixed_router();
        let err = router.add_node("d", usize::MAX).unwrap_err();
        assert_eq!(err, RouterError::TooManyVirtualNodes {
            node: "d".to_owned(),
            existing: 0,
            requested: usize::MAX,
        });
        assert_eq!(router.len(), 3);
    }

    #[test]
    fn replicas_are_distinct() {
        let mut router = fixed_router();
        router.add_node("a", 1).unwrap();

        // 350 -> a(400), then wraps to a(100) which is skipped.
        let owners = router
            .replicas("350", 3)
            .iter()
            .map(|token| *token.node())
            .collect::<Vec<_>>();
        assert_eq!(owners, vec!["a", "b", "c"]);

        assert_eq!(router.replicas("350", 10).len(), 3);
        assert!(router.replicas("350", 0).is_empty());
    }

    #[test]
    fn intervals_follow_successor_ownership() {
        let mut router = fixed_router();
        assert_eq!(router.intervals(&"b"), Some(vec![KeyRange::new(100, 200)]));
        assert_eq!(router.intervals(&"a"), Some(vec![KeyRange::new(300, 100)]));
        assert_eq!(router.intervals(&"d"), None);

        // a(400) and a(100) are adjacent once `a` gets a second replica.
        router.add_node("a", 1).unwrap();
        assert_eq!(router.intervals(&"a"), Some(vec![KeyRange::new(300, 100)]));

        router.remove_node(&"b");
        router.remove_node(&"c");
        assert_eq!(router.intervals(&"a"), Some(vec![KeyRange::whole_ring()]));
    }

    #[test]
    fn nodes_in_ring_order() {
        let mut router = fixed_router();
        router.add_node("a", 1).unwrap();
        let nodes = router.nodes().iter().map(|n| **n).collect::<Vec<_>>();
        assert_eq!(nodes, vec!["a", "b", "c"]);
        assert_eq!(router.node_count(), 3);
        assert_eq!(router.len(), 4);
    }

    #[test]
    fn empty_router() {
        let router = ConsistentHashRouter::<String>::default();
        assert!(router.is_empty());
        assert!(router.route_node("anything").is_none());
        assert!(router.replicas("anything", 3).is_empty());
        assert_eq!(router.tokens(0, CounterClockwise).count(), 0);
    }
}
