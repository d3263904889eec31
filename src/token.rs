use {
    crate::{RingNode, RingPosition, VirtualNode},
    crossbeam_skiplist::map::Entry,
    std::{borrow::Borrow, ops::Deref, sync::Arc},
};

/// A virtual node together with the ring position it occupies.
///
/// Thin wrapper around `crossbeam_skiplist::map::Entry`, borrowed from the
/// router. Dereferences to the physical node.
#[derive(Clone, Debug)]
pub struct RingToken<'a, T>(Entry<'a, RingPosition, VirtualNode<T>>);

impl<T: RingNode> RingToken<'_, T> {
    /// Return the position of the virtual node on the ring.
    pub fn position(&self) -> RingPosition {
        *self.0.key()
    }

    pub fn virtual_node(&self) -> &VirtualNode<T> {
        self.0.value()
    }

    /// Return the physical node that owns this token.
    pub fn node(&self) -> &T {
        self.0.value().node()
    }

    /// Return an owned handle to the physical node, detached from the router
    /// borrow.
    pub fn shared(&self) -> Arc<T> {
        Arc::clone(self.0.value().shared_node())
    }

    pub fn physical_key(&self) -> &str {
        self.0.value().physical_key()
    }
}

impl<T> Deref for RingToken<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.0.value().node()
    }
}

impl<T> AsRef<T> for RingToken<'_, T> {
    fn as_ref(&self) -> &T {
        self.0.value().node()
    }
}

impl<T> Borrow<T> for RingToken<'_, T> {
    fn borrow(&self) -> &T {
        self.0.value().node()
    }
}

impl<'a, T> From<Entry<'a, RingPosition, VirtualNode<T>>> for RingToken<'a, T> {
    fn from(entry: Entry<'a, RingPosition, VirtualNode<T>>) -> Self {
        Self(entry)
    }
}

impl<T: RingNode> PartialEq for RingToken<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.position() == other.position()
    }
}

impl<T: RingNode> Eq for RingToken<'_, T> {}

/// Tokens compare equal to the physical node that owns them.
impl<T: RingNode> PartialEq<T> for RingToken<'_, T> {
    fn eq(&self, other: &T) -> bool {
        self.virtual_node().is_virtual_node_of(other)
    }
}

impl<T: RingNode> PartialEq<&T> for RingToken<'_, T> {
    fn eq(&self, other: &&T) -> bool {
        self.virtual_node().is_virtual_node_of(other)
    }
}

impl<T: RingNode> PartialOrd for RingToken<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: RingNode> Ord for RingToken<'_, T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.position().cmp(&other.position())
    }
}
