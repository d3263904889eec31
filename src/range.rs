use {crate::RingPosition, num_traits::Bounded};

/// A range of ring positions bounded exclusively below and inclusively above
/// i.e. `(start..end]`.
///
/// This matches successor routing: a virtual node at `end` receives every key
/// hashed after its counter-clockwise neighbour at `start`, up to and
/// including its own position.
///
/// If `start > end`, the range wraps over the origin and covers
/// `(start..MAX]` together with `[MIN..end]`. If `start == end`, it covers
/// the whole ring.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyRange<Idx: Bounded> {
    pub start: Idx,
    pub end: Idx,
}

impl<Idx: Bounded> KeyRange<Idx> {
    pub fn new(start: Idx, end: Idx) -> Self {
        Self { start, end }
    }

    /// The range covering every position, anchored at the origin.
    pub fn whole_ring() -> Self {
        Self::new(Idx::min_value(), Idx::min_value())
    }
}

impl<Idx: Bounded + Ord> KeyRange<Idx> {
    /// Returns `true` if the range crosses the origin.
    pub fn is_wrapping(&self) -> bool {
        self.start > self.end
    }

    pub fn covers_whole_ring(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if a key at `pos` falls into the range.
    ///
    /// ```
    /// use vnode_router::KeyRange;
    ///
    /// let range = KeyRange::new(10u64, 20);
    /// assert!(!range.contains(&10));
    /// assert!(range.contains(&20));
    ///
    /// let wrapping = KeyRange::new(20u64, 10);
    /// assert!(wrapping.contains(&u64::MAX));
    /// assert!(wrapping.contains(&0));
    /// assert!(!wrapping.contains(&15));
    /// ```
    pub fn contains(&self, pos: &Idx) -> bool {
        if self.covers_whole_ring() {
            return true;
        }
        if self.is_wrapping() {
            *pos > self.start || *pos <= self.end
        } else {
            *pos > self.start && *pos <= self.end
        }
    }
}

impl KeyRange<RingPosition> {
    /// Number of positions covered, saturating at `RingPosition::MAX` for the
    /// whole ring.
    pub fn size(&self) -> RingPosition {
        if self.covers_whole_ring() {
            RingPosition::MAX
        } else if self.is_wrapping() {
            RingPosition::MAX - (self.start - self.end) + 1
        } else {
            self.end - self.start
        }
    }
}
