/// Walk over ring entries in either direction.
///
/// Both directions chain two sub-ranges of the skip map, which have distinct
/// types; the enum lets `tokens()` return a single iterator type.
pub(crate) enum RingWalk<C, A> {
    Clockwise(C),
    CounterClockwise(A),
}

impl<C, A, V> Iterator for RingWalk<C, A>
where
    C: Iterator<Item = V>,
    A: Iterator<Item = V>,
{
    type Item = V;

    fn next(&mut self) -> Option<V> {
        match self {
            Self::Clockwise(walk) => walk.next(),
            Self::CounterClockwise(walk) => walk.next(),
        }
    }
}

impl<C, A, V> DoubleEndedIterator for RingWalk<C, A>
where
    C: DoubleEndedIterator<Item = V>,
    A: DoubleEndedIterator<Item = V>,
{
    fn next_back(&mut self) -> Option<V> {
        match self {
            Self::Clockwise(walk) => walk.next_back(),
            Self::CounterClockwise(walk) => walk.next_back(),
        }
    }
}
