/// Fixed-capacity circular buffer. Pre-allocated, no heap allocs after init.
pub struct RingBuffer<T> {
    buf: Vec<T>,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// `capacity` must be non-zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![T::default(); capacity.max(1)],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn push(&mut self, value: T) {
        let cap = self.capacity();
        self.buf[self.head] = value;
        self.head = (self.head + 1) % cap;
        self.len = (self.len + 1).min(cap);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently pushed value.
    #[cfg(test)]
    pub fn latest(&self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let cap = self.capacity();
        Some(self.buf[(self.head + cap - 1) % cap])
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let cap = self.capacity();
        let start = if self.len < cap { 0 } else { self.head };
        (0..self.len).map(move |i| &self.buf[(start + i) % cap])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fills_then_wraps() {
        let mut r = RingBuffer::<u32>::new(3);
        assert!(r.is_empty());
        assert_eq!(r.latest(), None);
        r.push(1);
        r.push(2);
        assert_eq!(r.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        r.push(3);
        r.push(4);
        assert_eq!(r.len(), 3);
        assert_eq!(r.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(r.latest(), Some(4));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut r = RingBuffer::<f64>::new(0);
        r.push(1.5);
        assert_eq!(r.capacity(), 1);
        assert_eq!(r.latest(), Some(1.5));
    }
}
