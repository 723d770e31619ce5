//! Fixed-capacity ring buffer.
//!
//! Backs the calibration stability window and the gaze smoothing window.
//! Storage is an inline array with a write cursor, so pushing never
//! allocates and the oldest entry is overwritten once full.

/// Ring buffer holding at most `N` values, iterated oldest to newest.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    slots: [T; N],
    /// Index the next push writes to.
    head: usize,
    len: usize,
}

impl<T: Copy + Default, const N: usize> RingBuffer<T, N> {
    pub fn new() -> Self {
        Self {
            slots: [T::default(); N],
            head: 0,
            len: 0,
        }
    }

    /// Append a value, returning the evicted oldest value when full.
    pub fn push(&mut self, value: T) -> Option<T> {
        if N == 0 {
            return Some(value);
        }
        let evicted = (self.len == N).then(|| self.slots[self.head]);
        self.slots[self.head] = value;
        self.head = (self.head + 1) % N;
        self.len = (self.len + 1).min(N);
        evicted
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Value at `index`, counted from the oldest entry.
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let start = (self.head + N - self.len) % N;
        Some(self.slots[(start + index) % N])
    }

    /// All values, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// The last `count` values (or fewer if not available), oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = T> + '_ {
        let skip = self.len.saturating_sub(count);
        (skip..self.len).filter_map(move |i| self.get(i))
    }
}

impl<T: Copy + Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full_then_evict_oldest() {
        let mut ring: RingBuffer<u32, 3> = RingBuffer::new();
        assert!(ring.is_empty());
        assert_eq!(ring.push(1), None);
        assert_eq!(ring.push(2), None);
        assert_eq!(ring.push(3), None);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.push(4), Some(1));
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let mut ring: RingBuffer<u32, 5> = RingBuffer::new();
        for v in 1..=7 {
            ring.push(v);
        }
        assert_eq!(ring.recent(2).collect::<Vec<_>>(), vec![6, 7]);
        assert_eq!(ring.recent(10).collect::<Vec<_>>(), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_clear() {
        let mut ring: RingBuffer<u32, 2> = RingBuffer::new();
        ring.push(9);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.get(0), None);
        ring.push(5);
        assert_eq!(ring.iter().collect::<Vec<_>>(), vec![5]);
    }
}
