//! Growable array-backed binary minimum-heap with arbitrary-value removal.
//!
//! Each office owns one of these, keyed by raw letter id. Because letter ids
//! are assigned in strictly increasing creation order, minimum extraction is
//! oldest-first among the values currently stored — it is not a
//! business-priority ordering.

use crate::core::error::MailError;

/// Array-backed binary min-heap over copyable ordered values.
///
/// Storage is 0-indexed: parent of `i` is `(i - 1) / 2`, children are
/// `2i + 1` and `2i + 2`. Capacity doubles on overflow (minimum one slot);
/// a failed growth surfaces [`MailError::ResourceExhausted`] and leaves the
/// heap unchanged rather than silently dropping the push.
#[derive(Debug, Clone, Default)]
pub struct MinHeap<T: Ord + Copy> {
    data: Vec<T>,
}

impl<T: Ord + Copy> MinHeap<T> {
    /// Create an empty heap with no preallocated storage.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create an empty heap preallocating `initial_capacity` slots.
    ///
    /// Preallocation is best-effort: if the reservation fails the heap
    /// starts empty and grows on demand.
    #[must_use]
    pub fn with_capacity(initial_capacity: usize) -> Self {
        let mut data = Vec::new();
        let _ = data.try_reserve_exact(initial_capacity);
        Self { data }
    }

    /// Number of values currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the heap holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The minimum stored value, or `None` when empty.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        self.data.first().copied()
    }

    /// Insert a value, sifting it up to restore heap order.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::ResourceExhausted`] if the backing array cannot
    /// grow; the heap is left exactly as it was.
    pub fn push(&mut self, value: T) -> Result<(), MailError> {
        if self.data.len() == self.data.capacity() {
            let target = (self.data.capacity() * 2).max(1);
            self.data
                .try_reserve_exact(target - self.data.len())
                .map_err(|_| MailError::ResourceExhausted)?;
        }
        self.data.push(value);
        self.sift_up(self.data.len() - 1);
        Ok(())
    }

    /// Remove and return the minimum value, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        let last = self.data.len() - 1;
        self.data.swap(0, last);
        let root = self.data.pop();
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        root
    }

    /// Remove the first occurrence of `target`, returning whether it was found.
    ///
    /// The heap has no native delete-arbitrary operation; this drains into a
    /// scratch heap skipping the first match, then reloads. O(n log n), and
    /// the relative order of untouched values after reload is determined by
    /// heap structure — callers must not depend on order stability across a
    /// removal.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::ResourceExhausted`] if the scratch heap cannot
    /// grow. The heap still holds exactly the values it held before the
    /// call (possibly rearranged).
    pub fn remove_value(&mut self, target: T) -> Result<bool, MailError> {
        let mut scratch = Self::with_capacity(self.data.len());
        let mut found = false;
        while let Some(value) = self.pop() {
            if !found && value == target {
                found = true;
            } else if let Err(e) = scratch.push(value) {
                // Reload what was drained so nothing is lost, then fail.
                self.reload_from(&mut scratch);
                self.push(value).ok();
                if found {
                    self.push(target).ok();
                }
                return Err(e);
            }
        }
        self.reload_from(&mut scratch);
        Ok(found)
    }

    fn reload_from(&mut self, scratch: &mut Self) {
        while let Some(value) = scratch.pop() {
            // Cannot fail: the backing array already held these values.
            self.push(value).ok();
        }
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.data[index] >= self.data[parent] {
                break;
            }
            self.data.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;
            if left < self.data.len() && self.data[left] < self.data[smallest] {
                smallest = left;
            }
            if right < self.data.len() && self.data[right] < self.data[smallest] {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.data.swap(index, smallest);
            index = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_min_order() {
        let mut heap = MinHeap::with_capacity(5);
        for v in [10u64, 5, 15, 3, 8] {
            heap.push(v).unwrap();
        }
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.peek(), Some(3));
        assert_eq!(heap.pop(), Some(3));
        assert_eq!(heap.pop(), Some(5));
        assert_eq!(heap.pop(), Some(8));
        assert_eq!(heap.pop(), Some(10));
        assert_eq!(heap.pop(), Some(15));
        assert_eq!(heap.pop(), None);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_empty_reads() {
        let mut heap = MinHeap::<u64>::new();
        assert!(heap.is_empty());
        assert_eq!(heap.peek(), None);
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_grows_from_zero_capacity() {
        let mut heap = MinHeap::new();
        for v in 0..100u64 {
            heap.push(99 - v).unwrap();
        }
        assert_eq!(heap.len(), 100);
        assert_eq!(heap.peek(), Some(0));
    }

    #[test]
    fn test_remove_value_present() {
        let mut heap = MinHeap::new();
        for v in [10u64, 5, 15, 3, 8, 20, 1] {
            heap.push(v).unwrap();
        }
        assert!(heap.remove_value(8).unwrap());
        assert_eq!(heap.len(), 6);
        let mut drained = Vec::new();
        while let Some(v) = heap.pop() {
            drained.push(v);
        }
        assert_eq!(drained, vec![1, 3, 5, 10, 15, 20]);
    }

    #[test]
    fn test_remove_value_absent() {
        let mut heap = MinHeap::new();
        for v in [4u64, 2, 6] {
            heap.push(v).unwrap();
        }
        assert!(!heap.remove_value(5).unwrap());
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.peek(), Some(2));
    }

    #[test]
    fn test_remove_value_first_occurrence_only() {
        let mut heap = MinHeap::new();
        for v in [7u64, 7, 7] {
            heap.push(v).unwrap();
        }
        assert!(heap.remove_value(7).unwrap());
        assert_eq!(heap.len(), 2);
    }
}
