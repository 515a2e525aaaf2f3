//! Array-backed binary min-heap used as the search frontier.
//!
//! The heap maps a priority to an opaque payload. It has no decrease-key:
//! callers that improve a node's priority push a second entry and discard
//! the stale one when it is popped later.

/// A single heap slot
#[derive(Debug, Clone)]
struct Entry<P, T> {
    priority: P,
    value: T,
}

/// Binary min-heap keyed by `P`.
///
/// Entries with equal priority come out in unspecified order.
#[derive(Debug, Clone)]
pub struct MinHeap<P, T> {
    entries: Vec<Entry<P, T>>,
}

impl<P: PartialOrd, T> MinHeap<P, T> {
    /// Create an empty heap
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create an empty heap with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert `value` with the given priority. O(log n).
    pub fn push(&mut self, value: T, priority: P) {
        self.entries.push(Entry { priority, value });
        self.sift_up(self.entries.len() - 1);
    }

    /// Remove and return the minimum-priority value. O(log n).
    ///
    /// # Panics
    /// Panics if the heap is empty. Use [`MinHeap::try_pop`] when emptiness
    /// is an expected outcome.
    pub fn pop(&mut self) -> T {
        match self.try_pop() {
            Some(value) => value,
            None => panic!("pop called on an empty MinHeap"),
        }
    }

    /// Remove and return the minimum-priority value, or `None` when empty
    pub fn try_pop(&mut self) -> Option<T> {
        self.pop_entry().map(|(value, _)| value)
    }

    /// Remove the minimum entry and return it together with its priority
    pub fn pop_entry(&mut self) -> Option<(T, P)> {
        if self.entries.is_empty() {
            return None;
        }
        let entry = self.entries.swap_remove(0);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((entry.value, entry.priority))
    }

    /// Observe the minimum-priority value without removing it.
    ///
    /// # Panics
    /// Panics if the heap is empty.
    pub fn peek(&self) -> &T {
        match self.entries.first() {
            Some(entry) => &entry.value,
            None => panic!("peek called on an empty MinHeap"),
        }
    }

    /// Priority of the current minimum, if any
    pub fn peek_priority(&self) -> Option<&P> {
        self.entries.first().map(|entry| &entry.priority)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, keeping the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.entries[index].priority >= self.entries[parent].priority {
                break;
            }
            self.entries.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.entries.len();
        loop {
            let mut child = 2 * index + 1;
            if child >= len {
                break;
            }
            // Pick the smaller of the two children
            if child + 1 < len && self.entries[child + 1].priority < self.entries[child].priority {
                child += 1;
            }
            if self.entries[index].priority <= self.entries[child].priority {
                break;
            }
            self.entries.swap(index, child);
            index = child;
        }
    }
}

impl<P: PartialOrd, T> Default for MinHeap<P, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PartialOrd, T> Extend<(T, P)> for MinHeap<P, T> {
    fn extend<I: IntoIterator<Item = (T, P)>>(&mut self, iter: I) {
        for (value, priority) in iter {
            self.push(value, priority);
        }
    }
}

/// The queue contract the best-first search is written against.
///
/// `pop` on an empty frontier is a contract violation; the search only
/// calls it after checking `is_empty`.
pub trait Frontier<T, P> {
    fn push(&mut self, value: T, priority: P);
    fn pop(&mut self) -> T;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: PartialOrd, T> Frontier<T, P> for MinHeap<P, T> {
    fn push(&mut self, value: T, priority: P) {
        MinHeap::push(self, value, priority);
    }

    fn pop(&mut self) -> T {
        MinHeap::pop(self)
    }

    fn len(&self) -> usize {
        MinHeap::len(self)
    }

    fn is_empty(&self) -> bool {
        MinHeap::is_empty(self)
    }
}
