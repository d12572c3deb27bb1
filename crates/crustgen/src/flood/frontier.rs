use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

/// Queued vertex of a priority fill, ordered by key then by vertex id
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate {
    pub key: f32,
    pub id: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Vertices waiting to be visited by a fill
#[derive(Clone, Debug)]
pub(crate) enum Frontier {
    /// Breadth-first
    Fifo(VecDeque<u32>),
    /// Lowest key first; equal keys pop the lowest id
    Priority(BinaryHeap<Reverse<Candidate>>),
}

impl Frontier {
    pub fn fifo() -> Self {
        Self::Fifo(VecDeque::new())
    }

    pub fn priority() -> Self {
        Self::Priority(BinaryHeap::new())
    }

    /// `key` is ignored by FIFO frontiers
    pub fn push(&mut self, id: u32, key: f32) {
        match self {
            Self::Fifo(queue) => queue.push_back(id),
            Self::Priority(heap) => heap.push(Reverse(Candidate { key, id })),
        }
    }

    pub fn pop(&mut self) -> Option<u32> {
        match self {
            Self::Fifo(queue) => queue.pop_front(),
            Self::Priority(heap) => heap.pop().map(|Reverse(c)| c.id),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Fifo(queue) => queue.len(),
            Self::Priority(heap) => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
