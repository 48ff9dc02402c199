//! Per-term champion lists: the `capacity` postings with the highest tf.
//!
//! Selection runs while the finalize pass computes each posting's tf, so the
//! selector only ever holds `capacity` entries. A capacity of zero turns the
//! selector into a no-op and every champion list stays empty.

use crate::DocId;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Min-heap key: lowest tf on top; among equal tf, the smallest doc id, which
/// is the earliest offered since postings arrive in ascending id order.
type HeapEntry = Reverse<(OrderedFloat<f64>, DocId)>;

#[derive(Debug)]
pub struct ChampionSelector {
    capacity: usize,
    heap: BinaryHeap<HeapEntry>,
}

impl ChampionSelector {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, heap: BinaryHeap::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Consider one posting. Below capacity it is always kept; at capacity it
    /// replaces the current minimum only when its tf is strictly greater.
    pub fn offer(&mut self, doc_id: DocId, tf: f64) {
        if self.capacity == 0 {
            return;
        }
        let entry = Reverse((OrderedFloat(tf), doc_id));
        if self.heap.len() < self.capacity {
            self.heap.push(entry);
            return;
        }
        let evict = match self.heap.peek() {
            Some(Reverse((min_tf, _))) => tf > min_tf.0,
            None => false,
        };
        if evict {
            self.heap.pop();
            self.heap.push(entry);
        }
    }

    /// Champions ordered by tf descending, ties by doc id ascending.
    pub fn finish(self) -> Vec<(DocId, f64)> {
        let mut out: Vec<(DocId, f64)> = self
            .heap
            .into_iter()
            .map(|Reverse((tf, doc_id))| (doc_id, tf.0))
            .collect();
        out.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        out
    }
}
