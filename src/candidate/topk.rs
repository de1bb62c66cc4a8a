//! Top-K selection of match records.

use crate::search::MatchRecord;
use std::cmp::Ordering;

/// Best first: normalized score, then pixel count, then target order.
fn record_cmp_desc(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    b.normalized_score
        .total_cmp(&a.normalized_score)
        .then_with(|| b.pixel.match_count.cmp(&a.pixel.match_count))
        .then_with(|| a.target_index.cmp(&b.target_index))
}

/// Sorts records best first with deterministic tie-breaking.
pub fn sort_records_desc(records: &mut [MatchRecord]) {
    records.sort_by(record_cmp_desc);
}

/// Top-K container with O(k) insertion cost.
#[derive(Clone, Debug)]
pub struct TopK {
    k: usize,
    items: Vec<MatchRecord>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k),
        }
    }

    /// Pushes a record, evicting the worst one if at capacity.
    pub fn push(&mut self, record: MatchRecord) {
        if self.k == 0 {
            return;
        }
        if self.items.len() < self.k {
            self.items.push(record);
            return;
        }

        let mut worst_idx = 0usize;
        for (idx, item) in self.items.iter().enumerate().skip(1) {
            if record_cmp_desc(item, &self.items[worst_idx]) == Ordering::Greater {
                worst_idx = idx;
            }
        }

        if record_cmp_desc(&record, &self.items[worst_idx]) == Ordering::Less {
            self.items[worst_idx] = record;
        }
    }

    /// Returns the kept records, best first.
    pub fn into_sorted_desc(mut self) -> Vec<MatchRecord> {
        sort_records_desc(&mut self.items);
        self.items
    }
}

impl Extend<MatchRecord> for TopK {
    fn extend<I: IntoIterator<Item = MatchRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}
