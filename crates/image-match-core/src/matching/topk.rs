//! Bounded top-K selection over stored descriptors.
//!
//! Keeps at most K candidates in a max-heap keyed by distance, so the worst
//! of the current best K is always on top and can be evicted in O(log K).

use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::descriptor::Descriptor;
use crate::error::DescriptorError;
use crate::types::{DescriptorRecord, MatchResult};

use super::MatchLimit;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    distance: OrderedFloat<f32>,
    identifier: String,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.identifier.cmp(&other.identifier))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Selects the K records closest to a query descriptor.
#[derive(Debug, Clone, Copy)]
pub struct TopKSelector {
    limit: MatchLimit,
}

impl TopKSelector {
    pub fn new(limit: MatchLimit) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> MatchLimit {
        self.limit
    }

    /// Return the closest records, best match first.
    ///
    /// Equal distances are ordered by identifier. Fails on the first record
    /// whose kind differs from the query's.
    pub fn select(
        &self,
        query: &Descriptor,
        records: &[DescriptorRecord],
    ) -> Result<Vec<MatchResult>, DescriptorError> {
        let k = self.limit.resolve(records.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k.min(records.len()) + 1);

        for record in records {
            let distance = OrderedFloat(query.distance(&record.descriptor)?);

            if heap.len() < k {
                heap.push(Candidate {
                    distance,
                    identifier: record.identifier.clone(),
                });
                continue;
            }

            // Only a strictly closer record displaces the current worst.
            let worst = heap.peek().map(|c| c.distance);
            if worst.is_some_and(|worst| distance < worst) {
                heap.pop();
                heap.push(Candidate {
                    distance,
                    identifier: record.identifier.clone(),
                });
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| MatchResult {
                distance: c.distance.into_inner(),
                identifier: c.identifier,
            })
            .collect())
    }
}
