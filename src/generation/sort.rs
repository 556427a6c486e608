//! Deterministic ordering of classified operation names.

use crate::generation::classify::OperationBuckets;

/// Classified operation names, each bucket strictly ascending by byte-wise
/// string order. Only constructible by sorting [`OperationBuckets`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedOperationSet {
    queries: Vec<String>,
    mutations: Vec<String>,
    subscriptions: Vec<String>,
}

impl ClassifiedOperationSet {
    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn mutations(&self) -> &[String] {
        &self.mutations
    }

    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty() && self.mutations.is_empty() && self.subscriptions.is_empty()
    }
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort_unstable();
    names.dedup();
    names
}

impl OperationBuckets {
    pub fn into_sorted(self) -> ClassifiedOperationSet {
        ClassifiedOperationSet {
            queries: sorted(self.queries),
            mutations: sorted(self.mutations),
            subscriptions: sorted(self.subscriptions),
        }
    }
}

impl From<OperationBuckets> for ClassifiedOperationSet {
    fn from(buckets: OperationBuckets) -> Self {
        buckets.into_sorted()
    }
}
