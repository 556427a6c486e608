//! Operation classification: maps each operation kind to a bucket using a
//! table chosen once per run from the upstream provider's format version.

use crate::error::ConfigurationError;
use crate::model::{ModelOperationEntry, ProviderIdentity};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Query,
    Mutation,
    /// Reserved. No operation kind maps here yet.
    Subscription,
}

const QUERY_KINDS: &[&str] = &["findUnique", "findFirst", "findMany", "aggregate", "groupBy"];

const LEGACY_MUTATION_KINDS: &[&str] = &[
    "create",
    "update",
    "delete",
    "upsert",
    "updateMany",
    "deleteMany",
];

const CURRENT_MUTATION_KINDS: &[&str] = &[
    "createOne",
    "updateOne",
    "deleteOne",
    "upsertOne",
    "updateMany",
    "deleteMany",
];

/// Kinds that only the legacy table knows.
const LEGACY_ONLY_KINDS: &[&str] = &["create", "update", "delete", "upsert"];

/// Kinds that only the current table knows.
const CURRENT_ONLY_KINDS: &[&str] = &["createOne", "updateOne", "deleteOne", "upsertOne"];

/// Classification table per upstream model description format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationTable {
    /// Client majors 2 to 4: single-record writes use short kinds (`create`).
    Legacy,
    /// Client majors 5 and 6: single-record writes use `...One` kinds (`createOne`).
    Current,
}

impl ClassificationTable {
    /// Select the table matching the provider's format version.
    ///
    /// `Ok(None)` when the provider carries no version; the table is then
    /// detected from the model description with [`ClassificationTable::detect`].
    pub fn select(provider: &ProviderIdentity) -> Result<Option<Self>, ConfigurationError> {
        if !provider.is_companion() {
            return Err(ConfigurationError::UnsupportedProvider(provider.name.clone()));
        }
        match provider.major_version()? {
            None => Ok(None),
            Some(2..=4) => Ok(Some(ClassificationTable::Legacy)),
            Some(5..=6) => Ok(Some(ClassificationTable::Current)),
            Some(_) => Err(ConfigurationError::UnsupportedProviderVersion {
                provider: provider.name.clone(),
                version: provider.version.clone().unwrap_or_default(),
            }),
        }
    }

    /// Detect the table from the single-record write kinds present in `entries`.
    ///
    /// Entries using neither vocabulary classify identically under both
    /// tables, so `Current` is returned for them. Both vocabularies in one
    /// description is a configuration error.
    pub fn detect(
        provider: &ProviderIdentity,
        entries: &[ModelOperationEntry],
    ) -> Result<Self, ConfigurationError> {
        let uses = |kinds: &[&str]| entries.iter().any(|e| kinds.contains(&e.kind.as_str()));
        match (uses(LEGACY_ONLY_KINDS), uses(CURRENT_ONLY_KINDS)) {
            (true, true) => Err(ConfigurationError::UndetectedProviderVersion {
                provider: provider.name.clone(),
                reason: "it mixes legacy and current operation kinds".to_string(),
            }),
            (true, false) => Ok(ClassificationTable::Legacy),
            (false, _) => Ok(ClassificationTable::Current),
        }
    }

    fn mutation_kinds(self) -> &'static [&'static str] {
        match self {
            ClassificationTable::Legacy => LEGACY_MUTATION_KINDS,
            ClassificationTable::Current => CURRENT_MUTATION_KINDS,
        }
    }

    /// Bucket for an operation kind, `None` for kinds this table does not know.
    pub fn bucket(self, kind: &str) -> Option<Bucket> {
        if QUERY_KINDS.contains(&kind) {
            Some(Bucket::Query)
        } else if self.mutation_kinds().contains(&kind) {
            Some(Bucket::Mutation)
        } else {
            None
        }
    }
}

/// Unsorted classification result. Sort with [`OperationBuckets::into_sorted`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationBuckets {
    pub queries: Vec<String>,
    pub mutations: Vec<String>,
    pub subscriptions: Vec<String>,
    /// Entries whose kind the table did not recognize.
    pub ignored: usize,
}

impl OperationBuckets {
    fn push(mut self, bucket: Option<Bucket>, name: &str) -> Self {
        match bucket {
            Some(Bucket::Query) => self.queries.push(name.to_string()),
            Some(Bucket::Mutation) => self.mutations.push(name.to_string()),
            Some(Bucket::Subscription) => self.subscriptions.push(name.to_string()),
            None => self.ignored += 1,
        }
        self
    }
}

/// Classify entries into query, mutation, and subscription buckets.
pub fn classify(entries: &[ModelOperationEntry], table: ClassificationTable) -> OperationBuckets {
    entries.iter().fold(OperationBuckets::default(), |buckets, entry| {
        let bucket = table.bucket(&entry.kind);
        if bucket.is_none() {
            debug!(model = %entry.model, kind = %entry.kind, "Ignoring unrecognized operation kind");
        }
        buckets.push(bucket, &entry.name)
    })
}
