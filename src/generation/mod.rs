pub mod classify;
pub mod render;
pub mod resolve;
pub mod run;
pub mod sort;
pub mod write;

pub use classify::{classify, Bucket, ClassificationTable, OperationBuckets};
pub use render::{build_policy, GeneratedDocument, PolicyDocument, Section};
pub use resolve::resolve_import_specifier;
pub use run::{GenerationConfig, GenerationReport, Generator, ValidatedConfig, SHIELD_FILE_NAME};
pub use sort::ClassifiedOperationSet;
pub use write::write_output;
