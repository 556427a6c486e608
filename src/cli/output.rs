//! CLI output: error mapping and run summaries.

use crate::error::GeneratorError;
use crate::generation::GenerationReport;

/// Map a generator error to a string for CLI output, including its causes.
pub fn map_error(e: &GeneratorError) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str("\n  caused by: ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// One-line summary of a finished run.
pub fn format_report(report: &GenerationReport) -> String {
    match &report.output_path {
        Some(path) => format!(
            "Wrote {} ({} queries, {} mutations across {} models)",
            path.display(),
            report.queries,
            report.mutations,
            report.models
        ),
        None => "No operations found; output directory left empty".to_string(),
    }
}
