//! Policy text builder.
//!
//! The document is assembled as sections of indented lines and joined once at
//! the end. A [`Section`] cannot be empty, so an empty bucket never produces an
//! empty block, and a [`PolicyDocument`] always holds at least one section.

use crate::generation::sort::ClassifiedOperationSet;
use std::path::{Path, PathBuf};

/// Module providing the shield builder and the default rule.
pub const SHIELD_MODULE: &str = "trpc-shield";
/// Exported binding holding the constructed policy.
pub const POLICY_BINDING: &str = "permissions";
/// Rule every operation is mapped to.
pub const DEFAULT_RULE: &str = "allow";
/// Name of the externally defined context type.
pub const CONTEXT_TYPE: &str = "Context";

const INDENT: &str = "  ";

/// One non-empty `key: { name: allow, ... }` block of the policy object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    key: &'static str,
    names: Vec<String>,
}

impl Section {
    /// `None` when `names` is empty.
    pub fn new(key: &'static str, names: &[String]) -> Option<Self> {
        if names.is_empty() {
            return None;
        }
        Some(Self {
            key,
            names: names.to_vec(),
        })
    }

    pub fn key(&self) -> &str {
        self.key
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    fn write_lines(&self, lines: &mut Lines, depth: usize) {
        lines.push(depth, format!("{}: {{", self.key));
        for name in &self.names {
            lines.push(depth + 1, format!("{}: {},", name, DEFAULT_RULE));
        }
        lines.push(depth, "},");
    }
}

#[derive(Debug, Default)]
struct Lines(Vec<(usize, String)>);

impl Lines {
    fn push(&mut self, depth: usize, text: impl Into<String>) {
        self.0.push((depth, text.into()));
    }

    fn blank(&mut self) {
        self.0.push((0, String::new()));
    }

    fn join(self) -> String {
        let mut out = String::new();
        for (depth, text) in self.0 {
            if !text.is_empty() {
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
                out.push_str(&text);
            }
            out.push('\n');
        }
        out
    }
}

/// Rendered-to-be policy: imports plus the exported shield call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    context_specifier: String,
    sections: Vec<Section>,
}

impl PolicyDocument {
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn context_specifier(&self) -> &str {
        &self.context_specifier
    }

    pub fn render(&self) -> String {
        let mut lines = Lines::default();
        lines.push(
            0,
            format!(
                "import {{ shield, {} }} from '{}';",
                DEFAULT_RULE, SHIELD_MODULE
            ),
        );
        lines.push(
            0,
            format!(
                "import {{ {} }} from '{}';",
                CONTEXT_TYPE, self.context_specifier
            ),
        );
        lines.blank();
        lines.push(
            0,
            format!(
                "export const {} = shield<{}>({{",
                POLICY_BINDING, CONTEXT_TYPE
            ),
        );
        for section in &self.sections {
            section.write_lines(&mut lines, 1);
        }
        lines.push(0, "});");
        lines.join()
    }

    pub fn into_generated(self, path: impl Into<PathBuf>) -> GeneratedDocument {
        GeneratedDocument {
            path: path.into(),
            contents: self.render(),
        }
    }
}

/// Build the policy document. `None` when every bucket is empty.
pub fn build_policy(
    operations: &ClassifiedOperationSet,
    context_specifier: &str,
) -> Option<PolicyDocument> {
    let sections: Vec<Section> = [
        Section::new("query", operations.queries()),
        Section::new("mutation", operations.mutations()),
        Section::new("subscription", operations.subscriptions()),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sections.is_empty() {
        return None;
    }
    Some(PolicyDocument {
        context_specifier: context_specifier.to_string(),
        sections,
    })
}

/// Final text and its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }
}
