//! Relative import resolution for the externally defined context type.
//!
//! Resolution is purely lexical: the context file is not required to exist
//! yet, and symlinks are not followed.

use crate::error::ConfigurationError;
use std::path::{Component, Path, PathBuf};

/// Source extensions dropped from the final specifier.
const STRIPPED_EXTENSIONS: &[&str] = &[".d.ts", ".ts", ".tsx", ".mts", ".cts"];

/// Compute the import specifier that refers to `context_path` from a file
/// generated inside `output_dir`.
///
/// A relative `context_path` is anchored at `schema_root`. The result always
/// uses `/` separators and starts with `./` or `../`.
pub fn resolve_import_specifier(
    output_dir: &Path,
    context_path: &Path,
    schema_root: &Path,
) -> Result<String, ConfigurationError> {
    if context_path.as_os_str().is_empty() {
        return Err(ConfigurationError::MissingContextPath);
    }
    if !schema_root.is_absolute() {
        return Err(ConfigurationError::RelativePath {
            field: "schemaRootPath",
            path: schema_root.to_path_buf(),
        });
    }
    if !output_dir.is_absolute() {
        return Err(ConfigurationError::RelativePath {
            field: "outputDirectory",
            path: output_dir.to_path_buf(),
        });
    }

    let unresolvable = |reason: &str| ConfigurationError::UnresolvableContextPath {
        path: context_path.to_path_buf(),
        reason: reason.to_string(),
    };

    let target = anchor_context_path(context_path, schema_root)
        .ok_or_else(|| unresolvable("it escapes the filesystem root"))?;
    let base = normalize(dunce::simplified(output_dir))
        .ok_or_else(|| unresolvable("the output directory escapes the filesystem root"))?;

    let segments = relative_segments(&base, &target)
        .ok_or_else(|| unresolvable("it shares no root with the output directory"))?;
    let Some((last, parents)) = segments.split_last() else {
        return Err(unresolvable("it points at the output directory itself"));
    };
    let mut segments: Vec<String> = parents.to_vec();
    segments.push(strip_source_extension(last).to_string());

    let joined = segments.join("/");
    if joined.starts_with("../") {
        Ok(joined)
    } else {
        Ok(format!("./{}", joined))
    }
}

/// Absolute, normalized location of the context file.
pub(crate) fn anchor_context_path(context_path: &Path, schema_root: &Path) -> Option<PathBuf> {
    let context_path = portable(context_path);
    let target = if context_path.is_absolute() {
        context_path
    } else {
        schema_root.join(context_path)
    };
    normalize(dunce::simplified(&target))
}

/// Treat `\` as a separator on every host.
fn portable(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) if text.contains('\\') => PathBuf::from(text.replace('\\', "/")),
        _ => path.to_path_buf(),
    }
}

/// Lexically normalize an absolute path. `None` if `..` climbs past the root.
pub(crate) fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                normalized.pop();
                depth -= 1;
            }
            Component::Normal(name) => {
                normalized.push(name);
                depth += 1;
            }
        }
    }
    Some(normalized)
}

/// Segments leading from `base` to `target`, both normalized and absolute.
fn relative_segments(base: &Path, target: &Path) -> Option<Vec<String>> {
    let base: Vec<Component> = base.components().collect();
    let target: Vec<Component> = target.components().collect();

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();
    // Absolute paths on different drives share no leading component.
    if common == 0 {
        return None;
    }

    let mut segments = vec!["..".to_string(); base.len() - common];
    for component in &target[common..] {
        segments.push(component.as_os_str().to_str()?.to_string());
    }
    Some(segments)
}

fn strip_source_extension(segment: &str) -> &str {
    STRIPPED_EXTENSIONS
        .iter()
        .find_map(|ext| {
            segment
                .strip_suffix(ext)
                .filter(|stem| !stem.is_empty())
        })
        .unwrap_or(segment)
}
