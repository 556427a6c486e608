//! Safe output writer: create, clean, then write through a temporary file.

use crate::error::{GeneratorError, OutputStage};
use crate::generation::render::GeneratedDocument;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Prepare `output_dir` and write `document` into it.
///
/// The directory is created if absent and every existing entry inside it is
/// removed. With no document the directory is left empty. If writing fails,
/// the directory is emptied again rather than left holding a partial file.
pub fn write_output(
    output_dir: &Path,
    document: Option<&GeneratedDocument>,
) -> Result<(), GeneratorError> {
    fs::create_dir_all(output_dir)
        .map_err(|e| GeneratorError::io(OutputStage::CreateDirectory, output_dir, e))?;

    let removed = clear_directory(output_dir)
        .map_err(|e| GeneratorError::io(OutputStage::Cleanup, output_dir, e))?;
    debug!(output_dir = %output_dir.display(), removed, "Cleared previous output");

    let Some(document) = document else {
        return Ok(());
    };

    if let Err(e) = write_atomically(&document.path, document.contents.as_bytes()) {
        if let Err(cleanup) = clear_directory(output_dir) {
            warn!(
                output_dir = %output_dir.display(),
                error = %cleanup,
                "Failed to clean output directory after write failure"
            );
        }
        return Err(GeneratorError::io(OutputStage::Write, &document.path, e));
    }
    Ok(())
}

/// Remove every entry inside `dir`, keeping `dir` itself.
fn clear_directory(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // file_type does not follow symlinks, so a linked directory is unlinked, not emptied.
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed += 1;
    }
    Ok(removed)
}

/// Write to `<path>.tmp` then rename onto `path`.
fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    fs::write(temp_path, contents)?;
    fs::rename(temp_path, path).map_err(|e| {
        let _ = fs::remove_file(temp_path);
        e
    })
}
