//! Atomic changelog prepend.
//!
//! 1. Render the entry block.
//! 2. Read the existing changelog bytes (empty when absent).
//! 3. Write `entry + "\n\n" + existing` to `<path>.revpack.tmp`.
//! 4. Rename over the changelog.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::engine::ChangelogRenderer;
use crate::entry::ChangelogEntry;
use crate::error::{io_err, ChangelogError};

/// Prepend `entry` to the changelog at `path`, creating it if absent.
///
/// Prior content is kept byte-for-byte below the inserted blank line.
pub fn prepend_entry(
    path: &Path,
    renderer: &ChangelogRenderer,
    entry: &ChangelogEntry,
) -> Result<(), ChangelogError> {
    let block = renderer.render(entry)?;

    let existing = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(io_err(path, e)),
    };

    let mut content = Vec::with_capacity(block.len() + 2 + existing.len());
    content.extend_from_slice(block.as_bytes());
    content.extend_from_slice(b"\n\n");
    content.extend_from_slice(&existing);

    let tmp = PathBuf::from(format!("{}.revpack.tmp", path.display()));
    write_via_tmp(path, &tmp, &content)?;

    tracing::debug!(
        path = %path.display(),
        package = %entry.package,
        revision = %entry.revision,
        "changelog updated"
    );
    Ok(())
}

fn write_via_tmp(path: &Path, tmp: &Path, content: &[u8]) -> Result<(), ChangelogError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

/// First line of the changelog, or `None` when the file is absent or empty.
pub fn latest_header(path: &Path) -> Result<Option<String>, ChangelogError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(path, e)),
    };
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|e| io_err(path, e))?;
    let line = line.trim_end_matches(['\n', '\r']);
    Ok((!line.is_empty()).then(|| line.to_string()))
}
