//! Pristine `<name>_<version>.orig.tar.gz` creation.

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::Builder;

use crate::error::{io_err, BuildError};

/// Names never archived, at any depth.
const EXCLUDED: &[&str] = &[".git"];

/// Archive `source_dir` into a gzip tarball at `dest` with every entry
/// under `<top>/`. Version-control metadata is left out.
///
/// The archive is written to `<dest>.revpack.tmp` and renamed into place.
pub fn create_orig_tarball(source_dir: &Path, top: &str, dest: &Path) -> Result<(), BuildError> {
    let tmp = PathBuf::from(format!("{}.revpack.tmp", dest.display()));
    if let Err(e) = write_archive(source_dir, top, &tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, dest).map_err(|e| io_err(dest, e))?;
    tracing::info!(tarball = %dest.display(), "original tarball created");
    Ok(())
}

fn write_archive(source_dir: &Path, top: &str, out: &Path) -> Result<(), BuildError> {
    let file = File::create(out).map_err(|e| io_err(out, e))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut tar = Builder::new(encoder);
    tar.follow_symlinks(false);

    tar.append_dir(top, source_dir)
        .map_err(|e| io_err(source_dir, e))?;
    append_tree(&mut tar, source_dir, Path::new(top))?;

    let encoder = tar.into_inner().map_err(|e| io_err(out, e))?;
    encoder.finish().map_err(|e| io_err(out, e))?;
    Ok(())
}

fn append_tree<W: std::io::Write>(
    tar: &mut Builder<W>,
    dir: &Path,
    prefix: &Path,
) -> Result<(), BuildError> {
    let mut entries = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io_err(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name();
        if EXCLUDED.iter().any(|x| name == *x) {
            continue;
        }
        let path = entry.path();
        let archived = prefix.join(&name);
        let meta = std::fs::symlink_metadata(&path).map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            tar.append_dir(&archived, &path)
                .map_err(|e| io_err(&path, e))?;
            append_tree(tar, &path, &archived)?;
        } else {
            tar.append_path_with_name(&path, &archived)
                .map_err(|e| io_err(&path, e))?;
        }
    }
    Ok(())
}
