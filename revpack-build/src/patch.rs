//! `dpkg-source --commit` wrapper.

use std::path::{Path, PathBuf};

use revpack_core::{CommandRunner, CommandSpec};

use crate::error::{BuildError, BuildStage};
use crate::ledger::RevisionLabel;

pub fn patch_name(revision: &RevisionLabel) -> String {
    format!("patch_{revision}")
}

/// Record the working-tree diff against the unpacked original as
/// `debian/patches/patch_<revision>`.
///
/// The base revision is the baseline itself, so nothing runs and `None`
/// is returned.
pub fn generate_patch(
    runner: &dyn CommandRunner,
    source_dir: &Path,
    revision: &RevisionLabel,
) -> Result<Option<PathBuf>, BuildError> {
    if revision.is_base() {
        tracing::debug!(revision = %revision, "base revision, no patch");
        return Ok(None);
    }

    let name = patch_name(revision);
    let spec = CommandSpec::new("dpkg-source")
        .args(["-q", "--commit", ".", name.as_str()])
        .current_dir(source_dir)
        .env("EDITOR", "/bin/true")
        .env("VISUAL", "/bin/true");
    let out = runner.run(&spec).map_err(|source| BuildError::Spawn {
        command: spec.to_string(),
        source,
    })?;
    if !out.success() {
        return Err(BuildError::Packaging {
            stage: BuildStage::Patch,
            reason: out.failure_reason(),
        });
    }

    let path = source_dir.join("debian").join("patches").join(&name);
    if !path.exists() {
        tracing::warn!(patch = %path.display(), "dpkg-source reported success but wrote no patch");
    }
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{failed, ok, ScriptedRunner};
    use std::ffi::OsString;
    use tempfile::TempDir;

    #[test]
    fn base_revision_runs_nothing() {
        let tmp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(|_| Ok(ok("")));
        let patch = generate_patch(&runner, tmp.path(), &RevisionLabel::base()).unwrap();
        assert!(patch.is_none());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn later_revision_commits_named_patch_without_editor() {
        let tmp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(|_| Ok(ok("")));
        let rev: RevisionLabel = "dev3".parse().unwrap();

        let patch = generate_patch(&runner, tmp.path(), &rev).unwrap();
        assert_eq!(patch, Some(tmp.path().join("debian/patches/patch_dev3")));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].to_string(), "dpkg-source -q --commit . patch_dev3");
        assert_eq!(calls[0].cwd.as_deref(), Some(tmp.path()));
        assert!(calls[0]
            .env
            .contains(&(OsString::from("EDITOR"), OsString::from("/bin/true"))));
    }

    #[test]
    fn failure_is_fatal_with_tool_output() {
        let tmp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new(|_| Ok(failed(2, "dpkg-source: error: no orig tarball")));
        let rev: RevisionLabel = "dev1".parse().unwrap();

        let err = generate_patch(&runner, tmp.path(), &rev).unwrap_err();
        assert_eq!(err.stage(), Some(BuildStage::Patch));
        assert!(err.to_string().contains("no orig tarball"));
    }
}
