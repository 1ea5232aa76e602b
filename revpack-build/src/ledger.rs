//! Revision ledger: `<project root>/revisions.txt`.
//!
//! One entry per line, newest first:
//!
//! ```text
//! dev2 :: Tue, 07 Jan 2025 09:00:00 +0000
//! dev1 :: Mon, 06 Jan 2025 14:03:11 +0000
//! dev0 :: Mon, 06 Jan 2025 10:12:45 +0000
//! ```
//!
//! Only the first line is parsed when issuing a revision. Older lines are
//! carried forward byte-for-byte. Writes use the same `.tmp` + rename
//! pattern as the changelog.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use revpack_changelog::debian_timestamp;

use crate::error::{io_err, BuildError};

pub const BASE_PREFIX: &str = "dev";
const SEPARATOR: &str = "::";

// ---------------------------------------------------------------------------
// RevisionLabel
// ---------------------------------------------------------------------------

/// A parsed revision label: alphabetic prefix plus counter, e.g. `dev12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionLabel {
    prefix: String,
    number: u64,
}

impl RevisionLabel {
    /// `dev0`, issued on the first build of a project.
    pub fn base() -> Self {
        RevisionLabel {
            prefix: BASE_PREFIX.to_string(),
            number: 0,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn is_base(&self) -> bool {
        *self == Self::base()
    }

    /// Same prefix, counter plus one. `None` on overflow.
    pub fn next(&self) -> Option<Self> {
        Some(RevisionLabel {
            prefix: self.prefix.clone(),
            number: self.number.checked_add(1)?,
        })
    }
}

impl fmt::Display for RevisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.number)
    }
}

impl Serialize for RevisionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for RevisionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| format!("label `{s}` has no trailing revision number"))?;
        let (prefix, digits) = s.split_at(split);
        if !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("label `{s}` prefix must be letters only"));
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("label `{s}` has a non-numeric revision number"));
        }
        let number = digits
            .parse::<u64>()
            .map_err(|e| format!("label `{s}`: {e}"))?;
        Ok(RevisionLabel {
            prefix: prefix.to_string(),
            number,
        })
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub label: RevisionLabel,
    pub timestamp: String,
}

impl LedgerEntry {
    fn parse(line: &str) -> Result<Self, String> {
        let (label, timestamp) = line
            .split_once(SEPARATOR)
            .ok_or_else(|| format!("missing `{SEPARATOR}` separator in `{line}`"))?;
        Ok(LedgerEntry {
            label: label.trim().parse()?,
            timestamp: timestamp.trim().to_string(),
        })
    }
}

fn corrupt(path: &Path, line: usize, reason: impl Into<String>) -> BuildError {
    BuildError::LedgerCorrupt {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>, BuildError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

fn first_entry(path: &Path, bytes: &[u8]) -> Result<LedgerEntry, BuildError> {
    let end = bytes.iter().position(|b| *b == b'\n').unwrap_or(bytes.len());
    let line = std::str::from_utf8(&bytes[..end])
        .map_err(|_| corrupt(path, 1, "first line is not valid UTF-8"))?
        .trim_end_matches('\r');
    if line.trim().is_empty() {
        return Err(corrupt(path, 1, "ledger is empty"));
    }
    LedgerEntry::parse(line).map_err(|reason| corrupt(path, 1, reason))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Issue and persist the next revision for the ledger at `path`.
///
/// Absent ledger: `dev0` is issued and the file created. Otherwise the first
/// entry is advanced by one and prepended.
pub fn next_revision(path: &Path, now: DateTime<Utc>) -> Result<RevisionLabel, BuildError> {
    let existing = read_bytes(path)?;
    let next = match &existing {
        None => RevisionLabel::base(),
        Some(bytes) => first_entry(path, bytes)?
            .label
            .next()
            .ok_or_else(|| corrupt(path, 1, "revision number overflow"))?,
    };

    let line = format!("{next} {SEPARATOR} {}\n", debian_timestamp(now));
    let mut content = line.into_bytes();
    if let Some(bytes) = existing {
        content.extend_from_slice(&bytes);
    }
    write_atomic(path, &content)?;

    tracing::debug!(ledger = %path.display(), revision = %next, "revision issued");
    Ok(next)
}

/// Every entry, newest first. An absent ledger yields an empty list.
pub fn read_entries(path: &Path) -> Result<Vec<LedgerEntry>, BuildError> {
    let Some(bytes) = read_bytes(path)? else {
        return Ok(Vec::new());
    };
    let text = String::from_utf8(bytes).map_err(|_| corrupt(path, 0, "not valid UTF-8"))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| LedgerEntry::parse(line).map_err(|reason| corrupt(path, idx + 1, reason)))
        .collect()
}

/// The most recent entry, or `None` when no build has happened yet.
pub fn latest(path: &Path) -> Result<Option<LedgerEntry>, BuildError> {
    match read_bytes(path)? {
        None => Ok(None),
        Some(bytes) => first_entry(path, &bytes).map(Some),
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), BuildError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let tmp = PathBuf::from(format!("{}.revpack.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use tempfile::TempDir;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, hour, 0, 0).unwrap()
    }

    #[test]
    fn absent_ledger_issues_base() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("revisions.txt");

        let rev = next_revision(&path, at(10)).unwrap();
        assert_eq!(rev, RevisionLabel::base());
        assert!(rev.is_base());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "dev0 :: Mon, 06 Jan 2025 10:00:00 +0000\n"
        );
    }

    #[test]
    fn subsequent_revisions_prepend() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("revisions.txt");

        next_revision(&path, at(10)).unwrap();
        let rev = next_revision(&path, at(11)).unwrap();
        assert_eq!(rev.to_string(), "dev1");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "dev1 :: Mon, 06 Jan 2025 11:00:00 +0000\n\
             dev0 :: Mon, 06 Jan 2025 10:00:00 +0000\n"
        );
        assert!(!tmp.path().join("revisions.txt.revpack.tmp").exists());
    }

    #[test]
    fn prefix_is_carried_forward() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("revisions.txt");
        std::fs::write(&path, "rc41 :: whenever\nold junk kept as-is\n").unwrap();

        let rev = next_revision(&path, at(9)).unwrap();
        assert_eq!(rev.prefix(), "rc");
        assert_eq!(rev.number(), 42);
        assert!(!rev.is_base());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("rc41 :: whenever\nold junk kept as-is\n"));
    }

    #[test]
    fn bare_number_label_keeps_empty_prefix() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("revisions.txt");
        std::fs::write(&path, "3 :: Mon, 06 Jan 2025 10:00:00 +0000\n").unwrap();

        let rev = next_revision(&path, at(11)).unwrap();
        assert_eq!(rev.prefix(), "");
        assert_eq!(rev.number(), 4);
        assert_eq!(rev.to_string(), "4");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("4 :: Mon, 06 Jan 2025 11:00:00 +0000\n3 :: "));

        assert_eq!(next_revision(&path, at(12)).unwrap().to_string(), "5");
    }

    #[test]
    fn failed_rename_removes_tmp_file() {
        let tmp = TempDir::new().unwrap();
        // A non-empty directory in the way makes the rename fail.
        let path = tmp.path().join("revisions.txt");
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let err = write_atomic(&path, b"dev0 :: now\n").unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }), "got: {err}");
        assert!(!tmp.path().join("revisions.txt.revpack.tmp").exists());
    }

    #[rstest]
    #[case("dev3 Mon, 06 Jan 2025\n")]
    #[case("dev :: Mon, 06 Jan 2025\n")]
    #[case("dev3x :: Mon, 06 Jan 2025\n")]
    #[case("dév3 :: Mon, 06 Jan 2025\n")]
    #[case("dev18446744073709551616 :: overflow\n")]
    #[case("dev18446744073709551615 :: last\n")]
    #[case("")]
    #[case("\n")]
    fn corrupt_ledger_is_rejected_and_untouched(#[case] contents: &str) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("revisions.txt");
        std::fs::write(&path, contents).unwrap();

        let err = next_revision(&path, at(10)).unwrap_err();
        assert!(matches!(err, BuildError::LedgerCorrupt { line: 1, .. }), "got: {err}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn read_entries_and_latest() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("revisions.txt");
        assert!(read_entries(&path).unwrap().is_empty());
        assert!(latest(&path).unwrap().is_none());

        for hour in 8..11 {
            next_revision(&path, at(hour)).unwrap();
        }
        let entries = read_entries(&path).unwrap();
        let labels: Vec<String> = entries.iter().map(|e| e.label.to_string()).collect();
        assert_eq!(labels, vec!["dev2", "dev1", "dev0"]);
        assert_eq!(entries[2].timestamp, "Mon, 06 Jan 2025 08:00:00 +0000");
        assert_eq!(latest(&path).unwrap().unwrap().label.to_string(), "dev2");
    }

    #[test]
    fn read_entries_reports_bad_line_number() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("revisions.txt");
        std::fs::write(&path, "dev1 :: a\ngarbage\ndev0 :: b\n").unwrap();
        let err = read_entries(&path).unwrap_err();
        assert!(matches!(err, BuildError::LedgerCorrupt { line: 2, .. }), "got: {err}");
    }
}
