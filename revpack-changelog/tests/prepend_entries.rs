//! Changelog prepend behaviour across successive builds.

use revpack_changelog::{prepend_entry, ChangelogEntry, ChangelogRenderer};
use tempfile::TempDir;

fn entry(revision: &str, comment: &[&str]) -> ChangelogEntry {
    ChangelogEntry {
        package: "foo".to_string(),
        version: "1.0".to_string(),
        revision: revision.to_string(),
        distribution: "trusty".to_string(),
        urgency: "low".to_string(),
        comment: comment.iter().map(|s| s.to_string()).collect(),
        maintainer: "Developer <dev@localhost>".to_string(),
        timestamp: "Tue, 07 Jan 2025 09:00:00 +0000".to_string(),
    }
}

#[test]
fn prior_content_is_preserved_byte_for_byte() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("changelog");
    // Odd whitespace, CRLF and non-UTF-8 bytes must survive untouched.
    let prior: &[u8] = b"foo (0.9-1) trusty; urgency=low\r\n\n  * old\t\n\n -- Someone \xff <x@y>  date\n";
    std::fs::write(&path, prior).expect("seed");

    let renderer = ChangelogRenderer::new(None).expect("renderer");
    prepend_entry(&path, &renderer, &entry("dev0", &[])).expect("prepend");

    let after = std::fs::read(&path).expect("read");
    let block = renderer.render(&entry("dev0", &[])).expect("render");
    let mut expected = block.into_bytes();
    expected.extend_from_slice(b"\n\n");
    expected.extend_from_slice(prior);
    assert_eq!(after, expected);
}

#[test]
fn entries_stack_newest_first() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("debian").join("changelog");
    let renderer = ChangelogRenderer::new(None).expect("renderer");

    prepend_entry(&path, &renderer, &entry("dev0", &[])).expect("dev0");
    prepend_entry(&path, &renderer, &entry("dev1", &["fix login"])).expect("dev1");
    prepend_entry(&path, &renderer, &entry("dev2", &[])).expect("dev2");

    let content = std::fs::read_to_string(&path).expect("read");
    let headers: Vec<&str> = content
        .lines()
        .filter(|l| l.starts_with("foo ("))
        .collect();
    assert_eq!(
        headers,
        vec![
            "foo (1.0-dev2) trusty; urgency=low",
            "foo (1.0-dev1) trusty; urgency=low",
            "foo (1.0-dev0) trusty; urgency=low",
        ]
    );
    assert!(content.contains("  * Building 1.0-dev1\n  * fix login\n"));
}
