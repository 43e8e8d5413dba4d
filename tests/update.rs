// tests/update.rs

//! Update orchestration: silent and partitive review, atomic writes, rollback.

mod common;

use common::{AllowAll, FailingRenamer, Scripted, Unattended, text_part};
use mimeogram::config::ProtectionConfig;
use mimeogram::fsprotect::ProtectionCache;
use mimeogram::interactions::{Action, SegmentChoice};
use mimeogram::updaters::temporary_path;
use mimeogram::{Error, LineSeparator, Part, PartsUpdater, ReviewMode, UpdateOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn silent(base: &Path) -> UpdateOptions {
    UpdateOptions::new(ReviewMode::Silent, base)
}

#[test]
fn test_crlf_preserved_on_update() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("file.txt");
    fs::write(&destination, "line1\r\nline2\r\n").unwrap();

    let part = text_part("file.txt", LineSeparator::Crlf, "line1\nline2\nline3\n");
    let summary = PartsUpdater::new(silent(temp.path()), &AllowAll)
        .update(&[part], &mut Unattended)
        .unwrap();

    assert_eq!(summary.applied, 1);
    assert_eq!(fs::read(&destination).unwrap(), b"line1\r\nline2\r\nline3\r\n");
}

#[test]
fn test_rollback_on_mid_run_failure() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("A.txt");
    let b = temp.path().join("B.txt");
    fs::write(&a, "A0").unwrap();
    fs::write(&b, "B0").unwrap();

    let parts = [
        text_part("A.txt", LineSeparator::Lf, "A1"),
        text_part("B.txt", LineSeparator::Lf, "B1"),
    ];
    let renamer = FailingRenamer::for_name("B.txt");
    let err = PartsUpdater::new(silent(temp.path()), &AllowAll)
        .with_renamer(&renamer)
        .update(&parts, &mut Unattended)
        .unwrap_err();

    match &err {
        Error::ContentUpdateFailure { path, .. } => assert_eq!(path, &b),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read(&a).unwrap(), b"A0");
    assert_eq!(fs::read(&b).unwrap(), b"B0");
    assert!(!temporary_path(&b).exists());
}

#[test]
fn test_rollback_removes_created_files() {
    let temp = TempDir::new().unwrap();
    let parts = [
        text_part("new/created.txt", LineSeparator::Lf, "fresh"),
        text_part("B.txt", LineSeparator::Lf, "B1"),
    ];
    let renamer = FailingRenamer::for_name("B.txt");
    let result = PartsUpdater::new(silent(temp.path()), &AllowAll)
        .with_renamer(&renamer)
        .update(&parts, &mut Unattended);

    assert!(result.is_err());
    assert!(!temp.path().join("new/created.txt").exists());
    assert!(!temp.path().join("B.txt").exists());
}

#[test]
fn test_message_part_is_not_written() {
    let temp = TempDir::new().unwrap();
    let parts = [Part::message("hello"), text_part("out.txt", LineSeparator::Lf, "x")];
    let summary = PartsUpdater::new(silent(temp.path()), &AllowAll)
        .update(&parts, &mut Unattended)
        .unwrap();
    assert_eq!(summary.applied, 1);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn test_silent_skips_protected_destinations() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join(".git")).unwrap();
    let protector = ProtectionCache::build(&ProtectionConfig::default(), None, None).unwrap();
    let parts = [
        text_part(".git/config", LineSeparator::Lf, "[core]\n"),
        text_part("src/main.rs", LineSeparator::Lf, "fn main() {}\n"),
    ];

    let summary = PartsUpdater::new(silent(temp.path()), &protector)
        .update(&parts, &mut Unattended)
        .unwrap();
    assert_eq!((summary.applied, summary.protected), (1, 1));
    assert!(!temp.path().join(".git/config").exists());
    assert!(temp.path().join("src/main.rs").exists());

    let mut forced = silent(temp.path());
    forced.disable_protections = true;
    let summary = PartsUpdater::new(forced, &protector)
        .update(&parts, &mut Unattended)
        .unwrap();
    assert_eq!(summary.applied, 2);
    assert!(temp.path().join(".git/config").exists());
}

#[test]
fn test_partitive_without_terminal_behaves_silently() {
    let temp = TempDir::new().unwrap();
    let options = UpdateOptions::new(ReviewMode::Partitive, temp.path());
    let parts = [text_part("a.txt", LineSeparator::Lf, "a")];
    let summary = PartsUpdater::new(options, &AllowAll)
        .update(&parts, &mut Unattended)
        .unwrap();
    assert_eq!(summary.applied, 1);
}

#[test]
fn test_partitive_review() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("merge.txt"), "keep\nold\n").unwrap();
    let parts = [
        text_part("skip.txt", LineSeparator::Lf, "ignored"),
        text_part("merge.txt", LineSeparator::Lf, "keep\nnew\nextra\n"),
    ];
    let mut interactor = Scripted::new([Action::Ignore, Action::Select, Action::Apply]);
    interactor.segments.push_back(SegmentChoice::Reject);

    let options = UpdateOptions::new(ReviewMode::Partitive, temp.path());
    let summary = PartsUpdater::new(options, &AllowAll)
        .update(&parts, &mut interactor)
        .unwrap();

    assert_eq!((summary.applied, summary.ignored), (1, 1));
    assert!(!temp.path().join("skip.txt").exists());
    assert_eq!(
        fs::read_to_string(temp.path().join("merge.txt")).unwrap(),
        "keep\nold\n"
    );
    assert_eq!(interactor.prompted.len(), 3);
}

#[test]
fn test_cancellation_rolls_back() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first.txt");
    fs::write(&first, "before").unwrap();
    let parts = [
        text_part("first.txt", LineSeparator::Lf, "after"),
        text_part("second.txt", LineSeparator::Lf, "never"),
    ];
    // One answer: the second prompt hits end of input
    let mut interactor = Scripted::new([Action::Apply]);
    let options = UpdateOptions::new(ReviewMode::Partitive, temp.path());
    let err = PartsUpdater::new(options, &AllowAll)
        .update(&parts, &mut interactor)
        .unwrap_err();

    assert!(err.is_cancellation());
    assert_eq!(fs::read_to_string(&first).unwrap(), "before");
    assert!(!temp.path().join("second.txt").exists());
}

#[test]
fn test_interrupt_at_later_prompt_restores_earlier_parts() {
    let temp = TempDir::new().unwrap();
    let edited = temp.path().join("edited.txt");
    fs::write(&edited, "original\r\n").unwrap();
    let parts = [
        text_part("edited.txt", LineSeparator::Crlf, "rewritten\n"),
        text_part("created.txt", LineSeparator::Lf, "new\n"),
        text_part("third.txt", LineSeparator::Lf, "unreached\n"),
    ];
    let mut interactor = Scripted::new([Action::Apply, Action::Apply]).interrupting_at(3);
    let options = UpdateOptions::new(ReviewMode::Partitive, temp.path());
    let err = PartsUpdater::new(options, &AllowAll)
        .update(&parts, &mut interactor)
        .unwrap_err();

    match &err {
        Error::UserOperateCancellation(cause) => assert!(cause.contains("interrupted")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(interactor.prompted.len(), 3);
    assert_eq!(fs::read(&edited).unwrap(), b"original\r\n");
    assert!(!temp.path().join("created.txt").exists());
    assert!(!temp.path().join("third.txt").exists());
}

#[test]
fn test_remote_location_is_rejected() {
    let temp = TempDir::new().unwrap();
    let parts = [text_part("https://example.com/x.txt", LineSeparator::Lf, "x")];
    let err = PartsUpdater::new(silent(temp.path()), &AllowAll)
        .update(&parts, &mut Unattended)
        .unwrap_err();
    assert!(matches!(err, Error::LocationInvalidity { .. }));
}
