use dupescan::duplicates::{DiagnosticSink, DuplicateFinder, FinderConfig};
use dupescan::scanner::ScanError;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

#[derive(Default)]
struct CapturedLines(Mutex<Vec<String>>);

impl DiagnosticSink for CapturedLines {
    fn report(&self, line: &str) {
        self.0.lock().unwrap().push(line.to_string());
    }
}

#[test]
fn test_decode_failure_does_not_stop_siblings() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.png"), b"\x89PNG\r\n\x1a\ngarbage").unwrap();
    fs::write(dir.path().join("one.txt"), b"dup").unwrap();
    fs::write(dir.path().join("two.txt"), b"dup").unwrap();

    let sink = Arc::new(CapturedLines::default());
    let report = DuplicateFinder::new(FinderConfig::default().with_diagnostics(sink.clone()))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    assert_eq!(report.summary.error_count, 1);
    match &report.errors[0] {
        ScanError::ImageDecode { path, .. } => assert!(path.ends_with("broken.png")),
        other => panic!("Expected ImageDecode, got {other:?}"),
    }

    let lines = sink.0.lock().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(&dir.path().join("broken.png").display().to_string()));
}

#[test]
fn test_fingerprinted_plus_errored_equals_file_count() {
    let dir = tempdir().unwrap();
    let mut expected = 0;
    for d in 0..4 {
        let sub = dir.path().join(format!("d{d}"));
        fs::create_dir(&sub).unwrap();
        for f in 0..5 {
            fs::write(sub.join(format!("f{f}.txt")), format!("{d}-{f}")).unwrap();
            expected += 1;
        }
        fs::write(sub.join("bad.jpg"), b"\xFF\xD8\xFF\xE0 not a jpeg").unwrap();
        expected += 1;
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.summary.error_count, 4);
    assert_eq!(
        report.summary.fingerprinted_files + report.summary.file_errors,
        expected
    );
    assert_eq!(report.summary.total_files, expected);
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_isolated() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    let open = dir.path().join("open");
    fs::create_dir(&locked).unwrap();
    fs::create_dir(&open).unwrap();
    fs::write(locked.join("hidden.txt"), b"secret").unwrap();
    fs::write(open.join("x.txt"), b"same").unwrap();
    fs::write(open.join("y.txt"), b"same").unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        eprintln!(
            "skipped test_unreadable_directory_is_isolated: directory permissions are not \
             enforced for this user; see walker::tests::test_listing_failure_is_isolated_to_its_subtree"
        );
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    assert_eq!(report.exact_groups[0].len(), 2);
    assert_eq!(report.summary.error_count, 1);
    assert!(report.errors[0].is_directory_error());
    assert_eq!(report.errors[0].path(), locked.as_path());
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_reported() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let file = dir.path().join("private.txt");
    fs::write(&file, b"x").unwrap();
    fs::write(dir.path().join("public.txt"), b"y").unwrap();

    fs::set_permissions(&file, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::File::open(&file).is_ok() {
        eprintln!(
            "skipped test_unreadable_file_is_reported: file permissions are not enforced for this user"
        );
        fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(report.summary.fingerprinted_files, 1);
    assert!(matches!(report.errors[0], ScanError::FileOpen { .. }));
}
