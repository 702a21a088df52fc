use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::scanner::{resolve_scan_root, RootError, WalkerConfig};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_unicode_file_names() {
    let dir = tempdir().unwrap();
    let names = ["日本語.txt", "émoji_🎉.txt", "Ελληνικά.txt"];
    for name in names {
        fs::write(dir.path().join(name), b"unicode content").unwrap();
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    let group = &report.exact_groups[0];
    assert_eq!(group.len(), 3);
    for name in names {
        assert!(group.paths().any(|p| p.ends_with(name)));
    }
}

#[test]
fn test_names_with_spaces() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("my photos");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("holiday copy.txt"), b"x").unwrap();
    fs::write(dir.path().join("holiday.txt"), b"x").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    assert_eq!(report.exact_groups[0].canonical, dir.path().join("holiday.txt"));
    assert_eq!(
        report.exact_groups[0].duplicates,
        vec![sub.join("holiday copy.txt")]
    );
}

#[test]
fn test_empty_files_group_together() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.empty"), b"").unwrap();
    fs::write(dir.path().join("b.empty"), b"").unwrap();
    fs::write(dir.path().join("c.txt"), b"not empty").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    assert_eq!(report.exact_groups[0].size, 0);
    assert_eq!(report.exact_groups[0].len(), 2);
    assert_eq!(report.summary.reclaimable_bytes, 0);
}

#[test]
fn test_file_argument_scans_containing_directory() {
    let dir = tempdir().unwrap();
    let album = dir.path().join("album");
    fs::create_dir(&album).unwrap();
    let file = album.join("first.txt");
    fs::write(&file, b"twin").unwrap();
    fs::write(album.join("second.txt"), b"twin").unwrap();
    fs::write(dir.path().join("outside.txt"), b"twin").unwrap();

    let root = resolve_scan_root(&file).unwrap();
    assert_eq!(root, album);

    let report = DuplicateFinder::with_defaults().find_duplicates(&root).unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    assert_eq!(report.exact_groups[0].len(), 2);
    assert!(report.exact_groups[0]
        .paths()
        .all(|p| p.starts_with(&album)));
}

#[test]
fn test_missing_argument_is_not_found() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        resolve_scan_root(&dir.path().join("ghost")),
        Err(RootError::NotFound(_))
    ));
}

#[test]
fn test_deeply_nested_tree() {
    let dir = tempdir().unwrap();
    let mut path = dir.path().to_path_buf();
    for depth in 0..40 {
        path = path.join(format!("level{depth}"));
    }
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("deep.txt"), b"bottom").unwrap();
    fs::write(dir.path().join("a_shallow.txt"), b"bottom").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    assert_eq!(report.exact_groups[0].canonical, dir.path().join("a_shallow.txt"));
}

#[cfg(unix)]
#[test]
fn test_symlinks_ignored_by_default() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("real.txt"), b"target").unwrap();
    symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.exact_groups.is_empty());
    assert_eq!(report.summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_followed_file_symlink_groups_with_target() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("real.txt"), b"target").unwrap();
    symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

    let config =
        FinderConfig::default().with_walker_config(WalkerConfig::default().with_follow_symlinks(true));
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    assert_eq!(report.exact_groups[0].len(), 2);
}

#[cfg(unix)]
#[test]
fn test_symlink_loop_does_not_hang() {
    use std::os::unix::fs::symlink;

    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    symlink(dir.path(), sub.join("back")).unwrap();
    fs::write(sub.join("f.txt"), b"data").unwrap();

    let config =
        FinderConfig::default().with_walker_config(WalkerConfig::default().with_follow_symlinks(true));
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.summary.total_files, 1);
}
