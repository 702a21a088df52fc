use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::scanner::WalkerConfig;
use image::{GrayImage, Luma};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn gradient() -> GrayImage {
    GrayImage::from_fn(64, 64, |x, _| Luma([(x * 4) as u8]))
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let report = finder.find_duplicates(dir.path()).unwrap();

    assert!(report.exact_groups.is_empty());
    assert!(report.similar_groups.is_empty());
    assert_eq!(report.summary.total_files, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    for (name, content) in [("a.txt", "content a"), ("b.txt", "content b"), ("c.txt", "c")] {
        File::create(dir.path().join(name))
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(report.exact_groups.is_empty());
    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.summary.fingerprinted_files, 3);
}

#[test]
fn test_scan_end_to_end_text_and_images() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello duplicate world").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello duplicate world").unwrap();

    let img1 = gradient();
    img1.save(dir.path().join("img1.png")).unwrap();

    let mut img2 = gradient();
    for (x, y) in [(3, 5), (40, 12), (17, 60)] {
        let Luma([v]) = *img2.get_pixel(x, y);
        img2.put_pixel(x, y, Luma([v.saturating_add(1)]));
    }
    img2.save(dir.path().join("img2.png")).unwrap();

    // Mirrored gradient: every horizontal comparison flips
    let img3 = GrayImage::from_fn(64, 64, |x, _| Luma([255 - (x * 4) as u8]));
    img3.save(dir.path().join("img3.png")).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    let exact = &report.exact_groups[0];
    assert_eq!(exact.canonical, dir.path().join("a.txt"));
    assert_eq!(exact.duplicates, vec![dir.path().join("b.txt")]);

    assert_eq!(report.similar_groups.len(), 1);
    let similar = &report.similar_groups[0];
    assert_eq!(similar.canonical, dir.path().join("img1.png"));
    assert_eq!(similar.members.len(), 1);
    assert_eq!(similar.members[0].path, dir.path().join("img2.png"));
    assert!(similar.members[0].distance < 10);

    let img3_path = dir.path().join("img3.png");
    assert!(report
        .similar_groups
        .iter()
        .all(|g| g.canonical != img3_path && g.members.iter().all(|m| m.path != img3_path)));

    assert_eq!(report.summary.image_files, 3);
    assert_eq!(report.summary.total_files, 5);
    assert_eq!(report.summary.error_count, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    let deeper = sub.join("deeper");
    fs::create_dir_all(&deeper).unwrap();

    fs::write(dir.path().join("top.txt"), b"shared").unwrap();
    fs::write(sub.join("mid.txt"), b"shared").unwrap();
    fs::write(deeper.join("bottom.txt"), b"shared").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(report.exact_groups.len(), 1);
    assert_eq!(report.exact_groups[0].len(), 3);
    assert_eq!(report.summary.duplicate_files, 2);
    assert_eq!(report.summary.reclaimable_bytes, 12);
}

#[test]
fn test_every_path_in_at_most_one_group() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        let sub = dir.path().join(format!("d{}", i % 5));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("f{i}.bin")), format!("{}", i % 7)).unwrap();
    }

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let mut seen = std::collections::HashSet::new();
    for group in &report.exact_groups {
        for path in group.paths() {
            assert!(seen.insert(path.to_path_buf()), "{} grouped twice", path.display());
        }
    }
    assert_eq!(report.exact_groups.len(), 7);
    assert_eq!(seen.len(), 30);
}

#[test]
fn test_scan_results_do_not_depend_on_worker_count() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        let sub = dir.path().join(format!("dir{}", i % 4));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("{i}.txt")), format!("{}", i % 3)).unwrap();
    }

    let group_sets = |workers: usize| {
        let config = FinderConfig::default()
            .with_walker_config(WalkerConfig::default().with_workers(workers));
        let report = DuplicateFinder::new(config)
            .find_duplicates(dir.path())
            .unwrap();
        let mut groups: Vec<Vec<_>> = report
            .exact_groups
            .iter()
            .map(|g| {
                let mut paths: Vec<_> = g.paths().map(Path::to_path_buf).collect();
                paths.sort();
                paths
            })
            .collect();
        groups.sort();
        groups
    };

    assert_eq!(group_sets(1), group_sets(8));
}

#[test]
fn test_hidden_files_skipped_when_configured() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("visible.txt"), b"same").unwrap();
    fs::write(dir.path().join(".hidden.txt"), b"same").unwrap();

    let report = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(report.exact_groups.len(), 1);

    let config =
        FinderConfig::default().with_walker_config(WalkerConfig::default().with_skip_hidden(true));
    let report = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert!(report.exact_groups.is_empty());
    assert_eq!(report.summary.total_files, 1);
}
