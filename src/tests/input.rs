use super::{find_patch_files, read_patch_files};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_directory_search_filters_by_extension() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("b.patch"), "").unwrap();
    fs::write(dir.path().join("nested/a.PATCH"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();

    let found = find_patch_files(vec![dir.path().to_path_buf()], &["patch".to_string()]).unwrap();

    assert_eq!(
        found,
        vec![dir.path().join("b.patch"), dir.path().join("nested/a.PATCH")]
    );
}

#[test]
fn test_explicit_files_are_kept_whatever_the_extension() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("custom.txt");
    fs::write(&file, "").unwrap();

    let found = find_patch_files(vec![file.clone(), file.clone()], &["patch".to_string()]).unwrap();

    assert_eq!(found, vec![file]);
}

#[test]
fn test_read_errors_do_not_stop_other_files() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.patch");
    let missing = dir.path().join("missing.patch");
    let binary = dir.path().join("binary.patch");
    fs::write(&good, "<Patch>\n</Patch>\n").unwrap();
    fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();

    let (texts, errors) = read_patch_files(&[missing.clone(), good.clone(), binary.clone()]);

    assert_eq!(texts.len(), 1);
    assert_eq!(texts[&good], "<Patch>\n</Patch>\n");
    let failed: Vec<_> = errors.iter().map(|e| e.path.clone()).collect();
    assert_eq!(failed, vec![missing, binary]);
    assert!(errors[0]
        .to_string()
        .contains("Check that you have permission to read the file."));
}
