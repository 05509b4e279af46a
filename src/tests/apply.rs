use super::{apply_changes, rewrite, validate_groups, Outcome};
use crate::error::ApplyError;
use crate::parser::parse;
use crate::patch::{RecordSet, Status};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const EXAMPLE: &str = "\
<Patch>
patch_name = `PatchA`
patch_enable = `yes`
</Patch>

<Patch>
patch_name = `PatchB`
patch_enable = `no`
patch_group = `G1`
</Patch>
";

const GROUPED: &str = "\
<Patch>
patch_name = `Light`
patch_enable = `yes`
patch_group = `Theme`
</Patch>
<Patch>
patch_name = `Dark`
patch_enable = `no`
patch_group = `Theme`
</Patch>
<Patch>
patch_name = `Loose`
patch_enable = `yes`
</Patch>
";

fn write_patch(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn load(paths: &[PathBuf]) -> (RecordSet, BTreeMap<PathBuf, String>) {
    let mut records = RecordSet::new();
    let mut texts = BTreeMap::new();
    for path in paths {
        let text = fs::read_to_string(path).unwrap();
        records.insert(path.clone(), parse(&text, path).records);
        texts.insert(path.clone(), text);
    }
    (records, texts)
}

#[test]
fn test_unchanged_statuses_round_trip() {
    for text in [EXAMPLE, GROUPED] {
        let records = parse(text, Path::new("x.patch")).records;
        let out = rewrite(Path::new("x.patch"), text, &records).unwrap();
        assert_eq!(out, text);
    }
}

#[test]
fn test_single_toggle_changes_only_that_token() {
    let mut records = parse(EXAMPLE, Path::new("x.patch")).records;
    records[1].status = Status::Enabled;

    let out = rewrite(Path::new("x.patch"), EXAMPLE, &records).unwrap();

    assert_eq!(out, EXAMPLE.replacen("patch_enable = `no`", "patch_enable = `yes`", 1));
    let span = records[1].status_span.clone();
    assert_eq!(&out[..span.start], &EXAMPLE[..span.start]);
    assert_eq!(&out[span.start + "`yes`".len()..], &EXAMPLE[span.end..]);
}

#[test]
fn test_cumulative_rewrite_with_length_changes() {
    let mut records = parse(GROUPED, Path::new("x.patch")).records;
    for record in &mut records {
        record.status = record.status.toggled();
    }

    let out = rewrite(Path::new("x.patch"), GROUPED, &records).unwrap();
    let reparsed = parse(&out, Path::new("x.patch")).records;

    let statuses: Vec<Status> = reparsed.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![Status::Disabled, Status::Enabled, Status::Disabled]
    );
    assert_eq!(reparsed[1].group.as_deref(), Some("Theme"));
}

#[test]
fn test_rewrite_rejects_stale_text() {
    let records = parse(EXAMPLE, Path::new("x.patch")).records;
    let edited = EXAMPLE.replace("PatchA", "PatchAlpha");

    let err = rewrite(Path::new("x.patch"), &edited, &records).unwrap_err();

    assert!(matches!(err, ApplyError::StaleText { .. }));
}

#[test]
fn test_group_conflict_names_group_and_patches() {
    let mut records = RecordSet::new();
    let mut parsed = parse(GROUPED, Path::new("x.patch")).records;
    parsed[1].status = Status::Enabled;
    records.insert(PathBuf::from("x.patch"), parsed);

    match validate_groups(&records) {
        Err(ApplyError::GroupConflict { file, group, names }) => {
            assert_eq!(file, Path::new("x.patch"));
            assert_eq!(group, "Theme");
            assert_eq!(names, vec!["Light".to_string(), "Dark".to_string()]);
        }
        other => panic!("expected group conflict, got {other:?}"),
    }
}

#[test]
fn test_different_and_empty_groups_do_not_conflict() {
    let text = "\
<Patch>
patch_name = `A`
patch_enable = `yes`
patch_group = `G1`
</Patch>
<Patch>
patch_name = `B`
patch_enable = `yes`
patch_group = `G2`
</Patch>
<Patch>
patch_name = `C`
patch_enable = `yes`
</Patch>
<Patch>
patch_name = `D`
patch_enable = `yes`
</Patch>
";
    let mut records = RecordSet::new();
    records.insert(PathBuf::from("x.patch"), parse(text, Path::new("x.patch")).records);

    assert!(validate_groups(&records).is_ok());
}

#[test]
fn test_same_group_in_different_files_does_not_conflict() {
    let mut records = RecordSet::new();
    records.insert(PathBuf::from("a.patch"), parse(GROUPED, Path::new("a.patch")).records);
    records.insert(PathBuf::from("b.patch"), parse(GROUPED, Path::new("b.patch")).records);

    assert!(validate_groups(&records).is_ok());
}

#[test]
fn test_example_toggle_is_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_patch(&dir, "example.patch", EXAMPLE);
    let (mut records, texts) = load(&[path.clone()]);
    records.get_mut(&path).unwrap()[1].status = Status::Enabled;

    let report = apply_changes(&records, &texts).unwrap();

    assert_eq!(report.written, vec![path.clone()]);
    let on_disk = fs::read_to_string(&path).unwrap();
    assert_eq!(on_disk, EXAMPLE.replacen("`no`", "`yes`", 1));
    assert_eq!(report.texts[&path], on_disk);
}

#[test]
fn test_group_conflict_leaves_every_file_untouched() {
    let dir = TempDir::new().unwrap();
    let clean = write_patch(&dir, "a.patch", EXAMPLE);
    let conflicted = write_patch(&dir, "b.patch", GROUPED);
    let (mut records, texts) = load(&[clean.clone(), conflicted.clone()]);
    records.get_mut(&clean).unwrap()[1].status = Status::Enabled;
    records.get_mut(&conflicted).unwrap()[1].status = Status::Enabled;

    let result = apply_changes(&records, &texts);

    let outcome = Outcome::from(&result);
    assert!(!outcome.success);
    assert_eq!(
        outcome.title.as_deref(),
        Some("Mutually Exclusive Options Detected!")
    );
    let message = outcome.message.unwrap();
    assert!(message.contains("Light"), "{message}");
    assert!(message.contains("Dark"), "{message}");
    assert!(message.contains("b.patch was not written"), "{message}");
    assert_eq!(fs::read_to_string(&clean).unwrap(), EXAMPLE);
    assert_eq!(fs::read_to_string(&conflicted).unwrap(), GROUPED);
}

#[test]
fn test_unchanged_file_is_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let path = write_patch(&dir, "same.patch", EXAMPLE);
    let (records, texts) = load(&[path.clone()]);

    let report = apply_changes(&records, &texts).unwrap();

    assert!(report.written.is_empty());
    assert_eq!(report.unchanged, vec![path]);
    assert!(Outcome::from(&Ok(report)).success);
}

#[test]
fn test_missing_text_is_reported_before_writing() {
    let dir = TempDir::new().unwrap();
    let path = write_patch(&dir, "a.patch", EXAMPLE);
    let (mut records, mut texts) = load(&[path.clone()]);
    records.get_mut(&path).unwrap()[0].status = Status::Disabled;
    records.insert(
        dir.path().join("z.patch"),
        parse(EXAMPLE, Path::new("z.patch")).records,
    );
    texts.remove(&dir.path().join("z.patch"));

    let err = apply_changes(&records, &texts).unwrap_err();

    assert!(matches!(err, ApplyError::MissingText { .. }));
    assert_eq!(err.title(), "File Error!");
    assert_eq!(fs::read_to_string(&path).unwrap(), EXAMPLE);
}

#[test]
fn test_write_failure_reports_files_already_written() {
    let dir = TempDir::new().unwrap();
    let first = write_patch(&dir, "a.patch", EXAMPLE);
    // A directory in place of the second file makes its write fail.
    let second = dir.path().join("b.patch");
    fs::create_dir(&second).unwrap();

    let (mut records, mut texts) = load(&[first.clone()]);
    records.get_mut(&first).unwrap()[0].status = Status::Disabled;
    let mut second_records = parse(EXAMPLE, &second).records;
    second_records[0].status = Status::Disabled;
    records.insert(second.clone(), second_records);
    texts.insert(second.clone(), EXAMPLE.to_string());

    let err = apply_changes(&records, &texts).unwrap_err();

    match &err {
        ApplyError::Write {
            file,
            written,
            written_texts,
            ..
        } => {
            assert_eq!(file, &second);
            assert_eq!(written, &vec![first.clone()]);
            assert_eq!(
                written_texts[&first],
                fs::read_to_string(&first).unwrap()
            );
        }
        other => panic!("expected write error, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("already written"), "{message}");
    assert!(fs::read_to_string(&first)
        .unwrap()
        .contains("patch_enable = `no`\n</Patch>\n\n<Patch>"));
}
