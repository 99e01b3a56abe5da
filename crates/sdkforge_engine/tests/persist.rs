use std::fs;

use sdkforge_engine::{ensure_output_dir, ArtifactWriter, PersistError};

#[test]
fn writer_creates_directory_and_replaces_existing_file() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("downloads");
    let writer = ArtifactWriter::new(dir.clone());

    let first = writer.write("openapi.json", b"{}").unwrap();
    let second = writer.write("openapi.json", b"{\"v\":2}").unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"{\"v\":2}");
    let leftovers = fs::read_dir(&dir).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn output_dir_must_be_a_directory() {
    let root = tempfile::tempdir().unwrap();
    let file = root.path().join("not-a-dir");
    fs::write(&file, "x").unwrap();

    assert!(matches!(
        ensure_output_dir(&file),
        Err(PersistError::OutputDir(_))
    ));
}
