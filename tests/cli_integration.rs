/*!
 * Integration tests for the copcon binary
 */

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn copcon(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_copcon"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

// project/
//   main.py
//   readme.md
fn setup_project(root: &Path) -> std::path::PathBuf {
    let project = root.join("project");
    fs::create_dir(&project).unwrap();
    fs::write(project.join("main.py"), "print('hello')\n").unwrap();
    fs::write(project.join("readme.md"), "# Readme\n").unwrap();
    project
}

#[test]
fn test_parent_ignore_file_is_discovered() {
    let temp_dir = tempdir().unwrap();
    let project = setup_project(temp_dir.path());
    fs::write(temp_dir.path().join(".copconignore"), "*.md\n").unwrap();
    let output_file = temp_dir.path().join("report.txt");

    let output = Command::new(env!("CARGO_BIN_EXE_copcon"))
        .arg(&project)
        .arg("--output-file")
        .arg(&output_file)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report = fs::read_to_string(&output_file).unwrap();
    assert!(report.starts_with("Directory Structure:\nproject\n"));
    assert!(report.contains("File: main.py"));
    assert!(!report.contains("readme.md"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Using `.copconignore` from:"));
    assert!(stdout.contains("report.txt"));
}

#[test]
fn test_explicit_ignore_file_overrides_discovery() {
    let temp_dir = tempdir().unwrap();
    let project = setup_project(temp_dir.path());
    fs::write(temp_dir.path().join(".copconignore"), "*.md\n").unwrap();
    let explicit = temp_dir.path().join("explicit_ignore_file");
    fs::write(&explicit, "*.py\n").unwrap();
    let output_file = temp_dir.path().join("report.txt");

    let output = Command::new(env!("CARGO_BIN_EXE_copcon"))
        .arg(&project)
        .arg("--copconignore")
        .arg(&explicit)
        .arg("--output-file")
        .arg(&output_file)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report = fs::read_to_string(&output_file).unwrap();
    assert!(report.contains("File: readme.md"));
    assert!(!report.contains("main.py"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("explicit_ignore_file"));
}

#[test]
fn test_target_file_limits_contents() {
    let temp_dir = tempdir().unwrap();
    let project = setup_project(temp_dir.path());
    fs::write(project.join(".copcontarget"), "*.py\n").unwrap();
    let output_file = temp_dir.path().join("report.txt");

    let output = Command::new(env!("CARGO_BIN_EXE_copcon"))
        .arg(&project)
        .arg("--output-file")
        .arg(&output_file)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report = fs::read_to_string(&output_file).unwrap();
    assert!(report.contains("File: main.py"));
    assert!(!report.contains("File: readme.md"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Using `.copcontarget` from:"));
}

#[test]
fn test_missing_directory_fails() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("does_not_exist");

    let output = copcon(&[missing.as_path()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("is not a valid directory"));
}

#[test]
fn test_missing_explicit_ignore_file_fails() {
    let temp_dir = tempdir().unwrap();
    let project = setup_project(temp_dir.path());
    let missing = temp_dir.path().join("nope");

    let output = Command::new(env!("CARGO_BIN_EXE_copcon"))
        .arg(&project)
        .arg("--copconignore")
        .arg(&missing)
        .env("RUST_LOG", "off")
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Ignore file not found"));
}
