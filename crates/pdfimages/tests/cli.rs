//! End-to-end checks of the binary's exit status and output.

use std::process::Command;

fn pdfimages() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pdfimages"));
    cmd.env_remove("PDFIMAGES_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_print_config_emits_yaml() {
    let out = pdfimages()
        .args(["--print-config", "-f", "bmp", "-q", "55"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let yaml = String::from_utf8(out.stdout).unwrap();
    assert!(yaml.contains("format: bmp"));
    assert!(yaml.contains("quality: 55"));
}

#[test]
fn test_missing_input_argument_is_usage_error() {
    let out = pdfimages().output().unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_nonexistent_input_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = pdfimages()
        .arg(dir.path().join("nope.pdf"))
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_bad_config_file_exits_with_config_status() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    std::fs::write(&config, "processing:\n  scaling: 0\n").unwrap();
    let out = pdfimages()
        .arg("-c")
        .arg(&config)
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("scaling"));
}

#[test]
fn test_corrupt_pdf_exits_with_partial_status() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    std::fs::write(input.join("broken.pdf"), b"not a pdf at all").unwrap();
    let report = dir.path().join("report.json");

    let out = pdfimages()
        .arg(&input)
        .arg(dir.path().join("out"))
        .arg("--report")
        .arg(&report)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let json: String = std::fs::read_to_string(&report).unwrap();
    assert!(json.contains("broken.pdf"));
    assert!(json.contains("\"failed\": 1") || json.contains("\"failed\":1"));
}

#[test]
fn test_empty_directory_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let out = pdfimages()
        .arg(dir.path())
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    assert!(out.status.success());
}
