//! Command-line surface tests. None of these need ffmpeg installed.

use assert_cmd::Command;
use predicates::prelude::*;

fn stillcast() -> Command {
    let mut cmd = Command::cargo_bin("stillcast").unwrap();
    cmd.env_remove("STILLCAST_CONFIG")
        .env_remove("STILLCAST_WORKERS")
        .env_remove("STILLCAST_CHUNK_SIZE")
        .env_remove("STILLCAST_CHUNK_THRESHOLD")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    stillcast()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("assemble"))
        .stdout(predicate::str::contains("probe"))
        .stdout(predicate::str::contains("plan"));
}

#[test]
fn test_assemble_requires_inputs() {
    stillcast()
        .args(["assemble", "--output", "out.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--image"));
}

#[test]
fn test_workers_out_of_range_rejected() {
    stillcast()
        .args(["plan", "--audio", "a.mp3", "--workers", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workers"));
}

#[test]
fn test_assemble_missing_image_fails() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("episode.mp3");
    std::fs::write(&audio, vec![0u8; 2048]).unwrap();
    let output = dir.path().join("episode.mp4");

    stillcast()
        .arg("assemble")
        .arg("--image")
        .arg(dir.path().join("missing.png"))
        .arg("--audio")
        .arg(&audio)
        .arg("--output")
        .arg(&output)
        .arg("--workspace")
        .arg(dir.path().join("work"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.png"));

    assert!(!output.exists());
}

#[test]
fn test_assemble_refuses_existing_output_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("cover.png");
    let audio = dir.path().join("episode.mp3");
    let output = dir.path().join("episode.mp4");
    std::fs::write(&image, vec![0u8; 512]).unwrap();
    std::fs::write(&audio, vec![0u8; 2048]).unwrap();
    std::fs::write(&output, b"keep me").unwrap();

    stillcast()
        .arg("assemble")
        .arg("-i")
        .arg(&image)
        .arg("-a")
        .arg(&audio)
        .arg("-o")
        .arg(&output)
        .arg("--workspace")
        .arg(dir.path().join("work"))
        .assert()
        .failure();

    assert_eq!(std::fs::read(&output).unwrap(), b"keep me");
}

#[test]
fn test_plan_with_unusable_prober_reports_unknown_duration() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("episode.mp3");
    std::fs::write(&audio, vec![0u8; 2048]).unwrap();

    stillcast()
        .arg("plan")
        .arg("--audio")
        .arg(&audio)
        .arg("--ffprobe")
        .arg(dir.path().join("no-such-ffprobe"))
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"duration\": null"))
        .stdout(predicate::str::contains("\"strategy\": \"single_shot\""))
        .stdout(predicate::str::contains("\"timeout_secs\": 600"));
}

#[test]
fn test_invalid_chunk_size_rejected() {
    stillcast()
        .args(["plan", "--audio", "a.mp3", "--chunk-size", "ten minutes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chunk-size"));
}
