#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::tempdir;

const ETXTBSY: i32 = 26;

fn transcoder_cmd() -> Command {
    Command::cargo_bin("transcoder").expect("Failed to find transcoder binary")
}

/// Writes a `transcode-video` stand-in that reports `version` and otherwise runs `body`.
fn fake_tool(dir: &Path, version: &str, body: &str) -> PathBuf {
    let path = dir.join("transcode-video");
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"--version\" ]; then\n\
         \x20 echo \"transcode-video {version}\"\n\
         \x20 exit 0\n\
         fi\n\
         {body}\n"
    );
    fs::write(&path, script).expect("Failed to write fake tool");
    let mut permissions = fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).unwrap();

    for _ in 0..50 {
        match std::process::Command::new(&path).arg("--version").output() {
            Err(e) if e.raw_os_error() == Some(ETXTBSY) => thread::sleep(Duration::from_millis(20)),
            _ => break,
        }
    }
    path
}

fn dummy_source(dir: &Path) -> PathBuf {
    let path = dir.join("Movie.mkv");
    fs::write(&path, "dummy content").unwrap();
    path
}

#[test]
fn test_args_prints_tokens_with_source_last() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let tool = fake_tool(dir.path(), "0.25.3", "exit 0");
    let source = dummy_source(dir.path());

    let expected = format!(
        "--dry-run\n--preset=slow\n--handbrake-option=stop-at=duration:30\n{}\n",
        source.display()
    );
    transcoder_cmd()
        .arg("--tool")
        .arg(&tool)
        .arg("args")
        .arg(&source)
        .args(["--preset", "slow", "--dry-run"])
        .args(["--handbrake-option", "stop-at=duration:30"])
        .assert()
        .success()
        .stdout(predicate::str::diff(expected));

    Ok(())
}

#[test]
fn test_args_reads_options_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let tool = fake_tool(dir.path(), "0.25.0", "exit 0");
    let source = dummy_source(dir.path());
    let job = dir.path().join("job.json");
    fs::write(&job, r#"{"audio": {"main_audio": {"track": "eng", "name": "Original Mix"}}}"#)?;

    transcoder_cmd()
        .arg("--tool")
        .arg(&tool)
        .arg("args")
        .arg(&source)
        .arg("--options-file")
        .arg(&job)
        .assert()
        .success()
        .stdout(contains("--main-audio=\"eng=Original Mix\""));

    Ok(())
}

#[test]
fn test_invalid_options_file_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let tool = fake_tool(dir.path(), "0.25.0", "exit 0");
    let source = dummy_source(dir.path());
    let job = dir.path().join("job.json");
    fs::write(&job, "{ not json")?;

    transcoder_cmd()
        .arg("--tool")
        .arg(&tool)
        .arg("args")
        .arg(&source)
        .arg("--options-file")
        .arg(&job)
        .assert()
        .code(1)
        .stderr(contains("Invalid options file"));

    Ok(())
}

#[test]
fn test_check_reports_compatible_version() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let tool = fake_tool(dir.path(), "0.25.3", "exit 0");

    transcoder_cmd()
        .arg("--tool")
        .arg(&tool)
        .arg("check")
        .assert()
        .success()
        .stdout(contains("0.25.3"));

    Ok(())
}

#[test]
fn test_check_fails_on_wrong_version() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let tool = fake_tool(dir.path(), "0.24.9", "exit 0");

    transcoder_cmd()
        .arg("--tool")
        .arg(&tool)
        .arg("check")
        .assert()
        .code(1)
        .stderr(contains("0.24.9"))
        .stderr(contains("gem update video_transcoding"));

    Ok(())
}

#[test]
fn test_check_fails_when_tool_is_missing() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    transcoder_cmd()
        .arg("--tool")
        .arg(dir.path().join("transcode-video"))
        .arg("check")
        .assert()
        .code(1)
        .stderr(contains("gem install video_transcoding"));

    Ok(())
}

#[test]
fn test_run_propagates_tool_exit_code() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let tool = fake_tool(dir.path(), "0.25.1", "echo 'Encoding failed' >&2\nexit 3");
    let source = dummy_source(dir.path());

    transcoder_cmd()
        .arg("--tool")
        .arg(&tool)
        .arg("run")
        .arg(&source)
        .assert()
        .code(3)
        .stderr(contains("Encoding failed"));

    Ok(())
}

#[test]
fn test_run_succeeds_and_passes_arguments() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let args_file = dir.path().join("args.txt");
    let body = format!(
        "for arg in \"$@\"; do echo \"$arg\"; done > '{}'\n\
         printf 'Encoding: task 1 of 1, 50.00 %%\\r'\n\
         printf 'Encoding: task 1 of 1, 100.00 %%\\n'\n\
         exit 0",
        args_file.display()
    );
    let tool = fake_tool(dir.path(), "0.25.3", &body);
    let source = dummy_source(dir.path());

    transcoder_cmd()
        .arg("--tool")
        .arg(&tool)
        .arg("--line-source")
        .arg("push")
        .arg("run")
        .arg(&source)
        .args(["--mp4", "--tool-quiet"])
        .assert()
        .success();

    let recorded = fs::read_to_string(&args_file)?;
    let recorded: Vec<&str> = recorded.lines().collect();
    let source = source.display().to_string();
    assert_eq!(recorded, vec!["--mp4", "--quiet", source.as_str()]);

    Ok(())
}

#[test]
fn test_conflicting_flags_are_rejected() {
    transcoder_cmd()
        .args(["args", "Movie.mkv", "--quick", "--veryquick"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn test_log_dir_writes_log_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let tool = fake_tool(dir.path(), "0.25.3", "exit 0");
    let log_dir = dir.path().join("logs");

    transcoder_cmd()
        .arg("--tool")
        .arg(&tool)
        .arg("--log-dir")
        .arg(&log_dir)
        .arg("check")
        .assert()
        .success();

    let entries: Vec<_> = fs::read_dir(&log_dir)?.collect::<Result<_, _>>()?;
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().to_string_lossy().into_owned();
    assert!(name.starts_with("transcoder_check_"));

    Ok(())
}
