// transcoder-core/tests/common/mod.rs
//
// Fake `transcode-video` executables for integration tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

const ETXTBSY: i32 = 26;

/// Writes an executable script that answers `--version` with `version` and
/// otherwise runs `body`.
pub fn fake_tool(dir: &Path, version: &str, body: &str) -> PathBuf {
    let path = dir.join("transcode-video");
    write_script(
        &path,
        &format!(
            "#!/bin/sh\n\
             if [ \"$1\" = \"--version\" ]; then\n\
             \x20 echo \"transcode-video {version}\"\n\
             \x20 echo \"Copyright (c) 2013-2020 Don Melton\"\n\
             \x20 exit 0\n\
             fi\n\
             {body}\n"
        ),
    );
    path
}

/// Writes `contents` to `path`, makes it executable, and waits until it can be exec'd.
pub fn write_script(path: &Path, contents: &str) {
    fs::write(path, contents).expect("Failed to write script");
    let mut permissions = fs::metadata(path).expect("Failed to stat script").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions).expect("Failed to chmod script");
    wait_until_executable(path);
}

/// Freshly written executables can fail with ETXTBSY while another test thread
/// forks; retry until the kernel lets us run it.
fn wait_until_executable(path: &Path) {
    for _ in 0..50 {
        match Command::new(path).arg("--version").output() {
            Err(e) if e.raw_os_error() == Some(ETXTBSY) => thread::sleep(Duration::from_millis(20)),
            _ => return,
        }
    }
}

/// A source file for the tool to "transcode".
pub fn dummy_source(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"dummy content").expect("Failed to create dummy source");
    path
}
