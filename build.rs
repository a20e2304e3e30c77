//! Build script for pr-comment-resource.
//!
//! Emits `BUILD_INFO_HUMAN`, shown by `--version`. The value is the crate
//! version followed by `git describe --tags --always --dirty` when the
//! source tree is a git checkout, e.g. `0.1.0 (v0.1.0-3-g1a2b3c4d)`.
//! Outside a checkout (a crate tarball or a container build context) only
//! the crate version is emitted.

use std::{env, process::Command};

fn main() {
    ["src", "build.rs", "Cargo.toml"]
        .iter()
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let build_info = match git_describe() {
        Some(describe) => format!("{version} ({describe})"),
        None => version,
    };
    println!("cargo:rustc-env=BUILD_INFO_HUMAN={build_info}");
}

fn git_describe() -> Option<String> {
    Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
