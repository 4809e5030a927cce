//! Stamps the binary with the commit, build time and cargo profile
//!
//! Read back at runtime through `triage_api::BuildInfo`.

use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

/// Abbreviated HEAD commit, or `None` outside a git checkout
fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn main() {
    emit("GIT_HASH", git_short_hash().as_deref().unwrap_or(UNKNOWN));
    emit(
        "BUILD_TIMESTAMP",
        &chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    );
    emit("BUILD_PROFILE", &env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string()));
}
