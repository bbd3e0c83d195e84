use std::env;
use std::process::Command;

/// Short commit id of the checkout being built, if git can tell us
fn commit_id() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let id = String::from_utf8(output.stdout).ok()?;
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}

fn main() {
    // `VERSION` lets packagers stamp a version that differs from Cargo.toml
    let version = env::var("VERSION")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| env::var("CARGO_PKG_VERSION").ok())
        .unwrap_or_default();

    println!("cargo:rustc-env=PROCWATCH_VERSION={}", version);
    println!(
        "cargo:rustc-env=GIT_HASH={}",
        commit_id().unwrap_or_else(|| "unknown".to_string())
    );

    println!("cargo:rerun-if-env-changed=VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
