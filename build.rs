// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=CAMERA_UPLOAD_VERSION");

    // Packagers may pin the version explicitly
    let version = std::env::var("CAMERA_UPLOAD_VERSION").unwrap_or_else(|_| describe_version());

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version string for the user agent
///
/// - exact tag `v0.1.0` becomes `0.1.0-abcdef1`
/// - `v0.1.0-5-gabcdef1` (commits after a tag) becomes `0.1.0-dirty-abcdef1`
/// - no git metadata falls back to the crate version
fn describe_version() -> String {
    let pkg_version = env!("CARGO_PKG_VERSION").to_string();

    let Some(described) = git(&["describe", "--tags", "--always", "--match", "v*"]) else {
        return pkg_version;
    };
    let described = described.strip_prefix('v').unwrap_or(&described);
    let commit = git(&["rev-parse", "--short", "HEAD"]);

    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    match (parts.as_slice(), commit) {
        ([hash, _commits, base], _) => {
            format!("{}-dirty-{}", base, hash.strip_prefix('g').unwrap_or(hash))
        }
        // No tag reachable: describe printed only a hash
        ([only], Some(commit)) if *only == commit => format!("{}-{}", pkg_version, commit),
        (_, Some(commit)) => format!("{}-{}", described, commit),
        (_, None) => described.to_string(),
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}
