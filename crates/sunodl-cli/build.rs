use chrono::Local;
use std::process::Command;

fn main() {
    // Short git commit hash for --version output
    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    // Tracked-file modifications mark the build dirty (untracked ignored)
    let dirty = Command::new("git")
        .args(["diff", "--quiet", "HEAD"])
        .status()
        .map(|status| !status.success())
        .unwrap_or(false);

    let build_hash = if dirty {
        format!("{git_hash}-dirty-{}", Local::now().format("%Y%m%d-%H%M%S"))
    } else {
        git_hash
    };

    println!("cargo:rustc-env=BUILD_HASH={build_hash}");

    // .git lives at the workspace root, two levels up from this crate
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
}
