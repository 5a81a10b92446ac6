use std::process::Command;

fn main() {
    // Embed the git SHA for the startup log line; "unknown" outside a checkout.
    let sha = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    println!(
        "cargo:rustc-env=GIT_SHA={}",
        sha.as_deref().unwrap_or("unknown")
    );
    println!("cargo:rerun-if-changed=.git/HEAD");
}
