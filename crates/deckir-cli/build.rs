//! Stamps the short commit hash into `DECKIR_BUILD` for `deckir --version`.

use std::process::Command;

fn main() {
    let build = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=DECKIR_BUILD={}", build);
    println!("cargo:rerun-if-changed=.git/HEAD");
}
