//! Build script for the site crate.
//!
//! Fingerprints `static/css/main.css` so the stylesheet can be served with
//! immutable caching.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_css();
}

/// Copy main.css to `static/css/derived/main.<hash>.css`, removing older
/// fingerprints, and expose the hash as `CSS_HASH`.
#[allow(clippy::expect_used)]
fn hash_css() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let content = match fs::read(&css_path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read main.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
            return;
        }
    };

    // First 8 hex chars of SHA-256
    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash: String = digest.chars().take(8).collect();

    println!("cargo:rustc-env=CSS_HASH={short_hash}");

    let derived_dir = Path::new(&manifest_dir).join("static/css/derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived CSS directory");

    let file_name = format!("main.{short_hash}.css");
    if let Ok(entries) = fs::read_dir(&derived_dir) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("main.") && name.ends_with(".css") && name != file_name {
                let _ = fs::remove_file(entry.path());
            }
        }
    }

    fs::copy(&css_path, derived_dir.join(&file_name))
        .expect("Failed to copy CSS to derived directory");
}
