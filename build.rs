//! Build script for lbz2social.
//!
//! Copies the configuration template to the user's local data directory, next
//! to where the program looks for its `.env` file at run time.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root to the local data directory.
///
/// # File Operations
///
/// Templates are copied to the platform-specific local data directory:
/// - Linux: `~/.local/share/lbz2social/.env.example`
/// - macOS: `~/Library/Application Support/lbz2social/.env.example`
/// - Windows: `%LOCALAPPDATA%/lbz2social/.env.example`
///
/// An existing `.env` is never touched. A missing template only produces a
/// cargo warning; failing to create the directory or write the copy fails the
/// build.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push(env::var("CARGO_PKG_NAME")?);
    fs::create_dir_all(&out_dir)?;

    if env_example_path.is_file() {
        let contents = fs::read_to_string(&env_example_path)?;
        fs::write(out_dir.join(".env.example"), contents)?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
    }

    Ok(())
}
