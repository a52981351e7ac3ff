//! Content fingerprints for drift detection.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context as _, Result};
use sha2::{Digest as _, Sha256};

/// Hash a file's contents with streamed SHA-256 and return the lowercase hex
/// digest.
///
/// Identical content always yields an identical digest; any byte change
/// yields a different one.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> Result<String> {
    let file =
        File::open(path).with_context(|| format!("could not open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher)
        .with_context(|| format!("could not read file: {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}
