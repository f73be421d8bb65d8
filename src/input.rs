use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Error: File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Error: Failed to read file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}

pub fn ensure_exists(path: &Path) -> Result<(), InputError> {
    if path.exists() {
        Ok(())
    } else {
        Err(InputError::NotFound(path.to_path_buf()))
    }
}

/// Reads the whole file as UTF-8. The handle is closed before returning.
pub fn read_document(path: &Path) -> Result<String, InputError> {
    ensure_exists(path)?;
    fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })
}
