//! I/O utilities for save file operations.

use std::io::ErrorKind;

use crate::error::SaveError;

/// Classifies I/O errors into specific SaveError variants.
pub fn classify_io_error(error: std::io::Error, context: &str) -> SaveError {
    match error.kind() {
        ErrorKind::StorageFull | ErrorKind::OutOfMemory => {
            SaveError::DiskFull(format!("{}: {}", context, error))
        }
        ErrorKind::UnexpectedEof => SaveError::Truncated(format!("{}: {}", context, error)),
        _ => SaveError::Io(format!("{}: {}", context, error)),
    }
}
