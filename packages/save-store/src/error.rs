//! Save store error types.

use thiserror::Error;

/// Save store operation errors.
#[derive(Error, Debug)]
pub enum SaveError {
    /// Slot id outside `[0, max_slots)`
    #[error("Invalid slot id {slot} (valid range 0..{max})")]
    InvalidSlot { slot: i32, max: usize },

    /// Slot file does not exist
    #[error("Slot {0} does not exist")]
    SlotNotFound(i32),

    /// Slot file already exists
    #[error("Slot {0} already exists")]
    SlotAlreadyExists(i32),

    /// Operation needs an open slot
    #[error("No save slot is open")]
    NoActiveSlot,

    /// Transaction state does not allow the operation
    #[error("Transaction error: {0}")]
    Transaction(&'static str),

    /// Header magic does not identify a save file
    #[error("Invalid save file magic {found:#010x}")]
    BadMagic { found: u32 },

    /// File shorter than its header claims
    #[error("Save file truncated: {0}")]
    Truncated(String),

    /// Compression or decompression failure
    #[error("Compression error: {0}")]
    Compression(String),

    /// Embedded database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Disk full error during persistence
    #[error("Disk full: {0}")]
    DiskFull(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}
