//! Save-slot storage for Cosmic Cities.
//!
//! Each slot is an in-memory SQLite snapshot persisted as a magic-tagged,
//! versioned, zlib-compressed file. At most one slot is open at a time.

pub mod config;
pub mod error;
pub mod format;
pub mod io_utils;
pub mod slot;
pub mod snapshot;
pub mod store;

pub use config::SaveConfig;
pub use error::SaveError;
pub use slot::SlotInfo;
pub use store::SaveStore;
