//! Save slot manager.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::SaveConfig;
use crate::error::SaveError;
use crate::format::{read_save_file, write_save_file};
use crate::io_utils::classify_io_error;
use crate::slot::{meta_key, unix_now, SlotInfo};
use crate::snapshot::{Snapshot, ValueKind};

/// Owns the single open save slot and its on-disk files.
///
/// Not thread-safe; a game holds one instance and hands out `&mut` access.
#[derive(Debug)]
pub struct SaveStore {
    /// Directory layout, slot bound, and compression settings
    config: SaveConfig,
    /// Snapshot of the open slot
    snapshot: Option<Snapshot>,
    /// Id of the open slot
    current_slot: Option<i32>,
    /// Inside an explicit transaction
    in_transaction: bool,
}

impl SaveStore {
    /// Creates a store with no open slot.
    pub fn new(config: SaveConfig) -> Self {
        Self {
            config,
            snapshot: None,
            current_slot: None,
            in_transaction: false,
        }
    }

    pub fn max_slots(&self) -> usize {
        self.config.max_slots
    }

    /// Ensures the configured save directory exists.
    pub fn initialize(&mut self) -> Result<(), SaveError> {
        fs::create_dir_all(&self.config.save_dir).map_err(|e| {
            tracing::error!(
                "Failed to create save directory '{}': {}",
                self.config.save_dir.display(),
                e
            );
            classify_io_error(e, "Failed to create save directory")
        })?;
        tracing::info!(
            "Initialized with save directory '{}'",
            self.config.save_dir.display()
        );
        Ok(())
    }

    /// Points the store at `save_dir` and creates it.
    pub fn initialize_at(&mut self, save_dir: impl AsRef<Path>) -> Result<(), SaveError> {
        self.config.save_dir = save_dir.as_ref().to_path_buf();
        self.initialize()
    }

    fn slot_in_range(&self, slot_id: i32) -> bool {
        slot_id >= 0 && (slot_id as usize) < self.max_slots()
    }

    fn check_slot(&self, slot_id: i32) -> Result<(), SaveError> {
        if !self.slot_in_range(slot_id) {
            tracing::error!("Invalid slot ID {}", slot_id);
            return Err(SaveError::InvalidSlot {
                slot: slot_id,
                max: self.max_slots(),
            });
        }
        Ok(())
    }

    /// Path of a slot file, `None` for out-of-range ids.
    pub fn slot_file_path(&self, slot_id: i32) -> Option<PathBuf> {
        self.slot_in_range(slot_id).then(|| self.slot_path(slot_id))
    }

    pub fn does_slot_exist(&self, slot_id: i32) -> bool {
        self.slot_file_path(slot_id).is_some_and(|path| path.exists())
    }

    /// Reads a slot's summary without touching the open slot.
    ///
    /// A slot whose file cannot be decoded is reported as absent.
    pub fn get_slot_info(&self, slot_id: i32) -> SlotInfo {
        let mut info = SlotInfo::empty(slot_id);
        let Some(path) = self.slot_file_path(slot_id).filter(|p| p.exists()) else {
            return info;
        };

        let rows = read_save_file(&path)
            .and_then(|image| Snapshot::from_image(&image, true))
            .and_then(|snapshot| snapshot.metadata_rows(&meta_key::ALL));

        match rows {
            Ok(rows) => {
                info.exists = true;
                for (key, value) in rows {
                    info.apply_metadata(&key, &value);
                }
            }
            Err(e) => {
                tracing::warn!("Slot {} is unreadable: {}", slot_id, e);
            }
        }
        info
    }

    /// Summaries for every slot id in order.
    pub fn get_all_slots(&self) -> Vec<SlotInfo> {
        (0..self.max_slots() as i32)
            .map(|slot_id| self.get_slot_info(slot_id))
            .collect()
    }

    /// Creates, opens, and immediately saves a fresh slot.
    ///
    /// # Arguments
    /// * `slot_id` - Slot to create; must be in range and unused
    /// * `player_name` - Stored in the slot metadata
    ///
    /// # Returns
    /// `Result<(), SaveError>`; on error no slot is open.
    pub fn create_new_slot(&mut self, slot_id: i32, player_name: &str) -> Result<(), SaveError> {
        self.check_slot(slot_id)?;
        if self.does_slot_exist(slot_id) {
            tracing::warn!("Slot {} already exists", slot_id);
            return Err(SaveError::SlotAlreadyExists(slot_id));
        }

        self.close_current_slot();

        let snapshot = Snapshot::create().map_err(|e| {
            tracing::error!("Failed to create in-memory database: {}", e);
            e
        })?;
        snapshot.set_metadata(meta_key::PLAYER_NAME, player_name)?;
        snapshot.set_metadata(meta_key::LAST_SAVE, &unix_now().to_string())?;
        snapshot.set_metadata(meta_key::CHAPTER, "1")?;
        snapshot.set_metadata(meta_key::LEVEL, "1")?;
        snapshot.set_metadata(meta_key::PLAYTIME, "0")?;

        self.snapshot = Some(snapshot);
        self.current_slot = Some(slot_id);

        if let Err(e) = self.save_slot(slot_id) {
            self.close_current_slot();
            return Err(e);
        }
        tracing::info!("Created slot {} for '{}'", slot_id, player_name);
        Ok(())
    }

    /// Opens a slot from disk, closing the open slot first.
    ///
    /// On error no slot is open, including the one open before the call.
    pub fn load_slot(&mut self, slot_id: i32) -> Result<(), SaveError> {
        self.check_slot(slot_id)?;
        if !self.does_slot_exist(slot_id) {
            tracing::error!("Slot {} does not exist", slot_id);
            return Err(SaveError::SlotNotFound(slot_id));
        }

        self.close_current_slot();

        let path = self.slot_path(slot_id);
        let snapshot = read_save_file(&path)
            .and_then(|image| Snapshot::from_image(&image, false))
            .map_err(|e| {
                tracing::error!("Failed to load slot {}: {}", slot_id, e);
                e
            })?;

        self.snapshot = Some(snapshot);
        self.current_slot = Some(slot_id);
        tracing::info!("Loaded slot {}", slot_id);
        Ok(())
    }

    /// Writes the open snapshot to `slot_id`'s file.
    ///
    /// The caller decides which slot the open snapshot belongs to. Saving is
    /// refused while a transaction is open so uncommitted rows never reach disk.
    pub fn save_slot(&mut self, slot_id: i32) -> Result<(), SaveError> {
        self.check_slot(slot_id)?;
        let snapshot = self.snapshot.as_ref().ok_or_else(|| {
            tracing::error!("No database open");
            SaveError::NoActiveSlot
        })?;
        if self.in_transaction {
            tracing::error!("Cannot save slot {} inside an open transaction", slot_id);
            return Err(SaveError::Transaction("cannot save inside an open transaction"));
        }

        snapshot.set_metadata(meta_key::LAST_SAVE, &unix_now().to_string())?;
        let image = snapshot.to_image().map_err(|e| {
            tracing::error!("Failed to serialize database: {}", e);
            e
        })?;

        let path = self.slot_path(slot_id);
        let written = write_save_file(&path, &image, self.config.compression_level)
            .map_err(|e| {
                tracing::error!("Failed to write slot {}: {}", slot_id, e);
                e
            })?;

        tracing::info!(
            "Saved slot {} ({} bytes -> {} bytes compressed)",
            slot_id,
            image.len(),
            written
        );
        Ok(())
    }

    /// Removes a slot file, closing it first when it is open.
    ///
    /// Deleting a slot that has no file succeeds.
    pub fn delete_slot(&mut self, slot_id: i32) -> Result<(), SaveError> {
        self.check_slot(slot_id)?;
        if self.current_slot == Some(slot_id) {
            self.close_current_slot();
        }

        match fs::remove_file(self.slot_path(slot_id)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Slot {} had no file to delete", slot_id);
            }
            Err(e) => {
                tracing::error!("Failed to delete slot {}: {}", slot_id, e);
                return Err(classify_io_error(e, "Failed to delete slot"));
            }
        }

        tracing::info!("Deleted slot {}", slot_id);
        Ok(())
    }

    /// Drops the open snapshot. No-op when nothing is open.
    pub fn close_current_slot(&mut self) {
        if let Some(slot_id) = self.current_slot.take() {
            tracing::debug!("Closed slot {}", slot_id);
        }
        self.snapshot = None;
        self.in_transaction = false;
    }

    pub fn current_slot(&self) -> Option<i32> {
        self.current_slot
    }

    pub fn has_loaded_slot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    fn slot_path(&self, slot_id: i32) -> PathBuf {
        self.config
            .save_dir
            .join(format!("slot{}{}", slot_id, self.config.slot_extension))
    }

    fn active(&self) -> Result<&Snapshot, SaveError> {
        self.snapshot.as_ref().ok_or(SaveError::NoActiveSlot)
    }

    fn set_typed(&self, key: &str, kind: ValueKind, value: &str) -> Result<(), SaveError> {
        self.active()?.set_value(key, kind, value).map_err(|e| {
            tracing::error!("Failed to set '{}': {}", key, e);
            e
        })
    }

    /// Raw stored text for `key`, `None` when absent or no slot is open.
    fn raw(&self, key: &str) -> Option<String> {
        let snapshot = self.snapshot.as_ref()?;
        match snapshot.value(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    pub fn set_string(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        self.set_typed(key, ValueKind::String, value)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set_int(&mut self, key: &str, value: i64) -> Result<(), SaveError> {
        self.set_typed(key, ValueKind::Int, &value.to_string())
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.raw(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn set_float(&mut self, key: &str, value: f64) -> Result<(), SaveError> {
        self.set_typed(key, ValueKind::Float, &value.to_string())
    }

    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        self.raw(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Stored as `"1"` / `"0"`.
    pub fn set_bool(&mut self, key: &str, value: bool) -> Result<(), SaveError> {
        self.set_typed(key, ValueKind::Bool, if value { "1" } else { "0" })
    }

    /// Accepts `"1"`/`"true"` and `"0"`/`"false"`; anything else yields `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.raw(key).as_deref() {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            _ => default,
        }
    }

    /// Recorded type of a `game_data` key.
    pub fn value_kind(&self, key: &str) -> Option<ValueKind> {
        self.snapshot.as_ref()?.value_kind(key).ok().flatten()
    }

    /// All `game_data` keys of the open slot, sorted.
    pub fn keys(&self) -> Result<Vec<String>, SaveError> {
        self.active()?.keys()
    }

    /// Writes a slot summary field such as `chapter` or `playtime`.
    pub fn set_metadata(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        self.active()?.set_metadata(key, value)
    }

    pub fn metadata(&self, key: &str) -> Option<String> {
        self.snapshot.as_ref()?.metadata(key).ok().flatten()
    }

    pub fn begin_transaction(&mut self) -> Result<(), SaveError> {
        if self.in_transaction {
            return Err(SaveError::Transaction("transaction already open"));
        }
        self.active()?.execute_batch("BEGIN TRANSACTION")?;
        self.in_transaction = true;
        Ok(())
    }

    pub fn commit_transaction(&mut self) -> Result<(), SaveError> {
        if !self.in_transaction {
            return Err(SaveError::Transaction("no transaction open"));
        }
        self.active()?.execute_batch("COMMIT")?;
        self.in_transaction = false;
        Ok(())
    }

    /// Rolls back the open transaction. The transaction flag is cleared even on error.
    pub fn rollback_transaction(&mut self) -> Result<(), SaveError> {
        if !self.in_transaction {
            return Err(SaveError::Transaction("no transaction open"));
        }
        self.in_transaction = false;
        self.active()?.execute_batch("ROLLBACK")
    }
}
