//! Slot summary and well-known metadata keys.

use std::time::{SystemTime, UNIX_EPOCH};

/// Keys stored in the `metadata` table of every slot.
pub mod meta_key {
    pub const PLAYER_NAME: &str = "player_name";
    pub const LAST_SAVE: &str = "last_save";
    pub const CHAPTER: &str = "chapter";
    pub const LEVEL: &str = "level";
    pub const PLAYTIME: &str = "playtime";

    /// Keys read by [`crate::SaveStore::get_slot_info`].
    pub const ALL: [&str; 5] = [PLAYER_NAME, LAST_SAVE, CHAPTER, LEVEL, PLAYTIME];
}

/// Summary of one save slot, as shown by a slot picker.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub slot_id: i32,
    pub exists: bool,
    pub player_name: String,
    /// Unix timestamp in seconds
    pub last_save_time: i64,
    pub chapter: i32,
    pub level: i32,
    /// Seconds played
    pub playtime: f32,
}

impl SlotInfo {
    /// An absent slot.
    pub fn empty(slot_id: i32) -> Self {
        Self {
            slot_id,
            exists: false,
            player_name: String::new(),
            last_save_time: 0,
            chapter: 0,
            level: 0,
            playtime: 0.0,
        }
    }

    /// Fills one field from a metadata row. Unparseable values leave the field untouched.
    pub(crate) fn apply_metadata(&mut self, key: &str, value: &str) {
        match key {
            meta_key::PLAYER_NAME => self.player_name = value.to_string(),
            meta_key::LAST_SAVE => {
                if let Ok(v) = value.parse() {
                    self.last_save_time = v;
                }
            }
            meta_key::CHAPTER => {
                if let Ok(v) = value.parse() {
                    self.chapter = v;
                }
            }
            meta_key::LEVEL => {
                if let Ok(v) = value.parse() {
                    self.level = v;
                }
            }
            meta_key::PLAYTIME => {
                if let Ok(v) = value.parse() {
                    self.playtime = v;
                }
            }
            _ => {}
        }
    }
}

/// Current time as Unix seconds.
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
