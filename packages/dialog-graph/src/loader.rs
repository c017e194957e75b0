//! Dialogue document loading.
//!
//! A document is a map from node label to node record, read in document order:
//!
//! ```toml
//! [intro]
//! speaker = "Dock Officer"
//! text = "Papers, please."
//! choices = [
//!     { text = "Hand them over", next = 2 },
//!     { text = "Walk away" },
//! ]
//!
//! [papers]
//! text = "Everything is in order."
//! ```
//!
//! Node ids come from an explicit `id` field or from a counter that starts at 1
//! and counts every node record. A top-level list of records is accepted too.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::DialogError;
use crate::node::{DialogChoice, DialogNode, NodeId};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogFormat {
    Toml,
    Json,
}

impl DialogFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, DialogError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(DialogError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Parses document text into a format-neutral value.
    pub fn parse(self, text: &str) -> Result<Value, DialogError> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| DialogError::Parse(e.to_string())),
            Self::Toml => {
                let table: toml::Table =
                    toml::from_str(text).map_err(|e| DialogError::Parse(e.to_string()))?;
                serde_json::to_value(table).map_err(|e| DialogError::Parse(e.to_string()))
            }
        }
    }
}

/// Anything a dialogue document can be read from.
pub trait DialogSource {
    /// Name used in log messages.
    fn describe(&self) -> String;

    /// Reads and parses the document.
    fn load_document(&self) -> Result<Value, DialogError>;
}

impl DialogSource for Path {
    fn describe(&self) -> String {
        self.display().to_string()
    }

    fn load_document(&self) -> Result<Value, DialogError> {
        let format = DialogFormat::from_path(self)?;
        let text = std::fs::read_to_string(self)?;
        format.parse(&text)
    }
}

impl DialogSource for PathBuf {
    fn describe(&self) -> String {
        self.as_path().describe()
    }

    fn load_document(&self) -> Result<Value, DialogError> {
        self.as_path().load_document()
    }
}

/// Document text held in memory.
#[derive(Debug, Clone, Copy)]
pub struct InlineDialog<'a> {
    pub text: &'a str,
    pub format: DialogFormat,
}

impl<'a> InlineDialog<'a> {
    pub fn toml(text: &'a str) -> Self {
        Self {
            text,
            format: DialogFormat::Toml,
        }
    }

    pub fn json(text: &'a str) -> Self {
        Self {
            text,
            format: DialogFormat::Json,
        }
    }
}

impl DialogSource for InlineDialog<'_> {
    fn describe(&self) -> String {
        format!("<inline {:?}>", self.format)
    }

    fn load_document(&self) -> Result<Value, DialogError> {
        self.format.parse(self.text)
    }
}

/// Integer value of a number, accepting floats with no fractional part.
fn integral(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn string_field(record: &Map<String, Value>, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_choices(value: Option<&Value>) -> Vec<DialogChoice> {
    let entries: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(Value::as_object)
        .map(|choice| DialogChoice {
            text: string_field(choice, "text"),
            next_id: choice.get("next").and_then(integral).unwrap_or(0),
        })
        .collect()
}

/// Builds the node list from a parsed document.
///
/// Ids are assigned here; uniqueness is checked when the graph indexes them.
pub fn build_nodes(document: &Value) -> Result<Vec<(String, DialogNode)>, DialogError> {
    let entries: Vec<(String, &Value)> = match document {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("#{}", i), v))
            .collect(),
        _ => return Err(DialogError::NotATable),
    };

    let mut auto_id: NodeId = 1;
    let mut nodes = Vec::with_capacity(entries.len());
    for (label, entry) in entries {
        let Some(record) = entry.as_object() else {
            tracing::debug!("Skipping non-table entry '{}'", label);
            continue;
        };

        let id = record.get("id").and_then(integral).unwrap_or(auto_id);
        auto_id += 1;

        let node = DialogNode {
            id,
            speaker: string_field(record, "speaker"),
            text: string_field(record, "text"),
            choices: parse_choices(record.get("choices")),
            next_id: record.get("next").and_then(integral),
        };
        nodes.push((label, node));
    }

    Ok(nodes)
}
