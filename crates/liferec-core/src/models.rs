//! Data models for liferec
//!
//! Defines the on-disk document (`Database`), the journaled `Record`, its
//! `RecordId`, and `RecordFields`, the validated input for create/update.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Local;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Prefix of every record identifier
pub const ID_PREFIX: &str = "lr-";

/// Format of the creation timestamp stored on each record
pub const TIMESTAMP_FORMAT: &str = "%d-%b-%Y %H:%M";

/// Field names accepted in create/update input
pub const RECORD_FIELDS: [&str; 3] = ["tag", "title", "content"];

/// Identifier of a record, derived from the database counter
///
/// Written as `lr-<n>` everywhere (JSON keys, `id` fields, display).
/// Ordering is numeric, so `lr-2` sorts before `lr-10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(u64);

impl RecordId {
    /// Create an identifier from a counter value
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// The counter value this identifier was derived from
    pub fn seq(&self) -> u64 {
        self.0
    }

    /// Parse the canonical `lr-<n>` form
    ///
    /// Returns `None` for anything else, including a bare number or a
    /// zero-padded one (`lr-01`), so every identifier has one spelling.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(ID_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        digits.parse().ok().map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ID_PREFIX, self.0)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid record identifier: {s:?}")))
    }
}

impl TryFrom<&Value> for RecordId {
    type Error = StoreError;

    /// Identifiers arriving as loose JSON must be strings
    fn try_from(value: &Value) -> StoreResult<Self> {
        match value {
            Value::String(s) => RecordId::parse(s).ok_or_else(|| StoreError::NotFound(s.clone())),
            other => Err(StoreError::Type(format!(
                "identifier must be a string, got {}",
                json_type_name(other)
            ))),
        }
    }
}

/// A single journaled life event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Unique identifier, never reused
    pub id: RecordId,
    /// Creation time, fixed at creation
    pub timestamp: String,
    /// Optional free-form tag (may be empty)
    #[serde(default)]
    pub tag: String,
    /// Record title
    pub title: String,
    /// Record body
    pub content: String,
}

/// The JSON document holding the counter and every record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Database {
    /// Highest counter value ever issued; never decremented
    pub last_id: u64,
    /// Records keyed by identifier
    #[serde(default)]
    pub records: BTreeMap<RecordId, Record>,
}

impl Database {
    /// Create an empty database (`last_id = 0`, no records)
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter and return the identifier for the next record
    ///
    /// Fails without touching the counter once it is at `u64::MAX`.
    pub fn next_id(&mut self) -> StoreResult<RecordId> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted {
                last_id: self.last_id,
            })?;
        self.last_id = next;
        Ok(RecordId::new(next))
    }

    /// Check the invariants a loaded document must satisfy
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        for (key, record) in &self.records {
            if *key != record.id {
                return Err(format!("key {} holds record with id {}", key, record.id));
            }
            if key.seq() > self.last_id {
                return Err(format!(
                    "record {} is newer than last_id {}",
                    key, self.last_id
                ));
            }
        }
        Ok(())
    }
}

/// Validated input for creating or updating a record
///
/// Each field is optional here. Creation additionally requires `title` and
/// `content`; update only overwrites fields that are present and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub tag: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl RecordFields {
    /// Empty input
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the content
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// True if no field carries a non-empty value
    pub fn is_empty(&self) -> bool {
        [&self.tag, &self.title, &self.content]
            .iter()
            .all(|f| non_blank(f).is_none())
    }

    /// Build fields from a string map, rejecting unknown keys
    pub fn from_map(mut map: BTreeMap<String, String>) -> StoreResult<Self> {
        let unexpected: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|k| !RECORD_FIELDS.contains(k))
            .collect();
        if !unexpected.is_empty() {
            return Err(StoreError::Validation(format!(
                "unexpected field(s): {} (allowed: {})",
                unexpected.join(", "),
                RECORD_FIELDS.join(", ")
            )));
        }

        Ok(Self {
            tag: map.remove("tag"),
            title: map.remove("title"),
            content: map.remove("content"),
        })
    }

    /// Turn the fields into a new record with the given id and current time
    ///
    /// `title` and `content` must be present and not blank.
    pub fn into_record(self, id: RecordId) -> StoreResult<Record> {
        let missing: Vec<&str> = [("title", &self.title), ("content", &self.content)]
            .into_iter()
            .filter(|(_, v)| non_blank(v).is_none())
            .map(|(k, _)| k)
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::Validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Record {
            id,
            timestamp: current_timestamp(),
            tag: self.tag.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
        })
    }

    /// Overwrite the record's fields that are present and non-empty here
    ///
    /// `id` and `timestamp` are never touched.
    pub fn apply_to(&self, record: &mut Record) {
        if let Some(tag) = non_blank(&self.tag) {
            record.tag = tag.to_string();
        }
        if let Some(title) = non_blank(&self.title) {
            record.title = title.to_string();
        }
        if let Some(content) = non_blank(&self.content) {
            record.content = content.to_string();
        }
    }
}

impl TryFrom<&Value> for RecordFields {
    type Error = StoreError;

    /// Accepts only a JSON object whose values are all strings
    fn try_from(value: &Value) -> StoreResult<Self> {
        let Value::Object(object) = value else {
            return Err(StoreError::Type(format!(
                "record input must be an object of strings, got {}",
                json_type_name(value)
            )));
        };

        let mut map = BTreeMap::new();
        for (key, val) in object {
            match val {
                Value::String(s) => {
                    map.insert(key.clone(), s.clone());
                }
                other => {
                    return Err(StoreError::Type(format!(
                        "field '{}' must be a string, got {}",
                        key,
                        json_type_name(other)
                    )));
                }
            }
        }

        Self::from_map(map)
    }
}

/// Current local time in the record timestamp format
pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
