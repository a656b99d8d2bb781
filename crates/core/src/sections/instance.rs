//! Persisted section instances and their content slots.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::{is_blank, DbId, JsonMap};

/// How a slot obtains its content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotMode {
    /// An editor pinned a specific post (or product).
    Manual,
    /// Inline content typed into the slot.
    Static,
    /// Filled from the section's data source at render time.
    #[default]
    Dynamic,
}

/// One content position inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub index: usize,
    #[serde(default)]
    pub mode: SlotMode,
    #[serde(default, deserialize_with = "lenient_id")]
    pub post_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_id")]
    pub product_id: Option<DbId>,
    #[serde(default, deserialize_with = "lenient_content")]
    pub content: Option<JsonMap>,
}

impl Slot {
    pub fn dynamic(index: usize) -> Self {
        Self {
            index,
            mode: SlotMode::Dynamic,
            post_id: None,
            product_id: None,
            content: None,
        }
    }

    pub fn manual_post(index: usize, post_id: DbId) -> Self {
        Self {
            mode: SlotMode::Manual,
            post_id: Some(post_id),
            ..Self::dynamic(index)
        }
    }

    pub fn manual_product(index: usize, product_id: DbId) -> Self {
        Self {
            mode: SlotMode::Manual,
            product_id: Some(product_id),
            ..Self::dynamic(index)
        }
    }

    pub fn with_content(index: usize, content: JsonMap) -> Self {
        Self {
            mode: SlotMode::Static,
            content: Some(content),
            ..Self::dynamic(index)
        }
    }

    /// Pinned post id, if this slot is in manual mode with an id set.
    pub fn manual_post_id(&self) -> Option<DbId> {
        match self.mode {
            SlotMode::Manual => self.post_id.filter(|id| *id > 0),
            _ => None,
        }
    }

    /// Pinned product id, if this slot is in manual mode with an id set.
    pub fn manual_product_id(&self) -> Option<DbId> {
        match self.mode {
            SlotMode::Manual => self.product_id.filter(|id| *id > 0),
            _ => None,
        }
    }

    /// Inline content, if this slot is in static mode and any field is filled.
    pub fn static_content(&self) -> Option<&JsonMap> {
        match (self.mode, &self.content) {
            (SlotMode::Static, Some(content)) if content.values().any(|v| !is_blank(v)) => {
                Some(content)
            }
            _ => None,
        }
    }
}

/// Where a section's dynamic slots pull content from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub action: String,
    #[serde(default, deserialize_with = "lenient_map")]
    pub params: JsonMap,
}

impl DataSource {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            params: JsonMap::new(),
        }
    }

    pub fn with_params(action: &str, params: JsonMap) -> Self {
        Self {
            action: action.to_string(),
            params,
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

// Layouts written by older editors encode an empty object as `[]` and ids as
// strings. Both are accepted here so one such field does not cost the section.

fn map_from(value: Value) -> Result<Option<JsonMap>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        Value::Array(items) if items.is_empty() => Ok(Some(JsonMap::new())),
        other => Err(format!("expected an object, got {other}")),
    }
}

fn lenient_map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<JsonMap, D::Error> {
    map_from(Value::deserialize(deserializer)?)
        .map(Option::unwrap_or_default)
        .map_err(serde::de::Error::custom)
}

fn lenient_content<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<JsonMap>, D::Error> {
    map_from(Value::deserialize(deserializer)?).map_err(serde::de::Error::custom)
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DbId>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id '{s}'"))),
        other => Err(serde::de::Error::custom(format!("invalid id {other}"))),
    }
}

fn default_enabled() -> bool {
    true
}

/// A configured section placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInstance {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub section_type: String,
    #[serde(default)]
    pub order: usize,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient_map")]
    pub config: JsonMap,
    /// `None` means "use the type's default data source".
    #[serde(default)]
    pub data_source: Option<DataSource>,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

impl SectionInstance {
    /// Slot stored at `index`, if any.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.iter().find(|s| s.index == index)
    }
}
