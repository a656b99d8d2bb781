//! Declarative schema pieces shared by every section type: config fields,
//! static slot fields and the abstract preview layout.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Config fields
// ---------------------------------------------------------------------------

/// Editing widget kind for a config or slot field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Select,
    Toggle,
    Number,
    Color,
    Media,
    Tags,
}

/// A single entry in a section type's `configSchema`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigField {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    pub default: Value,
    /// Allowed values; only meaningful for [`FieldKind::Select`].
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ConfigField {
    fn new(kind: FieldKind, label: &str, default: Value) -> Self {
        Self {
            kind,
            label: label.to_string(),
            default,
            options: Vec::new(),
        }
    }

    pub fn text(label: &str, default: &str) -> Self {
        Self::new(FieldKind::Text, label, Value::from(default))
    }

    pub fn textarea(label: &str, default: &str) -> Self {
        Self::new(FieldKind::Textarea, label, Value::from(default))
    }

    pub fn color(label: &str, default: &str) -> Self {
        Self::new(FieldKind::Color, label, Value::from(default))
    }

    pub fn toggle(label: &str, default: bool) -> Self {
        Self::new(FieldKind::Toggle, label, Value::Bool(default))
    }

    pub fn number(label: &str, default: i64) -> Self {
        Self::new(FieldKind::Number, label, Value::from(default))
    }

    pub fn media(label: &str) -> Self {
        Self::new(FieldKind::Media, label, Value::Null)
    }

    pub fn tags(label: &str) -> Self {
        Self::new(FieldKind::Tags, label, Value::Array(Vec::new()))
    }

    pub fn select(label: &str, options: &[&str], default: &str) -> Self {
        Self {
            options: options.iter().map(|o| o.to_string()).collect(),
            ..Self::new(FieldKind::Select, label, Value::from(default))
        }
    }

    /// Advisory check of a supplied value against this field's kind.
    ///
    /// - `select`: the value (string, or number compared by its textual form)
    ///   must be one of `options`.
    /// - `toggle`: the value must be a JSON boolean.
    /// - `number`: the value must be a JSON number or a numeric string.
    ///
    /// Every other kind accepts anything.
    pub fn accepts(&self, value: &Value) -> bool {
        match self.kind {
            FieldKind::Select => {
                let candidate = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return false,
                };
                self.options.iter().any(|o| *o == candidate)
            }
            FieldKind::Toggle => value.is_boolean(),
            FieldKind::Number => match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            _ => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Slot fields
// ---------------------------------------------------------------------------

/// Editing metadata for a static slot content field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotField {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
}

impl SlotField {
    pub fn new(kind: FieldKind, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Preview schema
// ---------------------------------------------------------------------------

/// Abstract arrangement used by the builder UI to sketch a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewLayout {
    Banner,
    Split,
    Grid,
    Carousel,
    Stack,
    Block,
}

/// A named region of the preview, optionally bound to a content slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewArea {
    pub name: String,
    pub slot: Option<usize>,
}

/// Purely descriptive layout sketch; never consulted by resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewSchema {
    pub layout: PreviewLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,
    pub areas: Vec<PreviewArea>,
}

impl PreviewSchema {
    pub fn new(layout: PreviewLayout) -> Self {
        Self {
            layout,
            columns: None,
            areas: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: u8) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Add an area not tied to any slot (headings, buttons, forms).
    pub fn area(mut self, name: &str) -> Self {
        self.areas.push(PreviewArea {
            name: name.to_string(),
            slot: None,
        });
        self
    }

    /// Add an area rendered from the content of `slot`.
    pub fn slot_area(mut self, name: &str, slot: usize) -> Self {
        self.areas.push(PreviewArea {
            name: name.to_string(),
            slot: Some(slot),
        });
        self
    }
}
