//! Section type definitions: schema, defaults and slot rules for one type.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::sections::instance::{DataSource, Slot, SlotMode};
use crate::sections::schema::{ConfigField, PreviewLayout, PreviewSchema, SlotField};
use crate::types::JsonMap;

// ---------------------------------------------------------------------------
// Fetch action names
// ---------------------------------------------------------------------------

pub const ACTION_RECENT: &str = "recent";
pub const ACTION_TRENDING: &str = "trending";
pub const ACTION_BY_TAG: &str = "byTag";
pub const ACTION_BY_CATEGORY: &str = "byCategory";

/// The four content fetch actions every dynamic post section supports.
pub const POST_FETCH_ACTIONS: &[&str] =
    &[ACTION_RECENT, ACTION_TRENDING, ACTION_BY_TAG, ACTION_BY_CATEGORY];

// ---------------------------------------------------------------------------
// Resolution strategy
// ---------------------------------------------------------------------------

/// Which resolution routine the resolver dispatches a type to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// No content slots; the resolved data is the merged config.
    ConfigOnly,
    /// One slot resolved by manual > static > deferred `{action, params}`.
    SingleSlot,
    /// Many post slots merged from manual, static and fetched content.
    ///
    /// `count_field` names the config knob holding the slot total, when the
    /// type has one.
    MultiSlot { count_field: Option<&'static str> },
    /// Product slots; manual or static only, never fetched here.
    ProductSlots,
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// Static description of one section type.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDefinition {
    pub section_type: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub slot_count: usize,
    pub min_slots: usize,
    /// `0` means unbounded.
    pub max_slots: usize,
    pub config_schema: IndexMap<String, ConfigField>,
    pub slot_schema: IndexMap<String, SlotField>,
    pub slot_labels: Vec<String>,
    pub supported_actions: Vec<String>,
    pub preview: PreviewSchema,
    pub strategy: ResolutionStrategy,
}

impl SectionDefinition {
    /// Start a definition with no slots, no config and no actions.
    pub fn new(section_type: &str, name: &str) -> Self {
        Self {
            section_type: section_type.to_string(),
            name: name.to_string(),
            description: String::new(),
            icon: String::new(),
            slot_count: 0,
            min_slots: 0,
            max_slots: 0,
            config_schema: IndexMap::new(),
            slot_schema: IndexMap::new(),
            slot_labels: Vec::new(),
            supported_actions: Vec::new(),
            preview: PreviewSchema::new(PreviewLayout::Block),
            strategy: ResolutionStrategy::ConfigOnly,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn slots(mut self, slot_count: usize, min_slots: usize, max_slots: usize) -> Self {
        self.slot_count = slot_count;
        self.min_slots = min_slots;
        self.max_slots = max_slots;
        self
    }

    pub fn config(mut self, key: &str, field: ConfigField) -> Self {
        self.config_schema.insert(key.to_string(), field);
        self
    }

    pub fn slot_field(mut self, key: &str, field: SlotField) -> Self {
        self.slot_schema.insert(key.to_string(), field);
        self
    }

    pub fn slot_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slot_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn actions(mut self, actions: &[&str]) -> Self {
        self.supported_actions = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn preview(mut self, preview: PreviewSchema) -> Self {
        self.preview = preview;
        self
    }

    pub fn strategy(mut self, strategy: ResolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    // -----------------------------------------------------------------------
    // Derived operations
    // -----------------------------------------------------------------------

    /// `true` iff the type can fill slots from a fetch action.
    pub fn supports_dynamic(&self) -> bool {
        !self.supported_actions.is_empty()
    }

    /// Each config schema key mapped to its declared default.
    pub fn default_config(&self) -> JsonMap {
        self.config_schema
            .iter()
            .map(|(key, field)| (key.clone(), field.default.clone()))
            .collect()
    }

    /// Empty static content with one key per slot schema field.
    pub fn default_slot_content(&self) -> JsonMap {
        self.slot_schema
            .keys()
            .map(|key| (key.clone(), Value::String(String::new())))
            .collect()
    }

    /// `slot_count` fresh slots, dynamic when the type can fetch, else static.
    pub fn default_slots(&self) -> Vec<Slot> {
        let mode = if self.supports_dynamic() {
            SlotMode::Dynamic
        } else {
            SlotMode::Static
        };
        (0..self.slot_count)
            .map(|index| Slot {
                index,
                mode,
                post_id: None,
                product_id: None,
                content: Some(self.default_slot_content()),
            })
            .collect()
    }

    /// First supported action (or `recent`) with empty params.
    pub fn default_data_source(&self) -> DataSource {
        DataSource::new(
            self.supported_actions
                .first()
                .map(String::as_str)
                .unwrap_or(ACTION_RECENT),
        )
    }

    pub fn supports_action(&self, action: &str) -> bool {
        self.supported_actions.iter().any(|a| a == action)
    }

    /// Editor label for slot `index`.
    pub fn slot_label(&self, index: usize) -> String {
        self.slot_labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Slot {}", index + 1))
    }

    /// Cap `count` at `max_slots` when the type is bounded.
    pub fn clamp_slot_total(&self, count: usize) -> usize {
        if self.max_slots > 0 {
            count.min(self.max_slots)
        } else {
            count
        }
    }

    /// Check `min_slots <= slot_count` and `max_slots == 0 || max_slots >= slot_count`.
    pub fn validate_bounds(&self) -> CoreResult<()> {
        if self.min_slots > self.slot_count {
            return Err(CoreError::Validation(format!(
                "Section type '{}': min_slots ({}) exceeds slot_count ({})",
                self.section_type, self.min_slots, self.slot_count
            )));
        }
        if self.max_slots != 0 && self.max_slots < self.slot_count {
            return Err(CoreError::Validation(format!(
                "Section type '{}': max_slots ({}) is below slot_count ({})",
                self.section_type, self.max_slots, self.slot_count
            )));
        }
        Ok(())
    }
}

/// `"{prefix} 1"`, `"{prefix} 2"`, … for `count` slots.
pub fn numbered_labels(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{prefix} {n}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::schema::FieldKind;
    use serde_json::json;

    fn sample() -> SectionDefinition {
        SectionDefinition::new("sample", "Sample")
            .slots(2, 1, 4)
            .config("title", ConfigField::text("Title", "Hello"))
            .config("image", ConfigField::media("Image"))
            .slot_field("title", SlotField::new(FieldKind::Text, "Title"))
            .slot_field("url", SlotField::new(FieldKind::Text, "Link"))
            .actions(&[ACTION_TRENDING, ACTION_RECENT])
    }

    #[test]
    fn default_config_maps_every_key() {
        let config = sample().default_config();
        assert_eq!(config.len(), 2);
        assert_eq!(config["title"], "Hello");
        assert!(config["image"].is_null());
    }

    #[test]
    fn default_slots_are_dynamic_when_fetchable() {
        let slots = sample().default_slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].index, 1);
        assert_eq!(slots[0].mode, SlotMode::Dynamic);
        assert_eq!(
            serde_json::Value::Object(slots[0].content.clone().unwrap()),
            json!({"title": "", "url": ""})
        );
    }

    #[test]
    fn default_slots_are_static_without_actions() {
        let def = sample().actions(&[]);
        assert!(!def.supports_dynamic());
        assert!(def.default_slots().iter().all(|s| s.mode == SlotMode::Static));
    }

    #[test]
    fn default_data_source_uses_first_action() {
        assert_eq!(sample().default_data_source().action, ACTION_TRENDING);
        assert_eq!(
            sample().actions(&[]).default_data_source().action,
            ACTION_RECENT
        );
    }

    #[test]
    fn bounds_validation() {
        assert!(sample().validate_bounds().is_ok());
        assert!(sample().slots(2, 3, 4).validate_bounds().is_err());
        assert!(sample().slots(5, 1, 4).validate_bounds().is_err());
        assert!(sample().slots(5, 1, 0).validate_bounds().is_ok());
    }

    #[test]
    fn clamp_respects_unbounded() {
        assert_eq!(sample().clamp_slot_total(9), 4);
        assert_eq!(sample().slots(2, 0, 0).clamp_slot_total(9), 9);
    }

    #[test]
    fn slot_label_falls_back_to_position() {
        let def = sample().slot_labels(["Lead"]);
        assert_eq!(def.slot_label(0), "Lead");
        assert_eq!(def.slot_label(1), "Slot 2");
    }

    #[test]
    fn numbered_labels_are_one_based() {
        assert_eq!(numbered_labels("Card", 2), vec!["Card 1", "Card 2"]);
    }
}
