//! Section type registry.
//!
//! Built once at startup and passed by reference to the store, resolver and
//! catalog serializer. Registration order is preserved for the builder UI.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::sections::builtin::{builtin_definitions, extension_definitions};
use crate::sections::{ConfigField, DataSource, PreviewSchema, SectionDefinition, Slot, SlotField};
use crate::types::{DbId, JsonMap};

/// Catalog of available section types.
#[derive(Debug, Clone, Default)]
pub struct SectionTypeRegistry {
    definitions: IndexMap<String, SectionDefinition>,
}

impl SectionTypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the twelve built-in types.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        for def in builtin_definitions() {
            registry.insert(def);
        }
        registry
    }

    /// Add the optional `feature-1` / `feature-2` types.
    pub fn register_extensions(&mut self) {
        for def in extension_definitions() {
            self.insert(def);
        }
    }

    /// Register (or replace) a definition after checking its slot bounds.
    pub fn register(&mut self, definition: SectionDefinition) -> CoreResult<()> {
        definition.validate_bounds()?;
        if self.definitions.contains_key(&definition.section_type) {
            tracing::debug!(
                section_type = %definition.section_type,
                "Replacing registered section type",
            );
        }
        self.insert(definition);
        Ok(())
    }

    fn insert(&mut self, definition: SectionDefinition) {
        self.definitions
            .insert(definition.section_type.clone(), definition);
    }

    pub fn get(&self, section_type: &str) -> Option<&SectionDefinition> {
        self.definitions.get(section_type)
    }

    pub fn has(&self, section_type: &str) -> bool {
        self.definitions.contains_key(section_type)
    }

    pub fn all(&self) -> &IndexMap<String, SectionDefinition> {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Look up a definition or fail with [`CoreError::UnknownSectionType`].
    pub fn require(&self, section_type: &str) -> CoreResult<&SectionDefinition> {
        self.get(section_type)
            .ok_or_else(|| CoreError::UnknownSectionType(section_type.to_string()))
    }

    /// Advisory check of a config map against the type's schema.
    ///
    /// Only keys present in both the schema and `config` are checked; missing
    /// keys fall back to defaults and unknown extra keys are accepted. Returns
    /// `false` for an unknown type.
    pub fn validate_config(&self, section_type: &str, config: &JsonMap) -> bool {
        let Some(def) = self.get(section_type) else {
            return false;
        };
        def.config_schema.iter().all(|(key, field)| match config.get(key) {
            Some(value) => field.accepts(value),
            None => true,
        })
    }

    /// Check a slot list against the type's `min_slots` / `max_slots` and
    /// require unique slot indices.
    pub fn validate_slots(&self, section_type: &str, slots: &[Slot]) -> CoreResult<()> {
        let def = self.require(section_type)?;

        if slots.len() < def.min_slots {
            return Err(CoreError::Validation(format!(
                "Section type '{section_type}' needs at least {} slots, got {}",
                def.min_slots,
                slots.len()
            )));
        }
        if def.max_slots > 0 && slots.len() > def.max_slots {
            return Err(CoreError::Validation(format!(
                "Section type '{section_type}' allows at most {} slots, got {}",
                def.max_slots,
                slots.len()
            )));
        }

        let mut seen = HashSet::with_capacity(slots.len());
        for slot in slots {
            if !seen.insert(slot.index) {
                return Err(CoreError::Validation(format!(
                    "Duplicate slot index {} in section type '{section_type}'",
                    slot.index
                )));
            }
        }
        Ok(())
    }

    /// Serialize every definition for the builder UI, merging in each type's
    /// allowed category list (empty when unrestricted).
    pub fn to_array(
        &self,
        restrictions: &HashMap<String, HashSet<DbId>>,
    ) -> Vec<SectionTypeSummary> {
        self.definitions
            .values()
            .map(|def| {
                let mut allowed: Vec<DbId> = restrictions
                    .get(&def.section_type)
                    .map(|ids| ids.iter().copied().collect())
                    .unwrap_or_default();
                allowed.sort_unstable();
                SectionTypeSummary::from_definition(def, allowed)
            })
            .collect()
    }
}

/// Serialized form of one section type for client consumption.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTypeSummary {
    #[serde(rename = "type")]
    pub section_type: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub slot_count: usize,
    pub min_slots: usize,
    pub max_slots: usize,
    pub config_schema: IndexMap<String, ConfigField>,
    pub slot_schema: IndexMap<String, SlotField>,
    pub slot_labels: Vec<String>,
    pub supported_actions: Vec<String>,
    pub supports_dynamic: bool,
    pub default_config: JsonMap,
    pub default_slots: Vec<Slot>,
    pub default_data_source: DataSource,
    pub preview_schema: PreviewSchema,
    pub allowed_categories: Vec<DbId>,
}

impl SectionTypeSummary {
    fn from_definition(def: &SectionDefinition, allowed_categories: Vec<DbId>) -> Self {
        Self {
            section_type: def.section_type.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            icon: def.icon.clone(),
            slot_count: def.slot_count,
            min_slots: def.min_slots,
            max_slots: def.max_slots,
            config_schema: def.config_schema.clone(),
            slot_schema: def.slot_schema.clone(),
            slot_labels: (0..def.slot_count.max(def.max_slots))
                .map(|i| def.slot_label(i))
                .collect(),
            supported_actions: def.supported_actions.clone(),
            supports_dynamic: def.supports_dynamic(),
            default_config: def.default_config(),
            default_slots: def.default_slots(),
            default_data_source: def.default_data_source(),
            preview_schema: def.preview.clone(),
            allowed_categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::builtin::{self, HERO, RECIPE, SPREAD};
    use serde_json::json;

    fn map(value: serde_json::Value) -> JsonMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn builtin_registry_lookup() {
        let registry = SectionTypeRegistry::with_builtin_types();
        assert_eq!(registry.len(), 12);
        assert!(registry.has(HERO));
        assert!(!registry.has(builtin::FEATURE_1));
        assert!(registry.get("does-not-exist").is_none());
    }

    #[test]
    fn extensions_are_opt_in() {
        let mut registry = SectionTypeRegistry::with_builtin_types();
        registry.register_extensions();
        assert_eq!(registry.len(), 14);
        assert!(registry.has(builtin::FEATURE_2));
    }

    #[test]
    fn register_rejects_broken_bounds() {
        let mut registry = SectionTypeRegistry::new();
        let broken = SectionDefinition::new("broken", "Broken").slots(1, 2, 0);
        assert!(registry.register(broken).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn register_replaces_existing_type() {
        let mut registry = SectionTypeRegistry::with_builtin_types();
        registry
            .register(SectionDefinition::new(HERO, "Custom hero"))
            .unwrap();
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.get(HERO).unwrap().name, "Custom hero");
    }

    #[test]
    fn validate_config_checks_present_keys() {
        let registry = SectionTypeRegistry::with_builtin_types();
        assert!(registry.validate_config(HERO, &map(json!({"alignment": "left"}))));
        assert!(!registry.validate_config(HERO, &map(json!({"alignment": "diagonal"}))));
        assert!(registry.validate_config(HERO, &JsonMap::new()));
    }

    #[test]
    fn validate_config_accepts_unknown_extra_keys() {
        let registry = SectionTypeRegistry::with_builtin_types();
        assert!(registry.validate_config(SPREAD, &map(json!({"futureKnob": [1, 2, 3]}))));
    }

    #[test]
    fn validate_config_toggle_and_number() {
        let registry = SectionTypeRegistry::with_builtin_types();
        assert!(registry.validate_config(SPREAD, &map(json!({"showIntro": false, "count": "6"}))));
        assert!(!registry.validate_config(SPREAD, &map(json!({"showIntro": "no"}))));
        assert!(!registry.validate_config(SPREAD, &map(json!({"count": "many"}))));
    }

    #[test]
    fn validate_config_unknown_type_is_false() {
        let registry = SectionTypeRegistry::with_builtin_types();
        assert!(!registry.validate_config("does-not-exist", &JsonMap::new()));
    }

    #[test]
    fn validate_slots_bounds_and_uniqueness() {
        let registry = SectionTypeRegistry::with_builtin_types();
        let recipe = registry.get(RECIPE).unwrap();

        assert!(registry.validate_slots(RECIPE, &recipe.default_slots()).is_ok());
        assert!(registry.validate_slots(RECIPE, &[Slot::dynamic(0)]).is_err());
        assert!(registry
            .validate_slots(RECIPE, &[Slot::dynamic(0), Slot::dynamic(0)])
            .is_err());

        let too_many: Vec<Slot> = (0..13).map(Slot::dynamic).collect();
        assert!(registry.validate_slots(RECIPE, &too_many).is_err());
        assert!(registry.validate_slots("nope", &[]).is_err());
    }

    #[test]
    fn to_array_merges_restrictions() {
        let registry = SectionTypeRegistry::with_builtin_types();
        let mut restrictions = HashMap::new();
        restrictions.insert(RECIPE.to_string(), HashSet::from([7, 3]));

        let summaries = registry.to_array(&restrictions);
        assert_eq!(summaries.len(), 12);
        assert_eq!(summaries[0].section_type, HERO);

        let recipe = summaries.iter().find(|s| s.section_type == RECIPE).unwrap();
        assert_eq!(recipe.allowed_categories, vec![3, 7]);

        let hero = &summaries[0];
        assert!(hero.allowed_categories.is_empty());
    }

    #[test]
    fn summary_serializes_expected_keys() {
        let registry = SectionTypeRegistry::with_builtin_types();
        let value = serde_json::to_value(&registry.to_array(&HashMap::new())[0]).unwrap();
        for key in [
            "type",
            "name",
            "description",
            "icon",
            "slotCount",
            "minSlots",
            "maxSlots",
            "configSchema",
            "slotSchema",
            "slotLabels",
            "supportedActions",
            "supportsDynamic",
            "defaultConfig",
            "defaultSlots",
            "defaultDataSource",
            "previewSchema",
            "allowedCategories",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["defaultDataSource"], json!({"action": "recent", "params": {}}));
        assert_eq!(value["supportsDynamic"], true);
    }
}
