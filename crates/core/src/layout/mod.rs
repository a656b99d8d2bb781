//! Page layout configuration storage.
//!
//! A page's layout is one versioned JSON document holding its ordered
//! sections. [`LayoutStore`] reads it (falling back to the starter layout),
//! saves new versions, and wraps the pure list operations in [`ops`] with
//! load-mutate-save convenience methods.

pub mod defaults;
pub mod ops;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::registry::SectionTypeRegistry;
use crate::sections::SectionInstance;
use crate::types::{DbId, JsonMap, Timestamp};

pub use defaults::default_configuration;
pub use ops::SectionPatch;

/// Settings group under which layout documents are persisted.
pub const LAYOUT_SETTINGS_GROUP: &str = "layouts";

/// The stored layout of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayoutConfiguration {
    pub sections: Vec<SectionInstance>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_by: Option<DbId>,
}

impl PageLayoutConfiguration {
    /// Enabled sections in render order.
    pub fn enabled_sections(&self) -> impl Iterator<Item = &SectionInstance> {
        self.sections.iter().filter(|s| s.enabled)
    }

    pub fn find(&self, id: Uuid) -> Option<&SectionInstance> {
        self.sections.iter().find(|s| s.id == id)
    }
}

/// Key-value persistence for layout documents.
#[async_trait]
pub trait LayoutPersistence: Send + Sync {
    async fn get(&self, key: &str) -> CoreResult<Option<Value>>;

    async fn set(&self, key: &str, value: Value, group: &str) -> CoreResult<()>;
}

/// Reads and writes page layouts through a [`LayoutPersistence`].
pub struct LayoutStore {
    persistence: Arc<dyn LayoutPersistence>,
    registry: Arc<SectionTypeRegistry>,
}

impl LayoutStore {
    pub fn new(persistence: Arc<dyn LayoutPersistence>, registry: Arc<SectionTypeRegistry>) -> Self {
        Self {
            persistence,
            registry,
        }
    }

    pub fn registry(&self) -> &SectionTypeRegistry {
        &self.registry
    }

    /// The stored configuration for `page_key`, or the starter layout when
    /// nothing is stored or the stored document has no usable `sections`.
    ///
    /// Sections that fail to parse are logged and left out.
    pub async fn get_configuration(&self, page_key: &str) -> CoreResult<PageLayoutConfiguration> {
        Ok(self.load(page_key).await?.0)
    }

    async fn load(&self, page_key: &str) -> CoreResult<(PageLayoutConfiguration, LoadState)> {
        match self.persistence.get(page_key).await? {
            Some(stored) => Ok(parse_document(page_key, stored)),
            None => {
                tracing::debug!(page_key, "No stored layout, using default configuration");
                Ok((default_configuration(), LoadState::Missing))
            }
        }
    }

    /// Load for a load-mutate-save call.
    ///
    /// Refuses when saving would overwrite stored sections that could not be
    /// read, so a damaged document is never replaced by a partial copy or by
    /// the starter layout.
    async fn load_for_update(&self, page_key: &str) -> CoreResult<PageLayoutConfiguration> {
        let (config, state) = self.load(page_key).await?;
        match state {
            LoadState::Missing | LoadState::Parsed => Ok(config),
            LoadState::Partial { skipped } => Err(CoreError::Validation(format!(
                "Layout '{page_key}' has {skipped} unreadable section(s); \
                 save or reset the whole layout before editing it"
            ))),
            LoadState::Unusable => Err(CoreError::Validation(format!(
                "Stored layout '{page_key}' has no usable sections; \
                 save or reset the whole layout before editing it"
            ))),
        }
    }

    /// Persist `config` as the next version of `page_key`.
    ///
    /// The version is read from the currently stored document (0 when none)
    /// and incremented; sections are sorted and renumbered before writing.
    pub async fn save_configuration(
        &self,
        page_key: &str,
        mut config: PageLayoutConfiguration,
        user_id: Option<DbId>,
    ) -> CoreResult<PageLayoutConfiguration> {
        let current_version = self
            .persistence
            .get(page_key)
            .await?
            .and_then(|v| v.get("version").and_then(Value::as_u64))
            .unwrap_or(0);

        ops::sort_by_order(&mut config.sections);
        ops::renumber(&mut config.sections);

        for section in &config.sections {
            if !self.registry.validate_config(&section.section_type, &section.config) {
                tracing::warn!(
                    page_key,
                    section_id = %section.id,
                    section_type = %section.section_type,
                    "Saving section whose config does not validate",
                );
            }
        }

        config.version = current_version + 1;
        config.updated_at = Some(chrono::Utc::now());
        config.updated_by = user_id;

        self.persistence
            .set(page_key, serde_json::to_value(&config)?, LAYOUT_SETTINGS_GROUP)
            .await?;

        tracing::info!(
            page_key,
            version = config.version,
            section_count = config.sections.len(),
            "Page layout saved",
        );
        Ok(config)
    }

    /// Save the starter layout as a new version.
    pub async fn reset_configuration(
        &self,
        page_key: &str,
        user_id: Option<DbId>,
    ) -> CoreResult<PageLayoutConfiguration> {
        self.save_configuration(page_key, default_configuration(), user_id)
            .await
    }

    /// Add a section to the stored page and save. Returns the new section.
    pub async fn add_section(
        &self,
        page_key: &str,
        section_type: &str,
        position: Option<usize>,
        overrides: &JsonMap,
        user_id: Option<DbId>,
    ) -> CoreResult<SectionInstance> {
        let mut config = self.load_for_update(page_key).await?;
        let section = ops::add_section(
            &self.registry,
            &mut config.sections,
            section_type,
            position,
            overrides,
        )?;
        self.save_configuration(page_key, config, user_id).await?;

        tracing::info!(
            page_key,
            section_id = %section.id,
            section_type,
            order = section.order,
            "Section added",
        );
        Ok(section)
    }

    pub async fn remove_section(
        &self,
        page_key: &str,
        section_id: Uuid,
        user_id: Option<DbId>,
    ) -> CoreResult<PageLayoutConfiguration> {
        let mut config = self.load_for_update(page_key).await?;
        if !ops::remove_section(&mut config.sections, section_id) {
            return Err(section_not_found(section_id));
        }
        self.save_configuration(page_key, config, user_id).await
    }

    pub async fn reorder_sections(
        &self,
        page_key: &str,
        new_order: &[Uuid],
        user_id: Option<DbId>,
    ) -> CoreResult<PageLayoutConfiguration> {
        let mut config = self.load_for_update(page_key).await?;
        ops::reorder_sections(&mut config.sections, new_order);
        self.save_configuration(page_key, config, user_id).await
    }

    pub async fn update_section(
        &self,
        page_key: &str,
        section_id: Uuid,
        patch: &SectionPatch,
        user_id: Option<DbId>,
    ) -> CoreResult<PageLayoutConfiguration> {
        let mut config = self.load_for_update(page_key).await?;
        if let Some(slots) = &patch.slots {
            let section_type = config
                .find(section_id)
                .map(|s| s.section_type.clone())
                .ok_or_else(|| section_not_found(section_id))?;
            self.registry.validate_slots(&section_type, slots)?;
        }
        if !ops::update_section(&mut config.sections, section_id, patch) {
            return Err(section_not_found(section_id));
        }
        self.save_configuration(page_key, config, user_id).await
    }

    pub async fn toggle_section(
        &self,
        page_key: &str,
        section_id: Uuid,
        enabled: bool,
        user_id: Option<DbId>,
    ) -> CoreResult<PageLayoutConfiguration> {
        let mut config = self.load_for_update(page_key).await?;
        if !ops::toggle_section(&mut config.sections, section_id, enabled) {
            return Err(section_not_found(section_id));
        }
        self.save_configuration(page_key, config, user_id).await
    }

    pub async fn duplicate_section(
        &self,
        page_key: &str,
        section_id: Uuid,
        user_id: Option<DbId>,
    ) -> CoreResult<SectionInstance> {
        let mut config = self.load_for_update(page_key).await?;
        let copy = ops::duplicate_section(&mut config.sections, section_id)
            .ok_or_else(|| section_not_found(section_id))?;
        self.save_configuration(page_key, config, user_id).await?;
        Ok(copy)
    }
}

/// Outcome of reading a page's stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    /// Nothing stored; the starter layout stands in.
    Missing,
    /// Every stored section was read.
    Parsed,
    /// Some stored sections could not be read and were left out.
    Partial { skipped: usize },
    /// A document exists but has no `sections` array.
    Unusable,
}

/// Read a stored layout document section by section.
fn parse_document(page_key: &str, mut stored: Value) -> (PageLayoutConfiguration, LoadState) {
    let raw_sections = match stored.get_mut("sections").map(Value::take) {
        Some(Value::Array(raw)) => raw,
        Some(_) => {
            tracing::warn!(page_key, "Stored layout sections are not a list, using default configuration");
            return (default_configuration(), LoadState::Unusable);
        }
        None => {
            tracing::warn!(page_key, "Stored layout has no sections, using default configuration");
            return (default_configuration(), LoadState::Unusable);
        }
    };

    let mut sections = Vec::with_capacity(raw_sections.len());
    let mut skipped = 0;
    for (position, raw) in raw_sections.into_iter().enumerate() {
        match serde_json::from_value::<SectionInstance>(raw) {
            Ok(section) => sections.push(section),
            Err(err) => {
                skipped += 1;
                tracing::warn!(
                    page_key,
                    position,
                    error = %err,
                    "Skipping unreadable stored section",
                );
            }
        }
    }
    ops::sort_by_order(&mut sections);

    let config = PageLayoutConfiguration {
        sections,
        version: stored.get("version").and_then(Value::as_u64).unwrap_or(0),
        updated_at: stored
            .get("updatedAt")
            .and_then(|v| serde_json::from_value::<Timestamp>(v.clone()).ok()),
        updated_by: stored.get("updatedBy").and_then(Value::as_i64),
    };
    let state = if skipped == 0 {
        LoadState::Parsed
    } else {
        LoadState::Partial { skipped }
    };
    (config, state)
}

fn section_not_found(id: Uuid) -> CoreError {
    CoreError::NotFound {
        entity: "Section",
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryLayoutPersistence;
    use crate::sections::builtin::{HERO, RECIPE};

    fn store() -> (Arc<MemoryLayoutPersistence>, LayoutStore) {
        let persistence = Arc::new(MemoryLayoutPersistence::new());
        let registry = Arc::new(SectionTypeRegistry::with_builtin_types());
        let store = LayoutStore::new(persistence.clone(), registry);
        (persistence, store)
    }

    #[tokio::test]
    async fn missing_page_returns_default() {
        let (_, store) = store();
        let config = store.get_configuration("homepage").await.unwrap();
        assert_eq!(config, default_configuration());
    }

    #[tokio::test]
    async fn document_without_sections_returns_default() {
        let (persistence, store) = store();
        persistence
            .set("homepage", json!({"version": 4}), LAYOUT_SETTINGS_GROUP)
            .await
            .unwrap();
        let config = store.get_configuration("homepage").await.unwrap();
        assert_eq!(config.sections.len(), defaults::DEFAULT_SECTION_COUNT);
    }

    #[tokio::test]
    async fn malformed_sections_return_default() {
        let (persistence, store) = store();
        persistence
            .set("homepage", json!({"sections": "nope"}), LAYOUT_SETTINGS_GROUP)
            .await
            .unwrap();
        let config = store.get_configuration("homepage").await.unwrap();
        assert_eq!(config, default_configuration());
    }

    const NEWSLETTER_ID: &str = "0b7f2a9e-51c4-4c38-8d2e-6a1f0e9d3c21";
    const SPREAD_ID: &str = "c4e8d1b2-9a7f-4e3c-b6d5-1f2a3b4c5d6e";

    fn legacy_document(spread_mode: &str) -> Value {
        json!({
            "sections": [
                {
                    "id": NEWSLETTER_ID,
                    "type": "newsletter",
                    "order": 0,
                    "config": {"heading": "Weekly"},
                    "dataSource": {"action": "recent", "params": []}
                },
                {
                    "id": SPREAD_ID,
                    "type": "spread",
                    "order": 1,
                    "config": {"count": 3},
                    "slots": [{"index": 0, "mode": spread_mode, "postId": "7"}]
                }
            ],
            "version": 5,
            "updatedBy": 2
        })
    }

    #[tokio::test]
    async fn legacy_encodings_survive_load_and_add() {
        let (persistence, store) = store();
        persistence
            .set("homepage", legacy_document("manual"), LAYOUT_SETTINGS_GROUP)
            .await
            .unwrap();

        let loaded = store.get_configuration("homepage").await.unwrap();
        assert_eq!(loaded.version, 5);
        assert_eq!(loaded.updated_by, Some(2));
        assert_eq!(loaded.sections.len(), 2);
        assert_eq!(loaded.sections[1].slots[0].manual_post_id(), Some(7));

        store
            .add_section("homepage", RECIPE, None, &JsonMap::new(), Some(3))
            .await
            .unwrap();

        let after = store.get_configuration("homepage").await.unwrap();
        assert_eq!(after.version, 6);
        let ids: Vec<String> = after.sections.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(ids[0], NEWSLETTER_ID);
        assert_eq!(ids[1], SPREAD_ID);
        assert_eq!(after.sections[2].section_type, RECIPE);
    }

    #[tokio::test]
    async fn unreadable_section_is_skipped_on_read() {
        let (persistence, store) = store();
        persistence
            .set("homepage", legacy_document("pinned"), LAYOUT_SETTINGS_GROUP)
            .await
            .unwrap();

        let loaded = store.get_configuration("homepage").await.unwrap();
        assert_eq!(loaded.version, 5);
        assert_eq!(loaded.sections.len(), 1);
        assert_eq!(loaded.sections[0].id.to_string(), NEWSLETTER_ID);
    }

    #[tokio::test]
    async fn unreadable_section_blocks_edits() {
        let (persistence, store) = store();
        persistence
            .set("homepage", legacy_document("pinned"), LAYOUT_SETTINGS_GROUP)
            .await
            .unwrap();
        let newsletter_id: Uuid = NEWSLETTER_ID.parse().unwrap();

        let added = store
            .add_section("homepage", RECIPE, None, &JsonMap::new(), None)
            .await;
        assert_matches!(added, Err(CoreError::Validation(_)));
        let toggled = store.toggle_section("homepage", newsletter_id, false, None).await;
        assert_matches!(toggled, Err(CoreError::Validation(_)));
        let reordered = store.reorder_sections("homepage", &[newsletter_id], None).await;
        assert_matches!(reordered, Err(CoreError::Validation(_)));

        let stored = persistence.get("homepage").await.unwrap().unwrap();
        assert_eq!(stored, legacy_document("pinned"));
    }

    #[tokio::test]
    async fn document_without_sections_blocks_edits_until_reset() {
        let (persistence, store) = store();
        persistence
            .set("homepage", json!({"version": 4}), LAYOUT_SETTINGS_GROUP)
            .await
            .unwrap();
        let hero_id = default_configuration().sections[0].id;

        let result = store.remove_section("homepage", hero_id, None).await;
        assert_matches!(result, Err(CoreError::Validation(_)));

        let reset = store.reset_configuration("homepage", None).await.unwrap();
        assert_eq!(reset.version, 5);
        assert!(store.remove_section("homepage", hero_id, None).await.is_ok());
    }

    #[tokio::test]
    async fn save_stamps_audit_fields_and_group() {
        let (persistence, store) = store();
        let saved = store
            .save_configuration("homepage", default_configuration(), Some(42))
            .await
            .unwrap();
        assert_eq!(saved.version, 1);
        assert_eq!(saved.updated_by, Some(42));
        assert!(saved.updated_at.is_some());
        assert_eq!(persistence.group_of("homepage").as_deref(), Some(LAYOUT_SETTINGS_GROUP));

        let loaded = store.get_configuration("homepage").await.unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn save_sorts_and_renumbers() {
        let (_, store) = store();
        let mut config = default_configuration();
        config.sections.reverse();
        for (i, section) in config.sections.iter_mut().enumerate() {
            section.order = (10 - i) * 3;
        }
        let saved = store.save_configuration("p", config, None).await.unwrap();
        let orders: Vec<usize> = saved.sections.iter().map(|s| s.order).collect();
        assert_eq!(orders, (0..11).collect::<Vec<_>>());
        assert_eq!(saved.sections[0].section_type, HERO);
    }

    #[tokio::test]
    async fn pages_version_independently() {
        let (_, store) = store();
        store.reset_configuration("a", None).await.unwrap();
        store.reset_configuration("a", None).await.unwrap();
        let b = store.reset_configuration("b", None).await.unwrap();
        assert_eq!(b.version, 1);
    }

    #[tokio::test]
    async fn add_section_persists() {
        let (_, store) = store();
        let added = store
            .add_section("homepage", RECIPE, Some(0), &JsonMap::new(), Some(1))
            .await
            .unwrap();
        let config = store.get_configuration("homepage").await.unwrap();
        assert_eq!(config.version, 1);
        assert_eq!(config.sections.len(), 12);
        assert_eq!(config.sections[0].id, added.id);
    }

    #[tokio::test]
    async fn add_unknown_type_fails_without_saving() {
        let (persistence, store) = store();
        let result = store
            .add_section("homepage", "nope", None, &JsonMap::new(), None)
            .await;
        assert_matches!(result, Err(CoreError::UnknownSectionType(t)) if t == "nope");
        assert!(persistence.get("homepage").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_unknown_section_is_not_found() {
        let (_, store) = store();
        let result = store.remove_section("homepage", Uuid::new_v4(), None).await;
        assert_matches!(result, Err(CoreError::NotFound { entity: "Section", .. }));
    }

    #[tokio::test]
    async fn update_rejects_out_of_bounds_slots() {
        let (_, store) = store();
        let hero_id = default_configuration().sections[0].id;
        let patch = SectionPatch {
            slots: Some(vec![]),
            ..SectionPatch::default()
        };
        let result = store.update_section("homepage", hero_id, &patch, None).await;
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn toggle_and_duplicate_round_through_storage() {
        let (_, store) = store();
        let hero_id = default_configuration().sections[0].id;

        let config = store.toggle_section("homepage", hero_id, false, None).await.unwrap();
        assert!(!config.find(hero_id).unwrap().enabled);

        let copy = store.duplicate_section("homepage", hero_id, None).await.unwrap();
        let config = store.get_configuration("homepage").await.unwrap();
        assert_eq!(config.version, 2);
        assert_eq!(config.sections[1].id, copy.id);
        assert!(!copy.enabled);
    }
}
