//! Section resolution: turns a stored section into render-ready data.
//!
//! Dispatch is by the type's [`ResolutionStrategy`]:
//!
//! - config-only types return their merged config;
//! - single-slot types pick manual, then static, then hand `{action, params}`
//!   back to the caller without fetching;
//! - multi-slot post types merge pinned, inline and fetched posts;
//! - product types merge pinned and inline products.
//!
//! The [`UsedContentTracker`] is passed in so sections resolved later on the
//! same page never repeat a post placed earlier.

pub mod params;
pub mod resolved;

use std::collections::{BTreeMap, HashMap, HashSet};

use indexmap::IndexSet;
use serde_json::Value;

use crate::content::{ContentItem, ContentLookup, FetchActionRegistry, FetchQuery, Product};
use crate::error::CoreResult;
use crate::registry::SectionTypeRegistry;
use crate::restrictions::{content_allowed, CategoryRestrictionIndex, RestrictionMap};
use crate::sections::{DataSource, ResolutionStrategy, SectionDefinition, SectionInstance, Slot};
use crate::tracker::UsedContentTracker;
use crate::types::{DbId, JsonMap};

pub use params::build_params;
pub use resolved::{ResolvedItem, ResolvedProducts, ResolvedSectionData, ResolvedSlots, SingleSlotContent};

/// Resolves sections against the registry and content collaborators.
///
/// Borrowed for the duration of one page render.
pub struct SlotResolver<'a> {
    registry: &'a SectionTypeRegistry,
    restrictions: &'a CategoryRestrictionIndex,
    lookup: &'a dyn ContentLookup,
    actions: &'a FetchActionRegistry,
    max_fetch: usize,
}

impl<'a> SlotResolver<'a> {
    pub fn new(
        registry: &'a SectionTypeRegistry,
        restrictions: &'a CategoryRestrictionIndex,
        lookup: &'a dyn ContentLookup,
        actions: &'a FetchActionRegistry,
        max_fetch: usize,
    ) -> Self {
        Self {
            registry,
            restrictions,
            lookup,
            actions,
            max_fetch,
        }
    }

    /// Resolve one section.
    ///
    /// An unregistered type yields [`ResolvedSectionData::Empty`] so pages
    /// saved before a type was removed still render.
    pub async fn resolve(
        &self,
        section: &SectionInstance,
        tracker: &mut UsedContentTracker,
    ) -> CoreResult<ResolvedSectionData> {
        let Some(def) = self.registry.get(&section.section_type) else {
            tracing::warn!(
                section_id = %section.id,
                section_type = %section.section_type,
                "Unknown section type, resolving empty",
            );
            return Ok(ResolvedSectionData::Empty);
        };

        let config = merged_config(def, section);
        let resolved = match def.strategy {
            ResolutionStrategy::ConfigOnly => ResolvedSectionData::ConfigOnly { config },
            ResolutionStrategy::SingleSlot => ResolvedSectionData::Single {
                content: self.resolve_single(def, section),
                config,
            },
            ResolutionStrategy::MultiSlot { count_field } => {
                let slots = self
                    .resolve_post_slots(def, section, &config, count_field, tracker)
                    .await?;
                ResolvedSectionData::Slots { config, slots }
            }
            ResolutionStrategy::ProductSlots => {
                let products = self
                    .resolve_product_slots(def, section, &config, tracker)
                    .await?;
                ResolvedSectionData::Products { config, products }
            }
        };

        tracing::debug!(
            section_id = %section.id,
            section_type = %section.section_type,
            items = resolved.items().len(),
            used = tracker.count(),
            "Section resolved",
        );
        Ok(resolved)
    }

    fn resolve_single(&self, def: &SectionDefinition, section: &SectionInstance) -> SingleSlotContent {
        if let Some(slot) = section.slot(0) {
            if let Some(post_id) = slot.manual_post_id() {
                return SingleSlotContent::Manual { post_id };
            }
            if let Some(content) = slot.static_content() {
                return SingleSlotContent::Static {
                    content: content.clone(),
                };
            }
        }

        let source = effective_data_source(def, section);
        SingleSlotContent::Deferred {
            params: build_params(&source.action, &source.params),
            action: source.action,
        }
    }

    async fn resolve_post_slots(
        &self,
        def: &SectionDefinition,
        section: &SectionInstance,
        config: &JsonMap,
        count_field: Option<&'static str>,
        tracker: &mut UsedContentTracker,
    ) -> CoreResult<ResolvedSlots> {
        let total_slots = total_slots(def, section, config, count_field);
        let source = effective_data_source(def, section);
        let params = build_params(&source.action, &source.params);

        let (manual_post_ids, static_content) =
            partition_slots(section, total_slots, Slot::manual_post_id);

        let restrictions = self.restrictions.snapshot().await?;
        let manual_posts = self
            .load_manual_posts(&def.section_type, &manual_post_ids, &restrictions)
            .await?;
        let valid_manual = manual_post_ids
            .values()
            .filter(|id| manual_posts.contains_key(*id))
            .count();

        let dynamic_count = total_slots.saturating_sub(valid_manual + static_content.len());

        let mut exclude: IndexSet<DbId> = manual_post_ids.values().copied().collect();
        exclude.extend(tracker.used_ids());

        let dynamic_items = if dynamic_count == 0 {
            Vec::new()
        } else {
            self.fetch_dynamic(def, &source.action, &params, dynamic_count, &exclude)
                .await?
        };

        let mut dynamic = dynamic_items.into_iter();
        let mut items = Vec::with_capacity(total_slots);
        for index in 0..total_slots {
            if let Some(post) = manual_post_ids.get(&index).and_then(|id| manual_posts.get(id)) {
                items.push(ResolvedItem::Post(post.clone()));
            } else if let Some(content) = static_content.get(&index) {
                items.push(ResolvedItem::Static(content.clone()));
            } else if let Some(post) = dynamic.next() {
                items.push(ResolvedItem::Post(post));
            }
        }

        tracker.mark_all_used(items.iter().filter_map(ResolvedItem::post_id));

        Ok(ResolvedSlots {
            action: source.action,
            params,
            total_slots,
            manual_post_ids,
            static_content,
            dynamic_count,
            items,
        })
    }

    /// Batch-load pinned posts, dropping missing and restricted ones.
    async fn load_manual_posts(
        &self,
        section_type: &str,
        manual_post_ids: &BTreeMap<usize, DbId>,
        restrictions: &RestrictionMap,
    ) -> CoreResult<HashMap<DbId, ContentItem>> {
        if manual_post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: IndexSet<DbId> = manual_post_ids.values().copied().collect();
        let ids: Vec<DbId> = ids.into_iter().collect();
        let found = self.lookup.find_posts(&ids).await?;

        let posts: HashMap<DbId, ContentItem> = found
            .into_iter()
            .filter(|post| content_allowed(restrictions, section_type, &post.category_ids))
            .map(|post| (post.id, post))
            .collect();

        if posts.len() < ids.len() {
            tracing::debug!(
                section_type,
                requested = ids.len(),
                kept = posts.len(),
                "Dropped missing or restricted pinned posts",
            );
        }
        Ok(posts)
    }

    /// Request `count` posts from `action`, never returning an excluded id.
    async fn fetch_dynamic(
        &self,
        def: &SectionDefinition,
        action: &str,
        params: &JsonMap,
        count: usize,
        exclude: &IndexSet<DbId>,
    ) -> CoreResult<Vec<ContentItem>> {
        let Some(fetcher) = self.actions.get(action) else {
            tracing::warn!(
                section_type = %def.section_type,
                action,
                "No fetch action registered, dynamic slots stay empty",
            );
            return Ok(Vec::new());
        };

        let per_page = count.min(self.max_fetch);
        let query = FetchQuery {
            page: 1,
            per_page,
            exclude_ids: exclude.iter().copied().collect(),
            section_type: def.section_type.clone(),
            params: params.clone(),
        };
        let result = fetcher.execute(&query).await?;

        let mut seen = IndexSet::new();
        let items: Vec<ContentItem> = result
            .items
            .into_iter()
            .filter(|item| !exclude.contains(&item.id) && seen.insert(item.id))
            .take(per_page)
            .collect();

        tracing::debug!(
            section_type = %def.section_type,
            action = fetcher.name(),
            requested = per_page,
            received = items.len(),
            "Fetched dynamic slot content",
        );
        Ok(items)
    }

    async fn resolve_product_slots(
        &self,
        def: &SectionDefinition,
        section: &SectionInstance,
        config: &JsonMap,
        tracker: &mut UsedContentTracker,
    ) -> CoreResult<ResolvedProducts> {
        let total_slots = total_slots(def, section, config, None);

        let (manual_product_ids, static_content) =
            partition_slots(section, total_slots, Slot::manual_product_id);

        let products = self
            .load_manual_products(&def.section_type, &manual_product_ids)
            .await?;

        let mut items = Vec::with_capacity(total_slots);
        for index in 0..total_slots {
            if let Some(product) = manual_product_ids.get(&index).and_then(|id| products.get(id)) {
                items.push(ResolvedItem::Product(product.clone()));
            } else if let Some(content) = static_content.get(&index) {
                items.push(ResolvedItem::Static(content.clone()));
            }
        }

        tracker.mark_products_used(items.iter().filter_map(ResolvedItem::product_id));

        Ok(ResolvedProducts {
            total_slots,
            manual_product_ids,
            static_content,
            dynamic_count: total_slots.saturating_sub(items.len()),
            items,
        })
    }

    /// Batch-load pinned products, dropping missing, inactive and restricted ones.
    async fn load_manual_products(
        &self,
        section_type: &str,
        manual_product_ids: &BTreeMap<usize, DbId>,
    ) -> CoreResult<HashMap<DbId, Product>> {
        if manual_product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: IndexSet<DbId> = manual_product_ids.values().copied().collect();
        let ids: Vec<DbId> = ids.into_iter().collect();
        let restrictions = self.restrictions.snapshot().await?;

        Ok(self
            .lookup
            .find_products(&ids)
            .await?
            .into_iter()
            .filter(|p| p.is_active && content_allowed(&restrictions, section_type, &p.category_ids))
            .map(|p| (p.id, p))
            .collect())
    }
}

/// Split the slots below `total_slots` into pinned ids and inline content,
/// keyed by slot index.
///
/// An id pinned at more than one index keeps only its lowest index; the later
/// slots are left to dynamic content.
fn partition_slots(
    section: &SectionInstance,
    total_slots: usize,
    pinned_id: fn(&Slot) -> Option<DbId>,
) -> (BTreeMap<usize, DbId>, BTreeMap<usize, JsonMap>) {
    let mut slots: Vec<&Slot> = section
        .slots
        .iter()
        .filter(|s| s.index < total_slots)
        .collect();
    slots.sort_by_key(|s| s.index);

    let mut pinned = BTreeMap::new();
    let mut inline = BTreeMap::new();
    let mut seen = HashSet::new();
    for slot in slots {
        if let Some(id) = pinned_id(slot) {
            if seen.insert(id) {
                pinned.insert(slot.index, id);
            } else {
                tracing::debug!(
                    section_id = %section.id,
                    slot = slot.index,
                    pinned_id = id,
                    "Ignoring repeated pin",
                );
            }
        } else if let Some(content) = slot.static_content() {
            inline.insert(slot.index, content.clone());
        }
    }
    (pinned, inline)
}

/// The type's default config with the instance's stored keys laid over it.
fn merged_config(def: &SectionDefinition, section: &SectionInstance) -> JsonMap {
    let mut config = def.default_config();
    for (key, value) in &section.config {
        config.insert(key.clone(), value.clone());
    }
    config
}

/// The instance's data source, or the type default when none is stored or
/// the stored action is not one the type supports.
fn effective_data_source(def: &SectionDefinition, section: &SectionInstance) -> DataSource {
    match &section.data_source {
        Some(source) if def.supports_action(&source.action) => source.clone(),
        Some(source) => {
            tracing::warn!(
                section_id = %section.id,
                section_type = %def.section_type,
                action = %source.action,
                "Unsupported data source action, using type default",
            );
            def.default_data_source()
        }
        None => def.default_data_source(),
    }
}

/// Slot total: the type's count knob when set, else the stored slot count,
/// else the definition's `slot_count`; clamped to `max_slots`.
fn total_slots(
    def: &SectionDefinition,
    section: &SectionInstance,
    config: &JsonMap,
    count_field: Option<&'static str>,
) -> usize {
    let configured = count_field
        .and_then(|field| config.get(field))
        .and_then(count_value);

    let total = match configured {
        Some(count) => count,
        None if !section.slots.is_empty() => section.slots.len(),
        None => def.slot_count,
    };
    def.clamp_slot_total(total)
}

fn count_value(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
