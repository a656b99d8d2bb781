//! Page composition: resolve every enabled section of a page in order.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::config::ComposerConfig;
use crate::content::{ContentLookup, FetchActionRegistry};
use crate::error::CoreResult;
use crate::layout::LayoutStore;
use crate::registry::{SectionTypeRegistry, SectionTypeSummary};
use crate::resolver::{ResolvedSectionData, SlotResolver};
use crate::restrictions::CategoryRestrictionIndex;
use crate::sections::SectionInstance;
use crate::tracker::UsedContentTracker;

/// One rendered section of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedSection {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub section_type: String,
    pub order: usize,
    pub data: ResolvedSectionData,
}

/// Wires the layout store, restriction index and content collaborators
/// together for page renders.
pub struct PageComposer {
    layouts: Arc<LayoutStore>,
    restrictions: Arc<CategoryRestrictionIndex>,
    lookup: Arc<dyn ContentLookup>,
    actions: FetchActionRegistry,
    config: ComposerConfig,
}

impl PageComposer {
    pub fn new(
        layouts: Arc<LayoutStore>,
        restrictions: Arc<CategoryRestrictionIndex>,
        lookup: Arc<dyn ContentLookup>,
        actions: FetchActionRegistry,
        config: ComposerConfig,
    ) -> Self {
        Self {
            layouts,
            restrictions,
            lookup,
            actions,
            config,
        }
    }

    pub fn layouts(&self) -> &LayoutStore {
        &self.layouts
    }

    pub fn restrictions(&self) -> &CategoryRestrictionIndex {
        &self.restrictions
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    fn resolver(&self) -> SlotResolver<'_> {
        SlotResolver::new(
            self.layouts.registry(),
            &self.restrictions,
            self.lookup.as_ref(),
            &self.actions,
            self.config.max_fetch_per_section,
        )
    }

    /// Compose the stored (or default) layout of `page_key`.
    pub async fn compose(&self, page_key: &str) -> CoreResult<Vec<ComposedSection>> {
        let config = self.layouts.get_configuration(page_key).await?;
        let composed = self.compose_sections(&config.sections).await?;
        tracing::debug!(
            page_key,
            version = config.version,
            sections = composed.len(),
            unresolved = composed.iter().filter(|s| s.data.is_empty()).count(),
            "Page composed",
        );
        Ok(composed)
    }

    /// Compose the configured homepage.
    pub async fn compose_homepage(&self) -> CoreResult<Vec<ComposedSection>> {
        self.compose(&self.config.homepage_key).await
    }

    /// Resolve `sections` with one fresh tracker, skipping disabled ones.
    ///
    /// Sections are taken in `order`; unsaved layouts can be previewed this way.
    pub async fn compose_sections(&self, sections: &[SectionInstance]) -> CoreResult<Vec<ComposedSection>> {
        let mut ordered: Vec<&SectionInstance> = sections.iter().filter(|s| s.enabled).collect();
        ordered.sort_by_key(|s| s.order);

        let resolver = self.resolver();
        let mut tracker = UsedContentTracker::new();
        let mut composed = Vec::with_capacity(ordered.len());
        for section in ordered {
            let data = resolver.resolve(section, &mut tracker).await?;
            composed.push(ComposedSection {
                id: section.id,
                section_type: section.section_type.clone(),
                order: section.order,
                data,
            });
        }
        Ok(composed)
    }

    /// The section type catalog with each type's allowed categories.
    pub async fn catalog(&self) -> CoreResult<Vec<SectionTypeSummary>> {
        section_catalog(self.layouts.registry(), &self.restrictions).await
    }
}

/// Serialize the registry for the builder UI, merging in the current
/// restriction mapping.
pub async fn section_catalog(
    registry: &SectionTypeRegistry,
    restrictions: &CategoryRestrictionIndex,
) -> CoreResult<Vec<SectionTypeSummary>> {
    let mapping = restrictions.all_restrictions().await?;
    Ok(registry.to_array(&mapping))
}
