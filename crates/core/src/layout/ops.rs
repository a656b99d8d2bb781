//! Pure list operations over a page's sections.
//!
//! Every mutating operation leaves `order` contiguous from zero and equal to
//! each section's position in the list.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::registry::SectionTypeRegistry;
use crate::sections::{DataSource, SectionInstance, Slot};
use crate::types::JsonMap;

/// Partial update applied by [`update_section`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    /// Keys merged over the existing config; other keys are untouched.
    #[serde(default)]
    pub config: Option<JsonMap>,
    #[serde(default)]
    pub slots: Option<Vec<Slot>>,
    #[serde(default)]
    pub data_source: Option<DataSource>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Build a new section of `section_type` from registry defaults with
/// `overrides` merged over the default config.
pub fn create_section(
    registry: &SectionTypeRegistry,
    section_type: &str,
    order: usize,
    overrides: &JsonMap,
) -> CoreResult<SectionInstance> {
    let def = registry.require(section_type)?;

    let mut config = def.default_config();
    for (key, value) in overrides {
        config.insert(key.clone(), value.clone());
    }

    Ok(SectionInstance {
        id: Uuid::new_v4(),
        section_type: def.section_type.clone(),
        order,
        enabled: true,
        config,
        data_source: Some(def.default_data_source()),
        slots: def.default_slots(),
    })
}

/// Sort by `order` (stable) without renumbering.
pub fn sort_by_order(sections: &mut [SectionInstance]) {
    sections.sort_by_key(|s| s.order);
}

/// Set each section's `order` to its index.
pub fn renumber(sections: &mut [SectionInstance]) {
    for (index, section) in sections.iter_mut().enumerate() {
        section.order = index;
    }
}

/// Insert a new section at `position`, shifting later sections down, or
/// append when `position` is absent or past the end.
pub fn add_section(
    registry: &SectionTypeRegistry,
    sections: &mut Vec<SectionInstance>,
    section_type: &str,
    position: Option<usize>,
    overrides: &JsonMap,
) -> CoreResult<SectionInstance> {
    sort_by_order(sections);

    let index = match position {
        Some(p) if p <= sections.len() => p,
        _ => sections.len(),
    };

    let section = create_section(registry, section_type, index, overrides)?;
    sections.insert(index, section.clone());
    renumber(sections);
    Ok(section)
}

/// Remove the section with `id` and renumber the rest.
///
/// Returns `false` when no section matched; the list is still renumbered.
pub fn remove_section(sections: &mut Vec<SectionInstance>, id: Uuid) -> bool {
    let before = sections.len();
    sort_by_order(sections);
    sections.retain(|s| s.id != id);
    renumber(sections);
    sections.len() != before
}

/// Rebuild the list to follow `new_order`.
///
/// Ids not present in `sections` are skipped, repeated ids are taken once,
/// and sections missing from `new_order` are dropped.
pub fn reorder_sections(sections: &mut Vec<SectionInstance>, new_order: &[Uuid]) {
    let mut remaining = std::mem::take(sections);
    for id in new_order {
        if let Some(pos) = remaining.iter().position(|s| s.id == *id) {
            sections.push(remaining.swap_remove(pos));
        }
    }
    renumber(sections);
}

/// Apply `patch` to the section with `id`. Returns `false` when not found.
pub fn update_section(sections: &mut [SectionInstance], id: Uuid, patch: &SectionPatch) -> bool {
    let Some(section) = sections.iter_mut().find(|s| s.id == id) else {
        return false;
    };

    if let Some(config) = &patch.config {
        for (key, value) in config {
            section.config.insert(key.clone(), value.clone());
        }
    }
    if let Some(slots) = &patch.slots {
        section.slots = slots.clone();
    }
    if let Some(data_source) = &patch.data_source {
        section.data_source = Some(data_source.clone());
    }
    if let Some(enabled) = patch.enabled {
        section.enabled = enabled;
    }
    true
}

/// Enable or disable the section with `id`. Returns `false` when not found.
pub fn toggle_section(sections: &mut [SectionInstance], id: Uuid, enabled: bool) -> bool {
    update_section(
        sections,
        id,
        &SectionPatch {
            enabled: Some(enabled),
            ..SectionPatch::default()
        },
    )
}

/// Insert a copy of the section with `id` (fresh id) right after it.
pub fn duplicate_section(sections: &mut Vec<SectionInstance>, id: Uuid) -> Option<SectionInstance> {
    sort_by_order(sections);
    let pos = sections.iter().position(|s| s.id == id)?;

    let mut copy = sections[pos].clone();
    copy.id = Uuid::new_v4();
    sections.insert(pos + 1, copy);
    renumber(sections);
    Some(sections[pos + 1].clone())
}
