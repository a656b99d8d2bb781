//! The built-in starter layout served when a page has no stored configuration.
//!
//! Section ids are fixed so the same default is produced on every call and
//! pages first saved from it keep stable ids.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::layout::PageLayoutConfiguration;
use crate::sections::builtin::{
    AD, ADD_TO_CART, CUSTOM_HTML, FEATURED_PERSON, FEATURED_VIDEO, HERO, LATEST_UPDATES,
    NEWSLETTER, RECIPE, REVIEW, SPREAD,
};
use crate::sections::definition::{ACTION_BY_CATEGORY, ACTION_RECENT, ACTION_TRENDING};
use crate::sections::{DataSource, SectionInstance};
use crate::types::JsonMap;

/// Number of sections in the starter layout.
pub const DEFAULT_SECTION_COUNT: usize = 11;

const DEFAULT_SECTION_IDS: [u128; DEFAULT_SECTION_COUNT] = [
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_0001,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_0002,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_0003,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_0004,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_0005,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_0006,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_0007,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_0008,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_0009,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_000a,
    0x3f0e_6c1a_0b6d_4c1e_9a51_0000_0000_000b,
];

fn object(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

fn by_category(slug: &str) -> DataSource {
    DataSource::with_params(ACTION_BY_CATEGORY, object(json!({ "slugs": [slug] })))
}

/// `(type, enabled, config, data source)` for each starter section, in order.
fn starter_sections() -> Vec<(&'static str, bool, Value, Option<DataSource>)> {
    vec![
        (
            HERO,
            true,
            json!({
                "alignment": "center",
                "bgColor": "black",
                "buttonText": "Read More",
                "buttonColor": "white"
            }),
            Some(DataSource::new(ACTION_RECENT)),
        ),
        (
            LATEST_UPDATES,
            true,
            json!({
                "title": "Latest Updates",
                "featuredCount": 1,
                "postsCount": 4,
                "showViewAll": true,
                "viewAllUrl": "/latest"
            }),
            Some(DataSource::new(ACTION_RECENT)),
        ),
        (
            FEATURED_PERSON,
            true,
            json!({
                "label": "In Conversation",
                "layout": "image-left",
                "bgColor": "white"
            }),
            Some(DataSource::new(ACTION_TRENDING)),
        ),
        (
            SPREAD,
            true,
            json!({
                "title": "The Spread",
                "count": 4,
                "showIntro": true,
                "introTitle": "The Spread",
                "introText": "Long reads for the weekend.",
                "dividerStyle": "line",
                "dividerColor": "#e5e5e5"
            }),
            Some(by_category("features")),
        ),
        (
            AD,
            true,
            json!({
                "placement": "billboard",
                "slotName": "homepage-billboard",
                "showLabel": true
            }),
            None,
        ),
        (
            FEATURED_VIDEO,
            true,
            json!({
                "autoplay": false,
                "showCaption": true,
                "aspectRatio": "16:9"
            }),
            Some(by_category("video")),
        ),
        (
            REVIEW,
            true,
            json!({
                "title": "Reviews",
                "count": 3,
                "showIntro": false,
                "introTitle": "",
                "introText": "",
                "dividerStyle": "dots",
                "dividerColor": "#e5e5e5",
                "showRating": true,
                "columns": "3"
            }),
            Some(by_category("reviews")),
        ),
        (
            RECIPE,
            true,
            json!({
                "title": "Recipes",
                "count": 6,
                "showIntro": true,
                "introTitle": "What to cook this week",
                "introText": "",
                "dividerStyle": "line",
                "dividerColor": "#e5e5e5",
                "showCookTime": true,
                "columns": "3"
            }),
            Some(by_category("recipes")),
        ),
        (
            ADD_TO_CART,
            true,
            json!({
                "title": "Shop the Story",
                "buttonText": "Add to Cart",
                "showPrice": true,
                "columns": "4"
            }),
            None,
        ),
        (
            NEWSLETTER,
            true,
            json!({
                "heading": "Stay in the loop",
                "subheading": "The best stories, delivered weekly.",
                "buttonText": "Subscribe",
                "placeholder": "Your email address",
                "bgColor": "#f5f5f5"
            }),
            None,
        ),
        (
            CUSTOM_HTML,
            false,
            json!({
                "html": "",
                "fullWidth": false
            }),
            None,
        ),
    ]
}

/// The fixed 11-section starter layout at version 0.
///
/// Slots are left empty; resolution falls back to each type's slot count.
/// Sections without a stored data source use their type's default.
pub fn default_configuration() -> PageLayoutConfiguration {
    let sections = starter_sections()
        .into_iter()
        .zip(DEFAULT_SECTION_IDS)
        .enumerate()
        .map(|(order, ((section_type, enabled, config, data_source), id))| SectionInstance {
            id: Uuid::from_u128(id),
            section_type: section_type.to_string(),
            order,
            enabled,
            config: object(config),
            data_source,
            slots: Vec::new(),
        })
        .collect();

    PageLayoutConfiguration {
        sections,
        version: 0,
        updated_at: None,
        updated_by: None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::registry::SectionTypeRegistry;

    #[test]
    fn eleven_sections_in_contiguous_order() {
        let config = default_configuration();
        assert_eq!(config.sections.len(), DEFAULT_SECTION_COUNT);
        let orders: Vec<usize> = config.sections.iter().map(|s| s.order).collect();
        assert_eq!(orders, (0..DEFAULT_SECTION_COUNT).collect::<Vec<_>>());
        assert_eq!(config.version, 0);
        assert!(config.updated_at.is_none());
    }

    #[test]
    fn default_is_deterministic() {
        assert_eq!(default_configuration(), default_configuration());
        let ids: HashSet<Uuid> = default_configuration().sections.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), DEFAULT_SECTION_COUNT);
    }

    #[test]
    fn every_starter_section_is_registered_and_valid() {
        let registry = SectionTypeRegistry::with_builtin_types();
        for section in default_configuration().sections {
            assert!(registry.has(&section.section_type), "{}", section.section_type);
            assert!(
                registry.validate_config(&section.section_type, &section.config),
                "{} starter config fails validation",
                section.section_type
            );
        }
    }

    #[test]
    fn starter_opens_with_hero_and_hides_custom_html() {
        let config = default_configuration();
        assert_eq!(config.sections[0].section_type, HERO);
        let html = config.sections.last().unwrap();
        assert_eq!(html.section_type, CUSTOM_HTML);
        assert!(!html.enabled);
    }
}
