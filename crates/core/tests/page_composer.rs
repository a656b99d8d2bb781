//! Whole-page renders through `PageComposer` with in-memory collaborators.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use common::{map, post, restriction_index};
use frontpage_core::content::ContentItem;
use frontpage_core::layout::default_configuration;
use frontpage_core::memory::{MemoryContentSource, MemoryLayoutPersistence};
use frontpage_core::sections::builtin::{CUSTOM_HTML, HERO, RECIPE, SPREAD};
use frontpage_core::sections::{DataSource, Slot};
use frontpage_core::{
    ComposerConfig, LayoutStore, PageComposer, ResolvedSectionData, SectionPatch,
    SectionTypeRegistry,
};

fn library() -> Vec<ContentItem> {
    vec![
        post(1, 1, (10, "features"), &["longread"]),
        post(2, 2, (10, "features"), &["longread"]),
        post(3, 3, (20, "recipes"), &["vegan"]),
        post(4, 4, (20, "recipes"), &["vegan", "quick"]),
        post(5, 5, (30, "reviews"), &[]),
        post(6, 6, (40, "video"), &[]),
        post(7, 7, (20, "recipes"), &["quick"]),
        post(8, 8, (10, "features"), &[]),
    ]
}

fn composer(rows: &[(&str, i64)]) -> PageComposer {
    let (_, restrictions) = restriction_index(rows);
    let source = MemoryContentSource::new(library(), vec![]);
    let actions = source.fetch_actions(restrictions.clone());
    let layouts = Arc::new(LayoutStore::new(
        Arc::new(MemoryLayoutPersistence::new()),
        Arc::new(SectionTypeRegistry::with_builtin_types()),
    ));
    PageComposer::new(
        layouts,
        restrictions,
        Arc::new(source),
        actions,
        ComposerConfig::default(),
    )
}

fn placed_posts(sections: &[frontpage_core::ComposedSection]) -> Vec<i64> {
    sections
        .iter()
        .flat_map(|s| s.data.items())
        .filter_map(|item| item.post_id())
        .collect()
}

#[tokio::test]
async fn default_homepage_renders_enabled_sections_without_duplicates() {
    let composer = composer(&[]);
    let page = composer.compose_homepage().await.unwrap();

    let expected = default_configuration()
        .sections
        .iter()
        .filter(|s| s.enabled)
        .count();
    assert_eq!(page.len(), expected);
    assert!(page.iter().all(|s| s.section_type != CUSTOM_HTML));

    let orders: Vec<usize> = page.iter().map(|s| s.order).collect();
    let mut sorted = orders.clone();
    sorted.sort_unstable();
    assert_eq!(orders, sorted);

    let placed = placed_posts(&page);
    let unique: HashSet<i64> = placed.iter().copied().collect();
    assert_eq!(placed.len(), unique.len(), "a post was placed twice: {placed:?}");
    assert!(!placed.is_empty());
}

#[tokio::test]
async fn hero_section_serializes_deferred_fetch() {
    let composer = composer(&[]);
    let page = composer.compose_homepage().await.unwrap();
    let hero = page.iter().find(|s| s.section_type == HERO).unwrap();

    let value = serde_json::to_value(hero).unwrap();
    assert_eq!(value["type"], HERO);
    assert_eq!(value["data"]["action"], "recent");
    assert_eq!(value["data"]["alignment"], "center");
}

#[tokio::test]
async fn category_sections_only_show_their_category() {
    let composer = composer(&[]);
    let page = composer.compose_homepage().await.unwrap();
    let recipes = page.iter().find(|s| s.section_type == RECIPE).unwrap();

    // Posts 7 and 4 were already placed by latest-updates.
    let ids: Vec<i64> = recipes.data.items().iter().filter_map(|i| i.post_id()).collect();
    assert_eq!(ids, vec![3]);

    let spread = page.iter().find(|s| s.section_type == SPREAD).unwrap();
    let ids: Vec<i64> = spread.data.items().iter().filter_map(|i| i.post_id()).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn restriction_changes_apply_on_next_render() {
    let composer = composer(&[]);
    let key = "landing";

    let mut config = composer.layouts().get_configuration(key).await.unwrap();
    config.sections.retain(|s| s.section_type == SPREAD);
    config.sections[0].data_source = Some(DataSource::new("recent"));
    composer.layouts().save_configuration(key, config, None).await.unwrap();

    let before = composer.compose(key).await.unwrap();
    assert_eq!(placed_posts(&before), vec![8, 7, 6, 5]);

    composer
        .restrictions()
        .set_allowed_categories(SPREAD, &[10])
        .await
        .unwrap();
    let after = composer.compose(key).await.unwrap();
    assert_eq!(placed_posts(&after), vec![8, 2, 1]);
}

#[tokio::test]
async fn toggled_off_sections_leave_content_for_later_ones() {
    let composer = composer(&[]);
    let key = "homepage";
    let layouts = composer.layouts();

    let mut config = layouts.get_configuration(key).await.unwrap();
    config.sections.retain(|s| s.section_type == SPREAD);
    let spread_id = config.sections[0].id;
    config.sections[0].data_source = Some(DataSource::new("recent"));
    layouts.save_configuration(key, config, None).await.unwrap();

    let second = layouts
        .add_section(key, SPREAD, None, &map(json!({"count": 2})), None)
        .await
        .unwrap();
    let patch = SectionPatch {
        data_source: Some(DataSource::new("recent")),
        ..SectionPatch::default()
    };
    layouts.update_section(key, second.id, &patch, None).await.unwrap();

    let both = composer.compose(key).await.unwrap();
    assert_eq!(placed_posts(&both), vec![8, 7, 6, 5, 4, 3]);

    layouts.toggle_section(key, spread_id, false, None).await.unwrap();
    let only_second = composer.compose(key).await.unwrap();
    assert_eq!(only_second.len(), 1);
    assert_eq!(placed_posts(&only_second), vec![8, 7]);
}

#[tokio::test]
async fn pinned_posts_survive_and_are_not_refetched() {
    let composer = composer(&[]);
    let mut config = default_configuration();
    config.sections.retain(|s| s.section_type == SPREAD);
    let section = &mut config.sections[0];
    section.data_source = Some(DataSource::new("recent"));
    section.config.insert("count".into(), json!(3));
    section.slots = vec![Slot::manual_post(1, 8)];

    let page = composer.compose_sections(&config.sections).await.unwrap();
    assert_eq!(placed_posts(&page), vec![7, 8, 6]);
}

#[tokio::test]
async fn unknown_types_render_as_empty_objects() {
    let composer = composer(&[]);
    let mut config = default_configuration();
    config.sections.truncate(1);
    config.sections[0].section_type = "retired-type".into();

    let page = composer.compose_sections(&config.sections).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].data, ResolvedSectionData::Empty);
    assert_eq!(serde_json::to_value(&page[0]).unwrap()["data"], json!({}));
}

#[tokio::test]
async fn catalog_reports_allowed_categories() {
    let composer = composer(&[(RECIPE, 20), (RECIPE, 5)]);
    let catalog = composer.catalog().await.unwrap();
    assert_eq!(catalog.len(), 12);

    let recipe = catalog.iter().find(|t| t.section_type == RECIPE).unwrap();
    assert_eq!(recipe.allowed_categories, vec![5, 20]);
    let hero = catalog.iter().find(|t| t.section_type == HERO).unwrap();
    assert!(hero.allowed_categories.is_empty());

    let value = serde_json::to_value(recipe).unwrap();
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
        assert!(value.get(key).is_some(), "catalog entry is missing {key}");
    }
}

#[tokio::test]
async fn empty_page_composes_to_nothing() {
    let composer = composer(&[]);
    let page = composer.compose_sections(&[]).await.unwrap();
    assert!(page.is_empty());
}
