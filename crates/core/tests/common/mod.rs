#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use frontpage_core::content::{ContentFetchAction, ContentItem, FetchQuery, Paginated};
use frontpage_core::memory::MemoryRestrictionStore;
use frontpage_core::types::{DbId, JsonMap};
use frontpage_core::{CategoryRestrictionIndex, CoreResult};

pub fn post(id: DbId, day: u32, category: (DbId, &str), tags: &[&str]) -> ContentItem {
    ContentItem {
        id,
        title: format!("Post {id}"),
        slug: format!("post-{id}"),
        excerpt: Some(format!("Excerpt {id}")),
        image: None,
        url: format!("/posts/post-{id}"),
        author: Some("Staff".into()),
        published_at: Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).single(),
        category_ids: vec![category.0],
        category_slugs: vec![category.1.to_string()],
        tags: tags.iter().map(|t| t.to_string()).collect(),
        view_count: u64::from(day) * 10,
    }
}

pub fn map(value: serde_json::Value) -> JsonMap {
    value.as_object().cloned().unwrap_or_default()
}

pub fn restriction_index(rows: &[(&str, DbId)]) -> (Arc<MemoryRestrictionStore>, Arc<CategoryRestrictionIndex>) {
    let store = Arc::new(MemoryRestrictionStore::with_rows(
        rows.iter().map(|(t, id)| (t.to_string(), *id)),
    ));
    let index = Arc::new(CategoryRestrictionIndex::new(
        store.clone(),
        Duration::from_secs(3600),
    ));
    (store, index)
}

/// Fetch action that honours `exclude_ids` over a fixed list and records
/// every query it receives.
pub struct RecordingAction {
    name: &'static str,
    items: Vec<ContentItem>,
    calls: Mutex<Vec<FetchQuery>>,
}

impl RecordingAction {
    pub fn new(name: &'static str, items: Vec<ContentItem>) -> Arc<Self> {
        Arc::new(Self {
            name,
            items,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<FetchQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetchAction for RecordingAction {
    fn name(&self) -> &str {
        self.name
    }

    async fn execute(&self, query: &FetchQuery) -> CoreResult<Paginated<ContentItem>> {
        self.calls.lock().unwrap().push(query.clone());
        let items: Vec<ContentItem> = self
            .items
            .iter()
            .filter(|p| !query.exclude_ids.contains(&p.id))
            .take(query.per_page)
            .cloned()
            .collect();
        Ok(Paginated {
            total: items.len(),
            items,
            page: query.page,
            per_page: query.per_page,
        })
    }
}
