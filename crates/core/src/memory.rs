//! In-process implementations of the collaborator interfaces.
//!
//! Used by tests and by local previews that run without a database. Fetch
//! actions here honour `exclude_ids` and category restrictions the way the
//! production query layer does.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::content::{
    ContentFetchAction, ContentItem, ContentLookup, FetchActionRegistry, FetchQuery, Paginated,
    Product,
};
use crate::error::CoreResult;
use crate::layout::LayoutPersistence;
use crate::restrictions::{content_allowed, CategoryRestrictionIndex, RestrictionStore};
use crate::sections::definition::{ACTION_BY_CATEGORY, ACTION_BY_TAG, ACTION_RECENT, ACTION_TRENDING};
use crate::types::DbId;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Layout persistence
// ---------------------------------------------------------------------------

/// Key-value layout storage held in a map.
#[derive(Debug, Default)]
pub struct MemoryLayoutPersistence {
    entries: Mutex<HashMap<String, (Value, String)>>,
}

impl MemoryLayoutPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings group the key was last written under.
    pub fn group_of(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).map(|(_, group)| group.clone())
    }
}

#[async_trait]
impl LayoutPersistence for MemoryLayoutPersistence {
    async fn get(&self, key: &str) -> CoreResult<Option<Value>> {
        Ok(lock(&self.entries).get(key).map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: Value, group: &str) -> CoreResult<()> {
        lock(&self.entries).insert(key.to_string(), (value, group.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Restriction rows
// ---------------------------------------------------------------------------

/// `(section_type, category_id)` rows in a vector, counting full loads.
#[derive(Debug, Default)]
pub struct MemoryRestrictionStore {
    rows: Mutex<Vec<(String, DbId)>>,
    loads: AtomicUsize,
}

impl MemoryRestrictionStore {
    pub fn with_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, DbId)>,
    {
        Self {
            rows: Mutex::new(rows.into_iter().collect()),
            loads: AtomicUsize::new(0),
        }
    }

    /// How many times [`RestrictionStore::load_all`] has been called.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Stored category ids for `section_type`, sorted.
    pub fn rows_for(&self, section_type: &str) -> Vec<DbId> {
        let mut ids: Vec<DbId> = lock(&self.rows)
            .iter()
            .filter(|(t, _)| t == section_type)
            .map(|(_, id)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl RestrictionStore for MemoryRestrictionStore {
    async fn load_all(&self) -> CoreResult<Vec<(String, DbId)>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(lock(&self.rows).clone())
    }

    async fn replace(&self, section_type: &str, category_ids: &[DbId]) -> CoreResult<()> {
        let mut rows = lock(&self.rows);
        rows.retain(|(t, _)| t != section_type);
        rows.extend(category_ids.iter().map(|id| (section_type.to_string(), *id)));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// A fixed set of posts and products.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentSource {
    posts: Arc<Vec<ContentItem>>,
    products: Arc<Vec<Product>>,
}

impl MemoryContentSource {
    pub fn new(posts: Vec<ContentItem>, products: Vec<Product>) -> Self {
        Self {
            posts: Arc::new(posts),
            products: Arc::new(products),
        }
    }

    /// The four standard fetch actions over this source's posts.
    pub fn fetch_actions(&self, restrictions: Arc<CategoryRestrictionIndex>) -> FetchActionRegistry {
        let mut registry = FetchActionRegistry::new();
        for kind in [
            MemoryActionKind::Recent,
            MemoryActionKind::Trending,
            MemoryActionKind::ByTag,
            MemoryActionKind::ByCategory,
        ] {
            registry.register(Arc::new(MemoryFetchAction {
                kind,
                posts: Arc::clone(&self.posts),
                restrictions: Arc::clone(&restrictions),
            }));
        }
        registry
    }
}

#[async_trait]
impl ContentLookup for MemoryContentSource {
    async fn find_posts(&self, ids: &[DbId]) -> CoreResult<Vec<ContentItem>> {
        Ok(self
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn find_products(&self, ids: &[DbId]) -> CoreResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryActionKind {
    Recent,
    Trending,
    ByTag,
    ByCategory,
}

struct MemoryFetchAction {
    kind: MemoryActionKind,
    posts: Arc<Vec<ContentItem>>,
    restrictions: Arc<CategoryRestrictionIndex>,
}

/// String entries of the array param `key`; `None` when the key is absent.
fn string_list(query: &FetchQuery, key: &str) -> Option<Vec<String>> {
    let items = query.params.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn any_match(wanted: Option<&Vec<String>>, have: &[String]) -> bool {
    match wanted {
        Some(wanted) if !wanted.is_empty() => have.iter().any(|h| wanted.contains(h)),
        _ => true,
    }
}

#[async_trait]
impl ContentFetchAction for MemoryFetchAction {
    fn name(&self) -> &str {
        match self.kind {
            MemoryActionKind::Recent => ACTION_RECENT,
            MemoryActionKind::Trending => ACTION_TRENDING,
            MemoryActionKind::ByTag => ACTION_BY_TAG,
            MemoryActionKind::ByCategory => ACTION_BY_CATEGORY,
        }
    }

    async fn execute(&self, query: &FetchQuery) -> CoreResult<Paginated<ContentItem>> {
        let restrictions = self.restrictions.snapshot().await?;
        let tags = string_list(query, "tags");
        let categories = string_list(query, "categories");

        let mut matches: Vec<&ContentItem> = self
            .posts
            .iter()
            .filter(|p| !query.exclude_ids.contains(&p.id))
            .filter(|p| content_allowed(&restrictions, &query.section_type, &p.category_ids))
            .filter(|p| match self.kind {
                MemoryActionKind::ByTag => any_match(tags.as_ref(), &p.tags),
                MemoryActionKind::ByCategory => any_match(categories.as_ref(), &p.category_slugs),
                _ => true,
            })
            .collect();

        match self.kind {
            MemoryActionKind::Trending => {
                matches.sort_by(|a, b| b.view_count.cmp(&a.view_count).then(a.id.cmp(&b.id)))
            }
            _ => matches.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(a.id.cmp(&b.id))),
        }

        let total = matches.len();
        let skip = (query.page.max(1) as usize - 1) * query.per_page;
        Ok(Paginated {
            items: matches
                .into_iter()
                .skip(skip)
                .take(query.per_page)
                .cloned()
                .collect(),
            total,
            page: query.page,
            per_page: query.per_page,
        })
    }
}
