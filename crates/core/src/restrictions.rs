//! Per-section-type category allow-lists.
//!
//! Restriction is opt-in: a type with no stored rows accepts every category.
//! The grouped mapping is cached and invalidated on every write.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::DbId;

/// Section type → allowed category ids. Types without an entry are unrestricted.
pub type RestrictionMap = HashMap<String, HashSet<DbId>>;

/// Persistence for `(section_type, category_id)` rows.
#[async_trait]
pub trait RestrictionStore: Send + Sync {
    /// Every stored row.
    async fn load_all(&self) -> CoreResult<Vec<(String, DbId)>>;

    /// Atomically replace all rows for `section_type` with `category_ids`.
    async fn replace(&self, section_type: &str, category_ids: &[DbId]) -> CoreResult<()>;
}

/// Group raw rows by section type.
pub fn group_rows<I>(rows: I) -> RestrictionMap
where
    I: IntoIterator<Item = (String, DbId)>,
{
    let mut map = RestrictionMap::new();
    for (section_type, category_id) in rows {
        map.entry(section_type).or_default().insert(category_id);
    }
    map
}

/// `true` when `section_type` is unrestricted in `map` or at least one of
/// `content_category_ids` is on its allow-list.
///
/// Content with no categories fails any active restriction.
pub fn content_allowed(map: &RestrictionMap, section_type: &str, content_category_ids: &[DbId]) -> bool {
    match map.get(section_type) {
        Some(allowed) if !allowed.is_empty() => {
            content_category_ids.iter().any(|id| allowed.contains(id))
        }
        _ => true,
    }
}

struct CachedRestrictions {
    loaded_at: Instant,
    map: Arc<RestrictionMap>,
}

/// Cached view over a [`RestrictionStore`].
pub struct CategoryRestrictionIndex {
    store: Arc<dyn RestrictionStore>,
    ttl: Duration,
    cache: RwLock<Option<CachedRestrictions>>,
}

impl CategoryRestrictionIndex {
    pub fn new(store: Arc<dyn RestrictionStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// The full grouped mapping, loading it from the store when the cache is
    /// empty or stale.
    pub async fn snapshot(&self) -> CoreResult<Arc<RestrictionMap>> {
        if let Some(map) = self.fresh_cached(&*self.cache.read().await) {
            return Ok(map);
        }

        let mut guard = self.cache.write().await;
        // Another task may have reloaded while we waited for the write lock.
        if let Some(map) = self.fresh_cached(&guard) {
            return Ok(map);
        }

        let map = Arc::new(group_rows(self.store.load_all().await?));
        tracing::debug!(
            restricted_types = map.len(),
            "Loaded section category restrictions",
        );
        *guard = Some(CachedRestrictions {
            loaded_at: Instant::now(),
            map: Arc::clone(&map),
        });
        Ok(map)
    }

    fn fresh_cached(&self, cached: &Option<CachedRestrictions>) -> Option<Arc<RestrictionMap>> {
        match cached {
            Some(entry) if entry.loaded_at.elapsed() < self.ttl => Some(Arc::clone(&entry.map)),
            _ => None,
        }
    }

    /// Drop the cached mapping so the next read reloads from the store.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Allowed category ids for `section_type`, or `None` when unrestricted.
    pub async fn allowed_category_ids(&self, section_type: &str) -> CoreResult<Option<HashSet<DbId>>> {
        let map = self.snapshot().await?;
        Ok(map
            .get(section_type)
            .filter(|ids| !ids.is_empty())
            .cloned())
    }

    pub async fn is_category_allowed(&self, section_type: &str, category_id: DbId) -> CoreResult<bool> {
        let map = self.snapshot().await?;
        Ok(content_allowed(&map, section_type, &[category_id]))
    }

    /// Overlap test: content needs only one allowed category.
    pub async fn is_content_allowed_by_categories(
        &self,
        section_type: &str,
        content_category_ids: &[DbId],
    ) -> CoreResult<bool> {
        let map = self.snapshot().await?;
        Ok(content_allowed(&map, section_type, content_category_ids))
    }

    /// Replace the allow-list for `section_type`. An empty list removes the
    /// restriction entirely.
    pub async fn set_allowed_categories(&self, section_type: &str, category_ids: &[DbId]) -> CoreResult<()> {
        let mut ids: Vec<DbId> = category_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        self.store.replace(section_type, &ids).await?;
        self.invalidate().await;

        tracing::info!(
            section_type,
            category_count = ids.len(),
            "Section category restrictions replaced",
        );
        Ok(())
    }

    /// A copy of the whole mapping, for the catalog serializer.
    pub async fn all_restrictions(&self) -> CoreResult<RestrictionMap> {
        Ok(self.snapshot().await?.as_ref().clone())
    }
}
