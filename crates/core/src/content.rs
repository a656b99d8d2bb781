//! Content view models and the collaborator interfaces the resolver uses to
//! look up and fetch them.
//!
//! Concrete fetch logic belongs to the surrounding application; this module
//! only fixes the contract. See [`crate::memory`] for in-process versions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::types::{DbId, JsonMap, Timestamp};

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// A post as handed to rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub url: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<Timestamp>,
    #[serde(default)]
    pub category_ids: Vec<DbId>,
    #[serde(default)]
    pub category_slugs: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub view_count: u64,
}

/// A catalog product as handed to rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub url: String,
    #[serde(default)]
    pub category_ids: Vec<DbId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// One page of results from a fetch action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: usize,
}

// ---------------------------------------------------------------------------
// Fetch actions
// ---------------------------------------------------------------------------

/// Arguments passed to every [`ContentFetchAction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchQuery {
    pub page: u32,
    pub per_page: usize,
    /// Ids that must not appear in the result.
    pub exclude_ids: Vec<DbId>,
    /// Requesting section type, for category restriction at the fetch layer.
    pub section_type: String,
    /// Action-specific parameters, already normalized.
    pub params: JsonMap,
}

/// A named data source for dynamic slots (`recent`, `trending`, `byTag`,
/// `byCategory`, …).
#[async_trait]
pub trait ContentFetchAction: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, query: &FetchQuery) -> CoreResult<Paginated<ContentItem>>;
}

/// Fetch actions keyed by name.
#[derive(Clone, Default)]
pub struct FetchActionRegistry {
    actions: HashMap<String, Arc<dyn ContentFetchAction>>,
}

impl FetchActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: Arc<dyn ContentFetchAction>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ContentFetchAction>> {
        self.actions.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for FetchActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Batch lookup
// ---------------------------------------------------------------------------

/// Batch lookup of pinned content by id.
///
/// Missing ids are simply absent from the result; order is not significant.
#[async_trait]
pub trait ContentLookup: Send + Sync {
    async fn find_posts(&self, ids: &[DbId]) -> CoreResult<Vec<ContentItem>>;

    async fn find_products(&self, ids: &[DbId]) -> CoreResult<Vec<Product>>;
}
