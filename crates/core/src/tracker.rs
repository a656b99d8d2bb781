//! Per-render record of content already placed on the page.
//!
//! A fresh tracker is created for every page render and threaded through
//! section resolution so later sections skip content shown earlier. Post and
//! product ids live in separate namespaces.

use indexmap::IndexSet;

use crate::types::DbId;

#[derive(Debug, Clone, Default)]
pub struct UsedContentTracker {
    posts: IndexSet<DbId>,
    products: IndexSet<DbId>,
}

impl UsedContentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a single post id as used.
    pub fn mark_used(&mut self, id: DbId) {
        self.posts.insert(id);
    }

    /// Mark several post ids as used.
    pub fn mark_all_used<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = DbId>,
    {
        self.posts.extend(ids);
    }

    pub fn is_used(&self, id: DbId) -> bool {
        self.posts.contains(&id)
    }

    /// Used post ids in the order they were first marked.
    pub fn used_ids(&self) -> Vec<DbId> {
        self.posts.iter().copied().collect()
    }

    /// Number of distinct used post ids.
    pub fn count(&self) -> usize {
        self.posts.len()
    }

    pub fn mark_products_used<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = DbId>,
    {
        self.products.extend(ids);
    }

    pub fn is_product_used(&self, id: DbId) -> bool {
        self.products.contains(&id)
    }

    pub fn used_product_ids(&self) -> Vec<DbId> {
        self.products.iter().copied().collect()
    }

    /// Forget everything. Only tests reuse a tracker across renders.
    pub fn clear(&mut self) {
        self.posts.clear();
        self.products.clear();
    }
}
