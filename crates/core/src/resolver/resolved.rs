//! Render-ready output of section resolution.
//!
//! Every variant serializes to one flat JSON object: the merged section
//! config with the resolver's own keys laid over it.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::content::{ContentItem, Product};
use crate::types::{DbId, JsonMap};

/// Resolution result for one section.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSectionData {
    /// The section's type is not registered. Serializes to `{}`.
    Empty,
    /// Types without content slots.
    ConfigOnly { config: JsonMap },
    /// Single-slot types.
    Single {
        config: JsonMap,
        content: SingleSlotContent,
    },
    /// Multi-slot post types.
    Slots { config: JsonMap, slots: ResolvedSlots },
    /// Product slot types.
    Products {
        config: JsonMap,
        products: ResolvedProducts,
    },
}

/// What a single-slot section shows, by priority manual > static > deferred.
#[derive(Debug, Clone, PartialEq)]
pub enum SingleSlotContent {
    Manual { post_id: DbId },
    Static { content: JsonMap },
    /// The caller fetches one item with this action.
    Deferred { action: String, params: JsonMap },
}

/// One placed item in a multi-slot section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedItem {
    Post(ContentItem),
    Product(Product),
    Static(JsonMap),
}

impl ResolvedItem {
    /// Post id, when this item is a post.
    pub fn post_id(&self) -> Option<DbId> {
        match self {
            Self::Post(item) => Some(item.id),
            _ => None,
        }
    }

    /// Product id, when this item is a product.
    pub fn product_id(&self) -> Option<DbId> {
        match self {
            Self::Product(product) => Some(product.id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSlots {
    pub action: String,
    pub params: JsonMap,
    pub total_slots: usize,
    /// Slot index → pinned post id, as stored.
    pub manual_post_ids: BTreeMap<usize, DbId>,
    pub static_content: BTreeMap<usize, JsonMap>,
    /// Slots left for fetched posts. The fetch itself asks for at most the
    /// per-section cap.
    pub dynamic_count: usize,
    /// Final items in slot order. May be shorter than `total_slots`.
    pub items: Vec<ResolvedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProducts {
    pub total_slots: usize,
    pub manual_product_ids: BTreeMap<usize, DbId>,
    pub static_content: BTreeMap<usize, JsonMap>,
    /// Slots left for the storefront's default product listing.
    pub dynamic_count: usize,
    pub items: Vec<ResolvedItem>,
}

impl ResolvedSectionData {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Merged config, or `None` for [`ResolvedSectionData::Empty`].
    pub fn config(&self) -> Option<&JsonMap> {
        match self {
            Self::Empty => None,
            Self::ConfigOnly { config }
            | Self::Single { config, .. }
            | Self::Slots { config, .. }
            | Self::Products { config, .. } => Some(config),
        }
    }

    /// Placed items for slot and product sections; empty otherwise.
    pub fn items(&self) -> &[ResolvedItem] {
        match self {
            Self::Slots { slots, .. } => &slots.items,
            Self::Products { products, .. } => &products.items,
            _ => &[],
        }
    }

    /// Flatten into the JSON object handed to rendering.
    pub fn to_json_map(&self) -> Result<JsonMap, serde_json::Error> {
        let (config, extra) = match self {
            Self::Empty => return Ok(JsonMap::new()),
            Self::ConfigOnly { config } => (config, JsonMap::new()),
            Self::Single { config, content } => (config, content.to_json_map()),
            Self::Slots { config, slots } => (config, object_of(slots)?),
            Self::Products { config, products } => (config, object_of(products)?),
        };

        let mut out = config.clone();
        out.extend(extra);
        Ok(out)
    }
}

impl SingleSlotContent {
    fn to_json_map(&self) -> JsonMap {
        let mut out = JsonMap::new();
        match self {
            Self::Manual { post_id } => {
                out.insert("postId".into(), Value::from(*post_id));
            }
            Self::Static { content } => {
                out.insert("staticContent".into(), Value::Object(content.clone()));
            }
            Self::Deferred { action, params } => {
                out.insert("action".into(), Value::String(action.clone()));
                out.insert("params".into(), Value::Object(params.clone()));
            }
        }
        out
    }
}

fn object_of<T: Serialize>(value: &T) -> Result<JsonMap, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Ok(JsonMap::new()),
    }
}

impl Serialize for ResolvedSectionData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_map()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> JsonMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_serializes_to_empty_object() {
        assert_eq!(serde_json::to_value(ResolvedSectionData::Empty).unwrap(), json!({}));
    }

    #[test]
    fn resolver_keys_merge_over_config() {
        let data = ResolvedSectionData::Single {
            config: map(json!({"zeta": 1, "alpha": 2})),
            content: SingleSlotContent::Manual { post_id: 9 },
        };
        let flat = data.to_json_map().unwrap();
        assert_eq!(flat.get("postId"), Some(&json!(9)));
        assert_eq!(flat.get("zeta"), Some(&json!(1)));
        assert_eq!(flat.len(), 3);
    }

    #[test]
    fn slot_maps_use_string_indices() {
        let data = ResolvedSectionData::Slots {
            config: JsonMap::new(),
            slots: ResolvedSlots {
                action: "recent".into(),
                params: JsonMap::new(),
                total_slots: 3,
                manual_post_ids: BTreeMap::from([(0, 11)]),
                static_content: BTreeMap::from([(1, map(json!({"title": "X"})))]),
                dynamic_count: 1,
                items: vec![ResolvedItem::Static(map(json!({"title": "X"})))],
            },
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["totalSlots"], 3);
        assert_eq!(value["manualPostIds"], json!({"0": 11}));
        assert_eq!(value["staticContent"]["1"]["title"], "X");
        assert_eq!(value["items"], json!([{"title": "X"}]));
    }
}
