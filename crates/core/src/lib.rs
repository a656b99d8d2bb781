//! Page layout composition engine.
//!
//! Pages are ordered lists of typed sections. The [`registry`] describes each
//! section type, the [`layout`] store persists a page's sections, the
//! [`restrictions`] index limits which categories a type may show, and the
//! [`resolver`] turns stored sections into render-ready data while the
//! [`tracker`] keeps one post from appearing twice on a page.

pub mod composer;
pub mod config;
pub mod content;
pub mod error;
pub mod layout;
pub mod memory;
pub mod registry;
pub mod resolver;
pub mod restrictions;
pub mod sections;
pub mod tracker;
pub mod types;

pub use composer::{section_catalog, ComposedSection, PageComposer};
pub use config::ComposerConfig;
pub use error::{CoreError, CoreResult};
pub use layout::{LayoutPersistence, LayoutStore, PageLayoutConfiguration, SectionPatch};
pub use registry::{SectionTypeRegistry, SectionTypeSummary};
pub use resolver::{ResolvedSectionData, SlotResolver};
pub use restrictions::{CategoryRestrictionIndex, RestrictionStore};
pub use tracker::UsedContentTracker;
