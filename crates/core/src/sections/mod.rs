//! Section types and section instances.
//!
//! - [`schema`]: config/slot field metadata and preview sketches.
//! - [`definition`]: one section type's defaults and slot rules.
//! - [`builtin`]: the shipped catalog plus extension types.
//! - [`instance`]: persisted sections and slots.

pub mod builtin;
pub mod definition;
pub mod instance;
pub mod schema;

pub use definition::{ResolutionStrategy, SectionDefinition};
pub use instance::{DataSource, SectionInstance, Slot, SlotMode};
pub use schema::{ConfigField, FieldKind, PreviewArea, PreviewLayout, PreviewSchema, SlotField};
