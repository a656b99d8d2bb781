//! Row structs and write DTOs.
//!
//! Each submodule contains a `FromRow` entity matching the table and the
//! input struct its repository writes from.

pub mod page_layout;
pub mod section_restriction;
