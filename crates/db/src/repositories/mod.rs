//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod page_layout_repo;
pub mod section_restriction_repo;

pub use page_layout_repo::PageLayoutRepo;
pub use section_restriction_repo::SectionRestrictionRepo;
