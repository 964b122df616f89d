//! Core data model: categories, items, and the deduplicated item set.

mod category;
mod item;
mod item_set;

pub use category::Category;
pub use item::{DigestItem, Fingerprint, ItemError};
pub use item_set::{ItemSet, ItemSetBuilder};

pub(crate) use item::{collapse_whitespace, truncate_chars};
