// File-backed post storage

mod model;
mod slug;
mod store;

pub use model::{FrontMatter, Post, PostSummary};
pub use slug::{generate_slug, is_valid_slug};
pub use store::{PostStore, categories_of};
