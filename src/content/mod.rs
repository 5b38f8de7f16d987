//! Content module - normalized post model and rich text rendering
//!
//! API documents are normalized into these types once, at the client
//! boundary; everything downstream works with typed values.

mod post;
pub mod richtext;

pub use post::{Post, PostPage, PostSummary, Section};
