//! Content API access
//!
//! The client, its error taxonomy, and the strictly typed wire shapes.

mod client;
mod error;
mod types;

pub use client::ContentApi;
pub use error::{ApiError, Result};
pub use types::{ApiInfo, ApiRef, Banner, ContentSection, Document, DocumentData, SearchResponse};
