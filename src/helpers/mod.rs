//! Formatting helpers shared by the generator, templates, and server
//!
//! Date formatting with locale month names, HTML/XML escaping, and
//! site-relative URL construction.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
