//! Helper functions for templates and the content manifest

mod date;
mod url;

pub use date::*;
pub use url::*;
