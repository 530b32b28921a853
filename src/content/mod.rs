//! Content module - collection schemas, front-matter and the markdown pipeline

mod error;
mod frontmatter;
pub mod loader;
pub mod markdown;
pub mod pipeline;
pub mod reading_time;
pub mod schema;

pub use error::{ContentError, LoadError};
pub use frontmatter::{Frontmatter, FrontmatterError};
pub use loader::{ContentLoader, ContentSet, LoadedEntry};
pub use markdown::{Node, NodeKind};
pub use pipeline::{
    DocumentData, MarkdownPipeline, MarkdownPlugin, ReadingTimePlugin, TransformError,
    MINUTES_READ_KEY,
};
pub use reading_time::{reading_time, ReadingTime};
pub use schema::{
    BlogPost, BookReview, Collection, Entry, FieldIssue, ImageRef, ImageResource, Problem,
    ValidationError,
};
