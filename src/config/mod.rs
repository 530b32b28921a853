//! Configuration module

mod site;
mod style;

pub use site::AdapterConfig;
pub use site::ConfigError;
pub use site::MarkdownConfig;
pub use site::OutputMode;
pub use site::SiteConfig;
pub use site::Toggle;
pub use style::expand_braces;
pub use style::StyleConfig;
