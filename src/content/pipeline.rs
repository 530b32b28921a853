//! Markdown transform pipeline
//!
//! Plugins run once per document, in configured order, after the body has
//! been parsed into a [`Node`] tree. They read the tree and write into the
//! document's [`DocumentData`]; nothing is shared between documents.

use thiserror::Error;

use super::frontmatter::Frontmatter;
use super::markdown::{self, Node, NodeKind};
use super::reading_time::{reading_time, DEFAULT_WORDS_PER_MINUTE};
use crate::config::{ConfigError, MarkdownConfig};

/// Front-matter key written by [`ReadingTimePlugin`]
pub const MINUTES_READ_KEY: &str = "minutesRead";

/// Errors raised while transforming a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("malformed document tree: {depth} unclosed node(s)")]
    Unbalanced { depth: usize },

    #[error("expected a document root, found {0:?}")]
    NotRoot(NodeKind),

    #[error("plugin `{plugin}` failed: {message}")]
    Plugin { plugin: String, message: String },
}

/// Per-document state handed to plugins
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentData {
    pub frontmatter: Frontmatter,
}

impl DocumentData {
    pub fn new(frontmatter: Frontmatter) -> Self {
        Self { frontmatter }
    }

    /// The reading-time label, once the plugin has run
    pub fn minutes_read(&self) -> Option<&str> {
        self.frontmatter
            .get(MINUTES_READ_KEY)
            .and_then(|v| v.as_str())
    }
}

/// A transform step applied to every markdown document
pub trait MarkdownPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn transform(&self, tree: &Node, data: &mut DocumentData) -> Result<(), TransformError>;
}

/// Writes an estimated reading time to `minutesRead`
#[derive(Debug, Clone)]
pub struct ReadingTimePlugin {
    words_per_minute: u32,
}

impl ReadingTimePlugin {
    pub const NAME: &'static str = "reading-time";

    pub fn new(words_per_minute: u32) -> Self {
        Self { words_per_minute }
    }
}

impl Default for ReadingTimePlugin {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS_PER_MINUTE)
    }
}

impl MarkdownPlugin for ReadingTimePlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn transform(&self, tree: &Node, data: &mut DocumentData) -> Result<(), TransformError> {
        if tree.kind != NodeKind::Root {
            return Err(TransformError::NotRoot(tree.kind.clone()));
        }

        let estimate = reading_time(&tree.to_plain_text(), self.words_per_minute);
        tracing::trace!(
            "Reading time: {} words -> {}",
            estimate.words,
            estimate.text
        );
        data.frontmatter.insert(MINUTES_READ_KEY, estimate.text);
        Ok(())
    }
}

/// Ordered list of plugins
#[derive(Default)]
pub struct MarkdownPipeline {
    plugins: Vec<Box<dyn MarkdownPlugin>>,
}

impl MarkdownPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the pipeline named in configuration
    pub fn from_config(config: &MarkdownConfig) -> Result<Self, ConfigError> {
        let mut pipeline = Self::new();
        for name in &config.plugins {
            match name.as_str() {
                ReadingTimePlugin::NAME => {
                    pipeline.add(ReadingTimePlugin::new(config.words_per_minute));
                }
                other => return Err(ConfigError::UnknownPlugin(other.to_string())),
            }
        }
        Ok(pipeline)
    }

    pub fn add<P: MarkdownPlugin + 'static>(&mut self, plugin: P) -> &mut Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Run every plugin over an already-parsed tree
    pub fn run(&self, tree: &Node, data: &mut DocumentData) -> Result<(), TransformError> {
        for plugin in &self.plugins {
            tracing::trace!("Running markdown plugin {}", plugin.name());
            plugin.transform(tree, data)?;
        }
        Ok(())
    }

    /// Parse a document body and run the plugins over it
    pub fn process(
        &self,
        body: &str,
        mdx: bool,
        data: &mut DocumentData,
    ) -> Result<Node, TransformError> {
        let tree = if mdx {
            markdown::parse_mdx(body)?
        } else {
            markdown::parse(body)?
        };
        self.run(&tree, data)?;
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_time_written_to_frontmatter() {
        let pipeline = MarkdownPipeline::from_config(&MarkdownConfig::default()).unwrap();
        let mut data = DocumentData::default();
        let body = "word ".repeat(450);

        pipeline.process(&body, false, &mut data).unwrap();
        assert_eq!(data.minutes_read(), Some("3 min read"));
    }

    #[test]
    fn test_annotator_is_idempotent() {
        let plugin = ReadingTimePlugin::default();
        let tree = markdown::parse("# Title\n\nSome *short* text.").unwrap();
        let mut data = DocumentData::default();
        data.frontmatter.insert("title", "Title");

        plugin.transform(&tree, &mut data).unwrap();
        let first = data.clone();
        plugin.transform(&tree, &mut data).unwrap();

        assert_eq!(data, first);
        assert_eq!(data.frontmatter.len(), 2);
        assert_eq!(data.minutes_read(), Some("1 min read"));
    }

    #[test]
    fn test_existing_value_is_overwritten() {
        let plugin = ReadingTimePlugin::new(1);
        let tree = markdown::parse("one two three").unwrap();
        let mut data = DocumentData::default();
        data.frontmatter.insert(MINUTES_READ_KEY, "stale");

        plugin.transform(&tree, &mut data).unwrap();
        assert_eq!(data.minutes_read(), Some("3 min read"));
    }

    #[test]
    fn test_non_root_tree_is_rejected() {
        let plugin = ReadingTimePlugin::default();
        let tree = Node::with_children(NodeKind::Paragraph, vec![Node::leaf(NodeKind::Text, "hi")]);
        let mut data = DocumentData::default();

        let err = plugin.transform(&tree, &mut data).unwrap_err();
        assert_eq!(err, TransformError::NotRoot(NodeKind::Paragraph));
        assert!(data.minutes_read().is_none());
    }

    #[test]
    fn test_unknown_plugin_is_a_config_error() {
        let config = MarkdownConfig {
            plugins: vec!["reading-time".to_string(), "emoji".to_string()],
            ..MarkdownConfig::default()
        };
        let err = MarkdownPipeline::from_config(&config).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownPlugin(name) if name == "emoji"));
    }

    #[test]
    fn test_empty_pipeline_leaves_data_alone() {
        let pipeline = MarkdownPipeline::new();
        let mut data = DocumentData::default();
        pipeline.process("text", false, &mut data).unwrap();
        assert!(data.frontmatter.is_empty());
        assert!(pipeline.plugin_names().is_empty());
    }
}
