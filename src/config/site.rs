//! Site configuration (folio.yml)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::StyleConfig;
use crate::consts;
use crate::content::reading_time::DEFAULT_WORDS_PER_MINUTE;
use crate::helpers::normalize_path;

/// Errors raised while loading or interpreting configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown markdown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Invalid glob pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub site: String,
    pub title: String,
    pub description: String,

    // Directory
    pub content_dir: String,
    pub output_dir: String,

    // Build
    pub integrations: Vec<String>,
    pub output: OutputMode,
    #[serde(default)]
    pub adapter: AdapterConfig,

    // Routing
    #[serde(default = "default_redirects")]
    pub redirects: IndexMap<String, String>,

    // Markdown
    #[serde(default)]
    pub markdown: MarkdownConfig,

    // Styling
    #[serde(default)]
    pub style: StyleConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn default_redirects() -> IndexMap<String, String> {
    let mut redirects = IndexMap::new();
    redirects.insert("/blog".to_string(), "/".to_string());
    redirects
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: consts::SITE_URL.to_string(),
            title: consts::SITE_TITLE.to_string(),
            description: consts::SITE_DESCRIPTION.to_string(),

            content_dir: "src/content".to_string(),
            output_dir: "dist".to_string(),

            integrations: vec![
                "mdx".to_string(),
                "sitemap".to_string(),
                "tailwind".to_string(),
            ],
            output: OutputMode::Static,
            adapter: AdapterConfig::default(),

            redirects: default_redirects(),
            markdown: MarkdownConfig::default(),
            style: StyleConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded configuration from {:?}", path.as_ref());
        Ok(config)
    }

    /// Reject values the content pipeline cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.markdown.words_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "markdown.words_per_minute must be greater than zero".to_string(),
            ));
        }
        for (from, to) in &self.redirects {
            if !from.starts_with('/') || !to.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "redirect `{}` -> `{}` must use absolute paths",
                    from, to
                )));
            }
        }
        Ok(())
    }

    /// Look up the redirect target for a request path.
    ///
    /// Trailing slashes are ignored on both sides, so `/blog/` matches a
    /// `/blog` entry.
    pub fn resolve_redirect(&self, path: &str) -> Option<&str> {
        let wanted = normalize_path(path);
        self.redirects
            .iter()
            .find(|(from, _)| normalize_path(from) == wanted)
            .map(|(_, to)| to.as_str())
    }

    /// Whether an integration is enabled by name
    pub fn has_integration(&self, name: &str) -> bool {
        self.integrations.iter().any(|i| i == name)
    }
}

/// Output mode handed to the build tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Static,
    Server,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Static => f.write_str("static"),
            OutputMode::Server => f.write_str("server"),
        }
    }
}

/// A feature switch in `{ enabled: bool }` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Toggle {
    pub enabled: bool,
}

impl Default for Toggle {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Deployment adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub name: String,
    pub web_analytics: Toggle,
    pub speed_insights: Toggle,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            name: "vercel".to_string(),
            web_analytics: Toggle::default(),
            speed_insights: Toggle::default(),
        }
    }
}

/// Markdown pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Transform plugins, applied in order to every document
    pub plugins: Vec<String>,
    pub words_per_minute: u32,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            plugins: vec!["reading-time".to_string()],
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.site, "https://vguleaev.dev");
        assert_eq!(config.output, OutputMode::Static);
        assert!(config.adapter.web_analytics.enabled);
        assert!(config.adapter.speed_insights.enabled);
        assert_eq!(config.markdown.plugins, vec!["reading-time"]);
        assert!(config.has_integration("sitemap"));
    }

    #[test]
    fn test_blog_redirects_to_root() {
        let config = SiteConfig::default();
        assert_eq!(config.resolve_redirect("/blog"), Some("/"));
        assert_eq!(config.resolve_redirect("/blog/"), Some("/"));
        assert_eq!(config.resolve_redirect("/books"), None);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
site: https://example.com
output: server
adapter:
  web_analytics:
    enabled: false
redirects:
  /old: /new
markdown:
  words_per_minute: 250
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.site, "https://example.com");
        assert_eq!(config.output, OutputMode::Server);
        assert!(!config.adapter.web_analytics.enabled);
        assert!(config.adapter.speed_insights.enabled);
        assert_eq!(config.resolve_redirect("/old"), Some("/new"));
        assert_eq!(config.resolve_redirect("/blog"), None);
        assert_eq!(config.markdown.words_per_minute, 250);
        assert_eq!(config.markdown.plugins, vec!["reading-time"]);
        assert_eq!(config.title, consts::SITE_TITLE);
    }

    #[test]
    fn test_zero_reading_speed_rejected() {
        let mut config = SiteConfig::default();
        config.markdown.words_per_minute = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_relative_redirect_rejected() {
        let mut config = SiteConfig::default();
        config.redirects.insert("blog".to_string(), "/".to_string());
        assert!(config.validate().is_err());
    }
}
