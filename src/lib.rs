//! folio: content toolchain for a personal blog and portfolio site
//!
//! This crate validates the `blog` and `books` content collections against
//! their schemas, annotates every document with an estimated reading time,
//! and writes a manifest the static-site build consumes.

pub mod commands;
pub mod config;
pub mod consts;
pub mod content;
pub mod helpers;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Configuration file looked up in the site root
pub const CONFIG_FILE: &str = "folio.yml";

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content collections directory
    pub content_dir: PathBuf,
    /// Manifest output directory
    pub output_dir: PathBuf,
    /// Static assets served from the site root
    pub public_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory, reading `folio.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let output_dir = base_dir.join(&config.output_dir);
        let public_dir = base_dir.join("public");

        Self {
            config,
            base_dir,
            content_dir,
            output_dir,
            public_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Validate every content entry
    pub fn check(&self) -> Result<content::ContentSet> {
        commands::check::run(self)
    }

    /// Write the content manifest
    pub fn build(&self) -> Result<PathBuf> {
        commands::build::run(self)
    }

    /// Remove the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
