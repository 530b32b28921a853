//! Build the content manifest consumed by the site templates

use anyhow::Result;
use indexmap::IndexMap;
use notify::Watcher;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::config::{AdapterConfig, OutputMode};
use crate::consts;
use crate::content::{ContentLoader, ContentSet, Entry, Frontmatter, LoadedEntry};
use crate::helpers::{format_date, full_url_for, iso_date};
use crate::Site;

/// Manifest file name inside the output directory
pub const MANIFEST_FILE: &str = "content.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest<'a> {
    pub site: SiteMeta<'a>,
    pub redirects: &'a IndexMap<String, String>,
    pub blog: Vec<ManifestEntry<'a>>,
    pub books: Vec<ManifestEntry<'a>>,
    pub tags: Vec<TagCount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMeta<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub social: IndexMap<&'static str, &'static str>,
    pub integrations: &'a [String],
    pub output: OutputMode,
    pub adapter: &'a AdapterConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry<'a> {
    pub id: &'a str,
    pub permalink: String,
    pub url: String,
    pub source: String,
    /// ISO calendar date
    pub date: String,
    /// "Month DD, YYYY"
    pub formatted_date: String,
    pub minutes_read: Option<&'a str>,
    pub data: &'a Entry,
    pub frontmatter: &'a Frontmatter,
}

#[derive(Debug, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

impl<'a> Manifest<'a> {
    pub fn new(site: &'a Site, set: &'a ContentSet) -> Self {
        let entry = |e: &'a LoadedEntry| {
            let permalink = e.permalink();
            ManifestEntry {
                id: &e.id,
                url: full_url_for(&site.config, &permalink),
                permalink,
                source: e
                    .source
                    .strip_prefix(&site.base_dir)
                    .unwrap_or(&e.source)
                    .to_string_lossy()
                    .replace('\\', "/"),
                date: iso_date(&e.date()),
                formatted_date: format_date(&e.date()),
                minutes_read: e.minutes_read(),
                data: &e.entry,
                frontmatter: &e.data.frontmatter,
            }
        };

        Self {
            site: SiteMeta {
                url: &site.config.site,
                title: &site.config.title,
                description: &site.config.description,
                social: consts::social_links().into_iter().collect(),
                integrations: &site.config.integrations,
                output: site.config.output,
                adapter: &site.config.adapter,
            },
            redirects: &site.config.redirects,
            blog: set.blog.iter().map(entry).collect(),
            books: set.books.iter().map(entry).collect(),
            tags: set
                .tags()
                .into_iter()
                .map(|(name, count)| TagCount { name, count })
                .collect(),
        }
    }
}

/// Load everything and write the manifest; returns its path
pub fn run(site: &Site) -> Result<PathBuf> {
    let start = std::time::Instant::now();

    let loader = ContentLoader::new(site)?;
    let set = loader.load_all()?;

    let manifest = Manifest::new(site, &set);
    let json = serde_json::to_string_pretty(&manifest)?;

    fs::create_dir_all(&site.output_dir)?;
    let path = site.output_dir.join(MANIFEST_FILE);
    fs::write(&path, json)?;

    let duration = start.elapsed();
    tracing::info!(
        "Wrote {} entries to {:?} in {:.2}s",
        set.len(),
        path,
        duration.as_secs_f64()
    );

    Ok(path)
}

/// Rebuild after a change. A changed config replaces `site` before the
/// build; if it fails to load, the previous site is kept.
pub fn rebuild(site: &mut Site, config_changed: bool) -> Result<PathBuf> {
    if config_changed {
        *site = Site::new(&site.base_dir)?;
        tracing::info!("Reloaded {:?}", site.config_path());
    }
    run(site)
}

/// Watch for file changes and rebuild
pub async fn watch(site: &Site) -> Result<()> {
    let mut site = site.clone();
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    // Watch content directory
    let mut content_dir = site.content_dir.clone();
    if content_dir.exists() {
        watcher.watch(&content_dir, notify::RecursiveMode::Recursive)?;
    }

    // Watch config file
    let config_path = site.config_path();
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    // Debounce events
    let mut last_rebuild = std::time::Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                // Our own output never triggers a rebuild
                let is_output = event
                    .paths
                    .iter()
                    .all(|p: &PathBuf| p.starts_with(&site.output_dir));
                if is_output || last_rebuild.elapsed() <= Duration::from_millis(500) {
                    continue;
                }

                tracing::info!("File changed, rebuilding...");
                let config_changed = event.paths.contains(&config_path);
                if let Err(e) = rebuild(&mut site, config_changed) {
                    tracing::error!("Build failed: {}", e);
                }

                if site.content_dir != content_dir {
                    if content_dir.exists() {
                        let _ = watcher.unwatch(&content_dir);
                    }
                    if site.content_dir.exists() {
                        watcher.watch(&site.content_dir, notify::RecursiveMode::Recursive)?;
                    }
                    tracing::info!("Now watching {:?}", site.content_dir);
                    content_dir = site.content_dir.clone();
                }
                last_rebuild = std::time::Instant::now();
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                // Continue waiting
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), Default::default());
        let books = site.content_dir.join("books");
        fs::create_dir_all(&books).unwrap();
        fs::create_dir_all(site.public_dir.join("covers")).unwrap();
        fs::write(site.public_dir.join("covers/dune.jpg"), "").unwrap();
        fs::write(
            books.join("dune.md"),
            "---\ntitle: Dune\ndescription: Sand\nauthor: Frank Herbert\nfinishedDate: 2024-03-05\nimage:\n  url: /covers/dune.jpg\n  alt: Dune\n---\nA classic.\n",
        )
        .unwrap();

        let path = run(&site).unwrap();
        assert_eq!(path, site.output_dir.join(MANIFEST_FILE));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(json["site"]["url"], "https://vguleaev.dev");
        assert_eq!(json["site"]["output"], "static");
        assert_eq!(json["site"]["adapter"]["web_analytics"]["enabled"], true);
        assert_eq!(json["site"]["social"]["github"], consts::GITHUB_LINK);
        assert_eq!(json["redirects"]["/blog"], "/");
        assert_eq!(json["blog"].as_array().unwrap().len(), 0);

        let book = &json["books"][0];
        assert_eq!(book["id"], "dune");
        assert_eq!(book["permalink"], "/books/dune/");
        assert_eq!(book["url"], "https://vguleaev.dev/books/dune/");
        assert_eq!(book["source"], "src/content/books/dune.md");
        assert_eq!(book["date"], "2024-03-05");
        assert_eq!(book["formattedDate"], "March 05, 2024");
        assert_eq!(book["minutesRead"], "1 min read");
        assert_eq!(book["data"]["finishedDate"], "2024-03-05");
        assert_eq!(book["data"]["tags"], serde_json::json!([]));
        assert_eq!(book["frontmatter"]["minutesRead"], "1 min read");
        assert_eq!(book["frontmatter"]["author"], "Frank Herbert");
    }

    #[test]
    fn test_rebuild_keeps_reloaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut site = Site::new(dir.path()).unwrap();
        let blog = site.content_dir.join("blog");
        fs::create_dir_all(&blog).unwrap();
        fs::write(blog.join("cover.png"), "").unwrap();
        let body = "word ".repeat(120);
        let post = |title: &str| {
            format!(
                "---\ntitle: {}\ndescription: Long\npubDate: 2024-03-05\nimage:\n  url: ./cover.png\n  alt: Cover\ntags: []\n---\n{}\n",
                title, body
            )
        };
        fs::write(blog.join("long.md"), post("Long")).unwrap();

        let minutes = |path: &PathBuf| {
            let json: serde_json::Value =
                serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
            json["blog"][0]["minutesRead"].as_str().unwrap().to_string()
        };

        let path = rebuild(&mut site, false).unwrap();
        assert_eq!(minutes(&path), "1 min read");

        fs::write(site.config_path(), "markdown:\n  words_per_minute: 50\n").unwrap();
        let path = rebuild(&mut site, true).unwrap();
        assert_eq!(minutes(&path), "3 min read");

        // a later content edit still uses the reloaded settings
        fs::write(blog.join("long.md"), post("Longer")).unwrap();
        let path = rebuild(&mut site, false).unwrap();
        assert_eq!(site.config.markdown.words_per_minute, 50);
        assert_eq!(minutes(&path), "3 min read");
    }

    #[test]
    fn test_rebuild_keeps_old_site_on_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut site = Site::new(dir.path()).unwrap();
        fs::write(site.config_path(), "markdown:\n  words_per_minute: 0\n").unwrap();

        assert!(rebuild(&mut site, true).is_err());
        assert_eq!(site.config.markdown.words_per_minute, 200);
    }

    #[test]
    fn test_build_fails_on_invalid_entry() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), Default::default());
        let blog = site.content_dir.join("blog");
        fs::create_dir_all(&blog).unwrap();
        fs::write(blog.join("draft.md"), "---\ntitle: Unfinished\n---\n").unwrap();

        let err = run(&site).unwrap_err();
        assert!(err.to_string().contains("pubDate"));
        assert!(!site.output_dir.join(MANIFEST_FILE).exists());
    }
}
