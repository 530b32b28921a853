//! Content loader - loads, validates and annotates collection entries

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::{ContentError, LoadError};
use super::frontmatter::Frontmatter;
use super::pipeline::{DocumentData, MarkdownPipeline};
use super::schema::{Collection, Entry, FieldIssue, ValidationError};
use crate::config::ConfigError;
use crate::helpers::permalink;
use crate::Site;

/// A content file that passed validation and the markdown pipeline
#[derive(Debug, Clone)]
pub struct LoadedEntry {
    pub collection: Collection,
    /// Slug path relative to the collection directory, e.g. `2024/hello-world`
    pub id: String,
    pub source: PathBuf,
    pub entry: Entry,
    /// Front-matter as written plus plugin output (`minutesRead`)
    pub data: DocumentData,
    pub body: String,
}

impl LoadedEntry {
    pub fn title(&self) -> &str {
        self.entry.title()
    }

    pub fn date(&self) -> NaiveDate {
        self.entry.date()
    }

    pub fn tags(&self) -> &[String] {
        self.entry.tags()
    }

    pub fn minutes_read(&self) -> Option<&str> {
        self.data.minutes_read()
    }

    /// Site-relative URL of the rendered page
    pub fn permalink(&self) -> String {
        permalink(self.collection.name(), &self.id)
    }
}

/// All loaded collections
#[derive(Debug, Clone, Default)]
pub struct ContentSet {
    pub blog: Vec<LoadedEntry>,
    pub books: Vec<LoadedEntry>,
}

impl ContentSet {
    pub fn get(&self, collection: Collection) -> &[LoadedEntry] {
        match collection {
            Collection::Blog => &self.blog,
            Collection::Books => &self.books,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedEntry> {
        self.blog.iter().chain(self.books.iter())
    }

    pub fn len(&self) -> usize {
        self.blog.len() + self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tag usage counts across every collection, most used first
    pub fn tags(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in self.iter() {
            for tag in entry.tags() {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }
        let mut tags: Vec<_> = counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tags
    }
}

/// Loads content from the collection directories
pub struct ContentLoader<'a> {
    site: &'a Site,
    pipeline: MarkdownPipeline,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Result<Self, ConfigError> {
        let pipeline = MarkdownPipeline::from_config(&site.config.markdown)?;
        tracing::debug!("Markdown plugins: {:?}", pipeline.plugin_names());
        Ok(Self { site, pipeline })
    }

    /// Load every collection, reporting all failures together
    pub fn load_all(&self) -> Result<ContentSet, LoadError> {
        let mut set = ContentSet::default();
        let mut errors = Vec::new();

        for collection in Collection::ALL {
            match self.load_collection(collection) {
                Ok(entries) => match collection {
                    Collection::Blog => set.blog = entries,
                    Collection::Books => set.books = entries,
                },
                Err(e) => errors.extend(e.errors),
            }
        }

        if errors.is_empty() {
            tracing::info!(
                "Loaded {} blog posts and {} book reviews",
                set.blog.len(),
                set.books.len()
            );
            Ok(set)
        } else {
            Err(LoadError { errors })
        }
    }

    /// Load one collection, newest first
    pub fn load_collection(&self, collection: Collection) -> Result<Vec<LoadedEntry>, LoadError> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            tracing::debug!("No {} directory at {:?}", collection, dir);
            return Ok(Vec::new());
        }

        let mut entries: Vec<LoadedEntry> = Vec::new();
        let (files, mut errors) = content_files(&dir);
        for e in &errors {
            tracing::error!("{}", e);
        }

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        for path in files {
            match self.load_entry(collection, &path) {
                Ok(entry) => match seen.get(&entry.id) {
                    Some(first) => {
                        let e = ContentError::DuplicateId {
                            path: entry.source,
                            id: entry.id,
                            first: first.clone(),
                        };
                        tracing::error!("{}", e);
                        errors.push(e);
                    }
                    None => {
                        seen.insert(entry.id.clone(), entry.source.clone());
                        entries.push(entry);
                    }
                },
                Err(e) => {
                    tracing::error!("{}", e);
                    errors.push(e);
                }
            }
        }

        if !errors.is_empty() {
            return Err(LoadError { errors });
        }

        entries.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }

    /// Load a single entry from a file
    pub fn load_entry(&self, collection: Collection, path: &Path) -> Result<LoadedEntry, ContentError> {
        let content = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (frontmatter, body) =
            Frontmatter::parse(&content).map_err(|source| ContentError::Frontmatter {
                path: path.to_path_buf(),
                source,
            })?;

        let entry = collection
            .validate(&frontmatter)
            .and_then(|entry| self.check_image(collection, path, entry))
            .map_err(|source| ContentError::Validation {
                path: path.to_path_buf(),
                source,
            })?;

        let mut data = DocumentData::new(frontmatter);
        self.pipeline
            .process(body, is_mdx(path), &mut data)
            .map_err(|source| ContentError::Transform {
                path: path.to_path_buf(),
                source,
            })?;

        let id = entry_id(&self.collection_dir(collection), path);
        tracing::debug!("Loaded {}/{}", collection, id);

        Ok(LoadedEntry {
            collection,
            id,
            source: path.to_path_buf(),
            entry,
            data,
            body: body.to_string(),
        })
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.site.content_dir.join(collection.name())
    }

    /// The cover image must exist next to the entry (or under `public/`)
    fn check_image(
        &self,
        collection: Collection,
        path: &Path,
        entry: Entry,
    ) -> Result<Entry, ValidationError> {
        let entry_dir = path.parent().unwrap_or(Path::new("."));
        let resolved = entry.image().url.resolve(entry_dir, &self.site.public_dir);
        if resolved.is_file() {
            Ok(entry)
        } else {
            Err(ValidationError {
                collection,
                issues: vec![FieldIssue::not_found("image.url", "image path", resolved)],
            })
        }
    }
}

/// Markdown and MDX files below `dir`, sorted; `_`-prefixed files are drafts.
/// Unreadable entries (broken links, loops, permissions) come back as errors.
fn content_files(dir: &Path) -> (Vec<PathBuf>, Vec<ContentError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let path = source.path().unwrap_or(dir).to_path_buf();
                errors.push(ContentError::Walk { path, source });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let draft = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('_'));
        if is_content_file(&path) && !draft {
            files.push(path);
        }
    }

    files.sort();
    (files, errors)
}

/// Check if a file is a markdown or MDX file
fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown" || e == "mdx")
        .unwrap_or(false)
}

fn is_mdx(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("mdx")
}

/// Slugified path of an entry relative to its collection, without extension
fn entry_id(collection_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(collection_dir).unwrap_or(path);
    let relative = relative.with_extension("");
    relative
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .map(slug::slugify)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
