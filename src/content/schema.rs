//! Content collection schemas and validation
//!
//! Each collection declares its fields as a static [`CollectionSchema`].
//! Validation walks the declaration, collects every problem it finds and
//! only then builds the typed entry, so an author sees all issues of a
//! file at once.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use super::frontmatter::{type_name, Frontmatter};
use crate::helpers::parse_date;

/// File extensions accepted for `image.url`
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "tiff"];

/// A named content collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Blog,
    Books,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Blog, Collection::Books];

    /// Directory name under the content root
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Blog => "blog",
            Collection::Books => "books",
        }
    }

    pub fn schema(&self) -> &'static CollectionSchema {
        match self {
            Collection::Blog => &BLOG_SCHEMA,
            Collection::Books => &BOOKS_SCHEMA,
        }
    }

    /// Validate raw front-matter against this collection's schema
    pub fn validate(&self, data: &Frontmatter) -> Result<Entry, ValidationError> {
        let mut fields = self.schema().check(data)?;
        let missing = |name: &'static str, kind: FieldKind| ValidationError {
            collection: *self,
            issues: vec![FieldIssue::missing(name, kind)],
        };

        let entry = match self {
            Collection::Blog => Entry::Blog(BlogPost {
                title: fields.take_text("title").ok_or_else(|| missing("title", FieldKind::Text))?,
                description: fields
                    .take_text("description")
                    .ok_or_else(|| missing("description", FieldKind::Text))?,
                pub_date: fields
                    .take_date("pubDate")
                    .ok_or_else(|| missing("pubDate", FieldKind::Date))?,
                image: fields.take_image("image").ok_or_else(|| missing("image", FieldKind::Image))?,
                tags: fields
                    .take_text_list("tags")
                    .ok_or_else(|| missing("tags", FieldKind::TextList))?,
            }),
            Collection::Books => Entry::Book(BookReview {
                title: fields.take_text("title").ok_or_else(|| missing("title", FieldKind::Text))?,
                description: fields
                    .take_text("description")
                    .ok_or_else(|| missing("description", FieldKind::Text))?,
                author: fields.take_text("author").ok_or_else(|| missing("author", FieldKind::Text))?,
                finished_date: fields
                    .take_date("finishedDate")
                    .ok_or_else(|| missing("finishedDate", FieldKind::Date))?,
                image: fields.take_image("image").ok_or_else(|| missing("image", FieldKind::Image))?,
                tags: fields
                    .take_text_list("tags")
                    .ok_or_else(|| missing("tags", FieldKind::TextList))?,
            }),
        };

        Ok(entry)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" | "post" | "posts" => Ok(Collection::Blog),
            "books" | "book" => Ok(Collection::Books),
            other => Err(format!("unknown collection `{}` (expected blog or books)", other)),
        }
    }
}

/// The type a field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    /// `{ url: <image path>, alt: <text> }`
    Image,
    TextList,
}

impl FieldKind {
    /// Human-readable expected type, used in error messages
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Date => "date",
            FieldKind::Image => "image { url, alt }",
            FieldKind::TextList => "sequence of text",
        }
    }
}

/// What happens when a field is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Absent sequences become empty
    DefaultEmpty,
}

/// Declaration of one front-matter field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        presence: Presence::Required,
    }
}

/// The declared shape of a collection
#[derive(Debug)]
pub struct CollectionSchema {
    pub collection: Collection,
    pub fields: &'static [FieldSpec],
}

static BLOG_SCHEMA: CollectionSchema = CollectionSchema {
    collection: Collection::Blog,
    fields: &[
        required("title", FieldKind::Text),
        required("description", FieldKind::Text),
        required("pubDate", FieldKind::Date),
        required("image", FieldKind::Image),
        required("tags", FieldKind::TextList),
    ],
};

static BOOKS_SCHEMA: CollectionSchema = CollectionSchema {
    collection: Collection::Books,
    fields: &[
        required("title", FieldKind::Text),
        required("description", FieldKind::Text),
        required("author", FieldKind::Text),
        required("finishedDate", FieldKind::Date),
        required("image", FieldKind::Image),
        FieldSpec {
            name: "tags",
            kind: FieldKind::TextList,
            presence: Presence::DefaultEmpty,
        },
    ],
};

impl CollectionSchema {
    /// Check every declared field, returning the converted values or all
    /// issues found. Undeclared keys are ignored.
    pub fn check(&self, data: &Frontmatter) -> Result<CheckedFields, ValidationError> {
        let mut values = IndexMap::new();
        let mut issues = Vec::new();

        for spec in self.fields {
            let raw = data.get(spec.name).filter(|v| !v.is_null());
            let Some(raw) = raw else {
                match spec.presence {
                    Presence::Required => issues.push(FieldIssue::missing(spec.name, spec.kind)),
                    Presence::DefaultEmpty => {
                        values.insert(spec.name, FieldValue::TextList(Vec::new()));
                    }
                }
                continue;
            };

            if let Some(value) = convert(spec.name, spec.kind, raw, &mut issues) {
                values.insert(spec.name, value);
            }
        }

        if issues.is_empty() {
            Ok(CheckedFields(values))
        } else {
            Err(ValidationError {
                collection: self.collection,
                issues,
            })
        }
    }
}

fn convert(
    name: &str,
    kind: FieldKind,
    raw: &Value,
    issues: &mut Vec<FieldIssue>,
) -> Option<FieldValue> {
    match kind {
        FieldKind::Text => convert_text(name, raw, issues).map(FieldValue::Text),
        FieldKind::Date => convert_date(name, raw, issues).map(FieldValue::Date),
        FieldKind::Image => convert_image(name, raw, issues).map(FieldValue::Image),
        FieldKind::TextList => convert_text_list(name, raw, issues).map(FieldValue::TextList),
    }
}

fn convert_text(name: &str, raw: &Value, issues: &mut Vec<FieldIssue>) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        other => {
            issues.push(FieldIssue::mistyped(name, FieldKind::Text.expected(), other));
            None
        }
    }
}

fn convert_date(name: &str, raw: &Value, issues: &mut Vec<FieldIssue>) -> Option<NaiveDate> {
    let Value::String(s) = raw else {
        issues.push(FieldIssue::mistyped(name, FieldKind::Date.expected(), raw));
        return None;
    };
    let date = parse_date(s);
    if date.is_none() {
        issues.push(FieldIssue::invalid(
            name,
            FieldKind::Date.expected(),
            format!("`{}` is not a recognised date", s),
        ));
    }
    date
}

fn convert_image(name: &str, raw: &Value, issues: &mut Vec<FieldIssue>) -> Option<ImageRef> {
    let Value::Mapping(mapping) = raw else {
        issues.push(FieldIssue::mistyped(name, FieldKind::Image.expected(), raw));
        return None;
    };

    let url_field = format!("{}.url", name);
    let alt_field = format!("{}.alt", name);

    let url = match mapping.get("url").filter(|v| !v.is_null()) {
        None => {
            issues.push(FieldIssue {
                field: url_field,
                expected: "image path",
                problem: Problem::Missing,
            });
            None
        }
        Some(Value::String(url)) => match ImageResource::new(url) {
            Ok(resource) => Some(resource),
            Err(reason) => {
                issues.push(FieldIssue::invalid(&url_field, "image path", reason));
                None
            }
        },
        Some(other) => {
            issues.push(FieldIssue::mistyped(&url_field, "image path", other));
            None
        }
    };

    let alt = match mapping.get("alt").filter(|v| !v.is_null()) {
        None => {
            issues.push(FieldIssue::missing(&alt_field, FieldKind::Text));
            None
        }
        Some(value) => convert_text(&alt_field, value, issues),
    };

    Some(ImageRef { url: url?, alt: alt? })
}

fn convert_text_list(name: &str, raw: &Value, issues: &mut Vec<FieldIssue>) -> Option<Vec<String>> {
    let Value::Sequence(items) = raw else {
        issues.push(FieldIssue::mistyped(name, FieldKind::TextList.expected(), raw));
        return None;
    };

    let mut values = Vec::with_capacity(items.len());
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        match item {
            Value::String(s) => values.push(s.clone()),
            other => {
                issues.push(FieldIssue::mistyped(
                    &format!("{}[{}]", name, i),
                    FieldKind::Text.expected(),
                    other,
                ));
                ok = false;
            }
        }
    }

    ok.then_some(values)
}

/// A converted field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Image(ImageRef),
    TextList(Vec<String>),
}

/// Values that passed [`CollectionSchema::check`], keyed by field name
#[derive(Debug, Clone, Default)]
pub struct CheckedFields(IndexMap<&'static str, FieldValue>);

impl CheckedFields {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    fn take_text(&mut self, name: &str) -> Option<String> {
        match self.0.shift_remove(name)? {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn take_date(&mut self, name: &str) -> Option<NaiveDate> {
        match self.0.shift_remove(name)? {
            FieldValue::Date(d) => Some(d),
            _ => None,
        }
    }

    fn take_image(&mut self, name: &str) -> Option<ImageRef> {
        match self.0.shift_remove(name)? {
            FieldValue::Image(i) => Some(i),
            _ => None,
        }
    }

    fn take_text_list(&mut self, name: &str) -> Option<Vec<String>> {
        match self.0.shift_remove(name)? {
            FieldValue::TextList(l) => Some(l),
            _ => None,
        }
    }
}

/// Relative path to an image asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageResource(String);

impl ImageResource {
    pub fn new(url: &str) -> Result<Self, String> {
        let url = url.trim();
        if url.is_empty() {
            return Err("image path is empty".to_string());
        }
        if url.contains("://") {
            return Err(format!("`{}` must be a local image path", url));
        }
        let extension = Path::new(url)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(Self(url.to_string())),
            _ => Err(format!(
                "`{}` is not an image (expected one of: {})",
                url,
                IMAGE_EXTENSIONS.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve against the directory of the entry that references it.
    /// Root-relative paths (`/images/a.png`) resolve under `public_dir`.
    pub fn resolve(&self, entry_dir: &Path, public_dir: &Path) -> PathBuf {
        match self.0.strip_prefix('/') {
            Some(rest) => public_dir.join(rest),
            None => entry_dir.join(&self.0),
        }
    }
}

impl fmt::Display for ImageResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cover image with alt text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: ImageResource,
    pub alt: String,
}

/// A validated `blog` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub title: String,
    pub description: String,
    pub pub_date: NaiveDate,
    pub image: ImageRef,
    pub tags: Vec<String>,
}

/// A validated `books` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookReview {
    pub title: String,
    pub description: String,
    pub author: String,
    pub finished_date: NaiveDate,
    pub image: ImageRef,
    pub tags: Vec<String>,
}

/// A validated entry of any collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    Blog(BlogPost),
    Book(BookReview),
}

impl Entry {
    pub fn collection(&self) -> Collection {
        match self {
            Entry::Blog(_) => Collection::Blog,
            Entry::Book(_) => Collection::Books,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Entry::Blog(post) => &post.title,
            Entry::Book(book) => &book.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Entry::Blog(post) => &post.description,
            Entry::Book(book) => &book.description,
        }
    }

    /// Publication date for posts, finishing date for books
    pub fn date(&self) -> NaiveDate {
        match self {
            Entry::Blog(post) => post.pub_date,
            Entry::Book(book) => book.finished_date,
        }
    }

    pub fn image(&self) -> &ImageRef {
        match self {
            Entry::Blog(post) => &post.image,
            Entry::Book(book) => &book.image,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Entry::Blog(post) => &post.tags,
            Entry::Book(book) => &book.tags,
        }
    }
}

/// What is wrong with a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Missing,
    Mistyped { found: &'static str },
    Invalid { reason: String },
    NotFound { path: PathBuf },
}

/// One problem with one field of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path of the field, e.g. `image.alt` or `tags[1]`
    pub field: String,
    pub expected: &'static str,
    pub problem: Problem,
}

impl FieldIssue {
    fn missing(field: &str, kind: FieldKind) -> Self {
        Self {
            field: field.to_string(),
            expected: kind.expected(),
            problem: Problem::Missing,
        }
    }

    fn mistyped(field: &str, expected: &'static str, found: &Value) -> Self {
        Self {
            field: field.to_string(),
            expected,
            problem: Problem::Mistyped {
                found: type_name(found),
            },
        }
    }

    fn invalid(field: &str, expected: &'static str, reason: String) -> Self {
        Self {
            field: field.to_string(),
            expected,
            problem: Problem::Invalid { reason },
        }
    }

    pub fn not_found(field: &str, expected: &'static str, path: PathBuf) -> Self {
        Self {
            field: field.to_string(),
            expected,
            problem: Problem::NotFound { path },
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            Problem::Missing => write!(f, "`{}` is required ({})", self.field, self.expected),
            Problem::Mistyped { found } => write!(
                f,
                "`{}` expected {}, found {}",
                self.field, self.expected, found
            ),
            Problem::Invalid { reason } => write!(f, "`{}` {}", self.field, reason),
            Problem::NotFound { path } => {
                write!(f, "`{}` points to a missing file {:?}", self.field, path)
            }
        }
    }
}

/// An entry does not match its collection schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid `{collection}` entry:{}", render_issues(.issues))]
pub struct ValidationError {
    pub collection: Collection,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// Whether `field` is reported as missing
    pub fn is_missing(&self, field: &str) -> bool {
        self.issues
            .iter()
            .any(|i| i.field == field && i.problem == Problem::Missing)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|i| i.field.as_str())
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues.iter().map(|i| format!("\n  - {}", i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontmatter(yaml: &str) -> Frontmatter {
        Frontmatter::from_value(serde_yaml::from_str(yaml).unwrap()).unwrap()
    }

    const VALID_POST: &str = r#"
title: Hello World
description: First post
pubDate: 2024-03-05
image:
  url: ./cover.png
  alt: A cover
tags: [rust, web]
"#;

    #[test]
    fn test_valid_blog_post() {
        let entry = Collection::Blog.validate(&frontmatter(VALID_POST)).unwrap();
        let Entry::Blog(post) = entry else {
            panic!("expected a blog post");
        };
        assert_eq!(post.title, "Hello World");
        assert_eq!(post.description, "First post");
        assert_eq!(post.pub_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(post.image.url.as_str(), "./cover.png");
        assert_eq!(post.image.alt, "A cover");
        assert_eq!(post.tags, vec!["rust", "web"]);
    }

    #[test]
    fn test_blog_missing_pub_date() {
        let yaml = VALID_POST.replace("pubDate: 2024-03-05\n", "");
        let err = Collection::Blog.validate(&frontmatter(&yaml)).unwrap_err();
        assert_eq!(err.collection, Collection::Blog);
        assert!(err.is_missing("pubDate"));
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].expected, "date");
        assert!(err.to_string().contains("`pubDate` is required (date)"));
    }

    #[test]
    fn test_blog_tags_have_no_default() {
        let yaml = VALID_POST.replace("tags: [rust, web]\n", "");
        let err = Collection::Blog.validate(&frontmatter(&yaml)).unwrap_err();
        assert!(err.is_missing("tags"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let yaml = VALID_POST.replace("title: Hello World", "title: ~");
        let err = Collection::Blog.validate(&frontmatter(&yaml)).unwrap_err();
        assert!(err.is_missing("title"));
    }

    #[test]
    fn test_every_issue_is_reported() {
        let yaml = r#"
title: 42
pubDate: someday
image:
  url: ./cover.txt
tags: [rust, 3]
"#;
        let err = Collection::Blog.validate(&frontmatter(yaml)).unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(
            fields,
            vec!["title", "description", "pubDate", "image.url", "image.alt", "tags[1]"]
        );
        assert_eq!(
            err.issues[0].problem,
            Problem::Mistyped { found: "number" }
        );
        assert!(err.is_missing("description"));
        assert!(err.is_missing("image.alt"));
        assert!(matches!(err.issues[2].problem, Problem::Invalid { .. }));
    }

    #[test]
    fn test_image_must_be_mapping() {
        let yaml = VALID_POST.replace("image:\n  url: ./cover.png\n  alt: A cover\n", "image: ./cover.png\n");
        let err = Collection::Blog.validate(&frontmatter(&yaml)).unwrap_err();
        assert_eq!(
            err.issues,
            vec![FieldIssue {
                field: "image".to_string(),
                expected: "image { url, alt }",
                problem: Problem::Mistyped { found: "text" },
            }]
        );
    }

    #[test]
    fn test_extra_fields_ignored() {
        let yaml = format!("{}draft: true\n", VALID_POST);
        assert!(Collection::Blog.validate(&frontmatter(&yaml)).is_ok());
    }

    const VALID_BOOK: &str = r#"
title: Dune
description: Spice and sand
author: Frank Herbert
finishedDate: 2023-11-20
image:
  url: ./dune.jpg
  alt: Dune cover
"#;

    #[test]
    fn test_book_tags_default_to_empty() {
        let entry = Collection::Books.validate(&frontmatter(VALID_BOOK)).unwrap();
        let Entry::Book(book) = entry else {
            panic!("expected a book review");
        };
        assert_eq!(book.author, "Frank Herbert");
        assert!(book.tags.is_empty());
        assert_eq!(
            book.finished_date,
            NaiveDate::from_ymd_opt(2023, 11, 20).unwrap()
        );
    }

    #[test]
    fn test_book_tags_kept_when_present() {
        let yaml = format!("{}tags:\n  - sci-fi\n", VALID_BOOK);
        let entry = Collection::Books.validate(&frontmatter(&yaml)).unwrap();
        assert_eq!(entry.tags(), ["sci-fi".to_string()]);
        assert_eq!(entry.collection(), Collection::Books);
    }

    #[test]
    fn test_book_requires_author() {
        let yaml = VALID_BOOK.replace("author: Frank Herbert\n", "");
        let err = Collection::Books.validate(&frontmatter(&yaml)).unwrap_err();
        assert!(err.is_missing("author"));
        assert_eq!(err.collection, Collection::Books);
    }

    #[test]
    fn test_image_resource() {
        assert!(ImageResource::new("./a.PNG").is_ok());
        assert!(ImageResource::new("/images/a.webp").is_ok());
        assert!(ImageResource::new("").is_err());
        assert!(ImageResource::new("https://cdn.example.com/a.png").is_err());
        assert!(ImageResource::new("./notes.md").is_err());

        let image = ImageResource::new("./cover.png").unwrap();
        assert_eq!(
            image.resolve(Path::new("content/blog"), Path::new("public")),
            Path::new("content/blog/./cover.png")
        );
        let image = ImageResource::new("/img/cover.png").unwrap();
        assert_eq!(
            image.resolve(Path::new("content/blog"), Path::new("public")),
            Path::new("public/img/cover.png")
        );
    }

    #[test]
    fn test_collection_from_str() {
        assert_eq!("blog".parse::<Collection>(), Ok(Collection::Blog));
        assert_eq!("books".parse::<Collection>(), Ok(Collection::Books));
        assert!("notes".parse::<Collection>().is_err());
    }
}
