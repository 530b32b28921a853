//! Create a new content entry

use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::PathBuf;

use super::init::COVER_SVG;
use crate::content::Collection;
use crate::helpers::iso_date;
use crate::Site;

/// Create a new blog post or book review with every required field present
/// and a placeholder cover next to it, so the entry passes `check` as is.
///
/// Returns the path of the created file.
pub fn create_entry(
    site: &Site,
    collection: Collection,
    title: &str,
    author: Option<&str>,
) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let target_dir = site.content_dir.join(collection.name());
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let cover_path = target_dir.join(cover_file(&slug));
    if !cover_path.exists() {
        fs::write(&cover_path, COVER_SVG)?;
    }

    let content = scaffold(collection, title, &slug, author);
    fs::write(&file_path, content)?;

    tracing::info!("Created {} entry {:?}", collection, file_path);
    Ok(file_path)
}

fn cover_file(slug: &str) -> String {
    format!("{}.svg", slug)
}

/// Front-matter template for a collection
fn scaffold(collection: Collection, title: &str, slug: &str, author: Option<&str>) -> String {
    let today = iso_date(&Local::now().date_naive());
    let title = yaml_string(title);
    let cover = cover_file(slug);

    match collection {
        Collection::Blog => format!(
            r#"---
title: {title}
description: ''
pubDate: {today}
image:
  url: ./{cover}
  alt: {title}
tags: []
---
"#
        ),
        Collection::Books => format!(
            r#"---
title: {title}
description: ''
author: {author}
finishedDate: {today}
image:
  url: ./{cover}
  alt: {title}
tags: []
---
"#,
            author = yaml_string(author.unwrap_or(""))
        ),
    }
}

/// Single-quoted YAML scalar
fn yaml_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
