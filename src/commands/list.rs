//! List site content

use anyhow::Result;

use crate::content::{Collection, ContentLoader, ContentSet};
use crate::helpers::format_date;
use crate::Site;

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let loader = ContentLoader::new(site)?;

    match content_type {
        "tag" | "tags" => {
            let set = loader.load_all()?;
            print!("{}", render_tags(&set));
        }
        "style" | "styles" => {
            let files = site.config.style.scan(&site.base_dir)?;
            println!("Style sources ({}):", files.len());
            for file in files {
                let shown = file.strip_prefix(&site.base_dir).unwrap_or(&file);
                println!("  {}", shown.display());
            }
        }
        other => {
            let collection: Collection = other.parse().map_err(|e: String| {
                anyhow::anyhow!("{}. Available: blog, books, tags, styles", e)
            })?;
            let entries = loader.load_collection(collection)?;
            let mut set = ContentSet::default();
            match collection {
                Collection::Blog => set.blog = entries,
                Collection::Books => set.books = entries,
            }
            print!("{}", render_collection(&set, collection));
        }
    }

    Ok(())
}

fn render_collection(set: &ContentSet, collection: Collection) -> String {
    let entries = set.get(collection);
    let mut out = format!("{} ({}):\n", collection, entries.len());
    for entry in entries {
        out.push_str(&format!(
            "  {} - {} ({}) [{}]\n",
            format_date(&entry.date()),
            entry.title(),
            entry.minutes_read().unwrap_or("-"),
            entry.id
        ));
    }
    out
}

fn render_tags(set: &ContentSet) -> String {
    let tags = set.tags();
    let mut out = format!("Tags ({}):\n", tags.len());
    for (tag, count) in tags {
        out.push_str(&format!("  {} ({})\n", tag, count));
    }
    out
}
