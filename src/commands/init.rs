//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::helpers::iso_date;
use crate::CONFIG_FILE;

/// Placeholder cover image for scaffolded entries
pub(crate) const COVER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="1200" height="630"><rect width="100%" height="100%" fill="#1e293b"/></svg>
"##;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    let config = SiteConfig::default();
    let content_dir = target_dir.join(&config.content_dir);

    // Create directory structure
    fs::create_dir_all(content_dir.join("blog"))?;
    fs::create_dir_all(content_dir.join("books"))?;
    fs::create_dir_all(target_dir.join("public"))?;

    let config_content = format!(
        "# folio configuration\n\n{}",
        serde_yaml::to_string(&config)?
    );
    fs::write(&config_path, config_content)?;

    // Create a sample post
    let today = iso_date(&chrono::Local::now().date_naive());
    let sample_post = format!(
        r#"---
title: Hello World
description: The first post on this site.
pubDate: {today}
image:
  url: ./hello-world.svg
  alt: Placeholder cover
tags:
  - meta
---

Welcome! Every post in `src/content/blog` needs a title, a description, a
publication date, a cover image and a list of tags. Run `folio check` to
validate the collections and `folio build` to write the content manifest.
"#
    );

    fs::write(content_dir.join("blog/hello-world.md"), sample_post)?;
    fs::write(content_dir.join("blog/hello-world.svg"), COVER_SVG)?;

    tracing::info!("Initialized site in {:?}", target_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Site;

    #[test]
    fn test_init_creates_a_valid_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.config.resolve_redirect("/blog"), Some("/"));

        let set = site.check().unwrap();
        assert_eq!(set.blog.len(), 1);
        assert_eq!(set.blog[0].title(), "Hello World");
        assert_eq!(set.blog[0].minutes_read(), Some("1 min read"));
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
