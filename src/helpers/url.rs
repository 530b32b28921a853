//! URL helper functions

use crate::config::SiteConfig;

/// Normalize a request path for comparison: leading slash, no trailing
/// slash (except for the root itself)
///
/// # Examples
/// ```ignore
/// normalize_path("blog/") // -> "/blog"
/// ```
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Site-relative URL of a content entry
///
/// # Examples
/// ```ignore
/// permalink("blog", "hello-world") // -> "/blog/hello-world/"
/// ```
pub fn permalink(collection: &str, id: &str) -> String {
    format!(
        "/{}/{}/",
        collection.trim_matches('/'),
        id.trim_matches('/')
    )
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://vguleaev.dev/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.site.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}
