//! Resolve a request path through the redirect table

use crate::helpers::normalize_path;
use crate::Site;

/// The path a request for `path` ends up at
pub fn run(site: &Site, path: &str) -> String {
    match site.config.resolve_redirect(path) {
        Some(target) => {
            tracing::debug!("Redirect {} -> {}", path, target);
            target.to_string()
        }
        None => normalize_path(path),
    }
}
