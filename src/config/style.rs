//! Styling configuration: which files the utility-class scanner reads

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::ConfigError;

/// Utility-CSS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub dark_mode: String,
    /// Glob patterns (with `{a,b}` alternatives) relative to the site root
    pub content: Vec<String>,
    pub plugins: Vec<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            dark_mode: "class".to_string(),
            content: vec![
                "./src/**/*.{astro,html,js,jsx,md,mdx,svelte,ts,tsx,vue}".to_string(),
                "node_modules/preline/dist/*.js".to_string(),
            ],
            plugins: vec!["preline".to_string()],
        }
    }
}

impl StyleConfig {
    /// Resolve every content pattern against `base_dir` and return the
    /// matching files, sorted and without duplicates.
    pub fn scan<P: AsRef<Path>>(&self, base_dir: P) -> Result<Vec<PathBuf>, ConfigError> {
        let base_dir = base_dir.as_ref();
        let mut files = BTreeSet::new();

        for pattern in &self.content {
            for expanded in expand_braces(pattern) {
                let relative = expanded.trim_start_matches("./");
                let full = base_dir.join(relative);
                let full = full.to_string_lossy();

                let paths = glob::glob(&full).map_err(|e| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;

                for entry in paths {
                    match entry {
                        Ok(path) if path.is_file() => {
                            files.insert(path);
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!("Skipping {:?} for {}: {}", e.path(), pattern, e.error())
                        }
                    }
                }
            }
        }

        tracing::debug!("Style scan matched {} files", files.len());
        Ok(files.into_iter().collect())
    }
}

/// Expand `{a,b}` alternatives into plain glob patterns.
///
/// Nested groups are supported; an unmatched `{` is kept literally.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, c) in pattern[open..].char_indices() {
        let i = open + i;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(i),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    let mut alternatives = Vec::new();
    let mut start = open + 1;
    for split in splits.into_iter().chain(std::iter::once(close)) {
        alternatives.push(&pattern[start..split]);
        start = split + 1;
    }

    alternatives
        .into_iter()
        .flat_map(|alt| expand_braces(&format!("{}{}{}", prefix, alt, suffix)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("src/*.js"), vec!["src/*.js"]);
        assert_eq!(
            expand_braces("src/*.{md,mdx}"),
            vec!["src/*.md", "src/*.mdx"]
        );
        assert_eq!(
            expand_braces("{a,b}/{c,d}"),
            vec!["a/c", "a/d", "b/c", "b/d"]
        );
        assert_eq!(expand_braces("x{a,{b,c}}"), vec!["xa", "xb", "xc"]);
        assert_eq!(expand_braces("broken{a,b"), vec!["broken{a,b"]);
    }

    #[test]
    fn test_scan_matches_default_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        fs::create_dir_all(base.join("src/pages")).unwrap();
        fs::create_dir_all(base.join("node_modules/preline/dist")).unwrap();
        fs::write(base.join("src/pages/index.astro"), "").unwrap();
        fs::write(base.join("src/pages/post.mdx"), "").unwrap();
        fs::write(base.join("src/pages/logo.png"), "").unwrap();
        fs::write(base.join("node_modules/preline/dist/preline.js"), "").unwrap();

        let files = StyleConfig::default().scan(base).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(base).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(
            names,
            vec![
                "node_modules/preline/dist/preline.js",
                "src/pages/index.astro",
                "src/pages/post.mdx",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_unreadable_directories() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        let locked = base.join("src/locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("hidden.astro"), "").unwrap();
        fs::write(base.join("src/page.astro"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let readable = fs::read_dir(&locked).is_ok();

        let style = StyleConfig {
            content: vec!["./src/**/*.astro".to_string()],
            ..Default::default()
        };
        let files = style.scan(base);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let files = files.unwrap();
        assert!(files.contains(&base.join("src/page.astro")));
        // privileged users can still read the directory
        assert_eq!(files.contains(&locked.join("hidden.astro")), readable);
    }
}
