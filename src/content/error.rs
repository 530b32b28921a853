//! Errors raised while loading content files

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::frontmatter::FrontmatterError;
use super::pipeline::TransformError;
use super::schema::ValidationError;

/// Failure to load a single content file
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{path:?}: id `{id}` is already used by {first:?}")]
    DuplicateId {
        path: PathBuf,
        id: String,
        first: PathBuf,
    },

    #[error("{path:?}: {source}")]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },

    #[error("{path:?}: {source}")]
    Validation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("{path:?}: {source}")]
    Transform {
        path: PathBuf,
        #[source]
        source: TransformError,
    },
}

impl ContentError {
    /// The file the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            ContentError::Io { path, .. }
            | ContentError::Walk { path, .. }
            | ContentError::DuplicateId { path, .. }
            | ContentError::Frontmatter { path, .. }
            | ContentError::Validation { path, .. }
            | ContentError::Transform { path, .. } => path,
        }
    }
}

/// Every failure found while loading content; any one of them fails the build
#[derive(Debug)]
pub struct LoadError {
    pub errors: Vec<ContentError>,
}

impl LoadError {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} content file(s) failed to load", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadError {}

impl From<ContentError> for LoadError {
    fn from(error: ContentError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}
