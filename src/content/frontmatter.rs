//! Front-matter splitting and the per-document metadata bag

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use thiserror::Error;

/// Front-matter parsing errors
#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("front-matter block is not closed with `---`")]
    Unterminated,

    #[error("invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front-matter must be a mapping, found {0}")]
    NotMapping(&'static str),

    #[error("front-matter keys must be strings, found {0}")]
    NonStringKey(&'static str),
}

/// Mutable metadata attached to a document while it is processed.
///
/// Starts out as the raw front-matter fields; markdown plugins add their
/// own keys (such as `minutesRead`). Key order follows the source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frontmatter(IndexMap<String, Value>);

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a content file into its front-matter and body.
    ///
    /// A file without a leading `---` block has empty front-matter; the
    /// schema then reports every required field as missing.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontmatterError> {
        let content = content.trim_start_matches('\u{feff}');

        let Some(rest) = content.strip_prefix("---") else {
            return Ok((Self::new(), content));
        };
        // `----` or `--- title` is not a front-matter fence
        if !rest.starts_with(['\n', '\r']) {
            return Ok((Self::new(), content));
        }
        let rest = rest.trim_start_matches(['\n', '\r']);

        let (yaml_end, body_start) = closing_fence(rest).ok_or(FrontmatterError::Unterminated)?;
        let (yaml_content, remaining) = (&rest[..yaml_end], &rest[body_start..]);
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((Self::new(), remaining));
        }

        let value: Value = serde_yaml::from_str(yaml_content)?;
        Ok((Self::from_value(value)?, remaining))
    }

    /// Build from an already-parsed YAML value
    pub fn from_value(value: Value) -> Result<Self, FrontmatterError> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Mapping(mapping) => {
                let mut fields = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    match key {
                        Value::String(key) => {
                            fields.insert(key, value);
                        }
                        other => return Err(FrontmatterError::NonStringKey(type_name(&other))),
                    }
                }
                Ok(Self(fields))
            }
            other => Err(FrontmatterError::NotMapping(type_name(&other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or overwrite a key, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Byte offsets of the closing `---` line in `rest`: where the YAML ends and
/// where the body starts. Only a line holding nothing but `---` closes.
fn closing_fence(rest: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r', ' ', '\t']) == "---" {
            return Some((offset, offset + line.len()));
        }
        offset += line.len();
    }
    None
}

/// Short name of a YAML value's type, used in error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
