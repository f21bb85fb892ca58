//! pyproject.toml document access for PEP 621 projects
//!
//! Handles:
//! - project.dependencies (base group)
//! - project.optional-dependencies (extras groups)
//! - project.requires-python
//!
//! The document is held as a `toml_edit::DocumentMut` so that rewriting one
//! array element leaves every other byte of the file as it was.

use crate::domain::{normalize_name, DependencyGroup};
use crate::error::ManifestError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use toml_edit::{Array, DocumentMut, Item, TableLike, Value};

/// One element of a dependency array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Position in the array
    pub index: usize,
    /// The string value, or the TOML text of a non-string element
    pub value: Result<String, String>,
    /// Comment on the same line after the element, starting at `#`
    pub comment: Option<String>,
}

/// A pyproject.toml loaded for in-place editing
pub struct PyprojectDocument {
    path: PathBuf,
    original: String,
    doc: DocumentMut,
}

impl PyprojectDocument {
    /// Read and parse the manifest at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ManifestError::not_found(path),
            _ => ManifestError::read_error(path, e),
        })?;
        Self::parse(path, content)
    }

    /// Parse manifest content; `path` is only used in error messages
    pub fn parse(path: impl Into<PathBuf>, content: impl Into<String>) -> Result<Self, ManifestError> {
        let path = path.into();
        let original = content.into();
        let doc = original
            .parse::<DocumentMut>()
            .map_err(|e| ManifestError::toml_parse_error(&path, e.to_string()))?;

        if doc.get("project").and_then(Item::as_table_like).is_none() {
            return Err(ManifestError::missing_project(&path));
        }

        Ok(Self {
            path,
            original,
            doc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file content as it was read
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Names of the declared extras, in file order
    pub fn extras(&self) -> Vec<String> {
        self.optional_table()
            .map(|table| table.iter().map(|(key, _)| key.to_string()).collect())
            .unwrap_or_default()
    }

    /// Declared key of an extra, matched after name normalization
    pub fn find_extra(&self, name: &str) -> Option<String> {
        let wanted = normalize_name(name);
        self.extras()
            .into_iter()
            .find(|declared| declared == name || normalize_name(declared) == wanted)
    }

    pub fn has_extra(&self, name: &str) -> bool {
        self.find_extra(name).is_some()
    }

    /// `[project].requires-python`, if it is a string
    pub fn requires_python(&self) -> Option<&str> {
        self.project()?.get("requires-python")?.as_str()
    }

    /// Elements of a group's array; an absent array is an empty group
    pub fn entries(&self, group: &DependencyGroup) -> Result<Vec<ManifestEntry>, ManifestError> {
        let array = match self.group_array(group)? {
            Some(array) => array,
            None => return Ok(Vec::new()),
        };

        Ok(array
            .iter()
            .enumerate()
            .map(|(index, value)| ManifestEntry {
                index,
                value: match value.as_str() {
                    Some(s) => Ok(s.to_string()),
                    None => Err(bare_repr(value)),
                },
                comment: trailing_comment(array, index),
            })
            .collect())
    }

    /// Replace the string at `index`, keeping its quoting style and decor
    pub fn replace_entry(
        &mut self,
        group: &DependencyGroup,
        index: usize,
        new_text: &str,
    ) -> Result<(), ManifestError> {
        let path = self.path.clone();
        let key = group_key(group);
        let array = self
            .group_array_mut(group)?
            .filter(|array| index < array.len())
            .ok_or_else(|| ManifestError::malformed(&path, format!("{}[{}]", key, index)))?;

        let literal = array.get(index).map(is_literal_string).unwrap_or(false);
        let replacement = if literal && !new_text.contains('\'') && !new_text.contains('\n') {
            format!("'{}'", new_text)
                .parse::<Value>()
                .unwrap_or_else(|_| Value::from(new_text))
        } else {
            Value::from(new_text)
        };
        array.replace(index, replacement);
        Ok(())
    }

    /// The document as it would be written
    pub fn render(&self) -> String {
        self.doc.to_string()
    }

    /// True when rendering differs from what was read
    pub fn is_modified(&self) -> bool {
        self.render() != self.original
    }

    fn project(&self) -> Option<&dyn TableLike> {
        self.doc.get("project").and_then(Item::as_table_like)
    }

    fn optional_table(&self) -> Option<&dyn TableLike> {
        self.project()?
            .get("optional-dependencies")
            .and_then(Item::as_table_like)
    }

    fn group_array(&self, group: &DependencyGroup) -> Result<Option<&Array>, ManifestError> {
        let project = match self.project() {
            Some(project) => project,
            None => return Err(ManifestError::missing_project(&self.path)),
        };

        let item = match group {
            DependencyGroup::Base => project.get("dependencies"),
            DependencyGroup::Extra(name) => match project.get("optional-dependencies") {
                None => None,
                Some(optional) => optional
                    .as_table_like()
                    .ok_or_else(|| ManifestError::malformed(&self.path, "optional-dependencies"))?
                    .get(name),
            },
        };

        match item {
            None => Ok(None),
            Some(item) => item
                .as_array()
                .map(Some)
                .ok_or_else(|| ManifestError::malformed(&self.path, group_key(group))),
        }
    }

    fn group_array_mut(
        &mut self,
        group: &DependencyGroup,
    ) -> Result<Option<&mut Array>, ManifestError> {
        let path = &self.path;
        let project = self
            .doc
            .get_mut("project")
            .and_then(Item::as_table_like_mut)
            .ok_or_else(|| ManifestError::missing_project(path))?;

        let item = match group {
            DependencyGroup::Base => project.get_mut("dependencies"),
            DependencyGroup::Extra(name) => match project.get_mut("optional-dependencies") {
                None => None,
                Some(optional) => optional
                    .as_table_like_mut()
                    .ok_or_else(|| ManifestError::malformed(path, "optional-dependencies"))?
                    .get_mut(name),
            },
        };

        match item {
            None => Ok(None),
            Some(item) => item
                .as_array_mut()
                .map(Some)
                .ok_or_else(|| ManifestError::malformed(path, group_key(group))),
        }
    }
}

fn group_key(group: &DependencyGroup) -> String {
    format!("project.{}", group)
}

/// Value text without surrounding whitespace or comments
fn bare_repr(value: &Value) -> String {
    let mut bare = value.clone();
    bare.decor_mut().clear();
    bare.to_string()
}

fn is_literal_string(value: &Value) -> bool {
    value.is_str() && bare_repr(value).starts_with('\'')
}

/// Comment on the element's own line
///
/// Depending on where the comma sits, the comment lands in the element's
/// suffix, the next element's prefix or the array's trailing whitespace.
fn trailing_comment(array: &Array, index: usize) -> Option<String> {
    let suffix = array
        .get(index)?
        .decor()
        .suffix()
        .and_then(|raw| raw.as_str())
        .unwrap_or("");
    if let Some(comment) = first_line_comment(suffix) {
        return Some(comment);
    }
    if suffix.contains('\n') {
        return None;
    }

    let following = match array.get(index + 1) {
        Some(next) => next.decor().prefix().and_then(|raw| raw.as_str()),
        None => array.trailing().as_str(),
    };
    first_line_comment(following.unwrap_or(""))
}

fn first_line_comment(raw: &str) -> Option<String> {
    let line = raw.split('\n').next().unwrap_or("");
    line.find('#').map(|at| line[at..].trim_end().to_string())
}
