//! Dotted field paths and their resolution against the type model

use crate::error::{Error, Result};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use terser_context::TypeModel;
use terser_models::FieldDefinition;

/// Parsed dotted path (`identifier`, `name.given`, `contact.name.family`)
///
/// Always holds at least one non-empty segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: SmallVec<[String; 4]>,
}

impl FieldPath {
    /// Split on `.`; an empty path or an empty segment is rejected.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidPath(path.to_string()));
        }
        let segments = path
            .split('.')
            .map(|segment| {
                if segment.is_empty() || segment.chars().any(char::is_whitespace) {
                    Err(Error::InvalidPath(path.to_string()))
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<Result<SmallVec<[String; 4]>>>()?;

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A path resolved against a root type: one field definition per segment,
/// terminal last.
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    root_type: String,
    path: FieldPath,
    fields: SmallVec<[FieldDefinition; 4]>,
}

impl ResolvedPath {
    /// Path to one declared field of the root type, skipping the model lookup.
    pub(crate) fn for_field(root_type: &str, field: &FieldDefinition) -> Self {
        let mut segments = SmallVec::new();
        segments.push(field.name.clone());
        let mut fields = SmallVec::new();
        fields.push(field.clone());
        Self {
            root_type: root_type.to_string(),
            path: FieldPath {
                raw: field.name.clone(),
                segments,
            },
            fields,
        }
    }

    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Field definitions in path order
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Definition of the last segment
    pub fn terminal(&self) -> &FieldDefinition {
        // parse guarantees one segment and resolve one field per segment
        &self.fields[self.fields.len() - 1]
    }

    /// Containers walked before the terminal field
    pub fn intermediates(&self) -> &[FieldDefinition] {
        &self.fields[..self.fields.len() - 1]
    }
}

/// Resolve `path` segment by segment, starting at `root_type`.
pub fn resolve(model: &dyn TypeModel, root_type: &str, path: &str) -> Result<ResolvedPath> {
    let path = FieldPath::parse(path)?;
    let mut fields: SmallVec<[FieldDefinition; 4]> = SmallVec::new();
    let mut current_type = root_type.to_string();

    for segment in path.segments() {
        if let Some(previous) = fields.last() {
            if previous.primitive {
                return Err(Error::UnknownField {
                    type_name: previous.type_name.clone(),
                    field: segment.clone(),
                });
            }
        }
        let field = model.child_field(&current_type, segment)?;
        current_type = field.type_name.clone();
        fields.push(field);
    }

    Ok(ResolvedPath {
        root_type: root_type.to_string(),
        path,
        fields,
    })
}
