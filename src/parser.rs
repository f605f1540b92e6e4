//! Shared id-type parsing for path id segments.
//!
//! Path id values arrive as plain strings. Conversion into the id type a
//! repository declares happens inside the controllers, through this
//! parser, before any repository invocation; repositories never see raw
//! path strings.

use std::fmt;

use crate::error::DispatchError;

/// The id field type a resource declares in its registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// Numeric ids, parsed as signed 64-bit integers.
    Integer,
    /// Opaque string ids, passed through verbatim.
    Text,
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("an integer id"),
            Self::Text => f.write_str("a text id"),
        }
    }
}

/// A path id converted to a repository's declared id type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// A parsed numeric id.
    Integer(i64),
    /// An opaque string id.
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parses one raw path id segment into the declared id kind.
///
/// # Errors
///
/// Returns [`DispatchError::IdParse`] when the raw value does not fit the
/// declared kind, naming the value, the kind and the resource type.
pub fn parse_id(raw: &str, kind: IdKind, resource_type: &str) -> Result<ResourceId, DispatchError> {
    match kind {
        IdKind::Integer => raw
            .parse::<i64>()
            .map(ResourceId::Integer)
            .map_err(|_| DispatchError::IdParse {
                value: raw.to_string(),
                kind,
                resource_type: resource_type.to_string(),
            }),
        IdKind::Text => Ok(ResourceId::Text(raw.to_string())),
    }
}

/// Parses every raw path id segment into the declared id kind.
///
/// # Errors
///
/// Returns the first [`DispatchError::IdParse`] encountered; no ids are
/// handed to a repository when any of them is malformed.
pub fn parse_ids(
    raw: &[String],
    kind: IdKind,
    resource_type: &str,
) -> Result<Vec<ResourceId>, DispatchError> {
    raw.iter()
        .map(|value| parse_id(value, kind, resource_type))
        .collect()
}
