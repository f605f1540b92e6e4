//! JSON:API document model.
//!
//! A [`Document`] is the top-level request/response envelope: an optional
//! primary data section, an optional `included` section for side-loaded
//! resources, and an optional `errors` section. The primary data section
//! is three-state (a *present* value, an *explicit null*, or *absent*)
//! and the wire format treats explicit null and absence differently, so
//! the state is a tagged enum ([`Nullable`]) rather than a nested
//! `Option`.
//!
//! # Example
//!
//! ```rust
//! use jsonapi_core::document::{Document, Nullable};
//!
//! // "no data found" is an explicit null on the wire: {"data":null}
//! let mut document = Document::new();
//! assert!(!document.has_data());
//! document.set_data(Nullable::Null);
//! assert!(document.has_data());
//! assert_eq!(serde_json::to_string(&document).unwrap(), r#"{"data":null}"#);
//!
//! // a data-less document omits the field entirely: {}
//! let empty = Document::new();
//! assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
//! ```

mod mapper;

pub use mapper::{
    DefaultDocumentMapper, DocumentMapper, DocumentMappingConfig, ParameterProvider,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::DispatchError;

/// Three-state optionality: present, explicitly null, or absent.
///
/// `Absent` fields are omitted from serialized output (pair the field
/// with `#[serde(default, skip_serializing_if = "Nullable::is_absent")]`)
/// while `Null` serializes as a JSON `null`. Deserialization maps a
/// missing field to `Absent` and an explicit `null` to `Null`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Nullable<T> {
    /// The field is not present at all.
    #[default]
    Absent,
    /// The field is present with an explicit null value.
    Null,
    /// The field is present with a value.
    Present(T),
}

impl<T> Nullable<T> {
    /// Whether the field is absent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether the field is an explicit null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the field holds a value.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// The held value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the held value, preserving `Absent` and `Null`.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Nullable<U> {
        match self {
            Self::Absent => Nullable::Absent,
            Self::Null => Nullable::Null,
            Self::Present(value) => Nullable::Present(f(value)),
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Absent is normally skipped by the containing struct; if it
            // is serialized anyway it degrades to null.
            Self::Absent | Self::Null => serializer.serialize_none(),
            Self::Present(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer)
            .map(|value| value.map_or(Self::Null, Self::Present))
    }
}

/// A `{type, id}` pair identifying one resource in relationship linkage.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceIdentifier {
    /// The resource type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// The resource id, stringified for the wire.
    pub id: String,
}

impl ResourceIdentifier {
    /// Creates an identifier from a type name and an id.
    #[must_use]
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }
}

/// Relationship linkage: one identifier or a list of identifiers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Linkage {
    /// To-one linkage.
    Single(ResourceIdentifier),
    /// To-many linkage.
    Many(Vec<ResourceIdentifier>),
}

impl Linkage {
    /// The linked identifiers regardless of cardinality.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&ResourceIdentifier> {
        match self {
            Self::Single(one) => vec![one],
            Self::Many(many) => many.iter().collect(),
        }
    }
}

/// A named relationship on a resource.
///
/// The `data` section is three-state just like a document's primary
/// data: a to-one relationship with no target is an explicit null, and a
/// relationship whose linkage is unknown omits the field.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    /// The relationship linkage.
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub data: Nullable<Linkage>,
}

impl Relationship {
    /// A relationship with known linkage.
    #[must_use]
    pub const fn linked(linkage: Linkage) -> Self {
        Self {
            data: Nullable::Present(linkage),
        }
    }

    /// A to-one relationship with no target.
    #[must_use]
    pub const fn empty_to_one() -> Self {
        Self {
            data: Nullable::Null,
        }
    }
}

/// One resource object in a document.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    /// The resource type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// The resource id; absent only for to-be-created resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The attribute map, already in wire form.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    /// Named relationships with their linkage.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
}

impl Resource {
    /// Creates an empty resource of the given type.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    /// Sets one attribute value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    /// The `{type, id}` identifier of the resource, if it has an id.
    #[must_use]
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .as_ref()
            .map(|id| ResourceIdentifier::new(self.type_name.clone(), id.clone()))
    }
}

/// Primary data: a single resource or a collection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResourceData {
    /// A single resource object.
    Single(Resource),
    /// A collection of resource objects.
    Collection(Vec<Resource>),
}

/// A wire error object rendered into a document's `errors` section.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorObject {
    /// The HTTP status code, stringified per the wire format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// An application-specific error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// A short, occurrence-independent summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// A detailed, occurrence-specific explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&DispatchError> for ErrorObject {
    fn from(error: &DispatchError) -> Self {
        Self {
            status: Some(error.status_code().to_string()),
            code: None,
            title: None,
            detail: Some(error.to_string()),
        }
    }
}

/// The top-level JSON:API envelope.
///
/// Constructed fresh per request by the document mapper; controllers may
/// collapse an absent data section into an explicit null before handing
/// the document to the response envelope.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    data: Nullable<ResourceData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    included: Option<Vec<Resource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ErrorObject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<Value>,
}

impl Document {
    /// An empty document with an absent data section.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A document whose primary data is a single resource.
    #[must_use]
    pub const fn of_single(resource: Resource) -> Self {
        Self {
            data: Nullable::Present(ResourceData::Single(resource)),
            included: None,
            errors: None,
            meta: None,
        }
    }

    /// A document whose primary data is a resource collection.
    #[must_use]
    pub const fn of_collection(resources: Vec<Resource>) -> Self {
        Self {
            data: Nullable::Present(ResourceData::Collection(resources)),
            included: None,
            errors: None,
            meta: None,
        }
    }

    /// A data-less document carrying only an errors section, the shape a
    /// boundary layer serves for a failed request.
    #[must_use]
    pub fn of_errors(errors: Vec<ErrorObject>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::default()
        }
    }

    /// The primary data section.
    #[must_use]
    pub const fn data(&self) -> &Nullable<ResourceData> {
        &self.data
    }

    /// Replaces the primary data section.
    pub fn set_data(&mut self, data: Nullable<ResourceData>) {
        self.data = data;
    }

    /// Whether a data section is on the wire at all; explicit null counts,
    /// an absent section does not.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        !self.data.is_absent()
    }

    /// The single primary resource, if the data section holds exactly one.
    #[must_use]
    pub const fn single_resource(&self) -> Option<&Resource> {
        match self.data.value() {
            Some(ResourceData::Single(resource)) => Some(resource),
            _ => None,
        }
    }

    /// The included-resources section.
    #[must_use]
    pub fn included(&self) -> Option<&[Resource]> {
        self.included.as_deref()
    }

    /// Replaces the included-resources section.
    pub fn set_included(&mut self, included: Vec<Resource>) {
        self.included = Some(included);
    }

    /// The errors section.
    #[must_use]
    pub fn errors(&self) -> Option<&[ErrorObject]> {
        self.errors.as_deref()
    }

    /// Replaces the errors section.
    pub fn set_errors(&mut self, errors: Vec<ErrorObject>) {
        self.errors = Some(errors);
    }

    /// The opaque meta section, if any.
    #[must_use]
    pub const fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    /// Replaces the opaque meta section.
    pub fn set_meta(&mut self, meta: Value) {
        self.meta = Some(meta);
    }
}

// Verify document types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Document>();
    assert_send_sync::<Resource>();
    assert_send_sync::<Nullable<ResourceData>>();
};
