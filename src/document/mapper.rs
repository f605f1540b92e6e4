//! Mapping repository results into wire documents.
//!
//! The [`DocumentMapper`] turns the raw found objects of a
//! [`JsonApiResponse`] into a [`Document`]: each entity is split into its
//! id, attributes and relationship linkage according to the resource
//! type's registry information, sparse fieldsets from the query adapter
//! are applied, and requested includes are hoisted into the document's
//! `included` section, deduplicated by `(type, id)`. Inclusion and sparse
//! fieldsets are independent: a fieldset that omits a relationship drops
//! its linkage, not the included resources requested through it.
//!
//! [`DocumentMappingConfig`] names the resource type to map under and
//! carries the legacy [`ParameterProvider`] extension point through to
//! custom mapper implementations.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::deferred::DeferredResult;
use crate::document::{
    Document, Linkage, Nullable, Relationship, Resource, ResourceData, ResourceIdentifier,
};
use crate::error::DispatchError;
use crate::query::QueryAdapter;
use crate::registry::{RegistryEntry, ResourceInformation, ResourceRegistry};
use crate::repository::{JsonApiResponse, ResponseData};

/// Legacy extension point resolving values during serialization.
///
/// Carried opaquely through the mapping configuration for custom mapper
/// implementations; the default mapper does not consult it.
pub trait ParameterProvider: Send + Sync {
    /// Resolves one named serialization-time value.
    fn get(&self, key: &str) -> Option<Value>;
}

/// Per-request mapping configuration.
#[derive(Clone, Default)]
pub struct DocumentMappingConfig {
    resource_type: String,
    parameter_provider: Option<Arc<dyn ParameterProvider>>,
}

impl DocumentMappingConfig {
    /// A configuration mapping entities under the given resource type.
    #[must_use]
    pub fn for_type(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            parameter_provider: None,
        }
    }

    /// Attaches the legacy parameter provider.
    #[must_use]
    pub fn with_parameter_provider(
        mut self,
        provider: Option<Arc<dyn ParameterProvider>>,
    ) -> Self {
        self.parameter_provider = provider;
        self
    }

    /// The resource type entities are mapped under.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// The legacy parameter provider, if one was attached.
    #[must_use]
    pub fn parameter_provider(&self) -> Option<&Arc<dyn ParameterProvider>> {
        self.parameter_provider.as_ref()
    }
}

impl std::fmt::Debug for DocumentMappingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentMappingConfig")
            .field("resource_type", &self.resource_type)
            .field(
                "parameter_provider",
                &self.parameter_provider.is_some(),
            )
            .finish()
    }
}

/// Converts repository results into wire documents.
pub trait DocumentMapper: Send + Sync {
    /// Maps a repository result into a document.
    ///
    /// The returned deferred completes with the mapped document, or with
    /// the failure that interrupted mapping; a failure from the upstream
    /// repository never reaches the mapper at all.
    fn to_document(
        &self,
        response: JsonApiResponse,
        query: &QueryAdapter,
        config: &DocumentMappingConfig,
    ) -> DeferredResult<Document>;
}

/// The registry-driven default mapper.
pub struct DefaultDocumentMapper {
    registry: Arc<ResourceRegistry>,
}

impl DefaultDocumentMapper {
    /// Creates a mapper resolving type information from the registry.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }

    fn information(&self, resource_type: &str) -> Result<&ResourceInformation, DispatchError> {
        self.registry
            .entry(resource_type)
            .map(RegistryEntry::information)
            .ok_or_else(|| DispatchError::ResourceNotFound {
                resource_type: resource_type.to_string(),
            })
    }

    fn build(
        &self,
        response: JsonApiResponse,
        query: &QueryAdapter,
        config: &DocumentMappingConfig,
    ) -> Result<Document, DispatchError> {
        let info = self.information(config.resource_type())?;
        let (data, linked, meta) = response.into_parts();

        let mut document = Document::new();
        if let Some(meta) = meta {
            document.set_meta(meta);
        }
        let mut included = Vec::new();
        let mut seen = HashSet::new();

        match data {
            ResponseData::None => {}
            ResponseData::One(value) => {
                let resource = self.map_entity(value, info, query, &mut included, &mut seen)?;
                document.set_data(Nullable::Present(ResourceData::Single(resource)));
            }
            ResponseData::Many(values) => {
                let resources = values
                    .into_iter()
                    .map(|value| self.map_entity(value, info, query, &mut included, &mut seen))
                    .collect::<Result<Vec<_>, _>>()?;
                document.set_data(Nullable::Present(ResourceData::Collection(resources)));
            }
        }

        for (name, objects) in linked {
            if !query.included(&name) {
                continue;
            }
            let relationship = info.relationship(&name).ok_or_else(|| {
                DispatchError::ResourceFieldNotFound {
                    resource_type: info.resource_type().to_string(),
                    field: name.clone(),
                }
            })?;
            let target_info = self.information(relationship.target_type())?;
            for object in objects {
                self.push_included(object, target_info, query, &mut included, &mut seen)?;
            }
        }

        if !included.is_empty() {
            document.set_included(included);
        }
        Ok(document)
    }

    fn map_entity(
        &self,
        value: Value,
        info: &ResourceInformation,
        query: &QueryAdapter,
        included: &mut Vec<Resource>,
        seen: &mut HashSet<ResourceIdentifier>,
    ) -> Result<Resource, DispatchError> {
        let Value::Object(mut fields) = value else {
            return Err(mapping_error(format!(
                "entity of resource type '{}' is not a JSON object",
                info.resource_type()
            )));
        };

        let mut resource = Resource::new(info.resource_type());
        if let Some(id_value) = fields.remove(info.id_field()) {
            let id = id_to_string(&id_value).ok_or_else(|| {
                mapping_error(format!(
                    "id field '{}' of resource type '{}' is not a string or number",
                    info.id_field(),
                    info.resource_type()
                ))
            })?;
            resource.id = Some(id);
        }

        let sparse = query.sparse_fields(info.resource_type());

        for relationship_info in info.relationships() {
            let Some(raw) = fields.remove(relationship_info.name()) else {
                continue;
            };
            let target_info = self.information(relationship_info.target_type())?;
            if sparse.map_or(true, |set| set.contains(relationship_info.name())) {
                let relationship =
                    map_relationship(&raw, info, relationship_info.name(), target_info)?;
                resource
                    .relationships
                    .insert(relationship_info.name().to_string(), relationship);
            }

            // Inclusion is independent of sparse fieldsets: a fieldset may
            // omit the linkage while the related resources are still served.
            if query.included(relationship_info.name()) {
                match raw {
                    Value::Array(objects) => {
                        for object in objects {
                            self.push_included(object, target_info, query, included, seen)?;
                        }
                    }
                    Value::Object(_) => {
                        self.push_included(raw, target_info, query, included, seen)?;
                    }
                    _ => {}
                }
            }
        }

        for (name, value) in fields {
            if sparse.map_or(true, |set| set.contains(&name)) {
                resource.attributes.insert(name, value);
            }
        }

        Ok(resource)
    }

    fn push_included(
        &self,
        object: Value,
        target_info: &ResourceInformation,
        query: &QueryAdapter,
        included: &mut Vec<Resource>,
        seen: &mut HashSet<ResourceIdentifier>,
    ) -> Result<(), DispatchError> {
        let resource = self.map_entity(object, target_info, query, included, seen)?;
        if let Some(identifier) = resource.identifier() {
            if seen.insert(identifier) {
                included.push(resource);
            }
        }
        Ok(())
    }
}

impl DocumentMapper for DefaultDocumentMapper {
    fn to_document(
        &self,
        response: JsonApiResponse,
        query: &QueryAdapter,
        config: &DocumentMappingConfig,
    ) -> DeferredResult<Document> {
        match self.build(response, query, config) {
            Ok(document) => DeferredResult::completed(document),
            Err(error) => DeferredResult::failed(error),
        }
    }
}

impl std::fmt::Debug for DefaultDocumentMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultDocumentMapper").finish_non_exhaustive()
    }
}

fn map_relationship(
    raw: &Value,
    info: &ResourceInformation,
    name: &str,
    target_info: &ResourceInformation,
) -> Result<Relationship, DispatchError> {
    match raw {
        Value::Null => Ok(Relationship::empty_to_one()),
        Value::Object(fields) => Ok(Relationship::linked(Linkage::Single(identifier_of(
            fields,
            target_info,
        )?))),
        Value::Array(objects) => {
            let identifiers = objects
                .iter()
                .map(|object| match object {
                    Value::Object(fields) => identifier_of(fields, target_info),
                    _ => Err(mapping_error(format!(
                        "relationship '{name}' of resource type '{}' contains a non-object entry",
                        info.resource_type()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Relationship::linked(Linkage::Many(identifiers)))
        }
        _ => Err(mapping_error(format!(
            "relationship '{name}' of resource type '{}' must be null, an object or an array",
            info.resource_type()
        ))),
    }
}

fn identifier_of(
    fields: &Map<String, Value>,
    target_info: &ResourceInformation,
) -> Result<ResourceIdentifier, DispatchError> {
    let id_value = fields.get(target_info.id_field()).ok_or_else(|| {
        mapping_error(format!(
            "related object of type '{}' has no id field '{}'",
            target_info.resource_type(),
            target_info.id_field()
        ))
    })?;
    let id = id_to_string(id_value).ok_or_else(|| {
        mapping_error(format!(
            "id field '{}' of resource type '{}' is not a string or number",
            target_info.id_field(),
            target_info.resource_type()
        ))
    })?;
    Ok(ResourceIdentifier::new(target_info.resource_type(), id))
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn mapping_error(detail: String) -> DispatchError {
    DispatchError::Serialization(<serde_json::Error as serde::de::Error>::custom(detail))
}
