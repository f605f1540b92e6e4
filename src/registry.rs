//! Resource registry: type metadata and repository handles.
//!
//! The registry maps a resource-type name to its [`RegistryEntry`]: the
//! type's [`ResourceInformation`] (id field, parent type, declared
//! relationships) and the repository handles that serve it. It is built
//! once at boot through [`RegistryBuilder`], validated, and read-only
//! afterwards, so it is safe for unsynchronized concurrent reads across request
//! tasks.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = ResourceRegistry::builder()
//!     .add_resource(
//!         ResourceInformation::new("tasks", "id", IdKind::Integer)
//!             .with_to_one("project", "projects"),
//!         Arc::new(task_repository),
//!     )
//!     .add_resource(
//!         ResourceInformation::new("projects", "id", IdKind::Integer),
//!         Arc::new(project_repository),
//!     )
//!     .build()?;
//!
//! let entry = registry.entry("tasks").unwrap();
//! assert_eq!(entry.resource_type(), "tasks");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::parser::IdKind;
use crate::repository::{
    RelationshipRepository, RelationshipRepositoryAdapter, ResourceRepository,
    ResourceRepositoryAdapter,
};

/// Errors raised while building the registry at boot.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two resources were registered under the same type name.
    #[error("Resource type '{resource_type}' is registered twice.")]
    DuplicateResourceType {
        /// The duplicated type name.
        resource_type: String,
    },

    /// A resource declares a parent type that is not registered.
    #[error("Resource type '{resource_type}' declares unknown parent type '{parent_type}'.")]
    UnknownParentType {
        /// The declaring resource type.
        resource_type: String,
        /// The missing parent type name.
        parent_type: String,
    },

    /// A relationship points at a target type that is not registered.
    #[error(
        "Relationship '{relationship}' of resource type '{resource_type}' \
         targets unknown type '{target_type}'."
    )]
    UnknownRelationshipTarget {
        /// The declaring resource type.
        resource_type: String,
        /// The relationship name.
        relationship: String,
        /// The missing target type name.
        target_type: String,
    },

    /// A relationship repository was registered for an undeclared relationship.
    #[error(
        "Resource type '{resource_type}' declares no relationship named '{relationship}', \
         but a relationship repository was registered for it."
    )]
    UnknownRelationship {
        /// The resource type the repository was registered under.
        resource_type: String,
        /// The undeclared relationship name.
        relationship: String,
    },
}

/// One declared relationship field of a resource type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipInformation {
    name: String,
    target_type: String,
    collection: bool,
}

impl RelationshipInformation {
    /// The relationship field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resource type the relationship points at.
    #[must_use]
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Whether the relationship is to-many.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        self.collection
    }
}

/// Static metadata of one resource type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceInformation {
    resource_type: String,
    id_field: String,
    id_kind: IdKind,
    parent_type: Option<String>,
    relationships: Vec<RelationshipInformation>,
}

impl ResourceInformation {
    /// Describes a resource type with its id field name and id kind.
    #[must_use]
    pub fn new(
        resource_type: impl Into<String>,
        id_field: impl Into<String>,
        id_kind: IdKind,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id_field: id_field.into(),
            id_kind,
            parent_type: None,
            relationships: Vec::new(),
        }
    }

    /// Declares the single-hop parent resource type.
    #[must_use]
    pub fn with_parent_type(mut self, parent_type: impl Into<String>) -> Self {
        self.parent_type = Some(parent_type.into());
        self
    }

    /// Declares a to-one relationship field.
    #[must_use]
    pub fn with_to_one(mut self, name: impl Into<String>, target_type: impl Into<String>) -> Self {
        self.relationships.push(RelationshipInformation {
            name: name.into(),
            target_type: target_type.into(),
            collection: false,
        });
        self
    }

    /// Declares a to-many relationship field.
    #[must_use]
    pub fn with_to_many(mut self, name: impl Into<String>, target_type: impl Into<String>) -> Self {
        self.relationships.push(RelationshipInformation {
            name: name.into(),
            target_type: target_type.into(),
            collection: true,
        });
        self
    }

    /// The resource type name.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// The name of the id field on the raw domain object.
    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// The declared id kind, used by the shared id parser.
    #[must_use]
    pub const fn id_kind(&self) -> IdKind {
        self.id_kind
    }

    /// The declared single-hop parent type, if any.
    #[must_use]
    pub fn parent_type(&self) -> Option<&str> {
        self.parent_type.as_deref()
    }

    /// All declared relationship fields.
    #[must_use]
    pub fn relationships(&self) -> &[RelationshipInformation] {
        &self.relationships
    }

    /// Looks up one declared relationship by name.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipInformation> {
        self.relationships.iter().find(|rel| rel.name == name)
    }
}

/// Metadata plus repository handles for one registered resource type.
pub struct RegistryEntry {
    information: ResourceInformation,
    repository: Arc<dyn ResourceRepository>,
    relationship_repositories: HashMap<String, Arc<dyn RelationshipRepository>>,
}

impl RegistryEntry {
    /// The static metadata of the resource type.
    #[must_use]
    pub const fn information(&self) -> &ResourceInformation {
        &self.information
    }

    /// The resource type name.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.information.resource_type()
    }

    /// The deferred invocation surface over the resource repository.
    #[must_use]
    pub fn repository(&self) -> ResourceRepositoryAdapter {
        ResourceRepositoryAdapter::new(Arc::clone(&self.repository))
    }

    /// The deferred invocation surface over one relationship repository.
    #[must_use]
    pub fn relationship_repository(&self, name: &str) -> Option<RelationshipRepositoryAdapter> {
        self.relationship_repositories
            .get(name)
            .map(|repository| RelationshipRepositoryAdapter::new(Arc::clone(repository)))
    }

    /// Whether `self` is the declared parent of `other`.
    ///
    /// This is a single-hop check on the declared parent relation, not a
    /// transitive ancestor walk: a hierarchy of three levels passes only
    /// one level deep, matching the registry's declared-relation model.
    #[must_use]
    pub fn is_parent(&self, other: &Self) -> bool {
        other.information.parent_type() == Some(self.resource_type())
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("information", &self.information)
            .field(
                "relationship_repositories",
                &format!("<{} repositories>", self.relationship_repositories.len()),
            )
            .finish_non_exhaustive()
    }
}

/// The boot-time-built, read-only resource registry.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl ResourceRegistry {
    /// Starts a registry builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up the entry registered under a type name.
    #[must_use]
    pub fn entry(&self, resource_type: &str) -> Option<&RegistryEntry> {
        self.entries.get(resource_type)
    }

    /// All registered type names, in no particular order.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

// Verify the registry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceRegistry>();
};

/// Builder collecting registrations before boot-time validation.
#[derive(Default)]
pub struct RegistryBuilder {
    resources: Vec<(ResourceInformation, Arc<dyn ResourceRepository>)>,
    relationship_repositories: Vec<(String, String, Arc<dyn RelationshipRepository>)>,
}

impl RegistryBuilder {
    /// Registers a resource type with its repository.
    #[must_use]
    pub fn add_resource(
        mut self,
        information: ResourceInformation,
        repository: Arc<dyn ResourceRepository>,
    ) -> Self {
        self.resources.push((information, repository));
        self
    }

    /// Registers a relationship repository for one declared relationship.
    #[must_use]
    pub fn add_relationship_repository(
        mut self,
        resource_type: impl Into<String>,
        relationship: impl Into<String>,
        repository: Arc<dyn RelationshipRepository>,
    ) -> Self {
        self.relationship_repositories
            .push((resource_type.into(), relationship.into(), repository));
        self
    }

    /// Validates the registrations and builds the registry.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] for duplicate type names, unknown
    /// parent types, unknown relationship targets, or relationship
    /// repositories registered for undeclared relationships.
    pub fn build(self) -> Result<ResourceRegistry, RegistryError> {
        let mut entries: HashMap<String, RegistryEntry> = HashMap::new();

        for (information, repository) in self.resources {
            let resource_type = information.resource_type().to_string();
            if entries.contains_key(&resource_type) {
                return Err(RegistryError::DuplicateResourceType { resource_type });
            }
            entries.insert(
                resource_type,
                RegistryEntry {
                    information,
                    repository,
                    relationship_repositories: HashMap::new(),
                },
            );
        }

        for entry in entries.values() {
            let information = entry.information();
            if let Some(parent_type) = information.parent_type() {
                if !entries.contains_key(parent_type) {
                    return Err(RegistryError::UnknownParentType {
                        resource_type: information.resource_type().to_string(),
                        parent_type: parent_type.to_string(),
                    });
                }
            }
            for relationship in information.relationships() {
                if !entries.contains_key(relationship.target_type()) {
                    return Err(RegistryError::UnknownRelationshipTarget {
                        resource_type: information.resource_type().to_string(),
                        relationship: relationship.name().to_string(),
                        target_type: relationship.target_type().to_string(),
                    });
                }
            }
        }

        for (resource_type, relationship, repository) in self.relationship_repositories {
            let entry = entries.get_mut(&resource_type).ok_or_else(|| {
                RegistryError::UnknownRelationship {
                    resource_type: resource_type.clone(),
                    relationship: relationship.clone(),
                }
            })?;
            if entry.information.relationship(&relationship).is_none() {
                return Err(RegistryError::UnknownRelationship {
                    resource_type,
                    relationship,
                });
            }
            entry
                .relationship_repositories
                .insert(relationship, repository);
        }

        Ok(ResourceRegistry { entries })
    }
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("resources", &self.resources.len())
            .field(
                "relationship_repositories",
                &self.relationship_repositories.len(),
            )
            .finish()
    }
}
