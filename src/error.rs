//! Diagnostic types shared by the model builder and the validator.

use serde::Serialize;
use thiserror::Error;

/// Stable identity of every diagnostic the validator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    ShadowEntity,
    EntityRequiresKey,
    ReferencedShadowKey,
    InconsistentInheritance,
    AbstractLeafEntityType,
    ChangeTrackingStrategy,
    ShadowKey,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::ShadowEntity => "MV001",
            DiagnosticKind::EntityRequiresKey => "MV002",
            DiagnosticKind::ReferencedShadowKey => "MV003",
            DiagnosticKind::InconsistentInheritance => "MV004",
            DiagnosticKind::AbstractLeafEntityType => "MV005",
            DiagnosticKind::ChangeTrackingStrategy => "MV006",
            DiagnosticKind::ShadowKey => "MV101",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::ShadowEntity => write!(f, "ShadowEntity"),
            DiagnosticKind::EntityRequiresKey => write!(f, "EntityRequiresKey"),
            DiagnosticKind::ReferencedShadowKey => write!(f, "ReferencedShadowKey"),
            DiagnosticKind::InconsistentInheritance => write!(f, "InconsistentInheritance"),
            DiagnosticKind::AbstractLeafEntityType => write!(f, "AbstractLeafEntityType"),
            DiagnosticKind::ChangeTrackingStrategy => write!(f, "ChangeTrackingStrategy"),
            DiagnosticKind::ShadowKey => write!(f, "ShadowKey"),
        }
    }
}

/// A fatal validation failure. Validation stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(
        "The entity type '{entity}' does not have a corresponding native type. \
         All entity types must have a native type."
    )]
    ShadowEntity { entity: String },

    #[error("The entity type '{entity}' requires a primary key to be defined.")]
    EntityRequiresKey { entity: String },

    #[error(
        "The relationship from '{dependent}' to '{principal}' with foreign key properties \
         {foreign_key_properties} cannot target the primary key {principal_key_properties} \
         because it is not compatible. Configure a principal key or a set of compatible \
         foreign key properties for this relationship."
    )]
    ReferencedShadowKey {
        dependent: String,
        principal: String,
        foreign_key_properties: String,
        principal_key_properties: String,
    },

    #[error(
        "The entity type '{entity}' should derive from '{base}' to reflect the hierarchy \
         of the corresponding native types."
    )]
    InconsistentInheritance { entity: String, base: String },

    #[error(
        "The corresponding native type for entity type '{entity}' cannot be instantiated, \
         and there is no derived entity type in the model that corresponds to a concrete \
         native type."
    )]
    AbstractLeafEntityType { entity: String },

    /// Message produced by the entity type's own change-tracking self-check.
    #[error("{0}")]
    ChangeTrackingStrategy(String),

    /// A warning escalated by `WarningBehavior::Throw`.
    #[error("{}", .0.message)]
    WarningAsError(ValidationWarning),
}

impl ValidationError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ValidationError::ShadowEntity { .. } => DiagnosticKind::ShadowEntity,
            ValidationError::EntityRequiresKey { .. } => DiagnosticKind::EntityRequiresKey,
            ValidationError::ReferencedShadowKey { .. } => DiagnosticKind::ReferencedShadowKey,
            ValidationError::InconsistentInheritance { .. } => {
                DiagnosticKind::InconsistentInheritance
            }
            ValidationError::AbstractLeafEntityType { .. } => {
                DiagnosticKind::AbstractLeafEntityType
            }
            ValidationError::ChangeTrackingStrategy(_) => DiagnosticKind::ChangeTrackingStrategy,
            ValidationError::WarningAsError(w) => w.kind,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

/// A non-fatal finding. Validation continues after it is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub kind: DiagnosticKind,
    pub message: String,
    /// The entity type the warning is about.
    pub entity: String,
}

impl ValidationWarning {
    pub fn shadow_key(entity: &str, key_properties: &str) -> Self {
        ValidationWarning {
            kind: DiagnosticKind::ShadowKey,
            message: format!(
                "The key {} on entity type '{}' contains properties in shadow state: {}.",
                key_properties, entity, key_properties
            ),
            entity: entity.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

/// Structural problems found while assembling a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelBuildError {
    #[error("Entity type #{index} does not belong to this model")]
    UnknownEntityType { index: usize },

    #[error("Entity type '{entity}' is backed by a native type missing from the registry")]
    UnknownNativeType { entity: String },

    #[error("Entity type '{entity}' has no property #{index}")]
    UnknownProperty { entity: String, index: usize },

    #[error("Entity type '{entity}' has no key #{key}")]
    UnknownKey { entity: String, key: usize },

    #[error("Key #{key} on entity type '{entity}' has no properties")]
    EmptyKey { entity: String, key: usize },

    #[error(
        "Foreign key from '{dependent}' to '{principal}' has {found} properties, \
         but the principal key has {expected}"
    )]
    ForeignKeyArity {
        dependent: String,
        principal: String,
        expected: usize,
        found: usize,
    },

    #[error("Native type '{native_type}' is mapped by both '{first}' and '{second}'")]
    DuplicateNativeType {
        native_type: String,
        first: String,
        second: String,
    },

    #[error("Entity type '{entity}' is part of a base type cycle")]
    InheritanceCycle { entity: String },
}
