//! Entity graph element types: entity types, properties, keys, foreign keys.
//!
//! Everything here is produced by [`crate::model::ModelBuilder`] and is
//! read-only once the [`crate::model::Model`] exists.

use serde::{Deserialize, Serialize};

use crate::model::Model;
use crate::model::types::{NativeTypeId, NotificationContract};

// =============================================================================
// IDENTITIES
// =============================================================================

/// Identity of an entity type within its model. Ordered by insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityTypeId(pub(crate) usize);

/// A declared key, addressed by its declaring entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRef {
    pub entity: EntityTypeId,
    pub key: usize,
}

/// A foreign key, addressed by its declaring (dependent) entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKeyRef {
    pub entity: EntityTypeId,
    pub index: usize,
}

// =============================================================================
// CONFIGURATION SOURCE
// =============================================================================

/// Provenance of a model element. Variants are ordered by precedence, so
/// `Explicit > DataAnnotation > Convention`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigurationSource {
    Convention,
    DataAnnotation,
    Explicit,
}

impl ConfigurationSource {
    /// Whether configuration from `self` may replace configuration that came
    /// from `existing`. Anything overrides an absent source.
    pub fn overrides(self, existing: Option<ConfigurationSource>) -> bool {
        match existing {
            Some(existing) => self >= existing,
            None => true,
        }
    }
}

// =============================================================================
// CHANGE TRACKING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChangeTrackingStrategy {
    /// Original values are snapshotted and compared on detect-changes.
    #[default]
    Snapshot,
    ChangedNotifications,
    ChangingAndChangedNotifications,
    ChangingAndChangedNotificationsWithOriginalValues,
}

impl ChangeTrackingStrategy {
    pub fn requires_changed_notifications(self) -> bool {
        self != ChangeTrackingStrategy::Snapshot
    }

    pub fn requires_changing_notifications(self) -> bool {
        matches!(
            self,
            ChangeTrackingStrategy::ChangingAndChangedNotifications
                | ChangeTrackingStrategy::ChangingAndChangedNotificationsWithOriginalValues
        )
    }
}

impl std::fmt::Display for ChangeTrackingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeTrackingStrategy::Snapshot => write!(f, "Snapshot"),
            ChangeTrackingStrategy::ChangedNotifications => write!(f, "ChangedNotifications"),
            ChangeTrackingStrategy::ChangingAndChangedNotifications => {
                write!(f, "ChangingAndChangedNotifications")
            }
            ChangeTrackingStrategy::ChangingAndChangedNotificationsWithOriginalValues => {
                write!(f, "ChangingAndChangedNotificationsWithOriginalValues")
            }
        }
    }
}

// =============================================================================
// PROPERTIES, KEYS, FOREIGN KEYS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// Declared type, used when property lists are formatted with types.
    pub type_name: String,
    /// No backing field on the native type.
    pub is_shadow: bool,
    /// Rendered as `type?` in typed property lists.
    pub is_nullable: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Property {
            name: name.into(),
            type_name: type_name.into(),
            is_shadow: false,
            is_nullable: false,
        }
    }

    pub fn shadow(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Property {
            is_shadow: true,
            ..Property::new(name, type_name)
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }
}

/// An ordered, non-empty list of properties of the declaring entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Indices into the declaring entity type's properties.
    pub properties: Vec<usize>,
    pub configuration_source: Option<ConfigurationSource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub name: String,
    /// Set for collection navigations: the native type of the collection.
    pub collection_type: Option<NativeTypeId>,
}

impl Navigation {
    pub fn reference(name: impl Into<String>) -> Self {
        Navigation {
            name: name.into(),
            collection_type: None,
        }
    }

    pub fn collection(name: impl Into<String>, collection_type: NativeTypeId) -> Self {
        Navigation {
            name: name.into(),
            collection_type: Some(collection_type),
        }
    }

    pub fn is_collection(&self) -> bool {
        self.collection_type.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Indices into the dependent (declaring) entity type's properties.
    pub properties: Vec<usize>,
    pub principal: KeyRef,
    pub dependent_to_principal: Option<Navigation>,
    pub principal_to_dependent: Option<Navigation>,
}

impl ForeignKey {
    pub fn new(properties: Vec<usize>, principal: KeyRef) -> Self {
        ForeignKey {
            properties,
            principal,
            dependent_to_principal: None,
            principal_to_dependent: None,
        }
    }

    pub fn with_dependent_to_principal(mut self, navigation: Navigation) -> Self {
        self.dependent_to_principal = Some(navigation);
        self
    }

    pub fn with_principal_to_dependent(mut self, navigation: Navigation) -> Self {
        self.principal_to_dependent = Some(navigation);
        self
    }
}

// =============================================================================
// ENTITY TYPE
// =============================================================================

#[derive(Debug, Clone)]
pub struct EntityType {
    pub(crate) id: EntityTypeId,
    pub(crate) name: String,
    pub(crate) native_type: Option<NativeTypeId>,
    pub(crate) properties: Vec<Property>,
    pub(crate) keys: Vec<Key>,
    pub(crate) primary_key: Option<usize>,
    pub(crate) foreign_keys: Vec<ForeignKey>,
    pub(crate) base_type: Option<EntityTypeId>,
    pub(crate) derived_types: Vec<EntityTypeId>,
    pub(crate) change_tracking_strategy: Option<ChangeTrackingStrategy>,
}

impl EntityType {
    pub(crate) fn new(id: EntityTypeId, name: String, native_type: Option<NativeTypeId>) -> Self {
        EntityType {
            id,
            name,
            native_type,
            properties: Vec::new(),
            keys: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            base_type: None,
            derived_types: Vec::new(),
            change_tracking_strategy: None,
        }
    }

    pub fn id(&self) -> EntityTypeId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// `None` for shadow entity types.
    pub fn native_type(&self) -> Option<NativeTypeId> {
        self.native_type
    }

    pub fn has_native_type(&self) -> bool {
        self.native_type.is_some()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    /// Keys introduced on this type. Inherited keys are not included.
    pub fn declared_keys(&self) -> &[Key] {
        &self.keys
    }

    /// The primary key declared on this type, if any. Derived types inherit
    /// theirs; see [`Model::find_primary_key`].
    pub fn declared_primary_key(&self) -> Option<KeyRef> {
        self.primary_key.map(|key| KeyRef {
            entity: self.id,
            key,
        })
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    pub fn base_type(&self) -> Option<EntityTypeId> {
        self.base_type
    }

    /// Entity types whose mapped base type is this one (direct children only).
    pub fn derived_types(&self) -> &[EntityTypeId] {
        &self.derived_types
    }

    /// The strategy set on this entity type, without model-level defaulting.
    pub fn change_tracking_strategy(&self) -> Option<ChangeTrackingStrategy> {
        self.change_tracking_strategy
    }

    /// Check that this entity type's native type and navigations support
    /// `strategy`. Returns the failure message, if any.
    pub fn check_change_tracking_strategy(
        &self,
        model: &Model,
        strategy: ChangeTrackingStrategy,
    ) -> Option<String> {
        let native = self.native_type?;
        let types = model.types();

        if strategy.requires_changed_notifications()
            && !types.implements(native, NotificationContract::PropertyChanged)
        {
            return Some(contract_missing(
                &self.name,
                strategy,
                NotificationContract::PropertyChanged,
            ));
        }

        if strategy.requires_changing_notifications()
            && !types.implements(native, NotificationContract::PropertyChanging)
        {
            return Some(contract_missing(
                &self.name,
                strategy,
                NotificationContract::PropertyChanging,
            ));
        }

        if strategy.requires_changed_notifications() {
            for navigation in model.navigations(self.id) {
                let Some(collection) = navigation.collection_type else {
                    continue;
                };
                if !types.implements(collection, NotificationContract::CollectionChanged) {
                    return Some(format!(
                        "The collection type being used for navigation property '{}' on entity type '{}' \
                         does not implement the '{}' notification contract. Any entity type configured \
                         to use the '{}' change tracking strategy must use collections that implement it.",
                        navigation.name,
                        self.name,
                        NotificationContract::CollectionChanged,
                        strategy
                    ));
                }
            }
        }

        None
    }
}

fn contract_missing(
    entity: &str,
    strategy: ChangeTrackingStrategy,
    contract: NotificationContract,
) -> String {
    format!(
        "The entity type '{}' is configured to use the '{}' change tracking strategy \
         but does not implement the required '{}' notification contract.",
        entity, strategy, contract
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convention_only_overrides_convention() {
        let convention = ConfigurationSource::Convention;
        assert!(convention.overrides(None));
        assert!(convention.overrides(Some(ConfigurationSource::Convention)));
        assert!(!convention.overrides(Some(ConfigurationSource::DataAnnotation)));
        assert!(!convention.overrides(Some(ConfigurationSource::Explicit)));
        assert!(ConfigurationSource::Explicit.overrides(Some(ConfigurationSource::DataAnnotation)));
    }

    #[test]
    fn strategy_notification_requirements() {
        use ChangeTrackingStrategy::*;
        assert!(!Snapshot.requires_changed_notifications());
        assert!(ChangedNotifications.requires_changed_notifications());
        assert!(!ChangedNotifications.requires_changing_notifications());
        assert!(ChangingAndChangedNotifications.requires_changing_notifications());
        assert!(ChangingAndChangedNotificationsWithOriginalValues.requires_changing_notifications());
    }
}
