//! Entity graph model: the read-only view the validator inspects.
//!
//! A `Model` owns its entity types; entity types own their properties, keys and
//! declared foreign keys. Lookups that need the whole graph (effective primary
//! key, referencing foreign keys, native-type lookup) live here.

pub mod builder;
pub mod entity;
pub mod format;
pub mod types;

pub use builder::ModelBuilder;
pub use entity::*;
pub use types::{NativeType, NativeTypeId, NotificationContract, TypeRegistry};

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Model {
    types: TypeRegistry,
    entity_types: Vec<EntityType>,
    by_native_type: HashMap<NativeTypeId, EntityTypeId>,
    /// Foreign keys targeting each key, in entity enumeration order.
    referencing: HashMap<KeyRef, Vec<ForeignKeyRef>>,
    default_change_tracking_strategy: Option<ChangeTrackingStrategy>,
}

impl Model {
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// All entity types in insertion order.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.entity_types.iter()
    }

    pub fn entity_type_count(&self) -> usize {
        self.entity_types.len()
    }

    pub fn get(&self, id: EntityTypeId) -> Option<&EntityType> {
        self.entity_types.get(id.0)
    }

    /// Panics if `id` did not come from this model.
    pub(crate) fn entity_type(&self, id: EntityTypeId) -> &EntityType {
        &self.entity_types[id.0]
    }

    pub fn find_entity_type(&self, native: NativeTypeId) -> Option<&EntityType> {
        self.by_native_type
            .get(&native)
            .map(|id| self.entity_type(*id))
    }

    /// The mapped base-type chain of `id`, starting with `id` itself.
    pub fn base_chain(&self, id: EntityTypeId) -> impl Iterator<Item = &EntityType> {
        std::iter::successors(self.get(id), |e| e.base_type.and_then(|b| self.get(b)))
    }

    /// The nearest primary key along the mapped base chain.
    pub fn find_primary_key(&self, id: EntityTypeId) -> Option<KeyRef> {
        self.base_chain(id).find_map(|e| e.declared_primary_key())
    }

    /// True when `derived` is `base` or maps a descendant of it.
    pub fn is_assignable_from(&self, base: EntityTypeId, derived: EntityTypeId) -> bool {
        self.base_chain(derived).any(|e| e.id == base)
    }

    pub fn key(&self, key: KeyRef) -> Option<&Key> {
        self.get(key.entity)?.keys.get(key.key)
    }

    pub fn foreign_key(&self, fk: ForeignKeyRef) -> Option<&ForeignKey> {
        self.get(fk.entity)?.foreign_keys.get(fk.index)
    }

    /// Foreign keys whose principal is `key`.
    pub fn referencing_foreign_keys(&self, key: KeyRef) -> &[ForeignKeyRef] {
        self.referencing
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn key_properties(&self, key: KeyRef) -> Vec<&Property> {
        let Some(entity) = self.get(key.entity) else {
            return vec![];
        };
        let Some(key) = entity.keys.get(key.key) else {
            return vec![];
        };
        key.properties
            .iter()
            .filter_map(|&i| entity.properties.get(i))
            .collect()
    }

    pub fn foreign_key_properties(&self, fk: ForeignKeyRef) -> Vec<&Property> {
        let Some(entity) = self.get(fk.entity) else {
            return vec![];
        };
        let Some(foreign_key) = entity.foreign_keys.get(fk.index) else {
            return vec![];
        };
        foreign_key
            .properties
            .iter()
            .filter_map(|&i| entity.properties.get(i))
            .collect()
    }

    /// Navigations on `id`: dependent-to-principal navigations of its declared
    /// foreign keys, then principal-to-dependent navigations of foreign keys
    /// targeting its declared keys.
    pub fn navigations(&self, id: EntityTypeId) -> Vec<&Navigation> {
        let Some(entity) = self.get(id) else {
            return vec![];
        };

        let mut navigations: Vec<&Navigation> = entity
            .foreign_keys
            .iter()
            .filter_map(|fk| fk.dependent_to_principal.as_ref())
            .collect();

        for key in 0..entity.keys.len() {
            let key = KeyRef { entity: id, key };
            for fk in self.referencing_foreign_keys(key) {
                if let Some(nav) = self
                    .foreign_key(*fk)
                    .and_then(|f| f.principal_to_dependent.as_ref())
                {
                    navigations.push(nav);
                }
            }
        }

        navigations
    }

    pub fn default_change_tracking_strategy(&self) -> Option<ChangeTrackingStrategy> {
        self.default_change_tracking_strategy
    }

    /// The entity's own strategy, else the model default, else snapshot.
    pub fn effective_change_tracking_strategy(&self, id: EntityTypeId) -> ChangeTrackingStrategy {
        self.get(id)
            .and_then(|e| e.change_tracking_strategy)
            .or(self.default_change_tracking_strategy)
            .unwrap_or_default()
    }
}
