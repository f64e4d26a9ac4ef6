//! Programmatic model construction.
//!
//! The builder only checks that the graph is well formed (references resolve,
//! keys are non-empty, the mapped hierarchy is acyclic). Modelling rules are the
//! validator's job.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::ModelBuildError;
use crate::model::{
    ChangeTrackingStrategy, ConfigurationSource, EntityType, EntityTypeId, ForeignKey,
    ForeignKeyRef, Key, KeyRef, Model, NativeTypeId, Property, TypeRegistry,
};

pub struct ModelBuilder {
    types: TypeRegistry,
    entity_types: Vec<EntityType>,
    default_change_tracking_strategy: Option<ChangeTrackingStrategy>,
    /// First misuse seen while building; reported by `build`.
    error: Option<ModelBuildError>,
}

impl ModelBuilder {
    pub fn new(types: TypeRegistry) -> Self {
        ModelBuilder {
            types,
            entity_types: Vec::new(),
            default_change_tracking_strategy: None,
            error: None,
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Add an entity type. Pass `None` for a shadow entity type.
    pub fn entity_type(
        &mut self,
        name: impl Into<String>,
        native_type: Option<NativeTypeId>,
    ) -> EntityTypeId {
        let id = EntityTypeId(self.entity_types.len());
        self.entity_types
            .push(EntityType::new(id, name.into(), native_type));
        id
    }

    /// Add a property and return its index on the entity type.
    pub fn property(&mut self, entity: EntityTypeId, property: Property) -> usize {
        match self.entity_mut(entity) {
            Some(e) => {
                e.properties.push(property);
                e.properties.len() - 1
            }
            None => 0,
        }
    }

    /// Declare a key on `entity` over the given property indices.
    pub fn key(
        &mut self,
        entity: EntityTypeId,
        properties: Vec<usize>,
        source: ConfigurationSource,
    ) -> KeyRef {
        let key = match self.entity_mut(entity) {
            Some(e) => {
                e.keys.push(Key {
                    properties,
                    configuration_source: Some(source),
                });
                e.keys.len() - 1
            }
            None => 0,
        };
        KeyRef { entity, key }
    }

    pub fn primary_key(&mut self, key: KeyRef) {
        if let Some(e) = self.entity_mut(key.entity) {
            e.primary_key = Some(key.key);
        }
    }

    /// Declare a foreign key on the dependent entity type.
    pub fn foreign_key(&mut self, dependent: EntityTypeId, foreign_key: ForeignKey) -> ForeignKeyRef {
        let index = match self.entity_mut(dependent) {
            Some(e) => {
                e.foreign_keys.push(foreign_key);
                e.foreign_keys.len() - 1
            }
            None => 0,
        };
        ForeignKeyRef {
            entity: dependent,
            index,
        }
    }

    pub fn base_type(&mut self, derived: EntityTypeId, base: EntityTypeId) {
        if let Some(e) = self.entity_mut(derived) {
            e.base_type = Some(base);
        }
    }

    pub fn change_tracking_strategy(&mut self, entity: EntityTypeId, strategy: ChangeTrackingStrategy) {
        if let Some(e) = self.entity_mut(entity) {
            e.change_tracking_strategy = Some(strategy);
        }
    }

    pub fn default_change_tracking_strategy(&mut self, strategy: ChangeTrackingStrategy) {
        self.default_change_tracking_strategy = Some(strategy);
    }

    pub fn build(self) -> Result<Model, ModelBuildError> {
        let ModelBuilder {
            types,
            mut entity_types,
            default_change_tracking_strategy,
            error,
        } = self;
        if let Some(err) = error {
            return Err(err);
        }

        check_references(&types, &entity_types)?;
        check_acyclic_inheritance(&entity_types)?;

        // Derived data
        let mut by_native_type: HashMap<NativeTypeId, EntityTypeId> = HashMap::new();
        for entity in &entity_types {
            if let Some(native) = entity.native_type {
                if let Some(&first) = by_native_type.get(&native) {
                    return Err(ModelBuildError::DuplicateNativeType {
                        native_type: types.name(native).to_string(),
                        first: entity_types[first.0].name.clone(),
                        second: entity.name.clone(),
                    });
                }
                by_native_type.insert(native, entity.id);
            }
        }

        let mut referencing: HashMap<KeyRef, Vec<ForeignKeyRef>> = HashMap::new();
        for entity in &entity_types {
            for (index, fk) in entity.foreign_keys.iter().enumerate() {
                referencing
                    .entry(fk.principal)
                    .or_default()
                    .push(ForeignKeyRef {
                        entity: entity.id,
                        index,
                    });
            }
        }

        let edges: Vec<(EntityTypeId, EntityTypeId)> = entity_types
            .iter()
            .filter_map(|e| e.base_type.map(|b| (b, e.id)))
            .collect();
        for (base, derived) in edges {
            entity_types[base.0].derived_types.push(derived);
        }

        Ok(Model {
            types,
            entity_types,
            by_native_type,
            referencing,
            default_change_tracking_strategy,
        })
    }

    fn entity_mut(&mut self, id: EntityTypeId) -> Option<&mut EntityType> {
        let found = self.entity_types.get_mut(id.0);
        if found.is_none() && self.error.is_none() {
            self.error = Some(ModelBuildError::UnknownEntityType { index: id.0 });
        }
        found
    }
}

fn check_references(types: &TypeRegistry, entity_types: &[EntityType]) -> Result<(), ModelBuildError> {
    let count = entity_types.len();

    for entity in entity_types {
        if let Some(native) = entity.native_type {
            if !types.contains(native) {
                return Err(ModelBuildError::UnknownNativeType {
                    entity: entity.name.clone(),
                });
            }
        }

        if let Some(base) = entity.base_type {
            if base.0 >= count {
                return Err(ModelBuildError::UnknownEntityType { index: base.0 });
            }
        }

        for (index, key) in entity.keys.iter().enumerate() {
            if key.properties.is_empty() {
                return Err(ModelBuildError::EmptyKey {
                    entity: entity.name.clone(),
                    key: index,
                });
            }
            check_property_indices(entity, &key.properties)?;
        }

        if let Some(pk) = entity.primary_key {
            if pk >= entity.keys.len() {
                return Err(ModelBuildError::UnknownKey {
                    entity: entity.name.clone(),
                    key: pk,
                });
            }
        }

        for fk in &entity.foreign_keys {
            check_property_indices(entity, &fk.properties)?;

            let Some(principal) = entity_types.get(fk.principal.entity.0) else {
                return Err(ModelBuildError::UnknownEntityType {
                    index: fk.principal.entity.0,
                });
            };
            let Some(principal_key) = principal.keys.get(fk.principal.key) else {
                return Err(ModelBuildError::UnknownKey {
                    entity: principal.name.clone(),
                    key: fk.principal.key,
                });
            };
            if principal_key.properties.len() != fk.properties.len() {
                return Err(ModelBuildError::ForeignKeyArity {
                    dependent: entity.name.clone(),
                    principal: principal.name.clone(),
                    expected: principal_key.properties.len(),
                    found: fk.properties.len(),
                });
            }
        }
    }

    Ok(())
}

fn check_property_indices(entity: &EntityType, indices: &[usize]) -> Result<(), ModelBuildError> {
    match indices.iter().find(|&&i| i >= entity.properties.len()) {
        Some(&index) => Err(ModelBuildError::UnknownProperty {
            entity: entity.name.clone(),
            index,
        }),
        None => Ok(()),
    }
}

fn check_acyclic_inheritance(entity_types: &[EntityType]) -> Result<(), ModelBuildError> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..entity_types.len()).map(|i| graph.add_node(i)).collect();
    for entity in entity_types {
        if let Some(base) = entity.base_type {
            graph.add_edge(nodes[base.0], nodes[entity.id.0], ());
        }
    }

    match toposort(&graph, None) {
        Ok(_) => Ok(()),
        Err(cycle) => Err(ModelBuildError::InheritanceCycle {
            entity: entity_types[graph[cycle.node_id()]].name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (TypeRegistry, NativeTypeId, NativeTypeId) {
        let mut types = TypeRegistry::new();
        let a = types.concrete("A", None);
        let b = types.concrete("B", Some(a));
        (types, a, b)
    }

    #[test]
    fn derived_types_and_referencing_fks_are_indexed() {
        let (types, a_ty, b_ty) = registry();
        let mut builder = ModelBuilder::new(types);
        let a = builder.entity_type("A", Some(a_ty));
        let b = builder.entity_type("B", Some(b_ty));
        builder.base_type(b, a);
        let id = builder.property(a, Property::new("Id", "int"));
        let pk = builder.key(a, vec![id], ConfigurationSource::Convention);
        builder.primary_key(pk);
        let parent_id = builder.property(b, Property::new("ParentId", "int"));
        let fk = builder.foreign_key(b, ForeignKey::new(vec![parent_id], pk));

        let model = builder.build().unwrap();
        assert_eq!(model.entity_type(a).derived_types(), &[b]);
        assert_eq!(model.referencing_foreign_keys(pk), &[fk]);
        assert_eq!(model.find_primary_key(b), Some(pk));
        assert!(model.is_assignable_from(a, b));
        assert!(!model.is_assignable_from(b, a));
        assert_eq!(model.find_entity_type(b_ty).map(|e| e.id()), Some(b));
    }

    #[test]
    fn rejects_empty_key() {
        let (types, a_ty, _) = registry();
        let mut builder = ModelBuilder::new(types);
        let a = builder.entity_type("A", Some(a_ty));
        builder.key(a, vec![], ConfigurationSource::Explicit);
        let err = builder.build().unwrap_err();
        assert!(matches!(err, ModelBuildError::EmptyKey { key: 0, .. }), "{err}");
    }

    #[test]
    fn rejects_inheritance_cycle() {
        let (types, a_ty, b_ty) = registry();
        let mut builder = ModelBuilder::new(types);
        let a = builder.entity_type("A", Some(a_ty));
        let b = builder.entity_type("B", Some(b_ty));
        builder.base_type(a, b);
        builder.base_type(b, a);
        let err = builder.build().unwrap_err();
        assert!(matches!(err, ModelBuildError::InheritanceCycle { .. }), "{err}");
    }

    #[test]
    fn rejects_two_entity_types_on_one_native_type() {
        let (types, a_ty, _) = registry();
        let mut builder = ModelBuilder::new(types);
        builder.entity_type("A", Some(a_ty));
        builder.entity_type("AlsoA", Some(a_ty));
        let err = builder.build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Native type 'A' is mapped by both 'A' and 'AlsoA'"
        );
    }

    #[test]
    fn rejects_foreign_key_arity_mismatch() {
        let (types, a_ty, b_ty) = registry();
        let mut builder = ModelBuilder::new(types);
        let a = builder.entity_type("A", Some(a_ty));
        let b = builder.entity_type("B", Some(b_ty));
        let id = builder.property(a, Property::new("Id", "int"));
        let pk = builder.key(a, vec![id], ConfigurationSource::Convention);
        let x = builder.property(b, Property::new("X", "int"));
        let y = builder.property(b, Property::new("Y", "int"));
        builder.foreign_key(b, ForeignKey::new(vec![x, y], pk));
        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            ModelBuildError::ForeignKeyArity { expected: 1, found: 2, .. }
        ));
    }
}
