//! Native type hierarchy backing mapped entity types.
//!
//! The registry is resolved once, before the model is built, so the inheritance
//! pass never has to reflect over types at validation time. Edges point from a
//! derived type to its base type.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

/// Handle to a native type registered in a [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeTypeId(NodeIndex);

/// Change notification contracts a native type can implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationContract {
    PropertyChanged,
    PropertyChanging,
    CollectionChanged,
}

impl std::fmt::Display for NotificationContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationContract::PropertyChanged => write!(f, "PropertyChanged"),
            NotificationContract::PropertyChanging => write!(f, "PropertyChanging"),
            NotificationContract::CollectionChanged => write!(f, "CollectionChanged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    pub name: String,
    /// Abstract types cannot be instantiated.
    pub is_abstract: bool,
    /// Contracts declared directly on this type (not inherited ones).
    pub contracts: Vec<NotificationContract>,
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    graph: DiGraph<NativeType, ()>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native type. The base, if any, must already be registered,
    /// which keeps the hierarchy acyclic. A base unknown to this registry is
    /// ignored.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        base: Option<NativeTypeId>,
        is_abstract: bool,
        contracts: Vec<NotificationContract>,
    ) -> NativeTypeId {
        let base = base.filter(|b| self.contains(*b));
        let idx = self.graph.add_node(NativeType {
            name: name.into(),
            is_abstract,
            contracts,
        });
        if let Some(base) = base {
            self.graph.add_edge(idx, base.0, ());
        }
        NativeTypeId(idx)
    }

    /// Shorthand for a concrete type without notification contracts.
    pub fn concrete(&mut self, name: impl Into<String>, base: Option<NativeTypeId>) -> NativeTypeId {
        self.register(name, base, false, vec![])
    }

    /// Shorthand for an abstract type without notification contracts.
    pub fn abstract_type(
        &mut self,
        name: impl Into<String>,
        base: Option<NativeTypeId>,
    ) -> NativeTypeId {
        self.register(name, base, true, vec![])
    }

    pub fn get(&self, id: NativeTypeId) -> Option<&NativeType> {
        self.graph.node_weight(id.0)
    }

    pub fn contains(&self, id: NativeTypeId) -> bool {
        self.graph.node_weight(id.0).is_some()
    }

    pub fn name(&self, id: NativeTypeId) -> &str {
        self.get(id).map(|t| t.name.as_str()).unwrap_or("<unknown>")
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn base_of(&self, id: NativeTypeId) -> Option<NativeTypeId> {
        self.graph
            .neighbors_directed(id.0, Direction::Outgoing)
            .next()
            .map(NativeTypeId)
    }

    /// Walk the base-type chain upward, nearest ancestor first. `id` itself is
    /// not yielded.
    pub fn ancestors(&self, id: NativeTypeId) -> Ancestors<'_> {
        Ancestors {
            registry: self,
            next: self.base_of(id),
        }
    }

    pub fn is_instantiable(&self, id: NativeTypeId) -> bool {
        self.get(id).is_some_and(|t| !t.is_abstract)
    }

    /// True when `id` or any of its ancestors declares `contract`.
    pub fn implements(&self, id: NativeTypeId, contract: NotificationContract) -> bool {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|ty| self.get(ty))
            .any(|ty| ty.contracts.contains(&contract))
    }
}

pub struct Ancestors<'a> {
    registry: &'a TypeRegistry,
    next: Option<NativeTypeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NativeTypeId;

    fn next(&mut self) -> Option<NativeTypeId> {
        let current = self.next?;
        self.next = self.registry.base_of(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestors_walk_nearest_first() {
        let mut types = TypeRegistry::new();
        let animal = types.abstract_type("Animal", None);
        let cat = types.concrete("Cat", Some(animal));
        let lion = types.concrete("Lion", Some(cat));

        let chain: Vec<_> = types.ancestors(lion).collect();
        assert_eq!(chain, vec![cat, animal]);
        assert_eq!(types.ancestors(animal).count(), 0);
    }

    #[test]
    fn contracts_are_inherited() {
        let mut types = TypeRegistry::new();
        let base = types.register(
            "Notifying",
            None,
            true,
            vec![NotificationContract::PropertyChanged],
        );
        let derived = types.concrete("Order", Some(base));

        assert!(types.implements(derived, NotificationContract::PropertyChanged));
        assert!(!types.implements(derived, NotificationContract::PropertyChanging));
        assert!(!types.is_instantiable(base));
        assert!(types.is_instantiable(derived));
    }

    #[test]
    fn base_from_another_registry_is_ignored() {
        let mut other = TypeRegistry::new();
        other.concrete("A", None);
        let foreign = other.concrete("B", None);

        let mut types = TypeRegistry::new();
        let order = types.concrete("Order", Some(foreign));

        assert_eq!(types.len(), 1);
        assert_eq!(types.base_of(order), None);
    }
}
