//! Mapped inheritance must agree with the native type hierarchy.
//!
//! For each entity type, the nearest native ancestor that is itself mapped has
//! to be a mapped ancestor of the entity type too. That ancestor is verified
//! before the entity type is finished, and each entity type is verified once.
//! Abstract native types must have at least one mapped derived type.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::model::{EntityType, EntityTypeId, Model};
use crate::validate::ValidationContext;

enum Frame {
    Enter(EntityTypeId),
    Exit(EntityTypeId),
}

pub fn ensure_native_inheritance(
    model: &Model,
    _cx: &mut ValidationContext<'_>,
) -> Result<(), ValidationError> {
    let mut verified = HashSet::new();
    for entity in model.entity_types() {
        verify(model, entity.id(), &mut verified)?;
    }
    Ok(())
}

/// Explicit-stack walk; a base type is entered after its derived type's
/// consistency check and exits before the derived type does.
fn verify(
    model: &Model,
    start: EntityTypeId,
    verified: &mut HashSet<EntityTypeId>,
) -> Result<(), ValidationError> {
    let mut stack = vec![Frame::Enter(start)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(id) => {
                if verified.contains(&id) {
                    continue;
                }
                let entity = model.entity_type(id);
                stack.push(Frame::Exit(id));

                if let Some(base) = nearest_mapped_ancestor(model, entity) {
                    if !model.is_assignable_from(base.id(), id) {
                        return Err(ValidationError::InconsistentInheritance {
                            entity: entity.display_name().to_string(),
                            base: base.display_name().to_string(),
                        });
                    }
                    stack.push(Frame::Enter(base.id()));
                }
            }
            Frame::Exit(id) => {
                let entity = model.entity_type(id);
                let abstract_native = entity
                    .native_type()
                    .is_some_and(|ty| !model.types().is_instantiable(ty));
                if abstract_native && entity.derived_types().is_empty() {
                    return Err(ValidationError::AbstractLeafEntityType {
                        entity: entity.display_name().to_string(),
                    });
                }
                verified.insert(id);
            }
        }
    }

    Ok(())
}

fn nearest_mapped_ancestor<'m>(model: &'m Model, entity: &EntityType) -> Option<&'m EntityType> {
    let native = entity.native_type()?;
    model
        .types()
        .ancestors(native)
        .find_map(|ty| model.find_entity_type(ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfigurationSource, ModelBuilder, Property, TypeRegistry};
    use crate::validate::{DiscardSink, ValidatorOptions};

    fn run(model: &Model) -> Result<(), ValidationError> {
        let options = ValidatorOptions::default();
        let mut cx = ValidationContext::new(&DiscardSink, &options);
        ensure_native_inheritance(model, &mut cx)
    }

    fn keyed(builder: &mut ModelBuilder, id: EntityTypeId) {
        let p = builder.property(id, Property::new("Id", "int"));
        let key = builder.key(id, vec![p], ConfigurationSource::Convention);
        builder.primary_key(key);
    }

    #[test]
    fn skipping_an_unmapped_native_level_is_consistent() {
        let mut types = TypeRegistry::new();
        let a = types.concrete("A", None);
        let b = types.concrete("B", Some(a));
        let c = types.concrete("C", Some(b));
        let mut builder = ModelBuilder::new(types);
        let ea = builder.entity_type("A", Some(a));
        let ec = builder.entity_type("C", Some(c));
        builder.base_type(ec, ea);
        keyed(&mut builder, ea);
        let model = builder.build().unwrap();

        assert_eq!(run(&model), Ok(()));
    }

    #[test]
    fn base_type_is_verified_through_its_derived_type() {
        let mut types = TypeRegistry::new();
        let a = types.concrete("A", None);
        let b = types.concrete("B", Some(a));
        let c = types.concrete("C", Some(b));
        let mut builder = ModelBuilder::new(types);
        let ec = builder.entity_type("C", Some(c));
        let eb = builder.entity_type("B", Some(b));
        let ea = builder.entity_type("A", Some(a));
        builder.base_type(ec, eb);
        keyed(&mut builder, ea);
        keyed(&mut builder, eb);
        let model = builder.build().unwrap();

        // C -> B is fine; B is then verified and is not mapped under A.
        assert_eq!(
            run(&model),
            Err(ValidationError::InconsistentInheritance {
                entity: "B".into(),
                base: "A".into(),
            })
        );
    }
}
