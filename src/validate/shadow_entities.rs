//! Every entity type must be backed by a native type.

use crate::error::ValidationError;
use crate::model::Model;
use crate::validate::ValidationContext;

pub fn ensure_no_shadow_entities(
    model: &Model,
    _cx: &mut ValidationContext<'_>,
) -> Result<(), ValidationError> {
    match model.entity_types().find(|e| !e.has_native_type()) {
        Some(entity) => Err(ValidationError::ShadowEntity {
            entity: entity.display_name().to_string(),
        }),
        None => Ok(()),
    }
}
