//! Every entity type must have a primary key, declared or inherited.

use crate::error::ValidationError;
use crate::model::Model;
use crate::validate::ValidationContext;

pub fn ensure_non_null_primary_keys(
    model: &Model,
    _cx: &mut ValidationContext<'_>,
) -> Result<(), ValidationError> {
    match model
        .entity_types()
        .find(|e| model.find_primary_key(e.id()).is_none())
    {
        Some(entity) => Err(ValidationError::EntityRequiresKey {
            entity: entity.display_name().to_string(),
        }),
        None => Ok(()),
    }
}
