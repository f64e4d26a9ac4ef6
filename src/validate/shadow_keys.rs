//! Keys containing shadow properties.
//!
//! A declared key with any shadow property is fatal when a foreign key targets
//! it and the key itself only came from convention: the relationship was never
//! configured on purpose. Any other shadow key is reported as a warning.

use crate::error::{ValidationError, ValidationWarning};
use crate::model::format::{entity_or_navigation, format_properties};
use crate::model::{ConfigurationSource, KeyRef, Model};
use crate::validate::ValidationContext;

pub fn ensure_no_shadow_keys(
    model: &Model,
    cx: &mut ValidationContext<'_>,
) -> Result<(), ValidationError> {
    for entity in model.entity_types().filter(|e| e.has_native_type()) {
        for (index, key) in entity.declared_keys().iter().enumerate() {
            let key_ref = KeyRef {
                entity: entity.id(),
                key: index,
            };
            let properties = model.key_properties(key_ref);
            if !properties.iter().any(|p| p.is_shadow) {
                continue;
            }

            let referencing = model
                .referencing_foreign_keys(key_ref)
                .first()
                .and_then(|&fk_ref| Some((fk_ref, model.foreign_key(fk_ref)?)));

            if let Some((fk_ref, fk)) = referencing {
                if ConfigurationSource::Convention.overrides(key.configuration_source) {
                    let dependent = model.entity_type(fk_ref.entity);
                    let principal = model.entity_type(fk.principal.entity);
                    let primary_key = model
                        .find_primary_key(principal.id())
                        .map(|pk| model.key_properties(pk))
                        .unwrap_or_default();
                    return Err(ValidationError::ReferencedShadowKey {
                        dependent: entity_or_navigation(
                            dependent,
                            fk.dependent_to_principal.as_ref(),
                        ),
                        principal: entity_or_navigation(
                            principal,
                            fk.principal_to_dependent.as_ref(),
                        ),
                        foreign_key_properties: format_properties(
                            &model.foreign_key_properties(fk_ref),
                            true,
                        ),
                        principal_key_properties: format_properties(&primary_key, true),
                    });
                }
            }

            let formatted = format_properties(&properties, cx.options().include_types_in_warnings);
            cx.warn(ValidationWarning::shadow_key(
                entity.display_name(),
                &formatted,
            ))?;
        }
    }

    Ok(())
}
