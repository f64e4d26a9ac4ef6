//! Change-tracking strategy consistency.

use crate::error::ValidationError;
use crate::model::{ChangeTrackingStrategy, Model};
use crate::validate::ValidationContext;

pub fn ensure_change_tracking_strategy(
    model: &Model,
    cx: &mut ValidationContext<'_>,
) -> Result<(), ValidationError> {
    let mut detect_changes_needed = false;

    for entity in model.entity_types() {
        let strategy = model.effective_change_tracking_strategy(entity.id());
        if strategy == ChangeTrackingStrategy::Snapshot {
            detect_changes_needed = true;
        }

        if let Some(message) = entity.check_change_tracking_strategy(model, strategy) {
            return Err(ValidationError::ChangeTrackingStrategy(message));
        }
    }

    if !detect_changes_needed {
        cx.set_skip_detect_changes();
    }

    Ok(())
}
