//! Validator configuration.

use serde::{Deserialize, Serialize};

/// What to do with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningBehavior {
    /// Forward to the sink, record it, keep validating.
    #[default]
    Log,
    Ignore,
    /// Fail validation with `ValidationError::WarningAsError`.
    Throw,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    pub warnings: WarningBehavior,
    /// Annotate property lists in warnings with property types.
    pub include_types_in_warnings: bool,
}

impl ValidatorOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
