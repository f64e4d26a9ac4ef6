//! Model validation phase.
//!
//! Runs the rule passes over a built [`Model`] in a fixed order. The first
//! error stops validation and is returned unchanged; warnings are forwarded to
//! the configured [`ReportSink`] and collected in the outcome.

pub mod change_tracking;
pub mod inheritance;
pub mod options;
pub mod primary_keys;
pub mod shadow_entities;
pub mod shadow_keys;
pub mod sink;

pub use options::{ValidatorOptions, WarningBehavior};
pub use sink::{CollectingSink, DiscardSink, ReportSink, TracingSink};

use std::sync::Arc;

use crate::error::{ValidationError, ValidationWarning};
use crate::model::Model;

type PassFn = fn(&Model, &mut ValidationContext<'_>) -> Result<(), ValidationError>;

/// Pass order is part of the contract: it decides which error surfaces first
/// when a model has several problems.
const PASSES: [(&str, PassFn); 5] = [
    ("no-shadow-entities", shadow_entities::ensure_no_shadow_entities),
    ("non-null-primary-keys", primary_keys::ensure_non_null_primary_keys),
    ("no-shadow-keys", shadow_keys::ensure_no_shadow_keys),
    ("native-inheritance", inheritance::ensure_native_inheritance),
    ("change-tracking-strategy", change_tracking::ensure_change_tracking_strategy),
];

/// Result of a successful validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub warnings: Vec<ValidationWarning>,
    /// No entity type needs snapshot change detection, so detect-changes can
    /// be skipped for this model.
    pub skip_detect_changes: bool,
}

/// State threaded through the passes of one validation run.
pub struct ValidationContext<'a> {
    sink: &'a dyn ReportSink,
    options: &'a ValidatorOptions,
    warnings: Vec<ValidationWarning>,
    skip_detect_changes: bool,
}

impl<'a> ValidationContext<'a> {
    pub fn new(sink: &'a dyn ReportSink, options: &'a ValidatorOptions) -> Self {
        ValidationContext {
            sink,
            options,
            warnings: Vec::new(),
            skip_detect_changes: false,
        }
    }

    pub fn options(&self) -> &ValidatorOptions {
        self.options
    }

    /// Report a warning. Only fails when warnings are configured to throw.
    pub fn warn(&mut self, warning: ValidationWarning) -> Result<(), ValidationError> {
        match self.options.warnings {
            WarningBehavior::Log => {
                self.sink.report_warning(&warning);
                self.warnings.push(warning);
                Ok(())
            }
            WarningBehavior::Ignore => Ok(()),
            WarningBehavior::Throw => Err(ValidationError::WarningAsError(warning)),
        }
    }

    pub fn set_skip_detect_changes(&mut self) {
        self.skip_detect_changes = true;
    }

    pub fn finish(self) -> ValidationOutcome {
        ValidationOutcome {
            warnings: self.warnings,
            skip_detect_changes: self.skip_detect_changes,
        }
    }
}

#[derive(Clone)]
pub struct ModelValidator {
    sink: Arc<dyn ReportSink>,
    options: ValidatorOptions,
}

impl Default for ModelValidator {
    fn default() -> Self {
        ModelValidator::new()
    }
}

impl ModelValidator {
    /// A validator that logs through `tracing` with default options.
    pub fn new() -> Self {
        ModelValidator {
            sink: Arc::new(TracingSink),
            options: ValidatorOptions::default(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub fn validate(&self, model: &Model) -> Result<ValidationOutcome, ValidationError> {
        let mut cx = ValidationContext::new(self.sink.as_ref(), &self.options);

        for (name, pass) in PASSES {
            tracing::debug!(pass = name, "running model validation pass");
            if let Err(err) = pass(model, &mut cx) {
                self.sink.report_error(&err);
                return Err(err);
            }
        }

        let outcome = cx.finish();
        tracing::debug!(
            entity_types = model.entity_type_count(),
            warnings = outcome.warnings.len(),
            skip_detect_changes = outcome.skip_detect_changes,
            "model validation succeeded"
        );
        Ok(outcome)
    }
}

/// Validate a model with the default validator.
pub fn validate_model(model: &Model) -> Result<ValidationOutcome, ValidationError> {
    ModelValidator::new().validate(model)
}
