pub mod error;
pub mod model;
pub mod report;
pub mod validate;

pub use error::{DiagnosticKind, ModelBuildError, ValidationError, ValidationWarning};
pub use validate::{ModelValidator, ValidationOutcome, validate_model};
