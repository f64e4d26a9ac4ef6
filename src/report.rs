//! Serializable summary of a validation run, for hosts that want JSON.

use serde::Serialize;

use crate::error::{DiagnosticKind, ValidationError, ValidationWarning};
use crate::validate::ValidationOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticDto {
    pub code: String,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
}

impl From<&ValidationWarning> for DiagnosticDto {
    fn from(w: &ValidationWarning) -> Self {
        DiagnosticDto {
            code: w.code().to_string(),
            kind: w.kind,
            severity: Severity::Warning,
            message: w.message.clone(),
        }
    }
}

impl From<&ValidationError> for DiagnosticDto {
    fn from(e: &ValidationError) -> Self {
        DiagnosticDto {
            code: e.code().to_string(),
            kind: e.kind(),
            severity: Severity::Error,
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub skip_detect_changes: bool,
    pub diagnostics: Vec<DiagnosticDto>,
}

impl ValidationReport {
    /// Summarize a run. A failed run only knows its error; warnings reported
    /// before the failure went to the sink.
    pub fn from_result(result: &Result<ValidationOutcome, ValidationError>) -> Self {
        match result {
            Ok(outcome) => ValidationReport {
                valid: true,
                skip_detect_changes: outcome.skip_detect_changes,
                diagnostics: outcome.warnings.iter().map(DiagnosticDto::from).collect(),
            },
            Err(err) => ValidationReport {
                valid: false,
                skip_detect_changes: false,
                diagnostics: vec![DiagnosticDto::from(err)],
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_run_reports_single_error() {
        let result = Err(ValidationError::EntityRequiresKey {
            entity: "Order".into(),
        });
        let report = ValidationReport::from_result(&result);
        assert!(!report.valid);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].code, "MV002");
        assert_eq!(report.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn report_serializes_to_json() {
        let outcome = ValidationOutcome {
            warnings: vec![ValidationWarning::shadow_key("Order", "{'Code'}")],
            skip_detect_changes: false,
        };
        let report = ValidationReport::from_result(&Ok(outcome));
        insta::assert_json_snapshot!(report, @r###"
        {
          "valid": true,
          "skipDetectChanges": false,
          "diagnostics": [
            {
              "code": "MV101",
              "kind": "ShadowKey",
              "severity": "warning",
              "message": "The key {'Code'} on entity type 'Order' contains properties in shadow state: {'Code'}."
            }
          ]
        }
        "###);
    }
}
