//! Reporting sinks receiving validation diagnostics.

use std::sync::{Mutex, PoisonError};

use crate::error::{ValidationError, ValidationWarning};

/// Receives diagnostics as validation runs. Errors are reported just before
/// validation fails with them; reporting a warning never stops validation.
///
/// Sinks may be shared between validators running on different threads.
pub trait ReportSink: Send + Sync {
    fn report_warning(&self, warning: &ValidationWarning);

    fn report_error(&self, _error: &ValidationError) {}
}

/// Logs diagnostics through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report_warning(&self, warning: &ValidationWarning) {
        tracing::warn!(
            code = warning.code(),
            entity = %warning.entity,
            "{}",
            warning.message
        );
    }

    fn report_error(&self, error: &ValidationError) {
        tracing::error!(code = error.code(), "{}", error);
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<ValidationWarning>>,
    errors: Mutex<Vec<ValidationError>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<ValidationWarning> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReportSink for CollectingSink {
    fn report_warning(&self, warning: &ValidationWarning) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning.clone());
    }

    fn report_error(&self, error: &ValidationError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.clone());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl ReportSink for DiscardSink {
    fn report_warning(&self, _warning: &ValidationWarning) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn collecting_sink_accepts_concurrent_appends() {
        let sink = Arc::new(CollectingSink::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for _ in 0..25 {
                        sink.report_warning(&ValidationWarning::shadow_key(
                            &format!("Entity{}", i),
                            "{'Id'}",
                        ));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sink.warnings().len(), 100);
        assert!(sink.errors().is_empty());
    }
}
