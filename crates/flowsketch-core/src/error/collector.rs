//! Collector for accumulating diagnostics during input validation.

use crate::error::{Diagnostic, InputError};

/// A collector for accumulating diagnostics while validating input.
///
/// Validation reports every malformed record instead of stopping at the
/// first one.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if an error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection.
    ///
    /// - If there are errors, returns `Err(InputError)` with all diagnostics.
    /// - Otherwise returns the warnings so the caller can report them.
    pub fn finish(self) -> Result<Vec<Diagnostic>, InputError> {
        if self.has_errors {
            Err(InputError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}
