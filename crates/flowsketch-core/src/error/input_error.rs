//! The InputError type for rejected detection input.

use std::fmt;

use crate::error::Diagnostic;

/// Error type for detection input that cannot be interpreted.
///
/// Wraps one or more diagnostics; at least one of them is an error.
#[derive(Debug)]
pub struct InputError {
    diagnostics: Vec<Diagnostic>,
}

impl InputError {
    /// Create a new input error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self.diagnostics.iter().filter(|d| d.severity().is_error());
        if let Some(first) = errors.next() {
            write!(f, "{first}")?;
            let rest = errors.count();
            if rest > 0 {
                write!(f, " (+{rest} more)")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for InputError {}

impl From<Diagnostic> for InputError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}
