//! The core diagnostic type for input validation.

use std::fmt;

use crate::error::{Severity, error_code::ErrorCode};

/// Reference to one record of a [`DetectionInput`](crate::input::DetectionInput).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordRef {
    /// Index into `shapes`.
    Shape(usize),
    /// Index into `fragments`.
    Fragment(usize),
    /// Index into `hints`.
    Hint(usize),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordRef::Shape(idx) => write!(f, "shapes[{idx}]"),
            RecordRef::Fragment(idx) => write!(f, "fragments[{idx}]"),
            RecordRef::Hint(idx) => write!(f, "hints[{idx}]"),
        }
    }
}

/// A diagnostic message about one input record.
///
/// ```text
/// error[E002]: shapes[3]: confidence 1.7 is outside [0, 1]
///   = help: detector confidences must be normalized
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    record: Option<RecordRef>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the offending record, if any.
    pub fn record(&self) -> Option<RecordRef> {
        self.record
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Point the diagnostic at an input record.
    pub fn with_record(mut self, record: RecordRef) -> Self {
        self.record = Some(record);
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            record: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: shapes[0]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": ")?;
        if let Some(record) = self.record {
            write!(f, "{record}: ")?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::error("bad box");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "bad box");
        assert!(diag.code().is_none());
        assert!(diag.record().is_none());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::warning("blank text")
            .with_code(ErrorCode::E102)
            .with_record(RecordRef::Fragment(2))
            .with_help("the fragment is ignored");

        assert!(diag.severity().is_warning());
        assert_eq!(diag.code(), Some(ErrorCode::E102));
        assert_eq!(diag.record(), Some(RecordRef::Fragment(2)));
        assert_eq!(diag.help(), Some("the fragment is ignored"));
    }

    #[test]
    fn test_diagnostic_display_with_code_and_record() {
        let diag = Diagnostic::error("width is negative")
            .with_code(ErrorCode::E001)
            .with_record(RecordRef::Shape(0));

        assert_eq!(diag.to_string(), "error[E001]: shapes[0]: width is negative");
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("nothing to analyze");

        assert_eq!(diag.to_string(), "warning: nothing to analyze");
    }

    #[test]
    fn test_record_ref_display() {
        assert_eq!(RecordRef::Hint(7).to_string(), "hints[7]");
    }
}
