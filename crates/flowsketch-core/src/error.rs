//! Diagnostics for malformed detection input.
//!
//! Input coming from the external vision and OCR passes is validated before
//! any stage runs. Problems are reported as [`Diagnostic`]s:
//! - Error codes for documentation and searchability
//! - A reference to the offending input record
//! - Severity levels (errors reject the input, warnings are only logged)
//! - A collector for accumulating every problem instead of stopping at the first
//!
//! Multiple diagnostics are wrapped in [`InputError`] when the input is
//! rejected.
//!
//! # Example
//!
//! ```
//! # use flowsketch_core::error::{Diagnostic, ErrorCode, RecordRef};
//! let diag = Diagnostic::error("confidence 1.7 is outside [0, 1]")
//!     .with_code(ErrorCode::E002)
//!     .with_record(RecordRef::Shape(3))
//!     .with_help("detector confidences must be normalized");
//!
//! assert_eq!(diag.to_string(), "error[E002]: shapes[3]: confidence 1.7 is outside [0, 1]");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod input_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::{Diagnostic, RecordRef};
pub use error_code::ErrorCode;
pub use input_error::InputError;
pub use severity::Severity;
