//! Validation of platform classes against the common model.

mod report;
mod validate;

pub use report::{ErrorReport, RED, RESET, ReportKind, red};
pub use validate::{Validator, validate};
