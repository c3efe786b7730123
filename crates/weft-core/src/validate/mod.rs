pub mod engine;
pub mod outcome;

pub use engine::{validate_draft, validate_rows};
pub use outcome::{InvalidRow, Severity, ValidationError, ValidationResult};
