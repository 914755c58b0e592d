mod location;
mod diagnostic;

pub use location::SourceLocation;
pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticLevel, Diagnostics};
