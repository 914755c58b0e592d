//! Errors that abort a generator run.
//!
//! Problems confined to one declaration are reported through
//! [`fwrap_common::Diagnostics`] and only skip that declaration. The
//! variants here describe structural violations after which the output
//! cannot be trusted at all.

use fwrap_common::SourceLocation;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GenError>;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    /// An interoperable struct cannot extend another type.
    #[error("{location}: struct '{name}' uses bind(C) but has a base class")]
    #[diagnostic(
        code(fwrap::bindc_base),
        help("remove the `bindc` feature or the base class")
    )]
    BindCBase {
        name: String,
        location: SourceLocation,
    },

    /// Interoperable structs have no type-bound procedures.
    #[error("{location}: struct '{name}' uses bind(C) but declares member function '{member}'")]
    #[diagnostic(
        code(fwrap::bindc_method),
        help("ignore the member function or wrap the struct as a class")
    )]
    BindCMethod {
        name: String,
        member: String,
        location: SourceLocation,
    },

    /// Every member of an interoperable struct needs a `bindc` typemap.
    #[error("{location}: member '{member}' of bind(C) struct '{name}' has no interoperable type ({ty})")]
    #[diagnostic(code(fwrap::bindc_member))]
    BindCMember {
        name: String,
        member: String,
        ty: String,
        location: SourceLocation,
    },
}
