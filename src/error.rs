//! Crate-wide error type.
//!
//! Configuration errors — malformed attribute values, schema-invalid
//! documents, unresolvable module symbols, unreadable source files — are all
//! unrecoverable: the declarative source is assumed to be validated before
//! deployment, so there is no weaker fallback than stopping the frame. The
//! caller (usually the window front end) decides whether that exits the
//! process.

use std::path::PathBuf;

use crate::eval::EvalError;

/// Any fatal error raised by the compiler, resolver, host, or router.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {}: {}", .path.display(), .message)]
    Xml { path: PathBuf, message: String },

    #[error("schema violation: {0}")]
    Schema(String),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("invalid boolean value: {0:?}")]
    InvalidBool(String),

    #[error("invalid align value: {0:?}")]
    InvalidAlign(String),

    #[error("invalid color value: {0:?}")]
    InvalidColor(String),

    #[error("invalid numeric value: {0:?}")]
    InvalidNumber(String),

    #[error("module {} has no variable {:?}", .module.display(), .name)]
    UnknownVariable { module: PathBuf, name: String },

    #[error("module {} has no function {:?}", .module.display(), .name)]
    UnknownFunction { module: PathBuf, name: String },

    #[error("malformed function call: {0:?}")]
    MalformedCall(String),

    #[error("no extension module registered for handler dispatch")]
    UnknownModule,

    #[error("no document loaded")]
    MissingRoot,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
