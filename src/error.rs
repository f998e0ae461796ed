//! Error taxonomy for a documentation run.
//!
//! Library-level errors abort one input; [`DocError::is_library_level`]
//! tells the run loop which ones it may log and skip.

use crate::metadata::catalog::Role;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocError>;

#[derive(Debug, Error)]
pub enum DocError {
    /// The library metadata or one of its references could not be resolved.
    #[error("failed to load {library}: {reason}")]
    Load { library: String, reason: String },

    /// The comment source is not a well-formed XML-doc document.
    #[error("wrong XML doc format in {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    #[error("mismatch assembly names. Expected {expected}, found in XML {found}")]
    NameMismatch { expected: String, found: String },

    /// A role was requested that the marker catalog has no entry for.
    #[error("unsupported member role: {0}")]
    UnsupportedRole(Role),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DocError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DocError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        DocError::Json {
            context: context.into(),
            source,
        }
    }

    /// Whether this error only invalidates the input being processed.
    /// I/O failures count when they happen while reading that input.
    pub fn is_library_level(&self) -> bool {
        matches!(
            self,
            DocError::Load { .. }
                | DocError::Format { .. }
                | DocError::NameMismatch { .. }
                | DocError::Io { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message_names_both_assemblies() {
        let err = DocError::NameMismatch {
            expected: "Acme.Lib".to_string(),
            found: "Other.Lib".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "mismatch assembly names. Expected Acme.Lib, found in XML Other.Lib"
        );
    }

    #[test]
    fn unsupported_role_is_not_library_level() {
        assert!(!DocError::UnsupportedRole(Role::EnumItem).is_library_level());
        assert!(DocError::Load {
            library: "x".to_string(),
            reason: "y".to_string()
        }
        .is_library_level());
    }
}
