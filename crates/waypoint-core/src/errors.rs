//! Error and diagnostic types for navigator operations
//!
//! Navigation operations never fail loudly: they report a [`Diagnostic`] and
//! return a failure value. Construction, decoding, configuration and storage
//! are fallible and use [`NavigationError`] / [`StoreError`].

use std::fmt;

use crate::types::{NavigatorId, NavigatorKind};

/// Errors produced by fallible navigator construction and restoration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// A loosely typed value did not have the expected concrete type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type the navigator expected
        expected: &'static str,
        /// Type that was supplied
        found: &'static str,
    },

    /// A description referred to a tab or navigator that does not exist
    #[error("Target not found: {message}")]
    TargetNotFound {
        /// What was being looked for
        message: String,
    },

    /// The navigator handle refers to a node that has been released
    #[error("Navigator handle is stale")]
    StaleNavigator,

    /// A persisted record was malformed
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the malformed input
        message: String,
    },

    /// A record could not be serialized
    #[error("Encode error: {message}")]
    Encode {
        /// Description of the serializer failure
        message: String,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Config error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },
}

impl NavigationError {
    /// Create a type mismatch error for `expected`
    pub fn type_mismatch<T>(found: &'static str) -> Self {
        Self::TypeMismatch {
            expected: std::any::type_name::<T>(),
            found,
        }
    }

    /// Create a target-not-found error
    pub fn target_not_found(message: impl Into<String>) -> Self {
        Self::TargetNotFound {
            message: message.into(),
        }
    }

    /// Create an encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for NavigationError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

/// Errors surfaced by a [`crate::store::NavigationStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The stored payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<NavigationError> for StoreError {
    fn from(err: NavigationError) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A recoverable failure reported by a navigation operation.
///
/// Every diagnostic is logged through `tracing` and, when installed, handed to
/// the tree's diagnostic hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A loosely typed value had the wrong concrete type
    TypeMismatch {
        /// Operation that received the value
        operation: &'static str,
        /// Type the navigator expected
        expected: &'static str,
        /// Type that was supplied
        found: &'static str,
    },
    /// No destination, id or tab matched
    TargetNotFound {
        /// Operation that searched
        operation: &'static str,
        /// Navigator the search started from
        navigator: NavigatorId,
    },
    /// The navigator kind cannot perform the operation
    StructuralImpossibility {
        /// Operation that was rejected
        operation: &'static str,
        /// Navigator that rejected it
        navigator: NavigatorId,
        /// Kind of that navigator
        kind: NavigatorKind,
    },
    /// Pop requested on a navigator already showing its root
    AlreadyAtRoot {
        /// Operation that was requested
        operation: &'static str,
        /// Navigator showing its root
        navigator: NavigatorId,
    },
    /// The handle refers to a released node
    StaleNavigator {
        /// Operation that was requested
        operation: &'static str,
    },
    /// No replace-root handler is installed at the tree root
    MissingReplaceRootHandler {
        /// Navigator the request came from
        navigator: NavigatorId,
    },
}

impl Diagnostic {
    /// Name of the operation that produced this diagnostic.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::TypeMismatch { operation, .. }
            | Self::TargetNotFound { operation, .. }
            | Self::StructuralImpossibility { operation, .. }
            | Self::AlreadyAtRoot { operation, .. }
            | Self::StaleNavigator { operation } => operation,
            Self::MissingReplaceRootHandler { .. } => "replace_root",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch {
                operation,
                expected,
                found,
            } => write!(f, "{operation}: expected {expected}, found {found}"),
            Self::TargetNotFound {
                operation,
                navigator,
            } => write!(f, "{operation}: no match reachable from {navigator}"),
            Self::StructuralImpossibility {
                operation,
                navigator,
                kind,
            } => write!(f, "{operation}: not possible on {kind} navigator {navigator}"),
            Self::AlreadyAtRoot {
                operation,
                navigator,
            } => write!(f, "{operation}: {navigator} is already at its root view"),
            Self::StaleNavigator { operation } => write!(f, "{operation}: stale navigator"),
            Self::MissingReplaceRootHandler { navigator } => {
                write!(f, "replace_root: no handler installed above {navigator}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NavigationError::type_mismatch::<u32>("alloc::string::String");
        assert_eq!(
            err.to_string(),
            "Type mismatch: expected u32, found alloc::string::String"
        );

        let err = NavigationError::target_not_found("tab 9");
        assert_eq!(err.to_string(), "Target not found: tab 9");
    }

    #[test]
    fn test_json_error_becomes_decode() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = NavigationError::from(json_err);
        assert!(matches!(err, NavigationError::Decode { .. }));
    }

    #[test]
    fn test_diagnostic_operation_name() {
        let diag = Diagnostic::StaleNavigator { operation: "pop" };
        assert_eq!(diag.operation(), "pop");
        assert_eq!(diag.to_string(), "pop: stale navigator");
    }
}
