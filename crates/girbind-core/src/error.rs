//! Error and diagnostic types.
//!
//! Building a registry distinguishes two kinds of failure:
//!
//! ```text
//! BuildError   - fatal configuration/programmer errors, returned as Err
//! Diagnostic   - a type, callable or member that was dropped or skipped,
//!                collected into the build report while the build continues
//! ```

use std::fmt;

use thiserror::Error;

// ============================================================================
// Fatal Errors
// ============================================================================

/// Errors that abort a registry build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An ignore pattern has more than two dot-separated components.
    #[error("invalid ignore pattern '{0}': expected 'Name' or 'Parent.Name'")]
    InvalidIgnorePattern(String),

    /// An ignore regex failed to compile.
    #[error("invalid ignore regex '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// A version string could not be parsed.
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    /// Two repositories declare the same versioned namespace.
    #[error("namespace '{0}' declared more than once")]
    DuplicateNamespace(String),

    /// Two manual types in one namespace share an IDL name.
    #[error("manual type '{name}' declared twice in namespace '{namespace}'")]
    ManualTypeConflict { namespace: String, name: String },

    /// A manual type refers to a type that does not exist after the build.
    #[error("manual type '{name}' in namespace '{namespace}' references unknown type '{target}'")]
    UnresolvedManualType {
        namespace: String,
        name: String,
        target: String,
    },

    /// A post-processor could not be applied.
    #[error("post-processing failed: {0}")]
    PostProcess(String),
}

// ============================================================================
// Diagnostics
// ============================================================================

/// What happened to the subject of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Filtered out by configuration, version or naming rules.
    Skipped,
    /// Permanently rejected while resolving a type.
    NotResolvable,
    /// Still unresolved when the resolver stopped making progress.
    Unresolved,
    /// A callable, signal or virtual method was rejected.
    CallableRejected,
    /// A member (field, enum member, constant) was rejected.
    MemberRejected,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::Skipped => "skipped",
            DiagnosticKind::NotResolvable => "not resolvable",
            DiagnosticKind::Unresolved => "unresolved",
            DiagnosticKind::CallableRejected => "callable rejected",
            DiagnosticKind::MemberRejected => "member rejected",
        };
        f.write_str(s)
    }
}

/// A non-fatal build event attached to a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Versioned namespace the subject belongs to.
    pub namespace: String,
    pub kind: DiagnosticKind,
    /// IDL name of the subject, qualified with its parent where one exists.
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        namespace: impl Into<String>,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.namespace, self.subject, self.kind, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_display() {
        let err = BuildError::InvalidIgnorePattern("a.b.c".into());
        assert!(err.to_string().contains("a.b.c"));
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::new(
            "Gtk-4",
            DiagnosticKind::NotResolvable,
            "Widget",
            "parent not found",
        );
        assert_eq!(
            d.to_string(),
            "Gtk-4: Widget not resolvable: parent not found"
        );
    }
}
