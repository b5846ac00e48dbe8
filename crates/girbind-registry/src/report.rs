//! Build output: counters and non-fatal diagnostics.

use girbind_core::{Diagnostic, DiagnosticKind};

/// What happened during a registry build.
///
/// Everything that was skipped or rejected without aborting the build is
/// recorded here as a [`Diagnostic`].
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Namespaces built into the registry.
    pub namespaces_built: usize,
    /// Namespaces configured as ignored.
    pub namespaces_ignored: usize,
    /// Named types inserted, manual types included.
    pub types_declared: usize,
    /// Resolver passes summed over all namespaces.
    pub resolver_passes: usize,
    /// Functions, methods and constructors accepted.
    pub callables_declared: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub(crate) fn record(
        &mut self,
        namespace: &str,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics
            .push(Diagnostic::new(namespace, kind, subject, message));
    }

    pub fn by_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// First diagnostic about `subject`, e.g. `"Widget"` or `"Widget.show"`.
    pub fn find(&self, subject: &str) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.subject == subject)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.iter().all(|d| d.kind == DiagnosticKind::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtering_by_kind_and_subject() {
        let mut report = BuildReport::default();
        report.record("Gtk-4", DiagnosticKind::Skipped, "Old", "deprecated since 3.0.0");
        assert!(report.is_clean());

        report.record("Gtk-4", DiagnosticKind::NotResolvable, "Broken", "parent not found");
        assert!(!report.is_clean());
        assert_eq!(report.by_kind(DiagnosticKind::NotResolvable).count(), 1);
        assert_eq!(
            report.find("Broken").map(|d| d.kind),
            Some(DiagnosticKind::NotResolvable)
        );
        assert!(report.find("Missing").is_none());
    }
}
