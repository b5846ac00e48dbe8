//! Fixed-point resolution of forward-referencing types.
//!
//! ## Algorithm
//!
//! 1. Try every stub of every worklist, in the order classes, interfaces,
//!    callbacks, aliases. A resolved type is inserted immediately, so later
//!    stubs of the same pass can already find it.
//! 2. Stop when all worklists are empty.
//! 3. Stop when a pass left all four worklist sizes unchanged; every remaining
//!    stub is dropped.
//!
//! Every pass that continues removes at least one stub, so the loop ends after
//! at most N+1 passes for N stubs.

use girbind_core::{DiagnosticKind, TypeHash};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, debug_span, info, warn};

use crate::env::Env;
use crate::lookup::{Scope, TypeStore};
use crate::namespace::{LookupRank, Namespace};
use crate::report::BuildReport;
use crate::types::Type;
use crate::unresolved::{
    Resolved, Unresolved, UnresolvedAlias, UnresolvedCallback, UnresolvedClass,
    UnresolvedInterface,
};

/// Outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Resolved(T),
    /// Permanently rejected.
    NotResolvable(String),
    /// Depends on something that may still resolve; retry next pass.
    Maybe(String),
}

impl<T> Resolution<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(v) => Some(v),
            _ => None,
        }
    }
}

/// The four stub worklists of one namespace.
#[derive(Default)]
pub(crate) struct Worklists<'i> {
    pub classes: Vec<UnresolvedClass<'i>>,
    pub interfaces: Vec<UnresolvedInterface<'i>>,
    pub callbacks: Vec<UnresolvedCallback<'i>>,
    pub aliases: Vec<UnresolvedAlias<'i>>,
}

impl Worklists<'_> {
    fn sizes(&self) -> [usize; 4] {
        [
            self.classes.len(),
            self.interfaces.len(),
            self.callbacks.len(),
            self.aliases.len(),
        ]
    }

    fn is_empty(&self) -> bool {
        self.sizes().iter().all(|n| *n == 0)
    }

    fn pending_names(&self) -> FxHashSet<String> {
        self.classes
            .iter()
            .map(|s| s.gir_name())
            .chain(self.interfaces.iter().map(|s| s.gir_name()))
            .chain(self.callbacks.iter().map(|s| s.gir_name()))
            .chain(self.aliases.iter().map(|s| s.gir_name()))
            .map(str::to_string)
            .collect()
    }
}

/// Output of [`resolve_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResolveOutcome {
    pub passes: usize,
    /// Stubs still unresolved when the resolver stopped making progress.
    pub dropped: Vec<String>,
}

/// Mutable state of one namespace build.
pub(crate) struct BuildState<'b, 'e> {
    pub env: &'b Env<'e>,
    pub types: &'b mut TypeStore,
    pub namespaces: &'b FxHashMap<String, Namespace>,
    pub current: &'b mut Namespace,
    pub report: &'b mut BuildReport,
}

impl BuildState<'_, '_> {
    /// A lookup scope over the current state, plus the report to write to.
    pub(crate) fn split(&mut self) -> (Scope<'_>, &mut BuildReport) {
        let scope = Scope {
            env: self.env,
            types: &*self.types,
            namespaces: self.namespaces,
            current: &*self.current,
            pending: None,
        };
        (scope, &mut *self.report)
    }

    /// Insert a manually supplied type. It wins every name clash.
    pub(crate) fn insert_manual(&mut self, ty: Type) -> TypeHash {
        let hash = self.current.type_hash(ty.gir_name());
        self.current.manual.push(hash);
        self.current.index_type(LookupRank::Manual, &ty, hash);
        self.types.insert(hash, ty);
        self.report.types_declared += 1;
        hash
    }

    /// Insert a resolved type and make it findable.
    pub(crate) fn insert(&mut self, hash: TypeHash, resolved: Resolved) {
        let Resolved { ty, type_struct } = resolved;

        if let Some(ts) = type_struct
            && let Some(Type::Record(record)) = self.types.get_mut(&ts)
            && !record.mark_as_type_struct_for(hash)
        {
            warn!(record = record.gir_name.as_str(), owner = ty.gir_name(), "record is already the class struct of another type");
        }

        let list = match &ty {
            Type::Class(_) => &mut self.current.classes,
            Type::Interface(_) => &mut self.current.interfaces,
            Type::Callback(_) => &mut self.current.callbacks,
            Type::Alias(_) => &mut self.current.aliases,
            Type::Enum(_) => &mut self.current.enums,
            Type::Bitfield(_) => &mut self.current.bitfields,
            Type::Record(_) => &mut self.current.records,
            Type::Union(_) => &mut self.current.unions,
            _ => &mut self.current.manual,
        };
        list.push(hash);

        if let Some(rank) = LookupRank::of(&ty) {
            self.current.index_type(rank, &ty, hash);
        }
        self.types.insert(hash, ty);
        self.report.types_declared += 1;
    }

    /// One pass over one worklist. Returns the stubs to retry.
    fn pass<S: Unresolved>(&mut self, stubs: Vec<S>, pending: &mut FxHashSet<String>) -> Vec<S> {
        let mut retry = Vec::with_capacity(stubs.len());

        for stub in stubs {
            let _span = debug_span!("resolve", kind = S::KIND, name = stub.gir_name()).entered();

            let outcome = {
                let scope = Scope {
                    env: self.env,
                    types: &*self.types,
                    namespaces: self.namespaces,
                    current: &*self.current,
                    pending: Some(&*pending),
                };
                stub.resolve(&scope)
            };

            match outcome {
                Resolution::Resolved(resolved) => {
                    debug!("resolved");
                    pending.remove(stub.gir_name());
                    self.insert(stub.hash(), resolved);
                }
                Resolution::NotResolvable(reason) => {
                    warn!(reason = reason.as_str(), "not resolvable");
                    pending.remove(stub.gir_name());
                    self.report.record(
                        &self.env.versioned,
                        DiagnosticKind::NotResolvable,
                        stub.gir_name(),
                        format!("{} {reason}", S::KIND),
                    );
                }
                Resolution::Maybe(reason) => {
                    debug!(reason = reason.as_str(), "deferred");
                    retry.push(stub);
                }
            }
        }

        retry
    }

    fn drop_remaining<S: Unresolved>(&mut self, stubs: &[S], dropped: &mut Vec<String>) {
        for stub in stubs {
            warn!(kind = S::KIND, name = stub.gir_name(), "dropping unresolved");
            self.report.record(
                &self.env.versioned,
                DiagnosticKind::Unresolved,
                stub.gir_name(),
                format!("{} could not be resolved", S::KIND),
            );
            dropped.push(stub.gir_name().to_string());
        }
    }
}

/// Resolve all stubs to a fixed point.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn resolve_all(target: &mut BuildState<'_, '_>, mut work: Worklists<'_>) -> ResolveOutcome {
    let mut pending = work.pending_names();
    let mut outcome = ResolveOutcome::default();

    loop {
        let before = work.sizes();
        outcome.passes += 1;

        work.classes = target.pass(std::mem::take(&mut work.classes), &mut pending);
        work.interfaces = target.pass(std::mem::take(&mut work.interfaces), &mut pending);
        work.callbacks = target.pass(std::mem::take(&mut work.callbacks), &mut pending);
        work.aliases = target.pass(std::mem::take(&mut work.aliases), &mut pending);

        if work.is_empty() {
            info!(namespace = %target.env.versioned, passes = outcome.passes, "resolved all types");
            break;
        }

        if work.sizes() == before {
            let [classes, interfaces, callbacks, aliases] = before;
            warn!(
                namespace = %target.env.versioned,
                classes, interfaces, callbacks, aliases,
                "resolver made no progress"
            );
            target.drop_remaining(&work.classes, &mut outcome.dropped);
            target.drop_remaining(&work.interfaces, &mut outcome.dropped);
            target.drop_remaining(&work.callbacks, &mut outcome.dropped);
            target.drop_remaining(&work.aliases, &mut outcome.dropped);
            break;
        }
    }

    target.report.resolver_passes += outcome.passes;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_accessors() {
        let ok: Resolution<u32> = Resolution::Resolved(3);
        assert!(ok.is_resolved());
        assert_eq!(ok.resolved(), Some(3));

        let later: Resolution<u32> = Resolution::Maybe("parent".to_string());
        assert!(!later.is_resolved());
        assert_eq!(later.resolved(), None);
    }

    #[test]
    fn empty_worklists_finish_in_one_pass() {
        let work = Worklists::default();
        assert!(work.is_empty());
        assert!(work.pending_names().is_empty());
    }
}
