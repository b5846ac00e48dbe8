//! The type registry and its builder.
//!
//! ```text
//! RegistryBuilder ──build()──► Registry (immutable, Send + Sync)
//!   repositories                 types: TypeHash ─► Type
//!   config                       namespaces in emission order
//!   post-processors
//! ```
//!
//! Per namespace, in include order:
//!
//! 1. insert the configured manual types;
//! 2. declare unions, enums, bitfields and records;
//! 3. declare classes, interfaces, callbacks and aliases as stubs;
//! 4. resolve the stubs to a fixed point;
//! 5. declare nested members, then functions and constants;
//! 6. check that manual types only reference existing types.

use girbind_core::idl::{IdlNamespace, IdlRepository};
use girbind_core::{BuildError, TypeHash};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, debug_span, info};

use crate::config::Config;
use crate::declare::{
    alias_stub, callback_stub, class_stub, declare_enum, declare_record, declare_union,
    interface_stub,
};
use crate::env::Env;
use crate::includes::IncludeGraph;
use crate::lookup::TypeStore;
use crate::namespace::Namespace;
use crate::nested::declare_nested;
use crate::params::ParamType;
use crate::report::BuildReport;
use crate::resolver::{BuildState, Worklists, resolve_all};
use crate::types::{Type, TypeRef, TypeView, builtin_hash, builtin_types, type_hash};

// ============================================================================
// Registry
// ============================================================================

/// Every resolved type of every built namespace.
///
/// Built once by [`RegistryBuilder::build`] and read-only afterwards.
pub struct Registry {
    types: TypeStore,
    namespaces: FxHashMap<String, Namespace>,
    /// Identity keys, dependencies first.
    order: Vec<String>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &format!("<{} types>", self.types.len()))
            .field("namespaces", &self.order)
            .finish()
    }
}

impl Registry {
    pub fn get(&self, hash: TypeHash) -> Option<&Type> {
        self.types.get(&hash)
    }

    pub fn resolve(&self, r: &TypeRef) -> Option<&Type> {
        self.get(r.hash)
    }

    /// A declared type by namespace key and IDL name, unions included.
    pub fn lookup(&self, namespace: &str, gir_name: &str) -> Option<&Type> {
        self.get(type_hash(namespace, gir_name))
    }

    /// A builtin type by IDL name, e.g. `"gint"` or `"utf8"`.
    pub fn builtin(&self, gir_name: &str) -> Option<&Type> {
        self.get(builtin_hash(gir_name))
    }

    pub fn view<'a>(&'a self, ty: &'a ParamType) -> Option<TypeView<'a>> {
        match ty {
            ParamType::Named(r) => self.get(r.hash).map(TypeView::Named),
            ParamType::Array(a) => Some(TypeView::Array(a)),
            ParamType::Container(c) => {
                let container = self.get(c.container.hash)?.as_container()?;
                Some(TypeView::Container(c, container))
            }
        }
    }

    /// A built namespace by identity key, e.g. `"Gtk-4"`.
    pub fn namespace(&self, versioned: &str) -> Option<&Namespace> {
        self.namespaces.get(versioned)
    }

    /// Built namespaces, dependencies before dependents.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.order.iter().filter_map(|key| self.namespaces.get(key))
    }

    /// Types of one namespace, in lookup order.
    pub fn types_of<'a>(&'a self, ns: &'a Namespace) -> impl Iterator<Item = (TypeHash, &'a Type)> {
        ns.type_hashes().filter_map(|h| self.get(h).map(|t| (h, t)))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    fn get_mut(&mut self, hash: TypeHash) -> Option<&mut Type> {
        self.types.get_mut(&hash)
    }
}

// ============================================================================
// Post-processing
// ============================================================================

/// A change applied to the registry after every namespace is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    /// Flag a class or interface as extended by hand-written code.
    MarkAsManuallyExtended { namespace: String, type_name: String },
}

impl PostProcessor {
    pub fn mark_as_manually_extended(namespace: impl Into<String>, type_name: impl Into<String>) -> Self {
        PostProcessor::MarkAsManuallyExtended {
            namespace: namespace.into(),
            type_name: type_name.into(),
        }
    }

    fn apply(&self, registry: &mut Registry) -> Result<(), BuildError> {
        match self {
            PostProcessor::MarkAsManuallyExtended { namespace, type_name } => {
                if registry.namespace(namespace).is_none() {
                    return Err(BuildError::PostProcess(format!("namespace '{namespace}' not found")));
                }
                match registry.get_mut(type_hash(namespace, type_name)) {
                    Some(Type::Class(c)) => c.manually_extended = true,
                    Some(Type::Interface(i)) => i.manually_extended = true,
                    Some(other) => {
                        return Err(BuildError::PostProcess(format!(
                            "'{namespace}.{type_name}' is a {}, not a class or interface",
                            other.kind_name()
                        )));
                    }
                    None => {
                        return Err(BuildError::PostProcess(format!(
                            "type '{type_name}' not found in '{namespace}'"
                        )));
                    }
                }
                info!(namespace = namespace.as_str(), type_name = type_name.as_str(), "marked as manually extended");
                Ok(())
            }
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects repositories, configuration and post-processors, then builds a
/// [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    config: Config,
    repositories: Vec<IdlRepository>,
    post_processors: Vec<PostProcessor>,
}

impl RegistryBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_repository(mut self, repository: IdlRepository) -> Self {
        self.repositories.push(repository);
        self
    }

    pub fn add_repository(&mut self, repository: IdlRepository) {
        self.repositories.push(repository);
    }

    pub fn with_post_processor(mut self, post_processor: PostProcessor) -> Self {
        self.post_processors.push(post_processor);
        self
    }

    /// Build every namespace of every repository.
    ///
    /// # Errors
    ///
    /// Invalid configuration, duplicate namespaces, conflicting or dangling
    /// manual types and failed post-processors abort the build. Everything
    /// else that goes wrong is recorded in the returned [`BuildReport`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(self) -> Result<(Registry, BuildReport), BuildError> {
        self.config.validate()?;
        let graph = IncludeGraph::new(&self.repositories)?;

        let mut types: TypeStore = builtin_types()
            .into_iter()
            .map(|t| (builtin_hash(t.gir_name()), t))
            .collect();
        let mut namespaces: FxHashMap<String, Namespace> = FxHashMap::default();
        let mut order = Vec::with_capacity(graph.len());
        let mut report = BuildReport::default();

        for versioned in graph.emission_order() {
            let Some((r, n)) = graph.location(versioned) else {
                continue;
            };
            let repo = &self.repositories[r];
            let idl = &repo.namespaces[n];

            let Some(env) = Env::new(&self.config, idl)? else {
                info!(namespace = versioned, "namespace ignored");
                report.namespaces_ignored += 1;
                continue;
            };

            let mut current = Namespace::new(&idl.name, env.version, env.versioned.clone());
            current.includes = graph.transitive_includes(versioned);
            current.c_includes = repo.c_includes.clone();
            current.packages = repo.packages.clone();
            current.shared_libraries = idl.shared_libraries.clone();

            let mut state = BuildState {
                env: &env,
                types: &mut types,
                namespaces: &namespaces,
                current: &mut current,
                report: &mut report,
            };
            build_namespace(&mut state, idl)?;

            report.namespaces_built += 1;
            order.push(current.versioned.clone());
            namespaces.insert(current.versioned.clone(), current);
        }

        let mut registry = Registry {
            types,
            namespaces,
            order,
        };
        for post in &self.post_processors {
            post.apply(&mut registry)?;
        }

        info!(
            namespaces = report.namespaces_built,
            types = report.types_declared,
            callables = report.callables_declared,
            diagnostics = report.diagnostics.len(),
            "registry built"
        );
        Ok((registry, report))
    }
}

fn build_namespace(state: &mut BuildState<'_, '_>, idl: &IdlNamespace) -> Result<(), BuildError> {
    let _span = debug_span!("namespace", name = %state.env.versioned).entered();

    let manual = insert_manual_types(state)?;

    for u in &idl.unions {
        let _span = debug_span!("declare", kind = "union", name = u.name.as_str()).entered();
        if let Some(ty) = declare_union(state.env, state.report, u) {
            let hash = state.current.type_hash(&u.name);
            state.insert(hash, ty.into());
        }
    }
    for (list, bitfield) in [(&idl.enums, false), (&idl.bitfields, true)] {
        for e in list {
            let _span = debug_span!("declare", kind = "enum", name = e.name.as_str()).entered();
            if let Some(ty) = declare_enum(state.env, state.report, e, bitfield) {
                let hash = state.current.type_hash(&e.name);
                state.insert(hash, ty.into());
            }
        }
    }
    for rec in &idl.records {
        let _span = debug_span!("declare", kind = "record", name = rec.name.as_str()).entered();
        if let Some(ty) = declare_record(state.env, state.report, rec) {
            let hash = state.current.type_hash(&rec.name);
            state.insert(hash, ty.into());
        }
    }

    let work = Worklists {
        callbacks: idl
            .callbacks
            .iter()
            .filter_map(|c| callback_stub(state.env, state.report, c))
            .collect(),
        interfaces: idl
            .interfaces
            .iter()
            .filter_map(|i| interface_stub(state.env, state.report, i))
            .collect(),
        classes: idl
            .classes
            .iter()
            .filter_map(|c| class_stub(state.env, state.report, c))
            .collect(),
        aliases: idl
            .aliases
            .iter()
            .filter_map(|a| alias_stub(state.env, state.report, a))
            .collect(),
    };
    let outcome = resolve_all(state, work);
    if !outcome.dropped.is_empty() {
        debug!(passes = outcome.passes, dropped = ?outcome.dropped, "resolver dropped stubs");
    }

    declare_nested(state, idl);

    validate_manual_types(state, &manual)
}

/// Insert the namespace's manual types ahead of everything it declares.
fn insert_manual_types(state: &mut BuildState<'_, '_>) -> Result<Vec<TypeHash>, BuildError> {
    let Some(cfg) = state.env.config.namespace(&state.env.versioned) else {
        return Ok(Vec::new());
    };

    let mut seen = FxHashSet::default();
    let mut hashes = Vec::with_capacity(cfg.manual_types.len());
    for ty in &cfg.manual_types {
        if !seen.insert(ty.gir_name()) {
            return Err(BuildError::ManualTypeConflict {
                namespace: state.env.versioned.clone(),
                name: ty.gir_name().to_string(),
            });
        }
        hashes.push(state.insert_manual(ty.clone()));
    }
    Ok(hashes)
}

/// Types a manual type points at.
fn references(ty: &Type) -> Vec<&TypeRef> {
    match ty {
        Type::Class(c) => c
            .parent
            .iter()
            .chain(c.root.iter())
            .chain(c.implements.iter())
            .collect(),
        Type::Interface(i) => std::iter::once(&i.root).chain(i.prerequisites.iter()).collect(),
        Type::Alias(a) => vec![&a.target],
        _ => Vec::new(),
    }
}

fn validate_manual_types(state: &BuildState<'_, '_>, manual: &[TypeHash]) -> Result<(), BuildError> {
    for hash in manual {
        let Some(ty) = state.types.get(hash) else {
            continue;
        };
        if let Some(missing) = references(ty).into_iter().find(|r| !state.types.contains_key(&r.hash)) {
            return Err(BuildError::UnresolvedManualType {
                namespace: state.env.versioned.clone(),
                name: ty.gir_name().to_string(),
                target: missing.hash.to_string(),
            });
        }
    }
    Ok(())
}
