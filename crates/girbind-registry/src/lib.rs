//! Type registry for GObject-introspection bindings.
//!
//! Turns decoded IDL repositories into a graph of resolved types and callable
//! signatures. Namespaces are built in include order; within a namespace,
//! types that may reference each other are declared as stubs and resolved to
//! a fixed point before any member is declared.
//!
//! ```ignore
//! let (registry, report) = RegistryBuilder::new(Config::default())
//!     .with_repository(glib)
//!     .with_repository(gobject)
//!     .build()?;
//!
//! for ns in registry.namespaces() {
//!     for (hash, ty) in registry.types_of(ns) { /* ... */ }
//! }
//! ```

pub mod config;
mod declare;
mod env;
pub mod includes;
mod lookup;
mod members;
pub mod namespace;
mod nested;
mod params;
mod registry;
mod report;
mod resolver;
pub mod types;
mod unresolved;

pub use config::{Config, GirPattern, IgnoreRule, NamespaceConfig};
pub use includes::IncludeGraph;
pub use members::{CallableSignature, Constant, Field, Signal, VirtualMethod};
pub use namespace::Namespace;
pub use params::{ParamSlot, ParamType, Parameter, Signature};
pub use registry::{PostProcessor, Registry, RegistryBuilder};
pub use report::BuildReport;
pub use resolver::Resolution;

pub use girbind_core::{BuildError, Diagnostic, DiagnosticKind, TypeHash};
