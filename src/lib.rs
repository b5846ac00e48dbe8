//! girbind builds a resolved type registry from interface descriptions of
//! native object-system libraries and plans how every value of every
//! callable crosses the native boundary.
//!
//! The work is split across three crates, re-exported here:
//!
//! - [`core`]: the IDL tree, annotations, type hashes and errors
//! - [`registry`]: declaration, fixed-point resolution and the immutable [`Registry`](registry::Registry)
//! - [`convert`]: conversion strategy selection and emission
//!
//! ```ignore
//! use girbind::prelude::*;
//!
//! let (registry, report) = RegistryBuilder::new(config)
//!     .with_repository(gobject)
//!     .with_repository(gio)
//!     .build()?;
//!
//! for ns in registry.namespaces() {
//!     for f in &ns.functions {
//!         let converters = CallableConverters::new(&registry, &f.signature, ParameterMode::Callable);
//!         if !converters.is_complete() {
//!             println!("{}: conversion gaps", f.c_identifier);
//!         }
//!     }
//! }
//! println!("{} diagnostics", report.diagnostics.len());
//! ```

pub use girbind_convert as convert;
pub use girbind_core as core;
pub use girbind_registry as registry;

pub mod prelude {
    pub use girbind_convert::{
        CallableConverters, CodeWriter, Converter, Flow, IndentWriter, RuntimeHooks, Strategy,
        emit_virtual_method_override, select_from_native, select_to_native,
    };
    pub use girbind_core::idl::*;
    pub use girbind_core::{
        BuildError, CallbackScope, Diagnostic, DiagnosticKind, Direction, ParamFlags, ParameterMode,
        Transfer, TypeHash, Version,
    };
    pub use girbind_registry::types::{Type, TypeRef, TypeView};
    pub use girbind_registry::{
        BuildReport, Config, IgnoreRule, NamespaceConfig, ParamSlot, ParamType, Parameter,
        PostProcessor, Registry, RegistryBuilder, Signature,
    };
}
