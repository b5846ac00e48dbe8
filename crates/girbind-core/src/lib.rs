//! Core types for girbind.
//!
//! This crate holds what every stage of the binding pipeline agrees on:
//!
//! - [`idl`]: the decoded interface-description tree consumed by the registry
//! - [`TypeHash`]: deterministic identity for named types and callables
//! - ownership/direction/scope annotations ([`Transfer`], [`Direction`], [`CallbackScope`])
//! - [`Version`] parsing and namespace identity keys
//! - [`BuildError`] and [`Diagnostic`], the fatal and non-fatal halves of error reporting
//! - [`names`]: identifier case conversion

mod annotations;
mod error;
pub mod idl;
pub mod names;
mod type_hash;
mod version;

pub use annotations::{CallbackScope, Direction, ParamFlags, ParameterMode, Transfer};
pub use error::{BuildError, Diagnostic, DiagnosticKind};
pub use type_hash::{TypeHash, hash_constants};
pub use version::{Version, versioned_namespace};
