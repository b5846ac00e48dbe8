//! Conversion strategy selection and emission.
//!
//! For every target-facing parameter of a resolved [`Signature`], a
//! [`Converter`] decides how the value crosses the native boundary in one
//! direction and can write that conversion as target code.
//!
//! ```ignore
//! use girbind_convert::{CallableConverters, IndentWriter};
//! use girbind_core::ParameterMode;
//!
//! let converters = CallableConverters::new(&registry, &method.signature, ParameterMode::Callable);
//! let mut w = IndentWriter::new();
//! converters.apply_inputs(&mut w);
//! for gap in converters.unimplemented() {
//!     println!("{}", gap.describe());
//! }
//! ```
//!
//! Selection never fails; parameters no strategy covers get a converter
//! that emits an `unimplemented!` stub naming everything known about them.
//!
//! [`Signature`]: girbind_registry::Signature

mod callable;
mod converter;
mod from_native;
pub mod hooks;
pub mod overrides;
mod select;
mod to_native;
pub mod writer;

pub use callable::CallableConverters;
pub use converter::{Borrow, CallbackStrategy, ChildConverter, Converter, Flow, Strategy};
pub use from_native::select_from_native;
pub use hooks::RuntimeHooks;
pub use overrides::{OverrideError, emit_virtual_method_override};
pub use to_native::select_to_native;
pub use writer::{CodeWriter, IndentWriter};
