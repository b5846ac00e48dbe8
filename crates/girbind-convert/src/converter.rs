//! Conversion strategies and their emitted code.
//!
//! A [`Converter`] pairs one parameter with the [`Strategy`] chosen for one
//! direction. Emission assumes the surrounding code has declared a variable
//! for both sides of the parameter: `target_name` on the target side and
//! `c_name` on the native side. Out parameters are written through on the
//! native side when converting to native.

use std::fmt;

use girbind_core::Transfer;
use girbind_registry::Parameter;

use crate::writer::{CodeWriter, block};

/// Which way a value crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Target value to native value.
    ToNative,
    /// Native value to target value.
    FromNative,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::ToNative => f.write_str("to native"),
            Flow::FromNative => f.write_str("from native"),
        }
    }
}

/// Converts one element of a returned container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildConverter {
    String { transfer: Transfer },
    Convertible { function: String },
}

/// How a converted borrowed value is kept valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Borrow {
    Owned,
    /// Tied to the target-side variable of another parameter.
    TiedTo(String),
    /// Nothing to tie to; validity ends with the native call.
    Unbound,
}

/// Closure bookkeeping for a callback handed to native code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackStrategy {
    pub trampoline: String,
    /// Native name of the user-data parameter receiving the closure handle.
    pub closure: String,
    /// Registry function storing the closure.
    pub register: String,
    /// Set for call scope: the closure is deleted once the call returns.
    pub delete_after_call: Option<String>,
    /// Native name of the destroy parameter and the notifier to pass in it.
    pub destroy: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Synthesized from another parameter.
    Implicit,
    Skipped,
    /// Carries a closure handle; converting from native loads the closure.
    UserData { load: String },
    Unimplemented {
        reason: String,
        /// Everything known about the parameter, for the generated message.
        context: String,
        /// Native names of linked parameters the emitted stub must still use.
        mentions: Vec<String>,
    },
    /// A returned generic container, one child converter per inner type.
    Container { function: String, children: Vec<ChildConverter> },
    FixedArray {
        size: usize,
        native_element: String,
        target_element: String,
    },
    /// An empty string stands for null.
    NullableString,
    Nullable(Box<Strategy>),
    String,
    Boolean,
    Cast,
    Alias(Box<Strategy>),
    Callback(CallbackStrategy),
    Convertible { function: String, borrow: Borrow },
}

impl Strategy {
    pub fn is_unimplemented(&self) -> bool {
        match self {
            Strategy::Unimplemented { .. } => true,
            Strategy::Nullable(inner) | Strategy::Alias(inner) => inner.is_unimplemented(),
            _ => false,
        }
    }

    fn label(&self) -> String {
        match self {
            Strategy::Implicit => "implicit".to_string(),
            Strategy::Skipped => "skipped".to_string(),
            Strategy::UserData { .. } => "user data".to_string(),
            Strategy::Unimplemented { reason, .. } => format!("unimplemented ({reason})"),
            Strategy::Container { function, .. } => format!("container via {function}"),
            Strategy::FixedArray { size, .. } => format!("fixed array of {size}"),
            Strategy::NullableString => "nullable string".to_string(),
            Strategy::Nullable(inner) => format!("nullable {}", inner.label()),
            Strategy::String => "string".to_string(),
            Strategy::Boolean => "boolean".to_string(),
            Strategy::Cast => "cast".to_string(),
            Strategy::Alias(inner) => format!("alias of {}", inner.label()),
            Strategy::Callback(cb) => format!("callback via {}", cb.trampoline),
            Strategy::Convertible { function, .. } => format!("converted via {function}"),
        }
    }
}

/// The strategy selected for one parameter in one direction.
#[derive(Debug, Clone)]
pub struct Converter<'a> {
    pub param: &'a Parameter,
    pub flow: Flow,
    pub strategy: Strategy,
    /// Target-language type of the target-side variable.
    pub target_type: String,
    /// Native ABI type of the native-side variable.
    pub ffi_type: String,
}

impl Converter<'_> {
    pub fn is_unimplemented(&self) -> bool {
        self.strategy.is_unimplemented()
    }

    /// One-line summary, e.g. `"cargs: string (in, transfer: none)"`.
    pub fn describe(&self) -> String {
        match &self.strategy {
            Strategy::Unimplemented { reason, context, .. } => {
                format!("{}: unimplemented: {reason} [{context}]", self.param.c_name)
            }
            s => format!(
                "{}: {} ({}, transfer: {})",
                self.param.c_name,
                s.label(),
                self.param.direction,
                self.param.transfer
            ),
        }
    }

    /// Emit the conversion.
    pub fn apply(&self, w: &mut dyn CodeWriter) {
        match self.flow {
            Flow::ToNative => self.to_native(&self.strategy, w),
            Flow::FromNative => self.from_native(&self.strategy, w),
        }
    }

    /// Emit whatever must run after the native call returns.
    pub fn apply_after_call(&self, w: &mut dyn CodeWriter) {
        if let Strategy::Callback(cb) = &self.strategy
            && let Some(delete) = &cb.delete_after_call
        {
            w.line(&format!("{delete}({});", cb.closure));
        }
    }

    fn target(&self) -> &str {
        &self.param.target_name
    }

    /// The native variable as an assignment destination.
    fn native_dest(&self) -> String {
        if self.param.is_out() {
            format!("*{}", self.param.c_name)
        } else {
            self.param.c_name.clone()
        }
    }

    fn to_native(&self, strategy: &Strategy, w: &mut dyn CodeWriter) {
        let t = self.target();
        let c = &self.param.c_name;
        let dest = self.native_dest();

        match strategy {
            Strategy::Implicit | Strategy::Skipped | Strategy::UserData { .. } => {}
            Strategy::Unimplemented { .. } => self.unimplemented(w),
            // Only selected from native.
            Strategy::Container { .. } => self.unimplemented(w),
            Strategy::FixedArray {
                size, native_element, ..
            } => {
                w.line(&format!("let mut {c}_array = [0 as {native_element}; {size}];"));
                block(w, &format!("for (dst, src) in {c}_array.iter_mut().zip({t}.iter())"), |w| {
                    w.line(&format!("*dst = *src as {native_element};"));
                });
                w.line(&format!("{dest} = {c}_array.as_mut_ptr();"));
            }
            Strategy::NullableString => {
                w.line(&format!(
                    "let {c}_owned = (!{t}.is_empty()).then(|| std::ffi::CString::new({t}.as_str()).unwrap_or_default());"
                ));
                block(w, &format!("if let Some(owned) = &{c}_owned"), |w| {
                    w.line(&format!("{dest} = {};", self.native_string("owned")));
                });
            }
            Strategy::Nullable(inner) => {
                block(w, &format!("if let Some({t}) = {t}"), |w| self.to_native(inner, w));
            }
            Strategy::String => {
                w.line(&format!(
                    "let {c}_owned = std::ffi::CString::new({t}.as_str()).unwrap_or_default();"
                ));
                w.line(&format!("{dest} = {};", self.native_string(&format!("{c}_owned"))));
            }
            Strategy::Boolean => {
                w.line(&format!("{dest} = if {t} {{ ffi::GTRUE }} else {{ ffi::GFALSE }};"));
            }
            Strategy::Cast => w.line(&format!("{dest} = {t} as {};", self.ffi_type)),
            Strategy::Alias(inner) => self.to_native(inner, w),
            Strategy::Callback(cb) => {
                w.line(&format!("{dest} = Some({});", cb.trampoline));
                w.line(&format!("{} = {}(Box::new({t}));", cb.closure, cb.register));
                if let Some((destroy, notify)) = &cb.destroy {
                    w.line(&format!("{destroy} = Some({notify});"));
                }
            }
            Strategy::Convertible { function, .. } => {
                w.line(&format!("{dest} = {function}(&{t});"));
            }
        }
    }

    /// A native string owned by the callee when transfer is full, borrowed from
    /// `owned` otherwise.
    fn native_string(&self, owned: &str) -> String {
        match self.param.transfer {
            Transfer::Full => format!("ffi::g_strdup({owned}.as_ptr())"),
            _ => format!("{owned}.as_ptr() as *mut _"),
        }
    }

    fn from_native(&self, strategy: &Strategy, w: &mut dyn CodeWriter) {
        let t = self.target();
        let c = &self.param.c_name;

        match strategy {
            Strategy::Implicit | Strategy::Skipped => {}
            Strategy::UserData { load } => w.line(&format!("{t} = {load}({c});")),
            Strategy::Unimplemented { .. } => self.unimplemented(w),
            Strategy::Container { function, children } => {
                let args: Vec<String> = (0..children.len()).map(|i| format!("v{i}")).collect();
                block(w, &format!("{t} = {function}({c} as *mut _, |{}|", args.join(", ")), |w| {
                    for (i, child) in children.iter().enumerate() {
                        match child {
                            ChildConverter::String { transfer } => {
                                w.line(&format!(
                                    "let e{i} = std::ffi::CStr::from_ptr(v{i} as *const _).to_string_lossy().into_owned();"
                                ));
                                if *transfer == Transfer::Full {
                                    w.line(&format!("ffi::g_free(v{i} as *mut _);"));
                                }
                            }
                            ChildConverter::Convertible { function } => {
                                w.line(&format!("let e{i} = {function}(v{i} as *mut _);"));
                            }
                        }
                    }
                    let elements: Vec<String> = (0..children.len()).map(|i| format!("e{i}")).collect();
                    match elements.as_slice() {
                        [single] => w.line(single),
                        _ => w.line(&format!("({})", elements.join(", "))),
                    }
                });
                w.line(");");
            }
            Strategy::FixedArray {
                size, target_element, ..
            } => {
                w.line(&format!(
                    "{t} = std::slice::from_raw_parts({c}, {size}).iter().map(|v| *v as {target_element}).collect();"
                ));
            }
            Strategy::NullableString => {
                block(w, &format!("if !{c}.is_null()"), |w| self.from_native(&Strategy::String, w));
            }
            Strategy::Nullable(inner) => {
                block(w, &format!("if !{c}.is_null()"), |w| self.from_native(inner, w));
            }
            Strategy::String => {
                w.line(&format!(
                    "{t} = std::ffi::CStr::from_ptr({c} as *const _).to_string_lossy().into_owned();"
                ));
                if self.param.transfer == Transfer::Full {
                    w.line(&format!("ffi::g_free({c} as *mut _);"));
                }
            }
            Strategy::Boolean => w.line(&format!("{t} = {c} != ffi::GFALSE;")),
            Strategy::Cast => w.line(&format!("{t} = {c} as {};", self.target_type)),
            Strategy::Alias(inner) => self.from_native(inner, w),
            // Only selected to native.
            Strategy::Callback(_) => self.unimplemented(w),
            Strategy::Convertible { function, borrow } => match borrow {
                Borrow::Owned => w.line(&format!("{t} = {function}({c});")),
                Borrow::TiedTo(source) => w.line(&format!("{t} = {function}({c}, &{source});")),
                Borrow::Unbound => {
                    w.line(&format!(
                        "// borrow not bound to another value: {t} must not outlive the native call"
                    ));
                    w.line(&format!("{t} = {function}({c});"));
                }
            },
        }
    }

    fn unimplemented(&self, w: &mut dyn CodeWriter) {
        let (reason, mentions) = match &self.strategy {
            Strategy::Unimplemented { reason, mentions, .. } => (reason.as_str(), mentions.as_slice()),
            _ => ("unknown reason", &[][..]),
        };

        match self.flow {
            Flow::ToNative => w.line(&format!("let _ = &{};", self.target())),
            Flow::FromNative => w.line(&format!("let _ = {};", self.param.c_name)),
        }
        for name in mentions {
            w.line(&format!("let _ = {name};"));
        }
        w.line(&format!(
            "unimplemented!(\"{} {} ({}): {}\");",
            self.flow,
            self.param.target_name,
            self.param.c_type.replace('"', "'"),
            reason.replace('"', "'")
        ));
    }
}
