//! Resolved type model.
//!
//! Named types live in the registry's type store keyed by [`TypeHash`]. Parameters
//! and other types refer to them through [`TypeRef`], which also records whether the
//! referenced type is foreign to the referring namespace. Arrays and container
//! instances are anonymous and owned by the parameter that uses them
//! ([`ParamType`](crate::ParamType)).
//!
//! Behaviour that differs per kind is exposed as small capability traits rather
//! than one large interface:
//!
//! ```text
//! PointerConstrained  min/max native pointer depth
//! Convertible         ownership-transfer conversion functions
//! ParamChecked        kind-specific parameter legality
//! FixedArity          number of inner types (containers)
//! ```
//!
//! [`TypeView`] unifies named, array and container types so that callers can
//! query capabilities without matching on every variant.

mod alias;
mod array;
mod callback;
mod class;
mod container;
mod enums;
mod interface;
mod primitive;
mod record;
mod union;

pub use alias::Alias;
pub use array::{ArrayElement, ArrayType};
pub use callback::Callback;
pub use class::Class;
pub use container::{ContainerInstance, ContainerType};
pub use enums::{Enumeration, Member, uniques};
pub use interface::Interface;
pub use primitive::{
    BOOLEAN, BUILTIN_PRIMITIVES, INCOMPATIBLE_C_TYPES, Primitive, StringKind, builtin_by_c_type,
    builtin_by_gir_name,
};
pub use record::Record;
pub use union::Union;

pub(crate) use enums::parse_member_value;
pub(crate) use primitive::{builtin_hash, builtin_types};

use girbind_core::{Transfer, TypeHash, names};

use crate::Parameter;

// ============================================================================
// References
// ============================================================================

/// A non-owning reference to a named type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub hash: TypeHash,
    /// IDL name of the owning namespace when it differs from the referring one.
    pub foreign: Option<String>,
}

impl TypeRef {
    /// A reference to a local or builtin type.
    pub fn local(hash: TypeHash) -> Self {
        Self {
            hash,
            foreign: None,
        }
    }

    /// A reference to a type owned by the namespace `namespace`.
    pub fn foreign(hash: TypeHash, namespace: impl Into<String>) -> Self {
        Self {
            hash,
            foreign: Some(namespace.into()),
        }
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign.is_some()
    }

    /// Qualify a target-language identifier with the foreign module, if any.
    pub fn qualify(&self, ident: &str) -> String {
        match &self.foreign {
            Some(ns) => format!("{}::{}", module_name(ns), ident),
            None => ident.to_string(),
        }
    }
}

/// Target module name for an IDL namespace name: lower-cased alphanumerics.
pub fn module_name(namespace: &str) -> String {
    namespace
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Hash of a type declared in the versioned namespace `namespace` (`"Gtk-4"`).
pub fn type_hash(namespace: &str, gir_name: &str) -> TypeHash {
    TypeHash::from_qualified(namespace, gir_name)
}

// ============================================================================
// Capability Traits
// ============================================================================

/// Types that constrain native pointer depth. `None` means unconstrained.
pub trait PointerConstrained {
    fn min_pointers(&self) -> Option<usize> {
        None
    }

    fn max_pointers(&self) -> Option<usize> {
        None
    }
}

/// Check a pointer depth against a type's bounds.
pub fn pointers_allowed(t: Option<&dyn PointerConstrained>, pointers: usize) -> bool {
    let Some(t) = t else {
        return true;
    };
    if t.min_pointers().is_some_and(|min| min > pointers) {
        return false;
    }
    if t.max_pointers().is_some_and(|max| max < pointers) {
        return false;
    }
    true
}

/// Whether a type needs at least one native pointer.
pub fn requires_pointer(t: Option<&dyn PointerConstrained>) -> bool {
    t.and_then(|t| t.min_pointers()).is_some_and(|min| min > 0)
}

/// Marker for types converted by a plain numeric cast.
pub trait Castable {}

/// Target-side conversion functions for types that wrap native instances.
///
/// A missing function means the transfer mode is not supported in that direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversions {
    pub from_native_borrow: Option<String>,
    pub from_native_none: Option<String>,
    pub from_native_full: Option<String>,
    pub to_native_none: Option<String>,
    pub to_native_full: Option<String>,
}

impl Conversions {
    /// The default function set for the target type `name`.
    pub fn for_type(name: &str) -> Self {
        Self {
            from_native_borrow: Some(format!("{name}::from_glib_borrow")),
            from_native_none: Some(format!("{name}::from_glib_none")),
            from_native_full: Some(format!("{name}::from_glib_full")),
            to_native_none: Some(format!("{name}::to_glib_none")),
            to_native_full: Some(format!("{name}::to_glib_full")),
        }
    }

    /// Function converting a native value received with `transfer`.
    pub fn from_native(&self, transfer: Transfer) -> Option<&str> {
        match transfer {
            Transfer::None => self.from_native_none.as_deref(),
            Transfer::Full => self.from_native_full.as_deref(),
            Transfer::Borrow => self.from_native_borrow.as_deref(),
            Transfer::Container => None,
        }
    }

    /// Function producing a native value handed over with `transfer`.
    pub fn to_native(&self, transfer: Transfer) -> Option<&str> {
        match transfer {
            Transfer::None => self.to_native_none.as_deref(),
            Transfer::Full => self.to_native_full.as_deref(),
            Transfer::Borrow | Transfer::Container => None,
        }
    }
}

/// Types with ownership-transfer conversions.
pub trait Convertible {
    fn conversions(&self) -> &Conversions;

    fn can_transfer_to_native(&self, transfer: Transfer) -> bool {
        self.conversions().to_native(transfer).is_some()
    }

    fn can_transfer_from_native(&self, transfer: Transfer) -> bool {
        self.conversions().from_native(transfer).is_some()
    }
}

/// Types with a legality rule beyond pointer bounds.
pub trait ParamChecked {
    fn allowed_for_param(&self, param: &Parameter) -> bool;
}

/// Types parameterised by a fixed number of inner types.
pub trait FixedArity {
    fn arity(&self) -> usize;
}

// ============================================================================
// Named Types
// ============================================================================

/// A named type stored in the registry.
#[derive(Debug, Clone)]
pub enum Type {
    /// Numeric or untyped-pointer primitive, converted by cast.
    Primitive(Primitive),
    /// Native boolean; truthiness differs from the target's.
    Boolean(Primitive),
    String(StringKind),
    /// `none`.
    Void,
    Alias(Alias),
    Enum(Enumeration),
    Bitfield(Enumeration),
    Record(Record),
    Union(Union),
    Callback(Callback),
    Class(Class),
    Interface(Interface),
    Container(ContainerType),
}

impl Type {
    /// Short kind label for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Primitive(_) => "primitive",
            Type::Boolean(_) => "boolean",
            Type::String(_) => "string",
            Type::Void => "void",
            Type::Alias(_) => "alias",
            Type::Enum(_) => "enum",
            Type::Bitfield(_) => "bitfield",
            Type::Record(_) => "record",
            Type::Union(_) => "union",
            Type::Callback(_) => "callback",
            Type::Class(_) => "class",
            Type::Interface(_) => "interface",
            Type::Container(_) => "container",
        }
    }

    pub fn gir_name(&self) -> &str {
        match self {
            Type::Primitive(p) | Type::Boolean(p) => p.gir_name,
            Type::String(s) => s.gir_name(),
            Type::Void => "none",
            Type::Alias(a) => &a.gir_name,
            Type::Enum(e) | Type::Bitfield(e) => &e.gir_name,
            Type::Record(r) => &r.gir_name,
            Type::Union(u) => &u.gir_name,
            Type::Callback(c) => &c.gir_name,
            Type::Class(c) => &c.gir_name,
            Type::Interface(i) => &i.gir_name,
            Type::Container(c) => &c.gir_name,
        }
    }

    /// Native type name without pointers.
    pub fn base_c_type(&self) -> &str {
        match self {
            Type::Primitive(p) | Type::Boolean(p) => p.c_type,
            Type::String(_) => "gchar",
            Type::Void => "void",
            Type::Alias(a) => &a.c_type,
            Type::Enum(e) | Type::Bitfield(e) => &e.c_type,
            Type::Record(r) => &r.c_type,
            Type::Union(u) => &u.c_type,
            Type::Callback(c) => &c.c_type,
            Type::Class(c) => &c.c_type,
            Type::Interface(i) => &i.c_type,
            Type::Container(c) => &c.c_type,
        }
    }

    /// Native type spelled with `pointers` indirections.
    pub fn c_type(&self, pointers: usize) -> String {
        match self {
            Type::String(_) => "gchar*".to_string(),
            _ => format!("{}{}", self.base_c_type(), "*".repeat(pointers)),
        }
    }

    /// Native-ABI type as seen from target code.
    pub fn ffi_type(&self, pointers: usize) -> String {
        let base = match self {
            Type::String(_) => return "*mut ffi::gchar".to_string(),
            Type::Void if pointers > 0 => "c_void".to_string(),
            _ => format!("ffi::{}", self.base_c_type()),
        };
        format!("{}{}", "*mut ".repeat(pointers), base)
    }

    /// Target-language type. Wrapper types ignore pointer depth.
    pub fn target_type(&self, pointers: usize) -> String {
        match self {
            Type::Primitive(p) | Type::Boolean(p) => {
                format!("{}{}", "*mut ".repeat(pointers), p.target)
            }
            Type::String(_) => "String".to_string(),
            Type::Void => "()".to_string(),
            Type::Alias(a) => a.target_name.clone(),
            Type::Enum(e) | Type::Bitfield(e) => e.target_name.clone(),
            Type::Record(r) => r.target_name.clone(),
            Type::Union(u) => u.target_name.clone(),
            Type::Callback(c) => c.target_name.clone(),
            Type::Class(c) => c.target_name.clone(),
            Type::Interface(i) => i.target_name.clone(),
            Type::Container(c) => c.gir_name.clone(),
        }
    }

    pub fn is_castable(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_untyped_pointer(&self) -> bool {
        matches!(self, Type::Primitive(p) if p.untyped_pointer)
    }

    pub fn as_pointer_constrained(&self) -> Option<&dyn PointerConstrained> {
        match self {
            Type::String(s) => Some(s),
            Type::Enum(e) | Type::Bitfield(e) => Some(e),
            Type::Record(r) => Some(r),
            Type::Callback(c) => Some(c),
            Type::Class(c) => Some(c),
            Type::Interface(i) => Some(i),
            Type::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_convertible(&self) -> Option<&dyn Convertible> {
        match self {
            Type::Record(r) => Some(r),
            Type::Class(c) => Some(c),
            Type::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_param_checked(&self) -> Option<&dyn ParamChecked> {
        match self {
            Type::Callback(c) => Some(c),
            Type::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Type::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&Interface> {
        match self {
            Type::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Type::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Type::Callback(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerType> {
        match self {
            Type::Container(c) => Some(c),
            _ => None,
        }
    }
}

// ============================================================================
// Views
// ============================================================================

/// Borrowed view over anything a parameter can be typed as.
#[derive(Debug, Clone, Copy)]
pub enum TypeView<'a> {
    Named(&'a Type),
    Array(&'a ArrayType),
    Container(&'a ContainerInstance, &'a ContainerType),
}

impl<'a> TypeView<'a> {
    pub fn gir_name(&self) -> String {
        match self {
            TypeView::Named(t) => t.gir_name().to_string(),
            TypeView::Array(a) => a.gir_name(),
            TypeView::Container(_, c) => c.gir_name.clone(),
        }
    }

    pub fn named(&self) -> Option<&'a Type> {
        match self {
            TypeView::Named(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_castable(&self) -> bool {
        matches!(self, TypeView::Named(t) if t.is_castable())
    }

    pub fn is_untyped_pointer(&self) -> bool {
        matches!(self, TypeView::Named(t) if t.is_untyped_pointer())
    }

    pub fn as_pointer_constrained(&self) -> Option<&'a dyn PointerConstrained> {
        match self {
            TypeView::Named(t) => t.as_pointer_constrained(),
            TypeView::Array(a) => Some(*a),
            TypeView::Container(_, c) => Some(*c),
        }
    }

    pub fn as_convertible(&self) -> Option<&'a dyn Convertible> {
        match self {
            TypeView::Named(t) => t.as_convertible(),
            _ => None,
        }
    }

    pub fn as_param_checked(&self) -> Option<&'a dyn ParamChecked> {
        match self {
            TypeView::Named(t) => t.as_param_checked(),
            TypeView::Container(_, c) => Some(*c),
            TypeView::Array(_) => None,
        }
    }
}

/// Target name for a declared type: the IDL name with keyword escaping.
pub(crate) fn declared_target_name(gir_name: &str) -> String {
    names::escape_keyword(gir_name)
}
