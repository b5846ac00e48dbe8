//! Decoded IDL document tree.
//!
//! This is the input to the registry build: one [`IdlRepository`] per parsed
//! interface description file. Deserialization from XML happens elsewhere; these
//! types only mirror the document structure with optional attributes left
//! optional, so that defaults are applied in exactly one place (the registry).
//!
//! ```text
//! IdlRepository
//! └── IdlNamespace
//!     ├── IdlAlias / IdlEnum (enums + bitfields) / IdlRecord / IdlUnion
//!     ├── IdlCallback
//!     ├── IdlClass / IdlInterface
//!     │   └── IdlCallable (functions, methods, constructors, virtual methods)
//!     │       ├── IdlParameter (instance + positional)
//!     │       └── IdlReturnValue
//!     ├── IdlCallable (namespace functions)
//!     └── IdlConstant
//! ```
//!
//! All node types implement `Default` and offer `with_*` builders for the
//! attributes tests and embedders commonly set.

use crate::{CallbackScope, Direction, Transfer};

// ============================================================================
// Common Attributes
// ============================================================================

/// Availability metadata shared by most nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoAttrs {
    /// `false` marks nodes the IDL producer could not describe fully.
    pub introspectable: bool,
    pub deprecated: bool,
    pub deprecated_version: Option<String>,
    /// Version in which the node was introduced.
    pub version: Option<String>,
}

impl Default for InfoAttrs {
    fn default() -> Self {
        Self {
            introspectable: true,
            deprecated: false,
            deprecated_version: None,
            version: None,
        }
    }
}

/// A `<type>` reference. `inner` holds container element types.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlType {
    /// IDL name, possibly qualified (`"GLib.Error"`).
    pub name: String,
    /// Native type string, e.g. `"const gchar*"`. Empty when absent.
    pub c_type: String,
    pub inner: Vec<IdlType>,
}

impl IdlType {
    pub fn new(name: impl Into<String>, c_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            c_type: c_type.into(),
            inner: Vec::new(),
        }
    }

    pub fn with_inner(mut self, inner: IdlType) -> Self {
        self.inner.push(inner);
        self
    }
}

/// An `<array>` reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlArray {
    /// Set for boxed array types (`"GLib.PtrArray"`); empty for C arrays.
    pub name: String,
    pub c_type: String,
    /// Index of the parameter carrying the element count.
    pub length: Option<usize>,
    pub zero_terminated: Option<bool>,
    pub fixed_size: Option<usize>,
    pub inner: Box<IdlAnyType>,
}

impl IdlArray {
    pub fn new(c_type: impl Into<String>, inner: IdlAnyType) -> Self {
        Self {
            c_type: c_type.into(),
            inner: Box::new(inner),
            ..Self::default()
        }
    }

    pub fn with_length(mut self, index: usize) -> Self {
        self.length = Some(index);
        self
    }

    pub fn with_fixed_size(mut self, size: usize) -> Self {
        self.fixed_size = Some(size);
        self
    }

    pub fn with_zero_terminated(mut self, zero_terminated: bool) -> Self {
        self.zero_terminated = Some(zero_terminated);
        self
    }
}

/// Either a plain type or an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdlAnyType {
    Type(IdlType),
    Array(IdlArray),
}

impl Default for IdlAnyType {
    fn default() -> Self {
        IdlAnyType::Type(IdlType::default())
    }
}

impl From<IdlType> for IdlAnyType {
    fn from(ty: IdlType) -> Self {
        IdlAnyType::Type(ty)
    }
}

impl From<IdlArray> for IdlAnyType {
    fn from(array: IdlArray) -> Self {
        IdlAnyType::Array(array)
    }
}

// ============================================================================
// Callables
// ============================================================================

/// A parameter, including the instance parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlParameter {
    pub name: String,
    pub direction: Option<Direction>,
    pub transfer: Option<Transfer>,
    pub scope: Option<CallbackScope>,
    /// Index of the user-data parameter, or this parameter's own index.
    pub closure: Option<usize>,
    /// Index of the destroy-notify parameter.
    pub destroy: Option<usize>,
    pub caller_allocates: bool,
    pub skip: bool,
    pub optional: bool,
    pub nullable: bool,
    pub ty: IdlAnyType,
}

impl IdlParameter {
    pub fn new(name: impl Into<String>, ty: impl Into<IdlAnyType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ..Self::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_transfer(mut self, transfer: Transfer) -> Self {
        self.transfer = Some(transfer);
        self
    }

    pub fn with_scope(mut self, scope: CallbackScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_closure(mut self, index: usize) -> Self {
        self.closure = Some(index);
        self
    }

    pub fn with_destroy(mut self, index: usize) -> Self {
        self.destroy = Some(index);
        self
    }

    pub fn with_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_caller_allocates(mut self) -> Self {
        self.caller_allocates = true;
        self
    }

    pub fn with_skip(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// A `<return-value>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlReturnValue {
    pub transfer: Option<Transfer>,
    pub nullable: bool,
    pub skip: bool,
    pub ty: IdlAnyType,
}

impl IdlReturnValue {
    pub fn new(ty: impl Into<IdlAnyType>) -> Self {
        Self {
            ty: ty.into(),
            ..Self::default()
        }
    }

    /// A `none`/`void` return.
    pub fn void() -> Self {
        Self::new(IdlType::new("none", "void"))
    }

    pub fn with_transfer(mut self, transfer: Transfer) -> Self {
        self.transfer = Some(transfer);
        self
    }

    pub fn with_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Function, method, constructor, virtual method or callback body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlCallable {
    pub name: String,
    /// Native symbol. Empty for virtual methods, signals and callbacks.
    pub c_identifier: String,
    pub shadowed_by: Option<String>,
    pub shadows: Option<String>,
    pub moved_to: Option<String>,
    pub throws: bool,
    /// Virtual methods only: the method that invokes this slot.
    pub invoker: Option<String>,
    pub info: InfoAttrs,
    pub instance_parameter: Option<IdlParameter>,
    pub parameters: Vec<IdlParameter>,
    pub return_value: Option<IdlReturnValue>,
}

impl IdlCallable {
    pub fn new(name: impl Into<String>, c_identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            c_identifier: c_identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_instance(mut self, param: IdlParameter) -> Self {
        self.instance_parameter = Some(param);
        self
    }

    pub fn with_param(mut self, param: IdlParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_return(mut self, ret: IdlReturnValue) -> Self {
        self.return_value = Some(ret);
        self
    }

    pub fn with_throws(mut self) -> Self {
        self.throws = true;
        self
    }

    pub fn with_info(mut self, info: InfoAttrs) -> Self {
        self.info = info;
        self
    }

    pub fn with_invoker(mut self, invoker: impl Into<String>) -> Self {
        self.invoker = Some(invoker.into());
        self
    }
}

/// A `<callback>` type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlCallback {
    pub c_type: String,
    pub callable: IdlCallable,
}

impl IdlCallback {
    pub fn new(c_type: impl Into<String>, callable: IdlCallable) -> Self {
        Self {
            c_type: c_type.into(),
            callable,
        }
    }

    pub fn name(&self) -> &str {
        &self.callable.name
    }
}

/// A `<glib:signal>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlSignal {
    pub name: String,
    pub action: bool,
    pub detailed: bool,
    pub info: InfoAttrs,
    pub parameters: Vec<IdlParameter>,
    pub return_value: Option<IdlReturnValue>,
}

impl IdlSignal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_action(mut self) -> Self {
        self.action = true;
        self
    }

    pub fn with_param(mut self, param: IdlParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_return(mut self, ret: IdlReturnValue) -> Self {
        self.return_value = Some(ret);
        self
    }
}

// ============================================================================
// Type Declarations
// ============================================================================

/// An `<alias>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlAlias {
    pub name: String,
    pub c_type: String,
    pub info: InfoAttrs,
    pub ty: IdlType,
}

impl IdlAlias {
    pub fn new(name: impl Into<String>, c_type: impl Into<String>, ty: IdlType) -> Self {
        Self {
            name: name.into(),
            c_type: c_type.into(),
            ty,
            ..Self::default()
        }
    }
}

/// An enumeration or bitfield `<member>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlMember {
    pub name: String,
    /// Raw value text: decimal, negative or `0x` hexadecimal.
    pub value: String,
    pub c_identifier: String,
    pub info: InfoAttrs,
}

impl IdlMember {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        c_identifier: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            c_identifier: c_identifier.into(),
            ..Self::default()
        }
    }
}

/// An `<enumeration>` or `<bitfield>`; the namespace list it sits in decides which.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlEnum {
    pub name: String,
    pub c_type: String,
    pub glib_get_type: Option<String>,
    pub error_domain: Option<String>,
    pub info: InfoAttrs,
    pub members: Vec<IdlMember>,
    pub functions: Vec<IdlCallable>,
}

impl IdlEnum {
    pub fn new(name: impl Into<String>, c_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            c_type: c_type.into(),
            ..Self::default()
        }
    }

    pub fn with_member(mut self, member: IdlMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_function(mut self, function: IdlCallable) -> Self {
        self.functions.push(function);
        self
    }
}

/// A `<field>` of a record, union or class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlField {
    pub name: String,
    pub readable: bool,
    pub writable: bool,
    pub private: bool,
    pub bits: u32,
    pub info: InfoAttrs,
    /// Absent for inline callback fields.
    pub ty: Option<IdlAnyType>,
}

impl Default for IdlField {
    fn default() -> Self {
        Self {
            name: String::new(),
            readable: true,
            writable: false,
            private: false,
            bits: 0,
            info: InfoAttrs::default(),
            ty: None,
        }
    }
}

impl IdlField {
    pub fn new(name: impl Into<String>, ty: impl Into<IdlAnyType>) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty.into()),
            ..Self::default()
        }
    }

    /// A function-pointer field, as found in class structs.
    pub fn callback(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn with_writable(mut self) -> Self {
        self.writable = true;
        self
    }
}

/// A `<record>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlRecord {
    pub name: String,
    pub c_type: String,
    pub glib_get_type: Option<String>,
    /// Name of the class or interface this record is the class struct for.
    pub is_gtype_struct_for: Option<String>,
    /// Opaque: fields are not part of the public ABI.
    pub disguised: bool,
    pub foreign: bool,
    pub info: InfoAttrs,
    pub fields: Vec<IdlField>,
    pub functions: Vec<IdlCallable>,
    pub methods: Vec<IdlCallable>,
    pub constructors: Vec<IdlCallable>,
}

impl IdlRecord {
    pub fn new(name: impl Into<String>, c_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            c_type: c_type.into(),
            ..Self::default()
        }
    }

    pub fn with_disguised(mut self) -> Self {
        self.disguised = true;
        self
    }

    pub fn with_foreign(mut self) -> Self {
        self.foreign = true;
        self
    }

    pub fn with_gtype_struct_for(mut self, name: impl Into<String>) -> Self {
        self.is_gtype_struct_for = Some(name.into());
        self
    }

    pub fn with_field(mut self, field: IdlField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: IdlCallable) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_function(mut self, function: IdlCallable) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_constructor(mut self, constructor: IdlCallable) -> Self {
        self.constructors.push(constructor);
        self
    }
}

/// A `<union>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlUnion {
    pub name: String,
    pub c_type: String,
    pub glib_get_type: Option<String>,
    pub info: InfoAttrs,
    pub fields: Vec<IdlField>,
    pub functions: Vec<IdlCallable>,
    pub methods: Vec<IdlCallable>,
    pub constructors: Vec<IdlCallable>,
}

impl IdlUnion {
    pub fn new(name: impl Into<String>, c_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            c_type: c_type.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: IdlField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: IdlCallable) -> Self {
        self.methods.push(method);
        self
    }
}

/// A `<class>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlClass {
    pub name: String,
    pub c_type: String,
    /// Empty for fundamental types.
    pub parent: Option<String>,
    pub glib_type_struct: Option<String>,
    pub glib_get_type: Option<String>,
    pub is_abstract: bool,
    pub info: InfoAttrs,
    pub implements: Vec<String>,
    pub constructors: Vec<IdlCallable>,
    pub methods: Vec<IdlCallable>,
    pub functions: Vec<IdlCallable>,
    pub virtual_methods: Vec<IdlCallable>,
    pub fields: Vec<IdlField>,
    pub signals: Vec<IdlSignal>,
}

impl IdlClass {
    pub fn new(name: impl Into<String>, c_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            c_type: c_type.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_type_struct(mut self, name: impl Into<String>) -> Self {
        self.glib_type_struct = Some(name.into());
        self
    }

    pub fn with_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_implements(mut self, name: impl Into<String>) -> Self {
        self.implements.push(name.into());
        self
    }

    pub fn with_constructor(mut self, constructor: IdlCallable) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn with_method(mut self, method: IdlCallable) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_function(mut self, function: IdlCallable) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_virtual_method(mut self, vm: IdlCallable) -> Self {
        self.virtual_methods.push(vm);
        self
    }

    pub fn with_field(mut self, field: IdlField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_signal(mut self, signal: IdlSignal) -> Self {
        self.signals.push(signal);
        self
    }
}

/// An `<interface>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlInterface {
    pub name: String,
    pub c_type: String,
    pub glib_type_struct: Option<String>,
    pub glib_get_type: Option<String>,
    pub info: InfoAttrs,
    pub prerequisites: Vec<String>,
    pub methods: Vec<IdlCallable>,
    pub functions: Vec<IdlCallable>,
    pub virtual_methods: Vec<IdlCallable>,
    pub signals: Vec<IdlSignal>,
}

impl IdlInterface {
    pub fn new(name: impl Into<String>, c_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            c_type: c_type.into(),
            ..Self::default()
        }
    }

    pub fn with_type_struct(mut self, name: impl Into<String>) -> Self {
        self.glib_type_struct = Some(name.into());
        self
    }

    pub fn with_prerequisite(mut self, name: impl Into<String>) -> Self {
        self.prerequisites.push(name.into());
        self
    }

    pub fn with_method(mut self, method: IdlCallable) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_virtual_method(mut self, vm: IdlCallable) -> Self {
        self.virtual_methods.push(vm);
        self
    }

    pub fn with_signal(mut self, signal: IdlSignal) -> Self {
        self.signals.push(signal);
        self
    }
}

/// A `<constant>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlConstant {
    pub name: String,
    pub c_type: String,
    pub value: String,
    pub info: InfoAttrs,
    pub ty: IdlType,
}

impl IdlConstant {
    pub fn new(name: impl Into<String>, value: impl Into<String>, ty: IdlType) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ty,
            ..Self::default()
        }
    }
}

// ============================================================================
// Namespaces
// ============================================================================

/// A `<namespace>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlNamespace {
    pub name: String,
    pub version: String,
    /// Prefixes stripped from type and member identifiers (`"Gtk"`).
    pub identifier_prefixes: Vec<String>,
    /// Prefixes stripped from function symbols (`"gtk"`).
    pub symbol_prefixes: Vec<String>,
    pub shared_libraries: Vec<String>,
    pub aliases: Vec<IdlAlias>,
    pub classes: Vec<IdlClass>,
    pub interfaces: Vec<IdlInterface>,
    pub records: Vec<IdlRecord>,
    pub enums: Vec<IdlEnum>,
    pub bitfields: Vec<IdlEnum>,
    pub unions: Vec<IdlUnion>,
    pub callbacks: Vec<IdlCallback>,
    pub functions: Vec<IdlCallable>,
    pub constants: Vec<IdlConstant>,
}

impl IdlNamespace {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_prefixes(
        mut self,
        identifier_prefix: impl Into<String>,
        symbol_prefix: impl Into<String>,
    ) -> Self {
        self.identifier_prefixes.push(identifier_prefix.into());
        self.symbol_prefixes.push(symbol_prefix.into());
        self
    }

    pub fn with_alias(mut self, alias: IdlAlias) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn with_class(mut self, class: IdlClass) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_interface(mut self, iface: IdlInterface) -> Self {
        self.interfaces.push(iface);
        self
    }

    pub fn with_record(mut self, record: IdlRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_enum(mut self, e: IdlEnum) -> Self {
        self.enums.push(e);
        self
    }

    pub fn with_bitfield(mut self, b: IdlEnum) -> Self {
        self.bitfields.push(b);
        self
    }

    pub fn with_union(mut self, u: IdlUnion) -> Self {
        self.unions.push(u);
        self
    }

    pub fn with_callback(mut self, cb: IdlCallback) -> Self {
        self.callbacks.push(cb);
        self
    }

    pub fn with_function(mut self, f: IdlCallable) -> Self {
        self.functions.push(f);
        self
    }

    pub fn with_constant(mut self, c: IdlConstant) -> Self {
        self.constants.push(c);
        self
    }
}

/// An `<include>` of another repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IdlInclude {
    pub name: String,
    pub version: String,
}

impl IdlInclude {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// A parsed `<repository>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdlRepository {
    pub includes: Vec<IdlInclude>,
    pub c_includes: Vec<String>,
    pub packages: Vec<String>,
    pub namespaces: Vec<IdlNamespace>,
}

impl IdlRepository {
    pub fn new(namespace: IdlNamespace) -> Self {
        Self {
            namespaces: vec![namespace],
            ..Self::default()
        }
    }

    pub fn with_include(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.includes.push(IdlInclude::new(name, version));
        self
    }

    pub fn with_c_include(mut self, header: impl Into<String>) -> Self {
        self.c_includes.push(header.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_defaults_to_introspectable() {
        assert!(InfoAttrs::default().introspectable);
        assert!(!InfoAttrs::default().deprecated);
    }

    #[test]
    fn field_defaults_to_readable() {
        let field = IdlField::new("x", IdlType::new("gint", "gint"));
        assert!(field.readable);
        assert!(!field.writable);
    }

    #[test]
    fn callable_builder() {
        let f = IdlCallable::new("show", "gtk_widget_show")
            .with_instance(IdlParameter::new("widget", IdlType::new("Widget", "GtkWidget*")))
            .with_param(
                IdlParameter::new("flag", IdlType::new("gboolean", "gboolean"))
                    .with_direction(Direction::In),
            )
            .with_return(IdlReturnValue::void())
            .with_throws();

        assert!(f.throws);
        assert!(f.instance_parameter.is_some());
        assert_eq!(f.parameters.len(), 1);
        assert_eq!(f.parameters[0].direction, Some(Direction::In));
    }

    #[test]
    fn array_builder() {
        let arr = IdlArray::new("gint*", IdlType::new("gint", "gint").into())
            .with_length(2)
            .with_zero_terminated(false);
        assert_eq!(arr.length, Some(2));
        assert_eq!(arr.zero_terminated, Some(false));
        assert!(matches!(*arr.inner, IdlAnyType::Type(_)));
    }
}
