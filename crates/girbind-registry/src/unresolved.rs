//! Declared but unresolved types.
//!
//! Classes, interfaces, callbacks and aliases may reference types declared
//! later in the same namespace. They are declared as stubs holding their IDL
//! node and resolved by the [resolver](crate::resolver) once everything they
//! depend on is findable. A stub never becomes visible to lookups; only the
//! [`Type`] its resolution produces does.

use girbind_core::idl::{IdlAlias, IdlCallback, IdlClass, IdlInterface};
use girbind_core::{ParameterMode, TypeHash};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::Resolution;
use crate::lookup::{Found, Scope};
use crate::params::{ParamType, build_signature};
use crate::types::{Alias, Callback, Class, Interface, Type, TypeRef, requires_pointer};

/// A successfully resolved stub.
#[derive(Debug)]
pub(crate) struct Resolved {
    pub ty: Type,
    /// Record to mark as the class struct of the resolved type.
    pub type_struct: Option<TypeHash>,
}

impl From<Type> for Resolved {
    fn from(ty: Type) -> Self {
        Self {
            ty,
            type_struct: None,
        }
    }
}

pub(crate) trait Unresolved {
    const KIND: &'static str;

    fn gir_name(&self) -> &str;

    /// Store key the resolved type is inserted under.
    fn hash(&self) -> TypeHash;

    fn resolve(&self, scope: &Scope<'_>) -> Resolution<Resolved>;
}

/// A dependency that could not be found.
///
/// Names still pending in this namespace may show up in a later pass; anything
/// else is gone for good since included namespaces are complete.
fn missing<T>(scope: &Scope<'_>, what: &str, name: &str) -> Resolution<T> {
    if scope.is_pending(name) {
        Resolution::Maybe(format!("{what} '{name}' is not resolved yet"))
    } else {
        Resolution::NotResolvable(format!("{what} '{name}' not found"))
    }
}

/// Find a class struct record. It must be declared in the current namespace.
fn find_type_struct<'a>(scope: &Scope<'a>, name: &str) -> Resolution<Found<'a>> {
    let Some(found) = scope.find_by_gir_name(name) else {
        return missing(scope, "class struct", name);
    };
    if let Some(ns) = found.foreign {
        return Resolution::NotResolvable(format!("class struct '{name}' is foreign to '{}'", ns.versioned));
    }
    if found.ty.as_record().is_none() {
        return Resolution::NotResolvable(format!(
            "class struct '{name}' is a {}, not a record",
            found.ty.kind_name()
        ));
    }
    Resolution::Resolved(found)
}

fn find_root<'a>(scope: &Scope<'a>) -> Resolution<Found<'a>> {
    let name = &scope.env.config.root_object;
    let Some(found) = scope.find_by_gir_name(name) else {
        return missing(scope, "root object", name);
    };
    if found.ty.as_class().is_none() {
        return Resolution::NotResolvable(format!("root object '{name}' is not a class"));
    }
    Resolution::Resolved(found)
}

macro_rules! tri {
    ($e:expr) => {
        match $e {
            Resolution::Resolved(v) => v,
            Resolution::NotResolvable(reason) => return Resolution::NotResolvable(reason),
            Resolution::Maybe(reason) => return Resolution::Maybe(reason),
        }
    };
}

// ============================================================================
// Classes
// ============================================================================

pub(crate) struct UnresolvedClass<'i> {
    pub idl: &'i IdlClass,
    pub hash: TypeHash,
    pub c_type: String,
    pub parent: &'i str,
}

impl UnresolvedClass<'_> {
    /// Whether `iface` is already implemented by this class's list so far or
    /// by any ancestor.
    fn is_redundant(scope: &Scope<'_>, own: &[TypeRef], parent: TypeHash, iface: TypeHash) -> bool {
        if own.iter().any(|i| i.hash == iface) {
            return true;
        }

        let mut seen = FxHashSet::default();
        let mut next = Some(parent);
        while let Some(hash) = next {
            if !seen.insert(hash) {
                break;
            }
            let Some(class) = scope.get(hash).and_then(Type::as_class) else {
                break;
            };
            if class.implements.iter().any(|i| i.hash == iface) {
                return true;
            }
            next = class.parent.as_ref().map(|p| p.hash);
        }
        false
    }
}

impl Unresolved for UnresolvedClass<'_> {
    const KIND: &'static str = "class";

    fn gir_name(&self) -> &str {
        &self.idl.name
    }

    fn hash(&self) -> TypeHash {
        self.hash
    }

    fn resolve(&self, scope: &Scope<'_>) -> Resolution<Resolved> {
        let root = tri!(find_root(scope));

        let (type_struct, is_final) = match self.idl.glib_type_struct.as_deref() {
            Some(name) => {
                let found = tri!(find_type_struct(scope, name));
                let disguised = found.ty.as_record().is_some_and(|r| r.disguised);
                (Some(found.hash), disguised)
            }
            None => (None, true),
        };

        let Some(parent) = scope.find_by_gir_name(self.parent) else {
            return missing(scope, "parent", self.parent);
        };
        if parent.ty.as_class().is_none() {
            return Resolution::NotResolvable(format!(
                "parent '{}' is a {}, not a class",
                self.parent,
                parent.ty.kind_name()
            ));
        }

        let mut implements: Vec<TypeRef> = Vec::with_capacity(self.idl.implements.len());
        for name in &self.idl.implements {
            let Some(found) = scope.find_by_gir_name(name) else {
                if scope.is_pending(name) {
                    return Resolution::Maybe(format!("interface '{name}' is not resolved yet"));
                }
                info!(class = self.idl.name.as_str(), interface = name.as_str(), "implemented interface not found");
                continue;
            };
            if found.ty.as_interface().is_none() {
                return Resolution::NotResolvable(format!(
                    "implemented '{name}' is a {}, not an interface",
                    found.ty.kind_name()
                ));
            }
            if Self::is_redundant(scope, &implements, parent.hash, found.hash) {
                debug!(class = self.idl.name.as_str(), interface = name.as_str(), "skipping redundant interface");
                continue;
            }
            implements.push(found.type_ref());
        }

        let mut class = Class::new(&self.idl.name, &self.c_type)
            .with_root(root.type_ref())
            .with_parent(parent.type_ref())
            .with_abstract(self.idl.is_abstract);
        class.get_type = self.idl.glib_get_type.clone();
        class.is_final = is_final;
        class.type_struct = type_struct;
        class.implements = implements;

        Resolution::Resolved(Resolved {
            ty: Type::Class(class),
            type_struct,
        })
    }
}

// ============================================================================
// Interfaces
// ============================================================================

pub(crate) struct UnresolvedInterface<'i> {
    pub idl: &'i IdlInterface,
    pub hash: TypeHash,
    pub c_type: String,
}

impl Unresolved for UnresolvedInterface<'_> {
    const KIND: &'static str = "interface";

    fn gir_name(&self) -> &str {
        &self.idl.name
    }

    fn hash(&self) -> TypeHash {
        self.hash
    }

    fn resolve(&self, scope: &Scope<'_>) -> Resolution<Resolved> {
        let type_struct = match self.idl.glib_type_struct.as_deref() {
            Some(name) => Some(tri!(find_type_struct(scope, name)).hash),
            None => None,
        };

        let root = tri!(find_root(scope));

        let mut prerequisites = Vec::with_capacity(self.idl.prerequisites.len());
        for name in &self.idl.prerequisites {
            let Some(found) = scope.find_by_gir_name(name) else {
                return missing(scope, "prerequisite", name);
            };
            if !matches!(found.ty, Type::Class(_) | Type::Interface(_)) {
                return Resolution::NotResolvable(format!(
                    "prerequisite '{name}' is a {}, not a class or interface",
                    found.ty.kind_name()
                ));
            }
            prerequisites.push(found.type_ref());
        }

        let mut iface = Interface::new(&self.idl.name, &self.c_type, root.type_ref());
        iface.get_type = self.idl.glib_get_type.clone();
        iface.type_struct = type_struct;
        iface.prerequisites = prerequisites;

        Resolution::Resolved(Type::Interface(iface).into())
    }
}

// ============================================================================
// Callbacks
// ============================================================================

pub(crate) struct UnresolvedCallback<'i> {
    pub idl: &'i IdlCallback,
    pub hash: TypeHash,
    pub target_name: String,
    pub trampoline: String,
}

impl Unresolved for UnresolvedCallback<'_> {
    const KIND: &'static str = "callback";

    fn gir_name(&self) -> &str {
        self.idl.name()
    }

    fn hash(&self) -> TypeHash {
        self.hash
    }

    fn resolve(&self, scope: &Scope<'_>) -> Resolution<Resolved> {
        let signature = tri!(build_signature(scope, &self.idl.callable, ParameterMode::Callback));

        let Some(user_data) = signature
            .native_params()
            .find(|(_, p)| p.is_user_data)
            .map(|(slot, _)| slot)
        else {
            return Resolution::NotResolvable("callback without a user data parameter".to_string());
        };

        Resolution::Resolved(
            Type::Callback(Callback {
                gir_name: self.idl.name().to_string(),
                c_type: self.idl.c_type.clone(),
                target_name: self.target_name.clone(),
                trampoline: self.trampoline.clone(),
                signature,
                user_data,
            })
            .into(),
        )
    }
}

// ============================================================================
// Aliases
// ============================================================================

pub(crate) struct UnresolvedAlias<'i> {
    pub idl: &'i IdlAlias,
    pub hash: TypeHash,
}

impl Unresolved for UnresolvedAlias<'_> {
    const KIND: &'static str = "alias";

    fn gir_name(&self) -> &str {
        &self.idl.name
    }

    fn hash(&self) -> TypeHash {
        self.hash
    }

    fn resolve(&self, scope: &Scope<'_>) -> Resolution<Resolved> {
        let Some(found) = scope.find_type(&self.idl.ty) else {
            return Resolution::Maybe(format!("aliased type '{}' not found", self.idl.ty.name));
        };
        let ParamType::Named(target) = found else {
            return Resolution::NotResolvable("aliased type is a container instance".to_string());
        };
        let Some(ty) = scope.get(target.hash) else {
            return Resolution::NotResolvable("aliased type vanished from the registry".to_string());
        };
        if matches!(ty, Type::Void) {
            return Resolution::NotResolvable("alias of none".to_string());
        }
        if requires_pointer(ty.as_pointer_constrained()) {
            return Resolution::NotResolvable(format!(
                "aliased type '{}' requires a pointer",
                ty.gir_name()
            ));
        }

        Resolution::Resolved(Type::Alias(Alias::new(&self.idl.name, &self.idl.c_type, target)).into())
    }
}
