//! Type lookup during a namespace build.
//!
//! A [`Scope`] is a read-only view over everything visible from the namespace
//! being built: builtins, the namespace's own declared types, and the finished
//! namespaces it includes. Lookups try the native type first because it is
//! usually more precise than the IDL name, then fall back to the name.

use girbind_core::TypeHash;
use girbind_core::idl::{IdlAnyType, IdlArray, IdlType};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::env::Env;
use crate::namespace::Namespace;
use crate::params::ParamType;
use crate::types::{
    ArrayElement, ArrayType, ContainerInstance, INCOMPATIBLE_C_TYPES, PointerConstrained, Type,
    TypeRef, TypeView, builtin_by_c_type, builtin_by_gir_name, builtin_hash,
};

pub(crate) type TypeStore = FxHashMap<TypeHash, Type>;

/// Remove `const` and `volatile` qualifiers.
pub(crate) fn clean_c_type(c_type: &str) -> String {
    c_type
        .replace("const ", "")
        .replace(" const", "")
        .replace("volatile ", "")
        .replace(" volatile", "")
}

pub(crate) fn count_pointers(c_type: &str) -> usize {
    c_type.matches('*').count()
}

/// `c_type` with one pointer removed, or `None` if it has none.
pub(crate) fn decrease_pointers(c_type: &str) -> Option<String> {
    let pointers = count_pointers(c_type);
    if pointers == 0 {
        return None;
    }
    Some(format!("{}{}", c_type.replace('*', ""), "*".repeat(pointers - 1)))
}

/// A found named type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Found<'a> {
    pub hash: TypeHash,
    pub ty: &'a Type,
    pub foreign: Option<&'a Namespace>,
}

impl<'a> Found<'a> {
    pub fn type_ref(&self) -> TypeRef {
        match self.foreign {
            Some(ns) => TypeRef::foreign(self.hash, ns.name.clone()),
            None => TypeRef::local(self.hash),
        }
    }
}

pub(crate) struct Scope<'a> {
    pub env: &'a Env<'a>,
    pub types: &'a TypeStore,
    pub namespaces: &'a FxHashMap<String, Namespace>,
    pub current: &'a Namespace,
    /// Local IDL names still waiting in the resolver's worklists.
    pub pending: Option<&'a FxHashSet<String>>,
}

impl<'a> Scope<'a> {
    pub fn get(&self, hash: TypeHash) -> Option<&'a Type> {
        self.types.get(&hash)
    }

    pub fn view(&self, ty: &'a ParamType) -> Option<TypeView<'a>> {
        match ty {
            ParamType::Named(r) => self.get(r.hash).map(TypeView::Named),
            ParamType::Array(a) => Some(TypeView::Array(a)),
            ParamType::Container(c) => {
                let container = self.get(c.container.hash)?.as_container()?;
                Some(TypeView::Container(c, container))
            }
        }
    }

    /// Whether `name` may still appear once the resolver makes progress.
    pub fn is_pending(&self, name: &str) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        let local = match name.split_once('.') {
            Some((ns, local)) if ns == self.current.name => local,
            Some(_) => return false,
            None => name,
        };
        pending.contains(local)
    }

    /// Resolve the namespace a possibly qualified name refers to.
    ///
    /// Returns the namespace, whether it is foreign, and the unqualified name.
    fn referenced_namespace<'n>(&self, name: &'n str) -> Option<(&'a Namespace, bool, &'n str)> {
        let parts: Vec<&str> = name.split('.').collect();
        match parts.as_slice() {
            [local] => Some((self.current, false, *local)),
            [ns, local] if *ns == self.current.name => Some((self.current, false, *local)),
            [ns, local] => {
                let found = self
                    .current
                    .included(ns)
                    .and_then(|key| self.namespaces.get(key));
                if found.is_none() {
                    warn!(name, referenced = *ns, "type referenced unknown namespace");
                }
                found.map(|n| (n, true, *local))
            }
            _ => {
                warn!(name, "invalid type name");
                None
            }
        }
    }

    fn replaced<'n>(&self, name: &'n str) -> &'n str
    where
        'a: 'n,
    {
        match self.env.config.type_replacements.get(name) {
            Some(replacement) => {
                debug!(name, replacement = replacement.as_str(), "replacing type name");
                replacement.as_str()
            }
            None => name,
        }
    }

    fn builtin(&self, ty: Option<Type>) -> Option<Found<'a>> {
        let hash = builtin_hash(ty?.gir_name());
        self.get(hash).map(|ty| Found {
            hash,
            ty,
            foreign: None,
        })
    }

    fn local(&self, ns: &'a Namespace, foreign: bool, hash: Option<TypeHash>) -> Option<Found<'a>> {
        let hash = hash?;
        self.get(hash).map(|ty| Found {
            hash,
            ty,
            foreign: foreign.then_some(ns),
        })
    }

    /// Find a type ignoring any inner types.
    pub fn find_outer(&self, t: &IdlType) -> Option<Found<'a>> {
        let c_type = clean_c_type(&t.c_type);
        if INCOMPATIBLE_C_TYPES.contains(&c_type.as_str()) {
            return None;
        }

        let name = self.replaced(&t.name);
        let (ns, foreign, local) = self.referenced_namespace(name)?;

        if let Some(found) = self.builtin(builtin_by_c_type(&t.c_type)) {
            return Some(found);
        }
        if let Some(found) = self.builtin(builtin_by_gir_name(local)) {
            return Some(found);
        }

        if !c_type.is_empty()
            && let Some(found) = self.local(ns, foreign, ns.find_local_by_c_type(&c_type))
        {
            return Some(found);
        }
        if let Some(found) = self.local(ns, foreign, ns.find_local(local)) {
            return Some(found);
        }

        debug!(name = t.name.as_str(), c_type = t.c_type.as_str(), "type not found");
        None
    }

    /// Find a type by IDL name only.
    pub fn find_by_gir_name(&self, name: &str) -> Option<Found<'a>> {
        let name = self.replaced(name);
        if INCOMPATIBLE_C_TYPES.contains(&name) {
            return None;
        }

        let (ns, foreign, local) = self.referenced_namespace(name)?;

        if let Some(found) = self.builtin(builtin_by_gir_name(local)) {
            return Some(found);
        }
        if let Some(found) = self.local(ns, foreign, ns.find_local(local)) {
            return Some(found);
        }

        debug!(name, "type not found by name");
        None
    }

    /// Find a type, applying inner types to containers.
    pub fn find_type(&self, t: &IdlType) -> Option<ParamType> {
        let outer = self.find_outer(t)?;
        let container = outer.ty.as_container();

        match container {
            None if t.inner.is_empty() => Some(ParamType::Named(outer.type_ref())),
            None => {
                warn!(name = t.name.as_str(), "type has inner types but is not a container");
                None
            }
            Some(container) => {
                if t.inner.len() != container.arity {
                    warn!(
                        name = t.name.as_str(),
                        got = t.inner.len(),
                        want = container.arity,
                        "container inner type count is mismatched"
                    );
                    return None;
                }

                let mut inner = Vec::with_capacity(t.inner.len());
                for it in &t.inner {
                    let found = self.find_outer(it)?;
                    if found.ty.is_untyped_pointer() {
                        warn!(name = t.name.as_str(), inner = it.name.as_str(), "container inner type is an untyped pointer");
                        return None;
                    }
                    inner.push(found.type_ref());
                }

                Some(ParamType::Container(ContainerInstance {
                    container: outer.type_ref(),
                    inner,
                }))
            }
        }
    }

    pub fn find_any(&self, t: &IdlAnyType) -> Option<ParamType> {
        match t {
            IdlAnyType::Type(t) if t.name.is_empty() && t.c_type.is_empty() => None,
            IdlAnyType::Type(t) => self.find_type(t),
            IdlAnyType::Array(a) => self.array_type(a).map(ParamType::Array),
        }
    }

    /// Resolve an array. Unbounded arrays and arrays without a native type are unsupported.
    pub fn array_type(&self, arr: &IdlArray) -> Option<ArrayType> {
        let zero_terminated = arr.name.is_empty() && arr.zero_terminated.unwrap_or(true);

        if arr.length.is_none() && arr.fixed_size.is_none() && !zero_terminated {
            warn!(name = arr.name.as_str(), "unbounded array, not supported");
            return None;
        }
        if arr.c_type.is_empty() {
            debug!("ignoring array with empty c type");
            return None;
        }

        let base = ArrayType {
            name: arr.name.clone(),
            c_type: arr.c_type.clone(),
            element: ArrayElement::Bytes,
            inner_pointers: 0,
            length: None,
            zero_terminated,
            fixed_size: arr.fixed_size,
        };

        let cleaned = clean_c_type(&arr.c_type);
        match (arr.c_type.as_str(), cleaned.as_str()) {
            ("gpointer" | "gconstpointer" | "void*", _) => return Some(base),
            (_, "gchar*" | "char*") => {
                return Some(ArrayType {
                    element: ArrayElement::Text,
                    ..base
                });
            }
            _ => {}
        }

        let IdlAnyType::Type(inner_idl) = arr.inner.as_ref() else {
            warn!(name = arr.name.as_str(), "nested arrays are not supported");
            return None;
        };

        let Some(inner) = self.find_outer(inner_idl) else {
            warn!(name = inner_idl.name.as_str(), "could not find array inner type");
            return None;
        };

        let mut inner_pointers = count_pointers(&inner_idl.c_type);
        if inner_pointers == 0 {
            inner_pointers = inner
                .ty
                .as_pointer_constrained()
                .and_then(PointerConstrained::min_pointers)
                .unwrap_or(0);
        }

        Some(ArrayType {
            element: ArrayElement::Typed {
                inner: inner.type_ref(),
                gir_name: inner.ty.gir_name().to_string(),
            },
            inner_pointers,
            ..base
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifiers_are_stripped() {
        assert_eq!(clean_c_type("const gchar*"), "gchar*");
        assert_eq!(clean_c_type("gchar* const*"), "gchar**");
        assert_eq!(clean_c_type("volatile gint"), "gint");
        assert_eq!(clean_c_type("GtkWidget*"), "GtkWidget*");
    }

    #[test]
    fn pointer_counting() {
        assert_eq!(count_pointers("GtkWidget**"), 2);
        assert_eq!(count_pointers("gint"), 0);
        assert_eq!(decrease_pointers("GtkWidget**").as_deref(), Some("GtkWidget*"));
        assert_eq!(decrease_pointers("gint*").as_deref(), Some("gint"));
        assert_eq!(decrease_pointers("gint"), None);
    }
}
