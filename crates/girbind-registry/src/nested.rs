//! Second build step: members nested in resolved types.
//!
//! Runs once the resolver is done, so every type of the namespace that will
//! ever be findable already is. Members are computed against a read-only
//! scope and then moved into the stored type.

use girbind_core::idl::{IdlCallable, IdlField, IdlNamespace};
use girbind_core::{Transfer, TypeHash};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::lookup::Scope;
use crate::members::{
    CallableKind, Owner, declare_callable, declare_callables, declare_constant, declare_fields,
    declare_signal, declare_virtual_method,
};
use crate::report::BuildReport;
use crate::resolver::BuildState;
use crate::types::{Record, Type};
use crate::{CallableSignature, Field, Signal, VirtualMethod};

/// Reference counting methods that never become bindings.
const REF_METHODS: [&str; 4] = ["ref", "unref", "weak_ref", "weak_unref"];

struct RecordMembers {
    functions: Vec<CallableSignature>,
    methods: Vec<CallableSignature>,
    constructors: Vec<CallableSignature>,
    fields: Vec<Field>,
    ref_function: Option<String>,
    free_function: Option<String>,
    copy_method: Option<usize>,
}

struct ObjectMembers {
    functions: Vec<CallableSignature>,
    methods: Vec<CallableSignature>,
    constructors: Vec<CallableSignature>,
    fields: Vec<Field>,
    signals: Vec<Signal>,
    virtual_methods: Vec<VirtualMethod>,
}

fn owner_of(ty: &Type, hash: TypeHash) -> Owner<'_> {
    let target_name = match ty {
        Type::Class(c) => c.target_name.as_str(),
        Type::Interface(i) => i.target_name.as_str(),
        Type::Record(r) => r.target_name.as_str(),
        Type::Union(u) => u.target_name.as_str(),
        Type::Enum(e) | Type::Bitfield(e) => e.target_name.as_str(),
        other => other.gir_name(),
    };
    Owner {
        gir_name: ty.gir_name(),
        target_name,
        hash,
    }
}

/// A `copy` method returning a full-transfer value of the record itself.
fn is_copy_method(method: &CallableSignature, record: TypeHash) -> bool {
    let sig = &method.signature;
    let returns_self = || {
        let [slot] = sig.target_returns.as_slice() else {
            return false;
        };
        sig.param(*slot).is_some_and(|p| {
            p.transfer == Transfer::Full && p.ty.named().is_some_and(|r| r.hash == record)
        })
    };

    method.target_name == "copy"
        && sig.target_params.is_empty()
        && sig
            .instance
            .as_ref()
            .and_then(|p| p.ty.named())
            .is_some_and(|r| r.hash == record)
        && returns_self()
}

/// IDL members shared by records and unions.
struct RecordIdl<'i> {
    functions: &'i [IdlCallable],
    methods: &'i [IdlCallable],
    constructors: &'i [IdlCallable],
    fields: &'i [IdlField],
}

fn record_members(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    owner: &Owner<'_>,
    disguised: bool,
    idl: RecordIdl<'_>,
) -> RecordMembers {
    let mut out = RecordMembers {
        functions: declare_callables(scope, report, Some(owner), idl.functions, CallableKind::Prefixed),
        methods: Vec::with_capacity(idl.methods.len()),
        constructors: declare_callables(scope, report, Some(owner), idl.constructors, CallableKind::Prefixed),
        fields: Vec::new(),
        ref_function: None,
        free_function: None,
        copy_method: None,
    };

    for m in idl.methods {
        match m.name.as_str() {
            "weak_ref" | "weak_unref" => continue,
            "ref" => {
                out.ref_function = Some(m.c_identifier.clone());
                continue;
            }
            "unref" | "free" | "destroy" => {
                out.free_function = Some(m.c_identifier.clone());
                continue;
            }
            _ => {}
        }
        let Some(method) = declare_callable(scope, report, Some(owner), m, CallableKind::Method) else {
            continue;
        };
        if out.copy_method.is_none() && is_copy_method(&method, owner.hash) {
            debug!(record = owner.gir_name, method = method.c_identifier.as_str(), "found copy method");
            out.copy_method = Some(out.methods.len());
        }
        out.methods.push(method);
    }

    if !disguised {
        out.fields = declare_fields(scope, report, owner, idl.fields);
    }
    out
}

fn object_methods(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    owner: &Owner<'_>,
    methods: &[IdlCallable],
) -> Vec<CallableSignature> {
    declare_callables(
        scope,
        report,
        Some(owner),
        methods.iter().filter(|m| !REF_METHODS.contains(&m.name.as_str())),
        CallableKind::Method,
    )
}

fn virtual_methods(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    owner: &Owner<'_>,
    type_struct: Option<TypeHash>,
    idl: &[IdlCallable],
) -> Vec<VirtualMethod> {
    let Some(record) = type_struct.and_then(|h| scope.get(h)).and_then(Type::as_record) else {
        return Vec::new();
    };
    idl.iter()
        .filter_map(|v| declare_virtual_method(scope, report, owner, record, v))
        .collect()
}

/// Keys of the types the current namespace declared from `names`.
fn declared<'n>(
    state: &BuildState<'_, '_>,
    list: &[TypeHash],
    names: impl Iterator<Item = &'n str>,
) -> Vec<(usize, TypeHash)> {
    let own: FxHashSet<TypeHash> = list.iter().copied().collect();
    names
        .enumerate()
        .map(|(i, name)| (i, state.current.type_hash(name)))
        .filter(|(_, hash)| own.contains(hash))
        .collect()
}

/// Declare nested members of every type the namespace declared, then its
/// functions and constants.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn declare_nested(state: &mut BuildState<'_, '_>, ns: &IdlNamespace) {
    unions(state, ns);
    records(state, ns);
    classes(state, ns);
    interfaces(state, ns);
    enumerations(state, ns);

    let (scope, report) = state.split();
    let functions = declare_callables(&scope, report, None, &ns.functions, CallableKind::Function);
    let constants: Vec<_> = ns
        .constants
        .iter()
        .filter_map(|c| declare_constant(&scope, report, c))
        .collect();

    state.current.functions = functions;
    state.current.constants = constants;
}

fn unions(state: &mut BuildState<'_, '_>, ns: &IdlNamespace) {
    let list = state.current.unions.clone();
    for (i, hash) in declared(state, &list, ns.unions.iter().map(|u| u.name.as_str())) {
        let idl = &ns.unions[i];
        let members = {
            let (scope, report) = state.split();
            let Some(ty) = scope.get(hash) else {
                continue;
            };
            let owner = owner_of(ty, hash);
            record_members(&scope, report, &owner, false, RecordIdl {
                functions: &idl.functions,
                methods: &idl.methods,
                constructors: &idl.constructors,
                fields: &idl.fields,
            })
        };
        if let Some(Type::Union(u)) = state.types.get_mut(&hash) {
            u.functions = members.functions;
            u.methods = members.methods;
            u.constructors = members.constructors;
            u.fields = members.fields;
        }
    }
}

fn records(state: &mut BuildState<'_, '_>, ns: &IdlNamespace) {
    let list = state.current.records.clone();
    for (i, hash) in declared(state, &list, ns.records.iter().map(|r| r.name.as_str())) {
        let idl = &ns.records[i];
        let members = {
            let (scope, report) = state.split();
            let Some(ty) = scope.get(hash) else {
                continue;
            };
            let disguised = ty.as_record().is_some_and(|r| r.disguised);
            let owner = owner_of(ty, hash);
            record_members(&scope, report, &owner, disguised, RecordIdl {
                functions: &idl.functions,
                methods: &idl.methods,
                constructors: &idl.constructors,
                fields: &idl.fields,
            })
        };
        if let Some(Type::Record(r)) = state.types.get_mut(&hash) {
            apply_record(r, members);
        }
    }
}

fn apply_record(r: &mut Record, members: RecordMembers) {
    r.functions = members.functions;
    r.methods = members.methods;
    r.constructors = members.constructors;
    r.fields = members.fields;
    r.ref_function = members.ref_function;
    r.free_function = members.free_function;
    r.copy_method = members.copy_method;
}

fn classes(state: &mut BuildState<'_, '_>, ns: &IdlNamespace) {
    let list = state.current.classes.clone();
    for (i, hash) in declared(state, &list, ns.classes.iter().map(|c| c.name.as_str())) {
        let idl = &ns.classes[i];
        let members = {
            let (scope, report) = state.split();
            let Some(ty) = scope.get(hash) else {
                continue;
            };
            let type_struct = ty.as_class().and_then(|c| c.type_struct);
            let owner = owner_of(ty, hash);
            ObjectMembers {
                functions: declare_callables(&scope, report, Some(&owner), &idl.functions, CallableKind::Prefixed),
                methods: object_methods(&scope, report, &owner, &idl.methods),
                constructors: declare_callables(&scope, report, Some(&owner), &idl.constructors, CallableKind::Prefixed),
                fields: declare_fields(&scope, report, &owner, &idl.fields),
                signals: idl
                    .signals
                    .iter()
                    .filter_map(|s| declare_signal(&scope, report, &owner, s))
                    .collect(),
                virtual_methods: virtual_methods(&scope, report, &owner, type_struct, &idl.virtual_methods),
            }
        };
        if let Some(Type::Class(c)) = state.types.get_mut(&hash) {
            c.functions = members.functions;
            c.methods = members.methods;
            c.constructors = members.constructors;
            c.fields = members.fields;
            c.signals = members.signals;
            c.virtual_methods = members.virtual_methods;
        }
    }
}

fn interfaces(state: &mut BuildState<'_, '_>, ns: &IdlNamespace) {
    let list = state.current.interfaces.clone();
    for (i, hash) in declared(state, &list, ns.interfaces.iter().map(|c| c.name.as_str())) {
        let idl = &ns.interfaces[i];
        let members = {
            let (scope, report) = state.split();
            let Some(ty) = scope.get(hash) else {
                continue;
            };
            let type_struct = ty.as_interface().and_then(|i| i.type_struct);
            let owner = owner_of(ty, hash);
            ObjectMembers {
                functions: declare_callables(&scope, report, Some(&owner), &idl.functions, CallableKind::Prefixed),
                methods: object_methods(&scope, report, &owner, &idl.methods),
                constructors: Vec::new(),
                fields: Vec::new(),
                signals: idl
                    .signals
                    .iter()
                    .filter_map(|s| declare_signal(&scope, report, &owner, s))
                    .collect(),
                virtual_methods: virtual_methods(&scope, report, &owner, type_struct, &idl.virtual_methods),
            }
        };
        if let Some(Type::Interface(iface)) = state.types.get_mut(&hash) {
            iface.functions = members.functions;
            iface.methods = members.methods;
            iface.signals = members.signals;
            iface.virtual_methods = members.virtual_methods;
        }
    }
}

fn enumerations(state: &mut BuildState<'_, '_>, ns: &IdlNamespace) {
    let sets = [
        (state.current.enums.clone(), &ns.enums),
        (state.current.bitfields.clone(), &ns.bitfields),
    ];
    for (list, idl_list) in sets {
        for (i, hash) in declared(state, &list, idl_list.iter().map(|e| e.name.as_str())) {
            let idl = &idl_list[i];
            let functions = {
                let (scope, report) = state.split();
                let Some(ty) = scope.get(hash) else {
                    continue;
                };
                let owner = owner_of(ty, hash);
                declare_callables(&scope, report, Some(&owner), &idl.functions, CallableKind::Prefixed)
            };
            if let Some(Type::Enum(e) | Type::Bitfield(e)) = state.types.get_mut(&hash) {
                e.functions = functions;
            }
        }
    }
}
