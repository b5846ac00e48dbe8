//! Members nested in types and namespaces.
//!
//! Members are declared after the resolver has reached its fixed point, so a
//! failed lookup here is final: the member is dropped with a diagnostic and the
//! owning type is kept.

use girbind_core::idl::{
    IdlAnyType, IdlCallable, IdlConstant, IdlField, IdlMember, IdlSignal, InfoAttrs,
};
use girbind_core::{
    CallbackScope, Direction, DiagnosticKind, ParamFlags, ParameterMode, Transfer, TypeHash, names,
};
use tracing::{debug, info, warn};

use crate::env::Env;
use crate::lookup::{Scope, count_pointers};
use crate::params::{ParamType, Parameter, Signature, build_signature};
use crate::report::BuildReport;
use crate::types::{Member, PointerConstrained, Record, TypeRef, parse_member_value};
use crate::Resolution;

/// A resolved function, method or constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallableSignature {
    /// Identity from the owner and the native symbol.
    pub hash: TypeHash,
    pub name: String,
    pub c_identifier: String,
    pub target_name: String,
    pub signature: Signature,
}

/// A struct field. Fields are declared for layout and invoker lookup only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub target_name: String,
    /// `None` for inline callback fields and types that could not be found.
    pub ty: Option<ParamType>,
    pub readable: bool,
    pub writable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    /// `connect_*`, or `emit_*` for action signals.
    pub target_name: String,
    pub detailed: bool,
    pub action: bool,
    /// The root object handlers are connected through.
    pub root: TypeRef,
    pub instance: Parameter,
    pub params: Vec<Parameter>,
    pub ret: Option<Parameter>,
}

impl Signal {
    /// Handler parameters. Action signals are emitted on the receiver, so they
    /// omit the instance.
    pub fn handler_params(&self) -> impl Iterator<Item = &Parameter> {
        let instance = (!self.action).then_some(&self.instance);
        instance.into_iter().chain(&self.params)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualMethod {
    pub name: String,
    pub target_name: String,
    /// Name of the method chaining up to the parent implementation.
    pub parent_name: String,
    /// Exported symbol installed in the class struct when overridden.
    pub trampoline: String,
    /// Native helper calling the parent class's function pointer.
    pub parent_trampoline: String,
    /// Class struct field holding the function pointer.
    pub invoker: String,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub c_identifier: String,
    /// The IDL name unchanged; constants differing only in case must not collide.
    pub target_name: String,
    pub ty: TypeRef,
    pub value: String,
}

/// The type members are nested in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Owner<'a> {
    pub gir_name: &'a str,
    pub target_name: &'a str,
    pub hash: TypeHash,
}

impl Owner<'_> {
    fn subject(&self, name: &str) -> String {
        format!("{}.{name}", self.gir_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallableKind {
    /// Namespace-level function; the target name comes from the native symbol.
    Function,
    /// Static function or constructor of a type.
    Prefixed,
    Method,
}

fn subject(owner: Option<&Owner<'_>>, name: &str) -> String {
    match owner {
        Some(o) => o.subject(name),
        None => name.to_string(),
    }
}

/// Common skip rules for everything carrying availability metadata.
pub(crate) fn skipped(
    env: &Env<'_>,
    report: &mut BuildReport,
    owner: Option<&Owner<'_>>,
    name: &str,
    info: &InfoAttrs,
) -> bool {
    if !info.introspectable {
        debug!(name, "skipping because not introspectable");
        report.record(
            &env.versioned,
            DiagnosticKind::Skipped,
            subject(owner, name),
            "not introspectable",
        );
        return true;
    }

    match env.skip(owner.map(|o| o.gir_name), name, info) {
        Some(reason) => {
            report.record(&env.versioned, DiagnosticKind::Skipped, subject(owner, name), reason);
            true
        }
        None => false,
    }
}

pub(crate) fn declare_callable(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    owner: Option<&Owner<'_>>,
    idl: &IdlCallable,
    kind: CallableKind,
) -> Option<CallableSignature> {
    let subject = subject(owner, &idl.name);

    let moved = idl
        .shadowed_by
        .as_deref()
        .map(|by| format!("shadowed by '{by}'"))
        .or_else(|| idl.moved_to.as_deref().map(|to| format!("moved to '{to}'")));
    if let Some(reason) = moved {
        info!(callable = idl.c_identifier.as_str(), reason = reason.as_str(), "skipping");
        report.record(&scope.env.versioned, DiagnosticKind::Skipped, subject, reason);
        return None;
    }

    if skipped(scope.env, report, owner, &idl.name, &idl.info) {
        return None;
    }

    let signature = match build_signature(scope, idl, ParameterMode::Callable) {
        Resolution::Resolved(sig) => sig,
        Resolution::NotResolvable(reason) | Resolution::Maybe(reason) => {
            warn!(callable = idl.c_identifier.as_str(), reason = reason.as_str(), "dropping callable");
            report.record(&scope.env.versioned, DiagnosticKind::CallableRejected, subject, reason);
            return None;
        }
    };

    let target_name = match kind {
        CallableKind::Function => scope
            .env
            .symbol_to_target(&idl.c_identifier)
            .unwrap_or_else(|| names::to_snake(&idl.name)),
        CallableKind::Prefixed | CallableKind::Method => names::to_snake(&idl.name),
    };

    report.callables_declared += 1;
    Some(CallableSignature {
        hash: TypeHash::from_callable(owner.map_or(TypeHash::EMPTY, |o| o.hash), &idl.c_identifier),
        name: idl.name.clone(),
        c_identifier: idl.c_identifier.clone(),
        target_name,
        signature,
    })
}

pub(crate) fn declare_callables<'i>(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    owner: Option<&Owner<'_>>,
    idl: impl IntoIterator<Item = &'i IdlCallable>,
    kind: CallableKind,
) -> Vec<CallableSignature> {
    idl.into_iter()
        .filter_map(|c| declare_callable(scope, report, owner, c, kind))
        .collect()
}

pub(crate) fn declare_field(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    owner: &Owner<'_>,
    idl: &IdlField,
) -> Option<Field> {
    if skipped(scope.env, report, Some(owner), &idl.name, &idl.info) {
        return None;
    }
    if idl.private || !(idl.readable || idl.writable) {
        debug!(field = idl.name.as_str(), "skipping inaccessible field");
        return None;
    }
    if idl.bits > 0 {
        debug!(field = idl.name.as_str(), bits = idl.bits, "skipping bitfield field");
        return None;
    }

    Some(Field {
        name: idl.name.clone(),
        target_name: names::to_snake(&idl.name),
        ty: idl.ty.as_ref().and_then(|t| scope.find_any(t)),
        readable: idl.readable,
        writable: idl.writable,
    })
}

pub(crate) fn declare_fields(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    owner: &Owner<'_>,
    idl: &[IdlField],
) -> Vec<Field> {
    idl.iter()
        .filter_map(|f| declare_field(scope, report, owner, f))
        .collect()
}

/// Signal parameters often lack native types, so they are looked up directly
/// instead of going through the signature builder.
fn signal_param(
    scope: &Scope<'_>,
    c_name: String,
    target_name: String,
    direction: Direction,
    transfer: Option<Transfer>,
    nullable: bool,
    ty: &IdlAnyType,
) -> Option<Parameter> {
    let found = scope.find_any(ty)?;
    let declared = match ty {
        IdlAnyType::Type(t) => count_pointers(&t.c_type),
        IdlAnyType::Array(a) => count_pointers(&a.c_type),
    };
    let pointers = if declared == 0 && direction != Direction::Return {
        scope
            .view(&found)
            .and_then(|v| v.as_pointer_constrained())
            .and_then(PointerConstrained::min_pointers)
            .unwrap_or(0)
    } else {
        declared
    };

    let mut flags = ParamFlags::empty();
    flags.set(ParamFlags::NULLABLE, nullable);
    let c_type = scope
        .view(&found)
        .and_then(|v| v.named())
        .map(|t| t.c_type(pointers))
        .unwrap_or_default();

    Some(Parameter {
        c_name,
        target_name,
        ty: found,
        pointers,
        c_type,
        direction,
        transfer: transfer.unwrap_or(Transfer::None),
        flags,
        scope: CallbackScope::Call,
        implicit: false,
        is_user_data: false,
        closure: None,
        destroy: None,
        borrow_from: None,
    })
}

pub(crate) fn declare_signal(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    owner: &Owner<'_>,
    idl: &IdlSignal,
) -> Option<Signal> {
    if skipped(scope.env, report, Some(owner), &idl.name, &idl.info) {
        return None;
    }

    let reject = |report: &mut BuildReport, reason: String| {
        warn!(signal = idl.name.as_str(), reason = reason.as_str(), "dropping signal");
        report.record(
            &scope.env.versioned,
            DiagnosticKind::CallableRejected,
            owner.subject(&idl.name),
            reason,
        );
    };

    let Some(root) = scope.find_by_gir_name(&scope.env.config.root_object) else {
        reject(report, format!("root object '{}' not found", scope.env.config.root_object));
        return None;
    };

    let mut params = Vec::with_capacity(idl.parameters.len());
    for (i, p) in idl.parameters.iter().enumerate() {
        let param = signal_param(
            scope,
            format!("arg{i}"),
            format!("arg{i}"),
            p.direction.unwrap_or_default(),
            p.transfer,
            p.nullable,
            &p.ty,
        );
        match param {
            Some(param) => params.push(param),
            None => {
                reject(report, format!("type of parameter '{}' not found", p.name));
                return None;
            }
        }
    }

    let ret = match &idl.return_value {
        Some(rv) => {
            let param = signal_param(
                scope,
                "ret".to_string(),
                "ret".to_string(),
                Direction::Return,
                rv.transfer,
                rv.nullable,
                &rv.ty,
            );
            match param {
                Some(p) if scope.view(&p.ty).is_some_and(|v| v.gir_name() == "none") => None,
                Some(p) => Some(p),
                None => {
                    reject(report, "return type not found".to_string());
                    return None;
                }
            }
        }
        None => None,
    };

    let prefix = if idl.action { "emit" } else { "connect" };
    let owner_type = scope.get(owner.hash);

    Some(Signal {
        name: idl.name.clone(),
        target_name: format!("{prefix}_{}", names::to_snake(&idl.name)),
        detailed: idl.detailed,
        action: idl.action,
        root: root.type_ref(),
        instance: Parameter {
            c_name: "instance".to_string(),
            target_name: "instance".to_string(),
            ty: ParamType::Named(TypeRef::local(owner.hash)),
            pointers: 1,
            c_type: owner_type.map(|t| t.c_type(1)).unwrap_or_default(),
            direction: Direction::In,
            transfer: Transfer::None,
            flags: ParamFlags::empty(),
            scope: CallbackScope::Call,
            implicit: false,
            is_user_data: false,
            closure: None,
            destroy: None,
            borrow_from: None,
        },
        params,
        ret,
    })
}

pub(crate) fn declare_virtual_method(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    owner: &Owner<'_>,
    type_struct: &Record,
    idl: &IdlCallable,
) -> Option<VirtualMethod> {
    if skipped(scope.env, report, Some(owner), &idl.name, &idl.info) {
        return None;
    }

    let reject = |report: &mut BuildReport, reason: String| {
        warn!(virtual_method = idl.name.as_str(), reason = reason.as_str(), "dropping virtual method");
        report.record(
            &scope.env.versioned,
            DiagnosticKind::CallableRejected,
            owner.subject(&idl.name),
            reason,
        );
    };

    let signature = match build_signature(scope, idl, ParameterMode::Callable) {
        Resolution::Resolved(sig) => sig,
        Resolution::NotResolvable(reason) | Resolution::Maybe(reason) => {
            reject(report, reason);
            return None;
        }
    };

    if signature.instance.is_none() {
        reject(report, "missing instance parameter".to_string());
        return None;
    }

    let has_callback = signature.params.iter().any(|p| {
        matches!(&p.ty, ParamType::Named(r) if scope.get(r.hash).and_then(|t| t.as_callback()).is_some())
    });
    if has_callback {
        reject(report, "callback parameters are not supported".to_string());
        return None;
    }

    let Some(invoker) = type_struct.field(&idl.name) else {
        reject(report, format!("no field '{}' in class struct '{}'", idl.name, type_struct.gir_name));
        return None;
    };

    let prefix = scope.env.trampoline_prefix();
    let target_name = invoker.target_name.clone();

    Some(VirtualMethod {
        name: idl.name.clone(),
        parent_name: format!("parent_{target_name}"),
        trampoline: format!("{prefix}_{}_{}", owner.target_name, idl.name),
        parent_trampoline: format!("{prefix}_{}_virtual_{}", owner.target_name, idl.name),
        invoker: invoker.name.clone(),
        target_name,
        signature,
    })
}

pub(crate) fn declare_constant(
    scope: &Scope<'_>,
    report: &mut BuildReport,
    idl: &IdlConstant,
) -> Option<Constant> {
    if skipped(scope.env, report, None, &idl.name, &idl.info) {
        return None;
    }

    let reject = |report: &mut BuildReport, reason: &str| {
        debug!(constant = idl.name.as_str(), reason, "dropping constant");
        report.record(&scope.env.versioned, DiagnosticKind::MemberRejected, idl.name.as_str(), reason);
    };

    let Some(found) = scope.find_outer(&idl.ty) else {
        reject(report, "type not found");
        return None;
    };
    if found.foreign.is_some() {
        reject(report, "foreign constant type");
        return None;
    }
    if !found.ty.is_castable() {
        reject(report, "not a castable primitive");
        return None;
    }

    Some(Constant {
        name: idl.name.clone(),
        // the native name of a constant is listed as its native type
        c_identifier: idl.c_type.clone(),
        target_name: idl.name.clone(),
        ty: found.type_ref(),
        value: idl.value.clone(),
    })
}

pub(crate) fn declare_members(
    env: &Env<'_>,
    report: &mut BuildReport,
    owner: &str,
    idl: &[IdlMember],
) -> Vec<Member> {
    let parent = Owner {
        gir_name: owner,
        target_name: owner,
        hash: TypeHash::EMPTY,
    };

    let mut members = Vec::with_capacity(idl.len());
    for m in idl {
        if skipped(env, report, Some(&parent), &m.name, &m.info) {
            continue;
        }
        let Some(value) = parse_member_value(&m.value) else {
            warn!(member = m.c_identifier.as_str(), value = m.value.as_str(), "invalid member value");
            report.record(
                &env.versioned,
                DiagnosticKind::MemberRejected,
                parent.subject(&m.name),
                format!("invalid value '{}'", m.value),
            );
            continue;
        };
        let pascal = names::snake_to_pascal(&m.c_identifier.to_lowercase());
        members.push(Member {
            name: m.name.clone(),
            c_identifier: m.c_identifier.clone(),
            target_name: env.identifier_to_target(&pascal),
            value,
        });
    }
    members
}
