//! First build step: declarations.
//!
//! Enums, bitfields, records and unions are complete on declaration. Classes,
//! interfaces, callbacks and aliases become [stubs](crate::unresolved) for the
//! resolver.

use girbind_core::DiagnosticKind;
use girbind_core::idl::{IdlAlias, IdlCallback, IdlClass, IdlEnum, IdlInterface, IdlRecord, IdlUnion};
use tracing::debug;

use crate::env::Env;
use crate::members::{declare_members, skipped};
use crate::report::BuildReport;
use crate::types::{Conversions, Enumeration, Record, Type, Union, type_hash};
use crate::unresolved::{UnresolvedAlias, UnresolvedCallback, UnresolvedClass, UnresolvedInterface};

pub(crate) fn declare_enum(env: &Env<'_>, report: &mut BuildReport, idl: &IdlEnum, bitfield: bool) -> Option<Type> {
    if skipped(env, report, None, &idl.name, &idl.info) {
        return None;
    }

    let mut e = Enumeration::new(&idl.name, &idl.c_type);
    e.target_name = env.identifier_to_target(&idl.c_type);
    e.error_domain = idl.error_domain.clone();
    e.members = declare_members(env, report, &idl.name, &idl.members);

    Some(if bitfield {
        Type::Bitfield(e)
    } else {
        Type::Enum(e)
    })
}

pub(crate) fn declare_record(env: &Env<'_>, report: &mut BuildReport, idl: &IdlRecord) -> Option<Type> {
    if skipped(env, report, None, &idl.name, &idl.info) {
        return None;
    }
    if idl.name.ends_with("Private") {
        debug!(record = idl.name.as_str(), "skipping private record");
        return None;
    }

    let mut record = Record::new(&idl.name, &idl.c_type)
        .with_disguised(idl.disguised)
        .with_foreign(idl.foreign);
    record.target_name = env.identifier_to_target(&idl.c_type);
    record.conversions = Conversions::for_type(&record.target_name);
    record.get_type = idl.glib_get_type.clone();
    Some(Type::Record(record))
}

pub(crate) fn declare_union(env: &Env<'_>, report: &mut BuildReport, idl: &IdlUnion) -> Option<Type> {
    if skipped(env, report, None, &idl.name, &idl.info) {
        return None;
    }

    let mut union = Union::new(&idl.name, &idl.c_type);
    union.get_type = idl.glib_get_type.clone();
    Some(Type::Union(union))
}

pub(crate) fn class_stub<'i>(
    env: &Env<'_>,
    report: &mut BuildReport,
    idl: &'i IdlClass,
) -> Option<UnresolvedClass<'i>> {
    if skipped(env, report, None, &idl.name, &idl.info) {
        return None;
    }
    let Some(parent) = idl.parent.as_deref() else {
        report.record(&env.versioned, DiagnosticKind::Skipped, idl.name.as_str(), "fundamental type");
        return None;
    };

    Some(UnresolvedClass {
        idl,
        hash: type_hash(&env.versioned, &idl.name),
        c_type: non_empty_or(&idl.c_type, &idl.name),
        parent,
    })
}

pub(crate) fn interface_stub<'i>(
    env: &Env<'_>,
    report: &mut BuildReport,
    idl: &'i IdlInterface,
) -> Option<UnresolvedInterface<'i>> {
    if skipped(env, report, None, &idl.name, &idl.info) {
        return None;
    }

    Some(UnresolvedInterface {
        idl,
        hash: type_hash(&env.versioned, &idl.name),
        c_type: non_empty_or(&idl.c_type, &idl.name),
    })
}

pub(crate) fn callback_stub<'i>(
    env: &Env<'_>,
    report: &mut BuildReport,
    idl: &'i IdlCallback,
) -> Option<UnresolvedCallback<'i>> {
    let name = idl.name();
    if skipped(env, report, None, name, &idl.callable.info) {
        return None;
    }

    Some(UnresolvedCallback {
        idl,
        hash: type_hash(&env.versioned, name),
        target_name: env.identifier_to_target(&non_empty_or(&idl.c_type, name)),
        trampoline: format!("{}_{name}", env.trampoline_prefix()),
    })
}

pub(crate) fn alias_stub<'i>(
    env: &Env<'_>,
    report: &mut BuildReport,
    idl: &'i IdlAlias,
) -> Option<UnresolvedAlias<'i>> {
    if skipped(env, report, None, &idl.name, &idl.info) {
        return None;
    }

    Some(UnresolvedAlias {
        idl,
        hash: type_hash(&env.versioned, &idl.name),
    })
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
