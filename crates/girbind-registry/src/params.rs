//! Signature and parameter building.
//!
//! [`build_signature`] turns one IDL callable into a [`Signature`] or rejects it
//! as a whole. It never returns a partially valid signature:
//!
//! ```text
//! instance ─► params ─► link implicit ─► return ─► throws ─► legality ─► sort
//!                │                                              │
//!           lookup miss: Maybe                          any failure: NotResolvable
//! ```
//!
//! Parameters that only exist to carry an array length, a callback's user data
//! or a destroy notifier are *implicit*: they stay in the native parameter list
//! but never appear in the target-facing lists.

use std::fmt;

use girbind_core::idl::{IdlAnyType, IdlCallable, IdlParameter};
use girbind_core::{CallbackScope, Direction, ParamFlags, ParameterMode, Transfer, names};
use tracing::{debug, warn};

use crate::Resolution;
use crate::lookup::{Scope, count_pointers, decrease_pointers};
use crate::types::{ArrayType, ContainerInstance, TypeRef, TypeView, pointers_allowed};

/// Position of a parameter within its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSlot {
    Instance,
    /// Index into the native parameter list, instance excluded.
    Native(usize),
    Return,
}

impl fmt::Display for ParamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSlot::Instance => f.write_str("instance"),
            ParamSlot::Native(i) => write!(f, "param {i}"),
            ParamSlot::Return => f.write_str("return"),
        }
    }
}

/// What a parameter is typed as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Named(TypeRef),
    Array(ArrayType),
    Container(ContainerInstance),
}

impl ParamType {
    pub fn named(&self) -> Option<&TypeRef> {
        match self {
            ParamType::Named(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            ParamType::Array(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Name at the native call site: `carg0` for the instance, `cargN`, `cret`, `_cerr`.
    pub c_name: String,
    pub target_name: String,
    pub ty: ParamType,
    /// Native pointer depth, one less than declared for out parameters.
    pub pointers: usize,
    /// Native type as declared, adjusted like `pointers`.
    pub c_type: String,
    pub direction: Direction,
    pub transfer: Transfer,
    pub flags: ParamFlags,
    pub scope: CallbackScope,
    /// Carries data for another parameter and is synthesized at the call site.
    pub implicit: bool,
    /// Carries the closure handle inside a callback.
    pub is_user_data: bool,
    /// The user-data parameter receiving this callback's closure handle.
    pub closure: Option<ParamSlot>,
    /// The destroy-notify parameter releasing this callback's closure.
    pub destroy: Option<ParamSlot>,
    /// The parameter a borrowed value must not outlive.
    pub borrow_from: Option<ParamSlot>,
}

impl Parameter {
    pub fn is_nullable(&self) -> bool {
        self.flags.contains(ParamFlags::NULLABLE)
    }

    pub fn is_optional(&self) -> bool {
        self.flags.contains(ParamFlags::OPTIONAL)
    }

    pub fn caller_allocates(&self) -> bool {
        self.flags.contains(ParamFlags::CALLER_ALLOCATES)
    }

    pub fn is_skipped(&self) -> bool {
        self.flags.contains(ParamFlags::SKIP)
    }

    /// Absent from the target-facing lists.
    pub fn is_hidden(&self) -> bool {
        self.implicit || self.is_skipped()
    }

    pub fn is_out(&self) -> bool {
        self.direction == Direction::Out
    }
}

/// A callable after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub instance: Option<Parameter>,
    /// Native parameters in call order, the error output last when throwing.
    pub params: Vec<Parameter>,
    pub ret: Option<Parameter>,
    /// Target-facing inputs: context-like first, then declaration order.
    pub target_params: Vec<ParamSlot>,
    /// Target-facing outputs: out parameters, the return value, then the error.
    pub target_returns: Vec<ParamSlot>,
    pub throws: bool,
}

impl Signature {
    pub fn param(&self, slot: ParamSlot) -> Option<&Parameter> {
        match slot {
            ParamSlot::Instance => self.instance.as_ref(),
            ParamSlot::Native(i) => self.params.get(i),
            ParamSlot::Return => self.ret.as_ref(),
        }
    }

    /// The instance parameter followed by every native parameter.
    pub fn native_params(&self) -> impl Iterator<Item = (ParamSlot, &Parameter)> {
        self.instance
            .iter()
            .map(|p| (ParamSlot::Instance, p))
            .chain(self.params.iter().enumerate().map(|(i, p)| (ParamSlot::Native(i), p)))
    }

    pub fn target_params(&self) -> impl Iterator<Item = &Parameter> {
        self.target_params.iter().filter_map(|s| self.param(*s))
    }

    pub fn target_returns(&self) -> impl Iterator<Item = &Parameter> {
        self.target_returns.iter().filter_map(|s| self.param(*s))
    }

    /// The native return when it carries a value.
    pub fn value_return(&self) -> Option<&Parameter> {
        self.target_returns
            .contains(&ParamSlot::Return)
            .then_some(self.ret.as_ref())
            .flatten()
    }
}

fn idl_c_type(t: &IdlAnyType) -> &str {
    match t {
        IdlAnyType::Type(t) => &t.c_type,
        IdlAnyType::Array(a) => &a.c_type,
    }
}

/// The same type with one pointer removed from its native type.
fn decrease_any_pointers(t: &IdlAnyType) -> Option<IdlAnyType> {
    let mut copy = t.clone();
    match &mut copy {
        IdlAnyType::Type(t) => t.c_type = decrease_pointers(&t.c_type)?,
        IdlAnyType::Array(a) => a.c_type = decrease_pointers(&a.c_type)?,
    }
    Some(copy)
}

/// Resolve a callable's parameters and return value.
pub(crate) fn build_signature(
    scope: &Scope<'_>,
    callable: &IdlCallable,
    mode: ParameterMode,
) -> Resolution<Signature> {
    let instance = match &callable.instance_parameter {
        Some(p) => match instance_param(scope, p) {
            Ok(param) => Some(param),
            Err(reason) => return Resolution::NotResolvable(reason),
        },
        None => None,
    };

    let mut params = Vec::with_capacity(callable.parameters.len() + 1);
    for (i, p) in callable.parameters.iter().enumerate() {
        match native_param(scope, i, p) {
            Resolution::Resolved(param) => params.push(param),
            Resolution::NotResolvable(reason) => return Resolution::NotResolvable(reason),
            Resolution::Maybe(reason) => return Resolution::Maybe(reason),
        }
    }

    if let Err(reason) = link_implicit(callable, &mut params) {
        return Resolution::NotResolvable(reason);
    }

    let ret = match &callable.return_value {
        Some(rv) => {
            let Some(ty) = scope.find_any(&rv.ty) else {
                return Resolution::Maybe(format!(
                    "return type '{}' not found",
                    idl_c_type(&rv.ty)
                ));
            };
            let transfer = rv.transfer.unwrap_or(Transfer::Full);
            let borrow_from = if transfer == Transfer::Borrow {
                if instance.is_none() {
                    return Resolution::NotResolvable(
                        "cannot borrow a return value without an instance parameter".to_string(),
                    );
                }
                Some(ParamSlot::Instance)
            } else {
                None
            };
            let mut flags = ParamFlags::empty();
            flags.set(ParamFlags::NULLABLE, rv.nullable);
            flags.set(ParamFlags::SKIP, rv.skip);
            Some(Parameter {
                c_name: "cret".to_string(),
                target_name: "ret".to_string(),
                ty,
                pointers: count_pointers(idl_c_type(&rv.ty)),
                c_type: idl_c_type(&rv.ty).to_string(),
                direction: Direction::Return,
                transfer,
                flags,
                scope: CallbackScope::Call,
                implicit: false,
                is_user_data: false,
                closure: None,
                destroy: None,
                borrow_from,
            })
        }
        None => None,
    };

    if callable.throws {
        match error_param(scope) {
            Some(param) => params.push(param),
            None => {
                return Resolution::NotResolvable("error type not found for throwing callable".to_string());
            }
        }
    }

    let mut signature = Signature {
        instance,
        params,
        ret,
        target_params: Vec::new(),
        target_returns: Vec::new(),
        throws: callable.throws,
    };

    let checked = signature.native_params().chain(signature.ret.iter().map(|r| (ParamSlot::Return, r)));
    for (slot, param) in checked {
        if let Err(reason) = check_param(scope, param, mode) {
            warn!(callable = callable.name.as_str(), %slot, reason = reason.as_str(), "param not valid");
            return Resolution::NotResolvable(format!("{slot} ('{}'): {reason}", param.target_name));
        }
    }

    derive_target_lists(scope, &mut signature);
    Resolution::Resolved(signature)
}

fn instance_param(scope: &Scope<'_>, p: &IdlParameter) -> Result<Parameter, String> {
    let IdlAnyType::Type(t) = &p.ty else {
        return Err("array instance parameter".to_string());
    };
    let Some(found) = scope.find_outer(t) else {
        return Err(format!("instance parameter type '{}' not found", t.c_type));
    };
    if found.foreign.is_some() {
        return Err(format!("foreign instance parameter '{}'", t.c_type));
    }
    if count_pointers(&t.c_type) != 1 {
        return Err(format!("instance parameter '{}' without exactly one pointer", t.c_type));
    }

    Ok(Parameter {
        c_name: "carg0".to_string(),
        target_name: names::param_name(&p.name),
        ty: ParamType::Named(found.type_ref()),
        pointers: 1,
        c_type: t.c_type.clone(),
        direction: Direction::In,
        transfer: Transfer::None,
        flags: ParamFlags::empty(),
        scope: CallbackScope::Call,
        implicit: false,
        is_user_data: false,
        closure: None,
        destroy: None,
        borrow_from: None,
    })
}

fn native_param(scope: &Scope<'_>, index: usize, p: &IdlParameter) -> Resolution<Parameter> {
    let direction = p.direction.unwrap_or_default();
    if direction == Direction::InOut {
        return Resolution::NotResolvable(format!("inout parameter '{}'", p.name));
    }

    let declared = count_pointers(idl_c_type(&p.ty));
    let (ty_idl, pointers) = if direction == Direction::Out {
        match (decrease_any_pointers(&p.ty), declared.checked_sub(1)) {
            (Some(t), Some(pointers)) => (t, pointers),
            _ => {
                return Resolution::NotResolvable(format!(
                    "parameter '{}' is not valid for an out direction",
                    p.name
                ));
            }
        }
    } else {
        (p.ty.clone(), declared)
    };

    let Some(ty) = scope.find_any(&ty_idl) else {
        return Resolution::Maybe(format!(
            "type of parameter '{}' ('{}') not found",
            p.name,
            idl_c_type(&p.ty)
        ));
    };

    let transfer = p.transfer.unwrap_or(match direction {
        Direction::In => Transfer::Full,
        _ => Transfer::None,
    });

    let untyped = matches!(&ty, ParamType::Named(r) if scope.get(r.hash).is_some_and(|t| t.is_untyped_pointer()));
    let mut nullable = p.nullable;
    if direction == Direction::Out && (p.optional || p.nullable) && pointers == 0 && !untyped {
        // a plain out value cannot be null
        nullable = false;
    }

    let mut flags = ParamFlags::empty();
    flags.set(ParamFlags::NULLABLE, nullable);
    flags.set(ParamFlags::OPTIONAL, p.optional);
    flags.set(ParamFlags::CALLER_ALLOCATES, p.caller_allocates);
    flags.set(ParamFlags::SKIP, p.skip);

    Resolution::Resolved(Parameter {
        c_name: format!("carg{}", index + 1),
        target_name: names::param_name(&p.name),
        ty,
        pointers,
        c_type: idl_c_type(&ty_idl).to_string(),
        direction,
        transfer,
        flags,
        scope: p.scope.unwrap_or_default(),
        implicit: false,
        is_user_data: false,
        closure: None,
        destroy: None,
        borrow_from: None,
    })
}

/// Link closure, destroy and array-length references and mark their targets implicit.
fn link_implicit(callable: &IdlCallable, params: &mut [Parameter]) -> Result<(), String> {
    let count = params.len();
    let check = |what: &str, target: usize| {
        if target < count {
            Ok(target)
        } else {
            Err(format!("{what} index {target} out of range"))
        }
    };

    for (i, p) in callable.parameters.iter().enumerate() {
        if let Some(closure) = p.closure {
            let closure = check("closure", closure)?;
            if closure == i {
                params[i].is_user_data = true;
                params[i].implicit = true;
                params[i].target_name = "_".to_string();
            } else {
                params[i].closure = Some(ParamSlot::Native(closure));
                params[closure].implicit = true;
            }
        }

        if let Some(destroy) = p.destroy {
            let destroy = check("destroy", destroy)?;
            params[i].destroy = Some(ParamSlot::Native(destroy));
            params[destroy].implicit = true;
        }

        if let IdlAnyType::Array(arr) = &p.ty
            && let Some(length) = arr.length
        {
            let length = check("array length", length)?;
            if let ParamType::Array(a) = &mut params[i].ty {
                a.length = Some(ParamSlot::Native(length));
            }
            params[length].implicit = true;
        }
    }

    Ok(())
}

fn error_param(scope: &Scope<'_>) -> Option<Parameter> {
    let name = scope.env.config.error_type.as_deref()?;
    let found = scope.find_by_gir_name(name)?;

    Some(Parameter {
        c_name: "_cerr".to_string(),
        target_name: "error".to_string(),
        ty: ParamType::Named(found.type_ref()),
        pointers: 1,
        c_type: found.ty.c_type(2),
        direction: Direction::Out,
        transfer: Transfer::Full,
        flags: ParamFlags::OPTIONAL | ParamFlags::NULLABLE,
        scope: CallbackScope::Call,
        implicit: false,
        is_user_data: false,
        closure: None,
        destroy: None,
        borrow_from: None,
    })
}

/// Legality of one parameter in the given mode.
pub(crate) fn check_param(scope: &Scope<'_>, param: &Parameter, mode: ParameterMode) -> Result<(), String> {
    if param.is_hidden() {
        return Ok(());
    }

    let Some(view) = scope.view(&param.ty) else {
        return Err("type vanished from the registry".to_string());
    };

    check_view(view, param, mode)
}

pub(crate) fn check_view(view: TypeView<'_>, param: &Parameter, mode: ParameterMode) -> Result<(), String> {
    if let Some(conv) = view.as_convertible() {
        let to_native = match (param.direction, mode) {
            (Direction::In, ParameterMode::Callable) => true,
            (Direction::In, ParameterMode::Callback) => false,
            (_, ParameterMode::Callable) => false,
            (_, ParameterMode::Callback) => true,
        };
        let supported = if to_native {
            conv.can_transfer_to_native(param.transfer)
        } else {
            conv.can_transfer_from_native(param.transfer)
        };
        if !supported {
            return Err(format!(
                "transfer {} not valid for '{}'",
                param.transfer,
                view.gir_name()
            ));
        }
    }

    if view.is_untyped_pointer() {
        return Err(format!("untyped pointer '{}' is not a valid parameter type", view.gir_name()));
    }

    let allowed = match view.as_param_checked() {
        Some(checked) => checked.allowed_for_param(param),
        None => pointers_allowed(view.as_pointer_constrained(), param.pointers),
    };
    if !allowed {
        return Err(format!(
            "'{}' not allowed with {} pointer(s) here",
            view.gir_name(),
            param.pointers
        ));
    }

    Ok(())
}

/// Populate and order the target-facing lists.
fn derive_target_lists(scope: &Scope<'_>, sig: &mut Signature) {
    let error = scope
        .env
        .config
        .error_type
        .as_deref()
        .and_then(|name| scope.find_by_gir_name(name))
        .map(|f| f.hash);
    let contexts: Vec<_> = scope
        .env
        .config
        .context_types
        .iter()
        .filter_map(|name| scope.find_by_gir_name(name))
        .map(|f| f.hash)
        .collect();

    let rank = |p: &Parameter| match p.ty.named() {
        Some(r) if contexts.contains(&r.hash) => 0,
        Some(r) if Some(r.hash) == error => 2,
        _ => 1,
    };

    let mut target_params = Vec::new();
    let mut target_returns = Vec::new();
    for (i, p) in sig.params.iter().enumerate() {
        if p.is_hidden() {
            continue;
        }
        if p.is_out() {
            target_returns.push(ParamSlot::Native(i));
        } else {
            target_params.push(ParamSlot::Native(i));
        }
    }

    if let Some(ret) = &sig.ret {
        let void = matches!(&ret.ty, ParamType::Named(r) if scope.get(r.hash).is_some_and(|t| t.gir_name() == "none"));
        if !void && !ret.is_skipped() {
            // the return value precedes the error output
            let at = if sig.throws {
                target_returns.len().saturating_sub(1)
            } else {
                target_returns.len()
            };
            target_returns.insert(at, ParamSlot::Return);
        }
    }

    let key = |slot: &ParamSlot| sig.param(*slot).map(&rank).unwrap_or(1);
    target_params.sort_by_key(key);
    target_returns.sort_by_key(key);

    debug!(
        params = target_params.len(),
        returns = target_returns.len(),
        "derived target lists"
    );
    sig.target_params = target_params;
    sig.target_returns = target_returns;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(ty: ParamType) -> Parameter {
        Parameter {
            c_name: "carg1".to_string(),
            target_name: "x".to_string(),
            ty,
            pointers: 0,
            c_type: String::new(),
            direction: Direction::In,
            transfer: Transfer::None,
            flags: ParamFlags::empty(),
            scope: CallbackScope::Call,
            implicit: false,
            is_user_data: false,
            closure: None,
            destroy: None,
            borrow_from: None,
        }
    }

    #[test]
    fn hidden_params() {
        let mut p = param(ParamType::Named(TypeRef::local(girbind_core::TypeHash::EMPTY)));
        assert!(!p.is_hidden());
        p.implicit = true;
        assert!(p.is_hidden());
        p.implicit = false;
        p.flags |= ParamFlags::SKIP;
        assert!(p.is_hidden());
    }

    #[test]
    fn out_pointer_decrement() {
        let t = IdlAnyType::Type(girbind_core::idl::IdlType::new("gint", "gint*"));
        match decrease_any_pointers(&t) {
            Some(IdlAnyType::Type(t)) => assert_eq!(t.c_type, "gint"),
            other => panic!("unexpected {other:?}"),
        }
        let plain = IdlAnyType::Type(girbind_core::idl::IdlType::new("gint", "gint"));
        assert!(decrease_any_pointers(&plain).is_none());
    }

    #[test]
    fn slot_lookup() {
        let sig = Signature {
            instance: None,
            params: vec![param(ParamType::Named(TypeRef::local(girbind_core::TypeHash::EMPTY)))],
            ret: None,
            target_params: vec![ParamSlot::Native(0)],
            target_returns: Vec::new(),
            throws: false,
        };
        assert!(sig.param(ParamSlot::Native(0)).is_some());
        assert!(sig.param(ParamSlot::Native(1)).is_none());
        assert!(sig.param(ParamSlot::Instance).is_none());
        assert_eq!(sig.native_params().count(), 1);
        assert_eq!(sig.target_params().count(), 1);
        assert!(sig.value_return().is_none());
    }

    #[test]
    fn slot_display() {
        assert_eq!(ParamSlot::Native(2).to_string(), "param 2");
        assert_eq!(ParamSlot::Instance.to_string(), "instance");
    }
}
