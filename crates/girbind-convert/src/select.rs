//! Rules shared by both selection directions.

use girbind_core::CallbackScope;
use girbind_registry::types::{
    ArrayElement, ArrayType, Callback, Type, TypeRef, TypeView, module_name,
};
use girbind_registry::{ParamSlot, ParamType, Parameter, Registry, Signature};

use crate::converter::{Borrow, CallbackStrategy, Converter, Flow, Strategy};
use crate::hooks::RuntimeHooks;

/// One parameter being matched against the rules.
pub(crate) struct Selection<'a> {
    pub registry: &'a Registry,
    pub signature: &'a Signature,
    pub param: &'a Parameter,
    pub flow: Flow,
}

impl<'a> Selection<'a> {
    pub fn new(registry: &'a Registry, signature: &'a Signature, param: &'a Parameter, flow: Flow) -> Self {
        Self {
            registry,
            signature,
            param,
            flow,
        }
    }

    pub fn view(&self) -> Option<TypeView<'a>> {
        self.registry.view(&self.param.ty)
    }

    fn linked(&self, slot: Option<ParamSlot>) -> Option<&'a Parameter> {
        slot.and_then(|s| self.signature.param(s))
    }

    pub fn finish(self, strategy: Strategy) -> Converter<'a> {
        let (target_type, ffi_type) = spell(self.registry, &self.param.ty, self.param.pointers);
        Converter {
            param: self.param,
            flow: self.flow,
            strategy,
            target_type,
            ffi_type,
        }
    }

    /// Implicit, skipped, caller-allocated and user-data parameters.
    ///
    /// From native, user data is matched before the implicit rule.
    pub fn leading_rules(&self, hooks: &RuntimeHooks) -> Option<Strategy> {
        let p = self.param;
        // A trampoline must look the closure up even though the parameter is hidden.
        if p.is_user_data && self.flow == Flow::FromNative {
            return Some(self.user_data(hooks));
        }
        if p.implicit {
            return Some(Strategy::Implicit);
        }
        if p.is_skipped() {
            return Some(Strategy::Skipped);
        }
        if p.caller_allocates() {
            return Some(self.unimplemented("caller-allocates not implemented"));
        }
        if p.is_user_data {
            return Some(self.user_data(hooks));
        }
        None
    }

    fn user_data(&self, hooks: &RuntimeHooks) -> Strategy {
        Strategy::UserData {
            load: hooks.closures.load.clone(),
        }
    }

    pub fn fixed_array(&self, array: &ArrayType) -> Strategy {
        let Some(size) = array.fixed_size else {
            return self.unimplemented("only fixed-size arrays are supported");
        };
        if array.inner_pointers != 0 {
            return self.unimplemented("arrays of pointers are not supported");
        }
        if self.param.is_out() {
            return self.unimplemented("array out parameters are not supported");
        }
        if array.zero_terminated {
            return self.unimplemented("zero-terminated arrays are not supported");
        }
        if array.length.is_some() {
            return self.unimplemented("arrays with a length parameter are not supported");
        }
        let Some(inner) = array.inner().and_then(|r| self.registry.resolve(r)) else {
            return self.unimplemented("array element type not found");
        };
        if !inner.is_castable() {
            return self.unimplemented("array elements are not castable");
        }

        Strategy::FixedArray {
            size,
            native_element: inner.ffi_type(0),
            target_element: inner.target_type(0),
        }
    }

    /// Wrap the strategy for a nullable non-out parameter.
    pub fn nullable(&self, ty: &Type, inner: Strategy) -> Strategy {
        if matches!(ty, Type::String(_)) {
            return Strategy::NullableString;
        }
        if inner.is_unimplemented() {
            return inner;
        }
        Strategy::Nullable(Box::new(inner))
    }

    /// Casts, booleans, strings and aliases. Callbacks are direction specific.
    pub fn plain(&self, ty: &Type) -> Option<Strategy> {
        let pointers = self.param.pointers;
        match ty {
            Type::String(_) => Some(Strategy::String),
            _ if self.flow == Flow::FromNative && pointers == 0 && is_native_bool(&self.param.c_type) => {
                Some(Strategy::Cast)
            }
            Type::Boolean(_) if pointers == 0 => Some(Strategy::Boolean),
            Type::Primitive(_) | Type::Enum(_) | Type::Bitfield(_) if pointers == 0 => Some(Strategy::Cast),
            Type::Alias(alias) => {
                let target = self.registry.resolve(&alias.target);
                if pointers == 0 && target.is_some_and(Type::is_castable) {
                    Some(Strategy::Alias(Box::new(Strategy::Cast)))
                } else {
                    Some(self.unimplemented("unsupported aliased type"))
                }
            }
            _ => None,
        }
    }

    pub fn callback(&self, callback: &Callback, hooks: &RuntimeHooks) -> Strategy {
        let p = self.param;
        let Some(closure) = self.linked(p.closure) else {
            return self.unimplemented("callback has no closure parameter");
        };

        let destroy = if p.scope == CallbackScope::Notified {
            let Some(destroy) = self.linked(p.destroy) else {
                return self.unimplemented("notified callback has no destroy parameter");
            };
            let notify = destroy
                .ty
                .named()
                .and_then(|r| self.registry.resolve(r))
                .and_then(Type::as_callback);
            let Some(notify) = notify else {
                return self.unimplemented("destroy parameter is not a callback");
            };
            Some((destroy.c_name.clone(), notify.trampoline.clone()))
        } else {
            None
        };

        let closures = &hooks.closures;
        Strategy::Callback(CallbackStrategy {
            trampoline: callback.trampoline.clone(),
            closure: closure.c_name.clone(),
            register: match p.scope {
                CallbackScope::Async => closures.register_once.clone(),
                _ => closures.register.clone(),
            },
            delete_after_call: (p.scope == CallbackScope::Call).then(|| closures.delete.clone()),
            destroy,
        })
    }

    /// Wrapper types with a conversion function for this transfer.
    pub fn convertible(&self, ty: &Type) -> Option<Strategy> {
        let convertible = ty.as_convertible()?;
        if self.param.pointers != 1 {
            return None;
        }
        let ParamType::Named(type_ref) = &self.param.ty else {
            return None;
        };

        let transfer = self.param.transfer;
        let function = match self.flow {
            Flow::ToNative => convertible.conversions().to_native(transfer),
            Flow::FromNative => convertible.conversions().from_native(transfer),
        }?;

        let borrow = if self.flow == Flow::FromNative && transfer == girbind_core::Transfer::Borrow {
            match self.linked(self.param.borrow_from) {
                Some(source) => Borrow::TiedTo(source.target_name.clone()),
                None => Borrow::Unbound,
            }
        } else {
            Borrow::Owned
        };

        Some(Strategy::Convertible {
            function: type_ref.qualify(function),
            borrow,
        })
    }

    pub fn unimplemented(&self, reason: &str) -> Strategy {
        let p = self.param;
        let mut context = vec![
            p.direction.to_string(),
            format!("transfer: {}", p.transfer),
            format!("pointers: {}", p.pointers),
        ];
        match self.view() {
            Some(view) => context.push(format!("type: {}", view.gir_name())),
            None => context.push("type: unknown".to_string()),
        }
        if p.scope != CallbackScope::Call {
            context.push(format!("scope: {}", p.scope));
        }
        if p.is_optional() {
            context.push("optional".to_string());
        }
        if p.is_nullable() {
            context.push("nullable".to_string());
        }
        if p.caller_allocates() {
            context.push("caller-allocates".to_string());
        }

        let mut mentions = Vec::new();
        if let Some(closure) = self.linked(p.closure) {
            context.push(format!("closure: {}", closure.c_name));
            mentions.push(closure.c_name.clone());
        }
        if let Some(destroy) = self.linked(p.destroy) {
            context.push(format!("destroy: {}", destroy.c_name));
            mentions.push(destroy.c_name.clone());
        }
        if let ParamType::Array(array) = &p.ty {
            match &array.element {
                ArrayElement::Typed { gir_name, .. } => context.push(format!("array of {gir_name}")),
                ArrayElement::Bytes => context.push("array of bytes".to_string()),
                ArrayElement::Text => context.push("array of text".to_string()),
            }
            if let Some(size) = array.fixed_size {
                context.push(format!("fixed size: {size}"));
            }
            if array.zero_terminated {
                context.push("zero-terminated".to_string());
            }
            if let Some(length) = self.linked(array.length) {
                context.push(format!("length: {}", length.c_name));
                mentions.push(length.c_name.clone());
            }
        }

        Strategy::Unimplemented {
            reason: reason.to_string(),
            context: context.join(", "),
            mentions,
        }
    }
}

fn is_native_bool(c_type: &str) -> bool {
    c_type.trim_start_matches("const ").trim() == "_Bool"
}

/// Target and native spellings of a parameter type.
pub(crate) fn spell(registry: &Registry, ty: &ParamType, pointers: usize) -> (String, String) {
    match ty {
        ParamType::Named(r) => match registry.resolve(r) {
            Some(t) => (r.qualify(&t.target_type(pointers)), qualify_ffi(r, t.ffi_type(pointers))),
            None => ("()".to_string(), "*mut c_void".to_string()),
        },
        ParamType::Array(array) => {
            let inner = array.inner().and_then(|r| registry.resolve(r).map(|t| (r, t)));
            let target = match (array.target_override(), inner) {
                (Some(t), _) => t.to_string(),
                (None, Some((r, t))) => format!("Vec<{}>", r.qualify(&t.target_type(array.inner_pointers))),
                (None, None) => "Vec<()>".to_string(),
            };
            let native = match (&array.element, inner) {
                (ArrayElement::Bytes, _) => "u8".to_string(),
                (ArrayElement::Text, _) => "ffi::gchar".to_string(),
                (ArrayElement::Typed { .. }, Some((r, t))) => qualify_ffi(r, t.ffi_type(array.inner_pointers)),
                (ArrayElement::Typed { .. }, None) => "c_void".to_string(),
            };
            (target, format!("*mut {native}"))
        }
        ParamType::Container(instance) => {
            let inner: Vec<String> = instance
                .inner
                .iter()
                .map(|r| match registry.resolve(r) {
                    Some(t) => r.qualify(&t.target_type(1)),
                    None => "()".to_string(),
                })
                .collect();
            match registry.resolve(&instance.container).and_then(Type::as_container) {
                Some(c) => (
                    c.target_type(&inner),
                    qualify_ffi(&instance.container, format!("*mut ffi::{}", c.c_type)),
                ),
                None => ("()".to_string(), "*mut c_void".to_string()),
            }
        }
    }
}

fn qualify_ffi(r: &TypeRef, ffi: String) -> String {
    match &r.foreign {
        Some(ns) => ffi.replacen("ffi::", &format!("{}::ffi::", module_name(ns)), 1),
        None => ffi,
    }
}
