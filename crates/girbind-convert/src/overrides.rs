//! Virtual method overrides for types subclassed from target code.
//!
//! Each overridable virtual method gets three pieces:
//!
//! - a trampoline installed in the class struct, which converts the native
//!   arguments, calls the stored override and converts the results back;
//! - an installer storing the override and writing the trampoline into the
//!   invoker field;
//! - a parent helper chaining up to the parent class's implementation.

use girbind_core::ParameterMode;
use girbind_registry::types::Type;
use girbind_registry::{Parameter, Registry, VirtualMethod};
use thiserror::Error;
use tracing::warn;

use crate::callable::CallableConverters;
use crate::hooks::RuntimeHooks;
use crate::select::spell;
use crate::writer::{CodeWriter, block};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    #[error("{0} is neither a class nor an interface")]
    NotAnObjectType(String),

    #[error("{0} has no class struct")]
    NoTypeStruct(String),

    #[error("virtual method {0} has no instance parameter")]
    NoInstance(String),
}

/// Emit the trampoline, installer and parent helper for `vm` on `owner`.
pub fn emit_virtual_method_override(
    registry: &Registry,
    owner: &Type,
    vm: &VirtualMethod,
    hooks: &RuntimeHooks,
    w: &mut dyn CodeWriter,
) -> Result<(), OverrideError> {
    let type_struct = match owner {
        Type::Class(c) => c.type_struct,
        Type::Interface(i) => i.type_struct,
        _ => return Err(OverrideError::NotAnObjectType(owner.gir_name().to_string())),
    };
    let class_struct = type_struct
        .and_then(|h| registry.get(h))
        .ok_or_else(|| OverrideError::NoTypeStruct(owner.gir_name().to_string()))?;
    let class_ffi = class_struct.ffi_type(1);

    let sig = &vm.signature;
    let instance = sig
        .instance
        .as_ref()
        .ok_or_else(|| OverrideError::NoInstance(vm.name.clone()))?;

    let converters = CallableConverters::with_hooks(registry, sig, ParameterMode::Callback, hooks);
    for c in converters.unimplemented() {
        warn!(owner = owner.gir_name(), method = vm.name.as_str(), conversion = %c.describe(), "unimplemented conversion");
    }

    let args: Vec<String> = sig.native_params().map(|(_, p)| native_arg(registry, p)).collect();
    let value_ret = sig
        .ret
        .as_ref()
        .filter(|r| !matches!(r.ty.named().and_then(|t| registry.resolve(t)), Some(Type::Void)));
    let ret = match value_ret {
        Some(r) => format!(" -> {}", spell(registry, &r.ty, r.pointers).1),
        None => String::new(),
    };
    let forwarded: Vec<&str> = sig.native_params().map(|(_, p)| p.c_name.as_str()).collect();

    w.new_section();
    w.line("#[unsafe(no_mangle)]");
    block(
        w,
        &format!("unsafe extern \"C\" fn {}({}){ret}", vm.trampoline, args.join(", ")),
        |w| {
            let c0 = &instance.c_name;
            w.line(&format!("let imp = {}({c0} as *mut _);", hooks.instance_data.load));
            w.line(&format!(
                "let method = {}({c0} as *mut _, \"{}\");",
                hooks.class_data.load_virtual_method, vm.name
            ));
            for c in converters.instance.iter().chain(&converters.params) {
                w.line(&format!("let {}: {};", c.param.target_name, c.target_type));
            }
            converters.apply_inputs(w);

            let mut call_args = vec!["imp".to_string()];
            call_args.extend(converters.instance.iter().map(|c| format!("&{}", c.param.target_name)));
            call_args.extend(converters.params.iter().map(|c| c.param.target_name.clone()));
            let call = format!("method({})", call_args.join(", "));
            let names: Vec<&str> = converters.returns.iter().map(|c| c.param.target_name.as_str()).collect();
            match names.as_slice() {
                [] => w.line(&format!("{call};")),
                [one] => w.line(&format!("let {one} = {call};")),
                many => w.line(&format!("let ({}) = {call};", many.join(", "))),
            }

            if let Some(r) = value_ret {
                w.line(&format!("let mut {}: {};", r.c_name, spell(registry, &r.ty, r.pointers).1));
            }
            converters.apply_outputs(w);
            if let Some(r) = value_ret {
                w.line(&r.c_name);
            }
        },
    );

    w.new_section();
    block(
        w,
        &format!("pub(crate) unsafe fn install_{}(class: {class_ffi})", vm.target_name),
        |w| {
            w.line(&format!(
                "{}(class as *mut _, \"{}\");",
                hooks.class_data.store_virtual_method, vm.name
            ));
            w.line(&format!("(*class).{} = Some({});", vm.invoker, vm.trampoline));
        },
    );

    w.new_section();
    block(
        w,
        &format!("pub(crate) unsafe fn {}({}){ret}", vm.parent_trampoline, args.join(", ")),
        |w| {
            w.line(&format!(
                "let parent = {}({} as *mut _) as {class_ffi};",
                hooks.class_data.peek_parent, instance.c_name
            ));
            block(w, &format!("match (*parent).{}", vm.invoker), |w| {
                w.line(&format!("Some(f) => f({}),", forwarded.join(", ")));
                w.line("None => Default::default(),");
            });
        },
    );

    Ok(())
}

/// `name: type` as a native function argument. Out parameters gain back the
/// pointer removed during resolution.
fn native_arg(registry: &Registry, p: &Parameter) -> String {
    let (_, ffi) = spell(registry, &p.ty, p.pointers);
    if p.is_out() {
        format!("{}: *mut {ffi}", p.c_name)
    } else {
        format!("{}: {ffi}", p.c_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::IndentWriter;
    use girbind_registry::types::Record;

    #[test]
    fn records_cannot_be_overridden() {
        let registry = girbind_registry::RegistryBuilder::default().build().unwrap().0;
        let owner = Type::Record(Record::new("Rectangle", "GdkRectangle"));
        let vm = VirtualMethod {
            name: "draw".to_string(),
            target_name: "draw".to_string(),
            parent_name: "parent_draw".to_string(),
            trampoline: "_girbind_Rectangle_draw".to_string(),
            parent_trampoline: "_girbind_Rectangle_parent_draw".to_string(),
            invoker: "draw".to_string(),
            signature: girbind_registry::Signature {
                instance: None,
                params: Vec::new(),
                ret: None,
                target_params: Vec::new(),
                target_returns: Vec::new(),
                throws: false,
            },
        };
        let mut w = IndentWriter::new();
        let err = emit_virtual_method_override(&registry, &owner, &vm, &RuntimeHooks::default(), &mut w);
        assert_eq!(err, Err(OverrideError::NotAnObjectType("Rectangle".to_string())));
        assert!(w.as_str().is_empty());
    }
}
