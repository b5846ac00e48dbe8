//! Strategy selection for values handed to native code.

use girbind_registry::types::{Type, TypeView};
use girbind_registry::{Parameter, Registry, Signature};

use crate::converter::{Converter, Flow, Strategy};
use crate::hooks::RuntimeHooks;
use crate::select::Selection;

/// Pick the converter turning the target value of `param` into its native value.
///
/// Never fails: parameters no rule covers get an unimplemented converter
/// describing why.
pub fn select_to_native<'a>(
    registry: &'a Registry,
    signature: &'a Signature,
    param: &'a Parameter,
    hooks: &RuntimeHooks,
) -> Converter<'a> {
    let sel = Selection::new(registry, signature, param, Flow::ToNative);
    let chosen = match sel.leading_rules(hooks) {
        Some(s) => s,
        None => strategy(&sel, hooks),
    };
    sel.finish(chosen)
}

fn strategy(sel: &Selection<'_>, hooks: &RuntimeHooks) -> Strategy {
    let ty = match sel.view() {
        None => return sel.unimplemented("type not found"),
        Some(TypeView::Container(..)) => {
            return sel.unimplemented("containers cannot be passed to native code");
        }
        Some(TypeView::Array(array)) => return sel.fixed_array(array),
        Some(TypeView::Named(ty)) => ty,
    };

    if sel.param.is_nullable() && !sel.param.is_out() {
        return sel.nullable(ty, value(sel, ty, hooks));
    }
    value(sel, ty, hooks)
}

fn value(sel: &Selection<'_>, ty: &Type, hooks: &RuntimeHooks) -> Strategy {
    if let Some(s) = sel.plain(ty) {
        return s;
    }
    if let Type::Callback(callback) = ty {
        return sel.callback(callback, hooks);
    }
    sel.convertible(ty)
        .unwrap_or_else(|| sel.unimplemented("no conversion to native"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use girbind_core::idl::{IdlCallable, IdlNamespace, IdlParameter, IdlRepository, IdlType};
    use girbind_core::{Direction, Transfer};
    use girbind_registry::RegistryBuilder;

    fn build(function: IdlCallable) -> Registry {
        let ns = IdlNamespace::new("Demo", "1.0")
            .with_prefixes("Demo", "demo")
            .with_function(function);
        RegistryBuilder::default()
            .with_repository(IdlRepository::new(ns))
            .build()
            .unwrap()
            .0
    }

    fn strategies(registry: &Registry, name: &str) -> Vec<Strategy> {
        let sig = &registry.namespace("Demo-1").unwrap().function(name).unwrap().signature;
        sig.target_params()
            .map(|p| select_to_native(registry, sig, p, &RuntimeHooks::default()).strategy)
            .collect()
    }

    #[test]
    fn plain_values() {
        let registry = build(
            IdlCallable::new("configure", "demo_configure")
                .with_param(IdlParameter::new("count", IdlType::new("gint", "gint")))
                .with_param(IdlParameter::new("enabled", IdlType::new("gboolean", "gboolean")))
                .with_param(IdlParameter::new("label", IdlType::new("utf8", "const gchar*")))
                .with_param(IdlParameter::new("hint", IdlType::new("utf8", "const gchar*")).with_nullable()),
        );
        assert_eq!(
            strategies(&registry, "configure"),
            vec![Strategy::Cast, Strategy::Boolean, Strategy::String, Strategy::NullableString]
        );
    }

    #[test]
    fn caller_allocated_out_is_unimplemented() {
        let registry = build(
            IdlCallable::new("fill", "demo_fill").with_param(
                IdlParameter::new("out", IdlType::new("gint", "gint*"))
                    .with_direction(Direction::Out)
                    .with_transfer(Transfer::Full)
                    .with_caller_allocates(),
            ),
        );
        let sig = &registry.namespace("Demo-1").unwrap().function("fill").unwrap().signature;
        let param = &sig.params[0];
        let converter = select_to_native(&registry, sig, param, &RuntimeHooks::default());
        assert!(matches!(
            &converter.strategy,
            Strategy::Unimplemented { reason, context, .. }
                if reason == "caller-allocates not implemented" && context.contains("out, transfer: full, pointers: 0")
        ));
    }
}
