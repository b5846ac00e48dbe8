//! Strategy selection for values received from native code.

use girbind_core::Transfer;
use girbind_registry::types::{ContainerInstance, ContainerType, Type, TypeView};
use girbind_registry::{Parameter, Registry, Signature};

use crate::converter::{ChildConverter, Converter, Flow, Strategy};
use crate::hooks::RuntimeHooks;
use crate::select::Selection;

/// Pick the converter turning the native value of `param` into its target value.
///
/// Never fails: parameters no rule covers get an unimplemented converter
/// describing why.
pub fn select_from_native<'a>(
    registry: &'a Registry,
    signature: &'a Signature,
    param: &'a Parameter,
    hooks: &RuntimeHooks,
) -> Converter<'a> {
    let sel = Selection::new(registry, signature, param, Flow::FromNative);
    let chosen = match sel.leading_rules(hooks) {
        Some(s) => s,
        None => strategy(&sel),
    };
    sel.finish(chosen)
}

fn strategy(sel: &Selection<'_>) -> Strategy {
    let ty = match sel.view() {
        None => return sel.unimplemented("type not found"),
        Some(TypeView::Container(instance, container)) => return container_strategy(sel, instance, container),
        Some(TypeView::Array(array)) => return sel.fixed_array(array),
        Some(TypeView::Named(ty)) => ty,
    };

    if sel.param.is_nullable() && !sel.param.is_out() {
        return sel.nullable(ty, value(sel, ty));
    }
    value(sel, ty)
}

fn value(sel: &Selection<'_>, ty: &Type) -> Strategy {
    if let Some(s) = sel.plain(ty) {
        return s;
    }
    if matches!(ty, Type::Callback(_)) {
        return sel.unimplemented("callbacks cannot be received from native code");
    }
    sel.convertible(ty)
        .unwrap_or_else(|| sel.unimplemented("no conversion from native"))
}

fn container_strategy(sel: &Selection<'_>, instance: &ContainerInstance, container: &ContainerType) -> Strategy {
    let transfer = sel.param.transfer;
    let function = match transfer {
        Transfer::Full | Transfer::Container => &container.from_native_full,
        _ => &container.from_native_none,
    };
    let inner_transfer = if transfer == Transfer::Full {
        Transfer::Full
    } else {
        Transfer::None
    };

    let mut children = Vec::with_capacity(instance.inner.len());
    for inner in &instance.inner {
        let child = match sel.registry.resolve(inner) {
            Some(Type::String(_)) => ChildConverter::String {
                transfer: inner_transfer,
            },
            Some(ty) => match ty
                .as_convertible()
                .and_then(|c| c.conversions().from_native(inner_transfer))
            {
                Some(function) => ChildConverter::Convertible {
                    function: inner.qualify(function),
                },
                None => {
                    return sel.unimplemented(&format!("container element {} has no conversion", ty.gir_name()));
                }
            },
            None => return sel.unimplemented("container element type not found"),
        };
        children.push(child);
    }

    Strategy::Container {
        function: instance.container.qualify(function),
        children,
    }
}
