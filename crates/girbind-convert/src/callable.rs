//! Converters for a whole signature.

use girbind_core::ParameterMode;
use girbind_registry::{Parameter, Registry, Signature};

use crate::converter::Converter;
use crate::from_native::select_from_native;
use crate::hooks::RuntimeHooks;
use crate::to_native::select_to_native;
use crate::writer::CodeWriter;

/// One converter per target-facing slot of a signature.
///
/// In [`ParameterMode::Callable`] mode inputs go to native and outputs come
/// back from it. [`ParameterMode::Callback`] swaps both directions.
#[derive(Debug, Clone)]
pub struct CallableConverters<'a> {
    pub mode: ParameterMode,
    pub instance: Option<Converter<'a>>,
    /// Closure lookup for callbacks; `None` in callable mode.
    pub user_data: Option<Converter<'a>>,
    pub params: Vec<Converter<'a>>,
    pub returns: Vec<Converter<'a>>,
}

impl<'a> CallableConverters<'a> {
    pub fn new(registry: &'a Registry, signature: &'a Signature, mode: ParameterMode) -> Self {
        Self::with_hooks(registry, signature, mode, &RuntimeHooks::default())
    }

    pub fn with_hooks(
        registry: &'a Registry,
        signature: &'a Signature,
        mode: ParameterMode,
        hooks: &RuntimeHooks,
    ) -> Self {
        let input = |p: &'a Parameter| match mode {
            ParameterMode::Callable => select_to_native(registry, signature, p, hooks),
            ParameterMode::Callback => select_from_native(registry, signature, p, hooks),
        };
        let output = |p: &'a Parameter| match mode {
            ParameterMode::Callable => select_from_native(registry, signature, p, hooks),
            ParameterMode::Callback => select_to_native(registry, signature, p, hooks),
        };

        let user_data = match mode {
            ParameterMode::Callable => None,
            ParameterMode::Callback => signature
                .params
                .iter()
                .find(|p| p.is_user_data)
                .map(|p| select_from_native(registry, signature, p, hooks)),
        };

        Self {
            mode,
            instance: signature.instance.as_ref().map(input),
            user_data,
            params: signature.target_params().map(input).collect(),
            returns: signature.target_returns().map(output).collect(),
        }
    }

    /// Every converter, instance first.
    pub fn iter(&self) -> impl Iterator<Item = &Converter<'a>> {
        self.instance
            .iter()
            .chain(self.user_data.iter())
            .chain(self.params.iter())
            .chain(self.returns.iter())
    }

    pub fn unimplemented(&self) -> impl Iterator<Item = &Converter<'a>> {
        self.iter().filter(|c| c.is_unimplemented())
    }

    /// Whether every slot has a working conversion.
    pub fn is_complete(&self) -> bool {
        self.unimplemented().next().is_none()
    }

    /// Emit the conversions that run before the call.
    pub fn apply_inputs(&self, w: &mut dyn CodeWriter) {
        for c in self.instance.iter().chain(self.user_data.iter()).chain(self.params.iter()) {
            c.apply(w);
        }
    }

    /// Emit the conversions that run after the call, then any cleanup.
    pub fn apply_outputs(&self, w: &mut dyn CodeWriter) {
        for c in &self.returns {
            c.apply(w);
        }
        for c in self.iter() {
            c.apply_after_call(w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::Strategy;
    use girbind_core::idl::{IdlCallable, IdlCallback, IdlNamespace, IdlParameter, IdlRepository, IdlType};
    use girbind_registry::RegistryBuilder;
    use girbind_registry::types::Type;

    #[test]
    fn callbacks_load_their_closure() {
        let callable = IdlCallable::new("Visit", "")
            .with_param(IdlParameter::new("value", IdlType::new("gint", "gint")))
            .with_param(IdlParameter::new("user_data", IdlType::new("gpointer", "gpointer")).with_closure(1));
        let ns = IdlNamespace::new("Demo", "1.0")
            .with_prefixes("Demo", "demo")
            .with_callback(IdlCallback::new("DemoVisit", callable));
        let (registry, _) = RegistryBuilder::default()
            .with_repository(IdlRepository::new(ns))
            .build()
            .unwrap();

        let Some(Type::Callback(cb)) = registry.lookup("Demo-1", "Visit") else {
            panic!("Visit should be a callback");
        };
        let converters = CallableConverters::new(&registry, &cb.signature, ParameterMode::Callback);
        assert_eq!(
            converters.user_data.as_ref().map(|c| &c.strategy),
            Some(&Strategy::UserData {
                load: "girbind_runtime::closures::load".to_string()
            })
        );
        assert_eq!(converters.params.len(), 1);
        assert_eq!(converters.params[0].strategy, Strategy::Cast);
        assert!(converters.is_complete());
    }
}
