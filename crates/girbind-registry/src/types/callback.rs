//! Function-pointer types.

use girbind_core::CallbackScope;

use super::{ParamChecked, PointerConstrained};
use crate::{ParamSlot, Parameter, Signature};

#[derive(Debug, Clone)]
pub struct Callback {
    pub gir_name: String,
    pub c_type: String,
    pub target_name: String,
    /// Exported native function that forwards calls into target code.
    pub trampoline: String,
    /// Resolved in callback mode: the native side is the caller.
    pub signature: Signature,
    /// The parameter carrying the closure handle.
    pub user_data: ParamSlot,
}

impl Callback {
    pub fn user_data_param(&self) -> Option<&Parameter> {
        self.signature.param(self.user_data)
    }
}

impl PointerConstrained for Callback {
    fn max_pointers(&self) -> Option<usize> {
        Some(0)
    }
}

impl ParamChecked for Callback {
    /// Passing a callback needs somewhere to put the closure handle, and a
    /// destroy notifier when the native side decides the lifetime.
    fn allowed_for_param(&self, param: &Parameter) -> bool {
        param.pointers == 0
            && param.closure.is_some()
            && (param.scope != CallbackScope::Notified || param.destroy.is_some())
    }
}
