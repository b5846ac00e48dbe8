//! Names of the runtime bridge functions emitted code calls into.
//!
//! Only names live here. The runtime itself is a separate library linked by
//! the generated bindings.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureHooks {
    /// Store a closure until explicitly deleted; returns its handle.
    pub register: String,
    /// Store a closure that deletes itself after its first call.
    pub register_once: String,
    pub load: String,
    pub delete: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDataHooks {
    pub store_virtual_method: String,
    pub load_virtual_method: String,
    /// The parent class struct, for chaining up.
    pub peek_parent: String,
}

/// Per-instance payload attached to native objects subclassed from outer code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDataHooks {
    pub register: String,
    pub load: String,
    pub delete: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeHooks {
    pub closures: ClosureHooks,
    pub class_data: ClassDataHooks,
    pub instance_data: InstanceDataHooks,
}

impl RuntimeHooks {
    /// Hooks living under the runtime crate path `module`.
    pub fn with_runtime(module: &str) -> Self {
        Self {
            closures: ClosureHooks {
                register: format!("{module}::closures::register"),
                register_once: format!("{module}::closures::register_once"),
                load: format!("{module}::closures::load"),
                delete: format!("{module}::closures::delete"),
            },
            class_data: ClassDataHooks {
                store_virtual_method: format!("{module}::class_data::store_virtual_method"),
                load_virtual_method: format!("{module}::class_data::load_virtual_method"),
                peek_parent: format!("{module}::class_data::peek_parent"),
            },
            instance_data: InstanceDataHooks {
                register: format!("{module}::instance_data::register"),
                load: format!("{module}::instance_data::load"),
                delete: format!("{module}::instance_data::delete"),
            },
        }
    }
}

impl Default for RuntimeHooks {
    fn default() -> Self {
        Self::with_runtime("girbind_runtime")
    }
}
