//! Object interfaces.

use girbind_core::TypeHash;

use super::{Conversions, Convertible, PointerConstrained, TypeRef};
use crate::{CallableSignature, Signal, VirtualMethod};

#[derive(Debug, Clone)]
pub struct Interface {
    pub gir_name: String,
    pub c_type: String,
    pub target_name: String,
    pub get_type: Option<String>,
    /// The root object; every implementor derives from it.
    pub root: TypeRef,
    pub type_struct: Option<TypeHash>,
    /// Classes or interfaces an implementor must also be.
    pub prerequisites: Vec<TypeRef>,
    pub conversions: Conversions,
    pub manually_extended: bool,
    pub functions: Vec<CallableSignature>,
    pub methods: Vec<CallableSignature>,
    pub virtual_methods: Vec<VirtualMethod>,
    pub signals: Vec<Signal>,
}

impl Interface {
    pub fn new(gir_name: impl Into<String>, c_type: impl Into<String>, root: TypeRef) -> Self {
        let gir_name = gir_name.into();
        let target_name = super::declared_target_name(&gir_name);
        Self {
            conversions: Conversions::for_type(&target_name),
            target_name,
            gir_name,
            c_type: c_type.into(),
            get_type: None,
            root,
            type_struct: None,
            prerequisites: Vec::new(),
            manually_extended: false,
            functions: Vec::new(),
            methods: Vec::new(),
            virtual_methods: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&CallableSignature> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl PointerConstrained for Interface {
    fn min_pointers(&self) -> Option<usize> {
        Some(1)
    }

    fn max_pointers(&self) -> Option<usize> {
        Some(1)
    }
}

impl Convertible for Interface {
    fn conversions(&self) -> &Conversions {
        &self.conversions
    }
}
