//! Object classes.

use girbind_core::TypeHash;

use super::{Conversions, Convertible, PointerConstrained, TypeRef};
use crate::{CallableSignature, Field, Signal, VirtualMethod};

#[derive(Debug, Clone)]
pub struct Class {
    pub gir_name: String,
    pub c_type: String,
    pub target_name: String,
    pub get_type: Option<String>,
    pub is_abstract: bool,
    /// No class struct, or an opaque one: the class cannot be subclassed.
    pub is_final: bool,
    /// The root object every class derives from. `None` for the root itself.
    pub root: Option<TypeRef>,
    /// `None` only for manually supplied fundamental classes.
    pub parent: Option<TypeRef>,
    pub type_struct: Option<TypeHash>,
    /// Directly implemented interfaces, without those inherited from ancestors.
    pub implements: Vec<TypeRef>,
    pub conversions: Conversions,
    /// Set by a post-processor when hand-written code extends the generated type.
    pub manually_extended: bool,
    pub functions: Vec<CallableSignature>,
    pub methods: Vec<CallableSignature>,
    pub constructors: Vec<CallableSignature>,
    pub virtual_methods: Vec<VirtualMethod>,
    pub fields: Vec<Field>,
    pub signals: Vec<Signal>,
}

impl Class {
    /// A class without parent, such as a manually supplied root object.
    pub fn new(gir_name: impl Into<String>, c_type: impl Into<String>) -> Self {
        let gir_name = gir_name.into();
        let target_name = super::declared_target_name(&gir_name);
        Self {
            conversions: Conversions::for_type(&target_name),
            target_name,
            gir_name,
            c_type: c_type.into(),
            get_type: None,
            is_abstract: false,
            is_final: false,
            root: None,
            parent: None,
            type_struct: None,
            implements: Vec::new(),
            manually_extended: false,
            functions: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            virtual_methods: Vec::new(),
            fields: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: TypeRef) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_root(mut self, root: TypeRef) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn method(&self, name: &str) -> Option<&CallableSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn virtual_method(&self, name: &str) -> Option<&VirtualMethod> {
        self.virtual_methods.iter().find(|m| m.name == name)
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }
}

impl PointerConstrained for Class {
    fn min_pointers(&self) -> Option<usize> {
        Some(1)
    }

    fn max_pointers(&self) -> Option<usize> {
        Some(1)
    }
}

impl Convertible for Class {
    fn conversions(&self) -> &Conversions {
        &self.conversions
    }
}
