//! Unions.
//!
//! Unions carry nested members but are never returned by type lookups, so
//! parameters cannot be typed as one.

use crate::{CallableSignature, Field};

#[derive(Debug, Clone)]
pub struct Union {
    pub gir_name: String,
    pub c_type: String,
    pub target_name: String,
    pub get_type: Option<String>,
    pub functions: Vec<CallableSignature>,
    pub methods: Vec<CallableSignature>,
    pub constructors: Vec<CallableSignature>,
    pub fields: Vec<Field>,
}

impl Union {
    pub fn new(gir_name: impl Into<String>, c_type: impl Into<String>) -> Self {
        let gir_name = gir_name.into();
        Self {
            target_name: super::declared_target_name(&gir_name),
            gir_name,
            c_type: c_type.into(),
            get_type: None,
            functions: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            fields: Vec::new(),
        }
    }
}
