//! Transparent type renames.

use super::TypeRef;

#[derive(Debug, Clone)]
pub struct Alias {
    pub gir_name: String,
    pub c_type: String,
    pub target_name: String,
    /// The aliased type. Never void and never pointer-requiring.
    pub target: TypeRef,
}

impl Alias {
    pub fn new(gir_name: impl Into<String>, c_type: impl Into<String>, target: TypeRef) -> Self {
        let gir_name = gir_name.into();
        Self {
            target_name: super::declared_target_name(&gir_name),
            gir_name,
            c_type: c_type.into(),
            target,
        }
    }
}
