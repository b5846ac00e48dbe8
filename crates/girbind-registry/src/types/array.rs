//! Arrays. Anonymous and owned by the parameter or field that uses them.

use super::{PointerConstrained, TypeRef};
use crate::ParamSlot;

/// What an array holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayElement {
    /// Elements of a named type.
    Typed { inner: TypeRef, gir_name: String },
    /// Raw bytes behind an untyped pointer.
    Bytes,
    /// Characters of a string with an explicit length.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    /// Set for boxed arrays; empty for native arrays.
    pub name: String,
    /// Native type as declared, qualifiers included.
    pub c_type: String,
    pub element: ArrayElement,
    /// Pointer depth of each element.
    pub inner_pointers: usize,
    /// The parameter carrying the element count, linked during signature building.
    pub length: Option<ParamSlot>,
    pub zero_terminated: bool,
    pub fixed_size: Option<usize>,
}

impl ArrayType {
    pub fn gir_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        match &self.element {
            ArrayElement::Typed { gir_name, .. } => format!("array[{gir_name}]"),
            ArrayElement::Bytes => "array[bytes]".to_string(),
            ArrayElement::Text => "array[text]".to_string(),
        }
    }

    pub fn inner(&self) -> Option<&TypeRef> {
        match &self.element {
            ArrayElement::Typed { inner, .. } => Some(inner),
            _ => None,
        }
    }

    /// Target representation for byte and text arrays, which have no inner type.
    pub fn target_override(&self) -> Option<&'static str> {
        match self.element {
            ArrayElement::Bytes => Some("Vec<u8>"),
            ArrayElement::Text => Some("String"),
            ArrayElement::Typed { .. } => None,
        }
    }

    /// Whether the element count is known by some means.
    pub fn is_bounded(&self) -> bool {
        self.length.is_some() || self.zero_terminated || self.fixed_size.is_some()
    }
}

impl PointerConstrained for ArrayType {
    fn min_pointers(&self) -> Option<usize> {
        Some(self.inner_pointers + 1)
    }

    fn max_pointers(&self) -> Option<usize> {
        Some(self.inner_pointers + 1)
    }
}
