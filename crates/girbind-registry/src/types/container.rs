//! Generic container types such as lists, supplied manually.

use super::{FixedArity, ParamChecked, PointerConstrained, TypeRef};
use crate::Parameter;
use girbind_core::Direction;

/// A container with a fixed number of inner types.
#[derive(Debug, Clone)]
pub struct ContainerType {
    pub gir_name: String,
    pub c_type: String,
    /// Target type with positional placeholders, e.g. `"Vec<{0}>"`.
    pub target_template: String,
    pub arity: usize,
    /// Wraps a native container whose ownership is transferred.
    pub from_native_full: String,
    /// Wraps a native container that stays owned by the native side.
    pub from_native_none: String,
}

impl ContainerType {
    pub fn new(
        gir_name: impl Into<String>,
        c_type: impl Into<String>,
        arity: usize,
        target_template: impl Into<String>,
    ) -> Self {
        let gir_name = gir_name.into();
        let module = gir_name.replace('.', "_").to_lowercase();
        Self {
            from_native_full: format!("{module}_from_native_full"),
            from_native_none: format!("{module}_from_native_none"),
            gir_name,
            c_type: c_type.into(),
            target_template: target_template.into(),
            arity,
        }
    }

    pub fn with_functions(mut self, full: impl Into<String>, none: impl Into<String>) -> Self {
        self.from_native_full = full.into();
        self.from_native_none = none.into();
        self
    }

    /// Fill the template with the inner target types.
    pub fn target_type(&self, inner: &[String]) -> String {
        inner
            .iter()
            .enumerate()
            .fold(self.target_template.clone(), |acc, (i, t)| {
                acc.replace(&format!("{{{i}}}"), t)
            })
    }
}

impl PointerConstrained for ContainerType {
    fn min_pointers(&self) -> Option<usize> {
        Some(1)
    }

    fn max_pointers(&self) -> Option<usize> {
        Some(1)
    }
}

impl FixedArity for ContainerType {
    fn arity(&self) -> usize {
        self.arity
    }
}

impl ParamChecked for ContainerType {
    fn allowed_for_param(&self, param: &Parameter) -> bool {
        param.direction == Direction::Return
    }
}

/// A container type applied to concrete inner types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInstance {
    pub container: TypeRef,
    pub inner: Vec<TypeRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_expansion() {
        let list = ContainerType::new("GLib.List", "GList", 1, "Vec<{0}>");
        assert_eq!(list.target_type(&["Widget".to_string()]), "Vec<Widget>");

        let map = ContainerType::new("GLib.HashTable", "GHashTable", 2, "HashMap<{0}, {1}>");
        assert_eq!(
            map.target_type(&["String".to_string(), "i32".to_string()]),
            "HashMap<String, i32>"
        );
        assert_eq!(map.arity(), 2);
    }

    #[test]
    fn default_function_names() {
        let list = ContainerType::new("GLib.List", "GList", 1, "Vec<{0}>");
        assert_eq!(list.from_native_full, "glib_list_from_native_full");

        let custom = list.with_functions("list_full", "list_none");
        assert_eq!(custom.from_native_none, "list_none");
    }
}
