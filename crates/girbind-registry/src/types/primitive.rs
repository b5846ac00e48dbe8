//! Builtin primitive types.

use girbind_core::TypeHash;

use super::{PointerConstrained, Type};

/// A fixed native/target representation pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub gir_name: &'static str,
    pub c_type: &'static str,
    pub target: &'static str,
    /// `gpointer`-like: carries no type information.
    pub untyped_pointer: bool,
}

const fn prim(gir_name: &'static str, target: &'static str) -> Primitive {
    Primitive {
        gir_name,
        c_type: gir_name,
        target,
        untyped_pointer: false,
    }
}

const fn untyped(gir_name: &'static str) -> Primitive {
    Primitive {
        gir_name,
        c_type: gir_name,
        target: "*mut c_void",
        untyped_pointer: true,
    }
}

/// Castable primitives in lookup order.
pub const BUILTIN_PRIMITIVES: &[Primitive] = &[
    prim("guint", "u32"),
    prim("guint8", "u8"),
    prim("guint16", "u16"),
    prim("guint32", "u32"),
    prim("guint64", "u64"),
    prim("gint", "i32"),
    prim("gint8", "i8"),
    prim("gint16", "i16"),
    prim("gint32", "i32"),
    prim("gint64", "i64"),
    prim("gshort", "i16"),
    prim("gushort", "u16"),
    prim("gsize", "usize"),
    prim("gssize", "isize"),
    prim("gchar", "i8"),
    prim("guchar", "u8"),
    prim("gunichar", "char"),
    prim("gfloat", "f32"),
    prim("gdouble", "f64"),
    prim("gintptr", "isize"),
    untyped("guintptr"),
    untyped("gpointer"),
    untyped("gconstpointer"),
    prim("glong", "i64"),
    prim("gulong", "u64"),
    prim("time_t", "i64"),
    prim("pid_t", "i32"),
    prim("ino_t", "u64"),
    prim("uid_t", "u32"),
    prim("gid_t", "u32"),
];

pub const BOOLEAN: Primitive = prim("gboolean", "bool");

/// Native types with no target equivalent. Lookups never find them.
pub const INCOMPATIBLE_C_TYPES: &[&str] = &["long double", "tm", "va_list"];

/// `utf8` or `filename`: always exactly one `gchar` pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Utf8,
    Filename,
}

impl StringKind {
    pub fn gir_name(self) -> &'static str {
        match self {
            StringKind::Utf8 => "utf8",
            StringKind::Filename => "filename",
        }
    }
}

impl PointerConstrained for StringKind {
    fn min_pointers(&self) -> Option<usize> {
        Some(1)
    }

    fn max_pointers(&self) -> Option<usize> {
        Some(1)
    }
}

/// Every builtin in lookup order: integers, boolean, strings, pointers, void.
pub(crate) fn builtin_types() -> Vec<Type> {
    let mut types: Vec<Type> = BUILTIN_PRIMITIVES.iter().copied().map(Type::Primitive).collect();
    types.push(Type::Boolean(BOOLEAN));
    types.push(Type::String(StringKind::Utf8));
    types.push(Type::String(StringKind::Filename));
    types.push(Type::Void);
    types
}

/// Store key for a builtin.
pub(crate) fn builtin_hash(gir_name: &str) -> TypeHash {
    TypeHash::from_name(gir_name)
}

/// Find a builtin whose zero-pointer native type is exactly `c_type`.
///
/// Needed because IDL names are not unique for some primitives.
pub fn builtin_by_c_type(c_type: &str) -> Option<Type> {
    builtin_types().into_iter().find(|t| t.c_type(0) == c_type)
}

pub fn builtin_by_gir_name(gir_name: &str) -> Option<Type> {
    builtin_types().into_iter().find(|t| t.gir_name() == gir_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_c_type_and_name() {
        let gint = builtin_by_c_type("gint");
        assert!(matches!(gint, Some(Type::Primitive(p)) if p.target == "i32"));

        let boolean = builtin_by_gir_name("gboolean");
        assert!(matches!(boolean, Some(Type::Boolean(_))));

        assert!(matches!(builtin_by_gir_name("none"), Some(Type::Void)));
        assert!(builtin_by_gir_name("GtkWidget").is_none());
    }

    #[test]
    fn strings_resolve_from_char_pointer() {
        // utf8 is listed first, so a bare gchar* resolves to it
        assert!(matches!(
            builtin_by_c_type("gchar*"),
            Some(Type::String(StringKind::Utf8))
        ));
        assert!(matches!(
            builtin_by_gir_name("filename"),
            Some(Type::String(StringKind::Filename))
        ));
    }

    #[test]
    fn pointer_primitives_are_untyped() {
        for name in ["gpointer", "gconstpointer", "guintptr"] {
            let t = builtin_by_gir_name(name);
            assert!(t.is_some_and(|t| t.is_untyped_pointer()), "{name}");
        }
        assert!(builtin_by_gir_name("gint").is_some_and(|t| !t.is_untyped_pointer()));
    }

    #[test]
    fn string_needs_exactly_one_pointer() {
        assert_eq!(StringKind::Utf8.min_pointers(), Some(1));
        assert_eq!(StringKind::Filename.max_pointers(), Some(1));
    }
}
