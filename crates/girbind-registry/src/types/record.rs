//! Records: plain or opaque structs, and class structs.

use girbind_core::TypeHash;

use super::{Conversions, Convertible, PointerConstrained};
use crate::{CallableSignature, Field};

#[derive(Debug, Clone)]
pub struct Record {
    pub gir_name: String,
    pub c_type: String,
    pub target_name: String,
    /// Opaque: fields are hidden and values are only handled by pointer.
    pub disguised: bool,
    /// Layout owned by another library.
    pub foreign: bool,
    pub get_type: Option<String>,
    pub conversions: Conversions,
    /// Set when this record is the class struct of a class or interface.
    pub type_struct_for: Option<TypeHash>,
    /// Native symbol taking a reference, from a `ref` method.
    pub ref_function: Option<String>,
    /// Native symbol releasing a value, from an `unref`, `free` or `destroy` method.
    pub free_function: Option<String>,
    /// Index into `methods` of a method returning a full copy.
    pub copy_method: Option<usize>,
    pub fields: Vec<Field>,
    pub functions: Vec<CallableSignature>,
    pub methods: Vec<CallableSignature>,
    pub constructors: Vec<CallableSignature>,
}

impl Record {
    pub fn new(gir_name: impl Into<String>, c_type: impl Into<String>) -> Self {
        let gir_name = gir_name.into();
        let target_name = super::declared_target_name(&gir_name);
        Self {
            conversions: Conversions::for_type(&target_name),
            target_name,
            gir_name,
            c_type: c_type.into(),
            disguised: false,
            foreign: false,
            get_type: None,
            type_struct_for: None,
            ref_function: None,
            free_function: None,
            copy_method: None,
            fields: Vec::new(),
            functions: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn with_disguised(mut self, disguised: bool) -> Self {
        self.disguised = disguised;
        self
    }

    pub fn with_foreign(mut self, foreign: bool) -> Self {
        self.foreign = foreign;
        self
    }

    /// Mark the record as the class struct of `owner`.
    ///
    /// Only borrowing and to-native-none conversions stay available, so no
    /// callable can take or drop ownership of a class struct. Returns `false`
    /// if the record already belongs to another type.
    pub fn mark_as_type_struct_for(&mut self, owner: TypeHash) -> bool {
        match self.type_struct_for {
            Some(existing) => existing == owner,
            None => {
                self.conversions.from_native_full = None;
                self.conversions.from_native_none = None;
                self.conversions.to_native_full = None;
                self.type_struct_for = Some(owner);
                true
            }
        }
    }

    pub fn copy_method(&self) -> Option<&CallableSignature> {
        self.copy_method.and_then(|i| self.methods.get(i))
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl PointerConstrained for Record {
    fn min_pointers(&self) -> Option<usize> {
        Some(usize::from(self.foreign || self.disguised))
    }

    fn max_pointers(&self) -> Option<usize> {
        Some(1)
    }
}

impl Convertible for Record {
    fn conversions(&self) -> &Conversions {
        &self.conversions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use girbind_core::Transfer;

    #[test]
    fn opaque_records_need_a_pointer() {
        let plain = Record::new("Rectangle", "GdkRectangle");
        assert_eq!(plain.min_pointers(), Some(0));

        let opaque = Record::new("Display", "GdkDisplay").with_disguised(true);
        assert_eq!(opaque.min_pointers(), Some(1));
        assert_eq!(opaque.max_pointers(), Some(1));
    }

    #[test]
    fn type_struct_marking_clears_owning_conversions() {
        let mut rec = Record::new("WidgetClass", "GtkWidgetClass");
        let owner = TypeHash::from_qualified("Gtk-4", "Widget");

        assert!(rec.mark_as_type_struct_for(owner));
        assert!(!rec.can_transfer_from_native(Transfer::Full));
        assert!(!rec.can_transfer_from_native(Transfer::None));
        assert!(!rec.can_transfer_to_native(Transfer::Full));
        assert!(rec.can_transfer_from_native(Transfer::Borrow));
        assert!(rec.can_transfer_to_native(Transfer::None));

        // idempotent for the same owner, refused for another
        assert!(rec.mark_as_type_struct_for(owner));
        assert!(!rec.mark_as_type_struct_for(TypeHash::from_qualified("Gtk-4", "Label")));
    }
}
