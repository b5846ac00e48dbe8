//! Resolved namespaces.

use girbind_core::{TypeHash, Version};
use rustc_hash::FxHashMap;

use crate::types::Type;
use crate::{CallableSignature, Constant};

/// Lookup priority between kinds sharing a name. Lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum LookupRank {
    Manual,
    Alias,
    Class,
    Interface,
    Record,
    Callback,
    Enum,
    Bitfield,
}

impl LookupRank {
    pub(crate) fn of(ty: &Type) -> Option<Self> {
        match ty {
            Type::Alias(_) => Some(LookupRank::Alias),
            Type::Class(_) => Some(LookupRank::Class),
            Type::Interface(_) => Some(LookupRank::Interface),
            Type::Record(_) => Some(LookupRank::Record),
            Type::Callback(_) => Some(LookupRank::Callback),
            Type::Enum(_) => Some(LookupRank::Enum),
            Type::Bitfield(_) => Some(LookupRank::Bitfield),
            _ => None,
        }
    }
}

/// Name and native-type index over a namespace's findable types.
#[derive(Debug, Clone, Default)]
pub(crate) struct TypeIndex {
    by_gir_name: FxHashMap<String, (LookupRank, TypeHash)>,
    by_c_type: FxHashMap<String, (LookupRank, TypeHash)>,
}

impl TypeIndex {
    pub(crate) fn insert(&mut self, rank: LookupRank, ty: &Type, hash: TypeHash) {
        keep_best(&mut self.by_gir_name, ty.gir_name().to_string(), rank, hash);
        keep_best(&mut self.by_c_type, ty.c_type(0), rank, hash);
    }

    pub(crate) fn by_gir_name(&self, name: &str) -> Option<TypeHash> {
        self.by_gir_name.get(name).map(|(_, h)| *h)
    }

    pub(crate) fn by_c_type(&self, c_type: &str) -> Option<TypeHash> {
        self.by_c_type.get(c_type).map(|(_, h)| *h)
    }
}

fn keep_best(
    map: &mut FxHashMap<String, (LookupRank, TypeHash)>,
    key: String,
    rank: LookupRank,
    hash: TypeHash,
) {
    map.entry(key)
        .and_modify(|existing| {
            if rank < existing.0 {
                *existing = (rank, hash);
            }
        })
        .or_insert((rank, hash));
}

/// A fully built namespace. Type lists hold store keys in declaration order.
#[derive(Debug, Clone)]
pub struct Namespace {
    pub name: String,
    pub version: Version,
    /// Identity key, e.g. `"Gtk-4"`.
    pub versioned: String,
    /// Target module name, e.g. `"gtk"`.
    pub module: String,
    /// Namespace name to identity key, for every direct and transitive include.
    pub includes: FxHashMap<String, String>,
    pub c_includes: Vec<String>,
    pub packages: Vec<String>,
    pub shared_libraries: Vec<String>,

    pub manual: Vec<TypeHash>,
    pub aliases: Vec<TypeHash>,
    pub enums: Vec<TypeHash>,
    pub bitfields: Vec<TypeHash>,
    pub records: Vec<TypeHash>,
    pub unions: Vec<TypeHash>,
    pub callbacks: Vec<TypeHash>,
    pub classes: Vec<TypeHash>,
    pub interfaces: Vec<TypeHash>,

    pub functions: Vec<CallableSignature>,
    pub constants: Vec<Constant>,

    pub(crate) index: TypeIndex,
}

impl Namespace {
    pub(crate) fn new(name: &str, version: Version, versioned: String) -> Self {
        Self {
            name: name.to_string(),
            module: crate::types::module_name(name),
            version,
            versioned,
            includes: FxHashMap::default(),
            c_includes: Vec::new(),
            packages: Vec::new(),
            shared_libraries: Vec::new(),
            manual: Vec::new(),
            aliases: Vec::new(),
            enums: Vec::new(),
            bitfields: Vec::new(),
            records: Vec::new(),
            unions: Vec::new(),
            callbacks: Vec::new(),
            classes: Vec::new(),
            interfaces: Vec::new(),
            functions: Vec::new(),
            constants: Vec::new(),
            index: TypeIndex::default(),
        }
    }

    /// Store key of the type a declaration named `gir_name` gets in this namespace.
    pub fn type_hash(&self, gir_name: &str) -> TypeHash {
        crate::types::type_hash(&self.versioned, gir_name)
    }

    /// Findable local type by IDL name. Unions are not findable.
    pub fn find_local(&self, gir_name: &str) -> Option<TypeHash> {
        self.index.by_gir_name(gir_name)
    }

    /// Findable local type by zero-pointer native type.
    pub fn find_local_by_c_type(&self, c_type: &str) -> Option<TypeHash> {
        self.index.by_c_type(c_type)
    }

    /// Identity key of an included namespace.
    pub fn included(&self, name: &str) -> Option<&str> {
        self.includes.get(name).map(String::as_str)
    }

    pub fn function(&self, name: &str) -> Option<&CallableSignature> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name == name)
    }

    /// Every declared type key, in lookup order with unions last.
    pub fn type_hashes(&self) -> impl Iterator<Item = TypeHash> + '_ {
        self.manual
            .iter()
            .chain(&self.aliases)
            .chain(&self.classes)
            .chain(&self.interfaces)
            .chain(&self.records)
            .chain(&self.callbacks)
            .chain(&self.enums)
            .chain(&self.bitfields)
            .chain(&self.unions)
            .copied()
    }

    pub(crate) fn index_type(&mut self, rank: LookupRank, ty: &Type, hash: TypeHash) {
        self.index.insert(rank, ty, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alias, Record, TypeRef};

    #[test]
    fn lower_rank_wins_on_name_clash() {
        let mut index = TypeIndex::default();
        let record = Type::Record(Record::new("Thing", "GThing"));
        let alias = Type::Alias(Alias::new("Thing", "GThing", TypeRef::local(TypeHash::from_name("gint"))));

        let record_hash = TypeHash::from_name("record");
        let alias_hash = TypeHash::from_name("alias");

        index.insert(LookupRank::Record, &record, record_hash);
        index.insert(LookupRank::Alias, &alias, alias_hash);

        assert_eq!(index.by_gir_name("Thing"), Some(alias_hash));
        assert_eq!(index.by_c_type("GThing"), Some(alias_hash));

        // a later, worse-ranked insert does not replace
        index.insert(LookupRank::Bitfield, &record, TypeHash::from_name("other"));
        assert_eq!(index.by_gir_name("Thing"), Some(alias_hash));
    }

    #[test]
    fn type_hashes_are_per_version() {
        let gtk3 = Namespace::new("Gtk", Version::new(3, 0, 0), "Gtk-3".to_string());
        let gtk4 = Namespace::new("Gtk", Version::new(4, 0, 0), "Gtk-4".to_string());
        assert_ne!(gtk3.type_hash("Widget"), gtk4.type_hash("Widget"));
        assert_eq!(gtk4.module, "gtk");
    }
}
