//! Deterministic hash-based type identity.
//!
//! Every named type in the registry is keyed by a [`TypeHash`] computed from its
//! qualified IDL name (`"Gtk.Widget"`), or from its bare name for builtin
//! primitives (`"gint"`). Hashes can be computed before a type is resolved, so
//! the resolver and signature builder refer to types without holding them.
//!
//! ```
//! use girbind_core::TypeHash;
//!
//! let widget = TypeHash::from_qualified("Gtk", "Widget");
//! assert_eq!(widget, TypeHash::from_name("Gtk.Widget"));
//! assert_ne!(widget, TypeHash::from_name("Widget"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant for path components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for callable hashes.
    pub const CALLABLE: u64 = 0x5ea77ffbcdf5f302;
}

/// A deterministic 64-bit hash identifying a named type or callable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a (possibly qualified) type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a type hash from a namespace and a simple name.
    ///
    /// Equivalent to `from_name("{namespace}.{name}")` without the allocation.
    #[inline]
    pub fn from_qualified(namespace: &str, name: &str) -> Self {
        let mut buf = Vec::with_capacity(namespace.len() + name.len() + 1);
        buf.extend_from_slice(namespace.as_bytes());
        buf.push(b'.');
        buf.extend_from_slice(name.as_bytes());
        TypeHash(hash_constants::TYPE ^ xxh64(&buf, 0))
    }

    /// Create a callable hash from its owner and native symbol.
    ///
    /// Namespace-level functions use [`TypeHash::EMPTY`] as owner.
    #[inline]
    pub fn from_callable(owner: TypeHash, symbol: &str) -> Self {
        let hash = hash_constants::CALLABLE ^ xxh64(symbol.as_bytes(), 0);
        TypeHash(hash.wrapping_mul(hash_constants::SEP).wrapping_add(owner.0))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
