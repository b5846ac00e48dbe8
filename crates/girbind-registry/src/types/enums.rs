//! Enumerations and bitfields.

use rustc_hash::FxHashSet;

use super::PointerConstrained;
use crate::CallableSignature;

/// One named value. Values are 32-bit; wider IDL values wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub c_identifier: String,
    pub target_name: String,
    pub value: i32,
}

/// An enumeration or bitfield; the [`Type`](super::Type) variant decides which.
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub gir_name: String,
    pub c_type: String,
    pub target_name: String,
    pub error_domain: Option<String>,
    pub members: Vec<Member>,
    pub functions: Vec<CallableSignature>,
}

impl Enumeration {
    pub fn new(gir_name: impl Into<String>, c_type: impl Into<String>) -> Self {
        let gir_name = gir_name.into();
        Self {
            target_name: super::declared_target_name(&gir_name),
            gir_name,
            c_type: c_type.into(),
            error_domain: None,
            members: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Members with duplicate values folded, first declaration wins.
    pub fn uniques(&self) -> Vec<&Member> {
        uniques(&self.members)
    }
}

impl PointerConstrained for Enumeration {
    fn max_pointers(&self) -> Option<usize> {
        Some(0)
    }
}

/// Keep the first member per value, sorted by target name.
pub fn uniques(members: &[Member]) -> Vec<&Member> {
    let mut seen = FxHashSet::default();
    let mut unique: Vec<&Member> = members.iter().filter(|m| seen.insert(m.value)).collect();
    unique.sort_by(|a, b| a.target_name.cmp(&b.target_name));
    unique
}

/// Parse an IDL member value as a 64-bit integer and wrap it to 32 bits.
///
/// Accepts decimal, negative decimal and `0x`/`0o`/`0b` prefixed values.
pub(crate) fn parse_member_value(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(oct) = digits.strip_prefix("0o") {
        (8, oct)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        (2, bin)
    } else {
        (10, digits)
    };

    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    let value = i64::try_from(value).ok()?;
    Some(value as i32)
}
