//! Identifier case conversion for target-language names.
//!
//! IDL names are `snake_case` (functions, parameters), `kebab-case` (signals)
//! or `SCREAMING_SNAKE` (member C identifiers). Types become `PascalCase`,
//! everything else `snake_case`, and words that collide with target keywords
//! get a trailing underscore.

/// Words with fixed capitalisation when converted to `PascalCase`.
const SPECIAL_WORDS: &[(&str, &str)] = &[
    ("api", "API"),
    ("id", "ID"),
    ("ids", "IDs"),
    ("uri", "URI"),
    ("json", "JSON"),
    ("ok", "OK"),
    ("eof", "EOF"),
    ("io", "IO"),
    ("utf8", "UTF8"),
    ("utf16", "UTF16"),
    ("ascii", "ASCII"),
    ("ucs4", "UCS4"),
    ("nfc", "NFC"),
    ("nfd", "NFD"),
    ("nfkc", "NFKC"),
    ("nfkd", "NFKD"),
    ("foreach", "ForEach"),
    ("md5", "MD5"),
    ("sha1", "SHA1"),
    ("sha256", "SHA256"),
    ("sha384", "SHA384"),
    ("sha512", "SHA512"),
    ("dbus", "DBus"),
    ("gsettings", "GSettings"),
    ("gtype", "GType"),
    ("vfs", "VFS"),
    ("eos", "EOS"),
];

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

fn first_to_upper(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Append `_` to words reserved by the target language.
pub fn escape_keyword(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// `"list_store_new"` → `"ListStoreNew"`, applying [`SPECIAL_WORDS`].
pub fn snake_to_pascal(snake: &str) -> String {
    snake
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lower = w.to_lowercase();
            SPECIAL_WORDS
                .iter()
                .find(|(k, _)| *k == lower)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| first_to_upper(&lower))
        })
        .collect()
}

/// `"size-allocate"` → `"SizeAllocate"`.
pub fn kebab_to_pascal(kebab: &str) -> String {
    snake_to_pascal(&kebab.replace('-', "_"))
}

/// `"size-allocate"` → `"size_allocate"`, lower-cased and keyword-escaped.
pub fn to_snake(name: &str) -> String {
    escape_keyword(&name.replace('-', "_").to_lowercase())
}

/// Target name for a parameter. Empty names become `"arg"`.
pub fn param_name(name: &str) -> String {
    if name.is_empty() {
        return "arg".to_string();
    }
    to_snake(name)
}

/// Remove the first matching prefix, and an `_` directly after it.
///
/// Returns `None` when no prefix matches.
pub fn strip_any_prefix<'a>(name: &'a str, prefixes: &[String]) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| {
        name.strip_prefix(prefix.as_str())
            .map(|rest| rest.strip_prefix('_').unwrap_or(rest))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_with_special_words() {
        assert_eq!(snake_to_pascal("list_store_new"), "ListStoreNew");
        assert_eq!(snake_to_pascal("get_id"), "GetID");
        assert_eq!(snake_to_pascal("foreach"), "ForEach");
        assert_eq!(snake_to_pascal("dbus_proxy"), "DBusProxy");
    }

    #[test]
    fn pascal_case_skips_empty_words() {
        assert_eq!(snake_to_pascal("__double__under"), "DoubleUnder");
    }

    #[test]
    fn kebab_conversion() {
        assert_eq!(kebab_to_pascal("size-allocate"), "SizeAllocate");
        assert_eq!(to_snake("notify-name"), "notify_name");
    }

    #[test]
    fn keywords_are_escaped() {
        assert_eq!(param_name("type"), "type_");
        assert_eq!(param_name("self"), "self_");
        assert_eq!(param_name("widget"), "widget");
        assert_eq!(param_name(""), "arg");
    }

    #[test]
    fn prefix_stripping() {
        let prefixes = vec!["gtk".to_string(), "g".to_string()];
        assert_eq!(strip_any_prefix("gtk_widget_show", &prefixes), Some("widget_show"));
        assert_eq!(strip_any_prefix("g_free", &prefixes), Some("free"));
        assert_eq!(strip_any_prefix("pango_layout", &prefixes), None);
    }
}
