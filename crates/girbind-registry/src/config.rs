//! Build configuration.
//!
//! A [`Config`] is shared by every namespace in a build. Per-namespace settings
//! live in [`NamespaceConfig`], keyed by the versioned namespace (`"Gtk-4"`);
//! namespaces without an entry are resolved completely.
//!
//! Ignore rules are stored uncompiled so that configs stay cheap to clone and
//! combine. They are compiled once per namespace when the build starts, and
//! malformed rules surface as [`BuildError`]s from [`Config::validate`] or
//! [`RegistryBuilder::build`](crate::RegistryBuilder::build).

use std::fmt;
use std::sync::Arc;

use girbind_core::idl::InfoAttrs;
use girbind_core::{BuildError, Version};
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::types::Type;

/// Custom ignore predicate over `(parent, name, info)`.
pub type IgnorePredicate = Arc<dyn Fn(&str, &str, &InfoAttrs) -> bool + Send + Sync>;

/// A rule excluding IDL definitions from the build.
#[derive(Clone)]
pub enum IgnoreRule {
    /// `"Name"` or `"Parent.Name"`; `"Parent.*"` matches every child of `Parent`.
    Pattern(String),
    /// Matched against `"Parent.Name"`, or `"Name"` at the top level.
    Regex(String),
    Custom(IgnorePredicate),
}

impl IgnoreRule {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        IgnoreRule::Pattern(pattern.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        IgnoreRule::Regex(pattern.into())
    }

    pub fn custom(f: impl Fn(&str, &str, &InfoAttrs) -> bool + Send + Sync + 'static) -> Self {
        IgnoreRule::Custom(Arc::new(f))
    }

    pub(crate) fn compile(&self) -> Result<CompiledIgnore, BuildError> {
        match self {
            IgnoreRule::Pattern(p) => GirPattern::parse(p).map(CompiledIgnore::Pattern),
            IgnoreRule::Regex(p) => Regex::new(p)
                .map(CompiledIgnore::Regex)
                .map_err(|e| BuildError::InvalidRegex {
                    pattern: p.clone(),
                    message: e.to_string(),
                }),
            IgnoreRule::Custom(f) => Ok(CompiledIgnore::Custom(Arc::clone(f))),
        }
    }
}

impl fmt::Debug for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreRule::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            IgnoreRule::Regex(p) => f.debug_tuple("Regex").field(p).finish(),
            IgnoreRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A parsed `"Parent.Name"` pattern. An empty parent means top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GirPattern {
    pub parent: String,
    pub name: String,
}

impl GirPattern {
    pub const WILDCARD: &'static str = "*";

    pub fn parse(pattern: &str) -> Result<Self, BuildError> {
        let parts: Vec<&str> = pattern.split('.').collect();
        match parts.as_slice() {
            [name] => Ok(Self {
                parent: String::new(),
                name: name.to_string(),
            }),
            [parent, name] => Ok(Self {
                parent: parent.to_string(),
                name: name.to_string(),
            }),
            _ => Err(BuildError::InvalidIgnorePattern(pattern.to_string())),
        }
    }

    pub fn matches(&self, parent: &str, name: &str) -> bool {
        if self.name == Self::WILDCARD {
            return parent == self.parent;
        }
        parent == self.parent && name == self.name
    }
}

pub(crate) enum CompiledIgnore {
    Pattern(GirPattern),
    Regex(Regex),
    Custom(IgnorePredicate),
}

impl CompiledIgnore {
    pub(crate) fn matches(&self, parent: &str, name: &str, info: &InfoAttrs) -> bool {
        match self {
            CompiledIgnore::Pattern(p) => p.matches(parent, name),
            CompiledIgnore::Regex(re) if parent.is_empty() => re.is_match(name),
            CompiledIgnore::Regex(re) => re.is_match(&format!("{parent}.{name}")),
            CompiledIgnore::Custom(f) => f(parent, name, info),
        }
    }
}

/// Settings for one versioned namespace.
#[derive(Debug, Clone, Default)]
pub struct NamespaceConfig {
    /// Treat the whole namespace as absent.
    pub ignored: bool,
    /// Skip everything deprecated at or before this version.
    pub min_version: Option<String>,
    /// Skip everything introduced after this version.
    pub max_version: Option<String>,
    pub ignored_definitions: Vec<IgnoreRule>,
    /// Hand-written types that pre-empt IDL definitions of the same name.
    pub manual_types: Vec<Type>,
}

impl NamespaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignored() -> Self {
        Self {
            ignored: true,
            ..Self::default()
        }
    }

    pub fn with_min_version(mut self, version: impl Into<String>) -> Self {
        self.min_version = Some(version.into());
        self
    }

    pub fn with_max_version(mut self, version: impl Into<String>) -> Self {
        self.max_version = Some(version.into());
        self
    }

    pub fn with_ignore(mut self, rule: IgnoreRule) -> Self {
        self.ignored_definitions.push(rule);
        self
    }

    pub fn with_manual_type(mut self, ty: Type) -> Self {
        self.manual_types.push(ty);
        self
    }

    pub(crate) fn parsed_versions(&self) -> Result<(Option<Version>, Option<Version>), BuildError> {
        let min = self.min_version.as_deref().map(str::parse::<Version>).transpose()?;
        let max = self.max_version.as_deref().map(str::parse::<Version>).transpose()?;
        Ok((min, max))
    }

    pub(crate) fn compiled_rules(&self) -> Result<Vec<CompiledIgnore>, BuildError> {
        self.ignored_definitions.iter().map(IgnoreRule::compile).collect()
    }
}

/// Configuration for a whole build.
#[derive(Debug, Clone)]
pub struct Config {
    /// IDL type names to substitute before lookup. Applied once, not transitively.
    pub type_replacements: FxHashMap<String, String>,
    /// Keyed by versioned namespace, e.g. `"GLib-2"`.
    pub namespaces: FxHashMap<String, NamespaceConfig>,
    /// Qualified IDL name of the class every object derives from.
    pub root_object: String,
    /// Qualified IDL name of the error type thrown by callables.
    pub error_type: Option<String>,
    /// Qualified IDL names sorted to the front of target parameter lists.
    pub context_types: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            type_replacements: FxHashMap::default(),
            namespaces: FxHashMap::default(),
            root_object: "GObject.Object".to_string(),
            error_type: Some("GLib.Error".to_string()),
            context_types: vec!["Gio.Cancellable".to_string()],
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.type_replacements.insert(from.into(), to.into());
        self
    }

    pub fn with_namespace(mut self, key: impl Into<String>, config: NamespaceConfig) -> Self {
        self.namespaces.insert(key.into(), config);
        self
    }

    pub fn with_root_object(mut self, name: impl Into<String>) -> Self {
        self.root_object = name.into();
        self
    }

    pub fn with_error_type(mut self, name: Option<String>) -> Self {
        self.error_type = name;
        self
    }

    pub fn with_context_type(mut self, name: impl Into<String>) -> Self {
        self.context_types.push(name.into());
        self
    }

    /// Settings for the versioned namespace `key`.
    pub fn namespace(&self, key: &str) -> Option<&NamespaceConfig> {
        self.namespaces.get(key)
    }

    /// Merge an extension config into this one. Entries of `other` win on collision.
    pub fn combine(mut self, other: Config) -> Config {
        self.type_replacements.extend(other.type_replacements);
        self.namespaces.extend(other.namespaces);
        for ctx in other.context_types {
            if !self.context_types.contains(&ctx) {
                self.context_types.push(ctx);
            }
        }
        self
    }

    /// Check every version string and ignore rule.
    pub fn validate(&self) -> Result<(), BuildError> {
        for ns in self.namespaces.values() {
            ns.parsed_versions()?;
            ns.compiled_rules()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(rule: IgnoreRule, parent: &str, name: &str) -> bool {
        match rule.compile() {
            Ok(c) => c.matches(parent, name, &InfoAttrs::default()),
            Err(e) => panic!("rule failed to compile: {e}"),
        }
    }

    #[test]
    fn exact_and_nested_patterns() {
        assert!(matches(IgnoreRule::pattern("Widget"), "", "Widget"));
        assert!(!matches(IgnoreRule::pattern("Widget"), "Box", "Widget"));
        assert!(matches(IgnoreRule::pattern("Widget.show"), "Widget", "show"));
        assert!(!matches(IgnoreRule::pattern("Widget.show"), "Widget", "hide"));
    }

    #[test]
    fn wildcard_matches_all_children() {
        let rule = || IgnoreRule::pattern("Widget.*");
        assert!(matches(rule(), "Widget", "show"));
        assert!(matches(rule(), "Widget", "hide"));
        assert!(!matches(rule(), "Label", "show"));
    }

    #[test]
    fn regex_sees_qualified_name() {
        let rule = || IgnoreRule::regex("^Widget\\..*_internal$");
        assert!(matches(rule(), "Widget", "show_internal"));
        assert!(!matches(rule(), "", "show_internal"));
        assert!(matches(IgnoreRule::regex("^Private"), "", "PrivateThing"));
    }

    #[test]
    fn custom_predicate() {
        let rule = IgnoreRule::custom(|_, _, info| info.deprecated);
        let compiled = rule.compile().map_err(|e| e.to_string());
        let Ok(compiled) = compiled else {
            panic!("custom rules always compile");
        };
        let deprecated = InfoAttrs {
            deprecated: true,
            ..InfoAttrs::default()
        };
        assert!(compiled.matches("", "x", &deprecated));
        assert!(!compiled.matches("", "x", &InfoAttrs::default()));
    }

    #[test]
    fn invalid_rules_are_errors() {
        assert!(matches!(
            GirPattern::parse("a.b.c"),
            Err(BuildError::InvalidIgnorePattern(_))
        ));
        assert!(matches!(
            IgnoreRule::regex("(unclosed").compile(),
            Err(BuildError::InvalidRegex { .. })
        ));

        let config = Config::new().with_namespace(
            "Gtk-4",
            NamespaceConfig::new().with_ignore(IgnoreRule::pattern("a.b.c")),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_versions_are_errors() {
        let config =
            Config::new().with_namespace("Gtk-4", NamespaceConfig::new().with_min_version("four"));
        assert!(matches!(config.validate(), Err(BuildError::InvalidVersion(_))));
    }

    #[test]
    fn combine_merges_maps() {
        let base = Config::new()
            .with_replacement("GLib.Type", "GType")
            .with_namespace("GLib-2", NamespaceConfig::new());
        let ext = Config::new()
            .with_replacement("Gdk.Atom", "gpointer")
            .with_namespace("Gtk-4", NamespaceConfig::ignored());

        let combined = base.combine(ext);
        assert_eq!(combined.type_replacements.len(), 2);
        assert!(combined.namespace("GLib-2").is_some());
        assert!(combined.namespace("Gtk-4").is_some_and(|ns| ns.ignored));
        assert_eq!(combined.context_types, vec!["Gio.Cancellable".to_string()]);
    }
}
