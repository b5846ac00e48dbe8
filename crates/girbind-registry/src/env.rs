//! Per-namespace build environment: filtering and naming rules.

use girbind_core::idl::{IdlNamespace, InfoAttrs};
use girbind_core::{BuildError, Version, names, versioned_namespace};
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::config::{CompiledIgnore, Config};
use crate::types::module_name;

pub(crate) struct Env<'a> {
    pub config: &'a Config,
    /// Identity key, e.g. `"Gtk-4"`.
    pub versioned: String,
    pub version: Version,
    pub module: String,
    min_version: Option<Version>,
    max_version: Option<Version>,
    ignore: Vec<CompiledIgnore>,
    identifier_prefixes: Vec<String>,
    symbol_prefixes: Vec<String>,
    manual_names: FxHashSet<String>,
}

impl<'a> Env<'a> {
    /// `Ok(None)` when the namespace is configured as ignored.
    pub fn new(config: &'a Config, ns: &IdlNamespace) -> Result<Option<Self>, BuildError> {
        let versioned = versioned_namespace(&ns.name, &ns.version);
        let version: Version = ns.version.parse()?;

        let (min_version, max_version, ignore, manual_names) = match config.namespace(&versioned) {
            Some(cfg) if cfg.ignored => return Ok(None),
            Some(cfg) => {
                let (min, max) = cfg.parsed_versions()?;
                let manual = cfg
                    .manual_types
                    .iter()
                    .map(|t| t.gir_name().to_string())
                    .collect();
                (min, max, cfg.compiled_rules()?, manual)
            }
            None => (None, None, Vec::new(), FxHashSet::default()),
        };

        Ok(Some(Self {
            config,
            module: module_name(&ns.name),
            versioned,
            version,
            min_version,
            max_version,
            ignore,
            identifier_prefixes: ns.identifier_prefixes.clone(),
            symbol_prefixes: ns.symbol_prefixes.clone(),
            manual_names,
        }))
    }

    /// Why a definition is excluded, or `None` to keep it.
    ///
    /// Checks run in order: deprecation against the minimum version, introduction
    /// against the maximum version, manual-type pre-emption, then ignore rules.
    pub fn skip(&self, parent: Option<&str>, name: &str, info: &InfoAttrs) -> Option<String> {
        if let Some(min) = self.min_version
            && info.deprecated
        {
            let since = parse_or_zero(info.deprecated_version.as_deref());
            if since <= min {
                info!(name, %since, %min, "skipping deprecated");
                return Some(format!("deprecated since {since}"));
            }
        }

        if let Some(max) = self.max_version
            && let Some(introduced) = info.version.as_deref()
        {
            let introduced = parse_or_zero(Some(introduced));
            if max < introduced {
                info!(name, %introduced, %max, "skipping too new");
                return Some(format!("introduced in {introduced}"));
            }
        }

        if self.manual_names.contains(name) {
            info!(name, "skipping manually implemented type");
            return Some("manually implemented".to_string());
        }

        let parent = parent.unwrap_or("");
        if self.ignore.iter().any(|rule| rule.matches(parent, name, info)) {
            debug!(parent, name, "ignored by configuration");
            return Some("ignored by configuration".to_string());
        }

        None
    }

    /// Prefix for exported trampoline symbols, unique per namespace and major version.
    pub fn trampoline_prefix(&self) -> String {
        format!("_girbind_{}{}", self.module, self.version.major)
    }

    /// Strip the namespace's identifier prefix from a native identifier.
    pub fn identifier_to_target(&self, identifier: &str) -> String {
        match names::strip_any_prefix(identifier, &self.identifier_prefixes) {
            Some(stripped) => stripped.to_string(),
            None => {
                warn!(namespace = %self.versioned, identifier, "identifier does not have a prefix, using as is");
                identifier.to_string()
            }
        }
    }

    /// Strip the namespace's symbol prefix from a native function symbol.
    pub fn symbol_to_target(&self, symbol: &str) -> Option<String> {
        names::strip_any_prefix(symbol, &self.symbol_prefixes).map(names::to_snake)
    }
}

fn parse_or_zero(v: Option<&str>) -> Version {
    v.and_then(|v| v.parse().ok()).unwrap_or_default()
}
