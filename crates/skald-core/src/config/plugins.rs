//! Configuration source plugins.
//!
//! A [`ConfigPlugin`] is a named source (and optional sink) of variable
//! values. The [`Configuration`](crate::config::configuration::Configuration)
//! holds an ordered list of plugins by priority and never touches plugin
//! internals directly; it delegates get/store calls.
//!
//! The built-in set is closed (in-memory, command line, environment,
//! INI file) with [`CustomPlugin`] as the open extension point wrapping
//! user-supplied closures.

use crate::config::store::VariableStore;
use crate::config::types::{VarDecl, VarPath, Variable};
use tracing::warn;

/// A value found by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginHit {
    /// Externalized text that still needs unescaping and delimiter
    /// splitting (command line, environment).
    Raw(String),
    /// Already-internal values (in-memory, INI file).
    Values(Vec<String>),
}

/// A polymorphic source/sink of configuration variables.
pub trait ConfigPlugin: Send {
    /// Human-readable plugin name for diagnostics.
    fn name(&self) -> &str;

    /// Look up the declared variable. `None` means this plugin does not
    /// define it; absence is never an error.
    fn get(&self, decl: &VarDecl) -> Option<PluginHit>;

    /// Store the variable in this plugin's private state. Returns `false`
    /// for read-only plugins.
    fn store(&mut self, _variable: &Variable) -> bool {
        false
    }

    /// Remove this plugin's private record for the path. Returns whether
    /// a record existed.
    fn remove(&mut self, _path: &VarPath) -> bool {
        false
    }

    fn writable(&self) -> bool {
        false
    }

    /// Paths of all variables this plugin defines within a section.
    /// Read-only scan sources (command line, environment) cannot
    /// enumerate and return an empty list.
    fn section_paths(&self, _section: &str) -> Vec<VarPath> {
        Vec::new()
    }
}

/// Plugin keeping variables in memory. Used for programmatic default
/// values and for protected values.
pub struct InMemoryPlugin {
    name: String,
    store: VariableStore,
}

impl InMemoryPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: VariableStore::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl ConfigPlugin for InMemoryPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, decl: &VarDecl) -> Option<PluginHit> {
        self.store
            .lookup(&decl.path)
            .map(|v| PluginHit::Values(v.values.clone()))
    }

    fn store(&mut self, variable: &Variable) -> bool {
        // The private copy is unconditional; priority gating is the
        // configuration's concern.
        self.store.evict(&variable.path);
        if !variable.values.is_empty() {
            self.store.upsert(variable.clone());
        }
        true
    }

    fn remove(&mut self, path: &VarPath) -> bool {
        self.store.evict(path).is_some()
    }

    fn writable(&self) -> bool {
        true
    }

    fn section_paths(&self, section: &str) -> Vec<VarPath> {
        self.store
            .iter()
            .filter(|v| v.path.section().eq_ignore_ascii_case(section))
            .map(|v| v.path.clone())
            .collect()
    }
}

/// Read-only plugin scanning command-line arguments.
///
/// Recognized token forms: `--NAME=value`, `-NAME=value` and bare
/// `--NAME` (boolean-true marker). Name matching is case-insensitive
/// against the flattened `SECTION_NAME` spelling; variables of a
/// default section may also be addressed by bare name. When
/// `min_shortcut` is non-zero, an unambiguous abbreviation of at least
/// that many characters is accepted too.
pub struct CliArgsPlugin {
    args: Vec<String>,
    /// Minimum abbreviation length; `0` disables shortcut matching.
    pub min_shortcut: usize,
    /// Sections whose variables may be given by bare name.
    pub default_sections: Vec<String>,
}

impl CliArgsPlugin {
    /// Scan the given tokens (program name already stripped).
    pub fn new(args: impl IntoIterator<Item = String>) -> Self {
        Self {
            args: args.into_iter().collect(),
            min_shortcut: 0,
            default_sections: Vec::new(),
        }
    }

    /// Scan the process arguments.
    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1))
    }

    pub fn with_min_shortcut(mut self, min_shortcut: usize) -> Self {
        self.min_shortcut = min_shortcut;
        self
    }

    fn allow_bare_name(&self, section: &str) -> bool {
        section.is_empty()
            || self
                .default_sections
                .iter()
                .any(|s| s.eq_ignore_ascii_case(section))
    }

    /// Match a single `-`/`--`-stripped token against the variable
    /// names. Returns the remainder after the matched name.
    fn match_token<'a>(&self, token: &'a str, flat: &str, name: &str, bare_ok: bool) -> Option<&'a str> {
        if let Some(rest) = consume_ignore_case(token, flat) {
            return Some(rest);
        }
        if bare_ok && let Some(rest) = consume_ignore_case(token, name) {
            return Some(rest);
        }
        if self.min_shortcut > 0 {
            let given = token.split('=').next().unwrap_or(token).trim_end();
            if given.len() >= self.min_shortcut
                && (starts_with_ignore_case(flat, given)
                    || (bare_ok && starts_with_ignore_case(name, given)))
            {
                return Some(token[given.len()..].trim_start());
            }
        }
        None
    }
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn consume_ignore_case<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    if !starts_with_ignore_case(token, name) {
        return None;
    }
    let rest = token[name.len()..].trim_start();
    if rest.is_empty() || rest.starts_with('=') {
        Some(rest)
    } else {
        None
    }
}

impl ConfigPlugin for CliArgsPlugin {
    fn name(&self) -> &str {
        "command line"
    }

    fn get(&self, decl: &VarDecl) -> Option<PluginHit> {
        let flat = decl.path.flat();
        let name = decl.path.name();
        let bare_ok = self.allow_bare_name(decl.path.section());

        let mut first_hit: Option<String> = None;
        let mut hits = 0usize;
        for arg in &self.args {
            let mut token = arg.trim();
            if !token.starts_with('-') {
                continue;
            }
            token = &token[1..];
            if let Some(stripped) = token.strip_prefix('-') {
                token = stripped;
            }

            let Some(rest) = self.match_token(token, &flat, name, bare_ok) else {
                continue;
            };

            let value = if rest.is_empty() {
                // Bare flag: boolean-true marker.
                "true".to_string()
            } else {
                rest[1..].trim().to_string()
            };
            hits += 1;
            if first_hit.is_none() {
                first_hit = Some(value);
            }
        }

        if hits > 1 {
            warn!(
                event = "config.cli.ambiguous_match",
                variable = %decl.path,
                matches = hits,
                "multiple command-line tokens match, using the first"
            );
        }
        first_hit.map(PluginHit::Raw)
    }
}

/// Read-only plugin mapping variables 1:1 to process environment
/// variables via the flattened `SECTION_NAME` spelling.
pub struct EnvironmentPlugin;

impl EnvironmentPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvironmentPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPlugin for EnvironmentPlugin {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, decl: &VarDecl) -> Option<PluginHit> {
        let flat = decl.path.flat();
        std::env::var(&flat)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| {
                std::env::var(flat.to_uppercase())
                    .ok()
                    .filter(|v| !v.is_empty())
            })
            .map(PluginHit::Raw)
    }
}

/// Open extension point: a plugin assembled from user-supplied closures.
pub struct CustomPlugin {
    name: String,
    get_fn: Box<dyn Fn(&VarDecl) -> Option<PluginHit> + Send>,
    store_fn: Option<Box<dyn FnMut(&Variable) -> bool + Send>>,
}

impl CustomPlugin {
    pub fn new(
        name: impl Into<String>,
        get_fn: impl Fn(&VarDecl) -> Option<PluginHit> + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            get_fn: Box::new(get_fn),
            store_fn: None,
        }
    }

    pub fn with_store(
        mut self,
        store_fn: impl FnMut(&Variable) -> bool + Send + 'static,
    ) -> Self {
        self.store_fn = Some(Box::new(store_fn));
        self
    }
}

impl ConfigPlugin for CustomPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, decl: &VarDecl) -> Option<PluginHit> {
        (self.get_fn)(decl)
    }

    fn store(&mut self, variable: &Variable) -> bool {
        match self.store_fn.as_mut() {
            Some(f) => f(variable),
            None => false,
        }
    }

    fn writable(&self) -> bool {
        self.store_fn.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{Priority, VarKind};

    fn decl(path: &str) -> VarDecl {
        VarDecl::new(path, VarKind::String)
    }

    fn cli(tokens: &[&str]) -> CliArgsPlugin {
        CliArgsPlugin::new(tokens.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_in_memory_roundtrip() {
        let mut plugin = InMemoryPlugin::new("defaults");
        let variable = Variable::new(
            VarPath::parse("a/b"),
            vec!["v".to_string()],
            Priority::Default,
        );
        assert!(plugin.store(&variable));
        assert_eq!(
            plugin.get(&decl("A/B")),
            Some(PluginHit::Values(vec!["v".to_string()]))
        );
        assert!(plugin.remove(&VarPath::parse("a/b")));
        assert_eq!(plugin.get(&decl("a/b")), None);
    }

    #[test]
    fn test_in_memory_store_empty_deletes() {
        let mut plugin = InMemoryPlugin::new("defaults");
        let mut variable = Variable::new(
            VarPath::parse("a"),
            vec!["v".to_string()],
            Priority::Default,
        );
        plugin.store(&variable);
        variable.values.clear();
        plugin.store(&variable);
        assert_eq!(plugin.get(&decl("a")), None);
    }

    #[test]
    fn test_cli_long_and_short_hyphen() {
        let plugin = cli(&["--FOO_BAR=1", "-OTHER_VAR=x"]);
        assert_eq!(
            plugin.get(&decl("FOO/BAR")),
            Some(PluginHit::Raw("1".to_string()))
        );
        assert_eq!(
            plugin.get(&decl("OTHER/VAR")),
            Some(PluginHit::Raw("x".to_string()))
        );
    }

    #[test]
    fn test_cli_case_insensitive() {
        let plugin = cli(&["--foo_bar=1"]);
        assert_eq!(
            plugin.get(&decl("FOO/BAR")),
            Some(PluginHit::Raw("1".to_string()))
        );
    }

    #[test]
    fn test_cli_bare_flag_is_boolean_marker() {
        let plugin = cli(&["--FEATURES_FAST"]);
        assert_eq!(
            plugin.get(&decl("FEATURES/FAST")),
            Some(PluginHit::Raw("true".to_string()))
        );
    }

    #[test]
    fn test_cli_value_split_at_first_equals() {
        let plugin = cli(&["--A_B=x=y"]);
        assert_eq!(
            plugin.get(&decl("A/B")),
            Some(PluginHit::Raw("x=y".to_string()))
        );
    }

    #[test]
    fn test_cli_top_level_name() {
        let plugin = cli(&["--VERBOSE=3"]);
        assert_eq!(
            plugin.get(&decl("VERBOSE")),
            Some(PluginHit::Raw("3".to_string()))
        );
    }

    #[test]
    fn test_cli_non_matching_token_ignored() {
        let plugin = cli(&["positional", "--OTHER=1"]);
        assert_eq!(plugin.get(&decl("FOO/BAR")), None);
    }

    #[test]
    fn test_cli_prefix_of_longer_name_rejected() {
        // --FOO_BARBAZ=1 must not match FOO/BAR without shortcut rules.
        let plugin = cli(&["--FOO_BARBAZ=1"]);
        assert_eq!(plugin.get(&decl("FOO/BAR")), None);
    }

    #[test]
    fn test_cli_shortcut_match() {
        let plugin = cli(&["--VERB=3"]).with_min_shortcut(4);
        assert_eq!(
            plugin.get(&decl("VERBOSITY")),
            Some(PluginHit::Raw("3".to_string()))
        );
    }

    #[test]
    fn test_cli_shortcut_below_minimum_rejected() {
        let plugin = cli(&["--VE=3"]).with_min_shortcut(4);
        assert_eq!(plugin.get(&decl("VERBOSITY")), None);
    }

    #[test]
    fn test_cli_first_match_wins() {
        let plugin = cli(&["--X=1", "--X=2"]);
        assert_eq!(plugin.get(&decl("X")), Some(PluginHit::Raw("1".to_string())));
    }

    #[test]
    fn test_environment_plugin() {
        // SAFETY: test process environment, no concurrent readers of this key
        unsafe { std::env::set_var("SKALD_TEST_ENV_VAR", "from-env") };
        let plugin = EnvironmentPlugin::new();
        assert_eq!(
            plugin.get(&decl("SKALD/TEST_ENV_VAR")),
            Some(PluginHit::Raw("from-env".to_string()))
        );
        unsafe { std::env::remove_var("SKALD_TEST_ENV_VAR") };
    }

    #[test]
    fn test_environment_plugin_uppercases() {
        unsafe { std::env::set_var("APP_COLOR", "red") };
        let plugin = EnvironmentPlugin::new();
        assert_eq!(
            plugin.get(&decl("app/color")),
            Some(PluginHit::Raw("red".to_string()))
        );
        unsafe { std::env::remove_var("APP_COLOR") };
    }

    #[test]
    fn test_custom_plugin() {
        let plugin = CustomPlugin::new("fixed", |decl| {
            (decl.path.key() == "magic").then(|| PluginHit::Raw("42".to_string()))
        });
        assert_eq!(
            plugin.get(&decl("MAGIC")),
            Some(PluginHit::Raw("42".to_string()))
        );
        assert_eq!(plugin.get(&decl("other")), None);
        assert!(!plugin.writable());
    }
}
