//! The configuration orchestrator.
//!
//! A [`Configuration`] holds an ordered list of plugins by descending
//! priority. Loading a declared variable consults plugins until the
//! first hit (short-circuit: an empty-but-defined higher-priority value
//! still wins), runs placeholder substitution, parses the declared
//! kind, and caches the effective value. Explicit writes target the
//! plugin registered at the requested priority, creating an in-memory
//! plugin there when absent.
//!
//! # Listeners
//!
//! Change listeners are invoked synchronously on define/delete, in
//! registration order, after the store lock is released. A listener
//! that re-enters the configuration therefore observes committed state
//! which may already reflect a still-later write from another thread.

use crate::config::plugins::{ConfigPlugin, InMemoryPlugin, PluginHit};
use crate::config::store::{RemoveOutcome, UpsertOutcome, VariableStore};
use crate::config::substitution::{self, SubstitutionOptions};
use crate::config::types::{Priority, VarDecl, VarKind, VarPath, VarValue, Variable};
use crate::ini::escape;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Kind of configuration change reported to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEvent {
    /// A variable was defined for the first time.
    Created,
    /// A variable was re-defined at the same or a higher priority.
    Defined,
    /// A variable was deleted.
    Deleted,
}

/// Which variables a listener wants to observe. All matching is
/// case-insensitive.
#[derive(Debug, Clone)]
pub enum ListenerFilter {
    /// The exact variable path.
    ExactPath(VarPath),
    /// Variables whose final name segment equals the given name.
    NameSuffix(String),
    /// Variables below the given path prefix.
    PathPrefix(VarPath),
    /// Variables whose full path contains the given text.
    Substring(String),
}

impl ListenerFilter {
    fn matches(&self, path: &VarPath) -> bool {
        match self {
            ListenerFilter::ExactPath(p) => p == path,
            ListenerFilter::NameSuffix(name) => path.name().eq_ignore_ascii_case(name),
            ListenerFilter::PathPrefix(prefix) => {
                let prefix_key = prefix.key();
                let key = path.key();
                key == prefix_key || key.starts_with(&format!("{prefix_key}/"))
            }
            ListenerFilter::Substring(text) => path.key().contains(&text.to_lowercase()),
        }
    }
}

type ListenerFn = Arc<dyn Fn(&Variable, ConfigEvent, Priority) + Send + Sync>;

struct ListenerRecord {
    id: usize,
    filter: ListenerFilter,
    callback: ListenerFn,
}

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(usize);

/// Outcome of an explicit store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The value is now effective; carries the previous effective priority.
    Stored(Priority),
    /// The plugin recorded its private copy, but a higher-priority value
    /// keeps the effective result unchanged.
    Shadowed(Priority),
    /// A protected value blocked the write entirely.
    Blocked(Priority),
}

/// A loaded variable together with its typed value.
#[derive(Debug, Clone)]
pub struct ResolvedVariable {
    pub variable: Variable,
    pub kind: VarKind,
    pub value: VarValue,
}

impl ResolvedVariable {
    pub fn priority(&self) -> Priority {
        self.variable.priority
    }
}

struct PluginSlot {
    priority: Priority,
    plugin: Box<dyn ConfigPlugin>,
}

struct Inner {
    /// Sorted by descending priority.
    plugins: Vec<PluginSlot>,
    /// Effective-value cache.
    store: VariableStore,
    declarations: HashMap<String, VarDecl>,
    substitution: SubstitutionOptions,
    true_values: Vec<String>,
}

/// Layered configuration: plugin chain, effective store, declarations
/// and change listeners behind one lock.
pub struct Configuration {
    inner: Mutex<Inner>,
    listeners: Mutex<Vec<ListenerRecord>>,
    next_listener_id: std::sync::atomic::AtomicUsize,
}

impl Configuration {
    /// An empty configuration without any plugins.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                plugins: Vec::new(),
                store: VariableStore::new(),
                declarations: HashMap::new(),
                substitution: SubstitutionOptions::default(),
                true_values: ["1", "true", "t", "yes", "y", "on", "ok"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A configuration with the standard plugin chain: in-memory
    /// defaults, environment variables, the given command-line tokens,
    /// and an in-memory store for protected values.
    pub fn with_default_plugins(args: impl IntoIterator<Item = String>) -> Self {
        let config = Self::new();
        config.insert_plugin(
            Box::new(InMemoryPlugin::new("default values")),
            Priority::Default,
        );
        config.insert_plugin(
            Box::new(crate::config::plugins::EnvironmentPlugin::new()),
            Priority::Environment,
        );
        config.insert_plugin(
            Box::new(crate::config::plugins::CliArgsPlugin::new(args)),
            Priority::Cli,
        );
        config.insert_plugin(
            Box::new(InMemoryPlugin::new("protected values")),
            Priority::Protected,
        );
        config
    }

    /// Attach a plugin at the given priority, replacing any plugin
    /// previously registered there.
    pub fn insert_plugin(&self, plugin: Box<dyn ConfigPlugin>, priority: Priority) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(slot) = inner.plugins.iter_mut().find(|s| s.priority == priority) {
            debug!(
                event = "config.plugin.replaced",
                priority = %priority,
                plugin = plugin.name(),
            );
            slot.plugin = plugin;
            return;
        }
        inner.plugins.push(PluginSlot { priority, plugin });
        inner.plugins.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Detach the plugin at the given priority.
    pub fn remove_plugin(&self, priority: Priority) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.plugins.len();
        inner.plugins.retain(|s| s.priority != priority);
        inner.plugins.len() != before
    }

    pub fn plugin_count(&self) -> usize {
        self.inner.lock().unwrap().plugins.len()
    }

    /// Replace the placeholder syntax used during loads.
    pub fn set_substitution_options(&self, options: SubstitutionOptions) {
        self.inner.lock().unwrap().substitution = options;
    }

    /// Whether the given text spells a true value (`1 true t yes y on
    /// ok`, case-insensitive).
    pub fn is_true(&self, value: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        Self::is_true_in(&inner.true_values, value)
    }

    fn is_true_in(true_values: &[String], value: &str) -> bool {
        true_values.iter().any(|t| t.eq_ignore_ascii_case(value))
    }

    /// Register a declaration. Returns whether the path was new.
    pub fn declare(&self, decl: VarDecl) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let key = decl.path.key();
        inner.declarations.insert(key.clone(), decl).is_none()
    }

    /// Load a declared variable through the plugin chain.
    ///
    /// When no plugin defines the variable and the declaration carries a
    /// default, the default is stored at [`Priority::Default`] and the
    /// load is repeated, so the result always went through substitution
    /// and parsing.
    pub fn load(&self, decl: &VarDecl) -> ResolvedVariable {
        let mut notification = None;
        let resolved = {
            let mut inner = self.inner.lock().unwrap();
            inner
                .declarations
                .entry(decl.path.key())
                .or_insert_with(|| decl.clone());

            let (_, priority) = Self::load_raw(&inner, decl);
            if priority == Priority::None
                && let Some(default) = decl.default.clone()
            {
                notification =
                    Self::store_locked(&mut inner, decl, &default, Priority::Default).1;
            }
            Self::resolve_locked(&mut inner, decl)
        };
        self.notify(notification);
        resolved
    }

    /// Load by path alone, as a string-typed variable.
    pub fn load_path(&self, path: &str) -> ResolvedVariable {
        self.load(&VarDecl::new(path, VarKind::String))
    }

    /// Write an externalized value at the given priority (the "standard"
    /// write priority is [`Priority::File`]).
    pub fn store(&self, decl: &VarDecl, externalized: &str, priority: Priority) -> StoreOutcome {
        let (outcome, notification) = {
            let mut inner = self.inner.lock().unwrap();
            Self::store_locked(&mut inner, decl, externalized, priority)
        };
        self.notify(notification);
        outcome
    }

    /// Write a protected value that no lower priority can overwrite.
    pub fn protect(&self, decl: &VarDecl, externalized: &str) -> StoreOutcome {
        self.store(decl, externalized, Priority::Protected)
    }

    /// Delete a variable at the given priority. The plugin's private
    /// record is cleared even when that priority does not own the
    /// effective value.
    pub fn delete(&self, path: &VarPath, priority: Priority) -> RemoveOutcome {
        let (outcome, notification) = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(slot) = inner.plugins.iter_mut().find(|s| s.priority == priority) {
                slot.plugin.remove(path);
            }
            let outcome = inner.store.remove(path, priority);
            let notification = match outcome {
                RemoveOutcome::Removed(previous) => {
                    debug!(event = "config.variable.deleted", path = %path, priority = %previous);
                    Some((
                        Variable::new(path.clone(), Vec::new(), Priority::None),
                        ConfigEvent::Deleted,
                        previous,
                    ))
                }
                _ => None,
            };
            (outcome, notification)
        };
        self.notify(notification);
        outcome
    }

    /// The cached effective variable, if any load or store populated it.
    pub fn effective(&self, path: &VarPath) -> Option<Variable> {
        self.inner.lock().unwrap().store.lookup(path).cloned()
    }

    /// Register a change listener. Listeners run synchronously, in
    /// registration order, after the store lock was released.
    pub fn listen(
        &self,
        filter: ListenerFilter,
        callback: impl Fn(&Variable, ConfigEvent, Priority) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self
            .next_listener_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.listeners.lock().unwrap().push(ListenerRecord {
            id,
            filter,
            callback: Arc::new(callback),
        });
        ListenerId(id)
    }

    /// Remove a previously registered listener.
    pub fn unlisten(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap();
        let before = listeners.len();
        listeners.retain(|r| r.id != id.0);
        listeners.len() != before
    }

    /// All variables of a section, across all enumerable plugins, each
    /// path reported once with its effective (highest-priority) value.
    pub fn section_vars(&self, section: &str) -> Vec<ResolvedVariable> {
        let mut inner = self.inner.lock().unwrap();
        let mut seen = std::collections::HashSet::new();
        let mut paths = Vec::new();
        for slot in &inner.plugins {
            for path in slot.plugin.section_paths(section) {
                if seen.insert(path.key()) {
                    paths.push(path);
                }
            }
        }
        paths
            .into_iter()
            .map(|path| {
                let decl = inner
                    .declarations
                    .get(&path.key())
                    .cloned()
                    .unwrap_or_else(|| VarDecl::new(&path.to_string(), VarKind::String));
                Self::resolve_locked(&mut inner, &decl)
            })
            .collect()
    }

    /// Copy default-priority entries of a section into the plugin at
    /// `dest` when it does not define them yet. Returns the number of
    /// entries copied.
    pub fn import_defaults(&self, dest: Priority, section: &str) -> usize {
        let mut inner = self.inner.lock().unwrap();

        let defaults: Vec<(VarPath, Vec<String>)> = {
            let Some(default_slot) = inner
                .plugins
                .iter()
                .find(|s| s.priority == Priority::Default)
            else {
                return 0;
            };
            default_slot
                .plugin
                .section_paths(section)
                .into_iter()
                .filter_map(|path| {
                    let decl = VarDecl::new(&path.to_string(), VarKind::String);
                    match default_slot.plugin.get(&decl) {
                        Some(PluginHit::Values(values)) => Some((path, values)),
                        Some(PluginHit::Raw(raw)) => {
                            Some((path, escape::split_values(&raw, decl.delim)))
                        }
                        None => None,
                    }
                })
                .collect()
        };

        let Some(dest_slot) = inner.plugins.iter_mut().find(|s| s.priority == dest) else {
            return 0;
        };
        let mut copied = 0;
        for (path, values) in defaults {
            let decl = VarDecl::new(&path.to_string(), VarKind::String);
            if dest_slot.plugin.get(&decl).is_some() {
                continue;
            }
            let variable = Variable::new(path, values, dest);
            if dest_slot.plugin.store(&variable) {
                copied += 1;
            }
        }
        copied
    }

    // ---------------------------------------------------------------
    // internals
    // ---------------------------------------------------------------

    /// Walk the plugin chain for the first hit. No substitution.
    fn load_raw(inner: &Inner, decl: &VarDecl) -> (Vec<String>, Priority) {
        if decl.path.is_empty() {
            warn!(event = "config.load.empty_path", "empty variable path given");
            return (Vec::new(), Priority::None);
        }
        for slot in &inner.plugins {
            if let Some(hit) = slot.plugin.get(decl) {
                let values = match hit {
                    PluginHit::Raw(raw) => escape::split_values(&raw, decl.delim),
                    PluginHit::Values(values) => values,
                };
                return (values, slot.priority);
            }
        }
        (Vec::new(), Priority::None)
    }

    /// Full load: plugin chain, substitution, parse, cache.
    fn resolve_locked(inner: &mut Inner, decl: &VarDecl) -> ResolvedVariable {
        let (mut values, priority) = Self::load_raw(inner, decl);

        if priority != Priority::None {
            let options = inner.substitution.clone();
            let lookup = |path: &VarPath| -> Option<String> {
                let sub_decl = VarDecl {
                    path: path.clone(),
                    kind: VarKind::String,
                    default: None,
                    delim: decl.delim,
                    comments: String::new(),
                    hints: decl.hints.clone(),
                };
                let (sub_values, sub_priority) = Self::load_raw(inner, &sub_decl);
                (sub_priority != Priority::None)
                    .then(|| sub_values.into_iter().next().unwrap_or_default())
            };
            for value in &mut values {
                if value.contains(&options.start) {
                    *value = substitution::expand(value, &options, &lookup);
                }
            }
        }

        let value = match VarValue::parse(decl.kind, &values, |s| {
            Self::is_true_in(&inner.true_values, s)
        }) {
            Ok(value) => value,
            Err(message) => {
                warn!(
                    event = "config.value.parse_failed",
                    path = %decl.path,
                    message = %message,
                    "falling back to the raw string value"
                );
                VarValue::Str(values.first().cloned().unwrap_or_default())
            }
        };

        let mut variable = Variable::new(decl.path.clone(), values, priority);
        variable.delim = decl.delim;
        variable.comments = decl.comments.clone();
        variable.hints = decl.hints.clone();

        if priority != Priority::None {
            inner.store.evict(&decl.path);
            inner.store.upsert(variable.clone());
        }

        ResolvedVariable {
            variable,
            kind: decl.kind,
            value,
        }
    }

    /// Gated write: effective store first (may block on protected),
    /// then the plugin at the target priority.
    fn store_locked(
        inner: &mut Inner,
        decl: &VarDecl,
        externalized: &str,
        priority: Priority,
    ) -> (StoreOutcome, Option<(Variable, ConfigEvent, Priority)>) {
        let values = escape::split_values(externalized, decl.delim);
        let mut variable = Variable::new(decl.path.clone(), values, priority);
        variable.delim = decl.delim;
        variable.comments = decl.comments.clone();
        variable.hints = decl.hints.clone();

        match inner.store.upsert(variable.clone()) {
            UpsertOutcome::Blocked(holder)
                if holder == Priority::Protected && priority != Priority::Protected =>
            {
                debug!(
                    event = "config.variable.store_blocked",
                    path = %decl.path,
                    priority = %priority,
                    holder = %holder,
                );
                (StoreOutcome::Blocked(holder), None)
            }
            UpsertOutcome::Blocked(holder) => {
                // the plugin keeps its private copy, the effective value
                // stays with the higher-priority holder
                Self::write_plugin(inner, &variable, priority);
                (StoreOutcome::Shadowed(holder), None)
            }
            outcome => {
                let previous = match outcome {
                    UpsertOutcome::Replaced(previous) => previous,
                    _ => Priority::None,
                };
                Self::write_plugin(inner, &variable, priority);
                debug!(
                    event = "config.variable.defined",
                    path = %decl.path,
                    priority = %priority,
                );
                let event = if previous == Priority::None {
                    ConfigEvent::Created
                } else {
                    ConfigEvent::Defined
                };
                (StoreOutcome::Stored(previous), Some((variable, event, previous)))
            }
        }
    }

    /// Hand the variable to the plugin at `priority`, creating an
    /// in-memory plugin there when none is registered.
    fn write_plugin(inner: &mut Inner, variable: &Variable, priority: Priority) {
        if let Some(slot) = inner.plugins.iter_mut().find(|s| s.priority == priority) {
            if !slot.plugin.store(variable) {
                warn!(
                    event = "config.plugin.store_rejected",
                    path = %variable.path,
                    plugin = slot.plugin.name(),
                    "plugin at target priority is read-only, value kept in effective store only"
                );
            }
            return;
        }
        let mut plugin = InMemoryPlugin::new(format!("{priority} values"));
        plugin.store(variable);
        inner.plugins.push(PluginSlot {
            priority,
            plugin: Box::new(plugin),
        });
        inner.plugins.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Invoke matching listeners. Called with no lock held on `inner`.
    fn notify(&self, notification: Option<(Variable, ConfigEvent, Priority)>) {
        let Some((variable, event, previous)) = notification else {
            return;
        };
        let callbacks: Vec<ListenerFn> = {
            let listeners = self.listeners.lock().unwrap();
            listeners
                .iter()
                .filter(|r| r.filter.matches(&variable.path))
                .map(|r| Arc::clone(&r.callback))
                .collect()
        };
        for callback in callbacks {
            callback(&variable, event, previous);
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn decl(path: &str) -> VarDecl {
        VarDecl::new(path, VarKind::String)
    }

    fn config_with_memory() -> Configuration {
        let config = Configuration::new();
        config.insert_plugin(Box::new(InMemoryPlugin::new("defaults")), Priority::Default);
        config.insert_plugin(
            Box::new(InMemoryPlugin::new("protected")),
            Priority::Protected,
        );
        config
    }

    #[test]
    fn test_load_undeclared_returns_none_priority() {
        let config = config_with_memory();
        let resolved = config.load(&decl("nothing/here"));
        assert_eq!(resolved.priority(), Priority::None);
        assert!(!resolved.variable.is_defined());
    }

    #[test]
    fn test_store_then_load() {
        let config = config_with_memory();
        config.store(&decl("app/name"), "skald", Priority::Default);
        let resolved = config.load(&decl("app/name"));
        assert_eq!(resolved.variable.value(), Some("skald"));
        assert_eq!(resolved.priority(), Priority::Default);
    }

    #[test]
    fn test_default_value_applies_on_miss() {
        let config = config_with_memory();
        let declaration = decl("net/port").with_default("8080");
        let resolved = config.load(&declaration);
        assert_eq!(resolved.variable.value(), Some("8080"));
        assert_eq!(resolved.priority(), Priority::Default);
    }

    #[test]
    fn test_higher_priority_short_circuits() {
        let config = config_with_memory();
        config.store(&decl("a"), "low", Priority::Default);
        config.protect(&decl("a"), "high");
        let resolved = config.load(&decl("a"));
        assert_eq!(resolved.variable.value(), Some("high"));
        assert_eq!(resolved.priority(), Priority::Protected);
    }

    #[test]
    fn test_protected_blocks_lower_write() {
        let config = config_with_memory();
        config.protect(&decl("locked"), "X");
        let outcome = config.store(&decl("locked"), "Y", Priority::Default);
        assert_eq!(outcome, StoreOutcome::Blocked(Priority::Protected));
        let resolved = config.load(&decl("locked"));
        assert_eq!(resolved.variable.value(), Some("X"));
    }

    #[test]
    fn test_priority_monotonicity() {
        let config = config_with_memory();
        config.store(&decl("p"), "file", Priority::File);
        // A later lower-priority write must not change the effective value.
        config.store(&decl("p"), "default", Priority::Default);
        let resolved = config.load(&decl("p"));
        assert_eq!(resolved.variable.value(), Some("file"));
        assert_eq!(resolved.priority(), Priority::File);
    }

    #[test]
    fn test_lower_priority_store_is_shadowed() {
        let config = config_with_memory();
        config.store(&decl("s"), "file", Priority::File);
        let outcome = config.store(&decl("s"), "default", Priority::Default);
        assert_eq!(outcome, StoreOutcome::Shadowed(Priority::File));
        // the effective value is untouched
        let resolved = config.load(&decl("s"));
        assert_eq!(resolved.variable.value(), Some("file"));
        // but the lower-priority plugin retained its private copy
        config.delete(&VarPath::parse("s"), Priority::File);
        let resolved = config.load(&decl("s"));
        assert_eq!(resolved.variable.value(), Some("default"));
        assert_eq!(resolved.priority(), Priority::Default);
    }

    #[test]
    fn test_substitution_on_load() {
        let config = config_with_memory();
        config.store(&decl("my/result"), "42", Priority::Default);
        config.store(&decl("my/text"), "The result is $MY_RESULT", Priority::Default);
        let resolved = config.load(&decl("my/text"));
        assert_eq!(resolved.variable.value(), Some("The result is 42"));
    }

    #[test]
    fn test_unknown_substitution_empty() {
        let config = config_with_memory();
        config.store(&decl("t"), "[$UNKNOWN]", Priority::Default);
        let resolved = config.load(&decl("t"));
        assert_eq!(resolved.variable.value(), Some("[]"));
    }

    #[test]
    fn test_parse_integer_and_fallback() {
        let config = config_with_memory();
        config.store(&decl("n"), "17", Priority::Default);
        let resolved = config.load(&VarDecl::new("n", VarKind::Integer));
        assert_eq!(resolved.value, VarValue::Integer(17));

        config.store(&decl("bad"), "seventeen", Priority::Default);
        let resolved = config.load(&VarDecl::new("bad", VarKind::Integer));
        // Parse failure degrades to the raw string, never an error.
        assert_eq!(resolved.value, VarValue::Str("seventeen".to_string()));
    }

    #[test]
    fn test_boolean_true_values() {
        let config = config_with_memory();
        for spelling in ["1", "true", "T", "Yes", "y", "ON", "ok"] {
            assert!(config.is_true(spelling), "{spelling}");
        }
        assert!(!config.is_true("nope"));

        config.store(&decl("flag"), "on", Priority::Default);
        let resolved = config.load(&VarDecl::new("flag", VarKind::Boolean));
        assert_eq!(resolved.value, VarValue::Boolean(true));
    }

    #[test]
    fn test_string_list_kind() {
        let config = config_with_memory();
        config.store(&decl("list"), "a, b, c", Priority::Default);
        let resolved = config.load(&VarDecl::new("list", VarKind::StringList));
        assert_eq!(
            resolved.value,
            VarValue::List(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_store_creates_plugin_at_priority() {
        let config = Configuration::new();
        assert_eq!(config.plugin_count(), 0);
        config.store(&decl("x"), "1", Priority::File);
        assert_eq!(config.plugin_count(), 1);
        let resolved = config.load(&decl("x"));
        assert_eq!(resolved.priority(), Priority::File);
    }

    #[test]
    fn test_delete_clears_and_notifies_owner_only() {
        let config = config_with_memory();
        config.store(&decl("d"), "v", Priority::Default);
        assert_eq!(
            config.delete(&VarPath::parse("d"), Priority::File),
            RemoveOutcome::NotOwner(Priority::Default)
        );
        assert_eq!(
            config.delete(&VarPath::parse("d"), Priority::Default),
            RemoveOutcome::Removed(Priority::Default)
        );
        let resolved = config.load(&decl("d"));
        assert_eq!(resolved.priority(), Priority::None);
    }

    #[test]
    fn test_listener_events_and_order() {
        let config = config_with_memory();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let calls_a = Arc::clone(&calls);
        config.listen(ListenerFilter::NameSuffix("watched".to_string()), move |v, e, p| {
            calls_a.lock().unwrap().push(("a", v.path.to_string(), e, p));
        });
        let calls_b = Arc::clone(&calls);
        config.listen(
            ListenerFilter::Substring("watch".to_string()),
            move |v, e, p| {
                calls_b.lock().unwrap().push(("b", v.path.to_string(), e, p));
            },
        );

        config.store(&decl("app/watched"), "1", Priority::Default);
        config.store(&decl("app/watched"), "2", Priority::File);
        config.delete(&VarPath::parse("app/watched"), Priority::File);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 6);
        // Registration order within each change.
        assert_eq!(calls[0].0, "a");
        assert_eq!(calls[1].0, "b");
        assert_eq!(calls[0].2, ConfigEvent::Created);
        assert_eq!(calls[0].3, Priority::None);
        assert_eq!(calls[2].2, ConfigEvent::Defined);
        assert_eq!(calls[2].3, Priority::Default);
        assert_eq!(calls[4].2, ConfigEvent::Deleted);
        assert_eq!(calls[4].3, Priority::File);
    }

    #[test]
    fn test_listener_filters() {
        let filter = ListenerFilter::ExactPath(VarPath::parse("a/b"));
        assert!(filter.matches(&VarPath::parse("A/B")));
        assert!(!filter.matches(&VarPath::parse("a/b/c")));

        let filter = ListenerFilter::PathPrefix(VarPath::parse("a"));
        assert!(filter.matches(&VarPath::parse("a/b")));
        assert!(filter.matches(&VarPath::parse("A")));
        assert!(!filter.matches(&VarPath::parse("ab")));

        let filter = ListenerFilter::NameSuffix("name".to_string());
        assert!(filter.matches(&VarPath::parse("sec/NAME")));
        assert!(!filter.matches(&VarPath::parse("name/other")));
    }

    #[test]
    fn test_listener_reentrancy() {
        // A listener may call back into the configuration; the store
        // lock is released before notification.
        let config = Arc::new(config_with_memory());
        let seen = Arc::new(AtomicUsize::new(0));

        let config_inner = Arc::clone(&config);
        let seen_inner = Arc::clone(&seen);
        config.listen(ListenerFilter::NameSuffix("outer".to_string()), move |_, _, _| {
            let resolved = config_inner.load(&VarDecl::new("outer", VarKind::String));
            assert!(resolved.variable.is_defined());
            seen_inner.fetch_add(1, Ordering::SeqCst);
        });

        config.store(&decl("outer"), "v", Priority::Default);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unlisten() {
        let config = config_with_memory();
        let count = Arc::new(AtomicUsize::new(0));
        let count_inner = Arc::clone(&count);
        let id = config.listen(ListenerFilter::Substring("x".to_string()), move |_, _, _| {
            count_inner.fetch_add(1, Ordering::SeqCst);
        });
        config.store(&decl("x"), "1", Priority::Default);
        assert!(config.unlisten(id));
        config.store(&decl("x"), "2", Priority::Default);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_section_vars_dedup_by_priority() {
        let config = config_with_memory();
        config.store(&decl("sec/a"), "low", Priority::Default);
        config.protect(&decl("sec/a"), "high");
        config.store(&decl("sec/b"), "only", Priority::Default);

        let vars = config.section_vars("sec");
        assert_eq!(vars.len(), 2);
        let a = vars
            .iter()
            .find(|v| v.variable.path.name().eq_ignore_ascii_case("a"))
            .unwrap();
        assert_eq!(a.variable.value(), Some("high"));
        assert_eq!(a.priority(), Priority::Protected);
    }

    #[test]
    fn test_import_defaults() {
        let config = config_with_memory();
        config.store(&decl("sec/a"), "1", Priority::Default);
        config.store(&decl("sec/b"), "2", Priority::Default);
        // One of the two already exists at File priority.
        config.store(&decl("sec/b"), "kept", Priority::File);

        let copied = config.import_defaults(Priority::File, "sec");
        assert_eq!(copied, 1);
        let resolved = config.load(&decl("sec/a"));
        assert_eq!(resolved.priority(), Priority::File);
        let resolved = config.load(&decl("sec/b"));
        assert_eq!(resolved.variable.value(), Some("kept"));
    }
}
