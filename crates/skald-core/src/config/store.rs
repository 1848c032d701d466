//! In-memory variable store with priority-gated writes.
//!
//! The store maps normalized variable paths to [`Variable`] records. A
//! write only replaces an existing record when its priority is at least
//! as high as the record's; a record held at [`Priority::Protected`]
//! additionally rejects every later non-protected write.

use crate::config::types::{Priority, VarPath, Variable};
use std::collections::HashMap;

/// Outcome of [`VariableStore::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The path was not present before.
    Inserted,
    /// An existing record was replaced; carries its previous priority.
    Replaced(Priority),
    /// The write was rejected; carries the priority holding the value.
    Blocked(Priority),
}

/// Outcome of [`VariableStore::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The given priority owned the value; the record was removed.
    Removed(Priority),
    /// A record exists but is owned by a different priority; the
    /// effective value is untouched.
    NotOwner(Priority),
    /// No record for the path.
    NotFound,
}

/// Key→variable tree guarded by priority monotonicity.
#[derive(Debug, Default)]
pub struct VariableStore {
    entries: HashMap<String, Variable>,
    // insertion order, for deterministic iteration
    order: Vec<String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable. Absence is a first-class outcome, not an error.
    pub fn lookup(&self, path: &VarPath) -> Option<&Variable> {
        self.entries.get(&path.key())
    }

    /// Insert or replace the record for `variable.path`.
    ///
    /// The write succeeds when no record exists, or when
    /// `variable.priority >= existing.priority` — except that an existing
    /// `Protected` record rejects any non-protected write.
    pub fn upsert(&mut self, variable: Variable) -> UpsertOutcome {
        let key = variable.path.key();
        match self.entries.get(&key) {
            None => {
                self.order.push(key.clone());
                self.entries.insert(key, variable);
                UpsertOutcome::Inserted
            }
            Some(existing) => {
                let previous = existing.priority;
                if previous == Priority::Protected && variable.priority != Priority::Protected {
                    return UpsertOutcome::Blocked(previous);
                }
                if variable.priority < previous {
                    return UpsertOutcome::Blocked(previous);
                }
                self.entries.insert(key, variable);
                UpsertOutcome::Replaced(previous)
            }
        }
    }

    /// Remove the record for `path` if `priority` currently owns it.
    ///
    /// Removing at a non-owning priority leaves the effective value in
    /// place; the caller is expected to clear that plugin's private copy
    /// regardless of the outcome reported here.
    pub fn remove(&mut self, path: &VarPath, priority: Priority) -> RemoveOutcome {
        let key = path.key();
        match self.entries.get(&key) {
            None => RemoveOutcome::NotFound,
            Some(existing) if existing.priority != priority => {
                RemoveOutcome::NotOwner(existing.priority)
            }
            Some(existing) => {
                let owner = existing.priority;
                self.entries.remove(&key);
                self.order.retain(|k| k != &key);
                RemoveOutcome::Removed(owner)
            }
        }
    }

    /// Remove the record regardless of owning priority.
    pub fn evict(&mut self, path: &VarPath) -> Option<Variable> {
        let key = path.key();
        self.order.retain(|k| k != &key);
        self.entries.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate variables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.order.iter().filter_map(|k| self.entries.get(k))
    }
}
