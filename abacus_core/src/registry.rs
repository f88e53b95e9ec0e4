//! # Calculator Registry
//!
//! Process-wide store of [`CalculatorDefinition`]s, keyed by id and iterated
//! in registration order.
//!
//! Definitions are immutable once registered and handed out as `Arc`s, so
//! concurrent readers never observe a half-registered calculator. Registration
//! takes a write lock; lookups and listings take a read lock.
//!
//! ## Duplicate ids
//!
//! What happens when an id is registered twice is a [`DuplicatePolicy`]:
//! `Reject` fails with [`CalcError::DuplicateCalculator`], `Overwrite`
//! replaces the definition in place (keeping its original position) and logs
//! a warning. Debug builds default to `Overwrite`, release builds to `Reject`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculator::CalculatorDefinition;
use crate::errors::{CalcError, CalcResult};

/// What `register` does with an id that is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    Reject,
    Overwrite,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            DuplicatePolicy::Overwrite
        } else {
            DuplicatePolicy::Reject
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    order: Vec<String>,
    by_id: HashMap<String, Arc<CalculatorDefinition>>,
}

/// Concurrent-read calculator registry.
#[derive(Debug, Default)]
pub struct Registry {
    policy: DuplicatePolicy,
    entries: RwLock<Entries>,
}

impl Registry {
    /// Empty registry with the build's default duplicate policy
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Register a definition under its id.
    pub fn register(&self, definition: CalculatorDefinition) -> CalcResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let id = definition.id.clone();

        if entries.by_id.contains_key(&id) {
            match self.policy {
                DuplicatePolicy::Reject => return Err(CalcError::duplicate_calculator(id)),
                DuplicatePolicy::Overwrite => {
                    warn!(calculator_id = %id, "overwriting registered calculator");
                    entries.by_id.insert(id, Arc::new(definition));
                    return Ok(());
                }
            }
        }

        debug!(calculator_id = %id, category = %definition.category, "registered calculator");
        entries.order.push(id.clone());
        entries.by_id.insert(id, Arc::new(definition));
        Ok(())
    }

    /// Register or replace regardless of policy, returning the previous definition.
    pub fn replace(&self, definition: CalculatorDefinition) -> Option<Arc<CalculatorDefinition>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let id = definition.id.clone();
        let previous = entries.by_id.insert(id.clone(), Arc::new(definition));
        if previous.is_none() {
            entries.order.push(id);
        }
        previous
    }

    /// Look up a calculator by id.
    pub fn get(&self, id: &str) -> CalcResult<Arc<CalculatorDefinition>> {
        self.read()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| CalcError::unknown_calculator(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().by_id.contains_key(id)
    }

    /// Every definition in registration order.
    pub fn list(&self) -> Vec<Arc<CalculatorDefinition>> {
        let entries = self.read();
        entries
            .order
            .iter()
            .filter_map(|id| entries.by_id.get(id).cloned())
            .collect()
    }

    /// Definitions whose category matches, ignoring ASCII case.
    pub fn by_category(&self, category: &str) -> Vec<Arc<CalculatorDefinition>> {
        self.list()
            .into_iter()
            .filter(|d| d.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Case-insensitive search over id, name, description and tags.
    pub fn search(&self, query: &str) -> Vec<Arc<CalculatorDefinition>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list();
        }
        self.list()
            .into_iter()
            .filter(|d| {
                d.id.to_lowercase().contains(&needle)
                    || d.name.to_lowercase().contains(&needle)
                    || d.description.to_lowercase().contains(&needle)
                    || d.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Distinct categories in order of first registration.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.list()
            .into_iter()
            .filter(|d| seen.insert(d.category.clone()))
            .map(|d| d.category.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}
