//! Cross-step metadata: variables, tables, iterators and ad-hoc step outputs.
//!
//! Built from the flat step list rather than the tree, because references
//! may point at steps that a tree walk has not reached yet.

mod builder;
mod usage;

pub use builder::{OUTPUT_KEYS, TABLE_KEYS, build_registry, loop_condition};
pub(crate) use builder::{FILE_KEYS, ITERATOR_KEYS, VARIABLE_NAME_KEYS, file_stem, register_step};
pub use usage::{UsageMatching, index_usage};

use crate::process::StepRecord;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// One discovered variable and the steps that mention it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEntry {
    pub name: String,
    /// Current value; later declarations overwrite earlier ones.
    pub value: String,
    /// Display name of the step that last declared the variable.
    pub declared_by: String,
    pub declared_in: String,
    /// True for loop iterators, whose value is the synthesized loop condition.
    pub is_iterator: bool,
    /// Display names of referencing steps, in order of first encounter.
    pub used_by: IndexSet<String>,
}

/// Everything collected during one registry pass. Iteration order of every
/// collection is first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub variables: IndexMap<String, VariableEntry>,
    pub tables: IndexSet<String>,
    pub iterators: IndexSet<String>,
    pub step_outputs: IndexSet<String>,
}

impl Registry {
    pub fn variable(&self, name: &str) -> Option<&VariableEntry> {
        self.variables.get(name)
    }

    pub fn is_table(&self, name: &str) -> bool {
        self.tables.contains(name)
    }

    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Registers or overwrites a variable, keeping its original position and usages.
    pub(crate) fn declare(
        &mut self,
        name: String,
        value: String,
        step: &StepRecord,
        is_iterator: bool,
    ) {
        let entry = self
            .variables
            .entry(name.clone())
            .or_insert_with(|| VariableEntry {
                name,
                ..Default::default()
            });
        entry.value = value;
        entry.declared_by = step.display_name();
        entry.declared_in = step.id.clone();
        entry.is_iterator = is_iterator;
    }
}
