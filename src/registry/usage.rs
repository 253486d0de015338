use super::Registry;
use crate::process::StepRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a variable name is matched against a step's flattened parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageMatching {
    /// Plain substring containment. `Total` also matches inside `GrandTotal`.
    #[default]
    Substring,
    /// The name must not be adjacent to identifier characters.
    WholeWord,
}

impl UsageMatching {
    fn is_match(self, haystack: &str, name: &str) -> bool {
        match self {
            UsageMatching::Substring => haystack.contains(name),
            UsageMatching::WholeWord => haystack.match_indices(name).any(|(at, _)| {
                let before = haystack[..at].chars().next_back();
                let after = haystack[at + name.len()..].chars().next();
                !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
            }),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Second pass: records, for every registered variable, the steps whose
/// parameters mention it. Usage lists keep first-encounter order and never
/// hold the same step name twice.
pub fn index_usage(registry: &mut Registry, steps: &[StepRecord], matching: UsageMatching) {
    if registry.variables.is_empty() {
        return;
    }
    let mut hits = 0usize;
    for step in steps {
        let text = step.params().flat_text();
        if text.is_empty() {
            continue;
        }
        let step_name = step.display_name();
        for entry in registry.variables.values_mut() {
            if !entry.name.is_empty() && matching.is_match(&text, &entry.name) {
                hits += 1;
                entry.used_by.insert(step_name.clone());
            }
        }
    }
    debug!(hits, ?matching, "variable usage indexed");
}
