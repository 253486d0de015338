use serde::{Deserialize, Serialize};

/// Condition text of the synthesized final rule of a flattened `IIF` chain.
pub const OTHERWISE: &str = "Otherwise";

/// Condition text of the final rule produced from a `CASE ... ELSE` branch.
pub const ELSE: &str = "ELSE";

/// One row of a flattened decision table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub condition: String,
    pub outcome: String,
}

impl Rule {
    pub fn new(condition: impl Into<String>, outcome: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            outcome: outcome.into(),
        }
    }

    pub fn otherwise(outcome: impl Into<String>) -> Self {
        Self::new(OTHERWISE, outcome)
    }

    pub fn else_branch(outcome: impl Into<String>) -> Self {
        Self::new(ELSE, outcome)
    }

    /// True for the catch-all rule that ends a flattened expression.
    pub fn is_default(&self) -> bool {
        self.condition == OTHERWISE || self.condition == ELSE
    }
}
