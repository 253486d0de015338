use crate::error::ProcessError;
use crate::params::{Params, scalar_text};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Sequence key used for steps whose sequence is missing or not a number.
pub const SEQUENCE_LAST: f64 = f64::MAX;

/// The complete, canonical list of step records for one process, ready for analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessDefinition {
    pub steps: Vec<StepRecord>,
}

impl ProcessDefinition {
    pub fn new(steps: Vec<StepRecord>) -> Self {
        Self { steps }
    }

    /// Parses the JSON form of a vendor export (see [`StepContainer`]).
    pub fn from_json(json: &str) -> Result<Self, ProcessError> {
        let container: StepContainer = serde_json::from_str(json)
            .map_err(|e| ProcessError::JsonParseError(e.to_string()))?;
        container.into_definition()
    }
}

/// One step of a vendor process definition, as decoded from the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StepRecord {
    #[serde(alias = "id", alias = "StepId", deserialize_with = "loose_string")]
    pub id: String,
    #[serde(
        default,
        alias = "parentId",
        alias = "ParentStepId",
        deserialize_with = "loose_opt_string"
    )]
    pub parent_id: Option<String>,
    #[serde(default, alias = "stepType", alias = "Type", deserialize_with = "loose_string")]
    pub step_type: String,
    #[serde(
        default,
        alias = "sequence",
        alias = "SequenceNumber",
        deserialize_with = "loose_opt_string"
    )]
    pub sequence: Option<String>,
    #[serde(
        default = "default_active",
        alias = "active",
        alias = "IsActive",
        deserialize_with = "loose_bool"
    )]
    pub active: bool,
    #[serde(default, alias = "name", deserialize_with = "loose_string")]
    pub name: String,
    #[serde(default, alias = "description", deserialize_with = "loose_string")]
    pub description: String,
    #[serde(default, alias = "narration", deserialize_with = "loose_string")]
    pub narration: String,
    #[serde(default, alias = "storageObject", alias = "Parameters")]
    pub storage_object: Value,
}

impl StepRecord {
    pub fn new(id: impl Into<String>, step_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            step_type: step_type.into(),
            sequence: None,
            active: true,
            name: String::new(),
            description: String::new(),
            narration: String::new(),
            storage_object: Value::Null,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_sequence(mut self, sequence: impl ToString) -> Self {
        self.sequence = Some(sequence.to_string());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = narration.into();
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.storage_object = params;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn params(&self) -> Params<'_> {
        Params::new(&self.storage_object)
    }

    /// The parent id, or `None` when the step is declared as a root.
    pub fn parent_key(&self) -> Option<&str> {
        self.parent_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && *p != "0")
    }

    /// Numeric sort key; missing or non-numeric sequences sort last.
    pub fn sequence_key(&self) -> f64 {
        self.sequence
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .unwrap_or(SEQUENCE_LAST)
    }

    /// Name used wherever the step is referred to: the name, else the
    /// description, else the type tag and id.
    pub fn display_name(&self) -> String {
        [&self.name, &self.description]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} {}", self.step_type.trim(), self.id).trim().to_string())
    }
}

/// A value that exporters write either as a single element or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// The top-level container handed over by the XML ingestion layer.
///
/// Accepts `{"Steps": {"Step": [...]}}`, `{"Steps": [...]}` and `{"Step": ...}`,
/// each with a single record or a list.
#[derive(Debug, Clone, Deserialize)]
pub struct StepContainer {
    #[serde(default, alias = "steps", rename = "Steps")]
    steps: Option<StepList>,
    #[serde(default, alias = "step", rename = "Step")]
    step: Option<OneOrMany<StepRecord>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StepList {
    Wrapped {
        #[serde(alias = "step", rename = "Step")]
        step: OneOrMany<StepRecord>,
    },
    Direct(OneOrMany<StepRecord>),
}

impl StepContainer {
    /// Normalizes the container into a definition. A container with no step
    /// list at all is the one input shape the engine rejects.
    pub fn into_definition(self) -> Result<ProcessDefinition, ProcessError> {
        let steps = match (self.steps, self.step) {
            (Some(StepList::Wrapped { step }), _) | (Some(StepList::Direct(step)), _) => step,
            (None, Some(step)) => step,
            (None, None) => return Err(ProcessError::MissingStepList),
        };
        Ok(ProcessDefinition::new(steps.into_vec()))
    }
}

fn default_active() -> bool {
    true
}

fn loose_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_opt_string(deserializer)?.unwrap_or_default())
}

fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_none_or(|n| n != 0.0),
        other => match scalar_text(&other) {
            Some(text) if !text.is_empty() => matches!(
                text.to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "y" | "on"
            ),
            _ => true,
        },
    })
}
