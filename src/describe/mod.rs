//! Step descriptor synthesis: one closed dispatch over [`StepKind`] per
//! descriptor part (context sentence, flow label, details, projection,
//! inputs/outputs). Every arm is a pure function of the step, the mode and the
//! registry built beforehand. Unknown kinds fall through to a generic arm.

mod details;
mod fields;
mod io;
mod projection;
mod sentences;

use crate::expression::{Rule, flatten};
use crate::process::{Mode, StepKind, StepRecord};
use crate::registry::Registry;
use fields::StepFields;
use serde::{Deserialize, Serialize};

/// Default character budget for SQL and script previews.
pub const DEFAULT_PREVIEW_BUDGET: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputKind {
    Warehouse,
    Table,
    Var,
    Iterator,
}

/// The one thing a step produces, when it is discernible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutput {
    pub kind: OutputKind,
    pub name: String,
}

impl StepOutput {
    pub fn new(kind: OutputKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// A projection cell. Formula cells carry the flattened rules of their expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rules: None,
        }
    }

    /// A cell holding expression text, flattened when it is a conditional.
    pub fn expression(text: impl Into<String>) -> Self {
        let text = text.into();
        let rules = flatten(&text);
        Self { text, rules }
    }
}

/// Headered rows for steps that shape tabular data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Everything the synthesizer derives for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub context: String,
    pub flow_label: String,
    pub details: Vec<String>,
    pub projection: Option<Projection>,
    pub rules: Option<Vec<Rule>>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub output: Option<StepOutput>,
}

/// Read-only state shared by every describe call of one analysis run.
#[derive(Debug, Clone, Copy)]
pub struct DescribeContext<'a> {
    pub mode: Mode,
    pub registry: &'a Registry,
    pub preview_budget: usize,
}

impl<'a> DescribeContext<'a> {
    pub fn new(mode: Mode, registry: &'a Registry) -> Self {
        Self {
            mode,
            registry,
            preview_budget: DEFAULT_PREVIEW_BUDGET,
        }
    }

    pub fn with_preview_budget(mut self, budget: usize) -> Self {
        self.preview_budget = budget;
        self
    }

    pub fn is_business(&self) -> bool {
        self.mode.is_business()
    }
}

/// Describes steps of a vendor-specific type the built-in dispatch does not know.
pub trait StepDescriber: Send + Sync {
    /// The vendor type tag this describer handles.
    fn step_type(&self) -> &str;
    fn describe(&self, step: &StepRecord, ctx: &DescribeContext<'_>) -> Descriptor;
}

/// Whether a step appears in output of the given mode.
///
/// Business mode leaves out housekeeping kinds, and it also leaves out every
/// inactive non-structural step, not only inactive housekeeping ones. A
/// disabled query or email is therefore hidden from business readers along
/// with its subtree. Structural kinds always stay, and technical mode keeps
/// everything.
pub fn is_narrated(kind: &StepKind, active: bool, mode: Mode) -> bool {
    if !mode.is_business() || kind.is_structural() {
        return true;
    }
    active && !kind.is_housekeeping()
}

/// Builds the descriptor of one step with the built-in per-kind dispatch.
pub fn describe_step(step: &StepRecord, kind: &StepKind, ctx: &DescribeContext<'_>) -> Descriptor {
    let fields = StepFields::resolve(step);
    let (mut context, flow_label) = sentences::sentence(kind, &fields, step, ctx);

    let narration = step.narration.trim();
    let mut details = details::details(kind, &fields, step, ctx);
    if !narration.is_empty() {
        if ctx.is_business() {
            context = narration.to_string();
        } else {
            details.push(format!("Narration: {}", narration));
        }
    }

    let (inputs, outputs) = io::inputs_outputs(kind, &fields, step, ctx);
    Descriptor {
        context,
        flow_label,
        details,
        projection: projection::projection(kind, step, ctx),
        rules: rules(kind, &fields, step),
        inputs,
        outputs,
        output: io::output(kind, &fields),
    }
}

/// Step-level rules: the flattened value of a variable-setting step, or the
/// flattened condition expression of a decision.
fn rules(kind: &StepKind, fields: &StepFields, step: &StepRecord) -> Option<Vec<Rule>> {
    match kind {
        StepKind::SetVariable | StepKind::DeclareVariable => fields.value.as_deref().and_then(flatten),
        StepKind::CalculatedColumn if fields.column_names.is_empty() => step
            .params()
            .first_text(fields::FORMULA_KEYS)
            .as_deref()
            .and_then(flatten),
        StepKind::Decision | StepKind::Branch => step
            .params()
            .first_text(&["Expression", "ConditionExpression"])
            .as_deref()
            .and_then(flatten),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_registry;
    use serde_json::json;

    fn describe(step: &StepRecord, mode: Mode) -> Descriptor {
        let registry = build_registry(std::slice::from_ref(step));
        let ctx = DescribeContext::new(mode, &registry);
        describe_step(step, &StepKind::from_tag(&step.step_type), &ctx)
    }

    #[test]
    fn test_business_filter() {
        assert!(!is_narrated(&StepKind::PurgeTable, true, Mode::Business));
        assert!(is_narrated(&StepKind::PurgeTable, true, Mode::Technical));
        assert!(is_narrated(&StepKind::Loop, false, Mode::Business));
        assert!(!is_narrated(&StepKind::Query, false, Mode::Business));
        assert!(is_narrated(&StepKind::Query, false, Mode::Technical));
    }

    #[test]
    fn test_business_filter_hides_every_inactive_non_structural_kind() {
        let other = StepKind::Other("AuditTrail".to_string());
        for kind in [StepKind::SendEmail, StepKind::SetVariable, other] {
            assert!(is_narrated(&kind, true, Mode::Business), "{kind} should show when active");
            assert!(!is_narrated(&kind, false, Mode::Business), "{kind} should hide when inactive");
        }
        assert!(is_narrated(&StepKind::Decision, false, Mode::Business));
    }

    #[test]
    fn test_set_variable_rules_and_output() {
        let step = StepRecord::new("1", "SetVariable").with_params(json!({
            "VariableName": "Tier",
            "VariableValue": "IIF(Spend > 1000, 'Gold', 'Standard')",
        }));
        let descriptor = describe(&step, Mode::Technical);
        let rules = descriptor.rules.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].outcome, "'Gold'");
        assert_eq!(descriptor.output, Some(StepOutput::new(OutputKind::Var, "Tier")));
    }

    #[test]
    fn test_narration_replaces_business_context_only() {
        let step = StepRecord::new("1", "CopyTable")
            .with_narration("Keep a backup of orders.")
            .with_params(json!({ "SourceTable": "Orders", "TargetTable": "OrdersBak" }));
        let business = describe(&step, Mode::Business);
        let technical = describe(&step, Mode::Technical);
        assert_eq!(business.context, "Keep a backup of orders.");
        assert_ne!(technical.context, business.context);
        assert!(technical.details.contains(&"Narration: Keep a backup of orders.".to_string()));
    }

    #[test]
    fn test_unknown_kind_gets_generic_descriptor() {
        let step = StepRecord::new("1", "VendorMagic").with_params(json!({ "Knob": 3 }));
        let descriptor = describe(&step, Mode::Technical);
        assert!(descriptor.context.contains("VendorMagic"));
        assert_eq!(descriptor.flow_label, "VendorMagic");
        assert!(descriptor.output.is_none());
    }
}
