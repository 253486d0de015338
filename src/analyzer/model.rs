use crate::describe::{Descriptor, Projection, StepOutput};
use crate::expression::Rule;
use crate::process::{Mode, SEQUENCE_LAST, StepKind, StepRecord};
use crate::registry::{Registry, VariableEntry};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Position of a node in [`ExecutionModel::execution_flow`].
pub type NodeId = usize;

/// One annotated step of the execution model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionNode {
    pub id: String,
    pub kind: StepKind,
    /// The vendor type tag as exported.
    pub type_tag: String,
    pub name: String,
    /// Decision and branch steps are always active.
    pub active: bool,
    pub depth: usize,
    pub sequence: Option<String>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub output: Option<StepOutput>,
    pub context: String,
    pub flow_label: String,
    pub details: Vec<String>,
    pub projection: Option<Projection>,
    pub rules: Option<Vec<Rule>>,
    pub children: Vec<NodeId>,
}

impl ExecutionNode {
    pub(crate) fn new(
        step: &StepRecord,
        kind: StepKind,
        active: bool,
        depth: usize,
        descriptor: Descriptor,
    ) -> Self {
        Self {
            id: step.id.clone(),
            kind,
            type_tag: step.step_type.clone(),
            name: step.display_name(),
            active,
            depth,
            sequence: step.sequence.clone(),
            inputs: descriptor.inputs,
            outputs: descriptor.outputs,
            output: descriptor.output,
            context: descriptor.context,
            flow_label: descriptor.flow_label,
            details: descriptor.details,
            projection: descriptor.projection,
            rules: descriptor.rules,
            children: Vec::new(),
        }
    }

    /// Numeric sequence, with missing or non-numeric values sorting last.
    pub fn sequence_key(&self) -> f64 {
        self.sequence
            .as_deref()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .unwrap_or(SEQUENCE_LAST)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The analyzed process: nodes in depth-first order, the root ids, and the
/// registry gathered along the way. The tree and the flat list share the
/// same node values; tree edges are ids into the flat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionModel {
    pub(crate) mode: Mode,
    pub(crate) nodes: Vec<ExecutionNode>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) registry: Registry,
}

impl ExecutionModel {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Root node ids in sequence order.
    pub fn execution_tree(&self) -> &[NodeId] {
        &self.roots
    }

    /// Every emitted node in depth-first, sequence-ordered traversal.
    pub fn execution_flow(&self) -> &[ExecutionNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&ExecutionNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &ExecutionNode> {
        self.roots.iter().filter_map(|&id| self.nodes.get(id))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ExecutionNode> {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&child| self.nodes.get(child))
    }

    /// First node emitted for a step id.
    pub fn find(&self, step_id: &str) -> Option<&ExecutionNode> {
        self.nodes.iter().find(|node| node.id == step_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableEntry> {
        self.registry.variables.values()
    }

    pub fn variable_set(&self) -> impl Iterator<Item = &str> {
        self.registry.variables.keys().map(String::as_str)
    }

    pub fn table_set(&self) -> &IndexSet<String> {
        &self.registry.tables
    }

    pub fn iterator_set(&self) -> &IndexSet<String> {
        &self.registry.iterators
    }

    pub fn step_output_set(&self) -> &IndexSet<String> {
        &self.registry.step_outputs
    }
}
