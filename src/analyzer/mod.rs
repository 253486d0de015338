//! Orchestration: forest, registry and usage passes, then a depth-first walk
//! that describes every emitted step.

mod model;

pub use model::{ExecutionModel, ExecutionNode, NodeId};

use crate::describe::{
    DEFAULT_PREVIEW_BUDGET, DescribeContext, StepDescriber, describe_step, is_narrated,
};
use crate::error::ProcessError;
use crate::forest::{StepForest, StepIndex, build_forest};
use crate::process::kind::normalize_tag;
use crate::process::{IntoProcess, Mode, ProcessDefinition, StepKind, StepRecord};
use crate::registry::{Registry, UsageMatching, index_usage, register_step};
use ahash::AHashMap;
use tracing::{debug, warn};

pub struct Analyzer {
    definition: ProcessDefinition,
    mode: Mode,
    matching: UsageMatching,
    preview_budget: usize,
    type_mappings: AHashMap<String, StepKind>,
    describers: AHashMap<String, Box<dyn StepDescriber>>,
}

pub struct AnalyzerBuilder {
    definition: ProcessDefinition,
    mode: Mode,
    matching: UsageMatching,
    preview_budget: usize,
    type_mappings: AHashMap<String, StepKind>,
    describers: AHashMap<String, Box<dyn StepDescriber>>,
}

impl AnalyzerBuilder {
    pub fn new(definition: ProcessDefinition) -> Self {
        Self {
            definition,
            mode: Mode::default(),
            matching: UsageMatching::default(),
            preview_budget: DEFAULT_PREVIEW_BUDGET,
            type_mappings: AHashMap::new(),
            describers: AHashMap::new(),
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn usage_matching(mut self, matching: UsageMatching) -> Self {
        self.matching = matching;
        self
    }

    /// Character budget for SQL, script and body previews in technical output.
    pub fn preview_budget(mut self, budget: usize) -> Self {
        self.preview_budget = budget;
        self
    }

    /// Treats a vendor type tag as one of the known kinds. Mappings onto an
    /// unknown kind are ignored.
    pub fn with_type_mapping(mut self, vendor_tag: &str, known_tag: &str) -> Self {
        match StepKind::from_tag(known_tag) {
            StepKind::Other(_) => {
                warn!(vendor_tag, known_tag, "type mapping target is not a known step kind");
            }
            kind => {
                self.type_mappings.insert(normalize_tag(vendor_tag), kind);
            }
        }
        self
    }

    pub fn with_custom_describer(mut self, describer: Box<dyn StepDescriber>) -> Self {
        self.describers
            .insert(normalize_tag(describer.step_type()), describer);
        self
    }

    pub fn build(self) -> Analyzer {
        Analyzer {
            definition: self.definition,
            mode: self.mode,
            matching: self.matching,
            preview_budget: self.preview_budget,
            type_mappings: self.type_mappings,
            describers: self.describers,
        }
    }
}

impl Analyzer {
    pub fn builder(definition: ProcessDefinition) -> AnalyzerBuilder {
        AnalyzerBuilder::new(definition)
    }

    /// Resolves a step's kind, honoring vendor type mappings.
    pub fn kind_of(&self, step: &StepRecord) -> StepKind {
        self.type_mappings
            .get(&normalize_tag(&step.step_type))
            .cloned()
            .unwrap_or_else(|| StepKind::from_tag(&step.step_type))
    }

    /// Runs every pass and returns the execution model. Each call starts from
    /// fresh state, so repeated calls yield equal models.
    pub fn analyze(&self) -> Result<ExecutionModel, ProcessError> {
        let steps = self.definition.steps.as_slice();
        let forest = build_forest(steps)?;

        let mut registry = Registry::default();
        for step in steps {
            register_step(&mut registry, step, &self.kind_of(step));
        }
        index_usage(&mut registry, steps, self.matching);

        let ctx = DescribeContext::new(self.mode, &registry).with_preview_budget(self.preview_budget);
        let (nodes, roots) = self.emit(&forest, &ctx);

        debug!(
            mode = %self.mode,
            steps = steps.len(),
            nodes = nodes.len(),
            roots = roots.len(),
            "process analyzed"
        );
        Ok(ExecutionModel {
            mode: self.mode,
            nodes,
            roots,
            registry,
        })
    }

    /// Emits every narrated step in pre-order. A step left out by the mode
    /// filter takes its whole subtree with it.
    fn emit(
        &self,
        forest: &StepForest<'_>,
        ctx: &DescribeContext<'_>,
    ) -> (Vec<ExecutionNode>, Vec<NodeId>) {
        let mut nodes: Vec<ExecutionNode> = Vec::with_capacity(forest.len());
        let mut roots = Vec::new();
        let mut stack: Vec<(StepIndex, usize, Option<NodeId>)> = forest
            .roots()
            .iter()
            .rev()
            .map(|&root| (root, 0, None))
            .collect();

        while let Some((index, depth, parent)) = stack.pop() {
            let step = forest.step(index);
            let kind = self.kind_of(step);
            let active = step.active || kind.is_forced_active();
            if !is_narrated(&kind, active, self.mode) {
                continue;
            }

            let descriptor = match self.describers.get(&normalize_tag(&step.step_type)) {
                Some(describer) => describer.describe(step, ctx),
                None => describe_step(step, &kind, ctx),
            };
            let id = nodes.len();
            nodes.push(ExecutionNode::new(step, kind, active, depth, descriptor));
            match parent {
                Some(parent) => nodes[parent].children.push(id),
                None => roots.push(id),
            }

            stack.extend(
                forest
                    .children(index)
                    .iter()
                    .rev()
                    .map(|&child| (child, depth + 1, Some(id))),
            );
        }
        (nodes, roots)
    }
}

/// Analyzes a definition with default settings for the given mode.
pub fn analyze(definition: impl IntoProcess, mode: Mode) -> Result<ExecutionModel, ProcessError> {
    Analyzer::builder(definition.into_process()?)
        .mode(mode)
        .build()
        .analyze()
}
