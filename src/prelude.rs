//! Prelude module for convenient imports
//!
//! Re-exports the types needed to load a process export, analyze it, and
//! read the resulting model.
//!
//! # Example
//!
//! ```rust,no_run
//! use kaidoku::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/process.json")?;
//! let definition = ProcessDefinition::from_json(&json)?;
//!
//! let model = analyze(definition, Mode::Technical)?;
//! for node in model.execution_flow() {
//!     println!("{}{}", "  ".repeat(node.depth), node.flow_label);
//! }
//! # Ok(())
//! # }
//! ```

// Analysis
pub use crate::analyzer::{Analyzer, AnalyzerBuilder, ExecutionModel, ExecutionNode, NodeId, analyze};
pub use crate::describe::{
    Cell, DescribeContext, Descriptor, OutputKind, Projection, StepDescriber, StepOutput,
};

// Input model
pub use crate::process::{IntoProcess, Mode, ProcessDefinition, StepKind, StepRecord};

// Building blocks
pub use crate::criteria::flatten_criteria;
pub use crate::expression::{Rule, flatten};
pub use crate::params::Params;
pub use crate::registry::{Registry, UsageMatching, VariableEntry};

// Error types
pub use crate::error::{ConversionError, ProcessError};

// Rendering
pub use crate::narrate::{OutlineFormatter, rules_to_prose};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
