//! # Kaidoku - Process Definition Analyzer
//!
//! **Kaidoku** reads the step list of an ETL-style process export and turns it
//! into an execution model a person can read: a sequence-ordered step tree,
//! a catalog of variables and tables with usage tracking, decision tables
//! flattened out of nested `IIF(...)` and `CASE ... END` expressions, and a
//! business or technical description of every step.
//!
//! ## Core Workflow
//!
//! 1.  **Load the export**: parse the JSON form with [`ProcessDefinition::from_json`],
//!     or implement [`IntoProcess`] for structs you decoded yourself.
//! 2.  **Configure**: use [`Analyzer::builder`] to pick the mode, the usage
//!     matching policy, vendor tag mappings and custom describers.
//! 3.  **Analyze**: [`Analyzer::analyze`] builds the forest, the registry and
//!     the described nodes in one synchronous call.
//! 4.  **Render**: hand the [`ExecutionModel`] to your renderer, or print it
//!     with [`OutlineFormatter`].
//!
//! ## Quick Start
//!
//! ```rust
//! use kaidoku::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let json = r#"{
//!         "Steps": { "Step": [
//!             { "Id": 2, "ParentId": 1, "StepType": "SetVariable", "Sequence": 1,
//!               "Name": "Pick tier",
//!               "StorageObject": {
//!                 "VariableName": "Tier",
//!                 "VariableValue": "IIF(Spend > 1000, 'Gold', 'Standard')"
//!               } },
//!             { "Id": 1, "ParentId": 0, "StepType": "Group", "Sequence": 1, "Name": "Pricing" }
//!         ] }
//!     }"#;
//!
//!     let definition = ProcessDefinition::from_json(json)?;
//!     let model = Analyzer::builder(definition).mode(Mode::Business).build().analyze()?;
//!
//!     let group = model.roots().next().unwrap();
//!     let step = model.children(0).next().unwrap();
//!     assert_eq!(group.name, "Pricing");
//!     assert_eq!(step.rules.as_ref().unwrap().len(), 2);
//!     assert!(model.variable_set().any(|name| name == "Tier"));
//!
//!     println!("{}", OutlineFormatter::format(&model));
//!     Ok(())
//! }
//! ```
//!
//! [`ProcessDefinition::from_json`]: process::ProcessDefinition::from_json
//! [`IntoProcess`]: process::IntoProcess
//! [`Analyzer::builder`]: analyzer::Analyzer::builder
//! [`Analyzer::analyze`]: analyzer::Analyzer::analyze
//! [`ExecutionModel`]: analyzer::ExecutionModel
//! [`OutlineFormatter`]: narrate::OutlineFormatter

pub mod analyzer;
pub mod criteria;
pub mod describe;
pub mod error;
pub mod expression;
pub mod forest;
pub mod narrate;
pub mod params;
pub mod prelude;
pub mod process;
pub mod registry;

#[cfg(feature = "python-bindings")]
mod python;
