use super::definition::ProcessDefinition;
use crate::error::ConversionError;

/// A trait for custom export models that can be converted into a `ProcessDefinition`.
///
/// This is the extension point for feeding exports that were decoded into
/// your own structs rather than through [`super::StepContainer`].
///
/// # Example
///
/// ```rust,no_run
/// use kaidoku::prelude::*;
/// use kaidoku::error::ConversionError;
///
/// struct MyTask { key: u32, owner: Option<u32>, kind: String }
/// struct MyExport { tasks: Vec<MyTask> }
///
/// impl IntoProcess for MyExport {
///     fn into_process(self) -> std::result::Result<ProcessDefinition, ConversionError> {
///         let steps = self
///             .tasks
///             .into_iter()
///             .map(|task| {
///                 let step = StepRecord::new(task.key.to_string(), task.kind);
///                 match task.owner {
///                     Some(owner) => step.with_parent(owner.to_string()),
///                     None => step,
///                 }
///             })
///             .collect();
///         Ok(ProcessDefinition::new(steps))
///     }
/// }
/// ```
pub trait IntoProcess {
    /// Consumes the object and converts it into a process definition.
    fn into_process(self) -> Result<ProcessDefinition, ConversionError>;
}

impl IntoProcess for ProcessDefinition {
    fn into_process(self) -> Result<ProcessDefinition, ConversionError> {
        Ok(self)
    }
}
