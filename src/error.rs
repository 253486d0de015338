use thiserror::Error;

/// Errors that can occur while reconstructing an execution model.
///
/// Malformed fields inside a step never produce an error; they degrade to
/// empty values. Only structural problems with the input as a whole do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Failed to parse process definition JSON: {0}")]
    JsonParseError(String),

    #[error("Process definition has no step list (expected a 'Step' or 'Steps.Step' field)")]
    MissingStepList,

    #[error(
        "Parent references form a cycle; steps [{}] never reach a root",
        step_ids.join(", ")
    )]
    ParentCycle { step_ids: Vec<String> },

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Errors that can occur when converting a custom export format into a `ProcessDefinition`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}
