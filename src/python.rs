use crate::analyzer::{Analyzer, ExecutionModel};
use crate::narrate::OutlineFormatter;
use crate::process::{Mode, ProcessDefinition};
use crate::registry::UsageMatching;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

/// An analyzed process definition.
///
/// The export is parsed and analyzed once on construction; the accessors
/// render the resulting execution model.
#[pyclass(name = "Kaidoku")]
struct KaidokuPy {
    model: ExecutionModel,
}

#[pymethods]
impl KaidokuPy {
    /// Parses and analyzes a process export.
    ///
    /// Args:
    ///     process_json (str): The JSON form of the export, with a `Steps.Step`
    ///         or `Step` list.
    ///     mode (str, optional): "business" or "technical" (default).
    ///     whole_word (bool, optional): Match variable usage on whole words
    ///         instead of substrings.
    ///
    /// Raises:
    ///     ValueError: If the JSON is malformed, has no step list, the mode
    ///         is unknown, or parent references form a cycle.
    #[new]
    #[pyo3(signature = (process_json, mode = None, whole_word = false))]
    fn new(process_json: &str, mode: Option<&str>, whole_word: bool) -> PyResult<Self> {
        let mode: Mode = mode.unwrap_or_default().parse().map_err(PyValueError::new_err)?;
        let definition = ProcessDefinition::from_json(process_json)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        let matching = if whole_word {
            UsageMatching::WholeWord
        } else {
            UsageMatching::Substring
        };

        let model = Analyzer::builder(definition)
            .mode(mode)
            .usage_matching(matching)
            .build()
            .analyze()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(KaidokuPy { model })
    }

    /// The full execution model serialized as JSON.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.model).map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// The execution model as an indented plain-text outline.
    fn outline(&self) -> String {
        OutlineFormatter::format(&self.model)
    }

    /// Flow labels of every node in depth-first order.
    fn flow_labels(&self) -> Vec<String> {
        self.model
            .execution_flow()
            .iter()
            .map(|node| node.flow_label.clone())
            .collect()
    }

    fn __len__(&self) -> usize {
        self.model.len()
    }
}

/// Python bindings for analyzing ETL process definitions.
#[pymodule]
fn kaidoku(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<KaidokuPy>()?;
    Ok(())
}
