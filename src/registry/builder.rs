use super::Registry;
use crate::params::Params;
use crate::process::{StepKind, StepRecord};
use std::path::Path;
use tracing::debug;

/// Parameter-bag fields that name a table.
pub const TABLE_KEYS: &[&str] = &[
    "TableName",
    "SourceTable",
    "TargetTable",
    "LeftTable",
    "RightTable",
    "OutputTable",
    "DestinationTable",
    "LookupTable",
];

/// Parameter-bag fields naming an untyped output (a buffer, a result set).
pub const OUTPUT_KEYS: &[&str] = &["OutputName", "ResultName", "BufferName"];

pub(crate) const VARIABLE_NAME_KEYS: &[&str] = &["VariableName", "Variable", "TargetVariable"];
pub(crate) const VARIABLE_VALUE_KEYS: &[&str] =
    &["VariableValue", "Expression", "Value", "Sql", "Query"];
pub(crate) const ITERATOR_KEYS: &[&str] = &["IteratorVariable", "LoopVariable", "Iterator"];
pub(crate) const FILE_KEYS: &[&str] = &["FilePath", "FileName", "File", "Path"];

/// The condition a loop step iterates under, in one line:
/// `FOR i = 1 TO 10 [STEP 2]`, `FOR EACH ROW IN t`, or `WHILE cond`.
pub fn loop_condition(params: &Params<'_>) -> String {
    let iterator = params.first_name(ITERATOR_KEYS);
    if let (Some(start), Some(end)) = (params.text("StartValue"), params.text("EndValue")) {
        let mut text = format!(
            "FOR {} = {} TO {}",
            iterator.as_deref().unwrap_or("i"),
            start,
            end
        );
        if let Some(step) = params.text("StepValue") {
            text.push_str(&format!(" STEP {}", step));
        }
        return text;
    }
    if let Some(table) = params.first_name(&["LoopTable", "SourceTable", "TableName"]) {
        return format!("FOR EACH ROW IN {}", table);
    }
    if let Some(condition) = params.text("Condition") {
        return format!("WHILE {}", condition);
    }
    match params.text("MaxIterations") {
        Some(max) => format!("REPEAT {} TIMES", max),
        None => "LOOP".to_string(),
    }
}

/// Single forward pass over the flat step list collecting tables, variables,
/// iterators and untyped outputs. Missing or malformed fields are skipped.
pub fn build_registry(steps: &[StepRecord]) -> Registry {
    let mut registry = Registry::default();
    for step in steps {
        register_step(&mut registry, step, &StepKind::from_tag(&step.step_type));
    }
    debug!(
        variables = registry.variables.len(),
        tables = registry.tables.len(),
        iterators = registry.iterators.len(),
        outputs = registry.step_outputs.len(),
        "registry built"
    );
    registry
}

pub(crate) fn register_step(registry: &mut Registry, step: &StepRecord, kind: &StepKind) {
    let params = step.params();

    let mut has_table = false;
    for key in TABLE_KEYS {
        if let Some(table) = params.name(key) {
            has_table = true;
            registry.tables.insert(table);
        }
    }

    if kind.defines_variable() {
        if let Some(name) = params.first_name(VARIABLE_NAME_KEYS) {
            let value = params.first_text(VARIABLE_VALUE_KEYS).unwrap_or_default();
            registry.declare(name, value, step, false);
        }
        // Declaration steps may carry several variables at once.
        for item in params.list("Variables") {
            let item = Params::new(item);
            if let Some(name) = item.first_name(&["Name", "VariableName"]) {
                let value = item
                    .first_text(&["Value", "DefaultValue", "VariableValue"])
                    .unwrap_or_default();
                registry.declare(name, value, step, false);
            }
        }
    }

    if *kind == StepKind::Loop {
        if let Some(name) = params.first_name(ITERATOR_KEYS) {
            registry.iterators.insert(name.clone());
            registry.declare(name, loop_condition(&params), step, true);
        }
    }

    let mut has_output = false;
    for key in OUTPUT_KEYS {
        if let Some(output) = params.name(key) {
            has_output = true;
            registry.step_outputs.insert(output);
        }
    }

    // File loads without a typed table produce an implicit buffer named after the file.
    if *kind == StepKind::ImportFile && !has_table && !has_output {
        if let Some(stem) = params
            .first_name(FILE_KEYS)
            .as_deref()
            .and_then(file_stem)
        {
            registry.step_outputs.insert(stem);
        }
    }
}

pub(crate) fn file_stem(path: &str) -> Option<String> {
    // Exports come from Windows hosts; treat both separators alike.
    let last = path.rsplit(['/', '\\']).next()?;
    Path::new(last)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_variable_registers_entry() {
        let steps = vec![
            StepRecord::new("1", "SetVariable")
                .with_name("Init total")
                .with_params(json!({ "VariableName": "@Total", "VariableValue": "0" })),
        ];
        let registry = build_registry(&steps);
        let entry = registry.variable("@Total").unwrap();
        assert_eq!(entry.value, "0");
        assert_eq!(entry.declared_by, "Init total");
        assert!(!entry.is_iterator);
    }

    #[test]
    fn test_redeclaration_overwrites_value_and_keeps_position() {
        let steps = vec![
            StepRecord::new("1", "SetVariable")
                .with_params(json!({ "VariableName": "A", "VariableValue": "1" })),
            StepRecord::new("2", "SetVariable")
                .with_params(json!({ "VariableName": "B", "VariableValue": "2" })),
            StepRecord::new("3", "SetVariable")
                .with_name("Reset A")
                .with_params(json!({ "VariableName": "A", "VariableValue": "3" })),
        ];
        let registry = build_registry(&steps);
        let names: Vec<&String> = registry.variables.keys().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(registry.variables["A"].value, "3");
        assert_eq!(registry.variables["A"].declared_in, "3");
    }

    #[test]
    fn test_tables_skip_placeholders() {
        let steps = vec![
            StepRecord::new("1", "JoinTables").with_params(json!({
                "LeftTable": "Orders",
                "RightTable": "Customers",
                "TargetTable": "N/A",
            })),
            StepRecord::new("2", "CopyTable")
                .with_params(json!({ "SourceTable": "Orders", "TargetTable": "(none)" })),
        ];
        let registry = build_registry(&steps);
        let tables: Vec<&String> = registry.tables.iter().collect();
        assert_eq!(tables, vec!["Orders", "Customers"]);
    }

    #[test]
    fn test_loop_registers_iterator_with_condition() {
        let steps = vec![StepRecord::new("1", "Loop").with_params(json!({
            "IteratorVariable": "i",
            "StartValue": 1,
            "EndValue": 12,
        }))];
        let registry = build_registry(&steps);
        assert!(registry.iterators.contains("i"));
        let entry = registry.variable("i").unwrap();
        assert!(entry.is_iterator);
        assert_eq!(entry.value, "FOR i = 1 TO 12");
    }

    #[test]
    fn test_file_import_without_table_yields_step_output() {
        let steps = vec![
            StepRecord::new("1", "ImportFile")
                .with_params(json!({ "FilePath": "C:\\drop\\daily_sales.csv" })),
            StepRecord::new("2", "RunScript").with_params(json!({ "OutputName": "scratch" })),
        ];
        let registry = build_registry(&steps);
        let outputs: Vec<&String> = registry.step_outputs.iter().collect();
        assert_eq!(outputs, vec!["daily_sales", "scratch"]);
    }
}
