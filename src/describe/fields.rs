use crate::criteria::flatten_criteria;
use crate::params::{Params, scalar_text};
use crate::process::StepRecord;
use crate::registry::{FILE_KEYS, ITERATOR_KEYS, OUTPUT_KEYS, VARIABLE_NAME_KEYS, loop_condition};
use itertools::Itertools;

pub(super) const SQL_KEYS: &[&str] = &["Sql", "Query", "SqlText", "Statement"];
pub(super) const SCRIPT_KEYS: &[&str] = &["Script", "ScriptText", "Code"];
pub(super) const FORMULA_KEYS: &[&str] = &["Expression", "Formula", "Calculation"];

/// Human labels for warehouse import mode codes.
const IMPORT_MODES: &[(&str, &str)] = &[
    ("0", "Append"),
    ("1", "Replace"),
    ("2", "Update existing rows"),
    ("3", "Insert or update"),
    ("4", "Delete matching rows"),
];

/// Field values resolved once per step and shared by every descriptor part.
#[derive(Debug, Clone, Default)]
pub(super) struct StepFields {
    pub table: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub left: Option<String>,
    pub right: Option<String>,
    pub lookup: Option<String>,
    pub file: Option<String>,
    pub sql: Option<String>,
    pub script: Option<String>,
    pub language: Option<String>,
    pub variable: Option<String>,
    pub value: Option<String>,
    pub iterator: Option<String>,
    pub loop_condition: String,
    pub warehouse: Option<String>,
    pub import_mode: Option<(String, String)>,
    pub output_name: Option<String>,
    pub subject: Option<String>,
    pub recipients: Vec<String>,
    pub process: Option<String>,
    pub join_type: Option<String>,
    pub criteria: Vec<String>,
    pub column_names: Vec<String>,
}

impl StepFields {
    pub(super) fn resolve(step: &StepRecord) -> Self {
        let p = step.params();
        Self {
            table: p.name("TableName"),
            source: p.first_name(&["SourceTable", "InputTable"]),
            target: p.first_name(&["TargetTable", "OutputTable", "DestinationTable"]),
            left: p.name("LeftTable"),
            right: p.name("RightTable"),
            lookup: p.name("LookupTable"),
            file: p.first_name(FILE_KEYS),
            sql: p.first_text(SQL_KEYS),
            script: p.first_text(SCRIPT_KEYS),
            language: p.first_text(&["Language", "ScriptLanguage"]),
            variable: p.first_name(VARIABLE_NAME_KEYS),
            value: p.first_text(&["VariableValue", "Expression", "Value"]),
            iterator: p.first_name(ITERATOR_KEYS),
            loop_condition: loop_condition(&p),
            warehouse: p.first_name(&["WarehouseName", "Warehouse"]),
            import_mode: p.text("ImportMode").map(|code| import_mode_label(&code)),
            output_name: p.first_name(OUTPUT_KEYS),
            subject: p.text("Subject"),
            recipients: recipients(&p, "To"),
            process: p.first_name(&["ProcessName", "Process", "JobName"]),
            join_type: p.text("JoinType").map(|t| t.to_ascii_uppercase()),
            criteria: flatten_criteria(&p),
            column_names: column_names(&p),
        }
    }

    /// The table a step reads: an explicit source, else the generic table name.
    pub(super) fn input_table(&self) -> Option<&str> {
        self.source.as_deref().or(self.table.as_deref())
    }

    /// The table a step writes: an explicit target, else the generic table name.
    pub(super) fn output_table(&self) -> Option<&str> {
        self.target.as_deref().or(self.table.as_deref())
    }

    /// For in-place operations the result lands in the input table.
    pub(super) fn result_table(&self) -> Option<&str> {
        self.target.as_deref().or(self.input_table())
    }

    pub(super) fn file_name(&self) -> Option<&str> {
        self.file
            .as_deref()
            .and_then(|path| path.rsplit(['/', '\\']).next())
    }

    pub(super) fn condition_text(&self) -> Option<String> {
        if self.criteria.is_empty() {
            None
        } else {
            Some(self.criteria.join(" and "))
        }
    }
}

/// `(label, code)` for an import mode; textual modes are their own label.
pub(super) fn import_mode_label(code: &str) -> (String, String) {
    let code = code.trim();
    let label = IMPORT_MODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| code.to_string());
    (label, code.to_string())
}

/// Email address lists come as a list, or as one `;`/`,` separated string.
fn recipients(params: &Params<'_>, key: &str) -> Vec<String> {
    params
        .text_list(key)
        .iter()
        .flat_map(|s| s.split([';', ',']))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unique()
        .collect()
}

pub(super) fn cc_recipients(params: &Params<'_>) -> Vec<String> {
    recipients(params, "Cc")
}

fn column_names(params: &Params<'_>) -> Vec<String> {
    params
        .list("Columns")
        .into_iter()
        .filter_map(|column| match scalar_text(column) {
            Some(name) => Some(name),
            None => Params::new(column).first_name(&["Name", "ColumnName", "TargetColumn"]),
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Collapses whitespace and cuts the text at `budget` characters.
pub(super) fn preview(text: &str, budget: usize) -> String {
    let collapsed = text.split_whitespace().join(" ");
    if collapsed.chars().count() <= budget {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(budget).collect();
        format!("{}...", cut.trim_end())
    }
}

/// `name` or a generic stand-in when a field is absent.
pub(super) fn or_unnamed<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("SELECT  *\n FROM   t", 50), "SELECT * FROM t");
        assert_eq!(preview("ééééé", 3), "ééé...");
    }

    #[test]
    fn test_import_mode_codes() {
        assert_eq!(import_mode_label("3").0, "Insert or update");
        assert_eq!(import_mode_label("Merge").0, "Merge");
    }

    #[test]
    fn test_recipients_split_and_dedupe() {
        let step = StepRecord::new("1", "SendEmail")
            .with_params(json!({ "To": ["a@x.io; b@x.io", "a@x.io"] }));
        let fields = StepFields::resolve(&step);
        assert_eq!(fields.recipients, vec!["a@x.io", "b@x.io"]);
    }

    #[test]
    fn test_column_names_from_singleton_and_strings() {
        let single = StepRecord::new("1", "CreateTable")
            .with_params(json!({ "Columns": { "Name": "Id", "DataType": "int" } }));
        let strings = StepRecord::new("2", "SortTable").with_params(json!({ "Columns": ["A", "B"] }));
        assert_eq!(StepFields::resolve(&single).column_names, vec!["Id"]);
        assert_eq!(StepFields::resolve(&strings).column_names, vec!["A", "B"]);
    }
}
