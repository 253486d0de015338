use super::DescribeContext;
use super::fields::{StepFields, cc_recipients, preview};
use super::sentences::decision_condition;
use crate::params::{Params, scalar_text};
use crate::process::{StepKind, StepRecord};
use itertools::Itertools;

/// Raw parameters listed for unknown kinds in technical mode.
const GENERIC_PARAM_LIMIT: usize = 8;

/// Type-specific bullet facts for one step.
pub(super) fn details(
    kind: &StepKind,
    f: &StepFields,
    step: &StepRecord,
    ctx: &DescribeContext<'_>,
) -> Vec<String> {
    let business = ctx.is_business();
    let budget = ctx.preview_budget;
    let p = step.params();
    let mut out = Vec::new();

    match kind {
        StepKind::Query | StepKind::ExecuteSql => {
            if let Some(table) = f.output_table() {
                out.push(format!("Target table: {}", table));
            }
            if !business {
                if let Some(sql) = f.sql.as_deref() {
                    out.push(format!("SQL: {}", preview(sql, budget)));
                }
            }
            push_criteria(&mut out, f, "Where");
        }
        StepKind::CalculatedColumn => {
            if !f.column_names.is_empty() {
                out.push(format!("Columns: {}", f.column_names.join(", ")));
            }
        }
        StepKind::SetVariable | StepKind::DeclareVariable | StepKind::SetVariableFromQuery => {
            if let Some(variable) = f.variable.as_deref() {
                out.push(format!("Variable: {}", variable));
                if let Some(entry) = ctx.registry.variable(variable) {
                    let others = entry
                        .used_by
                        .iter()
                        .filter(|used| **used != step.display_name())
                        .join(", ");
                    if !others.is_empty() {
                        out.push(format!("Used by: {}", others));
                    }
                }
            }
            if *kind == StepKind::SetVariableFromQuery {
                if let (false, Some(sql)) = (business, f.sql.as_deref()) {
                    out.push(format!("SQL: {}", preview(sql, budget)));
                }
            } else if let (false, Some(value)) = (business, f.value.as_deref()) {
                out.push(format!("Value: {}", preview(value, budget)));
            }
            for item in p.list("Variables") {
                let item = Params::new(item);
                if let Some(name) = item.first_name(&["Name", "VariableName"]) {
                    match item.first_text(&["Value", "DefaultValue", "VariableValue"]) {
                        Some(value) => out.push(format!("Declares: {} = {}", name, value)),
                        None => out.push(format!("Declares: {}", name)),
                    }
                }
            }
        }
        StepKind::Loop => {
            out.push(format!("Loop: {}", f.loop_condition));
            if let Some(iterator) = f.iterator.as_deref() {
                out.push(format!("Iterator: {}", iterator));
            }
            if let Some(max) = p.text("MaxIterations") {
                out.push(format!("Maximum iterations: {}", max));
            }
        }
        StepKind::Group => {}
        StepKind::Decision | StepKind::Branch => {
            if f.criteria.is_empty() {
                if let Some(condition) = decision_condition(f, step) {
                    out.push(format!("Condition: {}", preview(&condition, budget)));
                }
            } else {
                push_criteria(&mut out, f, "Condition");
            }
        }
        StepKind::CreateTable | StepKind::DeleteTable | StepKind::PurgeTable => {
            if let Some(table) = f.output_table() {
                out.push(format!("Table: {}", table));
            }
        }
        StepKind::CopyTable | StepKind::AppendTable => {
            if let Some(source) = f.input_table() {
                out.push(format!("Source: {}", source));
            }
            if let Some(target) = f.target.as_deref() {
                out.push(format!("Target: {}", target));
            }
            push_criteria(&mut out, f, "Where");
        }
        StepKind::JoinTables => {
            let join = f.join_type.as_deref().unwrap_or("INNER");
            if business {
                out.push(format!("Keeps: {}", join_semantics(join)));
            } else {
                out.push(format!("Join type: {}", join));
            }
            for key in p.list("JoinColumns") {
                let key = Params::new(key);
                if let (Some(left), Some(right)) =
                    (key.text("LeftColumn"), key.text("RightColumn"))
                {
                    out.push(format!("Match on: {} = {}", left, right));
                }
            }
        }
        StepKind::FilterTable => push_criteria(&mut out, f, "Keep rows where"),
        StepKind::SortTable => {
            let keys = sort_keys(&p, business);
            if !keys.is_empty() {
                out.push(format!("Sort order: {}", keys.join(", ")));
            }
        }
        StepKind::AggregateTable => {
            let groups = p.text_list("GroupBy");
            if !groups.is_empty() {
                out.push(format!("Group by: {}", groups.join(", ")));
            }
            for aggregate in p.list("Aggregates") {
                let a = Params::new(aggregate);
                let function = a.text("Function").unwrap_or_else(|| "COUNT".to_string());
                let column = a.text("Column").unwrap_or_else(|| "*".to_string());
                let text = match (business, a.text("Alias")) {
                    (true, Some(alias)) => {
                        format!("{}: {} of {}", alias, function.to_lowercase(), column)
                    }
                    (true, None) => format!("{} of {}", function.to_lowercase(), column),
                    (false, Some(alias)) => format!("{}({}) AS {}", function.to_uppercase(), column, alias),
                    (false, None) => format!("{}({})", function.to_uppercase(), column),
                };
                out.push(format!("Aggregate: {}", text));
            }
        }
        StepKind::DeduplicateTable => {
            let keys = p.text_list("KeyColumns");
            if !keys.is_empty() {
                out.push(format!("Key columns: {}", keys.join(", ")));
            }
        }
        StepKind::RenameColumns => {
            for rename in p.list("Renames") {
                let r = Params::new(rename);
                if let (Some(from), Some(to)) = (r.text("From"), r.text("To")) {
                    out.push(format!("Rename: {} → {}", from, to));
                }
            }
        }
        StepKind::ImportFile | StepKind::ExportFile => {
            if let Some(file) = f.file.as_deref() {
                out.push(format!("File: {}", file));
            }
            if !business {
                if let Some(delimiter) = p.text("Delimiter") {
                    out.push(format!("Delimiter: {:?}", delimiter));
                }
                if let Some(header) = p.flag("HasHeader") {
                    out.push(format!("Header row: {}", if header { "yes" } else { "no" }));
                }
                if let Some(encoding) = p.text("Encoding") {
                    out.push(format!("Encoding: {}", encoding));
                }
            }
        }
        StepKind::WarehouseImport => {
            if let Some(warehouse) = f.warehouse.as_deref() {
                out.push(format!("Warehouse: {}", warehouse));
            }
            if let Some((label, code)) = &f.import_mode {
                if business || label == code {
                    out.push(format!("Import mode: {}", label));
                } else {
                    out.push(format!("Import mode: {} (code {})", label, code));
                }
            }
            let mapped = p.list("Mappings").len();
            if mapped > 0 {
                out.push(format!("Mapped columns: {}", mapped));
            }
        }
        StepKind::SendEmail => {
            if !f.recipients.is_empty() {
                out.push(format!("To: {}", f.recipients.join(", ")));
            }
            let cc = cc_recipients(&p);
            if !cc.is_empty() {
                out.push(format!("Cc: {}", cc.join(", ")));
            }
            if let Some(subject) = f.subject.as_deref() {
                out.push(format!("Subject: {}", subject));
            }
            for attachment in p.text_list("Attachment") {
                out.push(format!("Attachment: {}", attachment));
            }
            if let (false, Some(body)) = (business, p.text("Body")) {
                out.push(format!("Body: {}", preview(&body, budget)));
            }
        }
        StepKind::RunScript => {
            if let Some(language) = f.language.as_deref() {
                out.push(format!("Language: {}", language));
            }
            if let (false, Some(script)) = (business, f.script.as_deref()) {
                out.push(format!("Script: {}", preview(script, budget)));
            }
        }
        StepKind::RunProcess => {
            if let Some(process) = f.process.as_deref() {
                out.push(format!("Process: {}", process));
            }
            if !business {
                if let Some(command) = p.text("Command") {
                    out.push(format!("Command: {}", preview(&command, budget)));
                }
                if let Some(arguments) = p.text("Arguments") {
                    out.push(format!("Arguments: {}", arguments));
                }
            }
        }
        StepKind::Wait => {}
        StepKind::LogMessage => {
            if let Some(level) = p.text("Level") {
                out.push(format!("Level: {}", level));
            }
        }
        StepKind::TransferFile => {
            if let Some(file) = f.file.as_deref() {
                out.push(format!("File: {}", file));
            }
            for key in ["Protocol", "Host", "RemotePath", "Direction"] {
                if let Some(value) = p.text(key) {
                    out.push(format!("{}: {}", split_camel(key), value));
                }
            }
        }
        StepKind::DeleteFile => {
            if let Some(file) = f.file.as_deref() {
                out.push(format!("File: {}", file));
            }
        }
        StepKind::Stop => {
            if let Some(code) = p.text("ExitCode") {
                out.push(format!("Exit code: {}", code));
            }
        }
        StepKind::Other(tag) => {
            if !business {
                out.push(format!("Step type: {}", tag));
                out.extend(generic_params(&p));
            }
        }
    }
    out
}

fn push_criteria(out: &mut Vec<String>, f: &StepFields, label: &str) {
    out.extend(f.criteria.iter().map(|c| format!("{}: {}", label, c)));
}

/// Sort columns with their direction, `Name ascending` or `Name DESC`.
pub(super) fn sort_keys(p: &Params<'_>, business: bool) -> Vec<String> {
    p.list("SortColumns")
        .into_iter()
        .filter_map(|item| {
            if let Some(column) = scalar_text(item) {
                return Some(column);
            }
            let item = Params::new(item);
            let column = item.first_text(&["Column", "ColumnName", "Name"])?;
            let descending = item
                .text("Direction")
                .is_some_and(|d| d.to_ascii_lowercase().starts_with("desc"));
            Some(match (business, descending) {
                (true, true) => format!("{} descending", column),
                (true, false) => format!("{} ascending", column),
                (false, true) => format!("{} DESC", column),
                (false, false) => format!("{} ASC", column),
            })
        })
        .filter(|key| !key.is_empty())
        .collect()
}

fn join_semantics(join: &str) -> &'static str {
    match join {
        "LEFT" | "LEFT OUTER" => "every row of the first table, with matches from the second",
        "RIGHT" | "RIGHT OUTER" => "every row of the second table, with matches from the first",
        "FULL" | "FULL OUTER" | "OUTER" => "every row of both tables",
        "CROSS" => "every combination of rows",
        _ => "only rows that match in both tables",
    }
}

/// `RemotePath` -> `Remote path`.
fn split_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn generic_params(p: &Params<'_>) -> Vec<String> {
    let Some(map) = p.value().as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(key, value)| scalar_text(value).map(|text| (key, text)))
        .filter(|(_, text)| !text.is_empty())
        .take(GENERIC_PARAM_LIMIT)
        .map(|(key, text)| format!("{}: {}", key, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Mode;
    use crate::registry::{Registry, build_registry};
    use serde_json::json;

    fn details_for(step: &StepRecord, registry: &Registry, mode: Mode) -> Vec<String> {
        let ctx = DescribeContext::new(mode, registry).with_preview_budget(20);
        let fields = StepFields::resolve(step);
        details(&StepKind::from_tag(&step.step_type), &fields, step, &ctx)
    }

    #[test]
    fn test_sql_preview_is_technical_only_and_truncated() {
        let step = StepRecord::new("1", "Query").with_params(json!({
            "Sql": "SELECT OrderId, CustomerId, Amount FROM Orders",
            "TargetTable": "Recent",
        }));
        let registry = Registry::default();
        let technical = details_for(&step, &registry, Mode::Technical);
        assert_eq!(technical, vec!["Target table: Recent", "SQL: SELECT OrderId, Cust..."]);
        let business = details_for(&step, &registry, Mode::Business);
        assert_eq!(business, vec!["Target table: Recent"]);
    }

    #[test]
    fn test_warehouse_import_mode_label() {
        let step = StepRecord::new("1", "WarehouseImport").with_params(json!({
            "WarehouseName": "Sales",
            "ImportMode": 3,
            "Mappings": [{ "SourceColumn": "a", "TargetColumn": "A" }],
        }));
        let registry = Registry::default();
        assert_eq!(
            details_for(&step, &registry, Mode::Technical),
            vec![
                "Warehouse: Sales",
                "Import mode: Insert or update (code 3)",
                "Mapped columns: 1",
            ]
        );
    }

    #[test]
    fn test_variable_details_list_other_users() {
        let steps = vec![
            StepRecord::new("1", "SetVariable")
                .with_name("Init")
                .with_params(json!({ "VariableName": "Limit", "VariableValue": "10" })),
            StepRecord::new("2", "FilterTable")
                .with_name("Filter big")
                .with_params(json!({ "Condition": "Amount > Limit" })),
        ];
        let mut registry = build_registry(&steps);
        crate::registry::index_usage(&mut registry, &steps, Default::default());
        let details = details_for(&steps[0], &registry, Mode::Technical);
        assert_eq!(details, vec!["Variable: Limit", "Used by: Filter big", "Value: 10"]);
    }

    #[test]
    fn test_sort_and_join_details_by_mode() {
        let step = StepRecord::new("1", "SortTable").with_params(json!({
            "SortColumns": [
                { "Column": "Region" },
                { "Column": "Amount", "Direction": "Descending" }
            ]
        }));
        let registry = Registry::default();
        assert_eq!(
            details_for(&step, &registry, Mode::Business),
            vec!["Sort order: Region ascending, Amount descending"]
        );
        let join = StepRecord::new("2", "Join").with_params(json!({
            "JoinType": "left",
            "JoinColumns": { "LeftColumn": "CustId", "RightColumn": "Id" },
        }));
        assert_eq!(
            details_for(&join, &registry, Mode::Technical),
            vec!["Join type: LEFT", "Match on: CustId = Id"]
        );
    }

    #[test]
    fn test_email_recipients_and_cc() {
        let step = StepRecord::new("1", "SendEmail").with_params(json!({
            "To": "ops@x.io;lead@x.io",
            "Cc": "audit@x.io",
            "Subject": "Nightly load done",
        }));
        let registry = Registry::default();
        assert_eq!(
            details_for(&step, &registry, Mode::Business),
            vec!["To: ops@x.io, lead@x.io", "Cc: audit@x.io", "Subject: Nightly load done"]
        );
    }

    #[test]
    fn test_split_camel() {
        assert_eq!(split_camel("RemotePath"), "Remote path");
        assert_eq!(split_camel("Host"), "Host");
    }
}
