use super::fields::StepFields;
use super::sentences::import_destination;
use super::{DescribeContext, OutputKind, StepOutput};
use crate::process::{StepKind, StepRecord};
use indexmap::IndexSet;

/// Ordered, deduplicated input and output names of a step.
pub(super) fn inputs_outputs(
    kind: &StepKind,
    f: &StepFields,
    step: &StepRecord,
    ctx: &DescribeContext<'_>,
) -> (Vec<String>, Vec<String>) {
    let mut inputs = IndexSet::new();
    let mut outputs = IndexSet::new();
    let mut read = |name: Option<&str>| {
        if let Some(name) = name {
            inputs.insert(name.to_string());
        }
    };

    match kind {
        StepKind::Query | StepKind::ExecuteSql | StepKind::SetVariableFromQuery => {
            read(f.source.as_deref());
            // Tables named in the statement text that the registry knows about.
            if let Some(sql) = f.sql.as_deref() {
                for table in mentioned_tables(sql, ctx) {
                    read(Some(table));
                }
            }
        }
        StepKind::JoinTables => {
            read(f.left.as_deref().or(f.input_table()));
            read(f.right.as_deref());
            read(f.lookup.as_deref());
        }
        StepKind::ImportFile => read(f.file.as_deref()),
        StepKind::Loop => read(
            step.params()
                .first_name(&["LoopTable", "SourceTable", "TableName"])
                .as_deref(),
        ),
        StepKind::CreateTable | StepKind::DeleteTable | StepKind::PurgeTable => {}
        StepKind::CalculatedColumn
        | StepKind::CopyTable
        | StepKind::AppendTable
        | StepKind::FilterTable
        | StepKind::SortTable
        | StepKind::AggregateTable
        | StepKind::DeduplicateTable
        | StepKind::RenameColumns
        | StepKind::ExportFile
        | StepKind::WarehouseImport => read(f.input_table()),
        StepKind::SendEmail => {
            for attachment in step.params().text_list("Attachment") {
                read(Some(&attachment));
            }
        }
        StepKind::TransferFile | StepKind::DeleteFile => read(f.file.as_deref()),
        _ => read(f.source.as_deref()),
    }

    if let Some(output) = output(kind, f) {
        outputs.insert(output.name);
    }
    match kind {
        StepKind::ExportFile => {
            outputs.insert(f.file.clone().unwrap_or_default());
        }
        StepKind::ImportFile => {
            outputs.insert(import_destination(f));
        }
        _ => {}
    }
    if let Some(name) = f.output_name.as_deref() {
        outputs.insert(name.to_string());
    }
    outputs.retain(|name: &String| !name.is_empty());

    (inputs.into_iter().collect(), outputs.into_iter().collect())
}

/// The typed output of a step, keyed by kind.
pub(super) fn output(kind: &StepKind, f: &StepFields) -> Option<StepOutput> {
    let table = |name: Option<&str>| name.map(|n| StepOutput::new(OutputKind::Table, n));
    match kind {
        StepKind::WarehouseImport => f
            .warehouse
            .as_deref()
            .or(f.target.as_deref())
            .map(|n| StepOutput::new(OutputKind::Warehouse, n)),
        StepKind::SetVariable | StepKind::DeclareVariable | StepKind::SetVariableFromQuery => f
            .variable
            .as_deref()
            .map(|n| StepOutput::new(OutputKind::Var, n)),
        StepKind::Loop => f
            .iterator
            .as_deref()
            .map(|n| StepOutput::new(OutputKind::Iterator, n)),
        StepKind::Query | StepKind::CreateTable | StepKind::ImportFile => table(f.output_table()),
        StepKind::CopyTable | StepKind::AppendTable | StepKind::JoinTables => table(f.target.as_deref()),
        StepKind::CalculatedColumn
        | StepKind::FilterTable
        | StepKind::SortTable
        | StepKind::AggregateTable
        | StepKind::DeduplicateTable
        | StepKind::RenameColumns => table(f.result_table()),
        _ => None,
    }
}

/// Registry tables named in statement text, as whole words.
fn mentioned_tables<'r>(sql: &str, ctx: &DescribeContext<'r>) -> Vec<&'r str> {
    let words: IndexSet<&str> = sql
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '.' | '#' | '@')))
        .filter(|w| !w.is_empty())
        .collect();
    ctx.registry
        .tables
        .iter()
        .filter(|table| {
            words
                .iter()
                .any(|w| w.eq_ignore_ascii_case(table) || w.rsplit('.').next() == Some(table.as_str()))
        })
        .map(String::as_str)
        .collect()
}
