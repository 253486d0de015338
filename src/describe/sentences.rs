use super::DescribeContext;
use super::fields::{StepFields, or_unnamed, preview};
use crate::process::{StepKind, StepRecord};
use crate::registry::{ITERATOR_KEYS, file_stem};

/// Flow labels stay short enough for a diagram box.
const LABEL_BUDGET: usize = 40;

/// Context sentence and flow label for one step.
pub(super) fn sentence(
    kind: &StepKind,
    f: &StepFields,
    step: &StepRecord,
    ctx: &DescribeContext<'_>,
) -> (String, String) {
    let business = ctx.is_business();
    let p = step.params();
    let name = step.display_name();

    match kind {
        StepKind::Query => {
            let target = or_unnamed(f.output_table().or(f.output_name.as_deref()), "a result set");
            let context = match (business, f.input_table()) {
                (true, Some(source)) => format!("Retrieves data from {} into {}.", source, target),
                (true, None) => format!("Retrieves data into {}.", target),
                (false, Some(source)) => format!(
                    "Runs a SELECT query against {} and writes the result set to {}.",
                    source, target
                ),
                (false, None) => format!("Runs a SELECT query and writes the result set to {}.", target),
            };
            let label = if business {
                format!("Load {}", target)
            } else {
                format!("Query → {}", target)
            };
            (context, label)
        }
        StepKind::ExecuteSql => {
            let context = match (business, f.output_table()) {
                (true, Some(table)) => format!("Updates the data in {}.", table),
                (true, None) => "Runs a database command.".to_string(),
                (false, Some(table)) => format!("Executes a SQL statement against {}.", table),
                (false, None) => "Executes a SQL statement.".to_string(),
            };
            let label = match (business, f.sql.as_deref()) {
                (false, Some(sql)) => format!("SQL: {}", preview(sql, LABEL_BUDGET)),
                _ => "Run SQL".to_string(),
            };
            (context, label)
        }
        StepKind::CalculatedColumn => {
            let table = or_unnamed(f.output_table().or(f.input_table()), "the current table");
            let count = f.column_names.len().max(1);
            let context = if business {
                format!("Calculates {} new value(s) for each row of {}.", count, table)
            } else {
                format!("Adds {} calculated column(s) to {}.", count, table)
            };
            let label = if f.column_names.is_empty() {
                format!("Calculate in {}", table)
            } else {
                format!("Calculate {}", preview(&f.column_names.join(", "), LABEL_BUDGET))
            };
            (context, label)
        }
        StepKind::SetVariable | StepKind::DeclareVariable => {
            let variable = or_unnamed(f.variable.as_deref(), "a variable");
            let value = f.value.as_deref().unwrap_or_default();
            let conditional = crate::expression::is_conditional(value);
            let context = match (business, conditional, value.is_empty()) {
                (_, _, true) if *kind == StepKind::DeclareVariable => {
                    format!("Declares variable {}.", variable)
                }
                (true, true, _) => format!("Sets {} according to a set of rules.", variable),
                (true, false, true) => format!("Sets {}.", variable),
                (true, false, false) => format!("Sets {} to {}.", variable, value),
                (false, true, _) => format!("Assigns a conditional expression to variable {}.", variable),
                (false, false, true) => format!("Assigns variable {}.", variable),
                (false, false, false) => format!(
                    "Assigns {} to variable {}.",
                    preview(value, ctx.preview_budget),
                    variable
                ),
            };
            let label = if *kind == StepKind::DeclareVariable {
                format!("Declare {}", variable)
            } else if conditional || value.is_empty() {
                format!("Set {}", variable)
            } else {
                format!("{} = {}", variable, preview(value, LABEL_BUDGET))
            };
            (context, label)
        }
        StepKind::SetVariableFromQuery => {
            let variable = or_unnamed(f.variable.as_deref(), "a variable");
            let context = if business {
                format!("Looks up a value from the database and keeps it as {}.", variable)
            } else {
                format!("Stores the scalar result of a query in variable {}.", variable)
            };
            (context, format!("{} ← query", variable))
        }
        StepKind::Loop => {
            let context = if business {
                format!("Repeats the steps below {}.", loop_phrase(f, step))
            } else {
                format!("Loops: {}.", f.loop_condition)
            };
            (context, format!("Loop: {}", preview(&f.loop_condition, LABEL_BUDGET)))
        }
        StepKind::Group => {
            let context = if business {
                format!("Groups the steps for \"{}\".", name)
            } else {
                format!("Step group \"{}\"; children run in sequence order.", name)
            };
            (context, name)
        }
        StepKind::Decision => {
            let condition = decision_condition(f, step);
            let context = match (business, condition.as_deref()) {
                (true, Some(c)) => format!("Checks whether {}.", c),
                (true, None) => "Chooses which path to follow.".to_string(),
                (false, Some(c)) => format!("Evaluates {} and runs the matching branch.", c),
                (false, None) => "Evaluates its branches in order.".to_string(),
            };
            let label = match condition {
                Some(c) => format!("If {}?", preview(&c, LABEL_BUDGET)),
                None => format!("Decision: {}", name),
            };
            (context, label)
        }
        StepKind::Branch => {
            let condition = decision_condition(f, step);
            let context = match (business, condition.as_deref()) {
                (true, Some(c)) => format!("When {}:", c),
                (true, None) => "Otherwise:".to_string(),
                (false, Some(c)) => format!("Branch taken when {}.", c),
                (false, None) => "Default branch.".to_string(),
            };
            let label = match condition {
                Some(c) => format!("When {}", preview(&c, LABEL_BUDGET)),
                None => "Otherwise".to_string(),
            };
            (context, label)
        }
        StepKind::CreateTable => {
            let table = or_unnamed(f.output_table(), "a table");
            let context = if business {
                format!("Prepares table {}.", table)
            } else {
                format!("Creates table {} with {} column(s).", table, f.column_names.len())
            };
            (context, format!("Create {}", table))
        }
        StepKind::DeleteTable => {
            let table = or_unnamed(f.output_table(), "a table");
            let context = if business {
                format!("Removes table {}.", table)
            } else {
                format!("Drops table {}.", table)
            };
            (context, format!("Drop {}", table))
        }
        StepKind::PurgeTable => {
            let table = or_unnamed(f.output_table(), "a table");
            let context = if business {
                format!("Clears all rows from {}.", table)
            } else {
                format!("Truncates table {}.", table)
            };
            (context, format!("Purge {}", table))
        }
        StepKind::CopyTable => {
            let source = or_unnamed(f.input_table(), "a table");
            let target = or_unnamed(f.target.as_deref(), "a new table");
            let context = if business {
                format!("Makes a copy of {} named {}.", source, target)
            } else {
                format!("Copies all rows of {} into {}.", source, target)
            };
            (context, format!("{} → {}", source, target))
        }
        StepKind::AppendTable => {
            let source = or_unnamed(f.input_table(), "a table");
            let target = or_unnamed(f.target.as_deref(), "the target table");
            let context = if business {
                format!("Adds the rows of {} to {}.", source, target)
            } else {
                format!("Appends the rows of {} onto {}.", source, target)
            };
            (context, format!("{} + → {}", source, target))
        }
        StepKind::JoinTables => {
            let left = or_unnamed(f.left.as_deref().or(f.input_table()), "a table");
            let right = or_unnamed(f.right.as_deref().or(f.lookup.as_deref()), "another table");
            let target = or_unnamed(f.target.as_deref(), "a combined table");
            let join = f.join_type.as_deref().unwrap_or("INNER");
            let context = if business {
                format!("Combines {} with {} into {}.", left, right, target)
            } else {
                format!("{} JOIN of {} and {} into {}.", join, left, right, target)
            };
            let label = if business {
                format!("Combine {} + {}", left, right)
            } else {
                format!("{} ⋈ {} → {}", left, right, target)
            };
            (context, label)
        }
        StepKind::FilterTable => {
            let source = or_unnamed(f.input_table(), "the table");
            let count = f.criteria.len();
            let mut context = if business {
                format!("Keeps only the rows of {} that meet {} condition(s)", source, count)
            } else {
                format!("Filters {} with {} predicate(s)", source, count)
            };
            if let Some(target) = f.target.as_deref() {
                context.push_str(&format!(" into {}", target));
            }
            context.push('.');
            (context, format!("Filter {}", source))
        }
        StepKind::SortTable => {
            let source = or_unnamed(f.input_table(), "the table");
            let keys = super::details::sort_keys(&p, business);
            let context = match (business, keys.is_empty()) {
                (_, true) => format!("Sorts {}.", source),
                (true, false) => format!("Orders {} by {}.", source, keys.join(", ")),
                (false, false) => format!("Sorts {} by {}.", source, keys.join(", ")),
            };
            (context, format!("Sort {}", source))
        }
        StepKind::AggregateTable => {
            let source = or_unnamed(f.input_table(), "the table");
            let target = or_unnamed(f.target.as_deref(), source);
            let groups = p.text_list("GroupBy");
            let context = match (business, groups.is_empty()) {
                (true, true) => format!("Summarizes {} into {}.", source, target),
                (true, false) => format!(
                    "Summarizes {} per {} into {}.",
                    source,
                    groups.join(", "),
                    target
                ),
                (false, true) => format!("Aggregates {} into {}.", source, target),
                (false, false) => format!(
                    "Aggregates {} grouped by {} into {}.",
                    source,
                    groups.join(", "),
                    target
                ),
            };
            (context, format!("Aggregate {} → {}", source, target))
        }
        StepKind::DeduplicateTable => {
            let source = or_unnamed(f.input_table(), "the table");
            let keys = p.text_list("KeyColumns");
            let context = match (business, keys.is_empty()) {
                (true, _) => format!("Removes duplicate rows from {}.", source),
                (false, true) => format!("Deduplicates {} on all columns.", source),
                (false, false) => format!("Deduplicates {} on {}.", source, keys.join(", ")),
            };
            (context, format!("Dedupe {}", source))
        }
        StepKind::RenameColumns => {
            let source = or_unnamed(f.input_table(), "the table");
            let count = p.list("Renames").len();
            (
                format!("Renames {} column(s) in {}.", count, source),
                format!("Rename columns in {}", source),
            )
        }
        StepKind::ImportFile => {
            let file = or_unnamed(f.file_name(), "a file");
            let destination = import_destination(f);
            let context = if business {
                format!("Loads file {} into {}.", file, destination)
            } else {
                format!(
                    "Imports {} into {}.",
                    or_unnamed(f.file.as_deref(), "a file"),
                    destination
                )
            };
            (context, format!("Import {} → {}", file, destination))
        }
        StepKind::ExportFile => {
            let source = or_unnamed(f.input_table(), "the table");
            let file = or_unnamed(f.file_name(), "a file");
            let context = if business {
                format!("Saves {} to file {}.", source, file)
            } else {
                format!("Exports {} to {}.", source, or_unnamed(f.file.as_deref(), "a file"))
            };
            (context, format!("{} → {}", source, file))
        }
        StepKind::WarehouseImport => {
            let source = or_unnamed(f.input_table(), "the table");
            let warehouse = or_unnamed(f.warehouse.as_deref(), "the warehouse");
            let mode = f.import_mode.as_ref().map(|(label, _)| label.as_str());
            let context = match (business, mode) {
                (true, Some(mode)) => format!(
                    "Loads {} into the {} warehouse ({}).",
                    source,
                    warehouse,
                    mode.to_lowercase()
                ),
                (true, None) => format!("Loads {} into the {} warehouse.", source, warehouse),
                (false, _) => format!(
                    "Imports {} into warehouse {}, table {}.",
                    source,
                    warehouse,
                    or_unnamed(f.target.as_deref(), source)
                ),
            };
            let label = match f.target.as_deref() {
                Some(target) => format!("{} → {}.{}", source, warehouse, target),
                None => format!("{} → {}", source, warehouse),
            };
            (context, label)
        }
        StepKind::SendEmail => {
            let subject = f.subject.as_deref();
            let to = if f.recipients.is_empty() {
                "the configured recipients".to_string()
            } else {
                f.recipients.join(", ")
            };
            let context = match subject {
                Some(subject) => format!("Sends an email \"{}\" to {}.", subject, to),
                None => format!("Sends an email to {}.", to),
            };
            let label = match subject {
                Some(subject) => format!("Email: {}", preview(subject, LABEL_BUDGET)),
                None => "Send email".to_string(),
            };
            (context, label)
        }
        StepKind::RunScript => {
            let language = f.language.as_deref();
            let context = match (business, language) {
                (true, _) => "Runs a custom script.".to_string(),
                (false, Some(lang)) => format!("Executes a {} script.", lang),
                (false, None) => "Executes a script.".to_string(),
            };
            let label = match language {
                Some(lang) => format!("Script ({})", lang),
                None => "Script".to_string(),
            };
            (context, label)
        }
        StepKind::RunProcess => {
            let process = or_unnamed(f.process.as_deref(), "another process");
            let context = if business {
                format!("Starts process {}.", process)
            } else {
                format!("Invokes process {} and waits for it to finish.", process)
            };
            (context, format!("Run {}", process))
        }
        StepKind::Wait => {
            let duration = wait_duration(step);
            (
                format!("Pauses for {}.", duration),
                format!("Wait {}", duration),
            )
        }
        StepKind::LogMessage => {
            let message = p.first_text(&["Message", "Text"]);
            let context = match message {
                Some(m) => format!("Writes a log entry: {}", preview(&m, ctx.preview_budget)),
                None => "Writes a log entry.".to_string(),
            };
            (context, "Log".to_string())
        }
        StepKind::TransferFile => {
            let file = or_unnamed(f.file_name(), "a file");
            let destination = p.first_text(&["Destination", "RemotePath", "Host"]);
            let context = match destination.as_deref() {
                Some(d) => format!("Transfers {} to {}.", file, d),
                None => format!("Transfers {}.", file),
            };
            (context, format!("Transfer {}", file))
        }
        StepKind::DeleteFile => {
            let file = or_unnamed(f.file_name(), "a file");
            (format!("Deletes file {}.", file), format!("Delete {}", file))
        }
        StepKind::Stop => {
            let context = match (business, p.text("ExitCode")) {
                (true, _) | (false, None) => "Stops the process.".to_string(),
                (false, Some(code)) => format!("Terminates the process with exit code {}.", code),
            };
            (context, "Stop".to_string())
        }
        StepKind::Other(tag) => {
            let context = if business {
                format!("Performs a {} step.", tag)
            } else {
                format!("Runs vendor step type \"{}\".", tag)
            };
            (context, tag.clone())
        }
    }
}

/// Loop condition phrased for a business reader.
fn loop_phrase(f: &StepFields, step: &StepRecord) -> String {
    let p = step.params();
    let iterator = p.first_name(ITERATOR_KEYS);
    if let (Some(start), Some(end)) = (p.text("StartValue"), p.text("EndValue")) {
        return format!(
            "for {} from {} to {}",
            iterator.as_deref().unwrap_or("each value"),
            start,
            end
        );
    }
    if let Some(table) = p.first_name(&["LoopTable", "SourceTable", "TableName"]) {
        return format!("once for each row in {}", table);
    }
    if let Some(condition) = p.text("Condition") {
        return format!("while {}", condition);
    }
    match p.text("MaxIterations") {
        Some(max) => format!("{} times", max),
        None if f.loop_condition == "LOOP" => "repeatedly".to_string(),
        None => f.loop_condition.to_lowercase(),
    }
}

/// A decision's condition: its criteria, else its raw condition expression.
pub(super) fn decision_condition(f: &StepFields, step: &StepRecord) -> Option<String> {
    f.condition_text()
        .or_else(|| step.params().first_text(&["Expression", "ConditionExpression"]))
}

pub(super) fn import_destination(f: &StepFields) -> String {
    f.output_table()
        .or(f.output_name.as_deref())
        .map(str::to_string)
        .or_else(|| f.file.as_deref().and_then(file_stem))
        .unwrap_or_else(|| "a working buffer".to_string())
}

fn wait_duration(step: &StepRecord) -> String {
    let p = step.params();
    if let Some(seconds) = p.first_text(&["Seconds", "DelaySeconds"]) {
        return format!("{} second(s)", seconds);
    }
    p.first_text(&["Duration", "Delay"])
        .unwrap_or_else(|| "a configured time".to_string())
}
