use super::fields::FORMULA_KEYS;
use super::{Cell, DescribeContext, Projection};
use crate::params::{Params, scalar_text};
use crate::process::{StepKind, StepRecord};

/// One projection column: header, the bag fields it reads, and whether the
/// cell holds an expression to flatten.
struct Column {
    header: &'static str,
    keys: &'static [&'static str],
    expression: bool,
    technical_only: bool,
}

const fn column(header: &'static str, keys: &'static [&'static str]) -> Column {
    Column {
        header,
        keys,
        expression: false,
        technical_only: false,
    }
}

const fn formula(header: &'static str, keys: &'static [&'static str]) -> Column {
    Column {
        header,
        keys,
        expression: true,
        technical_only: false,
    }
}

const fn technical(header: &'static str, keys: &'static [&'static str]) -> Column {
    Column {
        header,
        keys,
        expression: false,
        technical_only: true,
    }
}

const NAME_KEYS: &[&str] = &["Name", "ColumnName", "TargetColumn"];

const QUERY_COLUMNS: &[Column] = &[column("Column", NAME_KEYS), formula("Expression", FORMULA_KEYS)];

const CALCULATED_COLUMNS: &[Column] = &[
    column("Column", NAME_KEYS),
    technical("Data Type", &["DataType", "Type"]),
    formula("Formula", FORMULA_KEYS),
];

const TABLE_COLUMNS: &[Column] = &[
    column("Column", NAME_KEYS),
    technical("Data Type", &["DataType", "Type"]),
    technical("Length", &["Length", "Size"]),
];

const WAREHOUSE_COLUMNS: &[Column] = &[
    column("Source Column", &["SourceColumn", "Source"]),
    column("Target Column", &["TargetColumn", "Target"]),
    formula("Transformation", FORMULA_KEYS),
];

const JOIN_COLUMNS: &[Column] = &[
    column("Left Column", &["LeftColumn"]),
    column("Right Column", &["RightColumn"]),
];

/// Headered rows for kinds that shape tabular data, `None` for the rest or
/// when the step carries no rows.
pub(super) fn projection(
    kind: &StepKind,
    step: &StepRecord,
    ctx: &DescribeContext<'_>,
) -> Option<Projection> {
    let p = step.params();
    let (columns, items) = match kind {
        StepKind::Query => (QUERY_COLUMNS, p.list("Columns")),
        StepKind::CalculatedColumn => (CALCULATED_COLUMNS, p.list("Columns")),
        StepKind::CreateTable => (TABLE_COLUMNS, p.list("Columns")),
        StepKind::WarehouseImport => (WAREHOUSE_COLUMNS, p.list("Mappings")),
        StepKind::JoinTables => (JOIN_COLUMNS, p.list("JoinColumns")),
        _ => return None,
    };

    let columns: Vec<&Column> = columns
        .iter()
        .filter(|c| !(c.technical_only && ctx.is_business()))
        .collect();

    let rows: Vec<Vec<Cell>> = items
        .into_iter()
        .map(|item| {
            let bag = Params::new(item);
            columns
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    // A bare string item is just the column name.
                    let text = match scalar_text(item) {
                        Some(name) if i == 0 => Some(name),
                        Some(_) => None,
                        None => bag.first_text(c.keys),
                    };
                    match (text, c.expression) {
                        (Some(text), true) => Cell::expression(text),
                        (Some(text), false) => Cell::text(text),
                        (None, _) => Cell::text(""),
                    }
                })
                .collect()
        })
        .filter(|row: &Vec<Cell>| row.iter().any(|cell| !cell.text.is_empty()))
        .collect();

    if rows.is_empty() {
        return None;
    }
    Some(Projection {
        headers: columns.iter().map(|c| c.header.to_string()).collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Rule;
    use crate::process::Mode;
    use crate::registry::Registry;
    use serde_json::json;

    fn project(step: &StepRecord, mode: Mode) -> Option<Projection> {
        let registry = Registry::default();
        let ctx = DescribeContext::new(mode, &registry);
        projection(&StepKind::from_tag(&step.step_type), step, &ctx)
    }

    #[test]
    fn test_calculated_column_cells_carry_rules() {
        let step = StepRecord::new("1", "CalculatedColumn").with_params(json!({
            "Columns": [
                { "Name": "Band", "DataType": "varchar", "Expression": "IIF(Amt > 100, 'High', 'Low')" },
                { "Name": "Net", "DataType": "decimal", "Expression": "Amt - Tax" }
            ]
        }));
        let projection = project(&step, Mode::Technical).unwrap();
        assert_eq!(projection.headers, vec!["Column", "Data Type", "Formula"]);
        assert_eq!(
            projection.rows[0][2].rules,
            Some(vec![Rule::new("Amt > 100", "'High'"), Rule::otherwise("'Low'")])
        );
        assert_eq!(projection.rows[1][2].rules, None);
        assert_eq!(projection.rows[1][2].text, "Amt - Tax");
    }

    #[test]
    fn test_business_mode_hides_technical_columns() {
        let step = StepRecord::new("1", "CreateTable").with_params(json!({
            "TableName": "Stage",
            "Columns": { "Name": "Id", "DataType": "int", "Length": 4 }
        }));
        let projection = project(&step, Mode::Business).unwrap();
        assert_eq!(projection.headers, vec!["Column"]);
        assert_eq!(projection.rows.len(), 1);
        assert_eq!(projection.rows[0][0].text, "Id");
    }

    #[test]
    fn test_warehouse_mapping_rows() {
        let step = StepRecord::new("1", "WarehouseImport").with_params(json!({
            "Mappings": [
                { "SourceColumn": "cust", "TargetColumn": "CustomerId" },
                { "SourceColumn": "st", "TargetColumn": "Status",
                  "Expression": "CASE st WHEN 'A' THEN 'Active' ELSE 'Other' END" }
            ]
        }));
        let projection = project(&step, Mode::Technical).unwrap();
        assert_eq!(projection.rows[0][2].text, "");
        let rules = projection.rows[1][2].rules.as_ref().unwrap();
        assert_eq!(rules[0], Rule::new("st = 'A'", "'Active'"));
        assert!(rules[1].is_default());
    }

    #[test]
    fn test_no_rows_no_projection() {
        let step = StepRecord::new("1", "Query").with_params(json!({ "Sql": "SELECT 1" }));
        assert_eq!(project(&step, Mode::Technical), None);
        let other = StepRecord::new("2", "SendEmail");
        assert_eq!(project(&other, Mode::Technical), None);
    }
}
