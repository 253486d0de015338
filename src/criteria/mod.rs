//! Criteria flattener: walks nested filter groups into a flat predicate list.
//!
//! Boolean structure (AND/OR connectives between siblings and groups) is
//! intentionally not kept. The output is an itemized list for human review,
//! in traversal order: each group's own predicates, then its subgroups.

mod operator;

pub use operator::humanize_operator;

use crate::params::{Params, as_list, scalar_text};
use serde_json::{Map, Value};

/// Parameter-bag fields that may hold criteria, tried in order.
pub const HOLDER_KEYS: &[&str] = &["CriteriaSet", "Criteria", "Filter", "WhereCriteria", "Condition"];

/// Fields of a criteria set holding its direct predicates.
const PREDICATE_KEYS: &[&str] = &["Criteria", "Criterion", "Predicates", "Predicate"];

/// Fields of a criteria set holding nested groups.
const GROUP_KEYS: &[&str] = &["CriteriaSet", "SubGroup", "SubGroups", "Group", "Groups"];

const COLUMN_KEYS: &[&str] = &["Column", "ColumnName", "Field", "FieldName"];
const OPERATOR_KEYS: &[&str] = &["Operator", "Op", "Comparison"];
const VALUE_KEYS: &[&str] = &["Value1", "Value", "FromValue"];
const SECOND_VALUE_KEYS: &[&str] = &["Value2", "ToValue", "UpperValue"];

/// Flattens every criteria holder found on a parameter bag.
pub fn flatten_criteria(params: &Params<'_>) -> Vec<String> {
    let mut predicates = Vec::new();
    for key in HOLDER_KEYS {
        if let Some(holder) = params.raw(key) {
            collect(holder, &mut predicates);
        }
    }
    predicates
}

fn collect(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
        Value::Object(map) if is_predicate(map) => out.push(render_predicate(map)),
        Value::Object(map) => {
            let mut found = false;
            for key in PREDICATE_KEYS.iter().chain(GROUP_KEYS) {
                if let Some(inner) = map.get(*key) {
                    found = true;
                    as_list(inner).into_iter().for_each(|item| collect(item, out));
                }
            }
            if !found {
                if let Some(text) = scalar_text(value).filter(|t| !t.is_empty()) {
                    out.push(text);
                }
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar).filter(|t| !t.is_empty()) {
                out.push(text);
            }
        }
    }
}

fn field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(scalar_text)
        .filter(|s| !s.is_empty())
}

fn is_predicate(map: &Map<String, Value>) -> bool {
    field(map, COLUMN_KEYS).is_some()
}

/// `<column> <operator phrase> <value1>[ AND <value2>]`
fn render_predicate(map: &Map<String, Value>) -> String {
    let column = field(map, COLUMN_KEYS).unwrap_or_default();
    let op = field(map, OPERATOR_KEYS).unwrap_or_else(|| "=".to_string());

    let mut text = format!("{} {}", column, humanize_operator(&op));
    if operator::is_unary(&op) {
        return text;
    }
    if let Some(value) = field(map, VALUE_KEYS) {
        text.push(' ');
        text.push_str(&value);
    }
    if operator::is_between(&op) {
        if let Some(upper) = field(map, SECOND_VALUE_KEYS) {
            text.push_str(" AND ");
            text.push_str(&upper);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_groups_flatten_in_traversal_order() {
        let bag = json!({
            "CriteriaSet": {
                "Connective": "AND",
                "Criteria": [
                    { "Column": "Status", "Operator": "=", "Value1": "'A'" },
                    { "Column": "Amount", "Operator": "BETWEEN", "Value1": 10, "Value2": 20 }
                ],
                "SubGroup": {
                    "Connective": "OR",
                    "Criteria": { "Column": "Region", "Operator": "IN", "Value1": "('N','S')" },
                    "SubGroup": {
                        "Criteria": { "Column": "Deleted", "Operator": "IS NULL" }
                    }
                }
            }
        });
        let predicates = flatten_criteria(&Params::new(&bag));
        assert_eq!(
            predicates,
            vec![
                "Status equals 'A'",
                "Amount is between 10 AND 20",
                "Region is one of ('N','S')",
                "Deleted is empty",
            ]
        );
    }

    #[test]
    fn test_flat_list_and_bare_string_holders() {
        let bag = json!({
            "Filter": [
                { "ColumnName": "Qty", "Op": "gt", "Value": 0 },
                { "ColumnName": "Sku", "Op": "starts_with", "Value": "'X'" }
            ],
            "Condition": "Total > 100"
        });
        let predicates = flatten_criteria(&Params::new(&bag));
        assert_eq!(
            predicates,
            vec!["Qty is greater than 0", "Sku starts with 'X'", "Total > 100"]
        );
    }

    #[test]
    fn test_unknown_operator_is_lowercased() {
        assert_eq!(humanize_operator("SOUNDS_LIKE"), "sounds like");
        assert_eq!(humanize_operator(" not   in "), "is not one of");
    }

    #[test]
    fn test_no_holders_yield_nothing() {
        let bag = json!({ "TableName": "Orders" });
        assert!(flatten_criteria(&Params::new(&bag)).is_empty());
    }
}
