/// Phrases for the comparison operators found in exported criteria.
/// Keys are upper-cased with runs of whitespace and underscores collapsed.
const OPERATOR_PHRASES: &[(&str, &str)] = &[
    ("=", "equals"),
    ("==", "equals"),
    ("EQ", "equals"),
    ("EQUALS", "equals"),
    ("<>", "does not equal"),
    ("!=", "does not equal"),
    ("NE", "does not equal"),
    ("NOT EQUALS", "does not equal"),
    (">", "is greater than"),
    ("GT", "is greater than"),
    (">=", "is greater than or equal to"),
    ("GE", "is greater than or equal to"),
    ("<", "is less than"),
    ("LT", "is less than"),
    ("<=", "is less than or equal to"),
    ("LE", "is less than or equal to"),
    ("LIKE", "is like"),
    ("NOT LIKE", "is not like"),
    ("IN", "is one of"),
    ("NOT IN", "is not one of"),
    ("BETWEEN", "is between"),
    ("NOT BETWEEN", "is not between"),
    ("IS NULL", "is empty"),
    ("ISNULL", "is empty"),
    ("IS NOT NULL", "is not empty"),
    ("ISNOTNULL", "is not empty"),
    ("CONTAINS", "contains"),
    ("NOT CONTAINS", "does not contain"),
    ("STARTS WITH", "starts with"),
    ("STARTSWITH", "starts with"),
    ("ENDS WITH", "ends with"),
    ("ENDSWITH", "ends with"),
];

fn operator_key(op: &str) -> String {
    op.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// Turns an operator token into a phrase; unknown operators are lowercased as-is.
pub fn humanize_operator(op: &str) -> String {
    let key = operator_key(op);
    OPERATOR_PHRASES
        .iter()
        .find(|(token, _)| *token == key)
        .map(|(_, phrase)| phrase.to_string())
        .unwrap_or_else(|| key.to_ascii_lowercase())
}

pub(super) fn is_between(op: &str) -> bool {
    operator_key(op).ends_with("BETWEEN")
}

/// Operators that take no comparison value.
pub(super) fn is_unary(op: &str) -> bool {
    matches!(
        operator_key(op).as_str(),
        "IS NULL" | "ISNULL" | "IS NOT NULL" | "ISNOTNULL"
    )
}
