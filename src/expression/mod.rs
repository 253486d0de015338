//! Expression flattener: turns nested `IIF(...)` chains and SQL `CASE` blocks
//! into ordered decision-table rules.
//!
//! This is a pattern-based reader, not an expression grammar. It understands
//! parenthesis nesting and quoted literals, and nothing else. Text that does
//! not match yields `None` so callers can show it verbatim; a partially
//! understood expression is never returned.
//!
//! ```
//! use kaidoku::expression::flatten;
//!
//! let rules = flatten("IIF(Qty > 10, 'Bulk', IIF(Qty > 0, 'Retail', 'None'))").unwrap();
//! assert_eq!(rules.len(), 3);
//! assert_eq!(rules[1].condition, "Qty > 0");
//! assert!(rules[2].is_default());
//! ```

mod case;
mod iif;
mod rule;
mod scan;

pub use rule::{ELSE, OTHERWISE, Rule};

use tracing::trace;

/// Flattens a conditional expression into rules, or `None` if the text is
/// not a single `IIF` chain or `CASE` block.
pub fn flatten(expression: &str) -> Option<Vec<Rule>> {
    let rules = if iif::is_iif_call(expression) {
        iif::flatten_iif(expression)
    } else if case::is_case_block(expression) {
        case::flatten_case(expression)
    } else {
        return None;
    };
    if rules.is_none() {
        trace!(expression, "conditional expression did not match the flattening grammar");
    }
    rules
}

/// True if the text looks like something [`flatten`] would attempt.
pub fn is_conditional(expression: &str) -> bool {
    iif::is_iif_call(expression) || case::is_case_block(expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_iif() {
        let rules = flatten("IIF(A=B,\"Yes\",\"No\")").unwrap();
        assert_eq!(
            rules,
            vec![Rule::new("A=B", "\"Yes\""), Rule::otherwise("\"No\"")]
        );
    }

    #[test]
    fn test_chained_iif() {
        let rules = flatten("IIF(C1,R1,IIF(C2,R2,IIF(C3,R3,R4)))").unwrap();
        assert_eq!(rules.len(), 4);
        assert_eq!(rules[2], Rule::new("C3", "R3"));
        assert_eq!(rules[3], Rule::otherwise("R4"));
    }

    #[test]
    fn test_iif_with_nested_function_commas() {
        let rules = flatten("iif( LEN(TRIM(Name, ' ')) > 0, CONCAT(First, ' ', Last), 'n/a' )").unwrap();
        assert_eq!(rules[0].condition, "LEN(TRIM(Name, ' ')) > 0");
        assert_eq!(rules[0].outcome, "CONCAT(First, ' ', Last)");
        assert_eq!(rules[1].outcome, "'n/a'");
    }

    #[test]
    fn test_iif_wrong_arity_is_rejected() {
        assert_eq!(flatten("IIF(A, B)"), None);
        assert_eq!(flatten("IIF(A, B, C, D)"), None);
        assert_eq!(flatten("IIF(A, B, IIF(C, D))"), None);
    }

    #[test]
    fn test_iif_inside_larger_expression_is_rejected() {
        assert_eq!(flatten("IIF(A, 1, 2) + 3"), None);
        assert_eq!(flatten("ROUND(IIF(A, 1, 2), 0)"), None);
    }

    #[test]
    fn test_searched_case() {
        let rules = flatten(
            "CASE WHEN Status = 'A' THEN 'Active' WHEN Status = 'D' THEN 'Inactive' ELSE 'Unknown' END",
        )
        .unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0], Rule::new("Status = 'A'", "'Active'"));
        assert_eq!(rules[2].condition, "ELSE");
        assert_eq!(rules[2].outcome, "'Unknown'");
    }

    #[test]
    fn test_simple_case_uses_subject() {
        let rules = flatten("case Region when 'N' then 1 when 'S' then 2 end").unwrap();
        assert_eq!(rules, vec![Rule::new("Region = 'N'", "1"), Rule::new("Region = 'S'", "2")]);
    }

    #[test]
    fn test_nested_case_stays_in_outcome() {
        let rules =
            flatten("CASE WHEN a > 1 THEN CASE WHEN b THEN 'x' ELSE 'y' END ELSE 'z' END").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].outcome, "CASE WHEN b THEN 'x' ELSE 'y' END");
    }

    #[test]
    fn test_keywords_inside_literals_are_ignored() {
        let rules = flatten("CASE WHEN Note = 'WHEN THEN END' THEN 1 ELSE 0 END").unwrap();
        assert_eq!(rules[0].condition, "Note = 'WHEN THEN END'");
    }

    #[test]
    fn test_malformed_case_is_rejected() {
        assert_eq!(flatten("CASE WHEN a THEN 1"), None);
        assert_eq!(flatten("CASE ELSE 1 END"), None);
        assert_eq!(flatten("CASE WHEN a THEN 1 END + 2"), None);
        assert_eq!(flatten("CASE WHEN a THEN 1 ELSE 2 WHEN b THEN 3 END"), None);
    }

    #[test]
    fn test_non_ascii_identifiers() {
        let rules = flatten("CASE WHEN Größe > 10 THEN 'groß' ELSE 'klein' END").unwrap();
        assert_eq!(
            rules,
            vec![Rule::new("Größe > 10", "'groß'"), Rule::else_branch("'klein'")]
        );

        let rules = flatten("IIF(Menge > 10, Straße, Ort)").unwrap();
        assert_eq!(rules, vec![Rule::new("Menge > 10", "Straße"), Rule::otherwise("Ort")]);
    }

    #[test]
    fn test_plain_text_is_not_flattened() {
        assert_eq!(flatten("Amount * 1.2"), None);
        assert_eq!(flatten("CASEY + 1"), None);
        assert!(!is_conditional("UPPER(Name)"));
    }
}
