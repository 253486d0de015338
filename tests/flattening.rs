//! Tests for the expression and criteria flatteners through the public API.
use kaidoku::criteria::humanize_operator;
use kaidoku::expression::{ELSE, OTHERWISE, is_conditional};
use kaidoku::narrate::rule_to_prose;
use kaidoku::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[cfg(test)]
mod expression_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_two_way_iif() {
        let rules = flatten("IIF(A=B,\"Yes\",\"No\")").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], Rule::new("A=B", "\"Yes\""));
        assert_eq!(rules[1].condition, OTHERWISE);
        assert_eq!(rules[1].outcome, "\"No\"");
    }

    #[test]
    fn test_chained_iif_keeps_order() {
        let rules = flatten("IIF(C1,R1,IIF(C2,R2,IIF(C3,R3,R4)))").unwrap();
        let conditions: Vec<&str> = rules.iter().map(|r| r.condition.as_str()).collect();
        assert_eq!(conditions, vec!["C1", "C2", "C3", OTHERWISE]);
        assert_eq!(rules[2].outcome, "R3");
        assert_eq!(rules[3].outcome, "R4");
    }

    #[test]
    fn test_case_block_ends_with_else() {
        let rules = flatten(
            "CASE WHEN Status = 'A' THEN 'Active' WHEN Status = 'D' THEN 'Inactive' ELSE 'Unknown' END",
        )
        .unwrap();
        assert_eq!(
            rules,
            vec![
                Rule::new("Status = 'A'", "'Active'"),
                Rule::new("Status = 'D'", "'Inactive'"),
                Rule::new(ELSE, "'Unknown'"),
            ]
        );
    }

    #[test]
    fn test_case_without_else_has_no_default() {
        let rules = flatten("CASE WHEN x > 1 THEN 'big' END").unwrap();
        assert_eq!(rules, vec![Rule::new("x > 1", "'big'")]);
        assert!(!rules.iter().any(Rule::is_default));
    }

    #[test]
    fn test_plain_text_is_not_applicable() {
        for text in ["Amount * 1.2", "", "'IIF' || Name", "SELECT CASE WHEN a THEN b END"] {
            assert_eq!(flatten(text), None, "{text:?} should not flatten");
        }
        assert!(!is_conditional("Amount * 1.2"));
        assert!(is_conditional("case when a then b end"));
    }

    #[test]
    fn test_rules_render_as_prose() {
        let rules = flatten("IIF(Qty > 10, 'Bulk', 'Retail')").unwrap();
        assert_eq!(rule_to_prose(&rules[0]), "If Qty > 10, then 'Bulk'.");
        assert_eq!(
            rules_to_prose(&rules),
            "If Qty > 10, then 'Bulk'.\nOtherwise, 'Retail'."
        );
    }
}

#[cfg(test)]
mod criteria_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_groups_lose_connectives() {
        let bag = json!({
            "CriteriaSet": {
                "Connective": "OR",
                "Criteria": [
                    { "Column": "Region", "Operator": "IN", "Value1": "('EU', 'US')" },
                    { "Column": "Amount", "Operator": "BETWEEN", "Value1": 10, "Value2": 500 }
                ],
                "SubGroup": {
                    "Connective": "AND",
                    "Criteria": { "Column": "Status", "Operator": "IS NULL" }
                }
            }
        });
        let predicates = flatten_criteria(&Params::new(&bag));
        assert_eq!(
            predicates,
            vec![
                "Region is one of ('EU', 'US')",
                "Amount is between 10 AND 500",
                "Status is empty",
            ]
        );
    }

    #[test]
    fn test_bare_string_holder() {
        let bag = json!({ "Filter": "Amount > 0" });
        assert_eq!(flatten_criteria(&Params::new(&bag)), vec!["Amount > 0"]);
    }

    #[test]
    fn test_missing_holders_yield_nothing() {
        let bag = json!({ "TableName": "Orders" });
        assert!(flatten_criteria(&Params::new(&bag)).is_empty());
        assert!(flatten_criteria(&Params::new(&serde_json::Value::Null)).is_empty());
    }

    #[test]
    fn test_operator_phrases() {
        assert_eq!(humanize_operator("<>"), "does not equal");
        assert_eq!(humanize_operator("not_like"), "is not like");
        assert_eq!(humanize_operator("~="), "~=");
    }
}
