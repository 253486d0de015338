//! Plain-text renderings: rule lists as prose, and the whole execution model
//! as an indented outline.

mod outline;

pub use outline::OutlineFormatter;

use crate::expression::Rule;

/// One sentence per rule: `If <condition>, then <outcome>.`, with the
/// default rule rendered as `Otherwise, <outcome>.`
pub fn rule_to_prose(rule: &Rule) -> String {
    if rule.is_default() {
        format!("Otherwise, {}.", rule.outcome)
    } else {
        format!("If {}, then {}.", rule.condition, rule.outcome)
    }
}

/// Renders rules in order, one sentence per line.
pub fn rules_to_prose(rules: &[Rule]) -> String {
    rules
        .iter()
        .map(rule_to_prose)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::flatten;

    #[test]
    fn test_iif_prose() {
        let rules = flatten("IIF(A=B,\"Yes\",\"No\")").unwrap();
        assert_eq!(
            rules_to_prose(&rules),
            "If A=B, then \"Yes\".\nOtherwise, \"No\"."
        );
    }

    #[test]
    fn test_case_else_prose() {
        let rules = flatten("CASE WHEN x > 1 THEN 'big' ELSE 'small' END").unwrap();
        assert_eq!(
            rules_to_prose(&rules),
            "If x > 1, then 'big'.\nOtherwise, 'small'."
        );
    }

    #[test]
    fn test_empty_rules() {
        assert_eq!(rules_to_prose(&[]), "");
    }
}
