use super::rule::Rule;
use super::scan::{matching_paren, split_top_level, starts_with_keyword, strip_outer_parens};

/// If `text` is exactly one `IIF(...)` call, returns its argument text.
fn call_arguments(text: &str) -> Option<&str> {
    let text = strip_outer_parens(text);
    if !starts_with_keyword(text, "IIF") {
        return None;
    }
    let open = 3 + text[3..].find(|c: char| !c.is_whitespace())?;
    let close = matching_paren(text, open)?;
    // Trailing text means the IIF is only part of a larger expression.
    if !text[close + 1..].trim().is_empty() {
        return None;
    }
    Some(&text[open + 1..close])
}

pub(super) fn is_iif_call(text: &str) -> bool {
    call_arguments(text).is_some()
}

/// Flattens an `IIF(cond, then, else)` chain. Nested calls in the else
/// position continue the chain; anything else there becomes the default rule.
pub(super) fn flatten_iif(text: &str) -> Option<Vec<Rule>> {
    let args = split_top_level(call_arguments(text)?, b',');
    let [condition, outcome, fallback] = args.as_slice() else {
        return None;
    };
    let condition = condition.trim();
    if condition.is_empty() {
        return None;
    }

    let mut rules = vec![Rule::new(condition, outcome.trim())];
    if is_iif_call(fallback) {
        // A malformed nested call invalidates the whole chain.
        rules.extend(flatten_iif(fallback)?);
    } else {
        rules.push(Rule::otherwise(fallback.trim()));
    }
    Some(rules)
}
