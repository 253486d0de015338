use super::rule::Rule;
use super::scan::{starts_with_keyword, strip_outer_parens, top_level_keywords};

const CASE: usize = 0;
const WHEN: usize = 1;
const THEN: usize = 2;
const ELSE: usize = 3;
const END: usize = 4;
const KEYWORDS: &[&str] = &["CASE", "WHEN", "THEN", "ELSE", "END"];

pub(super) fn is_case_block(text: &str) -> bool {
    starts_with_keyword(strip_outer_parens(text), "CASE")
}

/// Keyword positions belonging to the outermost CASE block. Keywords of
/// nested CASE blocks are skipped by tracking CASE/END depth.
fn outer_keywords(body: &str) -> Vec<(usize, usize)> {
    let mut depth = 0usize;
    let mut outer = Vec::new();
    for (keyword, offset) in top_level_keywords(body, KEYWORDS) {
        match keyword {
            CASE => depth += 1,
            END if depth > 0 => depth -= 1,
            _ if depth == 0 => outer.push((keyword, offset)),
            _ => {}
        }
    }
    outer
}

/// Flattens `CASE [subject] WHEN c THEN o ... [ELSE o] END` into rules.
///
/// A searched CASE uses each WHEN text as the condition; a simple CASE
/// renders conditions as `subject = value`. Anything out of order yields `None`.
pub(super) fn flatten_case(text: &str) -> Option<Vec<Rule>> {
    let text = strip_outer_parens(text);
    if !starts_with_keyword(text, "CASE") {
        return None;
    }
    let body = &text[KEYWORDS[CASE].len()..];
    let keywords = outer_keywords(body);

    // The block must close with END and nothing may follow it.
    let &(last, end_at) = keywords.last()?;
    if last != END || !body[end_at + KEYWORDS[END].len()..].trim().is_empty() {
        return None;
    }

    let (first, first_at) = *keywords.first()?;
    if first != WHEN {
        return None;
    }
    let subject = body[..first_at].trim();

    let span = |from: usize, from_kw: usize, to: usize| body[from + KEYWORDS[from_kw].len()..to].trim();

    let mut rules = Vec::new();
    let mut i = 0;
    while i + 1 < keywords.len() && keywords[i].0 == WHEN {
        let (then_kw, then_at) = keywords[i + 1];
        let &(_, next_at) = keywords.get(i + 2)?;
        if then_kw != THEN {
            return None;
        }
        let condition = span(keywords[i].1, WHEN, then_at);
        let outcome = span(then_at, THEN, next_at);
        if condition.is_empty() {
            return None;
        }
        let condition = if subject.is_empty() {
            condition.to_string()
        } else {
            format!("{} = {}", subject, condition)
        };
        rules.push(Rule::new(condition, outcome));
        i += 2;
    }

    match keywords.get(i) {
        Some(&(END, _)) => {}
        Some(&(ELSE, else_at)) => {
            // ELSE must be directly followed by the closing END.
            if i + 2 != keywords.len() {
                return None;
            }
            rules.push(Rule::else_branch(span(else_at, ELSE, end_at)));
        }
        _ => return None,
    }

    if rules.is_empty() { None } else { Some(rules) }
}
