//! Nesting-aware scanning shared by the IIF and CASE flatteners.
//!
//! Both walk the text byte by byte, tracking parenthesis depth and whether
//! the cursor sits inside a `'...'`, `"..."` or `[...]` literal. All the
//! delimiters involved are ASCII. Bytes of multi-byte characters count as
//! identifier bytes, so keyword matches only ever start on char boundaries.

/// Cursor state while walking expression text.
#[derive(Debug, Default, Clone, Copy)]
struct Nesting {
    depth: usize,
    quote: Option<u8>,
}

impl Nesting {
    /// Feeds one byte; returns true if that byte is "code" at the current
    /// depth (not part of a literal).
    fn feed(&mut self, byte: u8) -> bool {
        if let Some(q) = self.quote {
            if byte == q {
                self.quote = None;
            }
            return false;
        }
        match byte {
            b'\'' | b'"' => {
                self.quote = Some(byte);
                false
            }
            b'[' => {
                self.quote = Some(b']');
                false
            }
            b'(' => {
                self.depth += 1;
                true
            }
            b')' => {
                self.depth = self.depth.saturating_sub(1);
                true
            }
            _ => true,
        }
    }
}

pub(super) fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || !byte.is_ascii() || matches!(byte, b'_' | b'@' | b'$' | b'#')
}

/// True if `text` starts with `keyword` (case-insensitive) as a whole word.
pub(super) fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= keyword.len()
        && bytes[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
        && bytes
            .get(keyword.len())
            .is_none_or(|&next| !is_ident_byte(next))
}

/// Index of the `)` closing the `(` at `open`, honouring literals and nesting.
pub(super) fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut nesting = Nesting::default();
    for (offset, &byte) in bytes[open..].iter().enumerate() {
        if nesting.feed(byte) && byte == b')' && nesting.depth == 0 {
            return Some(open + offset);
        }
    }
    None
}

/// Splits on `separator` wherever it appears at depth zero outside literals.
pub(super) fn split_top_level(text: &str, separator: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut nesting = Nesting::default();
    let mut start = 0;
    for (i, &byte) in text.as_bytes().iter().enumerate() {
        if nesting.feed(byte) && byte == separator && nesting.depth == 0 {
            parts.push(&text[start..i]);
            start = i + 1;
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Removes parentheses that wrap the entire text, repeatedly.
pub(super) fn strip_outer_parens(mut text: &str) -> &str {
    loop {
        text = text.trim();
        match matching_paren(text, 0) {
            Some(close) if close == text.len() - 1 => text = &text[1..close],
            _ => return text,
        }
    }
}

/// Case-insensitive whole-word keyword hits at parenthesis depth zero,
/// outside literals, as `(keyword index, byte offset)` pairs.
pub(super) fn top_level_keywords(text: &str, keywords: &[&str]) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut hits = Vec::new();
    let mut nesting = Nesting::default();
    for (i, &byte) in bytes.iter().enumerate() {
        if !nesting.feed(byte) || nesting.depth != 0 || !text.is_char_boundary(i) {
            continue;
        }
        if i > 0 && is_ident_byte(bytes[i - 1]) {
            continue;
        }
        if let Some(k) = keywords
            .iter()
            .position(|kw| starts_with_keyword(&text[i..], kw))
        {
            hits.push((k, i));
        }
    }
    hits
}
