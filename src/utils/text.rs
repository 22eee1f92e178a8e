//! Character-level helpers over byte offsets.
//!
//! Every index handled by the analysis engine is a byte offset into a UTF-8
//! buffer. Scanning code compares whole characters (typographic quotes are
//! multi-byte), so these helpers decode the character at or before an offset.

/// Character starting at byte offset `index`, if any
#[inline]
pub fn char_at(text: &str, index: usize) -> Option<char> {
    text.get(index..).and_then(|rest| rest.chars().next())
}

/// Character ending at byte offset `index`, if any
#[inline]
pub fn char_before(text: &str, index: usize) -> Option<char> {
    text.get(..index).and_then(|head| head.chars().next_back())
}

/// Advance from `index` while `pred` holds, never past `limit`
pub fn skip_forward(text: &str, mut index: usize, limit: usize, pred: impl Fn(char) -> bool) -> usize {
    while index < limit {
        match char_at(text, index) {
            Some(c) if pred(c) => index += c.len_utf8(),
            _ => break,
        }
    }
    index
}

/// Move back from `index` while the preceding character satisfies `pred`, never before `limit`
pub fn skip_backward(text: &str, mut index: usize, limit: usize, pred: impl Fn(char) -> bool) -> usize {
    while index > limit {
        match char_before(text, index) {
            Some(c) if pred(c) => index -= c.len_utf8(),
            _ => break,
        }
    }
    index
}

/// Byte offsets where each line starts
pub fn line_offsets(text: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, c) in text.char_indices() {
        if c == '\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// Map a byte offset to a 1-indexed (line, column) pair, columns counted in characters
pub fn offset_to_line_col(text: &str, line_offsets: &[usize], offset: usize) -> (usize, usize) {
    let line = match line_offsets.binary_search(&offset) {
        Ok(line) => line,
        Err(line) => line.saturating_sub(1),
    };
    let line_start = line_offsets.get(line).copied().unwrap_or(0);
    let column = text
        .get(line_start..offset.min(text.len()))
        .map(|s| s.chars().count())
        .unwrap_or(0);
    (line + 1, column + 1)
}
