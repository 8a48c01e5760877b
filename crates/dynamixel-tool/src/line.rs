//! Line grammar shared by the model index and device descriptors.

/// Drops the first `#` and everything after it.
pub fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Trims ASCII whitespace, vertical tab included, from both ends.
///
/// Other Unicode whitespace such as NBSP is part of the field.
pub fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b')
}

/// Comment-stripped line, trimmed on both ends.
pub fn normalize(line: &str) -> &str {
    trim(strip_comment(line))
}

/// Splits on every `delimiter`, trimming each token.
///
/// Always yields `count(delimiter) + 1` tokens, so empty fields are kept and
/// an empty line produces a single empty token.
pub fn split(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).map(trim).collect()
}
