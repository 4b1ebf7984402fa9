use crate::core::errors::ParseError;

/// Opens a comment
pub const COMMENT_OPEN: char = '❄';
/// Closes a comment
pub const COMMENT_CLOSE: char = '⛏';

/// Remove comments from scenario text.
///
/// A comment runs from `❄` to the matching `⛏`, may nest and may span lines.
/// Each outermost comment is replaced by a single space. A closer outside any
/// comment is kept as ordinary text.
pub fn strip_comments(input: &str) -> Result<String, ParseError> {
    let mut output = String::with_capacity(input.len());
    let mut depth = 0usize;

    for c in input.chars() {
        match (c, depth) {
            (COMMENT_OPEN, _) => depth += 1,
            (COMMENT_CLOSE, 1) => {
                depth = 0;
                output.push(' ');
            }
            (COMMENT_CLOSE, d) if d > 1 => depth -= 1,
            (_, 0) => output.push(c),
            _ => {}
        }
    }

    if depth > 0 {
        return Err(ParseError::UnterminatedComment);
    }
    Ok(output)
}
