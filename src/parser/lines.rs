use super::types::CommentAction;
use crate::error::{HarnessError, Result};

pub const COMMENT_MARKER: &str = "//";
pub const EXIT_SENTINEL: &str = "EXIT";
pub const READ64_MARKER: &str = "Read64";

/// Split off a `//` comment, or report the `EXIT` sentinel.
///
/// The sentinel is only honored on lines that also carry a comment marker,
/// but it may sit anywhere on such a line.
pub fn strip_comment(line: &str) -> CommentAction<'_> {
    match line.find(COMMENT_MARKER) {
        Some(_) if line.contains(EXIT_SENTINEL) => CommentAction::Exit,
        Some(pos) => CommentAction::Keep(&line[..pos]),
        None => CommentAction::Keep(line),
    }
}

/// Whether a trimmed, non-blank line gets a `;` appended.
///
/// `after_comma` is true when the previous emitted line ended with `,`.
/// The `for`/`if` test is a plain substring match.
pub fn needs_semicolon(line: &str, after_comma: bool) -> bool {
    if after_comma || line.ends_with([';', '{', ',']) {
        return false;
    }
    if line.contains("for") || line.contains("if") {
        !line.ends_with(')')
    } else {
        true
    }
}

/// Open `{` markers, each remembering the line that opened it.
#[derive(Debug, Default)]
pub struct BracketStack {
    open: Vec<usize>,
}

impl BracketStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push for every `{` and pop for every `}` in `line`.
    pub fn scan(&mut self, line: &str, line_no: usize) -> Result<()> {
        for ch in line.chars() {
            match ch {
                '{' => self.open.push(line_no),
                '}' => {
                    if self.open.pop().is_none() {
                        return Err(HarnessError::UnmatchedBrace { line: line_no });
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Line of the innermost block still open.
    pub fn innermost(&self) -> Option<usize> {
        self.open.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_is_cut_at_first_marker() {
        assert_eq!(
            strip_comment("let a = 1 // one // two"),
            CommentAction::Keep("let a = 1 ")
        );
        assert_eq!(strip_comment("no comment"), CommentAction::Keep("no comment"));
    }

    #[test]
    fn exit_needs_a_comment_marker() {
        assert_eq!(strip_comment("if (x) // EXIT"), CommentAction::Exit);
        assert_eq!(strip_comment("EXIT(); // stop"), CommentAction::Exit);
        assert_eq!(strip_comment("EXIT()"), CommentAction::Keep("EXIT()"));
    }

    #[test]
    fn control_flow_headers_are_left_open() {
        assert!(!needs_semicolon("for (let i = 0; i < 10; i++)", false));
        assert!(!needs_semicolon("if (x)", false));
        assert!(needs_semicolon("if (x) y = 1", false));
        assert!(needs_semicolon("foo()", false));
        assert!(!needs_semicolon("x: 1,", false));
        assert!(!needs_semicolon("y: 2", true));
        assert!(!needs_semicolon("function f() {", false));
    }

    #[test]
    fn substring_match_is_literal() {
        // "format" contains "for", so a trailing ')' keeps it unterminated.
        assert!(!needs_semicolon("format(x)", false));
    }

    #[test]
    fn underflow_reports_line() {
        let mut stack = BracketStack::new();
        stack.scan("{ {", 1).unwrap();
        assert_eq!(stack.depth(), 2);
        stack.scan("}}", 2).unwrap();
        assert!(stack.is_empty());
        match stack.scan("}", 3) {
            Err(HarnessError::UnmatchedBrace { line }) => assert_eq!(line, 3),
            other => panic!("expected unmatched brace, got {:?}", other),
        }
    }
}
