use super::lines::{needs_semicolon, strip_comment, BracketStack, READ64_MARKER};
use super::types::{CommentAction, NormalizedScript};
use crate::error::Result;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Read a JS file and normalize it.
pub fn normalize_file(path: impl AsRef<Path>) -> Result<NormalizedScript> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    debug!("read {} bytes from {}", contents.len(), path.display());
    normalize_source(&contents)
}

/// Compact loosely formatted JS into a payload the target can read line by line.
///
/// Comments are dropped, missing semicolons are inserted heuristically and
/// everything inside an open `{ ... }` is joined onto one line. A `//` line
/// mentioning `EXIT` ends the payload early. An unmatched `}` rejects the
/// whole input.
pub fn normalize_source(source: &str) -> Result<NormalizedScript> {
    let mut script = NormalizedScript::default();
    let mut brackets = BracketStack::new();
    let mut last_is_comma = false;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        script.lines_read = line_no;

        if raw.contains(READ64_MARKER) {
            script.saw_read64 = true;
        }

        let code = match strip_comment(raw) {
            CommentAction::Exit => {
                debug!("EXIT sentinel on line {}, payload cut", line_no);
                script.stopped_at_exit = Some(line_no);
                return Ok(script);
            }
            CommentAction::Keep(code) => code.trim(),
        };

        if code.is_empty() {
            continue;
        }

        brackets.scan(code, line_no)?;

        let mut line = code.to_string();
        if line.ends_with(',') {
            last_is_comma = true;
        } else {
            if needs_semicolon(&line, last_is_comma) {
                line.push(';');
            }
            last_is_comma = false;
        }

        script.text.push_str(&line);
        if brackets.is_empty() {
            script.text.push('\n');
        }
    }

    if let Some(opened) = brackets.innermost() {
        warn!(
            "{} block(s) still open at end of file (innermost opened on line {})",
            brackets.depth(),
            opened
        );
    }
    if script.saw_read64 {
        debug!("payload references Read64");
    }

    Ok(script)
}
