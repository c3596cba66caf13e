mod lines;
mod normalizer;
mod types;

pub use lines::{needs_semicolon, strip_comment, BracketStack, EXIT_SENTINEL};
pub use normalizer::{normalize_file, normalize_source};
pub use types::{CommentAction, NormalizedScript};
