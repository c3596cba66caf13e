/// Output of normalization: the compacted program plus what was seen on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedScript {
    /// Normalized program text; one physical line per top-level statement or block.
    pub text: String,
    /// Some raw line mentioned `Read64`. Never affects `text`.
    pub saw_read64: bool,
    /// Physical lines examined, including an `EXIT` line that stopped the run.
    pub lines_read: usize,
    /// 1-based line number of the `// EXIT` sentinel, if one cut the payload short.
    pub stopped_at_exit: Option<usize>,
}

impl NormalizedScript {
    /// Number of top-level lines emitted.
    pub fn top_level_lines(&self) -> usize {
        self.text.matches('\n').count()
    }
}

/// What the `//` marker on a raw line means for the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction<'a> {
    /// Keep this code (already cut at the marker, if there was one).
    Keep(&'a str),
    /// Sentinel line: stop and return what has been accumulated.
    Exit,
}
