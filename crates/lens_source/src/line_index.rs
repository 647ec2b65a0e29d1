//! Line-start indexing for fast line lookup.

/// Borrowed text with precomputed line-start offsets.
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offsets of each line start (the first entry is always 0).
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Indexes `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            line_starts: compute_line_starts(text),
        }
    }

    /// Number of lines; a trailing newline starts one more (empty) line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the text of a 1-indexed line without its line terminator.
    pub fn line(&self, line: usize) -> Option<&'a str> {
        if line == 0 || line > self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map_or(self.text.len(), |next| next - 1);
        let raw = &self.text[start..end];
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    ///
    /// Uses binary search on the precomputed line-start offsets.
    pub fn line_col(&self, byte_offset: usize) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx as u32) + 1;
        let col = (byte_offset - self.line_starts[line_idx]) as u32 + 1;
        (line, col)
    }

    /// Converts 1-indexed (line, column) coordinates into a byte offset.
    pub fn offset(&self, line: u32, column: u32) -> Option<usize> {
        let start = *self.line_starts.get((line as usize).checked_sub(1)?)?;
        let offset = start + (column as usize).checked_sub(1)?;
        (offset <= self.text.len()).then_some(offset)
    }
}

fn compute_line_starts(content: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}
