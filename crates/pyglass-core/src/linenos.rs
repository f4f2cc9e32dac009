//! Byte-offset to line-number mapping for parsed sources.

use rustpython_parser::text_size::TextSize;

/// Precomputed line starts for one source file. Lines are 1-based; both
/// ends of an entity's range land on real lines of the file.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line containing the byte `offset`.
    pub fn line_of(&self, offset: TextSize) -> usize {
        let offset = u32::from(offset);
        match self.line_starts.binary_search(&offset) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    /// 1-based line for an end offset: an exclusive range ending exactly at
    /// a line start still belongs to the previous line.
    pub fn end_line_of(&self, offset: TextSize) -> usize {
        let offset = u32::from(offset);
        if offset == 0 {
            return 1;
        }
        match self.line_starts.binary_search(&(offset - 1)) {
            Ok(index) => index + 1,
            Err(index) => index,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of_offsets() {
        let index = LineIndex::new("one\ntwo\nthree\n");
        assert_eq!(index.line_of(TextSize::from(0)), 1);
        assert_eq!(index.line_of(TextSize::from(3)), 1);
        assert_eq!(index.line_of(TextSize::from(4)), 2);
        assert_eq!(index.line_of(TextSize::from(8)), 3);
    }

    #[test]
    fn test_end_line_of_newline_boundary() {
        let index = LineIndex::new("one\ntwo\n");
        // An end offset sitting right after "one\n" is still line 1.
        assert_eq!(index.end_line_of(TextSize::from(4)), 1);
        assert_eq!(index.end_line_of(TextSize::from(7)), 2);
    }

    #[test]
    fn test_empty_source() {
        let index = LineIndex::new("");
        assert_eq!(index.line_of(TextSize::from(0)), 1);
        assert_eq!(index.line_count(), 1);
    }
}
