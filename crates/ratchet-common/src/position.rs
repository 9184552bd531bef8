//! Position and location utilities.
//!
//! The checker and the parser both work in byte offsets, while issues are
//! matched by 1-indexed line and column. Columns are counted in UTF-16 code
//! units, the unit TypeScript itself reports.

use serde::{Deserialize, Serialize};

/// A position in a source file (0-indexed line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (UTF-16 code units)
    pub character: u32,
}

impl Position {
    pub const fn new(line: u32, character: u32) -> Self {
        Position { line, character }
    }
}

/// A 1-indexed line/column range, the unit in which issues and syntax nodes
/// are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SourceRange {
    pub const fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        SourceRange {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Build the range covering the byte span `start..end` of `source`.
    pub fn from_offsets(line_map: &LineMap, source: &str, start: u32, end: u32) -> Self {
        let start = line_map.offset_to_position(start, source);
        let end = line_map.offset_to_position(end, source);
        SourceRange {
            start_line: start.line + 1,
            start_col: start.character + 1,
            end_line: end.line + 1,
            end_col: end.character + 1,
        }
    }
}

/// Line map for efficient offset <-> position conversion.
/// Stores the starting offset of each line.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Starting offset of each line (line_starts[0] is always 0)
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map from source text. Line terminators are `\n`, `\r`,
    /// `\r\n`, U+2028 and U+2029, as in ECMAScript.
    pub fn build(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = vec![0u32];

        // 0xE2 leads the UTF-8 encoding of both separators (E2 80 A8/A9)
        for i in memchr::memchr3_iter(b'\n', b'\r', 0xE2, bytes) {
            let next = match bytes[i] {
                // \r\n counts once: the \n creates the line start
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => continue,
                b'\n' | b'\r' => i + 1,
                _ if matches!(bytes.get(i + 1..i + 3), Some([0x80, 0xA8 | 0xA9])) => i + 3,
                _ => continue,
            };
            line_starts.push(next as u32);
        }

        LineMap { line_starts }
    }

    /// Convert a byte offset to a Position (line, character).
    pub fn offset_to_position(&self, offset: u32, source: &str) -> Position {
        let line = self.line_of(offset);
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let clamped_end = (offset as usize).min(source.len());
        let start = (line_start as usize).min(clamped_end);
        let slice = source.get(start..clamped_end).unwrap_or("");
        let character = slice.chars().map(|ch| ch.len_utf16() as u32).sum();

        Position {
            line: line as u32,
            character,
        }
    }

    /// Convert a Position (line, character) to a byte offset.
    pub fn position_to_offset(&self, position: Position, source: &str) -> Option<u32> {
        let line_idx = position.line as usize;
        let line_start = *self.line_starts.get(line_idx)?;
        let line_limit = if line_idx + 1 < self.line_starts.len() {
            self.line_starts[line_idx + 1]
        } else {
            source.len() as u32
        };
        let slice = source
            .get(line_start as usize..line_limit as usize)
            .unwrap_or("");
        let mut utf16_count = 0u32;
        let mut byte_count = 0u32;

        for ch in slice.chars() {
            if utf16_count >= position.character || is_line_break(ch) {
                break;
            }
            utf16_count += ch.len_utf16() as u32;
            byte_count += ch.len_utf8() as u32;
        }

        Some(line_start + byte_count)
    }

    /// 0-indexed line containing `offset`.
    pub fn line_of(&self, offset: u32) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_point) => insert_point.saturating_sub(1),
        }
    }

    /// Starting offset of the line containing `offset`.
    pub fn line_start_of(&self, offset: u32) -> u32 {
        self.line_starts
            .get(self.line_of(offset))
            .copied()
            .unwrap_or(0)
    }

    /// Leading spaces and tabs of the line containing `offset`.
    pub fn indentation_of<'a>(&self, offset: u32, source: &'a str) -> &'a str {
        let start = (self.line_start_of(offset) as usize).min(source.len());
        let rest = &source[start..];
        let width = rest
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        &rest[..width]
    }
}

fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[cfg(test)]
mod position_tests {
    use super::*;

    #[test]
    fn test_line_map_simple() {
        let source = "line1\nline2\nline3";
        let map = LineMap::build(source);

        assert_eq!(map.line_start_of(14), 12);
        assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
        assert_eq!(map.offset_to_position(4, source), Position::new(0, 4));
        assert_eq!(map.offset_to_position(6, source), Position::new(1, 0));
        assert_eq!(map.offset_to_position(12, source), Position::new(2, 0));
    }

    #[test]
    fn test_line_map_windows_line_endings() {
        let source = "line1\r\nline2\r\nline3";
        let map = LineMap::build(source);

        assert_eq!(map.line_start_of(16), 14);
        assert_eq!(map.offset_to_position(7, source), Position::new(1, 0));
    }

    #[test]
    fn test_line_map_unicode_separators() {
        let source = "let a = 1;\u{2028}let b = 2;\u{2029}let c = 3;";
        let map = LineMap::build(source);

        let b = source.find("let b").unwrap() as u32;
        let c = source.find("let c").unwrap() as u32;
        assert_eq!(map.offset_to_position(b, source), Position::new(1, 0));
        assert_eq!(map.offset_to_position(c + 4, source), Position::new(2, 4));
        assert_eq!(map.position_to_offset(Position::new(2, 0), source), Some(c));
        // A column past the end of line 0 stops before the separator
        assert_eq!(map.position_to_offset(Position::new(0, 40), source), Some(10));
    }

    #[test]
    fn test_non_separator_e2_sequences_are_not_line_breaks() {
        // U+2026 (E2 80 A6) and U+20AC (E2 82 AC)
        let source = "a\u{2026}b\u{20AC}c";
        let map = LineMap::build(source);
        assert_eq!(map.line_of(source.len() as u32 - 1), 0);
    }

    #[test]
    fn test_position_to_offset_roundtrip() {
        let source = "const x = 1;\nlet y = 2;\nvar z = 3;";
        let map = LineMap::build(source);

        for offset in 0..source.len() as u32 {
            let pos = map.offset_to_position(offset, source);
            let back = map.position_to_offset(pos, source).unwrap();
            assert_eq!(offset, back, "roundtrip failed for offset {}", offset);
        }
    }

    #[test]
    fn test_utf16_columns() {
        let source = "A \u{1F680} B";
        let map = LineMap::build(source);

        assert_eq!(map.offset_to_position(2, source).character, 2);
        assert_eq!(map.offset_to_position(7, source).character, 5);
        assert_eq!(
            map.position_to_offset(Position::new(0, 5), source),
            Some(7)
        );
    }

    #[test]
    fn test_source_range_is_one_indexed() {
        let source = "const x: number = \"a\";\n";
        let map = LineMap::build(source);
        let range = SourceRange::from_offsets(&map, source, 6, 7);
        assert_eq!(range, SourceRange::new(1, 7, 1, 8));
        assert_eq!(map.position_to_offset(Position::new(0, 6), source), Some(6));
    }

    #[test]
    fn test_indentation_of_line() {
        let source = "function f() {\n  \tlet y = 2;\n}";
        let map = LineMap::build(source);
        let offset = source.find("let").unwrap() as u32;
        assert_eq!(map.line_start_of(offset), 15);
        assert_eq!(map.indentation_of(offset, source), "  \t");
        assert_eq!(map.indentation_of(0, source), "");
    }
}
