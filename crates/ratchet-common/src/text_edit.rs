//! Offset-based multi-point text insertion.
//!
//! Every insertion is positioned against the *original* text. Applying them
//! from the end of the file towards the start means an applied insertion
//! never shifts the offset of one that is still pending.

use serde::Serialize;

/// Text to insert at a byte offset of the original source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Insertion {
    pub pos: u32,
    pub text: String,
}

impl Insertion {
    pub fn new(pos: u32, text: impl Into<String>) -> Self {
        Insertion {
            pos,
            text: text.into(),
        }
    }
}

/// Sort insertions for application: descending by position.
///
/// Records at the same position are ordered by descending text so the result
/// does not depend on the order the records were collected in.
pub fn sort_for_application(insertions: &mut [Insertion]) {
    insertions.sort_by(|a, b| b.pos.cmp(&a.pos).then_with(|| b.text.cmp(&a.text)));
}

/// Apply all insertions to `source` and return the edited text.
///
/// Positions past the end of the text are clamped to the end; positions that
/// fall inside a multi-byte character are moved back to its first byte.
pub fn apply_insertions(source: &str, mut insertions: Vec<Insertion>) -> String {
    if insertions.is_empty() {
        return source.to_string();
    }

    sort_for_application(&mut insertions);

    let extra: usize = insertions.iter().map(|i| i.text.len()).sum();
    let mut out = String::with_capacity(source.len() + extra);
    out.push_str(source);

    for insertion in &insertions {
        let mut pos = (insertion.pos as usize).min(source.len());
        while !source.is_char_boundary(pos) {
            pos -= 1;
        }
        out.insert_str(pos, &insertion.text);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descending_application_keeps_offsets_valid() {
        let source = "a\nb\nc\n";
        let out = apply_insertions(
            source,
            vec![Insertion::new(0, "// 1\n"), Insertion::new(4, "// 3\n")],
        );
        assert_eq!(out, "// 1\na\nb\n// 3\nc\n");
    }

    #[test]
    fn test_application_is_independent_of_collection_order() {
        let source = "x\ny\nz\n";
        let records = vec![
            Insertion::new(2, "// b\n"),
            Insertion::new(0, "// a\n"),
            Insertion::new(2, "// c\n"),
            Insertion::new(4, "// d\n"),
        ];
        let forward = apply_insertions(source, records.clone());
        let mut reversed = records;
        reversed.reverse();
        assert_eq!(forward, apply_insertions(source, reversed));
        assert_eq!(forward, "// a\nx\n// b\n// c\ny\n// d\nz\n");
    }

    #[test]
    fn test_out_of_range_positions_are_clamped() {
        let out = apply_insertions("ab", vec![Insertion::new(10, "!")]);
        assert_eq!(out, "ab!");
        let out = apply_insertions("\u{e9}x", vec![Insertion::new(1, "|")]);
        assert_eq!(out, "|\u{e9}x");
    }

    #[test]
    fn test_no_insertions_returns_source() {
        assert_eq!(apply_insertions("same", Vec::new()), "same");
    }
}
