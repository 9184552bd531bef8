//! Reading `tsc --pretty` reports.
//!
//! A pretty diagnostic looks like:
//!
//! ```text
//! src/a.ts:3:7 - error TS2322: Type 'string' is not assignable to type 'number'.
//!
//! 3 const x: number = "a";
//!         ~
//! ```
//!
//! The header gives the start; the `~` underline of the last snippet line gives
//! the end. Snippets of long spans elide middle lines with `...` but always
//! show the last one. Related-information blocks and the trailing summary are
//! ignored.

use std::path::Path;

use once_cell::sync::Lazy;
use ratchet_common::{Diagnostic, DiagnosticCategory, LineMap, Position};
use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::trace;

/// A diagnostic as printed by tsc, positioned by 0-indexed line and UTF-16
/// column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportedDiagnostic {
    pub file: Option<String>,
    pub start: Option<Position>,
    pub end: Option<Position>,
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message: String,
}

const CATEGORIES: &[(&str, DiagnosticCategory)] = &[
    ("error", DiagnosticCategory::Error),
    ("warning", DiagnosticCategory::Warning),
    ("suggestion", DiagnosticCategory::Suggestion),
    ("message", DiagnosticCategory::Message),
];

static FILE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+):(\d+):(\d+) - (error|warning|suggestion|message) TS(\d+): (.*)$").unwrap()
});

static GLOBAL_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(error|warning|suggestion|message) TS(\d+): (.*)$").unwrap());

/// Drop ANSI escape sequences (`ESC [ ... final`).
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\u{1b}' {
            out.push(ch);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            for next in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&next) {
                    break;
                }
            }
        }
    }
    out
}

// =============================================================================
// Report parsing
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
enum Section {
    /// Header and indented message continuation lines.
    Message,
    /// The code snippet after the first blank line.
    Snippet,
    /// Related information and anything else up to the next header.
    Trailer,
}

struct Pending {
    diagnostic: ReportedDiagnostic,
    section: Section,
    gutter_width: Option<usize>,
    snippet_line: Option<u32>,
    /// A numbered line was read and its underline row has not been.
    awaiting_underline: bool,
}

impl Pending {
    fn finish(mut self) -> ReportedDiagnostic {
        if self.diagnostic.end.is_none() {
            self.diagnostic.end = self.diagnostic.start;
        }
        self.diagnostic
    }

    /// Feed one snippet line; returns false when the line is not part of a
    /// snippet.
    fn snippet_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
        let after_digits = &trimmed[digits..];
        if digits > 0 && (after_digits.is_empty() || after_digits.starts_with(' ')) {
            self.gutter_width = Some(line.len() - trimmed.len() + digits);
            self.snippet_line = trimmed[..digits].parse::<u32>().ok();
            self.awaiting_underline = true;
            return true;
        }

        let Some(gutter_width) = self.gutter_width else {
            return false;
        };
        if trimmed.starts_with("...") {
            self.awaiting_underline = false;
            return true;
        }

        // Underline row: gutter, separator, then spaces and `~`. An empty
        // source line gets a row of spaces, possibly trimmed away.
        let underline = line.get(gutter_width + 1..).unwrap_or("");
        if !underline.chars().all(|ch| ch == ' ' || ch == '~') {
            return false;
        }
        self.awaiting_underline = false;
        let Some(line_number) = self.snippet_line else {
            return true;
        };
        let line_index = line_number.saturating_sub(1);
        let start = self.diagnostic.start;
        self.diagnostic.end = match underline.rfind('~') {
            Some(last) => Some(Position::new(line_index, last as u32 + 1)),
            None if start.is_some_and(|start| start.line == line_index) => start,
            None => Some(Position::new(line_index, 0)),
        };
        true
    }
}

/// Parse every diagnostic in a (colour-stripped) pretty report.
pub fn parse_pretty_report(report: &str) -> Vec<ReportedDiagnostic> {
    let mut diagnostics = Vec::new();
    let mut pending: Option<Pending> = None;

    for line in report.lines() {
        if let Some(current) = pending.as_mut() {
            match current.section {
                Section::Message => {
                    if line.trim().is_empty() {
                        current.section = if current.diagnostic.file.is_some() {
                            Section::Snippet
                        } else {
                            Section::Trailer
                        };
                    } else {
                        current.diagnostic.message.push('\n');
                        current.diagnostic.message.push_str(line);
                    }
                    continue;
                }
                Section::Snippet => {
                    if line.trim().is_empty() && !current.awaiting_underline {
                        if current.gutter_width.is_some() {
                            current.section = Section::Trailer;
                        }
                        continue;
                    }
                    if current.snippet_line(line) {
                        continue;
                    }
                    current.section = Section::Trailer;
                }
                Section::Trailer => {}
            }
        }

        if let Some(diagnostic) = parse_header(line) {
            trace!(code = diagnostic.code, file = ?diagnostic.file, "tsc diagnostic");
            if let Some(done) = pending.take() {
                diagnostics.push(done.finish());
            }
            pending = Some(Pending {
                diagnostic,
                section: Section::Message,
                gutter_width: None,
                snippet_line: None,
                awaiting_underline: false,
            });
        }
    }

    if let Some(done) = pending.take() {
        diagnostics.push(done.finish());
    }
    diagnostics
}

/// `file:line:col - error TS1234: message` or `error TS1234: message`.
fn parse_header(line: &str) -> Option<ReportedDiagnostic> {
    if let Some(caps) = GLOBAL_HEADER_RE.captures(line) {
        return Some(ReportedDiagnostic {
            file: None,
            start: None,
            end: None,
            category: category_from_label(&caps[1])?,
            code: caps[2].parse().ok()?,
            message: caps[3].to_string(),
        });
    }

    let caps = FILE_HEADER_RE.captures(line)?;
    let line_number = caps[2].parse::<u32>().ok()?;
    let col = caps[3].parse::<u32>().ok()?;
    Some(ReportedDiagnostic {
        file: Some(caps[1].to_string()),
        start: Some(Position::new(
            line_number.checked_sub(1)?,
            col.checked_sub(1)?,
        )),
        end: None,
        category: category_from_label(&caps[4])?,
        code: caps[5].parse().ok()?,
        message: caps[6].to_string(),
    })
}

fn category_from_label(label: &str) -> Option<DiagnosticCategory> {
    CATEGORIES
        .iter()
        .find(|(name, _)| *name == label)
        .map(|&(_, category)| category)
}

// =============================================================================
// Offsets
// =============================================================================

/// Resolve reported positions to byte offsets. Paths are taken relative to
/// `root_dir`, where tsc ran. A position that cannot be resolved in the file
/// leaves the diagnostic without a start.
pub fn resolve_offsets(
    reported: Vec<ReportedDiagnostic>,
    root_dir: &Path,
    mut read_source: impl FnMut(&Path) -> Option<String>,
) -> Vec<Diagnostic> {
    let mut sources: FxHashMap<String, Option<(String, LineMap)>> = FxHashMap::default();

    reported
        .into_iter()
        .map(|reported| {
            let Some(file) = reported.file else {
                return Diagnostic {
                    category: reported.category,
                    ..Diagnostic::global(reported.message, reported.code)
                };
            };
            let path = crate::project::normalize_path(&root_dir.join(&file));
            let file_name = path.to_string_lossy().into_owned();

            let source = sources
                .entry(file_name.clone())
                .or_insert_with(|| {
                    read_source(&path).map(|text| {
                        let line_map = LineMap::build(&text);
                        (text, line_map)
                    })
                })
                .as_ref();

            let span = source.and_then(|(text, line_map)| {
                let start = line_map.position_to_offset(reported.start?, text)?;
                let end = reported
                    .end
                    .and_then(|end| line_map.position_to_offset(end, text))
                    .unwrap_or(start);
                Some((start, end.max(start) - start))
            });

            Diagnostic {
                file: Some(file_name),
                start: span.map(|(start, _)| start),
                length: span.map(|(_, length)| length),
                message_text: reported.message,
                category: reported.category,
                code: reported.code,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const REPORT: &str = "\
src/a.ts:3:7 - error TS2322: Type 'string' is not assignable to type 'number'.

3 const x: number = \"a\";
        ~

src/b.tsx:9:5 - error TS2345: Argument of type 'A' is not assignable to parameter of type 'B'.
  Property 'b' is missing in type 'A' but required in type 'B'.

 9     call(first,
       ~~~~~~~~~~~
10       second);
   ~~~~~~~~~~~~~

  src/b.tsx:2:3
    2   b: string;
        ~
    'b' is declared here.

error TS5023: Unknown compiler option 'strictest'.

Found 3 errors in 2 files.

Errors  Files
     1  src/a.ts:3
     1  src/b.tsx:9
";

    #[test]
    fn test_strip_ansi_removes_color_codes() {
        let colored = "\u{1b}[96msrc/a.ts\u{1b}[0m:\u{1b}[93m3\u{1b}[0m:\u{1b}[93m7\u{1b}[0m - \u{1b}[91merror\u{1b}[0m";
        assert_eq!(strip_ansi(colored), "src/a.ts:3:7 - error");
    }

    #[test]
    fn test_parse_pretty_report_headers_and_spans() {
        let diagnostics = parse_pretty_report(REPORT);
        assert_eq!(diagnostics.len(), 3);

        let first = &diagnostics[0];
        assert_eq!(first.file.as_deref(), Some("src/a.ts"));
        assert_eq!(first.code, 2322);
        assert_eq!(first.start, Some(Position::new(2, 6)));
        assert_eq!(first.end, Some(Position::new(2, 7)));

        let second = &diagnostics[1];
        assert_eq!(second.code, 2345);
        assert_eq!(
            second.message,
            "Argument of type 'A' is not assignable to parameter of type 'B'.\n  Property 'b' is missing in type 'A' but required in type 'B'."
        );
        assert_eq!(second.start, Some(Position::new(8, 4)));
        assert_eq!(second.end, Some(Position::new(9, 13)));

        let global = &diagnostics[2];
        assert_eq!(global.file, None);
        assert_eq!(global.code, 5023);
        assert_eq!(global.start, None);
    }

    #[test]
    fn test_header_with_windows_drive_path() {
        let diagnostic =
            parse_header("C:/work/app/src/a.ts:12:1 - warning TS6133: 'x' is declared but never used.")
                .unwrap();
        assert_eq!(diagnostic.file.as_deref(), Some("C:/work/app/src/a.ts"));
        assert_eq!(diagnostic.category, DiagnosticCategory::Warning);
        assert_eq!(diagnostic.start, Some(Position::new(11, 0)));
    }

    #[test]
    fn test_summary_lines_are_not_headers() {
        assert!(parse_header("Found 1 error in src/a.ts:3").is_none());
        assert!(parse_header("     1  src/a.ts:3").is_none());
    }

    #[test]
    fn test_header_message_may_contain_colons() {
        let diagnostic = parse_header(
            "src/a.ts:1:1 - error TS2307: Cannot find module 'node:fs' or its corresponding type declarations.",
        )
        .unwrap();
        assert_eq!(diagnostic.code, 2307);
        assert_eq!(
            diagnostic.message,
            "Cannot find module 'node:fs' or its corresponding type declarations."
        );
    }

    #[test]
    fn test_header_needs_known_category_and_code() {
        assert!(parse_header("src/a.ts:1:1 - fatal TS1000: boom").is_none());
        assert!(parse_header("src/a.ts:1:1 - error TSX: boom").is_none());
        assert!(parse_header("src/a.ts:0:1 - error TS1000: boom").is_none());
        assert!(parse_header("  error TS5023: indented").is_none());
    }

    #[test]
    fn test_span_across_empty_line_keeps_last_underline() {
        let report = "\
src/c.ts:1:7 - error TS2322: Type 'string' is not assignable to type 'number'.

1 const x: number = [
        ~~~~~~~~~~~~~
2 \n  \n3   \"abc\"];
  ~~~~~~~~

Found 1 error in src/c.ts:1
";
        let diagnostics = parse_pretty_report(report);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].start, Some(Position::new(0, 6)));
        assert_eq!(diagnostics[0].end, Some(Position::new(2, 8)));
    }

    #[test]
    fn test_span_across_trimmed_empty_line() {
        let report = "\
src/c.ts:1:7 - error TS2322: Type 'string' is not assignable to type 'number'.

1 const x: number = [
        ~~~~~~~~~~~~~
2
\n3   \"abc\"];
  ~~~~~~~~
";
        let diagnostics = parse_pretty_report(report);
        assert_eq!(diagnostics[0].end, Some(Position::new(2, 8)));
    }

    #[test]
    fn test_resolve_offsets_uses_file_text() {
        let reported = parse_pretty_report(REPORT);
        let root = PathBuf::from("/project");
        let diagnostics = resolve_offsets(reported, &root, |path| {
            match path.to_str()? {
                "/project/src/a.ts" => Some("let a = 1;\nlet b = 2;\nconst x: number = \"a\";\n".to_string()),
                _ => None,
            }
        });

        let first = &diagnostics[0];
        assert_eq!(first.file.as_deref(), Some("/project/src/a.ts"));
        assert_eq!(first.start, Some(28));
        assert_eq!(first.length, Some(1));

        // Unreadable file: kept, but without a position
        assert_eq!(diagnostics[1].file.as_deref(), Some("/project/src/b.tsx"));
        assert_eq!(diagnostics[1].start, None);

        assert_eq!(diagnostics[2].location(), None);
    }
}
