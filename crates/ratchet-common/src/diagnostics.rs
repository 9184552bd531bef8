//! Diagnostic types shared by the collector and the insertion engines.
//!
//! The type checker reports diagnostics positioned by byte offset
//! (`Diagnostic`). The collector reshapes them into 1-indexed line/column
//! ranges (`Issue`) grouped by file (`IssuesPerFile`), which is the form both
//! insertion engines consume.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::position::SourceRange;

// =============================================================================
// Checker Diagnostics
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// A type-checking diagnostic as reported by the checker.
///
/// `file` and `start` are absent for global diagnostics (for example errors in
/// the project configuration itself).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: Option<String>,
    /// Byte offset of the first character of the affected span.
    pub start: Option<u32>,
    /// Byte length of the affected span.
    pub length: Option<u32>,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic attached to a file.
    #[must_use]
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            file: Some(file.into()),
            start: Some(start),
            length: Some(length),
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Create a diagnostic that is not attached to any source location.
    #[must_use]
    pub fn global(message: impl Into<String>, code: u32) -> Self {
        Self {
            file: None,
            start: None,
            length: None,
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// The file and start offset, when the diagnostic has both.
    pub fn location(&self) -> Option<(&str, u32)> {
        Some((self.file.as_deref()?, self.start?))
    }

    /// End offset of the affected span (`start` when there is no length).
    pub fn end(&self) -> Option<u32> {
        let start = self.start?;
        Some(start.saturating_add(self.length.unwrap_or(0)))
    }
}

// =============================================================================
// Issues (line/column form)
// =============================================================================

/// A diagnostic expressed as a 1-indexed line/column range plus its code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub code: u32,
    /// Human-readable text; never used to decide where annotations go.
    pub message: String,
}

impl Issue {
    pub fn new(range: SourceRange, code: u32, message: impl Into<String>) -> Self {
        Issue {
            start_line: range.start_line,
            start_col: range.start_col,
            end_line: range.end_line,
            end_col: range.end_col,
            code,
            message: message.into(),
        }
    }

    pub const fn range(&self) -> SourceRange {
        SourceRange {
            start_line: self.start_line,
            start_col: self.start_col,
            end_line: self.end_line,
            end_col: self.end_col,
        }
    }
}

/// Issues grouped by file path.
///
/// Files keep the order in which the checker first reported them; issues
/// within a file keep checker emission order. The file path is the only
/// deduplication key: two issues at the same range with different codes (or
/// even the same code) are both kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IssuesPerFile {
    files: IndexMap<String, Vec<Issue>>,
}

impl IssuesPerFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue to its file's list, creating the entry on first sight.
    pub fn push(&mut self, file_path: impl Into<String>, issue: Issue) {
        self.files.entry(file_path.into()).or_default().push(issue);
    }

    /// Issues recorded for `file_path`, if any.
    pub fn get(&self, file_path: &str) -> Option<&[Issue]> {
        self.files.get(file_path).map(Vec::as_slice)
    }

    /// File paths in first-seen order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Issue])> {
        self.files
            .iter()
            .map(|(path, issues)| (path.as_str(), issues.as_slice()))
    }

    /// Number of files with at least one issue.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of issues across all files.
    pub fn issue_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

impl Serialize for IssuesPerFile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct FileEntry<'a> {
            file_path: &'a str,
            issues: &'a [Issue],
        }

        serializer.collect_seq(
            self.iter()
                .map(|(file_path, issues)| FileEntry { file_path, issues }),
        )
    }
}

/// Result of one collector run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedDiagnostics {
    /// Every diagnostic that had both a file and a start position.
    pub total_issues: usize,
    pub issues_per_file: IssuesPerFile,
}

impl ReducedDiagnostics {
    /// Files with at least one issue, in first-seen order.
    pub fn paths(&self) -> Vec<String> {
        self.issues_per_file.paths().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(line: u32, code: u32) -> Issue {
        Issue::new(SourceRange::new(line, 1, line, 5), code, "msg")
    }

    #[test]
    fn test_issues_per_file_groups_by_path_in_first_seen_order() {
        let mut issues = IssuesPerFile::new();
        issues.push("b.ts", issue(1, 2322));
        issues.push("a.ts", issue(2, 2345));
        issues.push("b.ts", issue(3, 2322));

        assert_eq!(issues.paths().collect::<Vec<_>>(), vec!["b.ts", "a.ts"]);
        assert_eq!(issues.get("b.ts").unwrap().len(), 2);
        assert_eq!(issues.issue_count(), 3);
    }

    #[test]
    fn test_same_range_different_codes_are_both_kept() {
        let mut issues = IssuesPerFile::new();
        issues.push("a.ts", issue(1, 2322));
        issues.push("a.ts", issue(1, 2454));

        let codes: Vec<u32> = issues.get("a.ts").unwrap().iter().map(|i| i.code).collect();
        assert_eq!(codes, vec![2322, 2454]);
    }

    #[test]
    fn test_diagnostic_end_defaults_to_start() {
        let mut diag = Diagnostic::error("a.ts", 10, 4, "msg", 2322);
        assert_eq!(diag.end(), Some(14));
        diag.length = None;
        assert_eq!(diag.end(), Some(10));
        assert_eq!(Diagnostic::global("msg", 5023).location(), None);
    }

    #[test]
    fn test_issues_per_file_serializes_as_file_entries() {
        let mut issues = IssuesPerFile::new();
        issues.push("a.ts", issue(1, 2322));
        let json = serde_json::to_value(&issues).unwrap();
        assert_eq!(json[0]["filePath"], "a.ts");
        assert_eq!(json[0]["issues"][0]["startLine"], 1);
        assert_eq!(json[0]["issues"][0]["code"], 2322);
    }
}
