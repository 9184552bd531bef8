use ratchet_common::{Issue, IssuesPerFile, ReducedDiagnostics, SourceRange};
use ratchet_engine::StructuralSummary;

use super::reporter::{Reporter, offset_message, structural_summary_message, typecheck_message};

fn summary(ok: usize, nochange: usize, skip: usize, error: usize) -> StructuralSummary {
    StructuralSummary {
        ok,
        nochange,
        skip,
        error,
    }
}

fn reduced() -> ReducedDiagnostics {
    let mut issues_per_file = IssuesPerFile::new();
    issues_per_file.push(
        "src/a.ts",
        Issue::new(SourceRange::new(2, 9, 2, 10), 2322, "Type 'number' is not assignable to type 'string'."),
    );
    issues_per_file.push(
        "src/a.ts",
        Issue::new(SourceRange::new(5, 1, 5, 4), 2304, "Cannot find name 'foo'."),
    );
    issues_per_file.push(
        "src/b.tsx",
        Issue::new(SourceRange::new(1, 7, 1, 12), 2741, "Property 'id' is missing."),
    );
    ReducedDiagnostics {
        total_issues: 3,
        issues_per_file,
    }
}

#[test]
fn step_lines_without_color() {
    let reporter = Reporter::new(false);

    assert_eq!(
        reporter.step_ok("Setup Project", "Found tsconfig.json at /p/tsconfig.json"),
        "✔ Setup Project\n  ↳ Found tsconfig.json at /p/tsconfig.json\n"
    );
    assert_eq!(
        reporter.step_failed("Typecheck", "tsc exited with status 3"),
        "✕ Typecheck\n  ↳ tsc exited with status 3\n"
    );
}

#[test]
fn colored_step_line_keeps_text() {
    colored::control::set_override(true);
    let line = Reporter::new(true).step_ok("Offset pass", "done");
    assert!(line.contains("Offset pass"));
    assert!(line.contains("done"));
    assert!(line.contains('\u{1b}'));
}

#[test]
fn typecheck_message_counts_issues_and_files() {
    assert_eq!(typecheck_message(&reduced()), "Found 3 issues in 2 files");

    let mut single = IssuesPerFile::new();
    single.push("a.ts", Issue::new(SourceRange::new(1, 1, 1, 2), 2304, "x"));
    let one = ReducedDiagnostics {
        total_issues: 1,
        issues_per_file: single,
    };
    assert_eq!(typecheck_message(&one), "Found 1 issue in 1 file");
}

#[test]
fn structural_summary_lists_every_non_empty_part() {
    assert_eq!(
        structural_summary_message(&summary(3, 1, 1, 2)),
        "3 files were successfully modified. 2 files were skipped. 2 modifications failed."
    );
}

#[test]
fn structural_summary_omits_empty_parts() {
    assert_eq!(
        structural_summary_message(&summary(1, 0, 0, 0)),
        "1 file was successfully modified."
    );
    assert_eq!(
        structural_summary_message(&summary(0, 2, 0, 1)),
        "2 files were skipped. 1 modification failed."
    );
    assert_eq!(
        structural_summary_message(&summary(0, 0, 0, 0)),
        "No files were modified."
    );
}

#[test]
fn offset_message_counts() {
    assert_eq!(offset_message(2, 5), "Modified 2 files for 5 issues left.");
    assert_eq!(offset_message(1, 1), "Modified 1 file for 1 issue left.");
    assert_eq!(offset_message(0, 0), "Modified 0 files for 0 issues left.");
}

#[test]
fn render_issues_lists_each_issue_with_location() {
    let rendered = Reporter::new(false).render_issues(&reduced());
    assert_eq!(
        rendered,
        "src/a.ts:2:9 - TS2322: Type 'number' is not assignable to type 'string'.\n\
         src/a.ts:5:1 - TS2304: Cannot find name 'foo'.\n\
         src/b.tsx:1:7 - TS2741: Property 'id' is missing.\n"
    );
}
