use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use ratchet_common::Diagnostic;
use ratchet_engine::{OffsetOutput, Project, StructuralSummary, TypeChecker};

use super::args::CliArgs;
use super::driver::{RunOutcome, run};

/// Reports every `BAD` as TS2322 unless the previous line suppresses it.
struct MarkerChecker;

impl TypeChecker for MarkerChecker {
    fn check(&self, project: &Project) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        for path in &project.file_names {
            let text = fs::read_to_string(path)?;
            let file = path.to_string_lossy().into_owned();
            let mut offset = 0;
            let mut previous = "";
            for line in text.split_inclusive('\n') {
                if !previous.contains("@ts-expect-error") {
                    for (col, _) in line.match_indices("BAD") {
                        let start = (offset + col) as u32;
                        diagnostics.push(Diagnostic::error(&file, start, 3, "BAD is not allowed", 2322));
                    }
                }
                offset += line.len();
                previous = line;
            }
        }
        Ok(diagnostics)
    }
}

struct FailingChecker;

impl TypeChecker for FailingChecker {
    fn check(&self, _project: &Project) -> Result<Vec<Diagnostic>> {
        bail!("tsc exited with status 3")
    }
}

fn project_with(root: &Path, source: &str) {
    fs::write(root.join("tsconfig.json"), "{}").unwrap();
    fs::write(root.join("a.ts"), source).unwrap();
}

fn run_with(
    root: &Path,
    flags: &[&str],
    checker: Arc<dyn TypeChecker>,
    answers: &str,
) -> (Result<RunOutcome>, String) {
    let mut argv = vec!["ts-ratchet"];
    argv.extend_from_slice(flags);
    let args = CliArgs::try_parse_from(argv).unwrap();
    let mut input = Cursor::new(answers.as_bytes().to_vec());
    let mut output = Vec::new();
    let outcome = run(&args, root, checker, false, &mut input, &mut output);
    (outcome, String::from_utf8(output).unwrap())
}

#[test]
fn annotates_without_prompt_when_yes() {
    let dir = tempfile::tempdir().unwrap();
    project_with(dir.path(), "let value = BAD;\n");

    let (outcome, output) = run_with(dir.path(), &["--yes"], Arc::new(MarkerChecker), "");

    assert_eq!(
        outcome.unwrap(),
        RunOutcome::Completed {
            structural: Some(StructuralSummary {
                ok: 1,
                nochange: 0,
                skip: 0,
                error: 0
            }),
            offset: Some(OffsetOutput {
                files_modified: 0,
                issues: 0
            }),
        }
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("a.ts")).unwrap(),
        "let value = // @ts-expect-error ratchet TS2322 (jscodeshift)\nBAD;\n"
    );
    assert!(output.contains("✔ Setup Project\n  ↳ Found tsconfig.json at "));
    assert!(output.contains("✔ Typecheck\n  ↳ Found 1 issue in 1 file\n"));
    assert!(output.contains("✔ Structural pass\n  ↳ 1 file was successfully modified.\n"));
    assert!(output.contains("✔ Offset pass\n  ↳ Modified 0 files for 0 issues left.\n"));
    assert!(output.contains("please review the changes before committing"));
    assert!(!output.contains("(y/N)"));
}

#[test]
fn declining_the_prompt_leaves_files_untouched() {
    let dir = tempfile::tempdir().unwrap();
    project_with(dir.path(), "let value = BAD;\n");

    let (outcome, output) = run_with(dir.path(), &[], Arc::new(MarkerChecker), "n\n");

    assert_eq!(outcome.unwrap(), RunOutcome::Declined);
    assert_eq!(
        fs::read_to_string(dir.path().join("a.ts")).unwrap(),
        "let value = BAD;\n"
    );
    assert!(output.contains("committed to version control"));
    assert!(output.contains("Insert @ts-expect-error for 1 issue in 1 file? (y/N) "));
    assert!(!output.contains("Structural pass"));
}

#[test]
fn confirming_the_prompt_runs_both_passes() {
    let dir = tempfile::tempdir().unwrap();
    project_with(dir.path(), "let value = BAD;\n");

    let (outcome, _) = run_with(dir.path(), &[], Arc::new(MarkerChecker), "y\n");

    assert!(matches!(outcome.unwrap(), RunOutcome::Completed { .. }));
    assert!(
        fs::read_to_string(dir.path().join("a.ts"))
            .unwrap()
            .contains("@ts-expect-error ratchet TS2322")
    );
}

#[test]
fn offset_pass_alone_annotates_above_the_line() {
    let dir = tempfile::tempdir().unwrap();
    project_with(dir.path(), "function f() {\n  return BAD;\n}\n");

    let (outcome, output) = run_with(
        dir.path(),
        &["-y", "--no-structural"],
        Arc::new(MarkerChecker),
        "",
    );

    assert_eq!(
        outcome.unwrap(),
        RunOutcome::Completed {
            structural: None,
            offset: Some(OffsetOutput {
                files_modified: 1,
                issues: 1
            }),
        }
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("a.ts")).unwrap(),
        "function f() {\n  // @ts-expect-error ratchet TS2322 (ts-morph)\n  return BAD;\n}\n"
    );
    assert!(!output.contains("Structural pass"));
}

#[test]
fn dry_run_lists_issues_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    project_with(dir.path(), "let value = BAD;\n");

    let (outcome, output) = run_with(dir.path(), &["--dry-run"], Arc::new(MarkerChecker), "");

    let RunOutcome::DryRun(reduced) = outcome.unwrap() else {
        panic!("expected a dry run");
    };
    assert_eq!(reduced.total_issues, 1);
    assert!(output.contains("a.ts:1:13 - TS2322: BAD is not allowed\n"));
    assert_eq!(
        fs::read_to_string(dir.path().join("a.ts")).unwrap(),
        "let value = BAD;\n"
    );
}

#[test]
fn dry_run_json_serializes_collected_issues() {
    let dir = tempfile::tempdir().unwrap();
    project_with(dir.path(), "let value = BAD;\n");

    let (outcome, output) = run_with(
        dir.path(),
        &["--dry-run", "--json"],
        Arc::new(MarkerChecker),
        "",
    );
    assert!(matches!(outcome.unwrap(), RunOutcome::DryRun(_)));

    let json_start = output.find('{').unwrap();
    let value: serde_json::Value = serde_json::from_str(&output[json_start..]).unwrap();
    assert_eq!(value["totalIssues"], 1);
    let issue = &value["issuesPerFile"][0]["issues"][0];
    assert_eq!(issue["startLine"], 1);
    assert_eq!(issue["startCol"], 13);
    assert_eq!(issue["endCol"], 16);
    assert_eq!(issue["code"], 2322);
}

#[test]
fn clean_project_stops_after_typecheck() {
    let dir = tempfile::tempdir().unwrap();
    project_with(dir.path(), "let value = 1;\n");

    let (outcome, output) = run_with(dir.path(), &[], Arc::new(MarkerChecker), "");

    assert_eq!(outcome.unwrap(), RunOutcome::NoIssues);
    assert!(output.contains("Found 0 issues in 0 files"));
    assert!(!output.contains("(y/N)"));
}

#[test]
fn missing_tsconfig_fails_setup() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("nowhere");
    let missing = missing.to_string_lossy().into_owned();
    let (outcome, output) = run_with(
        dir.path(),
        &["--project", &missing],
        Arc::new(MarkerChecker),
        "",
    );

    assert!(outcome.is_err());
    assert!(output.starts_with("✕ Setup Project\n"));
}

#[test]
fn checker_failure_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    project_with(dir.path(), "let value = BAD;\n");

    let (outcome, output) = run_with(dir.path(), &["-y"], Arc::new(FailingChecker), "");

    let err = outcome.unwrap_err();
    assert!(format!("{err:#}").contains("tsc exited with status 3"));
    assert!(output.contains("✕ Typecheck\n"));
    assert_eq!(
        fs::read_to_string(dir.path().join("a.ts")).unwrap(),
        "let value = BAD;\n"
    );
}
