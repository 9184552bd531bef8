//! End-to-end runs of the annotation pipeline against an in-process checker.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use ratchet_common::Diagnostic;
use ratchet_engine::{
    OffsetOutput, Project, StructuralSummary, TypeChecker, collect_in_worker, run_offset_pass_in_worker,
    run_structural_pass,
};

/// Reports every `BAD` (TS2322) and every `OOPS(` (TS2554) unless the
/// previous line carries a `@ts-expect-error` directive, the way tsc honours
/// suppressions.
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
                    for (col, _) in line.match_indices("OOPS(") {
                        let start = (offset + col) as u32;
                        diagnostics.push(Diagnostic::error(&file, start, 5, "Expected 0 arguments", 2554));
                    }
                }
                offset += line.len();
                previous = line;
            }
        }
        diagnostics.push(Diagnostic::global("Option 'x' is deprecated", 5101));
        Ok(diagnostics)
    }
}

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

#[test]
fn test_pipeline_converges_to_a_clean_check() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("tsconfig.json"),
        r#"{ "compilerOptions": { "strict": true, "jsx": "preserve" }, "include": ["src"] }"#,
    );
    write(
        &root.join("src/a.ts"),
        "export function f() {\n  const x = BAD;\n  return OOPS(1);\n}\n",
    );
    write(
        &root.join("src/view.tsx"),
        "export const View = () => (\n  <main>\n    <Item value={BAD} />\n  </main>\n);\n",
    );
    write(&root.join("src/clean.ts"), "export const ok = 1;\n");

    let project = Project::load(&root.join("tsconfig.json")).unwrap();
    let checker: Arc<dyn TypeChecker> = Arc::new(MarkerChecker);

    let reduced = collect_in_worker(&project, checker.clone()).unwrap();
    assert_eq!(reduced.total_issues, 3);
    assert_eq!(reduced.paths().len(), 2);

    let summary = run_structural_pass(&reduced.paths(), &reduced.issues_per_file).unwrap();
    assert_eq!(
        summary,
        StructuralSummary {
            ok: 2,
            nochange: 0,
            skip: 0,
            error: 0
        }
    );

    let a_path = project.root_dir.join("src/a.ts");
    assert_eq!(
        fs::read_to_string(&a_path).unwrap(),
        "export function f() {\n  const x = // @ts-expect-error ratchet TS2322 (jscodeshift)\n  BAD;\n  return OOPS(1);\n}\n"
    );
    assert_eq!(
        fs::read_to_string(project.root_dir.join("src/view.tsx")).unwrap(),
        "export const View = () => (\n  <main>\n    <Item value={// @ts-expect-error ratchet TS2322 (jscodeshift)\n    BAD} />\n  </main>\n);\n"
    );

    // Only the call the structural pass could not match is left
    let output = run_offset_pass_in_worker(&project, checker.clone()).unwrap();
    assert_eq!(
        output,
        OffsetOutput {
            files_modified: 1,
            issues: 1
        }
    );
    assert_eq!(
        fs::read_to_string(&a_path).unwrap(),
        "export function f() {\n  const x = // @ts-expect-error ratchet TS2322 (jscodeshift)\n  BAD;\n  // @ts-expect-error ratchet TS2554 (ts-morph)\n  return OOPS(1);\n}\n"
    );

    let recheck = collect_in_worker(&project, checker).unwrap();
    assert_eq!(recheck.total_issues, 0);
}

#[test]
fn test_structural_pass_counts_skips_and_failures() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("tsconfig.json"), "{}");
    write(&root.join("ok.ts"), "let value = BAD;\n");
    write(&root.join("same.ts"), "let other = OOPS(1);\n");
    write(&root.join("broken.ts"), "let value = (BAD;\n");

    let project = Project::load(&root.join("tsconfig.json")).unwrap();
    let checker: Arc<dyn TypeChecker> = Arc::new(MarkerChecker);
    let reduced = collect_in_worker(&project, checker.clone()).unwrap();

    let mut paths = reduced.paths();
    paths.push(root.join("notes.md").to_string_lossy().into_owned());
    paths.push(root.join("untouched.ts").to_string_lossy().into_owned());

    let summary = run_structural_pass(&paths, &reduced.issues_per_file).unwrap();
    assert_eq!(
        summary,
        StructuralSummary {
            ok: 1,
            nochange: 1,
            skip: 2,
            error: 1
        }
    );

    // The offset pass still reaches the files the structural pass could not
    let output = run_offset_pass_in_worker(&project, checker).unwrap();
    assert_eq!(output.issues, 2);
    assert_eq!(output.files_modified, 2);
    assert_eq!(
        fs::read_to_string(root.join("broken.ts")).unwrap(),
        "// @ts-expect-error ratchet TS2322 (ts-morph)\nlet value = (BAD;\n"
    );
}
