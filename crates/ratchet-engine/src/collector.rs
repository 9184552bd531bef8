//! Diagnostic Collector.
//!
//! Reshapes checker diagnostics into 1-indexed line/column issues grouped by
//! file. Diagnostics without a file or a start (configuration errors and the
//! like) are dropped; everything else is kept, including several codes at the
//! same position.

use std::sync::Arc;

use anyhow::Result;
use ratchet_common::{Diagnostic, Issue, IssuesPerFile, LineMap, ReducedDiagnostics, SourceRange};
use rustc_hash::FxHashMap;
use tracing::{debug, info_span, warn};

use crate::checker::TypeChecker;
use crate::project::Project;
use crate::worker::run_worker;

/// Group `diagnostics` by file. `read_source` supplies the text each offset
/// refers to; a file it cannot supply contributes no issues.
pub fn reduce_diagnostics(
    diagnostics: &[Diagnostic],
    mut read_source: impl FnMut(&str) -> Option<String>,
) -> ReducedDiagnostics {
    let mut sources: FxHashMap<&str, Option<(String, LineMap)>> = FxHashMap::default();
    let mut issues_per_file = IssuesPerFile::new();
    let mut total_issues = 0;

    for diagnostic in diagnostics {
        let Some((file, start)) = diagnostic.location() else {
            debug!(code = diagnostic.code, "dropping diagnostic without a location");
            continue;
        };

        let source = sources.entry(file).or_insert_with(|| {
            let text = read_source(file);
            if text.is_none() {
                warn!(file, "cannot read file reported by the checker");
            }
            text.map(|text| {
                let line_map = LineMap::build(&text);
                (text, line_map)
            })
        });
        let Some((text, line_map)) = source.as_ref() else {
            continue;
        };

        let end = diagnostic.end().unwrap_or(start);
        let range = SourceRange::from_offsets(line_map, text, start, end);
        issues_per_file.push(
            file,
            Issue::new(range, diagnostic.code, diagnostic.message_text.clone()),
        );
        total_issues += 1;
    }

    ReducedDiagnostics {
        total_issues,
        issues_per_file,
    }
}

/// Check `project` and reduce the result, reading sources from disk.
pub fn collect(project: &Project, checker: &dyn TypeChecker) -> Result<ReducedDiagnostics> {
    let _span = info_span!("collect", config = %project.config_path.display()).entered();
    let diagnostics = checker.check(project)?;
    let reduced = reduce_diagnostics(&diagnostics, |file| std::fs::read_to_string(file).ok());
    debug!(
        diagnostics = diagnostics.len(),
        issues = reduced.total_issues,
        files = reduced.issues_per_file.len(),
        "collected diagnostics"
    );
    Ok(reduced)
}

/// Run `collect` in its own worker so every run starts from fresh checker
/// state.
pub fn collect_in_worker(
    project: &Project,
    checker: Arc<dyn TypeChecker>,
) -> Result<ReducedDiagnostics> {
    run_worker("typecheck", project.clone(), move |project| {
        collect(&project, checker.as_ref())
    })
}
