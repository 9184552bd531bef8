//! Offset Insertion Engine.
//!
//! The catch-all second pass. For every diagnostic of a fresh check, the token
//! at the diagnostic's start offset decides the line; a `// @ts-expect-error`
//! line carrying that line's indentation goes directly above it. Insertions
//! are applied per file in descending offset order.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use ratchet_common::annotation::line_comment;
use ratchet_common::{AnnotationSource, Diagnostic, Insertion, LineMap, apply_insertions};
use ratchet_parser::ParsedSourceFile;
use serde::Serialize;
use tracing::{debug, info_span, trace, warn};

use crate::checker::TypeChecker;
use crate::project::Project;
use crate::structural::has_supported_extension;
use crate::worker::run_worker;

/// Result of one offset pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetOutput {
    pub files_modified: usize,
    /// Diagnostics with a file and a start position.
    pub issues: usize,
}

/// Insertion records for one file. `diagnostics` are `(start offset, code)`
/// pairs; a start with no token at or after it is skipped.
pub fn plan_insertions(parsed: &ParsedSourceFile, diagnostics: &[(u32, u32)]) -> Vec<Insertion> {
    let line_map = LineMap::build(&parsed.text);
    diagnostics
        .iter()
        .filter_map(|&(start, code)| {
            let Some(token) = parsed.token_at(start) else {
                trace!(start, code, "no token at diagnostic start");
                return None;
            };
            let line_start = line_map.line_start_of(token.pos);
            let indentation = line_map.indentation_of(token.pos, &parsed.text);
            Some(Insertion::new(
                line_start,
                format!(
                    "{indentation}{}\n",
                    line_comment(code, AnnotationSource::Offset)
                ),
            ))
        })
        .collect()
}

/// Annotate `source` for `diagnostics` (see `plan_insertions`).
pub fn annotate_source(file_name: &str, source: &str, diagnostics: &[(u32, u32)]) -> String {
    let parsed = ParsedSourceFile::parse(file_name, source);
    let insertions = plan_insertions(&parsed, diagnostics);
    apply_insertions(source, insertions)
}

/// Apply `diagnostics` to the files on disk. Any read or write failure fails
/// the whole pass.
pub fn apply_diagnostics(diagnostics: &[Diagnostic]) -> Result<OffsetOutput> {
    let mut issues = 0;
    let mut per_file: BTreeMap<&str, Vec<(u32, u32)>> = BTreeMap::new();
    for diagnostic in diagnostics {
        let Some((file, start)) = diagnostic.location() else {
            continue;
        };
        issues += 1;
        per_file.entry(file).or_default().push((start, diagnostic.code));
    }

    let mut files_modified = 0;
    for (file, starts) in per_file {
        if !has_supported_extension(file) {
            warn!(file, "not a source file, leaving it untouched");
            continue;
        }
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read {file}"))?;
        let output = annotate_source(file, &source, &starts);
        if output == source {
            continue;
        }
        std::fs::write(file, output).with_context(|| format!("failed to write {file}"))?;
        debug!(file, diagnostics = starts.len(), "annotated");
        files_modified += 1;
    }

    Ok(OffsetOutput {
        files_modified,
        issues,
    })
}

/// Re-check `project` and annotate whatever is still reported.
pub fn run_offset_pass(project: &Project, checker: &dyn TypeChecker) -> Result<OffsetOutput> {
    let _span = info_span!("offset_pass", config = %project.config_path.display()).entered();
    let diagnostics = checker.check(project)?;
    let output = apply_diagnostics(&diagnostics)?;
    debug!(?output, "offset pass finished");
    Ok(output)
}

pub fn run_offset_pass_in_worker(
    project: &Project,
    checker: Arc<dyn TypeChecker>,
) -> Result<OffsetOutput> {
    run_worker("offset", project.clone(), move |project| {
        run_offset_pass(&project, checker.as_ref())
    })
}
