//! Pipeline orchestration: setup, typecheck, confirmation, structural pass,
//! offset pass. Each step reports one status line; a failing step reports
//! `✕` and ends the run with its error.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ratchet_common::ReducedDiagnostics;
use ratchet_engine::{
    OffsetOutput, Project, StructuralSummary, TypeChecker, collect_in_worker,
    resolve_tsconfig_path, run_offset_pass_in_worker, run_structural_pass,
};
use tracing::info;

use crate::args::CliArgs;
use crate::prompt::confirm;
use crate::reporter::{
    Reporter, offset_message, plural, structural_summary_message, typecheck_message,
};

/// How a run ended without error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The checker reported nothing to annotate.
    NoIssues,
    /// Issues were reported and nothing was written.
    DryRun(ReducedDiagnostics),
    /// The user answered no at the confirmation prompt.
    Declined,
    Completed {
        structural: Option<StructuralSummary>,
        offset: Option<OffsetOutput>,
    },
}

struct Steps<'a> {
    reporter: Reporter,
    output: &'a mut dyn Write,
}

impl Steps<'_> {
    fn emit(&mut self, text: &str) -> Result<()> {
        self.output
            .write_all(text.as_bytes())
            .context("failed to write to stdout")
    }

    /// Report `result` under `step`: the detail on success, the error on
    /// failure.
    fn finish<T>(
        &mut self,
        step: &str,
        result: Result<T>,
        detail: impl FnOnce(&T) -> String,
    ) -> Result<T> {
        match result {
            Ok(value) => {
                let line = self.reporter.step_ok(step, &detail(&value));
                self.emit(&line)?;
                Ok(value)
            }
            Err(err) => {
                let line = self.reporter.step_failed(step, &format!("{err:#}"));
                self.emit(&line)?;
                Err(err)
            }
        }
    }
}

pub fn run(
    args: &CliArgs,
    cwd: &Path,
    checker: Arc<dyn TypeChecker>,
    color: bool,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<RunOutcome> {
    let mut steps = Steps {
        reporter: Reporter::new(color),
        output,
    };

    let project = steps.finish(
        "Setup Project",
        resolve_tsconfig_path(cwd, args.project.as_deref())
            .and_then(|config_path| Project::load(&config_path)),
        |project| format!("Found tsconfig.json at {}", project.config_path.display()),
    )?;
    info!(
        config = %project.config_path.display(),
        files = project.file_names.len(),
        "project loaded"
    );

    let reduced = steps.finish(
        "Typecheck",
        collect_in_worker(&project, checker.clone()),
        typecheck_message,
    )?;
    if reduced.total_issues == 0 {
        let line = steps.reporter.success("No issues to annotate.");
        steps.emit(&line)?;
        return Ok(RunOutcome::NoIssues);
    }

    if args.dry_run {
        let listing = if args.json {
            let mut json = serde_json::to_string_pretty(&reduced)
                .context("failed to serialize issues")?;
            json.push('\n');
            json
        } else {
            steps.reporter.render_issues(&reduced)
        };
        steps.emit(&listing)?;
        return Ok(RunOutcome::DryRun(reduced));
    }

    if !args.yes {
        let warning = steps.reporter.warning(
            "This will modify files in place. Make sure your project is committed to version control first.",
        );
        steps.emit(&warning)?;
        let question = format!(
            "Insert @ts-expect-error for {} in {}?",
            plural(reduced.total_issues, "issue"),
            plural(reduced.issues_per_file.len(), "file")
        );
        if !confirm(&question, false, input, &mut *steps.output)? {
            info!("run declined at the confirmation prompt");
            return Ok(RunOutcome::Declined);
        }
    }

    let structural = if args.no_structural {
        None
    } else {
        Some(steps.finish(
            "Structural pass",
            run_structural_pass(&reduced.paths(), &reduced.issues_per_file),
            structural_summary_message,
        )?)
    };

    let offset = if args.no_offset {
        None
    } else {
        Some(steps.finish(
            "Offset pass",
            run_offset_pass_in_worker(&project, checker),
            |output| offset_message(output.files_modified, output.issues),
        )?)
    };

    let reminder = steps.reporter.success(
        "✨ Codemod completed, please review the changes before committing. (code formatting may be required)",
    );
    steps.emit(&reminder)?;

    Ok(RunOutcome::Completed { structural, offset })
}
