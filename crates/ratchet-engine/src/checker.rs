//! The type checker seam.
//!
//! `TscChecker` shells out to the TypeScript compiler; tests substitute an
//! in-process fake.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use ratchet_common::Diagnostic;
use serde_json::{Value, json};
use tracing::{debug, info_span, warn};

use crate::project::Project;
use crate::tsc_output::{parse_pretty_report, resolve_offsets, strip_ansi};

/// Produces the diagnostics of a whole project.
pub trait TypeChecker: Send + Sync {
    fn check(&self, project: &Project) -> Result<Vec<Diagnostic>>;
}

/// Runs `<tsc> --noEmit --pretty true -p <generated tsconfig>` from the
/// project root. The generated config extends the project's own and lists
/// the discovered files, so tsc checks exactly what the passes rewrite.
#[derive(Clone, Debug)]
pub struct TscChecker {
    /// Executable, possibly with leading arguments (`npx tsc`).
    command: String,
}

impl Default for TscChecker {
    fn default() -> Self {
        TscChecker::new("tsc")
    }
}

impl TscChecker {
    pub fn new(command: impl Into<String>) -> Self {
        TscChecker {
            command: command.into(),
        }
    }

    fn build_command(&self, project: &Project, config_path: &Path) -> Command {
        // Use a shell for commands with arguments such as "npx tsc"
        let mut command = if self.command.trim().contains(' ') {
            let mut command = Command::new("sh");
            command.arg("-c").arg(format!(
                "{} --noEmit --pretty true -p {}",
                self.command,
                shell_quote(config_path)
            ));
            command
        } else {
            let mut command = Command::new(self.command.trim());
            command
                .arg("--noEmit")
                .arg("--pretty")
                .arg("true")
                .arg("-p")
                .arg(config_path);
            command
        };
        command.current_dir(&project.root_dir);
        command
    }
}

/// A tsconfig that inherits everything from the project's config but checks
/// only `project.file_names`.
fn generated_config(project: &Project) -> Value {
    let files: Vec<String> = project
        .file_names
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    json!({
        "extends": project.config_path.to_string_lossy(),
        "compilerOptions": { "noEmit": true },
        "files": files,
        "include": [],
    })
}

impl TypeChecker for TscChecker {
    fn check(&self, project: &Project) -> Result<Vec<Diagnostic>> {
        let _span = info_span!("tsc", command = %self.command).entered();

        if project.file_names.is_empty() {
            debug!("project has no source files, skipping type checker");
            return Ok(Vec::new());
        }

        // Removed when dropped, after tsc has exited
        let mut config = tempfile::Builder::new()
            .prefix("tsconfig.ratchet.")
            .suffix(".json")
            .tempfile_in(&project.root_dir)
            .context("failed to create generated tsconfig")?;
        let contents = serde_json::to_string_pretty(&generated_config(project))
            .context("failed to serialize generated tsconfig")?;
        config
            .write_all(contents.as_bytes())
            .and_then(|()| config.flush())
            .context("failed to write generated tsconfig")?;
        debug!(config = %config.path().display(), files = project.file_names.len(), "generated tsconfig");

        let output = self
            .build_command(project, config.path())
            .output()
            .with_context(|| format!("failed to run type checker '{}'", self.command))?;

        // 1 and 2 mean "diagnostics were reported"
        match output.status.code() {
            Some(0..=2) => {}
            Some(code) => bail!(
                "type checker '{}' exited with status {}: {}",
                self.command,
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            None => bail!("type checker '{}' was terminated by a signal", self.command),
        }

        let report = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        let reported = parse_pretty_report(&report);
        if reported.is_empty() && !output.status.success() {
            warn!(
                status = ?output.status.code(),
                "type checker failed but no diagnostics could be read from its output"
            );
        }
        debug!(count = reported.len(), "parsed tsc report");

        Ok(resolve_offsets(reported, &project.root_dir, |path| {
            std::fs::read_to_string(path).ok()
        }))
    }
}

fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GENERATED: &str = "/work/app/tsconfig.ratchet.json";

    fn project() -> Project {
        Project {
            config_path: PathBuf::from("/work/app/tsconfig.json"),
            root_dir: PathBuf::from("/work/app"),
            file_names: vec![
                PathBuf::from("/work/app/src/a.ts"),
                PathBuf::from("/work/app/src/b.tsx"),
            ],
        }
    }

    #[test]
    fn test_plain_command_passes_arguments_directly() {
        let command = TscChecker::default().build_command(&project(), Path::new(GENERATED));
        assert_eq!(command.get_program(), "tsc");
        let args: Vec<_> = command.get_args().map(|arg| arg.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["--noEmit", "--pretty", "true", "-p", GENERATED]);
        assert_eq!(command.get_current_dir(), Some(Path::new("/work/app")));
    }

    #[test]
    fn test_command_with_arguments_runs_through_shell() {
        let command = TscChecker::new("npx tsc").build_command(&project(), Path::new(GENERATED));
        assert_eq!(command.get_program(), "sh");
        let args: Vec<_> = command.get_args().map(|arg| arg.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec!["-c", "npx tsc --noEmit --pretty true -p '/work/app/tsconfig.ratchet.json'"]
        );
    }

    #[test]
    fn test_generated_config_lists_discovered_files() {
        let config = generated_config(&project());
        assert_eq!(
            config,
            json!({
                "extends": "/work/app/tsconfig.json",
                "compilerOptions": { "noEmit": true },
                "files": ["/work/app/src/a.ts", "/work/app/src/b.tsx"],
                "include": [],
            })
        );
    }

    #[test]
    fn test_project_without_files_skips_checker() {
        let checker = TscChecker::new("ratchet-definitely-not-a-real-tsc-binary");
        let empty = Project {
            file_names: Vec::new(),
            ..project()
        };
        assert!(checker.check(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote(Path::new("/a/it's/x")), r"'/a/it'\''s/x'");
    }

    #[test]
    fn test_missing_checker_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let project = Project {
            config_path: dir.path().join("tsconfig.json"),
            root_dir: dir.path().to_path_buf(),
            file_names: vec![dir.path().join("a.ts")],
        };
        let checker = TscChecker::new("ratchet-definitely-not-a-real-tsc-binary");
        let err = checker.check(&project).unwrap_err();
        assert!(err.to_string().contains("failed to run type checker"));

        // The generated config does not outlive the run
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }
}
