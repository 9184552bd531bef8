use colored::Colorize;
use ratchet_common::ReducedDiagnostics;
use ratchet_engine::StructuralSummary;

/// Renders step status lines and issue listings.
///
/// Every method returns the finished text so callers decide where it goes.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    /// `✔ <step>` followed by an indented `↳ <detail>` line.
    pub fn step_ok(&self, step: &str, detail: &str) -> String {
        let mark = if self.color {
            "✔".green().bold().to_string()
        } else {
            "✔".to_string()
        };
        format!("{mark} {step}\n{}\n", self.detail(detail))
    }

    /// `✕ <step>` followed by the failure reason.
    pub fn step_failed(&self, step: &str, detail: &str) -> String {
        let mark = if self.color {
            "✕".red().bold().to_string()
        } else {
            "✕".to_string()
        };
        format!("{mark} {step}\n{}\n", self.detail(detail))
    }

    pub fn warning(&self, message: &str) -> String {
        if self.color {
            format!("{}\n", message.yellow())
        } else {
            format!("{message}\n")
        }
    }

    pub fn success(&self, message: &str) -> String {
        if self.color {
            format!("{}\n", message.green().bold())
        } else {
            format!("{message}\n")
        }
    }

    fn detail(&self, detail: &str) -> String {
        let arrow = if self.color {
            "↳".dimmed().to_string()
        } else {
            "↳".to_string()
        };
        format!("  {arrow} {detail}")
    }

    /// One `path:line:col - TS<code>: message` row per issue, grouped by file.
    pub fn render_issues(&self, reduced: &ReducedDiagnostics) -> String {
        let mut out = String::new();
        for (path, issues) in reduced.issues_per_file.iter() {
            for issue in issues {
                let location = format!("{path}:{}:{}", issue.start_line, issue.start_col);
                let code = format!("TS{}", issue.code);
                if self.color {
                    out.push_str(&format!(
                        "{} - {}: {}\n",
                        location.cyan(),
                        code.bright_black(),
                        issue.message
                    ));
                } else {
                    out.push_str(&format!("{location} - {code}: {}\n", issue.message));
                }
            }
        }
        out
    }
}

/// "Found N issues in M files".
pub fn typecheck_message(reduced: &ReducedDiagnostics) -> String {
    format!(
        "Found {} in {}",
        plural(reduced.total_issues, "issue"),
        plural(reduced.issues_per_file.len(), "file")
    )
}

/// Human summary of a structural pass. Parts with a zero count are left out.
pub fn structural_summary_message(summary: &StructuralSummary) -> String {
    let skipped = summary.nochange + summary.skip;
    let mut parts = Vec::new();
    if summary.ok > 0 {
        parts.push(format!(
            "{} {} successfully modified.",
            plural(summary.ok, "file"),
            were(summary.ok)
        ));
    }
    if skipped > 0 {
        parts.push(format!("{} {} skipped.", plural(skipped, "file"), were(skipped)));
    }
    if summary.error > 0 {
        parts.push(format!(
            "{} failed.",
            plural(summary.error, "modification")
        ));
    }
    if parts.is_empty() {
        return "No files were modified.".to_string();
    }
    parts.join(" ")
}

/// "Modified F files for I issues left."
pub fn offset_message(files_modified: usize, issues: usize) -> String {
    format!(
        "Modified {} for {} left.",
        plural(files_modified, "file"),
        plural(issues, "issue")
    )
}

pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

const fn were(count: usize) -> &'static str {
    if count == 1 { "was" } else { "were" }
}
