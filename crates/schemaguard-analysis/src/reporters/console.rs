//! Console reporter: human-readable output with color codes.

use crate::diagnostics::Severity;
use crate::FileReport;

use super::Reporter;

/// Console reporter for human-readable terminal output.
pub struct ConsoleReporter {
    pub use_color: bool,
}

impl ConsoleReporter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn color_start(&self, severity: Severity) -> &'static str {
        if !self.use_color {
            return "";
        }
        match severity {
            Severity::Error => "\x1b[31m",   // red
            Severity::Warning => "\x1b[33m", // yellow
        }
    }

    fn color_end(&self) -> &'static str {
        if self.use_color {
            "\x1b[0m"
        } else {
            ""
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn generate(&self, reports: &[FileReport]) -> Result<String, String> {
        let mut output = String::new();
        let mut errors = 0usize;
        let mut warnings = 0usize;

        for report in reports.iter().filter(|r| !r.diagnostics.is_empty()) {
            output.push_str(&format!("{}\n", report.file.display()));
            for d in &report.diagnostics {
                match d.severity {
                    Severity::Error => errors += 1,
                    Severity::Warning => warnings += 1,
                }
                // Editors expect 1-based positions.
                output.push_str(&format!(
                    "  {}:{}  {}{}{}  {}  {}\n",
                    d.range.start.line + 1,
                    d.range.start.column + 1,
                    self.color_start(d.severity),
                    d.severity,
                    self.color_end(),
                    d.message(),
                    d.rule_id,
                ));
            }
            output.push('\n');
        }

        let total = errors + warnings;
        if total == 0 {
            output.push_str(&format!("{} files checked, no problems\n", reports.len()));
        } else {
            output.push_str(&format!(
                "{total} problems ({errors} errors, {warnings} warnings) in {} files\n",
                reports.len()
            ));
        }
        Ok(output)
    }
}
