//! JSON reporter: structured JSON output.

use serde_json::json;

use crate::diagnostics::Severity;
use crate::FileReport;

use super::Reporter;

/// JSON reporter for machine-readable output.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, reports: &[FileReport]) -> Result<String, String> {
        let files: Vec<serde_json::Value> = reports
            .iter()
            .map(|r| {
                json!({
                    "file": r.file.display().to_string(),
                    "diagnostic_count": r.diagnostics.len(),
                    "diagnostics": r.diagnostics.iter().map(|d| json!({
                        "rule_id": d.rule_id,
                        "message_id": d.message_id,
                        "severity": d.severity,
                        "message": d.message(),
                        "line": d.range.start.line + 1,
                        "column": d.range.start.column + 1,
                        "end_line": d.range.end.line + 1,
                        "end_column": d.range.end.column + 1,
                        "data": d.data,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();

        let count = |severity: Severity| -> usize {
            reports
                .iter()
                .flat_map(|r| &r.diagnostics)
                .filter(|d| d.severity == severity)
                .count()
        };

        let output = json!({
            "file_count": reports.len(),
            "error_count": count(Severity::Error),
            "warning_count": count(Severity::Warning),
            "files": files,
        });

        serde_json::to_string_pretty(&output).map_err(|e| e.to_string())
    }
}
