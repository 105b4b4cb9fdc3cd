//! File-level entry point and reporters.

use std::fs;

use schemaguard_analysis::{analyze_file, create_reporter, RuleId};
use schemaguard_core::errors::{AnalysisError, ErrorCode, ParseError};
use schemaguard_core::SchemaGuardConfig;

#[test]
fn analyzes_a_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.ts");
    fs::write(&path, "export const items = pgTable('items', { id: serial('id').primaryKey() });\n").unwrap();

    let report = analyze_file(&path, &SchemaGuardConfig::default()).unwrap();
    assert_eq!(report.file, path);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| d.rule_id == RuleId::PreferUuidPrimaryKey));
    assert_eq!(report.error_count(), 0);
    assert!(report.warning_count() >= 1);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = analyze_file(&dir.path().join("nope.ts"), &SchemaGuardConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::Io { .. }));
    assert_eq!(err.error_code(), "IO_ERROR");
}

#[test]
fn unsupported_extension_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models.py");
    fs::write(&path, "x = 1\n").unwrap();
    let err = analyze_file(&path, &SchemaGuardConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Parse(ParseError::UnsupportedLanguage { .. })
    ));
}

#[test]
fn project_config_drives_analysis() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("schemaguard.toml"),
        "[rules.join_complexity]\nmax_joins = 1\n",
    )
    .unwrap();
    let path = dir.path().join("query.ts");
    fs::write(&path, "db.select().from(a).leftJoin(b, x).leftJoin(c, y);\n").unwrap();

    let config = SchemaGuardConfig::from_toml(&fs::read_to_string(dir.path().join("schemaguard.toml")).unwrap()).unwrap();
    let report = analyze_file(&path, &config).unwrap();
    let joins: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| d.rule_id == RuleId::JoinComplexityLimit)
        .collect();
    assert_eq!(joins.len(), 1);
    assert_eq!(joins[0].data_value("max"), Some("1"));
}

#[test]
fn reports_render_in_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q.ts");
    fs::write(&path, "await db.delete(sessions);\n").unwrap();
    let reports = vec![analyze_file(&path, &SchemaGuardConfig::default()).unwrap()];

    let json = create_reporter("json").unwrap().generate(&reports).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["error_count"], 1);

    let console = create_reporter("console").unwrap().generate(&reports).unwrap();
    assert!(console.contains("no-delete-without-where"));
}
