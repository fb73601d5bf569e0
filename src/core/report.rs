use crate::domain::model::{RowError, RowErrorKind};
use crate::utils::error::{ImportError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

/// 單次匯入的累計結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub lines_processed: usize,
    pub num_added: usize,
    pub num_failed: usize,
    pub errors: Vec<RowError>,
    pub generated_at: DateTime<Utc>,
}

/// Either a clean run (row count) or the recorded errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    Success { count: usize },
    Failure { errors: Vec<RowError> },
}

impl ImportReport {
    pub fn new() -> Self {
        Self {
            lines_processed: 0,
            num_added: 0,
            num_failed: 0,
            errors: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn record_processed(&mut self) {
        self.lines_processed += 1;
    }

    pub fn record_added(&mut self) {
        self.num_added += 1;
    }

    /// Marks the row failed and keeps its error.
    pub fn record_failure(&mut self, error: RowError) {
        tracing::warn!("{}", error);
        self.num_failed += 1;
        self.errors.push(error);
    }

    /// Keeps a non-fatal error without touching the counters.
    pub fn record_warning(&mut self, error: RowError) {
        tracing::warn!("{}", error);
        self.errors.push(error);
    }

    pub fn warnings(&self) -> impl Iterator<Item = &RowError> {
        self.errors.iter().filter(|e| e.kind.is_warning())
    }

    pub fn count_of(&self, kind: RowErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    pub fn finish(self) -> ImportOutcome {
        if self.errors.is_empty() {
            ImportOutcome::Success {
                count: self.lines_processed,
            }
        } else {
            ImportOutcome::Failure {
                errors: self.errors,
            }
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Csv => self.to_csv(),
        }
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Processed {} line(s): {} added, {} failed",
            self.lines_processed, self.num_added, self.num_failed
        );
        for error in &self.errors {
            let _ = writeln!(out, "  {}", error);
        }
        out
    }

    fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["line", "kind", "warning", "message"])?;
        for error in &self.errors {
            writer.write_record([
                error.line.to_string(),
                error.kind.to_string(),
                error.kind.is_warning().to_string(),
                error.message.clone(),
            ])?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| ImportError::IoError(e.into_error()))?;
        Ok(String::from_utf8(data)?)
    }
}

impl Default for ImportReport {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ImportError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(ImportError::InvalidConfigValueError {
                field: "report.format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: text, json, csv".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_errors() -> ImportReport {
        let mut report = ImportReport::new();
        report.record_processed();
        report.record_processed();
        report.record_processed();
        report.record_added();
        report.record_failure(RowError::new(RowErrorKind::NoUser, 2, "user \"zed\" does not exist"));
        report.record_added();
        report.record_warning(RowError::new(RowErrorKind::NoBlogTopic, 3, "topic \"x\" does not exist"));
        report
    }

    #[test]
    fn test_clean_report_is_success() {
        let mut report = ImportReport::new();
        report.record_processed();
        report.record_added();
        assert_eq!(report.finish(), ImportOutcome::Success { count: 1 });
    }

    #[test]
    fn test_errors_make_failure() {
        let report = report_with_errors();
        assert_eq!(report.num_added, 2);
        assert_eq!(report.num_failed, 1);
        assert_eq!(report.warnings().count(), 1);
        assert_eq!(report.count_of(RowErrorKind::NoUser), 1);
        match report.finish() {
            ImportOutcome::Failure { errors } => assert_eq!(errors.len(), 2),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_render_formats() {
        let report = report_with_errors();

        let text = report.render(ReportFormat::Text).unwrap();
        assert!(text.starts_with("Processed 3 line(s): 2 added, 1 failed"));
        assert!(text.contains("[no_user] Line 2"));

        let json: serde_json::Value = serde_json::from_str(&report.render(ReportFormat::Json).unwrap()).unwrap();
        assert_eq!(json["lines_processed"], 3);
        assert_eq!(json["errors"][0]["kind"], "no_user");

        let csv = report.render(ReportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("line,kind,warning,message"));
        assert!(lines.next().unwrap().starts_with("2,no_user,false,"));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(ImportOutcome::Success { count: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "count": 4}));
    }

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
