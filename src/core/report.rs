use crate::domain::model::{CheckStatus, ReconReport};
use crate::utils::error::{ReconError, Result};
use std::fmt::Write;

pub const JSON_REPORT: &str = "reconciliation_report.json";
pub const CSV_REPORT: &str = "reconciliation_report.csv";

/// One line per check, with the discrepancy list under each failure.
pub fn render_text(report: &ReconReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Reconciliation '{}' ({})",
        report.run_name,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for outcome in &report.outcomes {
        let _ = writeln!(out, "[{:<5}] {}", outcome.status_label(), outcome.check);
        match &outcome.status {
            CheckStatus::Passed => {}
            CheckStatus::Failed { discrepancies } => {
                let listed: Vec<String> = discrepancies.iter().map(|d| d.to_string()).collect();
                let _ = writeln!(out, "        {}:", outcome.check.headline());
                let _ = writeln!(out, "        [{}]", listed.join(", "));
            }
            CheckStatus::Errored { message } => {
                let _ = writeln!(out, "        check could not run: {}", message);
            }
        }
    }

    let failed = report.failed_checks().len();
    let _ = writeln!(
        out,
        "{} of {} checks passed",
        report.outcomes.len() - failed,
        report.outcomes.len()
    );
    out
}

pub fn to_json(report: &ReconReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// `check,status,discrepancy` rows; a passing check gets one row with an empty discrepancy.
pub fn to_csv(report: &ReconReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["check", "status", "discrepancy"])?;

    for outcome in &report.outcomes {
        let status = outcome.status_label();
        match &outcome.status {
            CheckStatus::Passed => writer.write_record([outcome.check.name(), status, ""])?,
            CheckStatus::Failed { discrepancies } => {
                for discrepancy in discrepancies {
                    writer.write_record([
                        outcome.check.name(),
                        status,
                        discrepancy.to_string().as_str(),
                    ])?;
                }
            }
            CheckStatus::Errored { message } => {
                writer.write_record([outcome.check.name(), status, message.as_str()])?
            }
        }
    }

    let bytes = writer.into_inner().map_err(|e| ReconError::ReportError {
        message: format!("failed to flush CSV report: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| ReconError::ReportError {
        message: format!("CSV report is not UTF-8: {}", e),
    })
}

/// File name and contents for each requested format.
pub fn render_files(report: &ReconReport, formats: &[String]) -> Result<Vec<(&'static str, String)>> {
    formats
        .iter()
        .map(|format| match format.as_str() {
            "json" => Ok((JSON_REPORT, to_json(report)?)),
            "csv" => Ok((CSV_REPORT, to_csv(report)?)),
            other => Err(ReconError::ReportError {
                message: format!("unsupported report format '{}'", other),
            }),
        })
        .collect()
}
