//! Output formatting for the CLI.

use crate::batch::{DocumentReport, DocumentStatus};
use crate::config::ReportFormat;
use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: ReportFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: ReportFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the batch report.
    pub fn format_reports(&self, reports: &[DocumentReport]) -> Result<String> {
        match self.format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
            ReportFormat::Table => Ok(self.format_reports_table(reports)),
            ReportFormat::Quiet => Ok(self.format_reports_quiet(reports)),
        }
    }

    fn format_reports_table(&self, reports: &[DocumentReport]) -> String {
        if reports.is_empty() {
            return self.colorize("No documents found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record([
            "Source", "Status", "Blocks", "Cards", "Dropped", "Truncated", "Oracle", "Written",
        ]);

        for report in reports {
            let status = match &report.status {
                DocumentStatus::Extracted => self.colorize("extracted", "green"),
                DocumentStatus::DryRun => self.colorize("dry run", "cyan"),
                DocumentStatus::Skipped(reason) => {
                    self.colorize(&format!("skipped: {}", reason), "red")
                }
            };
            let oracle = match report.oracle_outcome {
                Some(outcome) => format!("{:?} ({})", outcome, report.oracle_attempts),
                None => "-".to_string(),
            };
            builder.push_record([
                report.source.display().to_string(),
                status,
                report.blocks.to_string(),
                report.cards.to_string(),
                report.dropped.to_string(),
                report.truncated.to_string(),
                oracle,
                report.written.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// One `source<TAB>cards` line per document.
    fn format_reports_quiet(&self, reports: &[DocumentReport]) -> String {
        reports
            .iter()
            .map(|r| format!("{}\t{}", r.source.display(), r.cards))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One-line totals for the batch.
    pub fn summary(&self, reports: &[DocumentReport]) -> String {
        let cards: usize = reports.iter().map(|r| r.cards).sum();
        let skipped = reports
            .iter()
            .filter(|r| matches!(r.status, DocumentStatus::Skipped(_)))
            .count();
        let message = format!(
            "{} card(s) from {} document(s)",
            cards,
            reports.len() - skipped
        );
        if skipped > 0 {
            self.warning(&format!("{}, {} skipped", message, skipped))
        } else {
            self.success(&message)
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
