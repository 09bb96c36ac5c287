//! Run summary formatters
//!
//! Renders a [`RunSummary`] for humans or machines. The TAP stream itself is
//! written by the runner; these formats are an extra view of the same run.

use crate::models::{RunSummary, Verdict};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Summary formatter
pub struct SummaryFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl SummaryFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn format(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_table(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Summary => self.format_brief(summary),
        }
    }

    fn verdict_str(&self, verdict: Verdict) -> &'static str {
        match (verdict, self.colorize) {
            (Verdict::Ok, true) => "\x1b[32m✓ PASS\x1b[0m",
            (Verdict::NotOk, true) => "\x1b[31m✗ FAIL\x1b[0m",
            (Verdict::Ok, false) => "✓ PASS",
            (Verdict::NotOk, false) => "✗ FAIL",
        }
    }

    fn format_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!(
            "║  {:30} seed {:<24} ║\n",
            summary.program, summary.seed
        ));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for result in &summary.results {
            output.push_str(&format!(
                "║  {:3}. {:28} {} {:>4}/{:<4} [{:>6}ms]  ║\n",
                result.number,
                result.name,
                self.verdict_str(result.verdict),
                result.cases - result.failed_cases,
                result.cases,
                result.duration_ms
            ));
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };
        output.push_str(&format!(
            "║  Total: {:3} | Pass: {:3} | Fail: {} | Cases: {:5}            ║\n",
            summary.total, summary.passed, fail_str, summary.total_cases
        ));
        if summary.leak_detected {
            output.push_str("║  Memory leaks detected                                       ║\n");
        }
        output.push_str(&format!(
            "║  Pass Rate: {:5.1}% | Duration: {:6}ms                      ║\n",
            summary.pass_rate(),
            summary.total_duration_ms
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    fn format_brief(&self, summary: &RunSummary) -> String {
        let mut line = format!(
            "{}: {}/{} passed ({:.1}%) in {}ms",
            summary.program,
            summary.passed,
            summary.total,
            summary.pass_rate(),
            summary.total_duration_ms
        );
        if summary.seed != 0 {
            line.push_str(&format!(", seed {}", summary.seed));
        }
        if summary.leak_detected {
            line.push_str(", leaks detected");
        }
        line
    }
}
