pub mod format;

use crate::dashboard::Dashboard;
use crate::models::{AttackStats, Domain, SecurityLogRecord};
use format::{attack_caption, format_timestamp, log_message, remediation_line, rule_detail};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Output handler for dashboard data
pub struct OutputHandler {
    format: OutputFormat,
    writer: Option<Box<dyn Write + Send>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Jsonl,
    Console,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "jsonl" => OutputFormat::Jsonl,
            "console" => OutputFormat::Console,
            _ => OutputFormat::Console, // Default
        }
    }
}

impl OutputHandler {
    /// Create a new output handler; without a file path output goes to stdout
    pub fn new(format: OutputFormat, file_path: Option<PathBuf>) -> Result<Self, OutputError> {
        let writer: Option<Box<dyn Write + Send>> = match file_path {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Some(Box::new(BufWriter::new(file)))
            }
            None => None,
        };

        Ok(OutputHandler { format, writer })
    }

    /// Write into an arbitrary sink (used by tests)
    pub fn with_writer(format: OutputFormat, writer: Box<dyn Write + Send>) -> Self {
        OutputHandler {
            format,
            writer: Some(writer),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn write_dashboard(&mut self, dashboard: &Dashboard) -> Result<(), OutputError> {
        self.write_value(dashboard, render_dashboard)
    }

    pub fn write_stats(&mut self, stats: &AttackStats) -> Result<(), OutputError> {
        self.write_value(stats, render_stats)
    }

    pub fn write_domains(&mut self, domains: &[Domain]) -> Result<(), OutputError> {
        self.write_value(domains, |domains| render_domains(domains))
    }

    pub fn write_logs(&mut self, logs: &[&SecurityLogRecord]) -> Result<(), OutputError> {
        self.write_value(logs, |logs| render_logs(logs))
    }

    /// Plain status line; structured formats wrap it in `{"message": ...}`
    pub fn write_message(&mut self, message: &str) -> Result<(), OutputError> {
        let wrapped = serde_json::json!({ "message": message });
        self.write_value(&wrapped, |_| format!("{}\n", message))
    }

    fn write_value<T, F>(&mut self, value: &T, render: F) -> Result<(), OutputError>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        let data = match self.format {
            OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(value)?),
            OutputFormat::Jsonl => format!("{}\n", serde_json::to_string(value)?),
            OutputFormat::Console => render(value),
        };
        self.write_output(&data)
    }

    fn write_output(&mut self, data: &str) -> Result<(), OutputError> {
        match &mut self.writer {
            Some(writer) => {
                writer.write_all(data.as_bytes())?;
                writer.flush()?;
            }
            None => {
                let mut stdout = io::stdout();
                stdout.write_all(data.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }

    /// Flush any buffered output
    pub fn flush(&mut self) -> Result<(), OutputError> {
        if let Some(writer) = &mut self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

pub fn render_stats(stats: &AttackStats) -> String {
    let mut out = String::from("Attack Statistics\n");
    for (label, count) in [
        ("DDoS Attacks", stats.ddos),
        ("SQL Injection", stats.sql_injection),
        ("XSS Attacks", stats.xss),
    ] {
        let _ = writeln!(out, "  {:<14} {:>6}  {}", label, count, attack_caption(count));
    }
    let _ = writeln!(out, "  {:<14} {:>6}", "Total events", stats.total);
    out
}

pub fn render_domains(domains: &[Domain]) -> String {
    if domains.is_empty() {
        return "No domains added yet\n".to_string();
    }
    let mut out = String::new();
    for domain in domains {
        let _ = writeln!(out, "{}  {}  {}  (added {})", domain.id, domain.name, domain.url, domain.created_at);
    }
    out
}

fn render_log_entry(out: &mut String, log: &SecurityLogRecord, indent: &str) {
    let _ = writeln!(out, "{}{} {}", indent, format_timestamp(&log.timestamp), log_message(log));
    if let Some(detail) = rule_detail(log) {
        let _ = writeln!(out, "{}    {}", indent, detail);
    }
    if let Some(remediation) = remediation_line(log) {
        let _ = writeln!(out, "{}    {}", indent, remediation);
    }
}

pub fn render_logs(logs: &[&SecurityLogRecord]) -> String {
    if logs.is_empty() {
        return "No recent activity\n".to_string();
    }
    let mut out = String::new();
    for log in logs {
        render_log_entry(&mut out, log, "");
    }
    out
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SYRA - Secure Your Realm Always");
    let _ = writeln!(out, "Signed in as {} <{}>\n", dashboard.user.name, dashboard.user.email);
    out.push_str(&render_stats(&dashboard.stats));
    out.push('\n');

    let views = dashboard.domain_views();
    if views.is_empty() {
        out.push_str("No domains added yet. Add one with `syra domains add <url>`.\n");
        return out;
    }

    let _ = writeln!(out, "My Domains");
    for view in views {
        let _ = writeln!(
            out,
            "\n{} ({}) [{}]",
            view.domain.name,
            view.domain.url,
            view.status_text()
        );
        let _ = writeln!(out, "  Security Logs ( {} )", view.logs.len());
        if view.logs.is_empty() {
            let _ = writeln!(out, "    No recent activity");
        }
        for log in &view.logs {
            render_log_entry(&mut out, log, "    ");
        }
        if view.has_threats {
            let _ = writeln!(
                out,
                "  Security Threat Detected: malicious activity was detected and the affected requests were blocked."
            );
        }
    }
    out
}
