//! Report rendering
//!
//! The text layout is line oriented and its labels and order are fixed so
//! existing scripts can keep parsing it:
//!
//! ```text
//! Concurrency Level: 4
//! Total Requests: 12
//! Success Requests: 12
//! Success Rate: 100%
//! Time taken for tests: 0.031 seconds
//! Requests per second: 387.10 [#/sec] (mean)
//! Time per request: 10.333 [ms] (mean)
//! Time per request: 2.583 [ms] (mean, across all concurrent requests)
//! CPU Number: 8
//! Worker Threads: 8
//! ```
//!
//! `Worker Threads` is the runtime's configured worker thread count. Older
//! output of this kind labelled the same figure `GOMAXPROCS:`; parsers keyed
//! on that label need updating.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::orchestrator::{Summary, WorkerLine};

/// Output format for a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Line oriented human readable text
    #[default]
    Text,
    /// Pretty printed JSON of the full summary
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// A summary plus how to present it
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    summary: &'a Summary,
    format: ReportFormat,
    verbosity: u8,
}

impl<'a> Report<'a> {
    /// Text report at verbosity 0
    pub fn new(summary: &'a Summary) -> Self {
        Self {
            summary,
            format: ReportFormat::Text,
            verbosity: 0,
        }
    }

    /// Set the output format
    pub fn format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the verbosity; 2 and above adds per-worker lines
    pub fn verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Write the report
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => write!(out, "{self}"),
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self.summary)?;
                writeln!(out)
            }
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;

        for line in &s.workers {
            if self.verbosity >= 2 || line.fault.is_some() {
                write_worker_line(f, line)?;
            }
        }

        writeln!(f, "Concurrency Level: {}", s.concurrency)?;
        writeln!(f, "Total Requests: {}", s.total_requests)?;
        writeln!(f, "Success Requests: {}", s.success_requests)?;
        writeln!(f, "Success Rate: {}%", s.success_rate_percent)?;
        writeln!(f, "Time taken for tests: {:.3} seconds", s.taken_secs)?;
        writeln!(
            f,
            "Requests per second: {:.2} [#/sec] (mean)",
            s.requests_per_second
        )?;
        writeln!(f, "Time per request: {:.3} [ms] (mean)", s.time_per_request_ms)?;
        writeln!(
            f,
            "Time per request: {:.3} [ms] (mean, across all concurrent requests)",
            s.time_per_request_across_all_ms
        )?;
        writeln!(f, "CPU Number: {}", s.env.cpu_count)?;
        writeln!(f, "Worker Threads: {}", s.env.parallelism)?;

        if s.failed_workers > 0 {
            writeln!(f, "Failed Workers: {}", s.failed_workers)?;
        }
        Ok(())
    }
}

fn write_worker_line(f: &mut fmt::Formatter<'_>, line: &WorkerLine) -> fmt::Result {
    write!(
        f,
        "worker[{}]: {:.2} [#/sec] time={:.3}",
        line.worker_index, line.requests_per_second, line.elapsed_secs
    )?;
    match &line.fault {
        Some(fault) => writeln!(f, " fault: {fault}"),
        None => writeln!(f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::RuntimeEnv;
    use crate::worker::{WorkerFault, WorkerResult};

    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn result(index: usize, start_ms: i64, end_ms: i64, count: usize, success: usize) -> WorkerResult {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let start = base + chrono::Duration::milliseconds(start_ms);
        let end = base + chrono::Duration::milliseconds(end_ms);
        WorkerResult {
            worker_index: index,
            start_time: Some(start),
            end_time: Some(end),
            elapsed: Duration::from_millis((end_ms - start_ms) as u64),
            count,
            success,
            fault: None,
        }
    }

    fn env() -> RuntimeEnv {
        RuntimeEnv {
            cpu_count: 8,
            parallelism: 4,
        }
    }

    fn summary() -> Summary {
        let results = vec![result(0, 0, 1000, 100, 100), result(1, 0, 1000, 100, 99)];
        Summary::from_results(&results, 2, env()).unwrap()
    }

    #[test]
    fn test_text_report_exact_layout() {
        let text = Report::new(&summary()).to_string();
        let expected = "\
Concurrency Level: 2
Total Requests: 200
Success Requests: 199
Success Rate: 99%
Time taken for tests: 1.000 seconds
Requests per second: 200.00 [#/sec] (mean)
Time per request: 10.000 [ms] (mean)
Time per request: 5.000 [ms] (mean, across all concurrent requests)
CPU Number: 8
Worker Threads: 4
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_verbose_report_lists_workers_first() {
        let text = Report::new(&summary()).verbosity(2).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "worker[0]: 100.00 [#/sec] time=1.000");
        assert_eq!(lines[1], "worker[1]: 100.00 [#/sec] time=1.000");
        assert_eq!(lines[2], "Concurrency Level: 2");
    }

    #[test]
    fn test_faulted_workers_always_listed() {
        let mut results = vec![result(0, 0, 500, 10, 10), result(1, 0, 500, 3, 2)];
        results[1].fault = Some(WorkerFault::Request {
            iteration: 2,
            message: "reset".into(),
        });
        let summary = Summary::from_results(&results, 2, env()).unwrap();
        let text = Report::new(&summary).to_string();

        assert!(text.starts_with("worker[1]: 6.00 [#/sec] time=0.500 fault: request 2 failed: reset\n"));
        assert!(!text.contains("worker[0]"));
        assert!(text.ends_with("Failed Workers: 1\n"));
    }

    #[test]
    fn test_json_report() {
        let mut buf = Vec::new();
        Report::new(&summary())
            .format(ReportFormat::Json)
            .write_to(&mut buf)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["total_requests"], 200);
        assert_eq!(value["success_rate_percent"], 99);
        assert_eq!(value["env"]["cpu_count"], 8);
        assert_eq!(value["workers"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parallelism_label() {
        let text = Report::new(&summary()).to_string();
        assert_eq!(text.lines().last(), Some("Worker Threads: 4"));
        assert!(!text.contains("GOMAXPROCS"));
    }

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
