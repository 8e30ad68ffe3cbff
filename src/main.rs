//! lbench - concurrent load-generation harness

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use lbench_core::{OrchestratorBuilder, Report, ReportFormat, RunConfig, RuntimeEnv, Summary};
use lbench_jobs::JobKind;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let kind = cli.command.kind();
    let args = cli.command.args();

    init_tracing(args.verbose);

    // Refuse bad configuration before a runtime or worker exists
    let config = args.to_config(kind)?;

    let mut console = Console::new(io::stdout(), io::stderr(), args.format);
    console
        .banner(kind, args.target.as_deref())
        .context("failed to write banner")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.parallelism)
        .enable_all()
        .build()
        .context("failed to build the async runtime")?;

    let summary = runtime.block_on(run(kind, config))?;

    console
        .report(&summary, args.verbose)
        .context("failed to write report")?;

    Ok(())
}

/// Where run output goes
///
/// The report always goes to `out`. The banner goes there too in text mode;
/// in JSON mode it goes to `err` so `out` is a single JSON document.
struct Console<O, E> {
    out: O,
    err: E,
    format: ReportFormat,
}

impl<O: Write, E: Write> Console<O, E> {
    fn new(out: O, err: E, format: ReportFormat) -> Self {
        Self { out, err, format }
    }

    fn banner(&mut self, kind: JobKind, target: Option<&str>) -> io::Result<()> {
        let w: &mut dyn Write = match self.format {
            ReportFormat::Text => &mut self.out,
            ReportFormat::Json => &mut self.err,
        };
        writeln!(w, "This is lbench, Version {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(w, "This software is released under the MIT License.")?;
        writeln!(w)?;
        writeln!(w, "{} Benchmarking: {}", kind, target.unwrap_or("-"))?;
        w.flush()
    }

    fn report(&mut self, summary: &Summary, verbosity: u8) -> io::Result<()> {
        Report::new(summary)
            .format(self.format)
            .verbosity(verbosity)
            .write_to(&mut self.out)?;
        self.out.flush()
    }
}

async fn run(kind: JobKind, config: RunConfig) -> Result<Summary> {
    let concurrency = config.concurrency;
    let parallelism = config.parallelism;

    let orchestrator = OrchestratorBuilder::new()
        .config(config)
        .shared_job_factory(kind.factory())
        .build()
        .context("failed to set up the run")?;

    let outcome = orchestrator
        .run_with_signal_handling()
        .await
        .with_context(|| format!("{kind} run failed"))?;

    if let Some(reason) = outcome.interrupted {
        tracing::warn!(
            reason = ?reason,
            failures = outcome.failures(),
            "Run did not complete; reporting partial results"
        );
    }

    Summary::from_results(&outcome.results, concurrency, RuntimeEnv::detect(parallelism))
        .context("cannot summarize run")
}

/// Log to stderr so stdout carries only the banner and report.
/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();
}
