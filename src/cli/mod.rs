//! CLI argument parsing

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lbench_core::config::{DEFAULT_BASE_DN, DEFAULT_BIND_DN, DEFAULT_SECRET};
use lbench_core::{JobParams, ReportFormat, RunConfig};
use lbench_jobs::JobKind;

#[derive(Parser, Debug)]
#[command(name = "lbench")]
#[command(author, version, about = "Concurrent load-generation harness", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Harness overhead only: every request succeeds immediately
    Noop(RunArgs),
    /// Fixed latency per request (`-o latency_ms=N`, `-o fail_every=N`)
    Sleep(RunArgs),
    /// One TCP connect per request to <TARGET> (host:port)
    Connect(RunArgs),
}

impl Commands {
    /// Job selected by the subcommand
    pub fn kind(&self) -> JobKind {
        match self {
            Commands::Noop(_) => JobKind::Noop,
            Commands::Sleep(_) => JobKind::Sleep,
            Commands::Connect(_) => JobKind::Connect,
        }
    }

    /// Flags shared by every subcommand
    pub fn args(&self) -> &RunArgs {
        match self {
            Commands::Noop(args) | Commands::Sleep(args) | Commands::Connect(args) => args,
        }
    }
}

/// Flags common to every job
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Number of requests to perform
    #[arg(short = 'n', default_value_t = 1)]
    pub requests: usize,

    /// Number of multiple requests to make
    #[arg(short = 'c', default_value_t = 1)]
    pub concurrency: usize,

    /// How much troubleshooting info to print
    #[arg(short = 'v', long = "verbose", default_value_t = 0)]
    pub verbose: u8,

    /// Bind DN
    #[arg(short = 'D', default_value = DEFAULT_BIND_DN)]
    pub bind_dn: String,

    /// Bind secret
    #[arg(short = 'w', env = "LBENCH_SECRET", hide_env_values = true, default_value = DEFAULT_SECRET)]
    pub secret: String,

    /// Base DN
    #[arg(short = 'b', default_value = DEFAULT_BASE_DN)]
    pub base_dn: String,

    /// Job option as key=value, may be repeated
    #[arg(short = 'o', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub options: Vec<(String, String)>,

    /// Give up on workers that have not reported after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Runtime worker threads [default: number of CPUs]
    #[arg(long)]
    pub threads: Option<usize>,

    /// Report format (text or json)
    #[arg(long, default_value = "text")]
    pub format: ReportFormat,

    /// What to benchmark
    pub target: Option<String>,
}

impl RunArgs {
    /// Build and validate the run configuration for `kind`
    pub fn to_config(&self, kind: JobKind) -> Result<RunConfig> {
        if kind.needs_target() && self.target.is_none() {
            bail!("{kind} needs a target");
        }

        let mut job = JobParams {
            target: self.target.clone(),
            bind_dn: self.bind_dn.clone(),
            secret: self.secret.clone(),
            base_dn: self.base_dn.clone(),
            ..JobParams::default()
        };
        for (key, value) in &self.options {
            job = job.with_option(key, value);
        }

        let mut config = RunConfig::new(self.concurrency, self.requests)
            .with_verbosity(self.verbose)
            .with_parallelism(self.threads.unwrap_or_else(num_cpus::get))
            .with_job(job);

        if let Some(secs) = self.timeout {
            let timeout = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid timeout: {secs}"))?;
            config = config.with_timeout(timeout);
        }

        config.validate().context("invalid run configuration")?;
        Ok(config)
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}
