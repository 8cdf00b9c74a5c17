use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use jobapp_api::JobAppClient;
use jobapp_engine::{RunTiming, WorkflowConfig, WorkflowRunner};
use jobapp_types::{Credentials, RunReport};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Register, log in, apply, wait for processing, and confirm the application.
#[derive(Debug, Parser)]
#[command(name = "jobapp", version, about)]
struct Cli {
    /// Base URL of the job-application service
    #[arg(long, env = "BASE_URL")]
    base_url: String,

    #[arg(long, env = "EMAIL")]
    email: String,

    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, env = "FIRST_NAME")]
    first_name: String,

    #[arg(long, env = "LAST_NAME")]
    last_name: String,

    /// Delay between two status polls, in milliseconds
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Poll requests issued before giving up
    #[arg(long, default_value_t = 30)]
    max_poll_attempts: u32,

    /// Seconds allowed between start and confirmation
    #[arg(long, default_value_t = 30)]
    budget_secs: u64,

    /// Print the run report as JSON on success
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn workflow_config(&self) -> WorkflowConfig {
        let credentials = Credentials::new(&self.email, &self.password, &self.first_name, &self.last_name);
        WorkflowConfig::new(credentials).with_timing(RunTiming {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_poll_attempts: self.max_poll_attempts,
            confirmation_budget: Duration::from_secs(self.budget_secs),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // a missing .env file is fine; the environment may already be populated
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();
    run(cli).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.workflow_config();
    config.validate().context("invalid configuration")?;
    let client = JobAppClient::new(&cli.base_url).context("build API client")?;

    info!(base_url = %client.base_url(), "starting job-application smoke test");
    let runner = WorkflowRunner::new(client, config);
    match runner.run().await {
        Ok(report) => {
            print_report(&report, cli.json)?;
            Ok(())
        }
        Err(error) => {
            if let Some(hint) = error.hint() {
                warn!(%hint, "service rejected the request");
            }
            Err(anyhow!(error)).context("job-application workflow failed")
        }
    }
}

fn print_report(report: &RunReport, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        info!(
            poll_attempts = report.poll_attempts,
            elapsed_ms = report.elapsed_ms,
            confirmation_url = %report.confirmation_url,
            "test finished successfully"
        );
    }
    Ok(())
}
