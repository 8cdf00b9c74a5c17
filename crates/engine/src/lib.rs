//! # Jobapp Engine
//!
//! Runs the job-application smoke test: register, log in, create an
//! application, poll it until it completes, and confirm it within a time
//! budget.
//!
//! ## Usage
//!
//! ```ignore
//! use jobapp_api::JobAppClient;
//! use jobapp_engine::{WorkflowConfig, WorkflowRunner};
//! use jobapp_types::Credentials;
//!
//! let client = JobAppClient::new("https://jobs.example.com")?;
//! let credentials = Credentials::new("ada@example.com", "s3cret", "Ada", "Lovelace");
//! let runner = WorkflowRunner::new(client, WorkflowConfig::new(credentials));
//! let report = runner.run().await?;
//! println!("confirmed after {} poll attempts", report.poll_attempts);
//! ```
//!
//! ## Architecture
//!
//! - **`config`**: credentials plus polling cadence and confirmation budget
//! - **`executor`**: the `ApplicationApi` seam, the polling loop, and reply decoding
//! - **`workflow`**: the sequential `WorkflowRunner`
//! - **`error`**: `WorkflowError`, one variant per way a run can end early

pub mod config;
pub mod error;
pub mod executor;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, RunTiming, WorkflowConfig};
pub use error::{ResponseDecodeError, WorkflowError};
pub use executor::{ApplicationApi, PollOutcome, decode_reply, poll_until_completed};
pub use workflow::WorkflowRunner;
