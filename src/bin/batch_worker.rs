//! Standalone batch worker process
//!
//! Shares the queue and job store with the gateway; run as many copies as
//! the backends can take.

use anyhow::Context;
use clap::Parser;
use llm_batch_gateway::runtime::{self, CliArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    runtime::run(args, "batch-worker")
        .await
        .context("batch worker exited with an error")
}
