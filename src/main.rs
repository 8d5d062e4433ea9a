//! LLM batch gateway
//!
//! Runs the batch worker loops inside the gateway process

#![allow(missing_docs)]

use clap::Parser;
use llm_batch_gateway::runtime::{self, CliArgs};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    match runtime::run(args, "gateway").await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error using Display (not Debug) to preserve newlines
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
