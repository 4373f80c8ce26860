//! tfprobe CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Test failure
//! - 4: Terraform operation error
//! - 5: Executor unavailable

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const TEST_FAILURE: u8 = 3;
    pub const TERRAFORM_ERROR: u8 = 4;
    pub const EXECUTOR_UNAVAILABLE: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::from_default_env()
                .add_directive("tfprobe=info".parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Apply(args) => commands::apply::execute(args).await,
        Commands::Destroy(args) => commands::destroy::execute(args).await,
        Commands::Plan(args) => commands::plan::execute(args).await,
        Commands::Validate(args) => commands::validate::execute(args).await,
        Commands::Output(args) => commands::output::execute(args).await,
        Commands::Test(args) => commands::test::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    let msg = e.to_string().to_lowercase();

    if msg.contains("docker") || msg.contains("executor") || msg.contains("daemon") {
        ExitCodes::EXECUTOR_UNAVAILABLE
    } else if msg.contains("not found") || msg.contains("argument") || msg.contains("--var") {
        ExitCodes::INVALID_ARGS
    } else if msg.contains("did not pass") || msg.contains("teardown") {
        ExitCodes::TEST_FAILURE
    } else if msg.contains("terraform") || msg.contains("init") || msg.contains("apply")
        || msg.contains("destroy") || msg.contains("plan")
    {
        ExitCodes::TERRAFORM_ERROR
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
