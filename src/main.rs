//! snowpoc_bundler - package a Python project with pinned LangChain
//! dependencies and publish the archive to a Snowflake stage.

use snowpoc_bundler::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  {}", suggestion);
            }
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
