//! kodegen_scm_release - release a version controlled project.
//!
//! This binary runs the release pipeline against a project directory and
//! reverts repository changes when a step fails.

use kodegen_scm_release::cli;
use kodegen_scm_release::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    let args = cli::parse_args();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    match cli::run(args).await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Create output manager for error display (never quiet for fatal errors)
            let output = OutputManager::new(false);
            output.error(&format!("Fatal error: {e}"));

            // Show recovery suggestions for critical errors
            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&suggestion);
                }
            }

            process::exit(1);
        }
    }
}
