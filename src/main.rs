//! IPA Uploader - publish .ipa binaries as GitHub release assets.
//!
//! This binary uploads iOS application binaries to a GitHub release together
//! with the property-list manifest devices use to install them over the air.

use ipa_uploader::cli;
use ipa_uploader::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::new();
            output.error(&format!("Fatal error: {e}"));

            if e.is_recoverable() {
                let suggestions = e.recovery_suggestions();
                if !suggestions.is_empty() {
                    let _ = output.println("\n💡 Recovery suggestions:");
                    for suggestion in suggestions {
                        let _ = output.indent(&suggestion);
                    }
                }
            }

            process::exit(1);
        }
    }
}
