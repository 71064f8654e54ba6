//! Command line interface for ipa_uploader.

mod args;
mod output;
mod progress;

pub use args::Args;
pub use output::OutputManager;
pub use progress::spawn_renderer;

use crate::error::Result;
use crate::publish;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let output = OutputManager::new();

    let request = args.into_request()?;

    let _ = output.info(&format!(
        "Publishing {} binaries to {}/{}",
        request.binaries.len(),
        request.owner,
        request.repo
    ));

    let (progress_tx, renderer) = progress::spawn_renderer();
    let result = publish::upload(&request, Some(progress_tx)).await;
    // Channel is closed once the pipeline drops its sender
    let _ = renderer.await;

    let outcome = result?;

    let _ = output.success(&format!("Published release {}", outcome.release.html_url));
    if let Some(version) = &outcome.version {
        let _ = output.indent(&format!("version:      {version}"));
    }
    if let Some(build_number) = &outcome.build_number {
        let _ = output.indent(&format!("build number: {build_number}"));
    }
    if let Some(plist) = &outcome.plist {
        let _ = output.indent(&format!("manifest:     {plist}"));
    }

    Ok(0)
}
