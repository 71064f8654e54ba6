//! Terminal rendering of upload progress events.
//!
//! One progress bar per asset: torn down before the next asset's upload
//! begins, never shown when nothing uploads. Events arrive on a channel and
//! are consumed purely for display.

use crate::github::ProgressEvent;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Spawn the progress renderer task.
///
/// Returns the sender to hand to the publisher and the handle to await once
/// the pipeline is done (the task ends when all senders are dropped).
pub fn spawn_renderer() -> (mpsc::UnboundedSender<ProgressEvent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();

    let handle = tokio::spawn(async move {
        let mut bar: Option<ProgressBar> = None;

        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::AssetStarted { name, total_bytes } => {
                    if let Some(previous) = bar.take() {
                        previous.finish_and_clear();
                    }
                    let pb = ProgressBar::new(total_bytes);
                    if let Ok(style) = ProgressStyle::default_bar().template(&format!(
                        "Uploading {name} [{{bar:40.cyan/blue}}] {{percent:>3}}% | ETA: {{eta}} | {{bytes}}/{{total_bytes}}"
                    )) {
                        pb.set_style(style.progress_chars("█▓░"));
                    }
                    bar = Some(pb);
                }
                ProgressEvent::BytesTransferred { transferred, .. } => {
                    if let Some(pb) = &bar {
                        pb.set_position(transferred);
                    }
                }
            }
        }

        if let Some(pb) = bar.take() {
            pb.finish_and_clear();
        }
    });

    (tx, handle)
}
