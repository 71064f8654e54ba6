//! GitHub release publishing.
//!
//! Wraps the GitHub REST API as a single-shot publish operation plus an
//! observer channel for upload progress. Progress events feed UI only and
//! never drive control flow.

mod release_manager;

pub use release_manager::{GitHubPublisher, Release, ReleaseAsset};

/// Upload progress notification, emitted per asset
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// An asset upload is about to begin
    AssetStarted {
        /// Asset file name
        name: String,
        /// Total bytes to transfer
        total_bytes: u64,
    },
    /// More bytes of the current asset have been transferred
    BytesTransferred {
        /// Asset file name
        name: String,
        /// Bytes transferred so far
        transferred: u64,
        /// Total bytes to transfer
        total_bytes: u64,
    },
}
