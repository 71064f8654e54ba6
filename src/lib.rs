//! # IPA Uploader
//!
//! Publish iOS application binaries (`.ipa`) as GitHub release assets, together
//! with an over-the-air installation manifest (`.plist`) that lets devices
//! install the binary straight from the release.
//!
//! The pipeline is short and strictly fail-fast:
//!
//! 1. Extract embedded metadata (bundle identifier, display name, version,
//!    build number) from every `.ipa` binary.
//! 2. Derive the release tag, version, and build number when the caller omits
//!    them, from the first binary's metadata.
//! 3. Render one installation manifest per `.ipa` from the embedded template.
//! 4. Create (or reuse a draft of) the GitHub release and upload all assets,
//!    reporting byte-level progress.
//! 5. Remove the generated manifests from disk and return a summary.
//!
//! ## Usage
//!
//! ```bash
//! ipa_uploader --owner my-org --repo my-app --tag-prefix rel \
//!     --icon-url https://example.com/icon57.png MyApp.ipa
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod assets;
pub mod cli;
pub mod error;
pub mod github;
pub mod manifest;
pub mod metadata;
pub mod publish;

// Re-export main types for public API
pub use assets::{Asset, CollectedAssets};
pub use error::{
    CliError, ExtractionError, ManifestError, PublishError, Result, UploaderError,
};
pub use github::{GitHubPublisher, ProgressEvent, Release};
pub use metadata::ExtractedMetadata;
pub use publish::upload;

use std::path::PathBuf;

/// Input configuration for a publish operation
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// GitHub token (credential, required)
    pub token: String,
    /// Release tag; derived from tag_prefix + version + build number when absent
    pub tag: Option<String>,
    /// Prefix for the derived tag (used only if tag is absent)
    pub tag_prefix: Option<String>,
    /// Explicit application version; filled from binary metadata when absent
    pub version: Option<String>,
    /// Explicit build number; filled from binary metadata when absent
    pub build_number: Option<String>,
    /// Binaries to publish, in upload order
    pub binaries: Vec<Binary>,
    /// Directory generated manifests are written to (defaults to the system temp dir)
    pub manifest_dir: Option<PathBuf>,
    /// GitHub API base URL override (for GitHub Enterprise)
    pub api_url: Option<String>,
}

impl PublishRequest {
    /// Create a request with the required coordinates and no binaries
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            tag: None,
            tag_prefix: None,
            version: None,
            build_number: None,
            binaries: Vec::new(),
            manifest_dir: None,
            api_url: None,
        }
    }
}

/// A distributable artifact to attach to the release
#[derive(Debug, Clone)]
pub struct Binary {
    /// File-system path to the artifact
    pub path: PathBuf,
    /// Icon URL embedded in the installation manifest (only used for `.ipa` binaries)
    pub icon_url: Option<String>,
}

impl Binary {
    /// Create a binary entry without an icon
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            icon_url: None,
        }
    }

    /// Attach an icon URL for the installation manifest
    pub fn with_icon_url(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = Some(icon_url.into());
        self
    }
}

/// Result of a successful publish operation
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Application version (explicit or derived from binary metadata)
    pub version: Option<String>,
    /// Build number (explicit or derived from binary metadata)
    pub build_number: Option<String>,
    /// Basename of the last generated installation manifest, if any
    pub plist: Option<String>,
    /// The remote release the assets were attached to
    pub release: Release,
}
