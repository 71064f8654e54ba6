//! Comprehensive error types for ipa_uploader operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ipa_uploader operations
pub type Result<T> = std::result::Result<T, UploaderError>;

/// Main error type for all ipa_uploader operations
#[derive(Error, Debug)]
pub enum UploaderError {
    /// Binary metadata extraction errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Installation manifest errors
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Remote publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reading embedded application metadata out of a binary
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Binary file could not be opened
    #[error("Could not open binary at {path}: {source}")]
    Open {
        /// Path to the binary
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Binary is not a readable package archive
    #[error("Invalid package archive at {path}: {reason}")]
    Archive {
        /// Path to the binary
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Package contains no application property list
    #[error("No Payload/*.app/Info.plist entry found in {path}")]
    InfoPlistNotFound {
        /// Path to the binary
        path: PathBuf,
    },

    /// Embedded property list could not be parsed
    #[error("Malformed Info.plist in {path}: {reason}")]
    Plist {
        /// Path to the binary
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Required metadata key missing from the property list
    #[error("Info.plist in {path} is missing required key '{key}'")]
    MissingKey {
        /// Property list key that was expected
        key: String,
        /// Path to the binary
        path: PathBuf,
    },

    /// Background extraction task failed to complete
    #[error("Metadata extraction task failed: {reason}")]
    Join {
        /// Reason for the error
        reason: String,
    },
}

/// Errors producing the installation manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file could not be written
    #[error("Failed to write manifest to {path}: {source}")]
    Write {
        /// Path the manifest was being written to
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Remote publishing errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// GitHub rejected the provided credentials
    #[error("GitHub authentication failed: {reason}")]
    Authentication {
        /// Reason for the error
        reason: String,
    },

    /// Network-level failure talking to GitHub
    #[error("Network error during publishing: {0}")]
    Network(#[from] reqwest::Error),

    /// GitHub API returned an error status
    #[error("GitHub API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// A published (non-draft) release already exists for the tag
    #[error("A published release already exists for tag '{tag}'; refusing to overwrite it")]
    ReleaseAlreadyPublished {
        /// Release tag
        tag: String,
    },

    /// Asset path has no usable file name
    #[error("Invalid asset path: {path}")]
    InvalidAssetPath {
        /// Offending path
        path: PathBuf,
    },

    /// Asset file could not be read for upload
    #[error("Failed to read asset {path}: {source}")]
    AssetRead {
        /// Path to the asset
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

impl UploaderError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            UploaderError::Publish(PublishError::Authentication { .. }) => vec![
                "Verify the token is valid and has the 'repo' scope".to_string(),
                "Set GH_TOKEN or GITHUB_TOKEN, or pass --token".to_string(),
            ],
            UploaderError::Publish(PublishError::ReleaseAlreadyPublished { tag }) => vec![
                format!("Delete the existing release for '{}' or choose a different tag", tag),
                "Pass --tag to publish under a new tag".to_string(),
            ],
            UploaderError::Extraction(ExtractionError::InfoPlistNotFound { .. }) => vec![
                "Check that the file is a valid .ipa produced by Xcode or an export tool".to_string(),
            ],
            UploaderError::Cli(CliError::InvalidArguments { .. })
            | UploaderError::Cli(CliError::MissingArgument { .. }) => vec![
                "Run with --help for usage information".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by adjusting inputs and retrying
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            UploaderError::Extraction(ExtractionError::Archive { .. })
                | UploaderError::Extraction(ExtractionError::Plist { .. })
                | UploaderError::Publish(PublishError::ReleaseAlreadyPublished { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_are_recoverable_with_suggestions() {
        let error = UploaderError::Cli(CliError::InvalidArguments {
            reason: "GitHub token not provided".to_string(),
        });
        assert!(error.is_recoverable());
        assert!(!error.recovery_suggestions().is_empty());
    }

    #[test]
    fn corrupt_binaries_are_not_recoverable() {
        let error = UploaderError::Extraction(ExtractionError::Archive {
            path: "Broken.ipa".into(),
            reason: "invalid Zip archive".to_string(),
        });
        assert!(!error.is_recoverable());

        let error = UploaderError::Publish(PublishError::ReleaseAlreadyPublished {
            tag: "v1".to_string(),
        });
        assert!(!error.is_recoverable());
    }
}
