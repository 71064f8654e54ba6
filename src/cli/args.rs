//! Command line argument parsing and validation.

use crate::error::{CliError, Result};
use crate::{Binary, PublishRequest};
use clap::Parser;
use std::path::PathBuf;

/// Publish .ipa binaries as GitHub release assets with an OTA manifest
#[derive(Parser, Debug)]
#[command(
    name = "ipa_uploader",
    version,
    about = "Publish .ipa binaries as GitHub release assets with an OTA installation manifest",
    long_about = "Upload iOS application binaries to a GitHub release and generate the
property-list manifest devices use to install them over the air.

Usage:
  ipa_uploader --owner my-org --repo my-app MyApp.ipa
  ipa_uploader --owner my-org --repo my-app --tag-prefix rel --icon-url https://example.com/icon.png MyApp.ipa dsyms.zip"
)]
pub struct Args {
    /// Repository owner
    #[arg(long)]
    pub owner: String,

    /// Repository name
    #[arg(long)]
    pub repo: String,

    /// GitHub token (falls back to GH_TOKEN, then GITHUB_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Release tag (derived from --tag-prefix, version, and build number when omitted)
    #[arg(long)]
    pub tag: Option<String>,

    /// Prefix for the derived tag
    #[arg(long)]
    pub tag_prefix: Option<String>,

    /// Application version (read from the .ipa when omitted)
    #[arg(long = "app-version")]
    pub app_version: Option<String>,

    /// Build number (read from the .ipa when omitted)
    #[arg(long)]
    pub build_number: Option<String>,

    /// Icon URL embedded in the installation manifest of every .ipa
    #[arg(long)]
    pub icon_url: Option<String>,

    /// Directory generated manifests are written to (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub manifest_dir: Option<PathBuf>,

    /// GitHub API base URL (for GitHub Enterprise, e.g. https://ghe.example.com/api/v3)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Binaries to upload, in order
    #[arg(value_name = "BINARY", required = true)]
    pub binaries: Vec<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolve the arguments into a publish request.
    ///
    /// Token lookup order: `--token`, then `GH_TOKEN`, then `GITHUB_TOKEN`.
    pub fn into_request(self) -> Result<PublishRequest> {
        let token = self
            .token
            .or_else(|| std::env::var("GH_TOKEN").ok())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .ok_or_else(|| CliError::InvalidArguments {
                reason: "GitHub token not provided. Set GH_TOKEN or GITHUB_TOKEN \
                         or use --token"
                    .to_string(),
            })?;

        let binaries = self
            .binaries
            .into_iter()
            .map(|path| Binary {
                path,
                icon_url: self.icon_url.clone(),
            })
            .collect();

        Ok(PublishRequest {
            owner: self.owner,
            repo: self.repo,
            token,
            tag: self.tag,
            tag_prefix: self.tag_prefix,
            version: self.app_version,
            build_number: self.build_number,
            binaries,
            manifest_dir: self.manifest_dir,
            api_url: self.api_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from([
            "ipa_uploader",
            "--owner",
            "acme",
            "--repo",
            "rocket",
            "--token",
            "t0ken",
            "Rocket.ipa",
        ])
    }

    #[test]
    fn explicit_token_wins() {
        let request = base_args().into_request().expect("request");
        assert_eq!(request.token, "t0ken");
        assert_eq!(request.owner, "acme");
        assert_eq!(request.binaries.len(), 1);
    }

    #[test]
    fn icon_url_applies_to_every_binary() {
        let args = Args::parse_from([
            "ipa_uploader",
            "--owner",
            "acme",
            "--repo",
            "rocket",
            "--token",
            "t",
            "--icon-url",
            "https://example.com/icon.png",
            "A.ipa",
            "B.ipa",
        ]);
        let request = args.into_request().expect("request");
        assert!(request
            .binaries
            .iter()
            .all(|b| b.icon_url.as_deref() == Some("https://example.com/icon.png")));
    }
}
