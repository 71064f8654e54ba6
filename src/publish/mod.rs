//! Pipeline orchestration: collect assets, publish, clean up.

use crate::assets::{self, Asset};
use crate::error::{CliError, Result};
use crate::github::{GitHubPublisher, ProgressEvent};
use crate::{PublishRequest, PublishResult};
use tokio::sync::mpsc::UnboundedSender;

/// Run the full publish pipeline for `request`.
///
/// Sequencing: collect the asset set (extracting metadata and rendering
/// manifests), publish everything to the GitHub release, then remove the
/// generated manifest files from disk. Manifests are removed on failure
/// paths too, so nothing generated outlives the operation. The first error
/// anywhere aborts the remaining work and is returned unchanged.
pub async fn upload(
    request: &PublishRequest,
    progress: Option<UnboundedSender<ProgressEvent>>,
) -> Result<PublishResult> {
    validate(request)?;

    // The publisher is constructed before any manifest is written so a
    // client-construction failure cannot leak generated files
    let mut publisher = GitHubPublisher::new(request.token.as_str())?;
    if let Some(api_url) = &request.api_url {
        publisher = publisher.with_api_url(api_url.as_str());
    }

    let collected = assets::collect(request).await?;

    let outcome = publisher
        .publish(
            &request.owner,
            &request.repo,
            &collected.tag,
            &collected.assets,
            progress,
        )
        .await;

    // Generated manifests never persist, whether the publish succeeded or not
    let plist = cleanup_manifests(&collected.assets).await;
    let release = outcome?;

    Ok(PublishResult {
        version: collected.version,
        build_number: collected.build_number,
        plist,
        release,
    })
}

fn validate(request: &PublishRequest) -> Result<()> {
    for (argument, value) in [
        ("owner", &request.owner),
        ("repo", &request.repo),
        ("token", &request.token),
    ] {
        if value.is_empty() {
            return Err(CliError::MissingArgument {
                argument: argument.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

/// Delete every generated manifest from local disk, returning the basename
/// of the last one found. Deletion failures are logged, not propagated.
pub(crate) async fn cleanup_manifests(assets: &[Asset]) -> Option<String> {
    let mut last_basename = None;
    for asset in assets {
        let Asset::Manifest(path) = asset else {
            continue;
        };
        if let Err(error) = tokio::fs::remove_file(path).await {
            log::warn!("Failed to remove manifest {}: {error}", path.display());
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            last_basename = Some(name.to_string());
        }
    }
    last_basename
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn requests_missing_coordinates_are_rejected() {
        let request = PublishRequest::new("", "rocket", "token");
        assert!(validate(&request).is_err());
        let request = PublishRequest::new("acme", "rocket", "");
        assert!(validate(&request).is_err());
        let request = PublishRequest::new("acme", "rocket", "token");
        assert!(validate(&request).is_ok());
    }

    #[tokio::test]
    async fn cleanup_removes_manifests_and_keeps_binaries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ipa = dir.path().join("App.ipa");
        let first = dir.path().join("App.plist");
        let second = dir.path().join("Other.plist");
        for path in [&ipa, &first, &second] {
            std::fs::write(path, b"contents").expect("write fixture");
        }

        let assets = vec![
            Asset::Binary(ipa.clone()),
            Asset::Manifest(first.clone()),
            Asset::Manifest(second.clone()),
        ];
        let plist = cleanup_manifests(&assets).await;

        assert_eq!(plist.as_deref(), Some("Other.plist"));
        assert!(ipa.exists());
        assert!(!first.exists());
        assert!(!second.exists());
    }

    #[tokio::test]
    async fn cleanup_with_no_manifests_reports_none() {
        let assets = vec![Asset::Binary(PathBuf::from("/tmp/App.zip"))];
        assert_eq!(cleanup_manifests(&assets).await, None);
    }
}
