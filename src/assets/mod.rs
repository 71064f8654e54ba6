//! Asset collection: turning requested binaries into the upload set.
//!
//! Every requested binary is uploaded as-is. Binaries in the installable
//! package format (file name ends with `.ipa`, case-insensitively) also get
//! a generated installation manifest, placed immediately after the binary in
//! the upload order.
//!
//! Collection is all-or-nothing: metadata extraction and manifest rendering
//! fan out concurrently, and the first failure discards all partial results,
//! removing any manifest files already written.

use crate::error::{CliError, Result};
use crate::manifest::{self, ManifestParams};
use crate::metadata;
use crate::{Binary, PublishRequest};
use futures::future;
use std::path::{Path, PathBuf};

/// A file destined for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    /// An original binary supplied by the caller
    Binary(PathBuf),
    /// A generated installation manifest; deleted from disk after publishing
    Manifest(PathBuf),
}

impl Asset {
    /// File-system path of the asset
    pub fn path(&self) -> &Path {
        match self {
            Asset::Binary(path) | Asset::Manifest(path) => path,
        }
    }

    /// Whether this asset is a generated installation manifest
    pub fn is_manifest(&self) -> bool {
        matches!(self, Asset::Manifest(_))
    }
}

/// The resolved upload set plus the release coordinates derived for it
#[derive(Debug)]
pub struct CollectedAssets {
    /// Assets in upload order; each manifest directly follows its binary
    pub assets: Vec<Asset>,
    /// Application version (explicit or from the first package binary)
    pub version: Option<String>,
    /// Build number (explicit or from the first package binary)
    pub build_number: Option<String>,
    /// Release tag (explicit or `tagPrefix_version_buildNumber`)
    pub tag: String,
}

/// Whether the binary is in the package format that needs a manifest.
/// Matching is on the basename only and case-insensitive.
pub fn is_package_binary(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.to_lowercase().ends_with(".ipa"))
}

fn binary_file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            CliError::InvalidArguments {
                reason: format!("Invalid binary file name: {}", path.display()),
            }
            .into()
        })
}

/// Produce the final asset list and resolved release coordinates.
///
/// Metadata is extracted from all package-format binaries concurrently, the
/// coordinates are resolved once from the first binary's metadata (explicit
/// request values always win), and the manifests are rendered concurrently
/// against those coordinates.
pub async fn collect(request: &PublishRequest) -> Result<CollectedAssets> {
    let candidates: Vec<&Binary> = request
        .binaries
        .iter()
        .filter(|binary| is_package_binary(&binary.path))
        .collect();

    // Fan-out: extract metadata from every package binary, fail on the first error
    let extracted = future::try_join_all(
        candidates.iter().map(|binary| metadata::extract(&binary.path)),
    )
    .await?;

    // Single writer: resolve coordinates once, from the first binary's metadata
    let first = extracted.first();
    let version = request
        .version
        .clone()
        .or_else(|| first.map(|m| m.version.clone()));
    let build_number = request
        .build_number
        .clone()
        .or_else(|| first.map(|m| m.build_number.clone()));

    let tag = match &request.tag {
        Some(tag) => tag.clone(),
        None => {
            let (Some(version), Some(build_number)) = (&version, &build_number) else {
                return Err(CliError::InvalidArguments {
                    reason: "No tag given and none derivable: supply --tag, or --app-version \
                             and --build-number, or include an .ipa binary"
                        .to_string(),
                }
                .into());
            };
            let prefix = request.tag_prefix.as_deref().unwrap_or("");
            format!("{prefix}_{version}_{build_number}")
        }
    };

    log::debug!(
        "Collecting assets for {}/{} tag {tag} ({} binaries, {} with manifests)",
        request.owner,
        request.repo,
        request.binaries.len(),
        candidates.len()
    );

    // Fan-out: render one manifest per package binary
    let manifest_dir = request
        .manifest_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let owner = request.owner.as_str();
    let repo = request.repo.as_str();
    let tag_str = tag.as_str();
    let dir = manifest_dir.as_path();
    let results = future::join_all(candidates.iter().zip(&extracted).map(
        |(&binary, extracted)| async move {
            let params = ManifestParams {
                owner,
                repo,
                tag: tag_str,
                ipa_file_name: binary_file_name(&binary.path)?,
                icon_url: binary.icon_url.as_deref().unwrap_or(""),
                metadata: extracted,
            };
            manifest::build(dir, &params)
                .await
                .map_err(crate::UploaderError::from)
        },
    ))
    .await;

    // All-or-nothing: on any failure, remove the manifests that did get written
    let mut manifests = Vec::with_capacity(results.len());
    let mut first_error: Option<crate::UploaderError> = None;
    for result in results {
        match result {
            Ok(path) => manifests.push(path),
            Err(error) => {
                first_error.get_or_insert(error);
            }
        }
    }
    if let Some(error) = first_error {
        for path in &manifests {
            if let Err(remove_error) = tokio::fs::remove_file(path).await {
                log::warn!(
                    "Failed to remove partial manifest {}: {remove_error}",
                    path.display()
                );
            }
        }
        return Err(error);
    }

    // Assemble in scheduling order: raw path, then the manifest it produced
    let mut manifest_paths = manifests.into_iter();
    let mut assets = Vec::new();
    for binary in &request.binaries {
        assets.push(Asset::Binary(binary.path.clone()));
        if is_package_binary(&binary.path) {
            if let Some(path) = manifest_paths.next() {
                assets.push(Asset::Manifest(path));
            }
        }
    }

    Ok(CollectedAssets {
        assets,
        version,
        build_number,
        tag,
    })
}
