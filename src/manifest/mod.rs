//! Installation manifest rendering.
//!
//! Devices install an `.ipa` over the air by fetching a property-list
//! manifest that points at the release asset. The manifest is rendered from
//! a fixed template by literal placeholder substitution; every occurrence of
//! each `{{ token }}` is replaced. No template engine is involved: engines
//! HTML-escape substituted values, which would corrupt download and icon
//! URLs inside the document.
//!
//! The `{{ bundileIdentifier }}` token spelling is a long-standing typo in
//! the template contract. Templates in the wild use it, so it is preserved
//! verbatim.

use crate::error::ManifestError;
use crate::metadata::ExtractedMetadata;
use std::path::{Path, PathBuf};

/// The over-the-air installation manifest template
pub const TEMPLATE: &str = include_str!("manifest_template.plist");

/// Everything the template needs for one rendering
#[derive(Debug)]
pub struct ManifestParams<'a> {
    /// Repository owner
    pub owner: &'a str,
    /// Repository name
    pub repo: &'a str,
    /// Release tag the binary is published under
    pub tag: &'a str,
    /// File name (basename) of the `.ipa` asset
    pub ipa_file_name: &'a str,
    /// Icon URL, possibly empty
    pub icon_url: &'a str,
    /// Metadata extracted from the binary
    pub metadata: &'a ExtractedMetadata,
}

/// Render `template`, replacing every occurrence of each placeholder token.
pub fn render(template: &str, params: &ManifestParams<'_>) -> String {
    template
        .replace("{{ owner }}", params.owner)
        .replace("{{ repo }}", params.repo)
        .replace("{{ tag }}", params.tag)
        .replace("{{ ipaFileName }}", params.ipa_file_name)
        .replace("{{ bundileIdentifier }}", &params.metadata.bundle_identifier)
        .replace("{{ version }}", &params.metadata.version)
        .replace("{{ buildNumber }}", &params.metadata.build_number)
        .replace("{{ appName }}", &params.metadata.app_name)
        .replace("{{ iconURL }}", params.icon_url)
}

/// Derive the manifest file name from the binary's file name: the `.ipa`
/// extension (last four characters) is dropped and `.plist` appended.
pub fn manifest_file_name(ipa_file_name: &str) -> String {
    let stem = &ipa_file_name[..ipa_file_name.len().saturating_sub(4)];
    format!("{stem}.plist")
}

/// Render the embedded template and write it into `dir`.
///
/// Creates exactly one new file per invocation and returns its path. A
/// failed write aborts the pipeline.
pub async fn build(dir: &Path, params: &ManifestParams<'_>) -> Result<PathBuf, ManifestError> {
    let rendered = render(TEMPLATE, params);
    let output_path = dir.join(manifest_file_name(params.ipa_file_name));

    tokio::fs::write(&output_path, rendered)
        .await
        .map_err(|source| ManifestError::Write {
            path: output_path.clone(),
            source,
        })?;

    log::info!("Wrote installation manifest {}", output_path.display());
    Ok(output_path)
}
