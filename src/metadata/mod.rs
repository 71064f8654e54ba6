//! Metadata extraction from `.ipa` binaries.
//!
//! An `.ipa` is a ZIP archive containing `Payload/<App>.app/Info.plist`; the
//! property list carries the application's identity. Parsing is CPU/IO-bound
//! and runs under `spawn_blocking` so it never stalls the async runtime.

use crate::error::ExtractionError;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// Application metadata embedded in a package binary
#[derive(Debug, Clone)]
pub struct ExtractedMetadata {
    /// `CFBundleIdentifier`
    pub bundle_identifier: String,
    /// `CFBundleDisplayName` (falls back to `CFBundleName`)
    pub app_name: String,
    /// `CFBundleShortVersionString`
    pub version: String,
    /// `CFBundleVersion`
    pub build_number: String,
}

/// Extract embedded application metadata from the binary at `path`.
///
/// Resolves exactly once: either the metadata or an [`ExtractionError`].
pub async fn extract(path: &Path) -> Result<ExtractedMetadata, ExtractionError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_info_plist(&path))
        .await
        .map_err(|e| ExtractionError::Join {
            reason: e.to_string(),
        })?
}

/// Matches `Payload/<App>.app/Info.plist` with exactly one directory level
/// under `Payload/`. Nested frameworks and plugins carry their own
/// Info.plist entries deeper in the tree and must not match.
fn is_app_info_plist(entry_name: &str) -> bool {
    let Some(rest) = entry_name.strip_prefix("Payload/") else {
        return false;
    };
    let mut parts = rest.split('/');
    matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(app), Some("Info.plist"), None) if app.ends_with(".app")
    )
}

fn read_info_plist(path: &PathBuf) -> Result<ExtractedMetadata, ExtractionError> {
    let file = std::fs::File::open(path).map_err(|source| ExtractionError::Open {
        path: path.clone(),
        source,
    })?;

    let mut archive = zip::ZipArchive::new(file).map_err(|e| ExtractionError::Archive {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let entry_name = archive
        .file_names()
        .find(|name| is_app_info_plist(name))
        .map(str::to_owned)
        .ok_or_else(|| ExtractionError::InfoPlistNotFound { path: path.clone() })?;

    let mut raw = Vec::new();
    archive
        .by_name(&entry_name)
        .map_err(|e| ExtractionError::Archive {
            path: path.clone(),
            reason: e.to_string(),
        })?
        .read_to_end(&mut raw)
        .map_err(|e| ExtractionError::Archive {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    // plist::Value handles both the XML and binary plist encodings
    let value = plist::Value::from_reader(Cursor::new(raw)).map_err(|e| ExtractionError::Plist {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let dict = value
        .as_dictionary()
        .ok_or_else(|| ExtractionError::Plist {
            path: path.clone(),
            reason: "root value is not a dictionary".to_string(),
        })?;

    let required = |key: &str| -> Result<String, ExtractionError> {
        dict.get(key)
            .and_then(plist::Value::as_string)
            .map(str::to_owned)
            .ok_or_else(|| ExtractionError::MissingKey {
                key: key.to_string(),
                path: path.clone(),
            })
    };

    let app_name = match dict
        .get("CFBundleDisplayName")
        .and_then(plist::Value::as_string)
    {
        Some(name) => name.to_owned(),
        None => required("CFBundleName")?,
    };

    Ok(ExtractedMetadata {
        bundle_identifier: required("CFBundleIdentifier")?,
        app_name,
        version: required("CFBundleShortVersionString")?,
        build_number: required("CFBundleVersion")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_info_plist_matching() {
        assert!(is_app_info_plist("Payload/MyApp.app/Info.plist"));
        assert!(!is_app_info_plist("Payload/Info.plist"));
        assert!(!is_app_info_plist("Payload/MyApp.app/Frameworks/X.framework/Info.plist"));
        assert!(!is_app_info_plist("MyApp.app/Info.plist"));
        assert!(!is_app_info_plist("Payload/MyApp.bundle/Info.plist"));
    }
}
