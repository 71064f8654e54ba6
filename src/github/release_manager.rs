//! GitHub release creation and asset upload over the REST API.

use crate::assets::Asset;
use crate::error::PublishError;
use crate::github::ProgressEvent;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header;
use serde::Deserialize;
use std::path::Path;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::io::ReaderStream;

const DEFAULT_API_URL: &str = "https://api.github.com";
const GITHUB_JSON: &str = "application/vnd.github+json";

/// A release on the remote code-hosting service
///
/// Opaque to the pipeline beyond being handed back to the caller; the fields
/// mirror the GitHub API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release ID
    pub id: u64,
    /// Tag the release is published under
    pub tag_name: String,
    /// Human-facing release page URL
    pub html_url: String,
    /// Hypermedia upload URL template for attaching assets
    pub upload_url: String,
    /// Whether the release is a draft
    pub draft: bool,
    /// Whether the release is marked as a prerelease
    pub prerelease: bool,
    /// Assets already attached to the release
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// An asset already attached to a remote release
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset file name
    pub name: String,
    /// Asset size in bytes
    pub size: u64,
    /// Public download URL
    pub browser_download_url: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// GitHub release publisher
///
/// Behavior contract: reuse an existing draft release matching the tag, never
/// a published one; create the release undecorated (no name, no notes, not a
/// draft or prerelease, no target commit override); upload every asset as
/// given, sequentially, with no pre-checks and no deduplication.
pub struct GitHubPublisher {
    http: reqwest::Client,
    token: String,
    api_url: String,
}

impl GitHubPublisher {
    /// Create a publisher authenticating with `token`
    pub fn new(token: impl Into<String>) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ipa_uploader/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Override the API base URL (GitHub Enterprise, e.g. `https://ghe.example.com/api/v3`)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create or reuse the release for `tag` and upload all `assets` in order.
    ///
    /// Progress events are emitted on `progress` while each asset streams up.
    /// The first failure aborts the operation; assets already uploaded stay
    /// on the release.
    pub async fn publish(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        assets: &[Asset],
        progress: Option<UnboundedSender<ProgressEvent>>,
    ) -> Result<Release, PublishError> {
        let releases = self.list_releases(owner, repo).await?;
        let release = match find_reusable_draft(&releases, tag)? {
            Some(existing) => {
                log::info!("Reusing draft release {} for tag {tag}", existing.id);
                existing.clone()
            }
            None => self.create_release(owner, repo, tag).await?,
        };

        for asset in assets {
            self.upload_asset(&release, asset.path(), progress.as_ref())
                .await?;
        }

        Ok(release)
    }

    /// List all of the repository's releases, following pagination so a
    /// reusable draft is found even past the first page.
    async fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, PublishError> {
        let url = format!("{}/repos/{owner}/{repo}/releases", self.api_url);
        let mut releases = Vec::new();
        let mut page: u32 = 1;
        loop {
            let page_param = page.to_string();
            let response = self
                .http
                .get(&url)
                .query(&[("per_page", "100"), ("page", page_param.as_str())])
                .bearer_auth(&self.token)
                .header(header::ACCEPT, GITHUB_JSON)
                .send()
                .await?;
            let batch: Vec<Release> = check_response(response).await?.json().await?;
            let full_page = batch.len() == 100;
            releases.extend(batch);
            if !full_page {
                return Ok(releases);
            }
            page += 1;
        }
    }

    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Release, PublishError> {
        let url = format!("{}/repos/{owner}/{repo}/releases", self.api_url);
        let body = serde_json::json!({
            "tag_name": tag,
            "draft": false,
            "prerelease": false,
        });
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, GITHUB_JSON)
            .json(&body)
            .send()
            .await?;
        let release: Release = check_response(response).await?.json().await?;
        log::info!("Created release {} for tag {tag}", release.id);
        Ok(release)
    }

    async fn upload_asset(
        &self,
        release: &Release,
        path: &Path,
        progress: Option<&UnboundedSender<ProgressEvent>>,
    ) -> Result<(), PublishError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| PublishError::InvalidAssetPath {
                path: path.to_path_buf(),
            })?
            .to_owned();

        let total_bytes = tokio::fs::metadata(path)
            .await
            .map_err(|source| PublishError::AssetRead {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        if let Some(tx) = progress {
            let _ = tx.send(ProgressEvent::AssetStarted {
                name: name.clone(),
                total_bytes,
            });
        }

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| PublishError::AssetRead {
                path: path.to_path_buf(),
                source,
            })?;

        let progress_tx = progress.cloned();
        let progress_name = name.clone();
        let mut transferred: u64 = 0;
        let body_stream = ReaderStream::new(file).map(move |chunk: std::io::Result<Bytes>| {
            if let (Some(tx), Ok(bytes)) = (&progress_tx, &chunk) {
                transferred += bytes.len() as u64;
                let _ = tx.send(ProgressEvent::BytesTransferred {
                    name: progress_name.clone(),
                    transferred,
                    total_bytes,
                });
            }
            chunk
        });

        let response = self
            .http
            .post(upload_endpoint(release))
            .query(&[("name", name.as_str())])
            .bearer_auth(&self.token)
            .header(header::ACCEPT, GITHUB_JSON)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(header::CONTENT_LENGTH, total_bytes)
            .body(reqwest::Body::wrap_stream(body_stream))
            .send()
            .await?;
        check_response(response).await?;

        log::info!("Uploaded asset {name} ({total_bytes} bytes)");
        Ok(())
    }
}

/// Pick the release to attach assets to. Only a draft with a matching tag is
/// reusable; a published release with the tag is a hard error.
fn find_reusable_draft<'a>(
    releases: &'a [Release],
    tag: &str,
) -> Result<Option<&'a Release>, PublishError> {
    match releases.iter().find(|release| release.tag_name == tag) {
        Some(release) if release.draft => Ok(Some(release)),
        Some(_) => Err(PublishError::ReleaseAlreadyPublished {
            tag: tag.to_string(),
        }),
        None => Ok(None),
    }
}

/// The `upload_url` the API returns is a hypermedia template ending in
/// `{?name,label}`; everything from the brace on is dropped.
fn upload_endpoint(release: &Release) -> &str {
    release
        .upload_url
        .split('{')
        .next()
        .unwrap_or(&release.upload_url)
}

async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, PublishError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PublishError::Authentication { reason: message });
    }
    Err(PublishError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(tag: &str, draft: bool) -> Release {
        Release {
            id: 7,
            tag_name: tag.to_string(),
            html_url: format!("https://github.com/acme/rocket/releases/tag/{tag}"),
            upload_url: "https://uploads.github.com/repos/acme/rocket/releases/7/assets{?name,label}".to_string(),
            draft,
            prerelease: false,
            assets: Vec::new(),
        }
    }

    #[test]
    fn draft_with_matching_tag_is_reused() {
        let releases = vec![release("v1", true)];
        let found = find_reusable_draft(&releases, "v1").expect("ok");
        assert_eq!(found.map(|r| r.id), Some(7));
    }

    #[test]
    fn published_release_with_matching_tag_is_an_error() {
        let releases = vec![release("v1", false)];
        let error = find_reusable_draft(&releases, "v1").expect_err("must fail");
        assert!(matches!(
            error,
            PublishError::ReleaseAlreadyPublished { tag } if tag == "v1"
        ));
    }

    #[test]
    fn no_matching_tag_means_create_new() {
        let releases = vec![release("v1", true), release("v2", false)];
        assert!(find_reusable_draft(&releases, "v3").expect("ok").is_none());
    }

    #[test]
    fn upload_endpoint_strips_hypermedia_template() {
        let release = release("v1", true);
        assert_eq!(
            upload_endpoint(&release),
            "https://uploads.github.com/repos/acme/rocket/releases/7/assets"
        );
    }
}
