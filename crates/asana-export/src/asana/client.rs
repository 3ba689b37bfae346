//! Typed accessors for the remote resources the exporter walks
//!
//! Each accessor is a thin wrapper over one endpoint. List endpoints run
//! through the cursor-following [`AsanaClient::fetch_all`] loop;
//! single-record endpoints unwrap the `{"data": ...}` envelope. Failures
//! are surfaced as [`FetchError`] values; the caller decides how far a
//! failure reaches, which for the exporter is never past the resource that
//! failed.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use asana_export_core::model::{Envelope, Page, Resource};

use super::AsanaConfig;

/// Why a single remote fetch failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("decoding response from {url} failed: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("writing {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("attachment {gid} has no download_url")]
    MissingDownloadUrl { gid: String },
}

/// Records accumulated from a paginated endpoint, plus the failure that cut
/// enumeration short, if any. Partial results are kept by contract: one bad
/// page must not throw away the pages that preceded it.
#[derive(Debug, Default)]
pub struct Listing {
    pub records: Vec<Resource>,
    pub failure: Option<FetchError>,
}

/// Authenticated client over the remote API.
///
/// Attachment payloads are fetched with a separate header-free client:
/// their URLs are pre-signed by the storage backend, which may reject a
/// forwarded bearer token.
pub struct AsanaClient {
    http: reqwest::Client,
    downloads: reqwest::Client,
    base_url: String,
    workspace: String,
    page_size: usize,
}

impl AsanaClient {
    pub const DEFAULT_PAGE_SIZE: usize = 100;

    pub fn new(http: reqwest::Client, config: &AsanaConfig) -> Self {
        Self {
            http,
            downloads: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            workspace: config.workspace.clone(),
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }

    /// All projects in the configured workspace, with team handles included.
    pub async fn list_projects(&self) -> Listing {
        let url = format!("{}/workspaces/{}/projects", self.base_url, self.workspace);
        self.fetch_all(&url, &[("opt_fields", "team,name")]).await
    }

    /// Teams of the authenticated user, filtered to the workspace.
    pub async fn list_teams(&self) -> Listing {
        let url = format!("{}/users/me/teams", self.base_url);
        self.fetch_all(&url, &[("workspace", self.workspace.as_str())])
            .await
    }

    pub async fn get_team(&self, gid: &str) -> Result<Resource, FetchError> {
        self.get_record(&format!("{}/teams/{gid}", self.base_url))
            .await
    }

    pub async fn get_project(&self, gid: &str) -> Result<Resource, FetchError> {
        self.get_record(&format!("{}/projects/{gid}", self.base_url))
            .await
    }

    pub async fn list_project_tasks(&self, project_gid: &str) -> Listing {
        let url = format!("{}/projects/{project_gid}/tasks", self.base_url);
        self.fetch_all(&url, &[]).await
    }

    pub async fn get_task(&self, gid: &str) -> Result<Resource, FetchError> {
        self.get_record(&format!("{}/tasks/{gid}", self.base_url))
            .await
    }

    pub async fn list_subtasks(&self, task_gid: &str) -> Listing {
        let url = format!("{}/tasks/{task_gid}/subtasks", self.base_url);
        self.fetch_all(&url, &[]).await
    }

    pub async fn list_stories(&self, task_gid: &str) -> Listing {
        let url = format!("{}/tasks/{task_gid}/stories", self.base_url);
        self.fetch_all(&url, &[]).await
    }

    pub async fn list_attachments(&self, task_gid: &str) -> Listing {
        let url = format!("{}/tasks/{task_gid}/attachments", self.base_url);
        self.fetch_all(&url, &[]).await
    }

    pub async fn get_attachment(&self, gid: &str) -> Result<Resource, FetchError> {
        self.get_record(&format!("{}/attachments/{gid}", self.base_url))
            .await
    }

    /// Stream an attachment payload to `dest` in bounded chunks, never
    /// buffering the whole file in memory.
    pub async fn download_attachment(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let response = self
            .downloads
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        let response = check_status(response, url).await?;

        let mut file =
            tokio::fs::File::create(dest)
                .await
                .map_err(|source| FetchError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|source| FetchError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;
        }
        file.flush().await.map_err(|source| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Follow the server-issued cursor until the final page.
    ///
    /// The cursor is adopted verbatim from each response and omitted on the
    /// first request; once a page arrives without one, enumeration is done
    /// and no further request is made. Any failure stops the loop and is
    /// recorded next to whatever was accumulated.
    async fn fetch_all(&self, url: &str, params: &[(&str, &str)]) -> Listing {
        let page_size = self.page_size.to_string();
        let mut listing = Listing::default();
        let mut offset: Option<String> = None;
        loop {
            let result = {
                let mut query: Vec<(&str, &str)> = vec![("limit", &page_size)];
                query.extend_from_slice(params);
                if let Some(cursor) = offset.as_deref() {
                    query.push(("offset", cursor));
                }
                self.get_json::<Page>(url, &query).await
            };
            match result {
                Ok(page) => {
                    listing.records.extend(page.data);
                    match page.next_page.and_then(|next| next.offset) {
                        Some(cursor) => offset = Some(cursor),
                        None => break,
                    }
                }
                Err(failure) => {
                    log::warn!("stopping enumeration of {url}: {failure}");
                    listing.failure = Some(failure);
                    break;
                }
            }
        }
        listing
    }

    async fn get_record(&self, url: &str) -> Result<Resource, FetchError> {
        Ok(self.get_json::<Envelope>(url, &[]).await?.data)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        let response = check_status(response, url).await?;
        response.json().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Check that an HTTP response was successful, returning the typed failure
/// (with the response body) otherwise.
async fn check_status(
    response: reqwest::Response,
    url: &str,
) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Status {
        url: url.to_string(),
        status,
        body,
    })
}
