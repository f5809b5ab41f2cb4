//! Remote Drive access.
//!
//! # Design
//! - `DriveSource` is the seam the ingestion service depends on; tests swap in stubs.
//! - `DriveClient` receives every credential and endpoint explicitly; it never reads
//!   the environment.
//! - Every request inherits the client-wide timeout. Timeouts surface as
//!   [`DriveError::Timeout`], never as generic transport failures.
//! - The direct-download flow is a two-stage sequence: an initial request, then at
//!   most one confirmed retry when the interstitial cookie is present.

use std::collections::HashSet;

use async_trait::async_trait;
use futures_util::StreamExt;
use imgest_config::DriveSettings;
use reqwest::header::{CONTENT_TYPE, HeaderMap, SET_COOKIE};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::content::ContentKind;
use crate::error::{DriveError, DriveOperation, DriveResult};
use crate::model::{FileListPage, RemoteFileRef, SharedFile};

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";
const CONFIRM_COOKIE_PREFIX: &str = "download_warning";
const OCTET_STREAM: &str = "application/octet-stream";
/// Upper bound on the buffer reserved from a `Content-Length` header.
const MAX_PREALLOCATION: usize = 8 * 1024 * 1024;

/// Remote collaborator used by the ingestion service.
#[async_trait]
pub trait DriveSource: Send + Sync {
    /// List JPEG and PNG files directly inside a folder, in listing order.
    async fn list_images(&self, folder_id: &str) -> DriveResult<Vec<RemoteFileRef>>;

    /// Download a file's content through the API.
    async fn download_file(&self, file_id: &str) -> DriveResult<Vec<u8>>;

    /// Fetch a shared file through the direct-download endpoint.
    async fn fetch_shared_file(&self, file_id: &str) -> DriveResult<SharedFile>;
}

/// `reqwest` backed [`DriveSource`].
#[derive(Debug, Clone)]
pub struct DriveClient {
    http: Client,
    api_key: Option<String>,
    api_base: Url,
    download_base: Url,
}

enum DownloadStage {
    Initial,
    Confirmed(String),
}

impl DriveClient {
    /// Build a client from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::InvalidBaseUrl`] when a base URL cannot carry path
    /// segments, or [`DriveError::Client`] if the HTTP client cannot be built.
    pub fn new(settings: &DriveSettings) -> DriveResult<Self> {
        for base in [&settings.api_base, &settings.download_base] {
            if base.cannot_be_a_base() {
                return Err(DriveError::InvalidBaseUrl {
                    url: base.to_string(),
                });
            }
        }
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("imgest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| DriveError::Client { source })?;
        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            api_base: settings.api_base.clone(),
            download_base: settings.download_base.clone(),
        })
    }

    fn api_url(&self, segments: &[&str]) -> DriveResult<Url> {
        join_segments(&self.api_base, segments)
    }

    fn append_key(&self, url: &mut Url) {
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
    }

    async fn get(&self, operation: DriveOperation, url: Url) -> DriveResult<Response> {
        let endpoint = redact(&url);
        debug!(operation = %operation, endpoint = %endpoint, "drive request");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| DriveError::from_transport(operation, endpoint.clone(), source))?;

        let status = response.status();
        if !status.is_success() {
            let body = rejection_body(operation, status, response.text().await);
            warn!(
                operation = %operation,
                endpoint = %endpoint,
                status = status.as_u16(),
                "drive request rejected"
            );
            return Err(DriveError::Api {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn request_shared(&self, file_id: &str, stage: &DownloadStage) -> DriveResult<Response> {
        let mut url = join_segments(&self.download_base, &["uc"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("export", "download").append_pair("id", file_id);
            if let DownloadStage::Confirmed(token) = stage {
                pairs.append_pair("confirm", token);
            }
        }
        self.get(DriveOperation::FetchSharedFile, url).await
    }
}

#[async_trait]
impl DriveSource for DriveClient {
    async fn list_images(&self, folder_id: &str) -> DriveResult<Vec<RemoteFileRef>> {
        const OPERATION: DriveOperation = DriveOperation::ListImages;
        let query = format!(
            "'{}' in parents and (mimeType='image/jpeg' or mimeType='image/png') and trashed=false",
            escape_query_literal(folder_id)
        );

        let mut files = Vec::new();
        let mut seen_tokens = HashSet::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.api_url(&["files"])?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("q", &query).append_pair("fields", LIST_FIELDS);
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }
            self.append_key(&mut url);
            let endpoint = redact(&url);

            let response = self.get(OPERATION, url).await?;
            let body = read_body(OPERATION, &endpoint, response).await?;
            let page: FileListPage = serde_json::from_slice(&body).map_err(|source| {
                DriveError::Decode {
                    operation: OPERATION,
                    source,
                }
            })?;
            files.extend(page.files);

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(next) if seen_tokens.insert(next.clone()) => page_token = Some(next),
                Some(repeated) => {
                    warn!(folder_id, token = %repeated, "drive listing repeated a page token");
                    break;
                }
                None => break,
            }
        }

        info!(folder_id, count = files.len(), "drive folder listed");
        Ok(files)
    }

    async fn download_file(&self, file_id: &str) -> DriveResult<Vec<u8>> {
        const OPERATION: DriveOperation = DriveOperation::DownloadFile;
        let mut url = self.api_url(&["files", file_id])?;
        url.query_pairs_mut().append_pair("alt", "media");
        self.append_key(&mut url);
        let endpoint = redact(&url);

        let response = self.get(OPERATION, url).await?;
        let bytes = read_body(OPERATION, &endpoint, response).await?;
        debug!(file_id, bytes = bytes.len(), "drive file downloaded");
        Ok(bytes)
    }

    async fn fetch_shared_file(&self, file_id: &str) -> DriveResult<SharedFile> {
        const OPERATION: DriveOperation = DriveOperation::FetchSharedFile;
        let mut stage = DownloadStage::Initial;
        let response = loop {
            let response = self.request_shared(file_id, &stage).await?;
            match (stage, confirmation_token(response.headers())) {
                (DownloadStage::Initial, Some(token)) => {
                    debug!(file_id, "drive download requires confirmation");
                    stage = DownloadStage::Confirmed(token);
                }
                _ => break response,
            }
        };

        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(mime) = declared.as_deref()
            && !mime.to_ascii_lowercase().starts_with(OCTET_STREAM)
            && ContentKind::from_mime(mime).is_none()
        {
            return Err(DriveError::UnsupportedContentType {
                content_type: mime.to_string(),
            });
        }

        let endpoint = redact(response.url());
        let bytes = read_body(OPERATION, &endpoint, response).await?;
        let kind = ContentKind::resolve(declared.as_deref(), &bytes)
            .map_err(|content_type| DriveError::UnsupportedContentType { content_type })?;

        info!(file_id, kind = %kind, bytes = bytes.len(), "drive shared file fetched");
        Ok(SharedFile {
            file_name: format!("{file_id}.{}", kind.extension()),
            kind,
            bytes,
        })
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> DriveResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| DriveError::InvalidBaseUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn redact(url: &Url) -> String {
    let mut redacted = url.clone();
    redacted.set_query(None);
    redacted.to_string()
}

fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn confirmation_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, value)| name.trim().starts_with(CONFIRM_COOKIE_PREFIX) && !value.is_empty())
        .map(|(_, value)| value.trim().to_string())
}

fn rejection_body(
    operation: DriveOperation,
    status: StatusCode,
    read: reqwest::Result<String>,
) -> String {
    match read {
        Ok(body) => body,
        Err(source) => {
            warn!(
                operation = %operation,
                status = status.as_u16(),
                error = %source,
                "drive error body unreadable"
            );
            status
                .canonical_reason()
                .unwrap_or("unreadable response body")
                .to_string()
        }
    }
}

async fn read_body(
    operation: DriveOperation,
    endpoint: &str,
    response: Response,
) -> DriveResult<Vec<u8>> {
    let reserve = response
        .content_length()
        .and_then(|length| usize::try_from(length).ok())
        .unwrap_or_default()
        .min(MAX_PREALLOCATION);
    let mut body = Vec::with_capacity(reserve);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|source| DriveError::from_transport(operation, endpoint, source))?;
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
