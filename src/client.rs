//! Google Drive v3 HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::{debug, trace};

use crate::api::{DriveApi, Mutation};
use crate::auth::TokenSource;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, FileListPage, FileNode, NewFolder, FOLDER_MIME_TYPE};
use crate::multipart::{self, PartResponse};
use crate::query::{Corpus, ListRequest, PAGE_SIZE};

/// Host serving the Drive API and its batch endpoint.
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Path prefix of the Drive v3 API.
const API_PREFIX: &str = "/drive/v3";

/// Batch endpoint for the Drive v3 API.
const BATCH_PATH: &str = "/batch/drive/v3";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the Drive API, acting as whoever the token source represents.
pub struct DriveClient {
    tokens: TokenSource,
    http: Client,
    base_url: String,
}

impl DriveClient {
    /// Create a new DriveClient.
    ///
    /// # Arguments
    /// * `tokens` - Source of bearer tokens, usually an [`crate::Authenticator`]
    /// * `timeout` - Per-request timeout
    pub fn new(tokens: impl Into<TokenSource>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            tokens: tokens.into(),
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn files_url(&self) -> String {
        format!("{}{}/files", self.base_url, API_PREFIX)
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/{}", self.files_url(), file_id)
    }
}

/// Turn a non-2xx response into an [`DriveError::ApiError`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    Err(api_error(status.as_u16(), error_body))
}

fn api_error(status: u16, body: String) -> DriveError {
    let (status, message) = error_detail(status, body);
    DriveError::ApiError { status, message }
}

/// Status and message of a Google error body, or the raw body.
fn error_detail(status: u16, body: String) -> (u16, String) {
    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_error) => (api_error.error.code, api_error.error.message),
        Err(_) => (status, body),
    }
}

fn item_outcome(mutation: &Mutation, part: Option<PartResponse>) -> Result<()> {
    let file_id = mutation.file_id().to_string();
    match part {
        Some(part) if part.is_success() => Ok(()),
        Some(part) => {
            let (status, message) = error_detail(part.status, part.body);
            Err(DriveError::BatchItemFailed {
                file_id,
                status,
                message,
            })
        }
        None => Err(DriveError::MalformedBatchResponse(format!(
            "no response part for {}",
            file_id
        ))),
    }
}

#[async_trait]
impl DriveApi for DriveClient {
    async fn list_page(
        &self,
        request: &ListRequest,
        page_token: Option<&str>,
    ) -> Result<FileListPage> {
        let token = self.tokens.access_token().await?;
        let query = request.query.render();
        let page_size = PAGE_SIZE.to_string();

        trace!(q = %query, ?page_token, "listing page");

        let mut http_request = self
            .http
            .get(self.files_url())
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("fields", request.fields),
                ("pageSize", page_size.as_str()),
                ("includeItemsFromAllDrives", "true"),
                ("supportsAllDrives", "true"),
            ]);

        http_request = match &request.corpus {
            Corpus::User => http_request.query(&[("corpora", "user")]),
            Corpus::Drive(drive_id) => {
                http_request.query(&[("corpora", "drive"), ("driveId", drive_id.as_str())])
            }
        };

        if let Some(page_token) = page_token {
            http_request = http_request.query(&[("pageToken", page_token)]);
        }

        let response = check(http_request.send().await?).await?;
        let page: FileListPage = response.json().await?;
        Ok(page)
    }

    async fn get_file(&self, file_id: &str, fields: &str) -> Result<FileNode> {
        let token = self.tokens.access_token().await?;

        let response = self
            .http
            .get(self.file_url(file_id))
            .bearer_auth(&token)
            .query(&[("supportsAllDrives", "true"), ("fields", fields)])
            .send()
            .await?;

        let node: FileNode = check(response).await?.json().await?;
        Ok(node)
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<FileNode> {
        let token = self.tokens.access_token().await?;

        let body = NewFolder {
            name,
            mime_type: FOLDER_MIME_TYPE,
            parents: [parent_id],
        };

        let response = self
            .http
            .post(self.files_url())
            .bearer_auth(&token)
            .query(&[
                ("supportsAllDrives", "true"),
                ("fields", "id, name, parents, mimeType"),
            ])
            .json(&body)
            .send()
            .await?;

        let folder: FileNode = check(response).await?.json().await?;
        debug!(id = %folder.id, name, parent_id, "created folder");
        Ok(folder)
    }

    async fn apply(&self, mutation: &Mutation) -> Result<()> {
        let token = self.tokens.access_token().await?;

        let request = match mutation {
            Mutation::GrantOwnership {
                file_id,
                permission,
            } => self
                .http
                .post(format!("{}/permissions", self.file_url(file_id)))
                .query(&[("transferOwnership", "true")])
                .json(permission),
            Mutation::Reparent {
                file_id,
                add_parent,
                remove_parents,
            } => {
                let mut request = self.http.patch(self.file_url(file_id)).query(&[
                    ("addParents", add_parent.as_str()),
                    ("supportsAllDrives", "true"),
                ]);
                if !remove_parents.is_empty() {
                    request = request.query(&[("removeParents", remove_parents.join(","))]);
                }
                request.json(&serde_json::json!({}))
            }
        };

        check(request.bearer_auth(&token).send().await?).await?;
        Ok(())
    }

    async fn submit_batch(&self, mutations: &[Mutation]) -> Result<Vec<Result<()>>> {
        if mutations.is_empty() {
            return Ok(Vec::new());
        }

        let token = self.tokens.access_token().await?;
        let body = multipart::encode_batch(mutations, API_PREFIX)?;

        let response = self
            .http
            .post(format!("{}{}", self.base_url, BATCH_PATH))
            .bearer_auth(&token)
            .header(CONTENT_TYPE, multipart::content_type())
            .body(body)
            .send()
            .await?;

        let response = check(response).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response.text().await?;

        let parts = multipart::decode_batch(&content_type, &text, mutations.len())?;

        Ok(mutations
            .iter()
            .zip(parts)
            .map(|(mutation, part)| item_outcome(mutation, part))
            .collect())
    }
}
