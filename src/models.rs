//! Data models for Google Drive API requests and responses.

use serde::{Deserialize, Serialize};

/// MIME type Drive uses to tag folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// A file or folder as returned by a listing or metadata call.
///
/// Only the fields requested through the field mask are populated; the rest
/// fall back to their defaults. Deserialized nodes always carry an owner set
/// (empty when Drive sent none); `owners: None` is reserved for targets named
/// on the command line, whose ownership is never looked up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default = "no_owners")]
    pub owners: Option<Vec<Owner>>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub trashed: bool,
}

fn no_owners() -> Option<Vec<Owner>> {
    Some(Vec::new())
}

impl FileNode {
    /// A target named on the command line: id only, owners unknown.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }

    /// Whether `email` appears in the owner set, ignoring ASCII case.
    /// Missing owner data is never a match; callers that want to bypass the
    /// check test `owners.is_none()` themselves.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owners
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|owner| owner.email_address.as_deref())
            .any(|owner| owner.eq_ignore_ascii_case(email))
    }
}

impl std::fmt::Display for FileNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_folder() { "folder" } else { "file" };
        write!(f, "{} ({}, {})", self.name, self.id, kind)
    }
}

/// Owner entry of a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Owner {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email_address: Some(email.into()),
            display_name: None,
        }
    }
}

/// One page from the files.list API endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListPage {
    #[serde(default)]
    pub files: Vec<FileNode>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Permission body sent to permissions.create.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub email_address: String,
}

impl Permission {
    /// Owner role for an individual account.
    pub fn owner(email: impl Into<String>) -> Self {
        Self {
            kind: "user".to_string(),
            role: "owner".to_string(),
            email_address: email.into(),
        }
    }
}

/// Body sent to files.create for a new folder.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFolder<'a> {
    pub name: &'a str,
    pub mime_type: &'static str,
    pub parents: [&'a str; 1],
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Service account credentials from JSON file.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}
