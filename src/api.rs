//! The Drive service contract the transfer engines are written against.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FileListPage, FileNode, Permission};
use crate::query::ListRequest;

/// A single write that can be sent on its own or inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// permissions.create with `transferOwnership=true`.
    GrantOwnership {
        file_id: String,
        permission: Permission,
    },
    /// files.update detaching every old parent and attaching `add_parent`.
    Reparent {
        file_id: String,
        add_parent: String,
        remove_parents: Vec<String>,
    },
}

impl Mutation {
    pub fn grant_ownership(file_id: impl Into<String>, target_email: &str) -> Self {
        Mutation::GrantOwnership {
            file_id: file_id.into(),
            permission: Permission::owner(target_email),
        }
    }

    pub fn reparent(file: &FileNode, destination: impl Into<String>) -> Self {
        Mutation::Reparent {
            file_id: file.id.clone(),
            add_parent: destination.into(),
            remove_parents: file.parents.clone(),
        }
    }

    pub fn file_id(&self) -> &str {
        match self {
            Mutation::GrantOwnership { file_id, .. } | Mutation::Reparent { file_id, .. } => {
                file_id
            }
        }
    }
}

/// Operations the engines need from Google Drive.
///
/// [`crate::DriveClient`] implements this over HTTP. All calls are awaited
/// one at a time by the engines.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Fetch one page of a listing.
    async fn list_page(&self, request: &ListRequest, page_token: Option<&str>)
        -> Result<FileListPage>;

    /// Fetch metadata for one item, restricted to `fields`.
    async fn get_file(&self, file_id: &str, fields: &str) -> Result<FileNode>;

    /// Create a folder called `name` inside `parent_id`.
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<FileNode>;

    /// Send a single mutation outside of a batch.
    async fn apply(&self, mutation: &Mutation) -> Result<()>;

    /// Send `mutations` as one batch request.
    ///
    /// The outer error is a failure of the batch request itself. Otherwise
    /// one outcome per mutation is returned, in input order.
    async fn submit_batch(&self, mutations: &[Mutation]) -> Result<Vec<Result<()>>>;
}
