//! In-memory Drive used by the engine tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use drive_transfer::api::{DriveApi, Mutation};
use drive_transfer::error::{DriveError, Result};
use drive_transfer::models::{FileListPage, FileNode, Owner, FOLDER_MIME_TYPE};
use drive_transfer::query::{ListRequest, Query};

pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";
pub const DRIVE: &str = "shared-drive";

/// A recorded call against the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Query),
    Get(String),
    Create { name: String, parent: String },
    Apply(Mutation),
    Batch(Vec<Mutation>),
}

#[derive(Default)]
struct State {
    nodes: Vec<FileNode>,
    calls: Vec<Call>,
    failing: HashSet<String>,
    failing_listing: Option<String>,
    created: usize,
}

/// Items live in insertion order; listings page through them `page_size` at a
/// time using the offset as the page token.
pub struct FakeDrive {
    state: Mutex<State>,
    page_size: usize,
}

impl Default for FakeDrive {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size,
        }
    }

    pub fn add(&self, node: FileNode) -> &Self {
        self.state.lock().unwrap().nodes.push(node);
        self
    }

    pub fn folder(&self, id: &str, parent: Option<&str>, owner: &str) -> &Self {
        self.add(node(id, parent, owner, FOLDER_MIME_TYPE, false))
    }

    pub fn file(&self, id: &str, parent: &str, owner: &str) -> &Self {
        self.add(node(id, Some(parent), owner, "text/plain", false))
    }

    pub fn trashed_file(&self, id: &str, parent: &str, owner: &str) -> &Self {
        self.add(node(id, Some(parent), owner, "text/plain", true))
    }

    /// Make every mutation touching `id` fail.
    pub fn fail_on(&self, id: &str) -> &Self {
        self.state.lock().unwrap().failing.insert(id.to_string());
        self
    }

    /// Make listings of `parent`'s children fail.
    pub fn fail_listing(&self, parent: &str) -> &Self {
        self.state.lock().unwrap().failing_listing = Some(parent.to_string());
        self
    }

    pub fn node(&self, id: &str) -> FileNode {
        self.state
            .lock()
            .unwrap()
            .nodes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .unwrap_or_else(|| panic!("no node {id}"))
    }

    /// Folders inside `parent` called `name`.
    pub fn folders_named(&self, parent: &str, name: &str) -> Vec<FileNode> {
        self.state
            .lock()
            .unwrap()
            .nodes
            .iter()
            .filter(|n| n.is_folder() && n.name == name && n.parents.iter().any(|p| p == parent))
            .cloned()
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn batches(&self) -> Vec<Vec<Mutation>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Batch(mutations) => Some(mutations),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> usize {
        self.state.lock().unwrap().created
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

pub fn node(id: &str, parent: Option<&str>, owner: &str, mime: &str, trashed: bool) -> FileNode {
    FileNode {
        id: id.to_string(),
        name: id.to_string(),
        parents: parent.map(|p| vec![p.to_string()]).unwrap_or_default(),
        owners: Some(vec![Owner::with_email(owner)]),
        mime_type: Some(mime.to_string()),
        trashed,
    }
}

fn matches(query: &Query, node: &FileNode) -> bool {
    let has_parent = |p: &str| node.parents.iter().any(|q| q == p);
    match query {
        Query::ChildrenOf(parent) => has_parent(parent.as_str()),
        Query::ChildFoldersOf(parent) => has_parent(parent.as_str()) && node.is_folder(),
        Query::ChildrenOfAny(parents) => parents.iter().any(|p| has_parent(p.as_str())),
        Query::FolderNamed { name, parent } => {
            has_parent(parent.as_str()) && node.is_folder() && &node.name == name && !node.trashed
        }
    }
}

fn listed_parent(query: &Query) -> Option<&str> {
    match query {
        Query::ChildrenOf(p) | Query::ChildFoldersOf(p) => Some(p.as_str()),
        Query::FolderNamed { parent, .. } => Some(parent.as_str()),
        Query::ChildrenOfAny(_) => None,
    }
}

fn mutate(state: &mut State, mutation: &Mutation) -> Result<()> {
    let id = mutation.file_id();
    if state.failing.contains(id) {
        return Err(DriveError::BatchItemFailed {
            file_id: id.to_string(),
            status: 403,
            message: "The user does not have sufficient permissions for this file.".to_string(),
        });
    }

    let node = state
        .nodes
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or_else(|| DriveError::BatchItemFailed {
            file_id: id.to_string(),
            status: 404,
            message: format!("File not found: {id}."),
        })?;

    match mutation {
        Mutation::GrantOwnership { permission, .. } => {
            node.owners = Some(vec![Owner::with_email(permission.email_address.clone())]);
        }
        Mutation::Reparent {
            add_parent,
            remove_parents,
            ..
        } => {
            node.parents.retain(|p| !remove_parents.contains(p));
            node.parents.push(add_parent.clone());
        }
    }
    Ok(())
}

#[async_trait]
impl DriveApi for FakeDrive {
    async fn list_page(&self, request: &ListRequest, page_token: Option<&str>) -> Result<FileListPage> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List(request.query.clone()));

        if let (Some(failing), Some(parent)) = (&state.failing_listing, listed_parent(&request.query)) {
            if failing == parent {
                return Err(DriveError::ApiError {
                    status: 500,
                    message: "Internal Error".to_string(),
                });
            }
        }

        let offset: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let matching: Vec<FileNode> = state
            .nodes
            .iter()
            .filter(|n| matches(&request.query, n))
            .cloned()
            .collect();

        let end = (offset + self.page_size).min(matching.len());
        Ok(FileListPage {
            files: matching[offset..end].to_vec(),
            next_page_token: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn get_file(&self, file_id: &str, _fields: &str) -> Result<FileNode> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Get(file_id.to_string()));
        state
            .nodes
            .iter()
            .find(|n| n.id == file_id)
            .cloned()
            .ok_or_else(|| DriveError::ApiError {
                status: 404,
                message: format!("File not found: {file_id}."),
            })
    }

    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<FileNode> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            name: name.to_string(),
            parent: parent_id.to_string(),
        });
        state.created += 1;

        let folder = FileNode {
            id: format!("created-{}", state.created),
            name: name.to_string(),
            parents: vec![parent_id.to_string()],
            owners: Some(vec![]),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            trashed: false,
        };
        state.nodes.push(folder.clone());
        Ok(folder)
    }

    async fn apply(&self, mutation: &Mutation) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Apply(mutation.clone()));
        mutate(&mut state, mutation)
    }

    async fn submit_batch(&self, mutations: &[Mutation]) -> Result<Vec<Result<()>>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Batch(mutations.to_vec()));
        Ok(mutations.iter().map(|m| mutate(&mut state, m)).collect())
    }
}
