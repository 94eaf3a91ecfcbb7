//! Typed Drive search queries and the listing requests built from them.

use crate::models::FOLDER_MIME_TYPE;

/// Maximum items per listing page.
pub const PAGE_SIZE: u32 = 1000;

/// Fields for folder tree walking and destination lookups.
pub const FOLDER_FIELDS: &str = "nextPageToken, files(id, name)";

/// Fields for ownership candidates.
pub const OWNER_FIELDS: &str = "nextPageToken, files(id, name, owners, mimeType)";

/// Fields for migration candidates.
pub const MIGRATION_FIELDS: &str =
    "nextPageToken, files(id, name, parents, owners, mimeType, trashed)";

/// A search predicate understood by files.list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Every item directly inside `parent`.
    ChildrenOf(String),
    /// Folders directly inside `parent`.
    ChildFoldersOf(String),
    /// Items inside any of the given folders.
    ChildrenOfAny(Vec<String>),
    /// Non-trashed folders called `name` directly inside `parent`.
    FolderNamed { name: String, parent: String },
}

impl Query {
    /// Render as Drive query syntax.
    pub fn render(&self) -> String {
        match self {
            Query::ChildrenOf(parent) => in_parents(parent),
            Query::ChildFoldersOf(parent) => {
                format!("{} and mimeType = '{}'", in_parents(parent), FOLDER_MIME_TYPE)
            }
            Query::ChildrenOfAny(parents) => parents
                .iter()
                .map(|p| in_parents(p))
                .collect::<Vec<_>>()
                .join(" or "),
            Query::FolderNamed { name, parent } => format!(
                "name = '{}' and {} and mimeType = '{}' and trashed = false",
                escape(name),
                in_parents(parent),
                FOLDER_MIME_TYPE
            ),
        }
    }
}

fn in_parents(id: &str) -> String {
    format!("'{}' in parents", escape(id))
}

/// Escape a string literal for Drive query syntax.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Which collection of items a listing searches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Corpus {
    /// Items the impersonated user can access.
    User,
    /// Items inside one shared drive.
    Drive(String),
}

/// A complete files.list request minus the page token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub query: Query,
    pub fields: &'static str,
    pub corpus: Corpus,
}

impl ListRequest {
    pub fn new(query: Query, fields: &'static str) -> Self {
        Self {
            query,
            fields,
            corpus: Corpus::User,
        }
    }

    pub fn in_drive(mut self, drive_id: impl Into<String>) -> Self {
        self.corpus = Corpus::Drive(drive_id.into());
        self
    }
}
