//! drive_transfer - Bulk ownership transfer and shared drive migration for
//! Google Drive.
//!
//! This library provides functionality to:
//! - Walk a folder tree and list everything inside it
//! - Reassign ownership of a user's items to another account, in confirmed batches
//! - Move a user's folder tree into a shared drive, recreating folders by name
//!
//! # Example
//!
//! ```no_run
//! use drive_transfer::{Authenticator, BatchConfig, DriveClient, Selection, TerminalPrompt};
//! use drive_transfer::client::DEFAULT_TIMEOUT;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let plan = Selection {
//!         folder: Some("folder-id".to_string()),
//!         target_owner: Some("bob@example.com".to_string()),
//!         ..Selection::default()
//!     }
//!     .into_plan("alice@example.com")?;
//!
//!     let auth = Authenticator::from_file("service-account.json", &plan.source)?;
//!     let client = DriveClient::new(auth, DEFAULT_TIMEOUT)?;
//!
//!     plan.execute(&client, BatchConfig::default(), &mut TerminalPrompt).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod batch;
pub mod client;
pub mod confirm;
pub mod enumerator;
pub mod error;
pub mod lister;
pub mod migration;
pub mod models;
pub mod multipart;
pub mod ownership;
pub mod plan;
pub mod query;
pub mod url_parser;
pub mod walker;

// Re-exports for convenience
pub use api::{DriveApi, Mutation};
pub use auth::{Authenticator, TokenSource};
pub use batch::{BatchConfig, BatchExecutor, BatchReport, FailurePolicy};
pub use client::DriveClient;
pub use confirm::{Confirmation, TerminalPrompt};
pub use error::{DriveError, Result};
pub use migration::SharedDriveMigration;
pub use models::FileNode;
pub use ownership::OwnershipTransfer;
pub use plan::{Operation, Plan, Selection, Target};
pub use url_parser::extract_id;
