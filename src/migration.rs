//! Moving a folder tree into a shared drive.
//!
//! Destination folders are matched by name under their destination parent:
//! an existing folder with the same name is reused, otherwise one is created.
//! This makes reruns cheap but also means two source folders with the same
//! name under one parent end up merged, as does a source folder and an
//! unrelated destination folder that happens to share its name.

use std::collections::HashMap;

use tracing::{debug, error, info};

use crate::api::{DriveApi, Mutation};
use crate::batch::{BatchConfig, BatchExecutor, BatchReport};
use crate::error::Result;
use crate::lister::list_all;
use crate::models::FileNode;
use crate::query::{ListRequest, Query, FOLDER_FIELDS, MIGRATION_FIELDS};

/// Whether `node` should be moved when migrating `source`'s files.
pub fn is_move_candidate(node: &FileNode, source: &str) -> bool {
    !node.is_folder() && node.is_owned_by(source) && !node.trashed
}

/// Destination folders resolved so far, keyed by (parent id, folder name).
#[derive(Debug, Default)]
pub struct DestinationFolders {
    resolved: HashMap<(String, String), String>,
    created: usize,
}

impl DestinationFolders {
    /// Find or create the folder `name` inside `parent`.
    ///
    /// Checks the cache, then the drive, and only then creates a folder, so
    /// each (parent, name) pair yields at most one new folder per run.
    pub async fn resolve<A>(
        &mut self,
        api: &A,
        drive_id: &str,
        parent: &str,
        name: &str,
    ) -> Result<String>
    where
        A: DriveApi + ?Sized,
    {
        let key = (parent.to_string(), name.to_string());
        if let Some(id) = self.resolved.get(&key) {
            return Ok(id.clone());
        }

        let request = ListRequest::new(
            Query::FolderNamed {
                name: name.to_string(),
                parent: parent.to_string(),
            },
            FOLDER_FIELDS,
        )
        .in_drive(drive_id);

        let id = match list_all(api, &request).await?.into_iter().next() {
            Some(existing) => {
                debug!(id = %existing.id, name, parent, "Reusing destination folder");
                existing.id
            }
            None => {
                let folder = api.create_folder(name, parent).await?;
                info!(id = %folder.id, name, parent, "Created destination folder");
                self.created += 1;
                folder.id
            }
        };

        self.resolved.insert(key, id.clone());
        Ok(id)
    }

    /// Number of folders this run had to create.
    pub fn created(&self) -> usize {
        self.created
    }
}

/// Where a pending folder's files go.
#[derive(Debug, Clone)]
enum Destination {
    /// Use this folder as is.
    Exact(String),
    /// Use the same-named folder inside this one.
    Under(String),
}

#[derive(Debug)]
struct PendingFolder {
    id: String,
    name: String,
    destination: Destination,
}

/// Moves `source`'s files into a shared drive, mirroring the folder layout.
pub struct SharedDriveMigration<'a, A: ?Sized> {
    api: &'a A,
    source: String,
    drive_id: String,
    config: BatchConfig,
    folders: DestinationFolders,
}

impl<'a, A> SharedDriveMigration<'a, A>
where
    A: DriveApi + ?Sized,
{
    pub fn new(
        api: &'a A,
        source: impl Into<String>,
        drive_id: impl Into<String>,
        config: BatchConfig,
    ) -> Self {
        Self {
            api,
            source: source.into(),
            drive_id: drive_id.into(),
            config,
            folders: DestinationFolders::default(),
        }
    }

    pub fn destination_folders(&self) -> &DestinationFolders {
        &self.folders
    }

    /// Migrate folder `folder_id` and everything below it.
    ///
    /// The folder's own files land directly in `destination` (or the drive
    /// root); each subfolder is matched or created by name one level down.
    /// Folders are handled one at a time, depth first.
    pub async fn migrate_folder(
        &mut self,
        folder_id: &str,
        folder_name: &str,
        destination: Option<&str>,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        let mut pending = vec![PendingFolder {
            id: folder_id.to_string(),
            name: folder_name.to_string(),
            destination: Destination::Exact(destination.unwrap_or(&self.drive_id).to_string()),
        }];

        while let Some(folder) = pending.pop() {
            info!(
                folder = %folder.id,
                name = %folder.name,
                drive = %self.drive_id,
                "Moving folder to shared drive"
            );

            let request = ListRequest::new(Query::ChildrenOf(folder.id.clone()), MIGRATION_FIELDS);
            let children = list_all(self.api, &request).await?;

            let (subfolders, files): (Vec<FileNode>, Vec<FileNode>) =
                children.into_iter().partition(FileNode::is_folder);
            let files: Vec<FileNode> = files
                .into_iter()
                .filter(|node| is_move_candidate(node, &self.source))
                .collect();

            let target = match folder.destination {
                Destination::Exact(id) => id,
                Destination::Under(parent) => {
                    self.folders
                        .resolve(self.api, &self.drive_id, &parent, &folder.name)
                        .await?
                }
            };

            debug!(
                folder = %folder.id,
                files = files.len(),
                subfolders = subfolders.len(),
                destination = %target,
                "Resolved destination"
            );

            report.merge(self.move_files(&files, &target).await?);

            pending.extend(subfolders.into_iter().rev().map(|sub| PendingFolder {
                id: sub.id,
                name: sub.name,
                destination: Destination::Under(target.clone()),
            }));
        }

        info!(
            created_folders = self.folders.created(),
            moved = report.succeeded,
            "Migration complete"
        );
        Ok(report)
    }

    async fn move_files(&self, files: &[FileNode], destination: &str) -> Result<BatchReport> {
        BatchExecutor::new(self.api, self.config)
            .run(
                files,
                |node| Mutation::reparent(node, destination),
                |batch| {
                    for node in batch {
                        info!(id = %node.id, name = %node.name, "Moving file");
                    }
                    Ok(())
                },
                |node, outcome| {
                    if let Err(e) = outcome {
                        error!(id = %node.id, name = %node.name, error = %e, "Move failed");
                    }
                },
            )
            .await
    }

    /// Move a single file into `destination` (or the drive root), detaching
    /// it from all of its current parents.
    pub async fn move_file(&self, file_id: &str, destination: Option<&str>) -> Result<()> {
        info!(file_id = %file_id, "Getting file parents");
        let file = self.api.get_file(file_id, "id, name, parents").await?;

        info!(file_id = %file_id, drive = %self.drive_id, "Moving file to shared drive");
        let target = destination.unwrap_or(&self.drive_id);
        self.api.apply(&Mutation::reparent(&file, target)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Owner, FOLDER_MIME_TYPE};

    fn node(mime: &str, owner: &str, trashed: bool) -> FileNode {
        FileNode {
            mime_type: Some(mime.to_string()),
            owners: Some(vec![Owner::with_email(owner)]),
            trashed,
            ..FileNode::named("id", "name")
        }
    }

    #[test]
    fn test_move_candidate_filter() {
        let source = "alice@example.com";
        assert!(is_move_candidate(&node("text/plain", source, false), source));
        assert!(!is_move_candidate(&node("text/plain", source, true), source));
        assert!(!is_move_candidate(&node(FOLDER_MIME_TYPE, source, false), source));
        assert!(!is_move_candidate(
            &node("text/plain", "bob@example.com", false),
            source
        ));
    }

    #[test]
    fn test_move_candidate_ignores_source_case() {
        let file = node("text/plain", "alice@example.com", false);
        assert!(is_move_candidate(&file, "Alice@Example.com"));
    }

    #[test]
    fn test_named_target_is_not_a_move_candidate() {
        assert!(!is_move_candidate(
            &FileNode::named("x", "x"),
            "alice@example.com"
        ));
    }
}
