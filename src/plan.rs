//! Validated target/operation pairs and running them.

use std::path::PathBuf;

use tracing::info;

use crate::api::DriveApi;
use crate::batch::{BatchConfig, BatchReport};
use crate::confirm::Confirmation;
use crate::enumerator::list_children_of_all;
use crate::error::{DriveError, Result};
use crate::migration::SharedDriveMigration;
use crate::models::FileNode;
use crate::ownership::OwnershipTransfer;
use crate::url_parser::{extract_id, read_id_list};
use crate::walker::collect_folder_ids;

/// Display name for items named on the command line.
const CHOSEN_FILE: &str = "[chosen file]";

/// Display name for the root of a folder migration.
const TOP_LEVEL_FOLDER: &str = "[top level folder]";

/// What to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A folder and everything below it.
    Folder(String),
    File(String),
    Files(Vec<String>),
}

/// What to do with the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Reassign {
        target_owner: String,
    },
    Migrate {
        drive_id: String,
        drive_folder: Option<String>,
    },
}

/// A single resolved (target, operation) pair for one source account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub source: String,
    pub target: Target,
    pub operation: Operation,
}

/// Raw, unvalidated choices as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub folder: Option<String>,
    pub file: Option<String>,
    pub files: Option<PathBuf>,
    pub target_owner: Option<String>,
    pub target_drive: Option<String>,
    pub target_drive_folder: Option<String>,
}

impl Selection {
    /// Check that exactly one target and one operation were chosen and turn
    /// them into a [`Plan`]. Nothing here talks to Drive; `--files` is read
    /// from disk.
    pub fn into_plan(self, source: impl Into<String>) -> Result<Plan> {
        let targets = [
            self.folder.is_some(),
            self.file.is_some(),
            self.files.is_some(),
        ]
        .into_iter()
        .filter(|chosen| *chosen)
        .count();

        match targets {
            0 => return Err(invalid("Please specify either --folder or --file or --files")),
            1 => {}
            _ => {
                return Err(invalid(
                    "Please specify either --folder or --file or --files, not more than one",
                ))
            }
        }

        let operation = match (self.target_owner, self.target_drive) {
            (Some(_), Some(_)) => {
                return Err(invalid(
                    "Please specify either --target-owner or --target-drive, not both",
                ))
            }
            (None, None) => {
                return Err(invalid(
                    "Please specify either --target-owner or --target-drive",
                ))
            }
            (Some(target_owner), None) => {
                if self.target_drive_folder.is_some() {
                    return Err(invalid(
                        "--target-drive-folder can only be used with --target-drive",
                    ));
                }
                Operation::Reassign { target_owner }
            }
            (None, Some(drive_id)) => Operation::Migrate {
                drive_id: extract_id(&drive_id)?,
                drive_folder: self
                    .target_drive_folder
                    .as_deref()
                    .map(extract_id)
                    .transpose()?,
            },
        };

        let target = match (self.folder, self.file, self.files) {
            (Some(folder), _, _) => Target::Folder(extract_id(&folder)?),
            (_, Some(file), _) => Target::File(extract_id(&file)?),
            (_, _, Some(path)) => Target::Files(read_id_list(path)?),
            (None, None, None) => {
                return Err(invalid("Please specify either --folder or --file or --files"))
            }
        };

        Ok(Plan {
            source: source.into(),
            target,
            operation,
        })
    }
}

fn invalid(message: &str) -> DriveError {
    DriveError::InvalidSelection(message.to_string())
}

impl Plan {
    /// Run the plan against `api`. `confirm` gates ownership batches only.
    pub async fn execute<A>(
        &self,
        api: &A,
        config: BatchConfig,
        confirm: &mut dyn Confirmation,
    ) -> Result<BatchReport>
    where
        A: DriveApi + ?Sized,
    {
        match &self.operation {
            Operation::Reassign { target_owner } => {
                let engine = OwnershipTransfer::new(api, &self.source, target_owner, config);
                match &self.target {
                    Target::Folder(root) => {
                        let folder_ids = collect_folder_ids(api, root).await?;
                        let items = list_children_of_all(api, &folder_ids).await?;
                        let root = api.get_file(root, "id, name, owners, mimeType").await?;

                        let (mut folders, files): (Vec<FileNode>, Vec<FileNode>) =
                            items.into_iter().partition(FileNode::is_folder);
                        folders.insert(0, root);

                        let mut report = engine.transfer(folders, confirm).await?;
                        report.merge(engine.transfer(files, confirm).await?);
                        Ok(report)
                    }
                    Target::File(id) => {
                        engine
                            .transfer(vec![FileNode::named(id, CHOSEN_FILE)], confirm)
                            .await
                    }
                    Target::Files(ids) => {
                        let items = ids
                            .iter()
                            .map(|id| FileNode::named(id, CHOSEN_FILE))
                            .collect();
                        engine.transfer(items, confirm).await
                    }
                }
            }
            Operation::Migrate {
                drive_id,
                drive_folder,
            } => {
                let mut engine = SharedDriveMigration::new(api, &self.source, drive_id, config);
                let destination = drive_folder.as_deref();
                match &self.target {
                    Target::Folder(root) => {
                        engine
                            .migrate_folder(root, TOP_LEVEL_FOLDER, destination)
                            .await
                    }
                    Target::File(id) => {
                        engine.move_file(id, destination).await?;
                        Ok(moved(1))
                    }
                    Target::Files(ids) => {
                        info!(count = ids.len(), "Moving listed files");
                        for id in ids {
                            engine.move_file(id, destination).await?;
                        }
                        Ok(moved(ids.len()))
                    }
                }
            }
        }
    }
}

fn moved(count: usize) -> BatchReport {
    BatchReport {
        batches: 0,
        succeeded: count,
        failures: Vec::new(),
    }
}
