//! Reassigning ownership of items from one account to another.

use tracing::{error, info};

use crate::api::{DriveApi, Mutation};
use crate::batch::{BatchConfig, BatchExecutor, BatchReport};
use crate::confirm::Confirmation;
use crate::error::{DriveError, Result};
use crate::models::FileNode;

/// Whether `node` should have its ownership moved away from `source`.
///
/// Targets named explicitly (no owner data) always qualify.
pub fn is_transfer_candidate(node: &FileNode, source: &str) -> bool {
    node.owners.is_none() || node.is_owned_by(source)
}

/// Grants the owner role on `source`'s items to `target`.
pub struct OwnershipTransfer<'a, A: ?Sized> {
    api: &'a A,
    source: String,
    target: String,
    config: BatchConfig,
}

impl<'a, A> OwnershipTransfer<'a, A>
where
    A: DriveApi + ?Sized,
{
    pub fn new(
        api: &'a A,
        source: impl Into<String>,
        target: impl Into<String>,
        config: BatchConfig,
    ) -> Self {
        Self {
            api,
            source: source.into(),
            target: target.into(),
            config,
        }
    }

    /// Items from `items` still owned by the source account, in order.
    pub fn candidates(&self, items: Vec<FileNode>) -> Vec<FileNode> {
        items
            .into_iter()
            .filter(|node| is_transfer_candidate(node, &self.source))
            .collect()
    }

    /// Transfer every candidate in `items`.
    ///
    /// `confirm` is asked before each batch is sent; a "no" stops the run
    /// with [`DriveError::Cancelled`]. Batches confirmed earlier stay
    /// applied.
    pub async fn transfer(
        &self,
        items: Vec<FileNode>,
        confirm: &mut dyn Confirmation,
    ) -> Result<BatchReport> {
        let candidates = self.candidates(items);
        info!(
            count = candidates.len(),
            source = %self.source,
            target = %self.target,
            "Transferring ownership"
        );

        let target = self.target.as_str();
        BatchExecutor::new(self.api, self.config)
            .run(
                &candidates,
                |node| Mutation::grant_ownership(node.id.clone(), target),
                |batch| {
                    info!(count = batch.len(), "Transferring ownership batch");
                    for node in batch {
                        info!(id = %node.id, name = %node.name, "Transferring");
                    }
                    let prompt = format!(
                        "Ready to transfer ownership of {} files to {}?",
                        batch.len(),
                        target
                    );
                    if confirm.confirm(&prompt)? {
                        Ok(())
                    } else {
                        Err(DriveError::Cancelled)
                    }
                },
                |node, outcome| {
                    if let Err(e) = outcome {
                        error!(id = %node.id, name = %node.name, error = %e, "Ownership transfer failed");
                    }
                },
            )
            .await
    }
}
