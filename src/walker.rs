//! Depth-first discovery of every folder under a root.

use tracing::{debug, info};

use crate::api::DriveApi;
use crate::error::Result;
use crate::lister::list_all;
use crate::query::{ListRequest, Query, FOLDER_FIELDS};

/// Return `root` followed by every folder below it, in preorder.
///
/// Uses an explicit stack, so depth is bounded by memory rather than the call
/// stack. The folder graph is assumed to be a tree: a cycle in the parent
/// relation would never terminate.
pub async fn collect_folder_ids<A>(api: &A, root: &str) -> Result<Vec<String>>
where
    A: DriveApi + ?Sized,
{
    info!(root, "Collecting folders");

    let mut all_folders = Vec::new();
    let mut stack = vec![(root.to_string(), String::from("[top level folder]"))];

    while let Some((folder_id, folder_name)) = stack.pop() {
        debug!(%folder_id, %folder_name, "Walking folder");
        all_folders.push(folder_id.clone());

        let request = ListRequest::new(Query::ChildFoldersOf(folder_id), FOLDER_FIELDS);
        let children = list_all(api, &request).await?;

        // Reversed so the first child is walked next.
        stack.extend(children.into_iter().rev().map(|child| (child.id, child.name)));
    }

    info!(count = all_folders.len(), "Collected folders");
    Ok(all_folders)
}
