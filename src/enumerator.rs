//! Listing the contents of a set of folders with a single query.

use tracing::{info, warn};

use crate::api::DriveApi;
use crate::error::Result;
use crate::lister::list_all;
use crate::models::FileNode;
use crate::query::{ListRequest, Query, OWNER_FIELDS};

/// Warning threshold for the rendered `q` length.
///
/// Drive does not publish an exact limit; very long `or` queries start
/// failing with 400 errors, and 30k characters is a conservative estimate
/// of where that happens.
pub const MAX_QUERY_LEN: usize = 30_000;

/// List every file and folder whose parent is one of `folder_ids`.
///
/// The ids are combined into one `or` query. It is not split when it grows
/// past [`MAX_QUERY_LEN`]; a warning is logged and the backend may reject it.
/// An item with several parents inside the set may be returned more than
/// once.
pub async fn list_children_of_all<A>(api: &A, folder_ids: &[String]) -> Result<Vec<FileNode>>
where
    A: DriveApi + ?Sized,
{
    if folder_ids.is_empty() {
        return Ok(Vec::new());
    }

    let query = Query::ChildrenOfAny(folder_ids.to_vec());
    let query_len = query.render().len();
    if query_len > MAX_QUERY_LEN {
        warn!(
            query_len,
            folders = folder_ids.len(),
            "Combined folder query is longer than Drive is likely to accept"
        );
    }

    info!(folders = folder_ids.len(), "Querying for list of files");
    let files = list_all(api, &ListRequest::new(query, OWNER_FIELDS)).await?;
    info!(count = files.len(), "Found files");

    Ok(files)
}
