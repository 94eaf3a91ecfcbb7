//! Listing across every continuation page.

use tracing::trace;

use crate::api::DriveApi;
use crate::error::Result;
use crate::models::FileNode;
use crate::query::ListRequest;

/// Collect every item matching `request`, following `nextPageToken` until the
/// backend stops returning one.
///
/// Any failed page fails the whole listing; nothing gathered so far is
/// returned.
pub async fn list_all<A>(api: &A, request: &ListRequest) -> Result<Vec<FileNode>>
where
    A: DriveApi + ?Sized,
{
    let mut all_files = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = api.list_page(request, page_token.as_deref()).await?;
        pages += 1;
        all_files.extend(page.files);

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    trace!(pages, items = all_files.len(), "listing complete");
    Ok(all_files)
}
