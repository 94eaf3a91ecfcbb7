//! `multipart/mixed` encoding for the Drive batch endpoint.
//!
//! Each mutation becomes one `application/http` part tagged with
//! `Content-ID: <item-N>`; Google answers with `<response-item-N>` parts,
//! not necessarily in request order.

use crate::api::Mutation;
use crate::error::{DriveError, Result};

/// Boundary used for outgoing batch bodies.
pub const BATCH_BOUNDARY: &str = "drive_transfer_batch";

/// Decoded HTTP response of one batch part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartResponse {
    pub status: u16,
    pub body: String,
}

impl PartResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// `Content-Type` header value for an outgoing batch.
pub fn content_type() -> String {
    format!("multipart/mixed; boundary={}", BATCH_BOUNDARY)
}

/// Encode `mutations` as a batch body. `api_prefix` is the API path the
/// inner requests are relative to, e.g. `/drive/v3`.
pub fn encode_batch(mutations: &[Mutation], api_prefix: &str) -> Result<String> {
    let mut body = String::new();

    for (idx, mutation) in mutations.iter().enumerate() {
        let (method, path, payload) = inner_request(mutation, api_prefix)?;
        body.push_str(&format!("--{}\r\n", BATCH_BOUNDARY));
        body.push_str("Content-Type: application/http\r\n");
        body.push_str(&format!("Content-ID: <item-{}>\r\n\r\n", idx + 1));
        body.push_str(&format!("{} {} HTTP/1.1\r\n", method, path));
        body.push_str("Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.push_str(&payload);
        body.push_str("\r\n");
    }

    body.push_str(&format!("--{}--\r\n", BATCH_BOUNDARY));
    Ok(body)
}

// Drive ids only contain URL-safe characters, so paths and query values are
// used verbatim.
fn inner_request(mutation: &Mutation, api_prefix: &str) -> Result<(&'static str, String, String)> {
    match mutation {
        Mutation::GrantOwnership {
            file_id,
            permission,
        } => Ok((
            "POST",
            format!(
                "{}/files/{}/permissions?transferOwnership=true",
                api_prefix, file_id
            ),
            serde_json::to_string(permission)?,
        )),
        Mutation::Reparent {
            file_id,
            add_parent,
            remove_parents,
        } => {
            let mut path = format!(
                "{}/files/{}?addParents={}&supportsAllDrives=true",
                api_prefix, file_id, add_parent
            );
            if !remove_parents.is_empty() {
                path.push_str(&format!("&removeParents={}", remove_parents.join(",")));
            }
            Ok(("PATCH", path, "{}".to_string()))
        }
    }
}

/// Extract the boundary parameter from a `Content-Type` header.
pub fn boundary_of(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("boundary="))
        .map(|b| b.trim_matches('"'))
        .filter(|b| !b.is_empty())
}

/// Decode a batch response into one slot per request, in request order.
///
/// Slots stay `None` when the response has no part for that request.
pub fn decode_batch(
    content_type: &str,
    body: &str,
    expected: usize,
) -> Result<Vec<Option<PartResponse>>> {
    let boundary = boundary_of(content_type).ok_or_else(|| {
        DriveError::MalformedBatchResponse(format!("no boundary in {:?}", content_type))
    })?;
    // A delimiter only counts at the start of a line, so the body is framed
    // with a leading newline and split on "\n--boundary". A CR left before
    // the split point is trimmed along with the part body.
    let delimiter = format!("\n--{}", boundary);
    let framed = format!("\n{}", body);

    let mut slots: Vec<Option<PartResponse>> = vec![None; expected];
    let mut position = 0;

    // The first chunk is the preamble.
    for part in framed.split(delimiter.as_str()).skip(1) {
        if part.starts_with("--") {
            break;
        }

        let (index, response) = parse_part(part)?;
        let slot = index.unwrap_or(position);
        position += 1;

        match slots.get_mut(slot) {
            Some(entry) => *entry = Some(response),
            None => {
                return Err(DriveError::MalformedBatchResponse(format!(
                    "part {} out of range for {} requests",
                    slot + 1,
                    expected
                )))
            }
        }
    }

    Ok(slots)
}

fn parse_part(part: &str) -> Result<(Option<usize>, PartResponse)> {
    let part = part.trim_start_matches(['\r', '\n']);
    let (outer_headers, http) = split_head(part)
        .ok_or_else(|| DriveError::MalformedBatchResponse("part without headers".to_string()))?;

    let index = outer_headers.lines().find_map(content_id_index);

    let (head, body) = split_head(http).unwrap_or((http, ""));
    let status_line = head.lines().next().unwrap_or_default();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| {
            DriveError::MalformedBatchResponse(format!("bad status line {:?}", status_line))
        })?;

    Ok((
        index,
        PartResponse {
            status,
            body: body.trim_end().to_string(),
        },
    ))
}

/// `Content-ID: <response-item-3>` gives slot 2.
fn content_id_index(header: &str) -> Option<usize> {
    let (name, value) = header.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-id") {
        return None;
    }
    let value = value.trim().trim_start_matches('<').trim_end_matches('>');
    let n: usize = value.rsplit('-').next()?.parse().ok()?;
    n.checked_sub(1)
}

/// Split at the first blank line, accepting CRLF or bare LF.
fn split_head(s: &str) -> Option<(&str, &str)> {
    let crlf = s.find("\r\n\r\n").map(|i| (i, 4));
    let lf = s.find("\n\n").map(|i| (i, 2));
    let (at, len) = match (crlf, lf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                a
            } else {
                b
            }
        }
        (a, b) => a.or(b)?,
    };
    Some((&s[..at], &s[at + len..]))
}
