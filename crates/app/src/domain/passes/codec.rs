//! Fixed-width node id blobs.
//!
//! A record stores its node ids as one blob: each id's 32 ASCII bytes,
//! back to back, no delimiter.

use crate::domain::passes::{
    PassesError,
    records::{NODE_ID_LEN, NodeId},
};

/// Concatenate node ids in sorted order.
#[must_use]
pub fn encode_node_ids<'a>(node_ids: impl IntoIterator<Item = &'a NodeId>) -> Vec<u8> {
    let mut sorted: Vec<&NodeId> = node_ids.into_iter().collect();

    sorted.sort_unstable();

    let mut blob = Vec::with_capacity(sorted.len() * NODE_ID_LEN);

    for node_id in sorted {
        blob.extend_from_slice(node_id.as_str().as_bytes());
    }

    blob
}

/// Split a blob back into node ids.
///
/// # Errors
///
/// Returns [`PassesError::Corrupt`] when the length is not a multiple of the
/// id width or a chunk is not a valid id. Nothing is truncated.
pub fn decode_node_ids(blob: &[u8]) -> Result<Vec<NodeId>, PassesError> {
    let corrupt = || PassesError::Corrupt { len: blob.len() };

    let chunks = blob.chunks_exact(NODE_ID_LEN);

    if !chunks.remainder().is_empty() {
        return Err(corrupt());
    }

    chunks
        .map(|chunk| {
            let text = std::str::from_utf8(chunk).map_err(|_utf8_error| corrupt())?;

            NodeId::parse(text).map_err(|_invalid| corrupt())
        })
        .collect()
}
