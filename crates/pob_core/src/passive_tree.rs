//! Passive tree share links.
//!
//! The trailing path segment of a link is URL-safe Base64 over a 7 byte header
//! (`u32` format version, class id, ascendancy id, fullscreen flag) followed by
//! a packed big-endian `u16` array of allocated node ids.

use std::io::Cursor;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core_api::{Error, Result};
use crate::reader::BigEndianReader;
use crate::transport::URL_SAFE_LENIENT;

pub const TREE_HEADER_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TreeHeader {
    pub version: u32,
    pub class_id: u8,
    pub ascendancy_id: u8,
    pub fullscreen: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedTree {
    pub header: TreeHeader,
    pub nodes: Vec<u16>,
}

/// Node ids of a share link (or a bare payload), in encoded order.
pub fn decode_nodes(share_url_or_payload: &str) -> Result<Vec<u16>> {
    decode_tree(share_url_or_payload).map(|tree| tree.nodes)
}

pub fn decode_tree(share_url_or_payload: &str) -> Result<DecodedTree> {
    let payload = URL_SAFE_LENIENT.decode(trailing_segment(share_url_or_payload))?;
    if payload.len() < TREE_HEADER_LEN {
        return Err(Error::malformed_tree_url(format!(
            "payload is {} bytes, shorter than the {TREE_HEADER_LEN} byte header",
            payload.len()
        )));
    }

    let mut r = BigEndianReader::new(Cursor::new(payload.as_slice()));
    let header = read_header(&mut r)?;
    let body_len = r.remaining().map_err(truncated)?;
    if body_len % 2 != 0 {
        return Err(Error::malformed_tree_url(format!(
            "node section is {body_len} bytes, expected an even length"
        )));
    }
    let nodes = r.read_u16_vec((body_len / 2) as usize).map_err(truncated)?;
    trace!(version = header.version, nodes = nodes.len(), "decoded passive tree");

    Ok(DecodedTree { header, nodes })
}

fn read_header(r: &mut BigEndianReader<Cursor<&[u8]>>) -> Result<TreeHeader> {
    Ok(TreeHeader {
        version: r.read_u32().map_err(truncated)?,
        class_id: r.read_u8().map_err(truncated)?,
        ascendancy_id: r.read_u8().map_err(truncated)?,
        fullscreen: r.read_u8().map_err(truncated)?,
    })
}

fn truncated(e: std::io::Error) -> Error {
    Error::malformed_tree_url(format!("payload ended early: {e}"))
}

fn trailing_segment(input: &str) -> &str {
    let input = input.trim();
    let input = input.split(['?', '#']).next().unwrap_or(input);
    let input = input.trim_end_matches('/');
    match input.rsplit_once('/') {
        Some((_, segment)) => segment,
        None => input,
    }
}
