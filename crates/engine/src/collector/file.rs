//! File inputs: the first selected file, base64-encoded.

use std::fs;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hudl_types::InputDescriptor;
use serde_json::Value;

use super::CollectError;

/// Encode raw bytes the way file inputs are sent: standard padded base64, no metadata.
pub fn encode_bytes(bytes: &[u8]) -> Value {
    Value::String(STANDARD.encode(bytes))
}

/// Read the first selected file and encode it for `descriptor`.
///
/// Only the first path is read; further selections are ignored. Returns
/// `Ok(None)` when nothing was selected.
pub fn encode_file_input<P: AsRef<Path>>(descriptor: &InputDescriptor, selected: &[P]) -> Result<Option<Value>, CollectError> {
    let Some(first) = selected.first() else {
        return Ok(None);
    };
    let path = first.as_ref();
    let bytes = fs::read(path).map_err(|source| CollectError::FileRead {
        input: descriptor.id.clone(),
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(encode_bytes(&bytes)))
}
