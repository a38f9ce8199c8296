//! Payload decoding for PDF data carried in events

use crate::error::Result;
use base64::Engine;

/// Decode a base64 payload into raw PDF bytes.
///
/// ASCII whitespace is ignored so line-wrapped encodings (as produced by
/// `base64` on the command line) are accepted. The bytes are not checked for a
/// PDF header; the conversion routine reports malformed documents itself.
pub fn resolve_base64(base64_data: &str) -> Result<Vec<u8>> {
    let engine = base64::engine::general_purpose::STANDARD;

    if base64_data.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = base64_data
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        return Ok(engine.decode(compact)?);
    }

    Ok(engine.decode(base64_data)?)
}

/// Encode PDF bytes for the response body
pub fn encode_base64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}
