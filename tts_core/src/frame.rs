//! Pure decoder for the narration service's framed mini-protocol.
//!
//! The service interleaves two frame shapes on one connection:
//! binary frames (2-byte big-endian header-length prefix, `Key:Value`
//! header lines, then the payload) and text frames (`\r\n`-delimited
//! header block, optionally followed by a JSON body). Parsing has no I/O
//! so it can be tested without a live socket.

use thiserror::Error;
use tracing::warn;

use crate::timeline::WordBoundary;

/// MPEG audio frame sync marker. Binary audio payloads carry a non-audio
/// preamble of provider-version-dependent length before the first valid
/// frame, so we scan for this byte instead of skipping a fixed offset.
const MPEG_SYNC_BYTE: u8 = 0xFF;

/// One decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Audio payload with the preamble already stripped (may be empty)
    Audio(Vec<u8>),
    /// Word boundaries extracted from a metadata body, in array order
    Metadata(Vec<WordBoundary>),
    /// End of the synthesis turn
    TurnEnd,
    /// Anything we don't care about (acks, turn.start, ...)
    Unknown,
}

/// Malformed binary framing. Fatal for the session: once the header length
/// cannot be trusted, audio bytes can no longer be told apart from headers.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("binary frame too short for header prefix ({0} bytes)")]
    TruncatedPrefix(usize),

    #[error("header length {header_len} exceeds frame size {frame_len}")]
    HeaderOverrun { header_len: usize, frame_len: usize },
}

/// Decode one binary frame
pub fn parse_binary(buf: &[u8]) -> Result<Frame, FrameError> {
    if buf.len() < 2 {
        return Err(FrameError::TruncatedPrefix(buf.len()));
    }
    let header_len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
    if 2 + header_len > buf.len() {
        return Err(FrameError::HeaderOverrun {
            header_len,
            frame_len: buf.len(),
        });
    }

    let header = String::from_utf8_lossy(&buf[2..2 + header_len]).to_lowercase();
    let payload = &buf[2 + header_len..];

    if header.contains("path:audio.metadata") {
        Ok(Frame::Metadata(parse_metadata_body(
            &String::from_utf8_lossy(payload),
        )))
    } else if header.contains("path:audio") {
        Ok(Frame::Audio(strip_preamble(payload).to_vec()))
    } else {
        Ok(Frame::Unknown)
    }
}

/// Decode one text frame
pub fn parse_text(msg: &str) -> Frame {
    if msg.contains("Path:turn.end") {
        return Frame::TurnEnd;
    }
    if msg.contains("Path:audio.metadata") {
        if let Some(body) = msg.split("\r\n\r\n").nth(1) {
            return Frame::Metadata(parse_metadata_body(body));
        }
        return Frame::Unknown;
    }
    Frame::Unknown
}

/// Drop everything before the first MPEG sync byte. A payload with no sync
/// byte yields an empty slice (nothing worth accumulating).
fn strip_preamble(payload: &[u8]) -> &[u8] {
    match payload.iter().position(|&b| b == MPEG_SYNC_BYTE) {
        Some(offset) => &payload[offset..],
        None => &[],
    }
}

/// Extract word boundaries from a metadata JSON body.
///
/// The live service nests the timing fields under a `Data` wrapper; older
/// captures carry them flat on the entry. Both shapes are accepted.
/// Malformed JSON or entries with missing fields are dropped with a warning;
/// metadata is best-effort enrichment and never fails a session.
fn parse_metadata_body(body: &str) -> Vec<WordBoundary> {
    let json: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!("dropping unparseable metadata frame: {e}");
            return Vec::new();
        }
    };

    let Some(entries) = json.get("Metadata").and_then(|m| m.as_array()) else {
        return Vec::new();
    };

    let mut boundaries = Vec::with_capacity(entries.len());
    for entry in entries {
        let data = entry.get("Data").unwrap_or(entry);
        let offset = data.get("Offset").and_then(|v| v.as_i64());
        let duration = data.get("Duration").and_then(|v| v.as_i64());
        let text = data
            .get("text")
            .and_then(|t| t.get("Text"))
            .and_then(|v| v.as_str());

        match (offset, duration, text) {
            (Some(offset_ticks), Some(duration_ticks), Some(text)) => {
                boundaries.push(WordBoundary {
                    text: text.to_string(),
                    offset_ticks,
                    duration_ticks,
                });
            }
            _ => warn!("dropping metadata entry with missing fields: {entry}"),
        }
    }
    boundaries
}
