//! Payload container: the plaintext structure that gets encrypted by the
//! crypto envelope. Carries the original file/text type, name, MIME type,
//! and timestamp alongside the opaque payload bytes.
//!
//! Unpack failures (bad version handling aside — see the mandatory legacy
//! path below) all collapse to `StegoError::DecryptFailure`: by the time
//! this module runs, the bytes have already passed AEAD authentication, so
//! a malformed container here means either a forged payload with a
//! coincidentally-valid tag (cryptographically implausible) or a
//! corrupted/foreign plaintext — neither is worth a distinct error kind,
//! and conflating them with genuine decrypt failures avoids leaking which
//! stage rejected the input.

use serde::{Deserialize, Serialize};

use crate::error::StegoError;

const VERSION: u8 = 1;
const MAX_METADATA_BYTES: usize = 10_240;
const MAX_NAME_UTF16_UNITS: usize = 255;
const MAX_MIME_CHARS: usize = 100;
const LEGACY_NAME: &str = "recovered_data.bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind
{
    Text,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadMetadata
{
    #[serde(rename = "type")]
    pub kind: PayloadKind,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Payload
{
    pub metadata: PayloadMetadata,
    pub bytes: Vec<u8>,
}

/// Current time as milliseconds since the Unix epoch.
fn now_millis() -> i64
{
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Truncate `name` to `MAX_NAME_UTF16_UNITS` UTF-16 code units (splitting a
/// surrogate pair is accepted, matching the documented truncation unit),
/// then drop any disallowed or control character.
fn sanitize_name(name: &str) -> String
{
    let truncated: Vec<u16> = name.encode_utf16().take(MAX_NAME_UTF16_UNITS).collect();
    let truncated = String::from_utf16_lossy(&truncated);
    truncated
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') && !c.is_control())
        .collect()
}

fn sanitize_mime(mime: &str) -> String
{
    mime.chars().take(MAX_MIME_CHARS).collect()
}

/// Build the plaintext metadata record, sanitizing caller-supplied fields.
pub fn build_metadata(kind: PayloadKind, name: Option<&str>, mime_type: Option<&str>) -> PayloadMetadata
{
    PayloadMetadata {
        kind,
        timestamp: now_millis(),
        name: name.map(sanitize_name),
        mime_type: mime_type.map(sanitize_mime),
    }
}

/// Pack metadata + payload bytes into `[version][len LE u32][json][bytes]`.
pub fn pack(payload: &Payload) -> Result<Vec<u8>, StegoError>
{
    let json = serde_json::to_vec(&payload.metadata)
        .map_err(|_| StegoError::CarrierCorrupt("payload: metadata serialization failed".into()))?;
    if json.is_empty() || json.len() > MAX_METADATA_BYTES
    {
        return Err(StegoError::CarrierCorrupt("payload: metadata too large".into()));
    }

    let mut out = Vec::with_capacity(5 + json.len() + payload.bytes.len());
    out.push(VERSION);
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&json);
    out.extend_from_slice(&payload.bytes);
    Ok(out)
}

/// Unpack a payload container. Any version byte other than 1 is treated as
/// a legacy raw payload (mandatory compatibility path): the whole buffer is
/// the payload bytes, with synthesized `{type: "file", name:
/// "recovered_data.bin"}` metadata.
pub fn unpack(data: &[u8]) -> Result<Payload, StegoError>
{
    if data.len() < 5
    {
        return Err(StegoError::DecryptFailure);
    }

    if data[0] != VERSION
    {
        return Ok(Payload {
            metadata: PayloadMetadata {
                kind: PayloadKind::File,
                timestamp: now_millis(),
                name: Some(LEGACY_NAME.to_string()),
                mime_type: None,
            },
            bytes: data.to_vec(),
        });
    }

    let metadata_len = u32::from_le_bytes(data[1..5].try_into().unwrap()) as usize;
    if metadata_len == 0 || metadata_len > MAX_METADATA_BYTES || 5 + metadata_len > data.len()
    {
        return Err(StegoError::DecryptFailure);
    }

    let json = &data[5..5 + metadata_len];
    let mut metadata: PayloadMetadata =
        serde_json::from_slice(json).map_err(|_| StegoError::DecryptFailure)?;

    if let Some(mime) = &metadata.mime_type
    {
        if mime.chars().count() > MAX_MIME_CHARS
        {
            return Err(StegoError::DecryptFailure);
        }
    }
    metadata.name = metadata.name.as_deref().map(sanitize_name);

    Ok(Payload { metadata, bytes: data[5 + metadata_len..].to_vec() })
}
