//! Platform-aware size ceilings, format whitelist, and LSB-depth policy,
//! enforced at the public API boundary before any codec or crypto work runs.

use crate::error::StegoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform
{
    Desktop,
    Mobile,
}

const DESKTOP_IMAGE_MAX: usize = 100 * 1024 * 1024;
const DESKTOP_AUDIO_MAX: usize = 200 * 1024 * 1024;
const DESKTOP_PAYLOAD_MAX: usize = 50 * 1024 * 1024;
const MOBILE_IMAGE_MAX: usize = 20 * 1024 * 1024;
const MOBILE_AUDIO_MAX: usize = 20 * 1024 * 1024;
const MOBILE_PAYLOAD_MAX: usize = 10 * 1024 * 1024;

const DENSITY_WARN_THRESHOLD: f64 = 0.50;
const DENSITY_HIGH_THRESHOLD: f64 = 0.80;

/// Reject a carrier whose byte size exceeds the platform's ceiling for its kind.
pub fn check_image_size(platform: Platform, byte_len: usize) -> Result<(), StegoError>
{
    let max = match platform
    {
        Platform::Desktop => DESKTOP_IMAGE_MAX,
        Platform::Mobile => MOBILE_IMAGE_MAX,
    };
    if byte_len > max
    {
        return Err(StegoError::UnsupportedFormat(format!(
            "image carrier of {byte_len} bytes exceeds the {max}-byte {platform:?} ceiling"
        )));
    }
    Ok(())
}

pub fn check_audio_size(platform: Platform, byte_len: usize) -> Result<(), StegoError>
{
    let max = match platform
    {
        Platform::Desktop => DESKTOP_AUDIO_MAX,
        Platform::Mobile => MOBILE_AUDIO_MAX,
    };
    if byte_len > max
    {
        return Err(StegoError::UnsupportedFormat(format!(
            "audio carrier of {byte_len} bytes exceeds the {max}-byte {platform:?} ceiling"
        )));
    }
    Ok(())
}

pub fn check_payload_size(platform: Platform, byte_len: usize) -> Result<(), StegoError>
{
    let max = match platform
    {
        Platform::Desktop => DESKTOP_PAYLOAD_MAX,
        Platform::Mobile => MOBILE_PAYLOAD_MAX,
    };
    if byte_len > max
    {
        return Err(StegoError::UnsupportedFormat(format!(
            "payload of {byte_len} bytes exceeds the {max}-byte {platform:?} ceiling"
        )));
    }
    Ok(())
}

/// Enforce the LSB-depth policy: depth must be 1..=4; depth 1 is mandatory
/// on mobile or in quick (non-expert) mode; depths 2-4 require expert mode
/// on desktop. Returns `Ok(true)` when a depth > 2 warrants a detectability
/// warning the caller may surface.
pub fn check_depth_policy(depth: u8, platform: Platform, expert: bool) -> Result<bool, StegoError>
{
    if !(1..=4).contains(&depth)
    {
        return Err(StegoError::DepthPolicy(depth));
    }
    if depth > 1 && (platform == Platform::Mobile || !expert)
    {
        return Err(StegoError::DepthPolicy(depth));
    }
    Ok(depth > 2)
}

/// Verify `envelope_len` (plus the 8-byte message-frame header) fits within
/// `capacity_bytes`, the precheck mandated before any crypto work runs.
pub fn check_capacity(envelope_len: usize, capacity_bytes: usize) -> Result<(), StegoError>
{
    if envelope_len > capacity_bytes
    {
        return Err(StegoError::CapacityExceeded);
    }
    Ok(())
}

/// Advisory density classification for UI-facing warnings. Not enforced —
/// `check_capacity` is the only hard gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityWarning
{
    None,
    NearCapacity,
    HighDensity,
}

pub fn density_warning(used_bytes: usize, capacity_bytes: usize) -> DensityWarning
{
    if capacity_bytes == 0
    {
        return DensityWarning::HighDensity;
    }
    let ratio = used_bytes as f64 / capacity_bytes as f64;
    if ratio > DENSITY_HIGH_THRESHOLD
    {
        DensityWarning::HighDensity
    }
    else if ratio > DENSITY_WARN_THRESHOLD
    {
        DensityWarning::NearCapacity
    }
    else
    {
        DensityWarning::None
    }
}
