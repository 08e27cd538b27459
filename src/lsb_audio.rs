//! LSB embed/extract over 16-bit PCM samples. Interleaving is ignored —
//! samples are visited in flat index order regardless of channel layout.

use crate::bitio::{BitReader, BitWriter};
use crate::error::StegoError;
use crate::raster::PcmAudio;

const MAGIC: &[u8; 4] = b"STEG";

/// Capacity in bytes available to `embed` at the given LSB depth, after
/// subtracting the 8-byte message-frame header.
pub fn capacity_bytes(audio: &PcmAudio, depth: u8) -> usize
{
    let total_bits = audio.samples.len() * depth as usize;
    (total_bits / 8).saturating_sub(8)
}

/// Embed a framed message into the low `depth` bits of each sample's
/// two's-complement bit pattern, in index order.
pub fn embed(audio: &PcmAudio, message: &[u8], depth: u8) -> Result<PcmAudio, StegoError>
{
    debug_assert!((1..=4).contains(&depth));

    let mut framed = Vec::with_capacity(8 + message.len());
    framed.extend_from_slice(MAGIC);
    framed.extend_from_slice(&(message.len() as u32).to_be_bytes());
    framed.extend_from_slice(message);

    let total_bits = audio.samples.len() * depth as usize;
    if framed.len() * 8 > total_bits
    {
        return Err(StegoError::CapacityExceeded);
    }

    let clear_mask = 0xFFFFu16 << depth;
    let mut reader = BitReader::new(&framed);
    let mut out = audio.clone();

    for sample in out.samples.iter_mut()
    {
        if reader.bits_read() >= framed.len() * 8
        {
            break;
        }
        let bits = reader.read_bits(depth).unwrap_or(0) as u16;
        let pattern = u16::from_le_bytes(sample.to_le_bytes());
        let updated = (pattern & clear_mask) | bits;
        *sample = i16::from_le_bytes(updated.to_le_bytes());
    }

    Ok(out)
}

/// Extract a framed message from the low `depth` bits of each sample, in
/// index order.
pub fn extract(audio: &PcmAudio, depth: u8) -> Result<Vec<u8>, StegoError>
{
    debug_assert!((1..=4).contains(&depth));

    let total_bits = audio.samples.len() * depth as usize;
    let bit_mask = ((1u16 << depth) - 1) as u16;
    let mut writer = BitWriter::new();

    for &sample in &audio.samples
    {
        let pattern = u16::from_le_bytes(sample.to_le_bytes());
        writer.write_bits((pattern & bit_mask) as u32, depth);
    }

    let packed = writer.into_bytes();
    if packed.len() < 8 || &packed[0..4] != MAGIC
    {
        return Err(StegoError::NoHiddenData);
    }

    let length = u32::from_be_bytes(packed[4..8].try_into().unwrap()) as usize;
    let max_len = total_bits.saturating_sub(64) / 8;
    if length == 0 || length > max_len
    {
        return Err(StegoError::NoHiddenData);
    }
    if packed.len() < 8 + length
    {
        return Err(StegoError::NoHiddenData);
    }

    Ok(packed[8..8 + length].to_vec())
}
