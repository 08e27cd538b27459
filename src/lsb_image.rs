//! LSB embed/extract over the RGB channels of an RGBA raster. Alpha is
//! never read or written as a capacity bit; every touched pixel's alpha is
//! forced to 255 so a stego PNG/BMP is always fully opaque where modified.

use crate::bitio::{BitReader, BitWriter};
use crate::error::StegoError;
use crate::raster::RgbaImage;

const MAGIC: &[u8; 4] = b"STEG";

/// Capacity in bytes available to `embed` at the given LSB depth, after
/// subtracting the 8-byte message-frame header (magic + length).
pub fn capacity_bytes(image: &RgbaImage, depth: u8) -> usize
{
    let total_bits = image.pixel_count() * 3 * depth as usize;
    (total_bits / 8).saturating_sub(8)
}

/// Embed a framed message (`"STEG"` + BE length + envelope) into the low
/// `depth` bits of each R, G, B channel, visiting pixels in row-major order.
/// Stops as soon as the whole message is written; later pixels (and later
/// channels within the final touched pixel) are left unchanged.
pub fn embed(image: &RgbaImage, message: &[u8], depth: u8) -> Result<RgbaImage, StegoError>
{
    debug_assert!((1..=4).contains(&depth));

    let mut framed = Vec::with_capacity(8 + message.len());
    framed.extend_from_slice(MAGIC);
    framed.extend_from_slice(&(message.len() as u32).to_be_bytes());
    framed.extend_from_slice(message);

    let total_bits = image.pixel_count() * 3 * depth as usize;
    if framed.len() * 8 > total_bits
    {
        return Err(StegoError::CapacityExceeded);
    }

    let clear_mask = 0xFFu8 << depth;
    let mut reader = BitReader::new(&framed);
    let mut out = image.clone();

    'rows: for y in 0..out.height
    {
        for x in 0..out.width
        {
            if reader.bits_read() >= framed.len() * 8
            {
                break 'rows;
            }

            let off = out.offset(x, y);
            for channel in 0..3
            {
                match reader.read_bits(depth)
                {
                    Some(bits) =>
                    {
                        out.pixels[off + channel] = (out.pixels[off + channel] & clear_mask) | bits as u8;
                    }
                    None => break,
                }
            }
            out.pixels[off + 3] = 255;
        }
    }

    Ok(out)
}

/// Extract a framed message from the low `depth` bits of each pixel's R, G,
/// B channels, in the same traversal order as `embed`.
pub fn extract(image: &RgbaImage, depth: u8) -> Result<Vec<u8>, StegoError>
{
    debug_assert!((1..=4).contains(&depth));

    let total_bits = image.pixel_count() * 3 * depth as usize;
    let mut writer = BitWriter::new();
    let bit_mask = ((1u16 << depth) - 1) as u8;

    for y in 0..image.height
    {
        for x in 0..image.width
        {
            let off = image.offset(x, y);
            for channel in 0..3
            {
                let sample = image.pixels[off + channel];
                writer.write_bits((sample & bit_mask) as u32, depth);
            }
        }
    }

    let packed = writer.into_bytes();
    if packed.len() * 8 < total_bits
    {
        // impossible given the traversal above, kept as a defensive bound check
        return Err(StegoError::NoHiddenData);
    }
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

#[cfg(test)]
mod tests
{
    use super::*;

    fn solid_image(width: u32, height: u32) -> RgbaImage
    {
        let mut image = RgbaImage::new(width, height);
        for (i, px) in image.pixels.chunks_mut(4).enumerate()
        {
            px[0] = (i * 7) as u8;
            px[1] = (i * 13) as u8;
            px[2] = (i * 29) as u8;
            px[3] = 255;
        }
        image
    }

    #[test]
    fn round_trips_small_message_depth1()
    {
        let image = solid_image(16, 16);
        let message = b"hello";
        let stego = embed(&image, message, 1).unwrap();
        let extracted = extract(&stego, 1).unwrap();
        assert_eq!(extracted, message);
    }

    #[test]
    fn alpha_forced_opaque_on_touched_pixels_untouched_unchanged()
    {
        let mut image = solid_image(8, 8);
        for px in image.pixels.chunks_mut(4)
        {
            px[3] = 10;
        }
        let stego = embed(&image, b"x", 1).unwrap();
        // first pixel touched
        assert_eq!(stego.pixels[3], 255);
        // far later pixel untouched (1 byte message needs only ~3 pixels at depth 1 incl. frame)
        let last_off = stego.offset(7, 7);
        assert_eq!(stego.pixels[last_off + 3], 10);
    }

    #[test]
    fn capacity_overflow_is_rejected()
    {
        let image = solid_image(8, 8);
        let message = vec![0u8; 200];
        assert_eq!(embed(&image, &message, 1), Err(StegoError::CapacityExceeded));
    }

    #[test]
    fn depth_mismatch_yields_no_hidden_data_not_garbage()
    {
        let image = solid_image(32, 32);
        let stego = embed(&image, b"payload", 1).unwrap();
        let err = extract(&stego, 2).unwrap_err();
        assert_eq!(err, StegoError::NoHiddenData);
    }

    #[test]
    fn higher_depth_round_trips()
    {
        let image = solid_image(16, 16);
        let message: Vec<u8> = (0..40u8).collect();
        let stego = embed(&image, &message, 3).unwrap();
        let extracted = extract(&stego, 3).unwrap();
        assert_eq!(extracted, message);
    }

    #[test]
    fn capacity_boundary_exact_fit_succeeds()
    {
        let image = solid_image(8, 8);
        let cap = capacity_bytes(&image, 1);
        let message = vec![0xAAu8; cap];
        assert!(embed(&image, &message, 1).is_ok());
        let message_plus_one = vec![0xAAu8; cap + 1];
        assert_eq!(embed(&image, &message_plus_one, 1), Err(StegoError::CapacityExceeded));
    }
}
