//! BMP codec: decodes 24/32-bit uncompressed `BI_RGB` bitmaps (top-down or
//! bottom-up), encodes 32-bit top-down BGRA with no row padding.

use crate::error::StegoError;
use crate::raster::RgbaImage;

const MAX_DIMENSION: i64 = 32768;

/// Decode a BMP byte stream into an RGBA raster.
pub fn decode(data: &[u8]) -> Result<RgbaImage, StegoError>
{
    if data.len() < 54 || &data[0..2] != b"BM"
    {
        return Err(StegoError::CarrierCorrupt("bmp: bad signature".into()));
    }

    let file_size = data.len();
    let pixel_offset = u32::from_le_bytes(data[10..14].try_into().unwrap()) as usize;
    let width = i32::from_le_bytes(data[18..22].try_into().unwrap());
    let height_field = i32::from_le_bytes(data[22..26].try_into().unwrap());
    let bits_per_pixel = u16::from_le_bytes(data[28..30].try_into().unwrap());

    if width <= 0 || width as i64 > MAX_DIMENSION
    {
        return Err(StegoError::CarrierCorrupt("bmp: invalid width".into()));
    }
    if height_field == 0 || (height_field as i64).abs() > MAX_DIMENSION
    {
        return Err(StegoError::CarrierCorrupt("bmp: invalid height".into()));
    }
    if bits_per_pixel != 24 && bits_per_pixel != 32
    {
        return Err(StegoError::CarrierCorrupt("bmp: only 24/32-bit BI_RGB is supported".into()));
    }
    if pixel_offset >= file_size
    {
        return Err(StegoError::CarrierCorrupt("bmp: pixel data offset out of range".into()));
    }

    let top_down = height_field < 0;
    let height = height_field.unsigned_abs();
    let width_u = width as u32;

    let src_bytes_per_pixel = (bits_per_pixel / 8) as usize;
    let row_stride = 4 * ((width_u as usize * src_bytes_per_pixel + 3) / 4);
    let required = pixel_offset
        .checked_add(row_stride.checked_mul(height as usize).ok_or_else(|| {
            StegoError::CarrierCorrupt("bmp: row stride overflow".into())
        })?)
        .ok_or_else(|| StegoError::CarrierCorrupt("bmp: pixel data overflow".into()))?;
    if required > file_size
    {
        return Err(StegoError::CarrierCorrupt("bmp: pixel data runs past end of file".into()));
    }

    let mut image = RgbaImage::new(width_u, height);
    for y in 0..height
    {
        let source_row = if top_down { y } else { height - 1 - y };
        let row_start = pixel_offset + source_row as usize * row_stride;
        for x in 0..width_u
        {
            let px_start = row_start + x as usize * src_bytes_per_pixel;
            let b = data[px_start];
            let g = data[px_start + 1];
            let r = data[px_start + 2];
            let a = if src_bytes_per_pixel == 4 { data[px_start + 3] } else { 255 };

            let dst = image.offset(x, y);
            image.pixels[dst] = r;
            image.pixels[dst + 1] = g;
            image.pixels[dst + 2] = b;
            image.pixels[dst + 3] = a;
        }
    }

    Ok(image)
}

/// Encode an RGBA raster as a 32-bit top-down BGRA BMP with no row padding.
pub fn encode(image: &RgbaImage) -> Vec<u8>
{
    let row_stride = image.width as usize * 4;
    let pixel_data_size = row_stride * image.height as usize;
    let pixel_offset = 54u32;
    let file_size = pixel_offset as usize + pixel_data_size;

    let mut out = Vec::with_capacity(file_size);

    // BITMAPFILEHEADER
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // reserved1
    out.extend_from_slice(&0u16.to_le_bytes()); // reserved2
    out.extend_from_slice(&pixel_offset.to_le_bytes());

    // BITMAPINFOHEADER
    out.extend_from_slice(&40u32.to_le_bytes()); // header size
    out.extend_from_slice(&(image.width as i32).to_le_bytes());
    out.extend_from_slice(&(-(image.height as i64) as i32).to_le_bytes()); // negative = top-down
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB, no compression
    out.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes()); // x ppm
    out.extend_from_slice(&2835i32.to_le_bytes()); // y ppm
    out.extend_from_slice(&0u32.to_le_bytes()); // colors used
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors

    for y in 0..image.height
    {
        for x in 0..image.width
        {
            let off = image.offset(x, y);
            let (r, g, b, a) =
                (image.pixels[off], image.pixels[off + 1], image.pixels[off + 2], image.pixels[off + 3]);
            out.push(b);
            out.push(g);
            out.push(r);
            out.push(a);
        }
    }

    out
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn checkerboard(width: u32, height: u32) -> RgbaImage
    {
        let mut image = RgbaImage::new(width, height);
        for y in 0..height
        {
            for x in 0..width
            {
                let off = image.offset(x, y);
                let on = (x + y) % 2 == 0;
                image.pixels[off] = if on { 200 } else { 10 };
                image.pixels[off + 1] = if on { 150 } else { 20 };
                image.pixels[off + 2] = if on { 100 } else { 30 };
                image.pixels[off + 3] = 255;
            }
        }
        image
    }

    #[test]
    fn round_trips_32bit()
    {
        let image = checkerboard(37, 19);
        let bytes = encode(&image);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn decodes_24bit_bottom_up_with_padding()
    {
        // Hand-build a tiny 2x2 24-bit bottom-up BMP (row stride padded to 4).
        let width = 2u32;
        let height = 2u32;
        let row_stride = 4usize; // 2 px * 3 bytes = 6, padded to 8... but keep simple: use 1x...
        let _ = row_stride;
        let mut data = Vec::new();
        let pixel_offset = 54u32;
        let raw_row_bytes = width as usize * 3;
        let stride = 4 * ((raw_row_bytes + 3) / 4);
        let pixel_data_size = stride * height as usize;
        let file_size = pixel_offset as usize + pixel_data_size;

        data.extend_from_slice(b"BM");
        data.extend_from_slice(&(file_size as u32).to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&pixel_offset.to_le_bytes());
        data.extend_from_slice(&40u32.to_le_bytes());
        data.extend_from_slice(&(width as i32).to_le_bytes());
        data.extend_from_slice(&(height as i32).to_le_bytes()); // positive = bottom-up
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&24u16.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
        data.extend_from_slice(&2835i32.to_le_bytes());
        data.extend_from_slice(&2835i32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());

        // Bottom row (stored first) is pure blue; top row (stored second) is pure green.
        // Row 0 in file = bottom row visually.
        let mut row_bottom = vec![0u8; stride];
        row_bottom[0] = 255; // B
        row_bottom[1] = 0;
        row_bottom[2] = 0;
        row_bottom[3] = 255;
        row_bottom[4] = 0;
        row_bottom[5] = 0;
        let mut row_top = vec![0u8; stride];
        row_top[0] = 0;
        row_top[1] = 255; // G
        row_top[2] = 0;
        row_top[3] = 0;
        row_top[4] = 255;
        row_top[5] = 0;

        data.extend_from_slice(&row_bottom);
        data.extend_from_slice(&row_top);

        let image = decode(&data).unwrap();
        // Visual top row (y=0) should be the green row stored last.
        let off = image.offset(0, 0);
        assert_eq!((image.pixels[off], image.pixels[off + 1], image.pixels[off + 2]), (0, 255, 0));
        let off_bottom = image.offset(0, 1);
        assert_eq!(
            (image.pixels[off_bottom], image.pixels[off_bottom + 1], image.pixels[off_bottom + 2]),
            (0, 0, 255)
        );
    }

    #[test]
    fn rejects_bad_signature()
    {
        assert!(decode(b"not a bitmap at all, just junk bytes!!").is_err());
    }
}
