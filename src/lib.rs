//! Password-based LSB steganography over PNG, BMP, and 16-bit PCM WAV
//! carriers, with an AES-256-GCM authenticated-encryption envelope and a
//! versioned payload metadata container.
//!
//! The public surface is three functions: [`encode`], [`decode`], and
//! [`analyze_capacity`]. Everything else is an internal pipeline stage
//! composed by byte arrays, not shared state — see each module for its
//! piece of the pipeline: [`bitio`] (bit packing), [`png`]/[`bmp`]/[`wav`]
//! (carrier codecs), [`lsb_image`]/[`lsb_audio`] (the embed/extract engine),
//! [`payload`] (metadata container), [`crypto`] (the encryption envelope),
//! [`limits`] (platform-aware validation policy).

pub mod bitio;
pub mod bmp;
pub mod crc32;
pub mod crypto;
pub mod error;
pub mod limits;
pub mod lsb_audio;
pub mod lsb_image;
pub mod payload;
pub mod png;
pub mod raster;
pub mod wav;

pub use error::StegoError;
pub use limits::Platform;
pub use payload::PayloadKind;

use raster::{PcmAudio, RgbaImage};

/// Which lossless carrier format a byte buffer is (or should be) encoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind
{
    Png,
    Bmp,
    Wav,
}

/// A payload to embed: either UTF-8 text or a named file with a MIME type.
#[derive(Debug, Clone)]
pub enum Payload
{
    Text(String),
    File { bytes: Vec<u8>, name: String, mime: String },
}

/// The recovered payload and its metadata, returned by [`decode`].
#[derive(Debug, Clone)]
pub struct DecodedPayload
{
    pub bytes: Vec<u8>,
    pub metadata: payload::PayloadMetadata,
}

#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions
{
    pub lsb_depth: u8,
    pub high_security: bool,
    pub compress: bool,
    pub platform: Platform,
    pub expert: bool,
}

impl Default for EncodeOptions
{
    fn default() -> Self
    {
        EncodeOptions { lsb_depth: 1, high_security: false, compress: true, platform: Platform::Desktop, expert: false }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions
{
    pub lsb_depth: u8,
    pub platform: Platform,
    pub expert: bool,
}

impl Default for DecodeOptions
{
    fn default() -> Self
    {
        DecodeOptions { lsb_depth: 1, platform: Platform::Desktop, expert: false }
    }
}

/// Capacity report for [`analyze_capacity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport
{
    pub total_bytes: usize,
}

enum DecodedCarrier
{
    Image(RgbaImage),
    Audio(PcmAudio),
}

fn decode_carrier(carrier: &[u8], kind: CarrierKind) -> Result<DecodedCarrier, StegoError>
{
    match kind
    {
        CarrierKind::Png => Ok(DecodedCarrier::Image(png::decode(carrier)?)),
        CarrierKind::Bmp => Ok(DecodedCarrier::Image(bmp::decode(carrier)?)),
        CarrierKind::Wav => Ok(DecodedCarrier::Audio(wav::decode(carrier)?)),
    }
}

fn payload_to_container(payload: Payload) -> payload::Payload
{
    match payload
    {
        Payload::Text(text) =>
        {
            payload::Payload { metadata: payload::build_metadata(PayloadKind::Text, None, None), bytes: text.into_bytes() }
        }
        Payload::File { bytes, name, mime } =>
        {
            payload::Payload {
                metadata: payload::build_metadata(PayloadKind::File, Some(&name), Some(&mime)),
                bytes,
            }
        }
    }
}

/// Encrypt and embed `payload` into `carrier`, returning the stego carrier
/// bytes re-encoded in the same format it was decoded from.
pub fn encode(
    carrier: &[u8],
    kind: CarrierKind,
    payload: Payload,
    password: &str,
    options: &EncodeOptions,
) -> Result<(Vec<u8>, CarrierKind), StegoError>
{
    let warns_detectability = limits::check_depth_policy(options.lsb_depth, options.platform, options.expert)?;
    if warns_detectability
    {
        log::warn!("encode: LSB depth {} exceeds 2 — carrier is more susceptible to statistical detection", options.lsb_depth);
    }

    let container = payload_to_container(payload);
    let plaintext = payload::pack(&container)?;
    limits::check_payload_size(options.platform, plaintext.len())?;

    let crypto_options = crypto::CryptoOptions { high_security: options.high_security, compress: options.compress };
    // Compress (cheap) and size the envelope *before* paying for key
    // derivation or AEAD, so a carrier that can't hold the message is
    // rejected with `CapacityExceeded` without ever running crypto.
    let body = crypto::compress(&plaintext, options.compress);
    let envelope_len = crypto::envelope_len(body.len());

    match kind
    {
        CarrierKind::Png | CarrierKind::Bmp =>
        {
            limits::check_image_size(options.platform, carrier.len())?;
            let image = match kind
            {
                CarrierKind::Png => png::decode(carrier)?,
                CarrierKind::Bmp => bmp::decode(carrier)?,
                CarrierKind::Wav => unreachable!(),
            };
            limits::check_capacity(envelope_len, lsb_image::capacity_bytes(&image, options.lsb_depth))?;
            let envelope = crypto::encrypt_body(&body, password, &crypto_options)?;
            let stego_image = lsb_image::embed(&image, &envelope, options.lsb_depth)?;
            let out = match kind
            {
                CarrierKind::Png => png::encode(&stego_image),
                CarrierKind::Bmp => bmp::encode(&stego_image),
                CarrierKind::Wav => unreachable!(),
            };
            log::debug!("encode: embedded a {}-byte envelope into a {:?} carrier at depth {}", envelope.len(), kind, options.lsb_depth);
            Ok((out, kind))
        }
        CarrierKind::Wav =>
        {
            limits::check_audio_size(options.platform, carrier.len())?;
            let audio = wav::decode(carrier)?;
            limits::check_capacity(envelope_len, lsb_audio::capacity_bytes(&audio, options.lsb_depth))?;
            let envelope = crypto::encrypt_body(&body, password, &crypto_options)?;
            let stego_audio = lsb_audio::embed(&audio, &envelope, options.lsb_depth)?;
            log::debug!("encode: embedded a {}-byte envelope into a WAV carrier at depth {}", envelope.len(), options.lsb_depth);
            Ok((wav::encode(&stego_audio), kind))
        }
    }
}

/// Extract and decrypt a payload previously embedded by [`encode`].
pub fn decode(stego: &[u8], kind: CarrierKind, password: &str, options: &DecodeOptions) -> Result<DecodedPayload, StegoError>
{
    let warns_detectability = limits::check_depth_policy(options.lsb_depth, options.platform, options.expert)?;
    if warns_detectability
    {
        log::warn!("decode: LSB depth {} exceeds 2 — carrier is more susceptible to statistical detection", options.lsb_depth);
    }

    let envelope = match kind
    {
        CarrierKind::Png =>
        {
            limits::check_image_size(options.platform, stego.len())?;
            let image = png::decode(stego)?;
            lsb_image::extract(&image, options.lsb_depth)?
        }
        CarrierKind::Bmp =>
        {
            limits::check_image_size(options.platform, stego.len())?;
            let image = bmp::decode(stego)?;
            lsb_image::extract(&image, options.lsb_depth)?
        }
        CarrierKind::Wav =>
        {
            limits::check_audio_size(options.platform, stego.len())?;
            let audio = wav::decode(stego)?;
            lsb_audio::extract(&audio, options.lsb_depth)?
        }
    };

    let plaintext = crypto::decrypt(&envelope, password)?;
    let container = payload::unpack(&plaintext)?;
    log::debug!("decode: recovered {} payload bytes from a {:?} carrier", container.bytes.len(), kind);
    Ok(DecodedPayload { bytes: container.bytes, metadata: container.metadata })
}

/// Report how many payload bytes `carrier` can hold at `lsb_depth`, after
/// the message-frame header.
pub fn analyze_capacity(carrier: &[u8], kind: CarrierKind, lsb_depth: u8) -> Result<CapacityReport, StegoError>
{
    let total_bytes = match decode_carrier(carrier, kind)?
    {
        DecodedCarrier::Image(image) => lsb_image::capacity_bytes(&image, lsb_depth),
        DecodedCarrier::Audio(audio) => lsb_audio::capacity_bytes(&audio, lsb_depth),
    };
    Ok(CapacityReport { total_bytes })
}
