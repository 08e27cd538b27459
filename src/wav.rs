//! WAV codec: a generic RIFF sub-chunk walker that extracts `fmt `/`data`
//! from a 16-bit PCM WAVE file, and a canonical 44-byte-header encoder.
//! Hand-rolled rather than delegated to a WAV-file crate because §4.4 of the
//! spec scopes this as one of the four core codec subsystems.

use crate::error::StegoError;
use crate::raster::PcmAudio;

const WAVE_FORMAT_PCM: u16 = 1;

struct RiffChunk<'a>
{
    id: [u8; 4],
    data: &'a [u8],
}

fn walk_riff_chunks(data: &[u8]) -> Result<Vec<RiffChunk<'_>>, StegoError>
{
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE"
    {
        return Err(StegoError::CarrierCorrupt("wav: not a RIFF/WAVE file".into()));
    }

    let mut chunks = Vec::new();
    let mut pos = 12usize;
    while pos + 8 <= data.len()
    {
        let id: [u8; 4] = data[pos..pos + 4].try_into().unwrap();
        let size = u32::from_le_bytes(data[pos + 4..pos + 8].try_into().unwrap()) as usize;
        let payload_start = pos + 8;
        let payload_end = payload_start
            .checked_add(size)
            .ok_or_else(|| StegoError::CarrierCorrupt("wav: chunk size overflow".into()))?;
        if payload_end > data.len()
        {
            return Err(StegoError::CarrierCorrupt("wav: chunk runs past end of file".into()));
        }

        chunks.push(RiffChunk { id, data: &data[payload_start..payload_end] });

        // chunks are padded to an even byte count
        pos = payload_end + (size % 2);
    }

    Ok(chunks)
}

/// Decode a WAV byte stream into interleaved 16-bit PCM samples.
pub fn decode(data: &[u8]) -> Result<PcmAudio, StegoError>
{
    let chunks = walk_riff_chunks(data)?;

    let fmt = chunks
        .iter()
        .find(|c| &c.id == b"fmt ")
        .ok_or_else(|| StegoError::CarrierCorrupt("wav: missing fmt chunk".into()))?;
    if fmt.data.len() < 16
    {
        return Err(StegoError::CarrierCorrupt("wav: malformed fmt chunk".into()));
    }
    let audio_format = u16::from_le_bytes(fmt.data[0..2].try_into().unwrap());
    let channels = u16::from_le_bytes(fmt.data[2..4].try_into().unwrap());
    let sample_rate = u32::from_le_bytes(fmt.data[4..8].try_into().unwrap());
    let bits_per_sample = u16::from_le_bytes(fmt.data[14..16].try_into().unwrap());

    if audio_format != WAVE_FORMAT_PCM
    {
        return Err(StegoError::CarrierCorrupt("wav: only uncompressed PCM is supported".into()));
    }
    if bits_per_sample != 16
    {
        return Err(StegoError::CarrierCorrupt("wav: only 16-bit PCM is supported".into()));
    }
    if channels == 0
    {
        return Err(StegoError::CarrierCorrupt("wav: zero channel count".into()));
    }

    let data_chunk = chunks
        .iter()
        .find(|c| &c.id == b"data")
        .ok_or_else(|| StegoError::CarrierCorrupt("wav: missing data chunk".into()))?;
    if data_chunk.data.len() % 2 != 0
    {
        return Err(StegoError::CarrierCorrupt("wav: data chunk has an odd byte count".into()));
    }

    let samples: Vec<i16> = data_chunk
        .data
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();

    Ok(PcmAudio { sample_rate, channels, samples })
}

/// Encode interleaved 16-bit PCM samples as a canonical 44-byte-header WAV file.
pub fn encode(audio: &PcmAudio) -> Vec<u8>
{
    let data_size = audio.samples.len() * 2;
    let block_align = audio.channels * 2;
    let byte_rate = audio.sample_rate * block_align as u32;
    let riff_size = 36 + data_size as u32;

    let mut out = Vec::with_capacity(44 + data_size);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&audio.channels.to_le_bytes());
    out.extend_from_slice(&audio.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_size as u32).to_le_bytes());
    for sample in &audio.samples
    {
        out.extend_from_slice(&sample.to_le_bytes());
    }

    out
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn sine_wave(sample_rate: u32, channels: u16, seconds: f64) -> PcmAudio
    {
        let total_frames = (sample_rate as f64 * seconds) as usize;
        let mut samples = Vec::with_capacity(total_frames * channels as usize);
        for n in 0..total_frames
        {
            let t = n as f64 / sample_rate as f64;
            let value = (t * 440.0 * std::f64::consts::TAU).sin();
            let s = (value * i16::MAX as f64) as i16;
            for _ in 0..channels
            {
                samples.push(s);
            }
        }
        PcmAudio { sample_rate, channels, samples }
    }

    #[test]
    fn round_trips_mono_sine()
    {
        let audio = sine_wave(44100, 1, 1.0);
        let bytes = encode(&audio);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, audio);
    }

    #[test]
    fn round_trips_stereo()
    {
        let audio = sine_wave(8000, 2, 0.1);
        let bytes = encode(&audio);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.sample_rate, 8000);
        assert_eq!(decoded.samples, audio.samples);
    }

    #[test]
    fn rejects_missing_data_chunk()
    {
        let mut data = Vec::new();
        data.extend_from_slice(b"RIFF");
        data.extend_from_slice(&20u32.to_le_bytes());
        data.extend_from_slice(b"WAVE");
        data.extend_from_slice(b"fmt ");
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&44100u32.to_le_bytes());
        data.extend_from_slice(&88200u32.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&16u16.to_le_bytes());

        assert!(decode(&data).is_err());
    }

    #[test]
    fn rejects_non_pcm_format()
    {
        let mut data = Vec::new();
        data.extend_from_slice(b"RIFF");
        data.extend_from_slice(&36u32.to_le_bytes());
        data.extend_from_slice(b"WAVE");
        data.extend_from_slice(b"fmt ");
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(&3u16.to_le_bytes()); // IEEE float, unsupported
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&44100u32.to_le_bytes());
        data.extend_from_slice(&88200u32.to_le_bytes());
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&16u16.to_le_bytes());
        data.extend_from_slice(b"data");
        data.extend_from_slice(&0u32.to_le_bytes());

        assert!(decode(&data).is_err());
    }
}
