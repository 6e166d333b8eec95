//! Conversions between the wire encoding of audio (base64) and core types.

use anyhow::{Result, bail};
use base64::Engine;

/// Decodes a base64 string representing PCM16 little-endian audio into f32
/// samples normalized to `[-1.0, 1.0]`.
pub fn decode_f32_from_base64_i16(base64_fragment: &str) -> Result<Vec<f32>> {
    let pcm16_bytes = base64::engine::general_purpose::STANDARD.decode(base64_fragment.trim())?;
    if pcm16_bytes.len() % 2 != 0 {
        bail!(
            "PCM16 audio must have an even number of bytes, got {}",
            pcm16_bytes.len()
        );
    }
    Ok(pcm16_bytes
        .chunks_exact(2)
        .map(|chunk| {
            let v = i16::from_le_bytes([chunk[0], chunk[1]]);
            (v as f32 / 32768.0).clamp(-1.0, 1.0)
        })
        .collect())
}

/// Encodes f32 samples as base64 PCM16 little-endian.
pub fn encode_f32_to_base64_i16(pcm32: &[f32]) -> String {
    let pcm16: Vec<u8> = pcm32
        .iter()
        .flat_map(|&sample| {
            let v = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            v.to_le_bytes()
        })
        .collect();
    base64::engine::general_purpose::STANDARD.encode(&pcm16)
}

/// Encodes an audio file (e.g. synthesized WAV) for a JSON response.
pub fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
