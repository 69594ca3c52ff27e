//! Narration audio packaging.
//!
//! The speech endpoint answers with raw 16-bit little-endian mono PCM. An
//! `<audio>` element cannot play that, so it is wrapped in a RIFF/WAVE
//! header before being served.

use super::SpeechClip;

/// Sample rate assumed when the mime type does not state one.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;

/// Size of the canonical PCM WAVE header.
pub const WAV_HEADER_LEN: usize = 44;

/// Browser-playable audio: content type plus body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableAudio {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Whether `mime_type` denotes raw linear PCM.
fn is_raw_pcm(mime_type: &str) -> bool {
    let lower = mime_type.to_ascii_lowercase();
    lower.starts_with("audio/l16") || lower.contains("codec=pcm")
}

/// Sample rate from a `rate=` mime parameter.
#[must_use]
pub fn sample_rate(mime_type: &str) -> u32 {
    mime_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.trim().parse().ok())
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}

/// Make a speech clip playable: PCM is wrapped as WAV, anything else passes through.
#[must_use]
pub fn into_playable(clip: SpeechClip) -> PlayableAudio {
    if is_raw_pcm(&clip.mime_type) || clip.mime_type.is_empty() {
        PlayableAudio {
            content_type: "audio/wav".to_string(),
            body: wrap_pcm_as_wav(&clip.data, sample_rate(&clip.mime_type)),
        }
    } else {
        PlayableAudio {
            content_type: clip.mime_type,
            body: clip.data,
        }
    }
}

/// Prefix `pcm` with a 44-byte mono 16-bit WAVE header.
#[must_use]
pub fn wrap_pcm_as_wav(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate.saturating_mul(u32::from(block_align));
    let data_len = u32::try_from(pcm.len()).unwrap_or(u32::MAX - 36);

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&data_len.saturating_add(36).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}
