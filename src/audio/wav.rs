//! PCM WAV reader for the speech artifact.
//!
//! Only what espeak-ng writes is supported: uncompressed PCM, 8 or 16 bit,
//! any channel count.  Unknown chunks (`LIST`, `fact`, ...) are skipped.

use std::path::Path;

use super::playback::PlaybackError;

/// Decoded audio ready for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct WavClip {
    /// Interleaved samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl WavClip {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.channels as f32 / self.sample_rate as f32
    }
}

const PCM_FORMAT: u16 = 1;

struct FormatChunk {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse a RIFF/WAVE byte buffer.
pub fn parse_wav(bytes: &[u8]) -> Result<WavClip, PlaybackError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(PlaybackError::Format("not a RIFF/WAVE file".into()));
    }

    let mut format: Option<FormatChunk> = None;
    let mut pos = 12;

    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let declared = u32_at(bytes, pos + 4) as usize;
        let body = pos + 8;
        // espeak-ng writes 0x7fffffff as the data size when streaming to a file.
        let len = declared.min(bytes.len() - body);

        match id {
            b"fmt " => {
                if len < 16 {
                    return Err(PlaybackError::Format("fmt chunk too short".into()));
                }
                let tag = u16_at(bytes, body);
                if tag != PCM_FORMAT {
                    return Err(PlaybackError::Format(format!(
                        "unsupported encoding tag {tag}"
                    )));
                }
                format = Some(FormatChunk {
                    channels: u16_at(bytes, body + 2),
                    sample_rate: u32_at(bytes, body + 4),
                    bits_per_sample: u16_at(bytes, body + 14),
                });
            }
            b"data" => {
                let fmt = format
                    .as_ref()
                    .ok_or_else(|| PlaybackError::Format("data chunk before fmt".into()))?;
                if fmt.channels == 0 || fmt.sample_rate == 0 {
                    return Err(PlaybackError::Format("empty stream parameters".into()));
                }
                let samples = decode_pcm(&bytes[body..body + len], fmt.bits_per_sample)?;
                return Ok(WavClip {
                    samples,
                    sample_rate: fmt.sample_rate,
                    channels: fmt.channels,
                });
            }
            _ => {}
        }

        // Chunks are word aligned.
        pos = body + len + (len & 1);
    }

    Err(PlaybackError::Format("no data chunk".into()))
}

fn decode_pcm(data: &[u8], bits: u16) -> Result<Vec<f32>, PlaybackError> {
    match bits {
        8 => Ok(data.iter().map(|&b| (b as f32 - 128.0) / 128.0).collect()),
        16 => Ok(data
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]) as f32 / i16::MAX as f32)
            .collect()),
        other => Err(PlaybackError::Format(format!(
            "unsupported bit depth {other}"
        ))),
    }
}

/// Read and parse a WAV file from disk.
pub fn read_wav(path: &Path) -> Result<WavClip, PlaybackError> {
    let bytes = std::fs::read(path).map_err(|e| PlaybackError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_wav(&bytes)
}

#[cfg(test)]
pub(crate) fn encode_pcm16(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * channels as u32 * 2).to_le_bytes());
    out.extend_from_slice(&(channels * 2).to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mono_pcm16() {
        let bytes = encode_pcm16(&[0, i16::MAX, -i16::MAX, 0], 22_050, 1);
        let clip = parse_wav(&bytes).unwrap();
        assert_eq!(clip.sample_rate, 22_050);
        assert_eq!(clip.channels, 1);
        assert_eq!(clip.samples.len(), 4);
        assert!((clip.samples[1] - 1.0).abs() < 1e-6);
        assert!((clip.samples[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn skips_unknown_chunks() {
        let plain = encode_pcm16(&[100, 200], 16_000, 1);
        // Insert an odd-sized LIST chunk (plus pad byte) between fmt and data.
        let mut bytes = plain[..36].to_vec();
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3, 0]);
        bytes.extend_from_slice(&plain[36..]);

        let clip = parse_wav(&bytes).unwrap();
        assert_eq!(clip.samples.len(), 2);
    }

    #[test]
    fn oversized_data_length_is_clamped() {
        let mut bytes = encode_pcm16(&[1, 2, 3], 22_050, 1);
        bytes[40..44].copy_from_slice(&0x7fff_ffffu32.to_le_bytes());
        let clip = parse_wav(&bytes).unwrap();
        assert_eq!(clip.samples.len(), 3);
    }

    #[test]
    fn duration_accounts_for_channels() {
        let bytes = encode_pcm16(&[0; 16_000], 8_000, 2);
        let clip = parse_wav(&bytes).unwrap();
        assert!((clip.duration_secs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_non_wav() {
        assert!(matches!(
            parse_wav(b"ID3\x03 definitely an mp3"),
            Err(PlaybackError::Format(_))
        ));
    }

    #[test]
    fn rejects_non_pcm() {
        let mut bytes = encode_pcm16(&[0, 0], 8_000, 1);
        bytes[20..22].copy_from_slice(&3u16.to_le_bytes()); // IEEE float
        assert!(parse_wav(&bytes).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_wav(&dir.path().join("absent.wav")).unwrap_err();
        assert!(matches!(err, PlaybackError::Io { .. }));
    }
}
