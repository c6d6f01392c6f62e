//! Sample-rate and channel conversion for playback.
//!
//! espeak-ng writes 22.05 kHz mono; output devices usually run at 44.1 or
//! 48 kHz with two channels.  [`resample_linear`] bridges the rate and
//! [`spread_channels`] duplicates mono frames across the device channels.

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// * `channels == 1` returns the input unchanged.
/// * `channels == 0` returns an empty vector.
///
/// ```rust
/// use perceiva::audio::downmix_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4];
/// let mono = downmix_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Resample mono `samples` from `from_rate` to `to_rate` with linear
/// interpolation.
///
/// Equal rates and empty input are returned as-is.  The output length is
/// `ceil(len * to_rate / from_rate)`.
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() || from_rate == 0 || to_rate == 0 {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

/// Interleave a mono signal into `channels` identical channels.
pub fn spread_channels(mono: &[f32], channels: u16) -> Vec<f32> {
    let n = channels.max(1) as usize;
    if n == 1 {
        return mono.to_vec();
    }
    mono.iter()
        .flat_map(|&s| std::iter::repeat(s).take(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_already_mono() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&input, 1), input);
    }

    #[test]
    fn downmix_two_channel() {
        let out = downmix_to_mono(&[1.0_f32, -1.0, 0.5, 0.5], 2);
        assert_eq!(out.len(), 2);
        assert!(out[0].abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn downmix_zero_channels() {
        assert!(downmix_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    #[test]
    fn equal_rates_is_noop() {
        let input: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        assert_eq!(resample_linear(&input, 22_050, 22_050), input);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(resample_linear(&[], 22_050, 48_000).is_empty());
    }

    #[test]
    fn espeak_rate_to_48k_length() {
        // One second at 22.05 kHz becomes one second at 48 kHz.
        let out = resample_linear(&vec![0.0; 22_050], 22_050, 48_000);
        assert!(out.len().abs_diff(48_000) <= 1, "got {}", out.len());
    }

    #[test]
    fn downsample_length() {
        let out = resample_linear(&vec![0.5; 480], 48_000, 16_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn constant_signal_keeps_amplitude() {
        let out = resample_linear(&vec![0.5_f32; 441], 22_050, 44_100);
        for s in out {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }

    #[test]
    fn upsample_interpolates_midpoints() {
        let out = resample_linear(&[0.0, 1.0], 1, 2);
        assert_eq!(out.len(), 4);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn spread_to_stereo() {
        assert_eq!(spread_channels(&[0.1, 0.2], 2), vec![0.1, 0.1, 0.2, 0.2]);
        assert_eq!(spread_channels(&[0.3], 1), vec![0.3]);
    }
}
