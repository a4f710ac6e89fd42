use std::path::Path;

// The two click sounds a metronome needs. Accent marks the downbeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickSound {
    Accent,
    Regular,
}

const CLICK_MS: f32 = 10.0;

/// A short mono click, either synthesized or loaded from a WAV file.
#[derive(Clone, Debug)]
pub struct ClickBuffer {
    pub data: Vec<f32>,
}

impl ClickBuffer {
    /// Default click for a sound slot: a decaying sine burst. The accent is
    /// higher-pitched and louder than the regular click.
    pub fn synth_default(sound: ClickSound, sample_rate: u32) -> Self {
        match sound {
            ClickSound::Accent => Self::synth(sample_rate, 1200.0, 0.6),
            ClickSound::Regular => Self::synth(sample_rate, 800.0, 0.4),
        }
    }

    pub fn synth(sample_rate: u32, frequency: f32, amplitude: f32) -> Self {
        let num_samples = ((CLICK_MS / 1000.0) * sample_rate as f32) as usize;
        let phase_inc = std::f32::consts::TAU * frequency / sample_rate as f32;

        let mut data = Vec::with_capacity(num_samples);
        for i in 0..num_samples {
            let t = i as f32 / num_samples as f32;
            let envelope = (-t * 8.0).exp();
            data.push((i as f32 * phase_inc).sin() * envelope * amplitude);
        }
        Self { data }
    }

    // Load a WAV from disk, mono-ized and resampled to the device rate
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max = (1i32 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let channels = spec.channels as usize;
        let mut data: Vec<f32> = if channels == 1 {
            samples
        } else {
            samples
                .chunks_exact(channels)
                .map(|c| c.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        if spec.sample_rate != target_rate {
            data = resample_linear(&data, spec.sample_rate, target_rate);
        }

        Ok(Self { data })
    }
}

fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        // fractional position in the source buffer
        let src_pos = i as f64 / ratio;
        let idx = src_pos.floor() as usize;
        let frac = (src_pos - idx as f64) as f32;
        if idx >= samples.len() - 1 {
            out.push(*samples.last().unwrap_or(&0.0));
        } else {
            out.push(samples[idx] * (1.0 - frac) + samples[idx + 1] * frac);
        }
    }
    out
}
