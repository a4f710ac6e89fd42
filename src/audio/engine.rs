use crate::audio_api::{AudioCommand, ClickParams, ClickSound};

use super::click::ClickBuffer;
use super::clock::AudioClock;

const MAX_PENDING: usize = 32; // hard caps so we won't malloc in the audio callback
const MAX_VOICES: usize = 8;

// A click waiting for its start frame to come around.
#[derive(Clone, Copy, Debug, Default)]
struct Pending {
    sound: Option<ClickSound>,
    start_frame: u64,
    gain: f32,
}

// A click currently sounding. `onset` is the frame offset inside the next
// rendered block at which the first sample lands; 0 once playback has begun.
#[derive(Clone, Copy, Debug)]
struct Voice {
    sound: ClickSound,
    pos: usize,
    onset: usize,
    gain: f32,
    alive: bool,
}

pub struct Engine {
    clock: AudioClock,
    channels: usize,
    accent: Option<ClickBuffer>,
    regular: Option<ClickBuffer>,
    pending: [Pending; MAX_PENDING],
    voices: [Voice; MAX_VOICES],
}

impl Engine {
    pub fn new(clock: AudioClock, channels: usize) -> Self {
        let empty = Voice {
            sound: ClickSound::Regular,
            pos: 0,
            onset: 0,
            gain: 0.0,
            alive: false,
        };
        Self {
            clock,
            channels,
            accent: None,
            regular: None,
            pending: [Pending::default(); MAX_PENDING],
            voices: [empty; MAX_VOICES],
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterClick { sound, buffer } => match sound {
                ClickSound::Accent => self.accent = Some(buffer),
                ClickSound::Regular => self.regular = Some(buffer),
            },
            AudioCommand::Click(params) => self.enqueue_click(params),
        }
    }

    fn enqueue_click(&mut self, params: ClickParams) {
        // If the pool is full the click is dropped; at a 100 ms lookahead the
        // pool would only fill at tempos far past the validated ceiling.
        if let Some(slot) = self.pending.iter_mut().find(|p| p.sound.is_none()) {
            *slot = Pending {
                sound: Some(params.sound),
                start_frame: self.clock.frame_at(params.at),
                gain: params.gain,
            };
        }
    }

    /// Render one interleaved block and advance the device clock.
    pub fn render_block(&mut self, data: &mut [f32]) {
        data.fill(0.0);

        let n_frames = (data.len() / self.channels) as u64;
        let block_start = self.clock.frame();
        let block_end = block_start + n_frames;

        // promote every pending click whose start lands in (or before) this
        // block; a late click begins at the block's first frame
        for slot in self.pending.iter_mut() {
            let Some(sound) = slot.sound else { continue };
            if slot.start_frame >= block_end {
                continue;
            }
            let onset = slot.start_frame.saturating_sub(block_start) as usize;
            if let Some(v) = self.voices.iter_mut().find(|v| !v.alive) {
                *v = Voice {
                    sound,
                    pos: 0,
                    onset,
                    gain: slot.gain,
                    alive: true,
                };
            }
            slot.sound = None;
        }

        let channels = self.channels;
        let accent = &self.accent;
        let regular = &self.regular;

        for v in self.voices.iter_mut() {
            if !v.alive {
                continue;
            }
            let Some(buffer) = (match v.sound {
                ClickSound::Accent => accent.as_ref(),
                ClickSound::Regular => regular.as_ref(),
            }) else {
                v.alive = false;
                continue;
            };

            for frame in v.onset..n_frames as usize {
                let Some(&sample) = buffer.data.get(v.pos) else {
                    v.alive = false;
                    break;
                };
                for ch in 0..channels {
                    data[frame * channels + ch] += sample * v.gain;
                }
                v.pos += 1;
            }
            v.onset = 0;
        }

        self.clock.advance(n_frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 100 Hz keeps the frame math readable: 0.01 s per frame.
    fn test_engine() -> Engine {
        let mut engine = Engine::new(AudioClock::new(100), 2);
        engine.handle_cmd(AudioCommand::RegisterClick {
            sound: ClickSound::Accent,
            buffer: ClickBuffer { data: vec![1.0, 1.0, 1.0] },
        });
        engine.handle_cmd(AudioCommand::RegisterClick {
            sound: ClickSound::Regular,
            buffer: ClickBuffer { data: vec![0.5, 0.5] },
        });
        engine
    }

    fn click(sound: ClickSound, at: f64, gain: f32) -> AudioCommand {
        AudioCommand::Click(ClickParams { sound, at, gain })
    }

    #[test]
    fn click_starts_at_exact_sample_offset() {
        let mut engine = test_engine();
        engine.handle_cmd(click(ClickSound::Accent, 0.15, 1.0));

        // first block covers frames 0..10: silent
        let mut block = [9.9f32; 20];
        engine.render_block(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));

        // second block covers frames 10..20: onset at frame 15, i.e. index 10
        let mut block = [0.0f32; 20];
        engine.render_block(&mut block);
        assert!(block[..10].iter().all(|&s| s == 0.0));
        assert_eq!(&block[10..16], &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(block[16..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn click_spans_block_boundary() {
        let mut engine = test_engine();
        engine.handle_cmd(click(ClickSound::Accent, 0.09, 1.0));

        let mut first = [0.0f32; 20];
        engine.render_block(&mut first);
        // frame 9 is the last frame of the block
        assert!(first[..18].iter().all(|&s| s == 0.0));
        assert_eq!(&first[18..], &[1.0, 1.0]);

        let mut second = [0.0f32; 20];
        engine.render_block(&mut second);
        assert_eq!(&second[..4], &[1.0, 1.0, 1.0, 1.0]);
        assert!(second[4..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn late_click_plays_at_block_start() {
        let mut engine = test_engine();
        let mut block = [0.0f32; 20];
        engine.render_block(&mut block); // clock now at frame 10

        // target frame 5 is already in the past
        engine.handle_cmd(click(ClickSound::Regular, 0.05, 1.0));
        let mut block = [0.0f32; 20];
        engine.render_block(&mut block);
        assert_eq!(&block[..4], &[0.5, 0.5, 0.5, 0.5]);
    }

    #[test]
    fn gain_scales_and_overlapping_clicks_mix() {
        let mut engine = test_engine();
        engine.handle_cmd(click(ClickSound::Accent, 0.0, 0.5));
        engine.handle_cmd(click(ClickSound::Regular, 0.0, 1.0));

        let mut block = [0.0f32; 20];
        engine.render_block(&mut block);
        // frame 0: accent 1.0 * 0.5 + regular 0.5 * 1.0
        assert_eq!(block[0], 1.0);
        assert_eq!(block[1], 1.0);
        // frame 2: only the accent is still sounding
        assert_eq!(block[4], 0.5);
    }

    #[test]
    fn click_without_registered_buffer_is_silent() {
        let mut engine = Engine::new(AudioClock::new(100), 2);
        engine.handle_cmd(click(ClickSound::Accent, 0.0, 1.0));

        let mut block = [0.0f32; 20];
        engine.render_block(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }
}
