use std::collections::VecDeque;

use anyhow::bail;

use crate::audio_api::{AudioCommand, ClickParams, ClickSound};

use super::scheduler::{AccentMode, LookaheadScheduler};
use super::tempo::TempoSpec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    Stopped,
    Playing,
}

/// Owns the scheduler lifecycle and the phase state of the count. At most one
/// scheduler (and so one cursor) is alive at a time; starting is only legal
/// from `Stopped`, so two cursors can never drive the audio output at once.
pub struct PlaybackController {
    scheduler: Option<LookaheadScheduler>,
    accent_mode: AccentMode,
    // visual updates ride behind the audio: each entry is released on the
    // poll tick after its target time passes, best-effort by design
    pending_visual: VecDeque<(f64, u32)>,
    active_pulse: Option<u32>,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            scheduler: None,
            accent_mode: AccentMode::default(),
            pending_visual: VecDeque::new(),
            active_pulse: None,
        }
    }

    pub fn transport(&self) -> Transport {
        if self.scheduler.is_some() {
            Transport::Playing
        } else {
            Transport::Stopped
        }
    }

    pub fn is_playing(&self) -> bool {
        self.transport() == Transport::Playing
    }

    /// Begin playback with the count at beat zero. `now` is the current
    /// audio-clock time. Starting while already playing is an error the
    /// caller surfaces; the running count is left untouched.
    pub fn start(&mut self, now: f64) -> anyhow::Result<()> {
        if self.scheduler.is_some() {
            bail!("already playing");
        }
        self.scheduler = Some(LookaheadScheduler::start(now));
        self.active_pulse = None;
        Ok(())
    }

    /// Cancel polling and discard the cursor. Clicks already handed to the
    /// audio thread with a future target time still sound; at most one
    /// lookahead horizon of audio outlives the stop.
    pub fn stop(&mut self) {
        self.scheduler = None;
        self.pending_visual.clear();
        self.active_pulse = None;
    }

    /// One coarse poll tick: dispatch every beat now inside the horizon as a
    /// sample-accurate click command, then release the visual updates whose
    /// target time has passed.
    pub fn tick(&mut self, now: f64, tempo: &TempoSpec, gain: f32, out: &mut Vec<AudioCommand>) {
        let Some(scheduler) = self.scheduler.as_mut() else {
            return;
        };

        let pulses_per_beat = tempo.subdivision().pulses_per_beat();
        let pending = &mut self.pending_visual;
        scheduler.poll(now, tempo, self.accent_mode, |ev| {
            let sound = if ev.is_accent {
                ClickSound::Accent
            } else {
                ClickSound::Regular
            };
            out.push(AudioCommand::Click(ClickParams {
                sound,
                at: ev.target_time,
                gain,
            }));
            let pulse = ev.beat_index * pulses_per_beat + ev.sub_beat_index;
            pending.push_back((ev.target_time, pulse));
        });

        while self.pending_visual.front().is_some_and(|&(t, _)| t <= now) {
            let (_, pulse) = self.pending_visual.pop_front().unwrap();
            self.active_pulse = Some(pulse);
        }
    }

    /// Pulse currently highlighted in the beat row, if playback has reached
    /// the first click yet.
    pub fn active_pulse(&self) -> Option<u32> {
        self.active_pulse
    }

    pub fn accent_mode(&self) -> AccentMode {
        self.accent_mode
    }

    pub fn set_accent_mode(&mut self, mode: AccentMode) {
        self.accent_mode = mode;
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metronome::scheduler::LEAD_IN;
    use crate::metronome::tempo::Subdivision;

    fn tempo_120_4_4() -> TempoSpec {
        TempoSpec::new(120.0, 4, Subdivision::Quarter).unwrap()
    }

    fn clicks(out: &[AudioCommand]) -> Vec<&ClickParams> {
        out.iter()
            .map(|cmd| match cmd {
                AudioCommand::Click(p) => p,
                other => panic!("unexpected command {other:?}"),
            })
            .collect()
    }

    #[test]
    fn dispatches_accent_and_regular_clicks_at_target_times() {
        let tempo = tempo_120_4_4();
        let mut ctl = PlaybackController::new();
        ctl.start(0.0).unwrap();

        let mut out = Vec::new();
        for tick in 0..100 {
            ctl.tick(tick as f64 * 0.025, &tempo, 0.8, &mut out);
        }

        let clicks = clicks(&out);
        assert!(clicks.len() >= 5);
        for (i, click) in clicks.iter().enumerate() {
            let expected = if i % 4 == 0 {
                ClickSound::Accent
            } else {
                ClickSound::Regular
            };
            assert_eq!(click.sound, expected, "click {i}");
            assert!((click.at - (LEAD_IN + i as f64 * 0.5)).abs() < 1e-12);
            assert_eq!(click.gain, 0.8);
        }
    }

    #[test]
    fn start_while_playing_is_rejected_and_keeps_the_count() {
        let tempo = tempo_120_4_4();
        let mut ctl = PlaybackController::new();
        ctl.start(0.0).unwrap();

        let mut out = Vec::new();
        ctl.tick(1.0, &tempo, 1.0, &mut out);
        let emitted = out.len();

        assert!(ctl.start(1.0).is_err());
        assert!(ctl.is_playing());

        // the running scheduler was not replaced: no beat repeats
        ctl.tick(1.0, &tempo, 1.0, &mut out);
        assert_eq!(out.len(), emitted);
    }

    #[test]
    fn stop_then_start_resets_the_phase_to_beat_zero() {
        let tempo = tempo_120_4_4();
        let mut ctl = PlaybackController::new();
        ctl.start(0.0).unwrap();

        let mut out = Vec::new();
        ctl.tick(1.3, &tempo, 1.0, &mut out);
        assert!(out.len() > 1);

        ctl.stop();
        assert_eq!(ctl.transport(), Transport::Stopped);
        assert_eq!(ctl.active_pulse(), None);

        // stop is idempotent and emits nothing further
        let mut silent = Vec::new();
        ctl.tick(2.0, &tempo, 1.0, &mut silent);
        assert!(silent.is_empty());
        ctl.stop();

        ctl.start(5.0).unwrap();
        let mut restarted = Vec::new();
        ctl.tick(5.0, &tempo, 1.0, &mut restarted);
        let first = clicks(&restarted)[0];
        assert_eq!(first.sound, ClickSound::Accent);
        assert!((first.at - (5.0 + LEAD_IN)).abs() < 1e-12);
    }

    #[test]
    fn visual_updates_trail_the_audio_clock() {
        let tempo = tempo_120_4_4();
        let mut ctl = PlaybackController::new();
        ctl.start(0.0).unwrap();

        let mut out = Vec::new();
        ctl.tick(0.0, &tempo, 1.0, &mut out);
        // the first click is scheduled but has not sounded yet
        assert_eq!(ctl.active_pulse(), None);

        ctl.tick(LEAD_IN + 0.01, &tempo, 1.0, &mut out);
        assert_eq!(ctl.active_pulse(), Some(0));

        ctl.tick(LEAD_IN + 0.51, &tempo, 1.0, &mut out);
        assert_eq!(ctl.active_pulse(), Some(1));

        // a poll that leaps past several targets lands on the latest one
        ctl.tick(LEAD_IN + 1.6, &tempo, 1.0, &mut out);
        assert_eq!(ctl.active_pulse(), Some(3));
    }

    #[test]
    fn subdivided_pulses_map_onto_the_beat_row() {
        let tempo = TempoSpec::new(120.0, 3, Subdivision::Eighth).unwrap();
        let mut ctl = PlaybackController::new();
        ctl.start(0.0).unwrap();

        let mut out = Vec::new();
        ctl.tick(10.0, &tempo, 1.0, &mut out);

        // the highlighted pulse is the newest dispatched click whose target
        // time has already passed
        let sounded = clicks(&out)
            .iter()
            .rposition(|c| c.at <= 10.0)
            .unwrap() as u32;
        assert_eq!(
            ctl.active_pulse(),
            Some(sounded % tempo.pulses_per_measure())
        );
    }
}
