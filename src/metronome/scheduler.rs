use super::tempo::TempoSpec;

/// How far ahead of the device clock beats are committed. Must stay larger
/// than the run loop's poll period or a beat window can be skipped; much
/// larger and tempo changes become audibly delayed.
pub const LOOKAHEAD: f64 = 0.1;

/// Gap between pressing play and the first click, so the first event is
/// already in the future when the opening poll runs.
pub const LEAD_IN: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AccentMode {
    /// Accent only the first pulse of the measure (beat 0, sub-beat 0).
    #[default]
    Downbeat,
    /// Accent every sub-pulse of beat one.
    EveryBeatOne,
}

impl AccentMode {
    pub fn is_accent(self, beat_index: u32, sub_beat_index: u32) -> bool {
        match self {
            AccentMode::Downbeat => beat_index == 0 && sub_beat_index == 0,
            AccentMode::EveryBeatOne => beat_index == 0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            AccentMode::Downbeat => AccentMode::EveryBeatOne,
            AccentMode::EveryBeatOne => AccentMode::Downbeat,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AccentMode::Downbeat => "downbeat",
            AccentMode::EveryBeatOne => "beat one",
        }
    }
}

/// Where the count stands and when the next pulse is due, in audio-clock
/// seconds. `next_event_time` only ever moves by whole beat intervals; it is
/// never rebased to "now", which is what keeps the click free of cumulative
/// drift no matter how unevenly the polls arrive.
#[derive(Clone, Copy, Debug)]
pub struct BeatCursor {
    pub beat_index: u32,
    pub sub_beat_index: u32,
    pub next_event_time: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledEvent {
    pub target_time: f64,
    pub beat_index: u32,
    pub sub_beat_index: u32,
    pub is_accent: bool,
}

/// The lookahead scheduler: a coarse, jittery poll decides *that* a beat is
/// coming; the exact target time it stamps on the event decides *when* the
/// beat sounds. One instance lives for exactly one playback run.
pub struct LookaheadScheduler {
    cursor: BeatCursor,
    horizon: f64,
}

impl LookaheadScheduler {
    pub fn start(now: f64) -> Self {
        Self::with_horizon(now, LOOKAHEAD)
    }

    pub fn with_horizon(now: f64, horizon: f64) -> Self {
        Self {
            cursor: BeatCursor {
                beat_index: 0,
                sub_beat_index: 0,
                next_event_time: now + LEAD_IN,
            },
            horizon,
        }
    }

    pub fn cursor(&self) -> BeatCursor {
        self.cursor
    }

    /// One poll tick: emit every beat whose target time falls within the
    /// horizon ahead of `now`. The interval is read from `tempo` on every
    /// iteration, so a tempo change takes effect at the first beat not yet
    /// emitted, never retroactively.
    pub fn poll(
        &mut self,
        now: f64,
        tempo: &TempoSpec,
        accent: AccentMode,
        mut emit: impl FnMut(ScheduledEvent),
    ) {
        while self.cursor.next_event_time < now + self.horizon {
            emit(ScheduledEvent {
                target_time: self.cursor.next_event_time,
                beat_index: self.cursor.beat_index,
                sub_beat_index: self.cursor.sub_beat_index,
                is_accent: accent.is_accent(self.cursor.beat_index, self.cursor.sub_beat_index),
            });
            self.advance(tempo);
        }
    }

    // Advance by exactly one pulse. The >= checks keep the wrap sane when
    // beats-per-measure or the subdivision shrinks under a live cursor.
    fn advance(&mut self, tempo: &TempoSpec) {
        self.cursor.sub_beat_index += 1;
        if self.cursor.sub_beat_index >= tempo.subdivision().pulses_per_beat() {
            self.cursor.sub_beat_index = 0;
            self.cursor.beat_index += 1;
            if self.cursor.beat_index >= tempo.beats_per_measure() {
                self.cursor.beat_index = 0;
            }
        }
        self.cursor.next_event_time += tempo.beat_interval();
    }
}
