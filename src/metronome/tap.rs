use std::collections::VecDeque;
use std::time::Instant;

// Tap tempo runs on wall-clock time: it measures the user's hands, not the
// audio device, so drift tolerance is irrelevant here.
const MIN_GAP_MS: f64 = 250.0;
const MAX_GAP_MS: f64 = 2000.0;
const WINDOW: usize = 4;

/// Estimates bpm from tapped timestamps over a sliding window of gaps.
#[derive(Debug, Default)]
pub struct TapTempo {
    last_tap: Option<Instant>,
    gaps_ms: VecDeque<f64>,
}

impl TapTempo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tap. Returns the new bpm estimate once at least one plausible
    /// gap has been measured.
    ///
    /// A gap under 250 ms is key bounce: the tap is discarded outright and
    /// does not enter the average. A gap over 2 s starts a new tap sequence
    /// instead of extending the old one.
    pub fn tap(&mut self, at: Instant) -> Option<u32> {
        let Some(prev) = self.last_tap else {
            self.last_tap = Some(at);
            return None;
        };

        let gap_ms = at.duration_since(prev).as_secs_f64() * 1000.0;
        if gap_ms < MIN_GAP_MS {
            return None;
        }
        if gap_ms > MAX_GAP_MS {
            self.gaps_ms.clear();
            self.last_tap = Some(at);
            return None;
        }

        self.last_tap = Some(at);
        if self.gaps_ms.len() == WINDOW {
            self.gaps_ms.pop_front();
        }
        self.gaps_ms.push_back(gap_ms);

        let avg = self.gaps_ms.iter().sum::<f64>() / self.gaps_ms.len() as f64;
        Some((60000.0 / avg).round() as u32)
    }

    pub fn reset(&mut self) {
        self.last_tap = None;
        self.gaps_ms.clear();
    }
}
