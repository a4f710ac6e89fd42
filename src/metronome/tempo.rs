use anyhow::bail;
use serde::{Deserialize, Serialize};

pub const MAX_BPM: f64 = 300.0;

// Serialized with the labels the song files already use, so an exported set
// list stays readable and round-trips with the old format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subdivision {
    #[serde(rename = "Quarter Notes")]
    Quarter,
    #[serde(rename = "Eighth Notes")]
    Eighth,
    #[serde(rename = "Sixteenth Notes")]
    Sixteenth,
}

impl Subdivision {
    pub fn pulses_per_beat(self) -> u32 {
        match self {
            Subdivision::Quarter => 1,
            Subdivision::Eighth => 2,
            Subdivision::Sixteenth => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subdivision::Quarter => "Quarter Notes",
            Subdivision::Eighth => "Eighth Notes",
            Subdivision::Sixteenth => "Sixteenth Notes",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Subdivision::Quarter => Subdivision::Eighth,
            Subdivision::Eighth => Subdivision::Sixteenth,
            Subdivision::Sixteenth => Subdivision::Quarter,
        }
    }
}

/// The current musical parameters. Fields are private so every mutation goes
/// through validation; the scheduler can assume positive, finite values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempoSpec {
    bpm: f64,
    beats_per_measure: u32,
    subdivision: Subdivision,
}

impl TempoSpec {
    pub fn new(bpm: f64, beats_per_measure: u32, subdivision: Subdivision) -> anyhow::Result<Self> {
        let mut spec = Self {
            bpm: 120.0,
            beats_per_measure: 4,
            subdivision,
        };
        spec.set_bpm(bpm)?;
        spec.set_beats_per_measure(beats_per_measure)?;
        Ok(spec)
    }

    pub fn set_bpm(&mut self, bpm: f64) -> anyhow::Result<()> {
        if !bpm.is_finite() || bpm <= 0.0 || bpm > MAX_BPM {
            bail!("bpm must be between 1 and {MAX_BPM:.0}");
        }
        self.bpm = bpm;
        Ok(())
    }

    pub fn set_beats_per_measure(&mut self, beats: u32) -> anyhow::Result<()> {
        if beats < 1 {
            bail!("a measure needs at least one beat");
        }
        self.beats_per_measure = beats;
        Ok(())
    }

    pub fn set_subdivision(&mut self, subdivision: Subdivision) {
        self.subdivision = subdivision;
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure
    }

    pub fn subdivision(&self) -> Subdivision {
        self.subdivision
    }

    /// Seconds between consecutive subdivided pulses. Always recomputed from
    /// the current fields, never cached across a tempo change.
    pub fn beat_interval(&self) -> f64 {
        60.0 / (self.bpm * self.subdivision.pulses_per_beat() as f64)
    }

    pub fn pulses_per_measure(&self) -> u32 {
        self.beats_per_measure * self.subdivision.pulses_per_beat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beat_interval_follows_bpm_and_subdivision() {
        let spec = TempoSpec::new(120.0, 4, Subdivision::Quarter).unwrap();
        assert_eq!(spec.beat_interval(), 0.5);

        let spec = TempoSpec::new(120.0, 4, Subdivision::Eighth).unwrap();
        assert_eq!(spec.beat_interval(), 0.25);

        let spec = TempoSpec::new(90.0, 3, Subdivision::Eighth).unwrap();
        assert!((spec.beat_interval() - 60.0 / 180.0).abs() < 1e-12);
        assert_eq!(spec.pulses_per_measure(), 6);
    }

    #[test]
    fn beat_interval_is_never_stale() {
        let mut spec = TempoSpec::new(120.0, 4, Subdivision::Quarter).unwrap();
        assert_eq!(spec.beat_interval(), 0.5);
        spec.set_bpm(60.0).unwrap();
        assert_eq!(spec.beat_interval(), 1.0);
        spec.set_subdivision(Subdivision::Sixteenth);
        assert_eq!(spec.beat_interval(), 0.25);
    }

    #[test]
    fn rejects_out_of_range_bpm() {
        let mut spec = TempoSpec::new(120.0, 4, Subdivision::Quarter).unwrap();
        assert!(spec.set_bpm(0.0).is_err());
        assert!(spec.set_bpm(-10.0).is_err());
        assert!(spec.set_bpm(301.0).is_err());
        assert!(spec.set_bpm(f64::NAN).is_err());
        assert!(spec.set_bpm(f64::INFINITY).is_err());
        // state untouched by the failed updates
        assert_eq!(spec.bpm(), 120.0);

        assert!(TempoSpec::new(0.0, 4, Subdivision::Quarter).is_err());
    }

    #[test]
    fn rejects_empty_measure() {
        let mut spec = TempoSpec::new(120.0, 4, Subdivision::Quarter).unwrap();
        assert!(spec.set_beats_per_measure(0).is_err());
        assert_eq!(spec.beats_per_measure(), 4);
    }

    #[test]
    fn subdivision_labels_round_trip_through_serde() {
        for sub in [Subdivision::Quarter, Subdivision::Eighth, Subdivision::Sixteenth] {
            let json = serde_json::to_string(&sub).unwrap();
            assert_eq!(json, format!("\"{}\"", sub.label()));
            let back: Subdivision = serde_json::from_str(&json).unwrap();
            assert_eq!(back, sub);
        }
        assert!(serde_json::from_str::<Subdivision>("\"Triplets\"").is_err());
    }
}
