use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::metronome::{MAX_BPM, Subdivision, TempoSpec};

/// One set-list entry. The at-rest shape matches the JSON people already
/// carry around: `{ title, bpm, timeSig: "4/4", subdivision: "Quarter Notes" }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub bpm: u32,
    #[serde(rename = "timeSig")]
    pub time_sig: String,
    pub subdivision: Subdivision,
}

impl Song {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.title.trim().is_empty() {
            bail!("song title must not be empty");
        }
        if self.bpm == 0 || self.bpm as f64 > MAX_BPM {
            bail!("\"{}\": bpm must be between 1 and {MAX_BPM:.0}", self.title);
        }
        parse_time_sig(&self.time_sig)
            .with_context(|| format!("\"{}\"", self.title))?;
        Ok(())
    }

    /// The live tempo parameters this song loads into the metronome.
    pub fn tempo(&self) -> anyhow::Result<TempoSpec> {
        let (beats, _) = parse_time_sig(&self.time_sig)?;
        TempoSpec::new(self.bpm as f64, beats, self.subdivision)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} BPM - {} - {}",
            self.bpm,
            self.time_sig,
            self.subdivision.label()
        )
    }
}

pub fn parse_time_sig(s: &str) -> anyhow::Result<(u32, u32)> {
    let (num, den) = s
        .split_once('/')
        .with_context(|| format!("time signature \"{s}\" must look like 4/4"))?;
    let numerator: u32 = num
        .trim()
        .parse()
        .with_context(|| format!("bad time signature numerator \"{num}\""))?;
    let denominator: u32 = den
        .trim()
        .parse()
        .with_context(|| format!("bad time signature denominator \"{den}\""))?;
    if numerator == 0 || denominator == 0 {
        bail!("time signature \"{s}\" must use positive numbers");
    }
    Ok((numerator, denominator))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, bpm: u32, time_sig: &str) -> Song {
        Song {
            title: title.into(),
            bpm,
            time_sig: time_sig.into(),
            subdivision: Subdivision::Quarter,
        }
    }

    #[test]
    fn parses_common_time_signatures() {
        assert_eq!(parse_time_sig("4/4").unwrap(), (4, 4));
        assert_eq!(parse_time_sig("3/4").unwrap(), (3, 4));
        assert_eq!(parse_time_sig("6/8").unwrap(), (6, 8));
        assert_eq!(parse_time_sig(" 7 / 8 ").unwrap(), (7, 8));
    }

    #[test]
    fn rejects_malformed_time_signatures() {
        for bad in ["44", "", "4/", "/4", "a/4", "4/b", "0/4", "4/0", "-3/4"] {
            assert!(parse_time_sig(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn validate_catches_user_errors() {
        assert!(song("Take Five", 174, "5/4").validate().is_ok());
        assert!(song("", 120, "4/4").validate().is_err());
        assert!(song("   ", 120, "4/4").validate().is_err());
        assert!(song("No Pulse", 0, "4/4").validate().is_err());
        assert!(song("Too Fast", 999, "4/4").validate().is_err());
        assert!(song("Bad Sig", 120, "common").validate().is_err());
    }

    #[test]
    fn tempo_reflects_the_record() {
        let tempo = song("Waltz", 90, "3/4").tempo().unwrap();
        assert_eq!(tempo.bpm(), 90.0);
        assert_eq!(tempo.beats_per_measure(), 3);
        assert_eq!(tempo.subdivision(), Subdivision::Quarter);
    }

    #[test]
    fn serializes_in_the_legacy_shape() {
        let song = Song {
            title: "Clave".into(),
            bpm: 120,
            time_sig: "4/4".into(),
            subdivision: Subdivision::Eighth,
        };
        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Clave",
                "bpm": 120,
                "timeSig": "4/4",
                "subdivision": "Eighth Notes",
            })
        );
    }
}
