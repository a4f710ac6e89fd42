use std::path::PathBuf;
use std::time::Instant;

use crate::audio::AudioClock;
use crate::audio_api::AudioCommand;
use crate::library::store;
use crate::library::{Song, parse_time_sig};
use crate::metronome::{PlaybackController, Subdivision, TapTempo, TempoSpec};
use crate::shared::{DisplayState, FormField, FormView, InputEvent, SongRow};

const DEFAULT_VOLUME: u8 = 80;

// Draft state of the add-song form; raw strings until submit, like any form.
#[derive(Clone, Debug)]
struct SongForm {
    title: String,
    bpm: String,
    time_sig: String,
    subdivision: Subdivision,
    field: FormField,
}

impl Default for SongForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            bpm: "120".into(),
            time_sig: "4/4".into(),
            subdivision: Subdivision::Quarter,
            field: FormField::Title,
        }
    }
}

/// The middle layer: owns the set list, the tempo model, and the playback
/// controller, turns semantic input events into state changes, and feeds the
/// scheduler's click commands to the audio thread once per run-loop tick.
pub struct Middle {
    project_dir: PathBuf,
    songs: Vec<Song>,
    selected: usize,
    loaded: Option<usize>,
    tempo: Option<TempoSpec>,
    tap: TapTempo,
    controller: PlaybackController,
    clock: AudioClock,
    volume: u8,
    status: String,
    form: Option<SongForm>,
}

impl Middle {
    pub fn new(project_dir: PathBuf, songs: Vec<Song>, clock: AudioClock) -> Self {
        Self {
            project_dir,
            songs,
            selected: 0,
            loaded: None,
            tempo: None,
            tap: TapTempo::new(),
            controller: PlaybackController::new(),
            clock,
            volume: DEFAULT_VOLUME,
            status: String::from("Select a song and press Space"),
            form: None,
        }
    }

    pub fn handle_input(&mut self, event: InputEvent, at: Instant) {
        match event {
            InputEvent::PlayPress => self.toggle_play(),
            InputEvent::Tap => self.on_tap(at),

            InputEvent::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
            }
            InputEvent::SelectNext => {
                if !self.songs.is_empty() {
                    self.selected = (self.selected + 1).min(self.songs.len() - 1);
                }
            }
            InputEvent::LoadSelected => self.load_selected(),

            InputEvent::NudgeBpm(delta) => self.with_tempo(|tempo| {
                let next = tempo.bpm() + delta as f64;
                tempo.set_bpm(next)
            }),
            InputEvent::NudgeBeats(delta) => self.with_tempo(|tempo| {
                let next = (tempo.beats_per_measure() as i64 + delta as i64).max(0) as u32;
                tempo.set_beats_per_measure(next)
            }),
            InputEvent::CycleSubdivision => self.with_tempo(|tempo| {
                tempo.set_subdivision(tempo.subdivision().next());
                Ok(())
            }),
            InputEvent::ToggleAccentMode => {
                let mode = self.controller.accent_mode().toggled();
                self.controller.set_accent_mode(mode);
                self.status = format!("Accent: {}", mode.label());
            }

            InputEvent::NudgeVolume(delta) => {
                self.volume = (self.volume as i32 + delta).clamp(0, 100) as u8;
                self.status = format!("Volume {}%", self.volume);
            }

            InputEvent::OpenForm => {
                self.form = Some(SongForm::default());
                self.status.clear();
            }
            InputEvent::CancelForm => {
                self.form = None;
                self.status.clear();
            }
            InputEvent::FormInput(c) => {
                if let Some(form) = self.form.as_mut() {
                    match form.field {
                        FormField::Title => form.title.push(c),
                        FormField::Bpm => form.bpm.push(c),
                        FormField::TimeSig => form.time_sig.push(c),
                        FormField::Subdivision => {}
                    }
                }
            }
            InputEvent::FormBackspace => {
                if let Some(form) = self.form.as_mut() {
                    match form.field {
                        FormField::Title => form.title.pop(),
                        FormField::Bpm => form.bpm.pop(),
                        FormField::TimeSig => form.time_sig.pop(),
                        FormField::Subdivision => None,
                    };
                }
            }
            InputEvent::FormNextField => {
                if let Some(form) = self.form.as_mut() {
                    form.field = form.field.next();
                }
            }
            InputEvent::FormCycleSubdivision => {
                if let Some(form) = self.form.as_mut()
                    && form.field == FormField::Subdivision
                {
                    form.subdivision = form.subdivision.next();
                }
            }
            InputEvent::SubmitForm => self.submit_form(),

            InputEvent::Import => self.import(),
            InputEvent::Export => self.export(),

            InputEvent::Quit => {}
        }
    }

    /// One run-loop tick: drives the scheduler poll against the device clock
    /// and returns the click commands due inside the lookahead horizon.
    pub fn tick(&mut self) -> Vec<AudioCommand> {
        let mut out = Vec::new();
        if let Some(tempo) = &self.tempo {
            let gain = self.volume as f32 / 100.0;
            self.controller.tick(self.clock.now(), tempo, gain, &mut out);
        }
        out
    }

    pub fn display_state(&self) -> DisplayState {
        let songs = self
            .songs
            .iter()
            .map(|s| SongRow {
                title: s.title.clone(),
                summary: s.summary(),
            })
            .collect();

        DisplayState {
            songs,
            selected: self.selected,
            loaded: self.loaded,
            playing: self.controller.is_playing(),
            bpm: self.tempo.as_ref().map(|t| t.bpm()),
            beats_per_measure: self.tempo.as_ref().map_or(4, |t| t.beats_per_measure()),
            pulses_per_beat: self
                .tempo
                .as_ref()
                .map_or(1, |t| t.subdivision().pulses_per_beat()),
            subdivision_label: self
                .tempo
                .as_ref()
                .map_or("-", |t| t.subdivision().label()),
            accent_label: self.controller.accent_mode().label(),
            active_pulse: self.controller.active_pulse(),
            volume: self.volume,
            status: self.status.clone(),
            form: self.form.as_ref().map(|f| FormView {
                title: f.title.clone(),
                bpm: f.bpm.clone(),
                time_sig: f.time_sig.clone(),
                subdivision_label: f.subdivision.label(),
                field: f.field,
            }),
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        store::save_library(&self.project_dir, &self.songs)
    }

    fn toggle_play(&mut self) {
        if self.controller.is_playing() {
            self.controller.stop();
            self.status = "Stopped".into();
            return;
        }
        if self.tempo.is_none() {
            self.status = "Select a song first!".into();
            return;
        }
        match self.controller.start(self.clock.now()) {
            Ok(()) => self.status = "Playing".into(),
            Err(e) => self.status = format!("{e:#}"),
        }
    }

    fn on_tap(&mut self, at: Instant) {
        if self.tempo.is_none() {
            self.status = "Select a song first!".into();
            return;
        }
        // tap adjusts the tempo model only; the running scheduler picks the
        // new interval up at the next un-emitted beat
        if let Some(bpm) = self.tap.tap(at) {
            self.with_tempo(|tempo| tempo.set_bpm(bpm as f64));
            self.status = format!("Tap: {bpm} BPM");
        } else {
            self.status = "Tap...".into();
        }
    }

    fn load_selected(&mut self) {
        let Some(song) = self.songs.get(self.selected) else {
            self.status = "No songs yet - press 'a' to add one".into();
            return;
        };
        match song.tempo() {
            Ok(tempo) => {
                // one live cursor at a time: loading stops the old run
                self.controller.stop();
                self.tempo = Some(tempo);
                self.loaded = Some(self.selected);
                self.tap.reset();
                self.status = format!("Loaded {}", song.title);
            }
            Err(e) => self.status = format!("{e:#}"),
        }
    }

    // Apply a tempo-field change, surfacing validation errors in the status
    // line without touching the model.
    fn with_tempo(&mut self, f: impl FnOnce(&mut TempoSpec) -> anyhow::Result<()>) {
        let Some(tempo) = self.tempo.as_mut() else {
            self.status = "Select a song first!".into();
            return;
        };
        match f(tempo) {
            Ok(()) => {
                self.status = format!(
                    "{:.0} BPM - {} beats - {}",
                    tempo.bpm(),
                    tempo.beats_per_measure(),
                    tempo.subdivision().label()
                );
            }
            Err(e) => self.status = format!("{e:#}"),
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else { return };

        if form.title.trim().is_empty() {
            self.status = "Please enter a song title.".into();
            return;
        }
        let Ok(bpm) = form.bpm.trim().parse::<u32>() else {
            self.status = "BPM must be a whole number".into();
            return;
        };
        if let Err(e) = parse_time_sig(form.time_sig.trim()) {
            self.status = format!("{e:#}");
            return;
        }

        let song = Song {
            title: form.title.trim().to_string(),
            bpm,
            time_sig: form.time_sig.trim().to_string(),
            subdivision: form.subdivision,
        };
        if let Err(e) = song.validate() {
            self.status = format!("{e:#}");
            return;
        }

        self.status = format!("Added {}", song.title);
        self.songs.push(song);
        self.selected = self.songs.len() - 1;
        self.form = None;
        if let Err(e) = self.save() {
            self.status = format!("could not save set list: {e:#}");
        }
    }

    fn import(&mut self) {
        let path = store::exchange_path(&self.project_dir);
        match store::import_songs(&path) {
            Ok(songs) => {
                // the old set list (and anything loaded from it) is replaced
                self.controller.stop();
                self.tempo = None;
                self.loaded = None;
                self.selected = 0;
                self.status = format!("Imported {} songs", songs.len());
                self.songs = songs;
                if let Err(e) = self.save() {
                    self.status = format!("could not save set list: {e:#}");
                }
            }
            Err(e) => self.status = format!("Import failed: {e:#}"),
        }
    }

    fn export(&mut self) {
        let path = store::exchange_path(&self.project_dir);
        match store::export_songs(&path, &self.songs) {
            Ok(()) => {
                self.status = format!("Exported {} songs to {}", self.songs.len(), path.display())
            }
            Err(e) => self.status = format!("Export failed: {e:#}"),
        }
    }
}
