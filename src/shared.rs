// The input plan:
//
// Set list:
//   Up / k          //  SelectPrev
//   Down / j        //  SelectNext
//   Enter           //  LoadSelected
//   a               //  OpenForm (add a song)
//   i / x           //  Import / Export songs.json
//
// Transport and tempo:
//   Space           //  PlayPress (toggle)
//   t               //  Tap (tap tempo)
//   - / =           //  NudgeBpm(-1 / +1)
//   [ / ]           //  NudgeBpm(-5 / +5)
//   , / .           //  NudgeBeats(-1 / +1)
//   s               //  CycleSubdivision
//   m               //  ToggleAccentMode (downbeat only vs all of beat one)
//   v / V           //  NudgeVolume(-5 / +5)
//
// Add-song form (while open it captures the keyboard):
//   Tab             //  FormNextField
//   Up / Down       //  FormCycleSubdivision (on the subdivision field)
//   Backspace       //  FormBackspace
//   Enter / Esc     //  SubmitForm / CancelForm
//
// Quit:
//   Esc             //  Quit
//
// The rendering idea, same split as always: the middle layer owns every bit
// of state, and the TUI just draws the DisplayState object each frame and
// resolves raw keys into the semantic events below.

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    // transport
    PlayPress,
    Tap,

    // set list
    SelectPrev,
    SelectNext,
    LoadSelected,

    // live tempo fields
    NudgeBpm(i32),
    NudgeBeats(i32),
    CycleSubdivision,
    ToggleAccentMode,

    // output level
    NudgeVolume(i32),

    // library
    OpenForm,
    CancelForm,
    FormInput(char),
    FormBackspace,
    FormNextField,
    FormCycleSubdivision,
    SubmitForm,
    Import,
    Export,

    // quit button (esc)
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Title,
    Bpm,
    TimeSig,
    Subdivision,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Bpm,
            FormField::Bpm => FormField::TimeSig,
            FormField::TimeSig => FormField::Subdivision,
            FormField::Subdivision => FormField::Title,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Bpm => "BPM",
            FormField::TimeSig => "Time Sig",
            FormField::Subdivision => "Subdivision",
        }
    }
}

/// What the add-song form looks like right now.
#[derive(Clone, Debug)]
pub struct FormView {
    pub title: String,
    pub bpm: String,
    pub time_sig: String,
    pub subdivision_label: &'static str,
    pub field: FormField,
}

#[derive(Clone, Debug)]
pub struct SongRow {
    pub title: String,
    pub summary: String,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub songs: Vec<SongRow>,
    pub selected: usize,          // set-list cursor
    pub loaded: Option<usize>,    // song currently in the tempo model
    pub playing: bool,
    pub bpm: Option<f64>,         // None until a song is loaded
    pub beats_per_measure: u32,
    pub pulses_per_beat: u32,
    pub subdivision_label: &'static str,
    pub accent_label: &'static str,
    pub active_pulse: Option<u32>,
    pub volume: u8,               // 0-100
    pub status: String,
    pub form: Option<FormView>,
}
