pub use crate::audio::{ClickBuffer, ClickSound};

#[derive(Clone, Debug)]
pub struct ClickParams {
    pub sound: ClickSound,
    /// Target start time in audio-clock seconds. The engine honors this to
    /// the sample, independent of when the command itself arrives.
    pub at: f64,
    pub gain: f32,
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (interrupts the audio thread), so click
    // buffers are prepared on the main thread and handed over here.
    RegisterClick { sound: ClickSound, buffer: ClickBuffer },

    // Sample-accurate click request: starts at `at` on the device timeline.
    Click(ClickParams),
}
