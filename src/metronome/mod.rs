mod controller;
mod scheduler;
mod tap;
mod tempo;

pub use controller::{PlaybackController, Transport};
pub use scheduler::{AccentMode, BeatCursor, LookaheadScheduler, ScheduledEvent};
pub use tap::TapTempo;
pub use tempo::{MAX_BPM, Subdivision, TempoSpec};
