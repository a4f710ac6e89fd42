mod audio;
mod audio_api;
mod library;
mod metronome;
mod middle;
mod shared;
mod tui;

use std::path::{Path, PathBuf};
use std::time::Instant;

use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use audio_api::{AudioCommand, ClickBuffer, ClickSound};
use library::store;
use middle::Middle;
use shared::InputEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    let audio = audio::start_audio()?;
    let project_dir: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let songs = store::load_library(&project_dir).unwrap_or_default();

    register_click_sounds(&audio, &project_dir);

    let mut middle = Middle::new(project_dir, songs, audio.clock());

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    // the scheduler's coarse poll period; must stay under the lookahead horizon
    let tick_rate = std::time::Duration::from_millis(16);
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let ds = middle.display_state();
        tui_state.form_open = ds.form.is_some();

        term.draw(|frame| tui::view::render(frame, frame.area(), &ds))?;

        let events = tui::input::poll_input(tick_rate, &tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                // save before quitting
                let _ = middle.save();
                drop(term);
                drop(audio);
                return Ok(());
            }
            middle.handle_input(event, Instant::now());
        }

        for cmd in middle.tick() {
            audio.send(cmd);
        }
    }
}

// Prepare the two click buffers on the main thread and hand them to the
// engine: WAV overrides from the project dir when present, synthesized
// clicks otherwise.
fn register_click_sounds(audio: &audio::AudioHandle, project_dir: &Path) {
    let sample_rate = audio.sample_rate();
    let overrides = [
        (ClickSound::Accent, "accent.wav"),
        (ClickSound::Regular, "beat.wav"),
    ];
    for (sound, file) in overrides {
        let path = project_dir.join("sounds").join(file);
        let buffer = if path.exists() {
            ClickBuffer::load_wav(&path, sample_rate).unwrap_or_else(|e| {
                eprintln!("clave: could not load {}: {e:#}", path.display());
                ClickBuffer::synth_default(sound, sample_rate)
            })
        } else {
            ClickBuffer::synth_default(sound, sample_rate)
        };
        audio.send(AudioCommand::RegisterClick { sound, buffer });
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
