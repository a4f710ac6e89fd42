// Called on startup and quit (and after set-list edits) so the set list
// survives between sessions, plus import/export against a plain songs.json
// in the project directory for sharing between machines.
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::song::Song;

const CLAVE_DIR: &str = ".clave";
const LIBRARY_FILE: &str = "songs.json";
const EXCHANGE_FILE: &str = "songs.json";

// <project_dir>/.clave/songs.json
fn library_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CLAVE_DIR).join(LIBRARY_FILE)
}

/// Where import reads from and export writes to: <project_dir>/songs.json.
pub fn exchange_path(project_dir: &Path) -> PathBuf {
    project_dir.join(EXCHANGE_FILE)
}

pub fn load_library(project_dir: &Path) -> Option<Vec<Song>> {
    let path = library_path(project_dir);
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}

// Save the set list to disk, making the directory if it doesn't exist yet
pub fn save_library(project_dir: &Path, songs: &[Song]) -> anyhow::Result<()> {
    let path = library_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(songs)?;
    std::fs::write(&path, json)?;
    Ok(())
}

pub fn export_songs(path: &Path, songs: &[Song]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(songs)?;
    std::fs::write(path, json)
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(())
}

/// Read and fully validate a song list. Any malformed record rejects the
/// whole file; the caller keeps its current set list on error.
pub fn import_songs(path: &Path) -> anyhow::Result<Vec<Song>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let songs: Vec<Song> =
        serde_json::from_str(&data).context("invalid file format")?;
    for song in &songs {
        song.validate().context("invalid file format")?;
    }
    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metronome::Subdivision;

    fn sample_songs() -> Vec<Song> {
        vec![
            Song {
                title: "So What".into(),
                bpm: 136,
                time_sig: "4/4".into(),
                subdivision: Subdivision::Quarter,
            },
            Song {
                title: "Blue Rondo".into(),
                bpm: 220,
                time_sig: "9/8".into(),
                subdivision: Subdivision::Eighth,
            },
        ]
    }

    #[test]
    fn library_round_trips_through_the_dot_dir() {
        let dir = tempfile::tempdir().unwrap();
        let songs = sample_songs();

        save_library(dir.path(), &songs).unwrap();
        assert!(dir.path().join(".clave/songs.json").exists());

        let loaded = load_library(dir.path()).unwrap();
        assert_eq!(loaded, songs);
    }

    #[test]
    fn missing_or_corrupt_library_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_library(dir.path()).is_none());

        std::fs::create_dir_all(dir.path().join(".clave")).unwrap();
        std::fs::write(dir.path().join(".clave/songs.json"), "not json").unwrap();
        assert!(load_library(dir.path()).is_none());
    }

    #[test]
    fn export_then_import_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = exchange_path(dir.path());
        let songs = sample_songs();

        export_songs(&path, &songs).unwrap();
        assert_eq!(import_songs(&path).unwrap(), songs);
    }

    #[test]
    fn import_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");

        std::fs::write(&path, "{ not a song list").unwrap();
        assert!(import_songs(&path).is_err());

        std::fs::write(&path, r#"[{"title": "No Tempo"}]"#).unwrap();
        assert!(import_songs(&path).is_err());
    }

    #[test]
    fn import_rejects_invalid_records_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songs.json");

        // well-formed JSON, but the second record fails validation
        let json = r#"[
            {"title": "Fine", "bpm": 120, "timeSig": "4/4", "subdivision": "Quarter Notes"},
            {"title": "", "bpm": 120, "timeSig": "4/4", "subdivision": "Quarter Notes"}
        ]"#;
        std::fs::write(&path, json).unwrap();
        assert!(import_songs(&path).is_err());
    }

    #[test]
    fn import_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(import_songs(&dir.path().join("songs.json")).is_err());
    }
}
