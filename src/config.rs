//! User defaults — loads optional ~/.chordflow/config.yaml.
//!
//! Everything here is a default the CLI flags override. A missing or
//! malformed file just means built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tuning::Tuning;

/// Defaults loaded from ~/.chordflow/config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tonic of the default key ("C", "F#", "Bb").
    pub key: String,
    /// Use the natural-minor mode of the key.
    pub minor: bool,
    /// Default tempo in BPM.
    pub tempo: u32,
    pub tuning: Tuning,
    /// Base octave for resolved chords.
    pub octave: i32,
    pub loop_mode: bool,
    pub metronome: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key: "C".to_string(),
            minor: false,
            tempo: 120,
            tuning: Tuning::Equal,
            octave: 4,
            loop_mode: false,
            metronome: false,
        }
    }
}

/// The config file path, if a home directory exists.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chordflow").join("config.yaml"))
}

/// Load the user config, falling back to defaults when the file is missing
/// or does not parse.
pub fn load() -> Config {
    config_path()
        .and_then(|p| load_from(&p))
        .unwrap_or_default()
}

fn load_from(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_yaml::from_str(&content).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.key, "C");
        assert_eq!(c.tempo, 120);
        assert_eq!(c.tuning, Tuning::Equal);
        assert!(!c.loop_mode);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = "key: F#\nminor: true\ntempo: 90\ntuning: just\noctave: 3\nloop_mode: true\nmetronome: true\n";
        let c: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(c.key, "F#");
        assert!(c.minor);
        assert_eq!(c.tempo, 90);
        assert_eq!(c.tuning, Tuning::Just);
        assert_eq!(c.octave, 3);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c: Config = serde_yaml::from_str("tempo: 72\n").unwrap();
        assert_eq!(c.tempo, 72);
        assert_eq!(c.key, "C");
        assert_eq!(c.tuning, Tuning::Equal);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "key: G\ntempo: 100").unwrap();
        let c = load_from(file.path()).unwrap();
        assert_eq!(c.key, "G");
        assert_eq!(c.tempo, 100);
    }

    #[test]
    fn missing_file_is_none() {
        assert!(load_from(Path::new("/nonexistent/config.yaml")).is_none());
    }

    #[test]
    fn garbage_file_is_none() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ": not yaml : [").unwrap();
        assert!(load_from(file.path()).is_none());
    }
}
