//! Pitch-class names, chromatic indices, and octave-carrying notes.
//!
//! Internally everything is sharp-spelled: flats (ASCII `b` or `♭`) fold to
//! the enharmonic sharp index at parse time. Display names for user-entered
//! chords are preserved elsewhere; this module only deals in canonical pitch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical sharp-oriented spelling per chromatic index.
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Octave used when a note is written without one (e.g. `C-E-G`).
pub const DEFAULT_OCTAVE: i32 = 4;

const A4_PITCH_CLASS: i32 = 9;
const A4_OCTAVE: i32 = 4;

/// Parse a pitch-class name into its chromatic index (0 = C .. 11 = B).
///
/// Case-insensitive; accepts ASCII `#`/`b` and Unicode `♯`/`♭` accidentals.
/// Flats fold to the enharmonic sharp index (Db → 1, Bb → 10).
pub fn pitch_class_index(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let letter = chars.next()?;
    let base: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let accidental: i32 = match chars.next() {
        None => 0,
        Some('#') | Some('♯') => 1,
        Some('b') | Some('♭') => -1,
        Some(_) => return None,
    };

    if chars.next().is_some() {
        return None;
    }

    Some(((base + accidental).rem_euclid(12)) as u8)
}

/// Canonical name for a chromatic index. Index is taken mod 12.
pub fn canonical_name(index: u8) -> &'static str {
    PITCH_CLASS_NAMES[(index % 12) as usize]
}

/// A concrete pitch: chromatic pitch class plus octave (C4 = middle C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub pitch_class: u8,
    pub octave: i32,
}

impl Note {
    pub fn new(pitch_class: u8, octave: i32) -> Self {
        Self {
            pitch_class: pitch_class % 12,
            octave,
        }
    }

    /// Build a note from a root pitch class, a signed semitone interval,
    /// and a base octave. Intervals of 12 or more carry into higher
    /// octaves; negative intervals reach below the base octave.
    pub fn from_interval(root: u8, interval: i32, base_octave: i32) -> Self {
        let chromatic = root as i32 + interval;
        Self {
            pitch_class: chromatic.rem_euclid(12) as u8,
            octave: base_octave + chromatic.div_euclid(12),
        }
    }

    /// Signed semitone distance from A4 (440 Hz reference).
    pub fn semitones_from_a4(self) -> i32 {
        (self.octave - A4_OCTAVE) * 12 + (self.pitch_class as i32 - A4_PITCH_CLASS)
    }

    /// The note shifted by a signed number of semitones, octave included.
    pub fn transposed(self, semitones: i32) -> Self {
        let chromatic = self.octave * 12 + self.pitch_class as i32 + semitones;
        Self {
            pitch_class: chromatic.rem_euclid(12) as u8,
            octave: chromatic.div_euclid(12),
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", canonical_name(self.pitch_class), self.octave)
    }
}

/// Parse `<pitch-class>[octave]` into a [`Note`]. Octave defaults to 4.
///
/// Accepts the same accidentals and casing as [`pitch_class_index`].
/// Returns `None` for anything else — callers treat that as a bad token.
pub fn standardize(text: &str) -> Option<Note> {
    let split_at = text
        .char_indices()
        .find(|(_, c)| c.is_ascii_digit() || *c == '-')
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    let (name, octave_str) = text.split_at(split_at);
    let pitch_class = pitch_class_index(name)?;
    let octave = if octave_str.is_empty() {
        DEFAULT_OCTAVE
    } else {
        octave_str.parse().ok()?
    };

    Some(Note::new(pitch_class, octave))
}
