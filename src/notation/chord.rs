//! The harmonic data model: keys and resolved chords.
//!
//! A [`Chord`] is a closed sum over what a slot actually holds — a rest, an
//! empty editor slot, or a sounding chord refined by where it came from.
//! Chords are immutable once built; edits replace the slot wholesale.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::note::{canonical_name, pitch_class_index, Note};

/// Major or natural-minor mode of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

/// The key a progression is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Chromatic index of the tonic (0 = C .. 11 = B).
    pub tonic: u8,
    pub mode: Mode,
}

impl Key {
    pub fn new(tonic: u8, mode: Mode) -> Self {
        Self {
            tonic: tonic % 12,
            mode,
        }
    }

    /// Parse a tonic name ("C", "F#", "bb") into a key.
    pub fn parse(tonic: &str, mode: Mode) -> Option<Self> {
        pitch_class_index(tonic).map(|t| Self::new(t, mode))
    }

    /// The key transposed by a signed number of semitones.
    pub fn transposed(self, semitones: i32) -> Self {
        Self {
            tonic: (self.tonic as i32 + semitones).rem_euclid(12) as u8,
            mode: self.mode,
        }
    }
}

impl Default for Key {
    fn default() -> Self {
        Self::new(0, Mode::Major)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Major => "major",
            Mode::Minor => "minor",
        };
        write!(f, "{} {}", canonical_name(self.tonic), mode)
    }
}

/// Where a sounding chord came from. Scale-degree chords keep their degree
/// so a key change can re-resolve them instead of shifting fixed pitches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordOrigin {
    /// Letter chord like `Cm7`.
    Letter,
    /// A bare note name like `E` or `F#3`.
    SingleNote,
    /// Dash-joined note list like `C-E-G`.
    CustomNotes,
    /// Roman numeral or digit, 1-based degree within the key.
    ScaleDegree { degree: u8 },
}

/// The pitched content of a sounding chord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sounding {
    /// Chromatic index of the root.
    pub root: u8,
    /// Signed semitone offsets from the root (the first note). Negative for
    /// notes a custom list writes below it. Same length as `notes`.
    pub intervals: Vec<i32>,
    /// Concrete pitches derived from root + intervals at a base octave.
    pub notes: Vec<Note>,
    pub origin: ChordOrigin,
    /// Sustain without per-beat re-attack.
    pub drone: bool,
}

/// What a progression slot holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChordKind {
    /// A silent beat.
    Rest,
    /// An empty editor slot, placeholder with no musical meaning.
    Empty,
    Sounding(Sounding),
}

/// One resolved slot in a progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    /// The original token text, preserved for display and round-trips.
    pub display_name: String,
    pub kind: ChordKind,
}

impl Chord {
    pub fn rest(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            kind: ChordKind::Rest,
        }
    }

    pub fn empty() -> Self {
        Self {
            display_name: String::new(),
            kind: ChordKind::Empty,
        }
    }

    /// Build a sounding chord from root + intervals at a base octave.
    pub fn sounding(
        display_name: impl Into<String>,
        root: u8,
        intervals: Vec<i32>,
        base_octave: i32,
        origin: ChordOrigin,
        drone: bool,
    ) -> Self {
        let notes = intervals
            .iter()
            .map(|&i| Note::from_interval(root, i, base_octave))
            .collect();
        Self {
            display_name: display_name.into(),
            kind: ChordKind::Sounding(Sounding {
                root: root % 12,
                intervals,
                notes,
                origin,
                drone,
            }),
        }
    }

    /// Build a sounding chord from an explicit note list (custom note lists
    /// carry their own octaves). Intervals are derived relative to the first
    /// note.
    pub fn from_notes(
        display_name: impl Into<String>,
        notes: Vec<Note>,
        origin: ChordOrigin,
        drone: bool,
    ) -> Self {
        debug_assert!(!notes.is_empty());
        let root_semis = notes[0].octave * 12 + notes[0].pitch_class as i32;
        let intervals = notes
            .iter()
            .map(|n| n.octave * 12 + n.pitch_class as i32 - root_semis)
            .collect();
        Self {
            display_name: display_name.into(),
            kind: ChordKind::Sounding(Sounding {
                root: notes[0].pitch_class,
                intervals,
                notes,
                origin,
                drone,
            }),
        }
    }

    /// Whether this slot produces sound.
    pub fn is_sounding(&self) -> bool {
        matches!(self.kind, ChordKind::Sounding(_))
    }

    pub fn is_drone(&self) -> bool {
        matches!(&self.kind, ChordKind::Sounding(s) if s.drone)
    }

    /// The sounding payload, if any.
    pub fn sounding_ref(&self) -> Option<&Sounding> {
        match &self.kind {
            ChordKind::Sounding(s) => Some(s),
            _ => None,
        }
    }

    /// A new chord shifted by a signed number of semitones, with the display
    /// name re-canonicalized to the new root. Rests and empties are returned
    /// unchanged.
    pub fn transposed(&self, semitones: i32) -> Self {
        let Some(s) = self.sounding_ref() else {
            return self.clone();
        };
        let root = (s.root as i32 + semitones).rem_euclid(12) as u8;
        let notes: Vec<Note> = s.notes.iter().map(|n| n.transposed(semitones)).collect();
        let display_name = transposed_display(&self.display_name, &s.origin, root, &notes);
        Self {
            display_name,
            kind: ChordKind::Sounding(Sounding {
                root,
                intervals: s.intervals.clone(),
                notes,
                origin: s.origin,
                drone: s.drone,
            }),
        }
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ChordKind::Rest => write!(f, "(rest)"),
            ChordKind::Empty => write!(f, "(empty)"),
            ChordKind::Sounding(s) => {
                let notes: Vec<String> = s.notes.iter().map(|n| n.to_string()).collect();
                write!(f, "{:<8} [{}]", self.display_name, notes.join(" "))
            }
        }
    }
}

/// Rebuild a display name after transposition. Letter chords keep their
/// quality suffix on the new root; note-list chords rename every note;
/// scale-degree chords keep their numeral text (the degree is key-relative).
fn transposed_display(original: &str, origin: &ChordOrigin, root: u8, notes: &[Note]) -> String {
    match origin {
        ChordOrigin::Letter => {
            let body = original.trim_end_matches('~');
            let mut chars = body.chars();
            chars.next(); // the root letter
            let mut suffix = chars.as_str();
            if let Some(rest) = suffix.strip_prefix(['#', 'b', '♯', '♭']) {
                suffix = rest;
            }
            let drone = if original.ends_with('~') { "~" } else { "" };
            format!("{}{}{}", canonical_name(root), suffix, drone)
        }
        ChordOrigin::SingleNote => notes
            .first()
            .map(|n| n.to_string())
            .unwrap_or_else(|| original.to_string()),
        ChordOrigin::CustomNotes => notes
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("-"),
        ChordOrigin::ScaleDegree { .. } => original.to_string(),
    }
}
