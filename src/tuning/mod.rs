//! Frequency resolution — equal temperament and 5-limit just intonation.
//!
//! Equal temperament computes every note directly from its distance to A4.
//! Just intonation anchors the chord root with equal temperament and derives
//! the remaining notes from small-integer interval ratios, so the chord is
//! pure relative to its own root rather than to a fixed scale.

use serde::{Deserialize, Serialize};

use crate::notation::chord::Chord;
use crate::notation::note::Note;

const A4_HZ: f64 = 440.0;

/// Audible output guard. Anything outside (0, 20 kHz) is dropped rather
/// than handed to the synth.
const MAX_HZ: f64 = 20_000.0;

/// 5-limit just-intonation ratios for the twelve interval classes,
/// unison through major seventh.
const JUST_RATIOS: [f64; 12] = [
    1.0,
    16.0 / 15.0,
    9.0 / 8.0,
    6.0 / 5.0,
    5.0 / 4.0,
    4.0 / 3.0,
    45.0 / 32.0,
    3.0 / 2.0,
    8.0 / 5.0,
    5.0 / 3.0,
    9.0 / 5.0,
    15.0 / 8.0,
];

/// Tuning mode for frequency resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tuning {
    #[default]
    Equal,
    Just,
}

impl Tuning {
    /// Frequencies for a resolved chord, one per note, filtered to the
    /// audible range. Rests and empty slots yield an empty list; so does a
    /// chord whose every note fell outside the range — both mean "nothing
    /// to sound", not an error.
    pub fn frequencies(self, chord: &Chord) -> Vec<f64> {
        let Some(sounding) = chord.sounding_ref() else {
            return Vec::new();
        };

        let freqs: Vec<f64> = match self {
            Tuning::Equal => sounding.notes.iter().map(|n| equal_hz(*n)).collect(),
            Tuning::Just => {
                let Some(&root_note) = sounding.notes.first() else {
                    return Vec::new();
                };
                let root_hz = equal_hz(root_note);
                sounding
                    .intervals
                    .iter()
                    .map(|&interval| {
                        let class = interval.rem_euclid(12) as usize;
                        let octaves = interval.div_euclid(12);
                        root_hz * JUST_RATIOS[class] * f64::powi(2.0, octaves)
                    })
                    .collect()
            }
        };

        freqs
            .into_iter()
            .filter(|&f| f > 0.0 && f < MAX_HZ)
            .collect()
    }
}

/// Equal-temperament frequency: `440 * 2^(semitones_from_a4 / 12)`.
pub fn equal_hz(note: Note) -> f64 {
    A4_HZ * f64::powf(2.0, note.semitones_from_a4() as f64 / 12.0)
}
