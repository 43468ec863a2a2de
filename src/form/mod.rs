//! Form expansion — repeats resolved eagerly, jumps recorded for playback.
//!
//! Repeats must expand before anything else: their duplicated content
//! participates in later Segno/Coda jumps. The form signs themselves stay
//! lazy — the scheduler resolves them at run time because Fine and ToCoda
//! mean different things before and after a da-capo/da-segno return.

mod expand;

pub use expand::expand;

use crate::notation::chord::Chord;
use crate::notation::error::ParseWarning;

/// One entry in the flat playback sequence. Tempo-family events stay
/// interleaved with chords; the scheduler applies them in passing.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Chord(Chord),
    Tempo { bpm: u32 },
    Accel { target_bpm: u32, over_measures: u32 },
    TimeSignature { beats_per_measure: u32 },
}

/// Absolute entry indices of the form signs, meaning "just before entry i".
/// `None` where the sign never appears.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JumpTable {
    pub segno: Option<usize>,
    pub coda: Option<usize>,
    pub to_coda: Option<usize>,
    pub da_segno: Option<usize>,
    pub da_capo: Option<usize>,
    pub fine: Option<usize>,
}

/// The fully expanded, linear sequence the scheduler iterates.
#[derive(Debug, Clone, Default)]
pub struct FlatSequence {
    pub entries: Vec<Entry>,
    pub jumps: JumpTable,
    pub warnings: Vec<ParseWarning>,
}

impl FlatSequence {
    /// Number of playable chord slots (rests included, tempo events not).
    pub fn chord_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Chord(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
