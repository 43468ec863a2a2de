//! Token stream → flat sequence with eager repeat expansion.

use crate::notation::chord::{Chord, Key};
use crate::notation::error::ParseWarning;
use crate::notation::resolver;
use crate::notation::token::Token;

use super::{Entry, FlatSequence, JumpTable};

/// Expand a token stream against a key into a flat playback sequence.
///
/// Repeat brackets are matched as a stack and duplicated in place. An
/// unmatched `:|` repeats from the start of the sequence; an unclosed `|:`
/// at end of input is ignored. Form signs keep their first-occurrence index
/// if a repeat duplicates the span around them.
pub fn expand(tokens: &[Token], key: &Key, base_octave: i32) -> FlatSequence {
    let mut entries: Vec<Entry> = Vec::new();
    let mut jumps = JumpTable::default();
    let mut warnings = Vec::new();
    let mut open_stack: Vec<usize> = Vec::new();

    for token in tokens {
        match token {
            Token::ChordSymbol(text) => match resolver::resolve_at(text, key, base_octave) {
                Some(chord) => entries.push(Entry::Chord(chord)),
                None => warnings.push(ParseWarning::new(text, "unrecognized chord")),
            },
            Token::Rest => entries.push(Entry::Chord(Chord::rest("-"))),
            Token::Tempo { bpm } => entries.push(Entry::Tempo { bpm: *bpm }),
            Token::Accelerando {
                target_bpm,
                over_measures,
            } => entries.push(Entry::Accel {
                target_bpm: *target_bpm,
                over_measures: *over_measures,
            }),
            Token::TimeSignature { beats_per_measure } => entries.push(Entry::TimeSignature {
                beats_per_measure: *beats_per_measure,
            }),
            Token::RepeatOpen => open_stack.push(entries.len()),
            Token::RepeatClose { count } => {
                let from = open_stack.pop().unwrap_or(0);
                let span: Vec<Entry> = entries[from..].to_vec();
                for _ in 1..*count {
                    entries.extend(span.iter().cloned());
                }
            }
            Token::Segno => set_first(&mut jumps.segno, entries.len()),
            Token::Coda => set_first(&mut jumps.coda, entries.len()),
            Token::ToCoda => set_first(&mut jumps.to_coda, entries.len()),
            Token::DalSegno => set_first(&mut jumps.da_segno, entries.len()),
            Token::DaCapo => set_first(&mut jumps.da_capo, entries.len()),
            Token::Fine => set_first(&mut jumps.fine, entries.len()),
        }
    }

    FlatSequence {
        entries,
        jumps,
        warnings,
    }
}

fn set_first(slot: &mut Option<usize>, index: usize) {
    if slot.is_none() {
        *slot = Some(index);
    }
}
