//! A parsed progression and the slot-level edits the editor issues.
//!
//! Parsing collects the playable chords and keeps the full token stream
//! around for form expansion. Every edit is atomic: it either returns the
//! updated chord or an [`EditError`], never a half-applied state.

use serde::{Deserialize, Serialize};

use super::chord::{Chord, ChordOrigin, Key};
use super::error::{EditError, ParseWarning};
use super::resolver;
use super::token::Token;
use super::tokenizer;

/// A resolved progression: the playable slots plus the original token
/// stream (markers included) for form expansion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progression {
    pub chords: Vec<Chord>,
    #[serde(skip)]
    pub tokens: Vec<Token>,
    #[serde(skip)]
    pub warnings: Vec<ParseWarning>,
}

impl Progression {
    /// Parse progression text against a key. Unresolvable tokens are skipped
    /// and reported in `warnings`; parsing itself never fails.
    pub fn parse(source: &str, key: &Key) -> Self {
        Self::parse_at(source, key, super::note::DEFAULT_OCTAVE)
    }

    /// Parse with an explicit base octave for resolved chords.
    pub fn parse_at(source: &str, key: &Key, base_octave: i32) -> Self {
        let tokens = tokenizer::tokenize(source);
        let mut chords = Vec::new();
        let mut warnings = Vec::new();

        for token in &tokens {
            match token {
                Token::ChordSymbol(text) => {
                    match resolver::resolve_at(text, key, base_octave) {
                        Some(chord) => chords.push(chord),
                        None => warnings.push(ParseWarning::new(text, "unrecognized chord")),
                    }
                }
                Token::Rest => chords.push(Chord::rest("-")),
                _ => {}
            }
        }

        Self {
            chords,
            tokens,
            warnings,
        }
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    fn check_index(&self, index: usize) -> Result<(), EditError> {
        if index < self.chords.len() {
            Ok(())
        } else {
            Err(EditError::SlotOutOfRange {
                index,
                len: self.chords.len(),
            })
        }
    }

    /// Insert an empty slot at `index` (index == len appends).
    pub fn insert_empty(&mut self, index: usize) -> Result<&Chord, EditError> {
        if index > self.chords.len() {
            return Err(EditError::SlotOutOfRange {
                index,
                len: self.chords.len(),
            });
        }
        self.chords.insert(index, Chord::empty());
        Ok(&self.chords[index])
    }

    /// Remove the slot at `index`, returning the removed chord.
    pub fn delete(&mut self, index: usize) -> Result<Chord, EditError> {
        self.check_index(index)?;
        Ok(self.chords.remove(index))
    }

    /// Duplicate the slot at `index`, inserting the copy right after it.
    pub fn duplicate(&mut self, index: usize) -> Result<&Chord, EditError> {
        self.check_index(index)?;
        let copy = self.chords[index].clone();
        self.chords.insert(index + 1, copy);
        Ok(&self.chords[index + 1])
    }

    /// Re-resolve a single slot from a new token. The slot is untouched if
    /// the token does not resolve.
    pub fn replace_one(
        &mut self,
        index: usize,
        token: &str,
        key: &Key,
    ) -> Result<&Chord, EditError> {
        self.check_index(index)?;
        let chord = resolver::resolve(token, key).ok_or_else(|| EditError::UnparseableToken {
            token: token.to_string(),
        })?;
        self.chords[index] = chord;
        Ok(&self.chords[index])
    }

    /// Transpose every sounding slot by a signed number of semitones.
    /// Scale-degree chords re-resolve from their stored degree against the
    /// transposed key, so numerals keep their key-relative meaning.
    pub fn transpose_all(&mut self, semitones: i32, key: &Key) -> Key {
        let new_key = key.transposed(semitones);
        for chord in &mut self.chords {
            let is_degree = matches!(
                chord.sounding_ref().map(|s| s.origin),
                Some(ChordOrigin::ScaleDegree { .. })
            );
            *chord = if is_degree {
                resolver::resolve(&chord.display_name, &new_key).unwrap_or_else(|| chord.clone())
            } else {
                chord.transposed(semitones)
            };
        }
        new_key
    }
}
