//! Chord resolution — one token plus a key becomes a resolved chord.
//!
//! Resolution order (first match wins): rest, custom note list, bare single
//! note, roman numeral / scale degree, letter chord. A token matching no rule
//! resolves to `None`; callers skip it so one typo never kills the parse.

use super::chord::{Chord, ChordOrigin, Key, Mode};
use super::note::{pitch_class_index, standardize, DEFAULT_OCTAVE};
use super::quality;

/// Scale-degree semitone offsets from the tonic.
const MAJOR_SCALE: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const NATURAL_MINOR_SCALE: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

const MINOR_TRIAD: &[u8] = &[0, 3, 7];
const DIM_TRIAD: &[u8] = &[0, 3, 6];

/// Resolve a single chord-symbol token against a key at the default octave.
pub fn resolve(token: &str, key: &Key) -> Option<Chord> {
    resolve_at(token, key, DEFAULT_OCTAVE)
}

/// Resolve a single chord-symbol token against a key at a given base octave.
pub fn resolve_at(token: &str, key: &Key, base_octave: i32) -> Option<Chord> {
    if token.is_empty() {
        return None;
    }

    if token == "-" || token.eq_ignore_ascii_case("rest") {
        return Some(Chord::rest(token));
    }

    // A trailing `~` marks a drone on any sounding form.
    let (body, drone) = match token.strip_suffix('~') {
        Some(b) if !b.is_empty() => (b, true),
        _ => (token, false),
    };

    if body.contains('-') && !body.starts_with('-') {
        return resolve_note_list(token, body, drone);
    }

    if let Some(chord) = resolve_single_note(token, body, base_octave, drone) {
        return Some(chord);
    }

    if let Some(chord) = resolve_scale_degree(token, body, key, base_octave, drone) {
        return Some(chord);
    }

    resolve_letter(token, body, base_octave, drone)
}

/// Rule 2: dash-joined note list like `C-E-G` or `A3-C#-E`. Every part must
/// standardize or the whole chord is rejected.
fn resolve_note_list(token: &str, body: &str, drone: bool) -> Option<Chord> {
    let notes: Option<Vec<_>> = body.split('-').map(standardize).collect();
    let notes = notes?;
    if notes.is_empty() {
        return None;
    }
    Some(Chord::from_notes(
        token,
        notes,
        ChordOrigin::CustomNotes,
        drone,
    ))
}

/// Rule 3: a bare pitch-class name, optionally with octave, and no quality
/// substring ("C", "f#", "E3").
fn resolve_single_note(token: &str, body: &str, base_octave: i32, drone: bool) -> Option<Chord> {
    if quality::contains_quality_hint(body) {
        return None;
    }
    // A trailing digit that names a quality ("C5", "C9") is a chord suffix,
    // not an octave; the letter rule gets it.
    if let Some(at) = body.find(|c: char| c.is_ascii_digit()) {
        if quality::lookup(&body[at..]).is_some() {
            return None;
        }
    }
    let mut note = standardize(body)?;
    if !body.chars().any(|c| c.is_ascii_digit()) {
        note.octave = base_octave;
    }
    Some(Chord::from_notes(
        token,
        vec![note],
        ChordOrigin::SingleNote,
        drone,
    ))
}

/// Rule 4: roman numeral (`I`..`vii`) or bare digit (1-7), with an optional
/// quality suffix. Case encodes major/minor; explicit suffixes win; bare
/// digits take the diatonic default for the key mode.
fn resolve_scale_degree(
    token: &str,
    body: &str,
    key: &Key,
    base_octave: i32,
    drone: bool,
) -> Option<Chord> {
    let (degree, case, suffix) = split_degree(body)?;

    let scale = match key.mode {
        Mode::Major => &MAJOR_SCALE,
        Mode::Minor => &NATURAL_MINOR_SCALE,
    };
    let offset = scale[(degree - 1) as usize];
    let root = (key.tonic + offset) % 12;

    let intervals: Vec<i32> = degree_intervals(degree, case, suffix, key.mode)
        .iter()
        .map(|&i| i32::from(i))
        .collect();

    Some(Chord::sounding(
        token,
        root,
        intervals,
        base_octave,
        ChordOrigin::ScaleDegree { degree },
        drone,
    ))
}

/// How the numeral was written, which carries the triad quality when no
/// explicit suffix does.
#[derive(Clone, Copy, PartialEq)]
enum NumeralCase {
    Upper,
    Lower,
    /// Bare digit — no case information.
    Digit,
}

/// Split a scale-degree token into (1-based degree, case, quality suffix).
fn split_degree(body: &str) -> Option<(u8, NumeralCase, &str)> {
    let first = body.chars().next()?;

    if first.is_ascii_digit() {
        let degree = first.to_digit(10)? as u8;
        if !(1..=7).contains(&degree) {
            return None;
        }
        return Some((degree, NumeralCase::Digit, &body[1..]));
    }

    let numeral_len = body
        .chars()
        .take_while(|c| matches!(c, 'I' | 'V' | 'i' | 'v'))
        .count();
    if numeral_len == 0 {
        return None;
    }
    let (numeral, suffix) = body.split_at(numeral_len);

    // Mixed case ("Iv") is not a numeral; let the letter rule have it.
    let case = if numeral.chars().all(|c| c.is_ascii_uppercase()) {
        NumeralCase::Upper
    } else if numeral.chars().all(|c| c.is_ascii_lowercase()) {
        NumeralCase::Lower
    } else {
        return None;
    };

    let degree = match numeral.to_ascii_uppercase().as_str() {
        "I" => 1,
        "II" => 2,
        "III" => 3,
        "IV" => 4,
        "V" => 5,
        "VI" => 6,
        "VII" => 7,
        _ => return None,
    };

    Some((degree, case, suffix))
}

/// Triad/seventh intervals for a scale degree. Explicit suffix wins, then
/// numeral case, then the diatonic default for the mode.
fn degree_intervals(degree: u8, case: NumeralCase, suffix: &str, mode: Mode) -> &'static [u8] {
    // Dim glyphs and explicit qualities first. A bare "7" is not explicit:
    // its third comes from the numeral case, handled below.
    match suffix {
        "°" | "o" | "O" | "dim" => return DIM_TRIAD,
        "+" | "aug" => return &[0, 4, 8],
        "" | "7" => {}
        _ => {
            if let Some(intervals) = quality::lookup(suffix) {
                return intervals;
            }
        }
    }

    let base = match case {
        NumeralCase::Upper => quality::MAJOR_TRIAD,
        NumeralCase::Lower => MINOR_TRIAD,
        NumeralCase::Digit => diatonic_default(degree, mode),
    };

    // A bare "7" suffix extends the case/default triad with its seventh.
    if suffix == "7" {
        return match base {
            b if b == quality::MAJOR_TRIAD => &[0, 4, 7, 10],
            b if b == MINOR_TRIAD => &[0, 3, 7, 10],
            _ => &[0, 3, 6, 10],
        };
    }

    base
}

/// Diatonic triad quality per degree: major keys have major 1/4/5, minor
/// 2/3/6, diminished 7; natural-minor keys have minor 1/4/5, major 3/6/7,
/// diminished 2.
fn diatonic_default(degree: u8, mode: Mode) -> &'static [u8] {
    match mode {
        Mode::Major => match degree {
            1 | 4 | 5 => quality::MAJOR_TRIAD,
            7 => DIM_TRIAD,
            _ => MINOR_TRIAD,
        },
        Mode::Minor => match degree {
            1 | 4 | 5 => MINOR_TRIAD,
            2 => DIM_TRIAD,
            _ => quality::MAJOR_TRIAD,
        },
    }
}

/// Rule 5: letter chord `[A-G][#b♯♭]?` plus quality suffix. Unknown suffixes
/// fall back to the major triad.
fn resolve_letter(token: &str, body: &str, base_octave: i32, drone: bool) -> Option<Chord> {
    let mut chars = body.chars();
    let letter = chars.next()?;
    if !matches!(letter.to_ascii_uppercase(), 'A'..='G') {
        return None;
    }

    let mut root_len = letter.len_utf8();
    if let Some(acc) = chars.next() {
        if matches!(acc, '#' | '♯' | '♭') || (acc == 'b' && body.len() > root_len + 1) {
            // A lone trailing 'b' ("Cb") is an accidental too — but "Cb"
            // with nothing after it already standardizes as a flat root.
            root_len += acc.len_utf8();
        } else if acc == 'b' {
            root_len += 1;
        }
    }

    let root = pitch_class_index(&body[..root_len])?;
    let suffix = &body[root_len..];
    let intervals: Vec<i32> = quality::lookup_or_major(suffix)
        .iter()
        .map(|&i| i32::from(i))
        .collect();

    Some(Chord::sounding(
        token,
        root,
        intervals,
        base_octave,
        ChordOrigin::Letter,
        drone,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::chord::ChordKind;
    use crate::notation::note::Note;

    fn c_major() -> Key {
        Key::new(0, Mode::Major)
    }

    fn notes_of(chord: &Chord) -> Vec<String> {
        chord
            .sounding_ref()
            .map(|s| s.notes.iter().map(|n| n.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn rest_tokens() {
        assert_eq!(resolve("-", &c_major()).unwrap().kind, ChordKind::Rest);
        assert_eq!(resolve("REST", &c_major()).unwrap().kind, ChordKind::Rest);
    }

    #[test]
    fn letter_chord_major_default() {
        let c = resolve("C", &c_major()).unwrap();
        // Bare "C" is a single note, not a chord.
        assert_eq!(notes_of(&c), vec!["C4"]);

        let g = resolve("G7", &c_major()).unwrap();
        let s = g.sounding_ref().unwrap();
        assert_eq!(s.root, 7);
        assert_eq!(s.intervals, vec![0, 4, 7, 10]);
    }

    #[test]
    fn letter_chord_minor() {
        let am = resolve("Am", &c_major()).unwrap();
        let s = am.sounding_ref().unwrap();
        assert_eq!(s.root, 9);
        assert_eq!(s.intervals, vec![0, 3, 7]);
    }

    #[test]
    fn flat_root_folds_to_sharp() {
        let bb = resolve("Bbm7", &c_major()).unwrap();
        let s = bb.sounding_ref().unwrap();
        assert_eq!(s.root, 10);
        assert_eq!(s.intervals, vec![0, 3, 7, 10]);
        assert_eq!(bb.display_name, "Bbm7");
    }

    #[test]
    fn unknown_quality_falls_back_to_major() {
        let c = resolve("Cxyz", &c_major()).unwrap();
        let s = c.sounding_ref().unwrap();
        assert_eq!(s.root, 0);
        assert_eq!(s.intervals, vec![0, 4, 7]);
    }

    #[test]
    fn custom_note_list() {
        let c = resolve("C-E-G", &c_major()).unwrap();
        assert_eq!(notes_of(&c), vec!["C4", "E4", "G4"]);
        assert_eq!(
            c.sounding_ref().unwrap().origin,
            ChordOrigin::CustomNotes
        );

        let a7 = resolve("A-C#-E-G", &c_major()).unwrap();
        assert_eq!(notes_of(&a7), vec!["A4", "C#4", "E4", "G4"]);
    }

    #[test]
    fn custom_note_list_with_octaves() {
        let c = resolve("C3-G3-E4", &c_major()).unwrap();
        assert_eq!(notes_of(&c), vec!["C3", "G3", "E4"]);
    }

    #[test]
    fn custom_note_list_rejects_any_bad_part() {
        assert!(resolve("C-E-X", &c_major()).is_none());
        assert!(resolve("C--G", &c_major()).is_none());
    }

    #[test]
    fn single_note_with_octave() {
        let e3 = resolve("E3", &c_major()).unwrap();
        assert_eq!(notes_of(&e3), vec!["E3"]);
        let s = e3.sounding_ref().unwrap();
        assert_eq!(s.origin, ChordOrigin::SingleNote);
        assert_eq!(s.intervals, vec![0]);
    }

    #[test]
    fn roman_numeral_is_key_relative() {
        let v_in_c = resolve("V", &c_major()).unwrap();
        let v_in_g = resolve("V", &Key::parse("G", Mode::Major).unwrap()).unwrap();
        assert_eq!(v_in_c.sounding_ref().unwrap().root, 7); // G
        assert_eq!(v_in_g.sounding_ref().unwrap().root, 2); // D
        assert_eq!(v_in_c.sounding_ref().unwrap().intervals, vec![0, 4, 7]);
        assert_eq!(v_in_g.sounding_ref().unwrap().intervals, vec![0, 4, 7]);
    }

    #[test]
    fn roman_numeral_case_encodes_quality() {
        let two = resolve("ii", &c_major()).unwrap();
        assert_eq!(two.sounding_ref().unwrap().intervals, vec![0, 3, 7]);

        // Uppercase overrides the diatonic minor default.
        let two_major = resolve("II", &c_major()).unwrap();
        assert_eq!(two_major.sounding_ref().unwrap().intervals, vec![0, 4, 7]);
    }

    #[test]
    fn roman_numeral_dim_glyphs() {
        for token in ["vii°", "viio", "viidim"] {
            let c = resolve(token, &c_major()).unwrap();
            assert_eq!(
                c.sounding_ref().unwrap().intervals,
                vec![0, 3, 6],
                "token {token:?}"
            );
        }
    }

    #[test]
    fn roman_numeral_sevenths() {
        let five7 = resolve("V7", &c_major()).unwrap();
        assert_eq!(
            five7.sounding_ref().unwrap().intervals,
            vec![0, 4, 7, 10]
        );
        let two7 = resolve("ii7", &c_major()).unwrap();
        assert_eq!(two7.sounding_ref().unwrap().intervals, vec![0, 3, 7, 10]);
        // Digit degrees keep their diatonic third under the seventh.
        let six7 = resolve("67", &c_major()).unwrap();
        assert_eq!(six7.sounding_ref().unwrap().intervals, vec![0, 3, 7, 10]);
    }

    #[test]
    fn digit_degrees_take_diatonic_default() {
        let key = c_major();
        // Major key: 5 is major, 6 is minor, 7 is diminished.
        assert_eq!(
            resolve("5", &key).unwrap().sounding_ref().unwrap().intervals,
            vec![0, 4, 7]
        );
        assert_eq!(
            resolve("6", &key).unwrap().sounding_ref().unwrap().intervals,
            vec![0, 3, 7]
        );
        assert_eq!(
            resolve("7", &key).unwrap().sounding_ref().unwrap().intervals,
            vec![0, 3, 6]
        );
    }

    #[test]
    fn digit_degrees_in_minor() {
        let key = Key::parse("A", Mode::Minor).unwrap();
        // Natural minor: degree 3 offset is 3 semitones → C, major triad.
        let three = resolve("3", &key).unwrap();
        let s = three.sounding_ref().unwrap();
        assert_eq!(s.root, 0);
        assert_eq!(s.intervals, vec![0, 4, 7]);
        // Degree 2 is diminished.
        assert_eq!(
            resolve("2", &key).unwrap().sounding_ref().unwrap().intervals,
            vec![0, 3, 6]
        );
    }

    #[test]
    fn scale_degree_is_retained() {
        let four = resolve("IV", &c_major()).unwrap();
        assert_eq!(
            four.sounding_ref().unwrap().origin,
            ChordOrigin::ScaleDegree { degree: 4 }
        );
    }

    #[test]
    fn minor_key_numeral_offsets() {
        let key = Key::parse("A", Mode::Minor).unwrap();
        let five = resolve("v", &key).unwrap();
        assert_eq!(five.sounding_ref().unwrap().root, 4); // E
    }

    #[test]
    fn drone_suffix() {
        let c = resolve("C~", &c_major()).unwrap();
        assert!(c.is_drone());
        assert_eq!(c.display_name, "C~");

        let am = resolve("Am7~", &c_major()).unwrap();
        assert!(am.is_drone());
        assert_eq!(am.sounding_ref().unwrap().intervals, vec![0, 3, 7, 10]);
    }

    #[test]
    fn unresolvable_tokens_are_none() {
        assert!(resolve("???", &c_major()).is_none());
        assert!(resolve("H9", &c_major()).is_none());
        assert!(resolve("", &c_major()).is_none());
    }

    #[test]
    fn base_octave_applies() {
        let c = resolve_at("C-E-G", &c_major(), 3).unwrap();
        // Custom lists carry their own (default) octave; letter chords shift.
        assert_eq!(notes_of(&c), vec!["C4", "E4", "G4"]);

        let g = resolve_at("G7", &c_major(), 2).unwrap();
        assert_eq!(g.sounding_ref().unwrap().notes[0], Note::new(7, 2));
    }

    #[test]
    fn single_note_follows_base_octave_when_unspecified() {
        let e = resolve_at("E", &c_major(), 2).unwrap();
        assert_eq!(notes_of(&e), vec!["E2"]);
        // Explicit octave wins over the base octave.
        let e3 = resolve_at("E3", &c_major(), 2).unwrap();
        assert_eq!(notes_of(&e3), vec!["E3"]);
    }

    #[test]
    fn digit_qualities_beat_octaves() {
        // "C5"-style digits name chords, not octaves.
        let power = resolve("C5", &c_major()).unwrap();
        assert_eq!(power.sounding_ref().unwrap().intervals, vec![0, 7]);

        let ninth = resolve("C9", &c_major()).unwrap();
        assert_eq!(
            ninth.sounding_ref().unwrap().intervals,
            vec![0, 4, 7, 10, 14]
        );

        let sixth = resolve("A6", &c_major()).unwrap();
        assert_eq!(sixth.sounding_ref().unwrap().intervals, vec![0, 4, 7, 9]);

        // Digits that name no quality are still octaves.
        let note = resolve("C3", &c_major()).unwrap();
        assert_eq!(notes_of(&note), vec!["C3"]);
    }
}
