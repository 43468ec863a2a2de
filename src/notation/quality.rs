//! Chord-quality suffixes and their semitone intervals from the root.

/// Known quality suffixes, each with its sorted intervals from the root.
///
/// Lookup is case-insensitive. Longer spellings of the same quality
/// ("min" vs "m") are separate entries so the resolver can match the
/// user's text exactly.
const QUALITIES: [(&str, &[u8]); 25] = [
    ("", &[0, 4, 7]),
    ("m", &[0, 3, 7]),
    ("min", &[0, 3, 7]),
    ("maj", &[0, 4, 7]),
    ("5", &[0, 7]),
    ("6", &[0, 4, 7, 9]),
    ("m6", &[0, 3, 7, 9]),
    ("7", &[0, 4, 7, 10]),
    ("maj7", &[0, 4, 7, 11]),
    ("m7", &[0, 3, 7, 10]),
    ("min7", &[0, 3, 7, 10]),
    ("mmaj7", &[0, 3, 7, 11]),
    ("m7b5", &[0, 3, 6, 10]),
    ("dim", &[0, 3, 6]),
    ("dim7", &[0, 3, 6, 9]),
    ("aug", &[0, 4, 8]),
    ("sus2", &[0, 2, 7]),
    ("sus4", &[0, 5, 7]),
    ("7sus4", &[0, 5, 7, 10]),
    ("9", &[0, 4, 7, 10, 14]),
    ("m9", &[0, 3, 7, 10, 14]),
    ("maj9", &[0, 4, 7, 11, 14]),
    ("add9", &[0, 4, 7, 14]),
    ("11", &[0, 4, 7, 10, 14, 17]),
    ("13", &[0, 4, 7, 10, 14, 17, 21]),
];

/// The major triad — the fallback for empty or unrecognized suffixes.
pub const MAJOR_TRIAD: &[u8] = &[0, 4, 7];

/// Intervals for a quality suffix, if it is a known one.
pub fn lookup(suffix: &str) -> Option<&'static [u8]> {
    let lowered = suffix.to_ascii_lowercase();
    QUALITIES
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, intervals)| *intervals)
}

/// Intervals for a quality suffix, falling back to the major triad.
///
/// The lenient fallback is intentional: a typo'd quality still produces a
/// playable chord instead of killing the whole progression.
pub fn lookup_or_major(suffix: &str) -> &'static [u8] {
    lookup(suffix).unwrap_or(MAJOR_TRIAD)
}

/// Whether the token text contains any quality substring. Used to tell a
/// bare note name ("C", "F#3") apart from a letter chord ("Cm", "F#7").
pub fn contains_quality_hint(text: &str) -> bool {
    let lowered = text.to_ascii_lowercase();
    ["m", "7", "sus", "dim", "aug", "maj", "min"]
        .iter()
        .any(|q| lowered.contains(q))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_suffix_is_major() {
        assert_eq!(lookup(""), Some(MAJOR_TRIAD));
    }

    #[test]
    fn minor_spellings() {
        assert_eq!(lookup("m"), Some(&[0, 3, 7][..]));
        assert_eq!(lookup("min"), Some(&[0, 3, 7][..]));
    }

    #[test]
    fn sevenths() {
        assert_eq!(lookup("7"), Some(&[0, 4, 7, 10][..]));
        assert_eq!(lookup("maj7"), Some(&[0, 4, 7, 11][..]));
        assert_eq!(lookup("m7"), Some(&[0, 3, 7, 10][..]));
    }

    #[test]
    fn extended_chords() {
        assert_eq!(lookup("9"), Some(&[0, 4, 7, 10, 14][..]));
        assert_eq!(lookup("11"), Some(&[0, 4, 7, 10, 14, 17][..]));
        assert_eq!(lookup("13"), Some(&[0, 4, 7, 10, 14, 17, 21][..]));
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(lookup("Maj7"), Some(&[0, 4, 7, 11][..]));
        assert_eq!(lookup("DIM"), Some(&[0, 3, 6][..]));
        assert_eq!(lookup("Sus4"), Some(&[0, 5, 7][..]));
    }

    #[test]
    fn unknown_falls_back_to_major() {
        assert_eq!(lookup("xyz"), None);
        assert_eq!(lookup_or_major("xyz"), MAJOR_TRIAD);
        assert_eq!(lookup_or_major("banana"), MAJOR_TRIAD);
    }

    #[test]
    fn intervals_are_sorted() {
        for (name, intervals) in QUALITIES {
            let mut sorted = intervals.to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, intervals, "unsorted intervals for {name:?}");
        }
    }

    #[test]
    fn quality_hints() {
        assert!(contains_quality_hint("Cm"));
        assert!(contains_quality_hint("G7"));
        assert!(contains_quality_hint("Dsus4"));
        assert!(!contains_quality_hint("C"));
        assert!(!contains_quality_hint("F#"));
    }
}
