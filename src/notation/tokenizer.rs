//! Tokenizer for progression notation.
//!
//! Splits raw text on whitespace and bare `|` separators while keeping the
//! multi-character repeat markers `|:` and `:|`/`:|xN` whole, then classifies
//! each word by pattern in precedence order. Classification never fails:
//! anything unrecognized is a chord symbol for the resolver to judge.

use super::token::Token;

/// Tokenize raw progression text into typed tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    split_words(source).iter().map(|w| classify(w)).collect()
}

/// Split on whitespace, then peel bar characters off each word. A bare `|`
/// is a visual separator and is dropped; `|:` and `:|...` survive as words.
fn split_words(source: &str) -> Vec<String> {
    let mut words = Vec::new();

    for raw in source.split_whitespace() {
        let mut rest = raw;
        loop {
            if rest.is_empty() {
                break;
            }
            if rest == "|" {
                break;
            }
            if let Some(tail) = rest.strip_prefix("|:") {
                words.push("|:".to_string());
                rest = tail;
                continue;
            }
            if rest.starts_with(":|") {
                // Repeat-close swallows its count suffix (":|x3").
                words.push(rest.to_string());
                break;
            }
            if let Some(tail) = rest.strip_prefix('|') {
                rest = tail;
                continue;
            }
            // A trailing bar glued to a chord ("C|") splits off.
            if let Some(head) = rest.strip_suffix('|') {
                if !head.contains(':') {
                    rest = head;
                    continue;
                }
            }
            words.push(rest.to_string());
            break;
        }
    }

    words
}

/// Classify one word. Precedence mirrors the notation: structural markers
/// first, keywords next, chord symbols as the catch-all.
fn classify(word: &str) -> Token {
    if word == "|:" {
        return Token::RepeatOpen;
    }
    if let Some(suffix) = word.strip_prefix(":|") {
        return Token::RepeatClose {
            count: parse_repeat_count(suffix),
        };
    }
    if let Some(tok) = parse_time_signature(word) {
        return tok;
    }
    if let Some(tok) = parse_tempo(word) {
        return tok;
    }
    if let Some(tok) = parse_accelerando(word) {
        return tok;
    }

    match word.to_ascii_uppercase().as_str() {
        "SEGNO" => return Token::Segno,
        "CODA" => return Token::Coda,
        "TOCODA" => return Token::ToCoda,
        "DS" => return Token::DalSegno,
        "DC" => return Token::DaCapo,
        "FINE" => return Token::Fine,
        "-" | "REST" => return Token::Rest,
        _ => {}
    }

    Token::ChordSymbol(word.to_string())
}

/// `":|"` → 2 passes, `":|x3"` / `":|3"` → 3. Garbage counts fall back to 2.
fn parse_repeat_count(suffix: &str) -> u32 {
    let digits = suffix
        .strip_prefix(['x', 'X'])
        .unwrap_or(suffix)
        .trim();
    if digits.is_empty() {
        return 2;
    }
    digits.parse().ok().filter(|&n| n >= 1).unwrap_or(2)
}

/// `N/4` — only quarter-note denominators are meaningful here.
fn parse_time_signature(word: &str) -> Option<Token> {
    let (num, den) = word.split_once('/')?;
    if den != "4" {
        return None;
    }
    let beats: u32 = num.parse().ok()?;
    (beats >= 1).then_some(Token::TimeSignature {
        beats_per_measure: beats,
    })
}

/// `Tempo=NNN` or `[Tempo=NNN]`, case-insensitive.
fn parse_tempo(word: &str) -> Option<Token> {
    let body = word
        .strip_prefix('[')
        .and_then(|w| w.strip_suffix(']'))
        .unwrap_or(word);
    let (name, value) = body.split_once('=')?;
    if !name.eq_ignore_ascii_case("tempo") {
        return None;
    }
    let bpm: u32 = value.parse().ok()?;
    (bpm >= 1).then_some(Token::Tempo { bpm })
}

/// `Accel->target:measures` or `Accel=target:measures`, case-insensitive.
fn parse_accelerando(word: &str) -> Option<Token> {
    let body = word
        .strip_prefix('[')
        .and_then(|w| w.strip_suffix(']'))
        .unwrap_or(word);

    let payload = if let Some(rest) = strip_prefix_ci(body, "accel->") {
        rest
    } else if let Some(rest) = strip_prefix_ci(body, "accel=") {
        rest
    } else {
        return None;
    };

    let (target, measures) = payload.split_once(':')?;
    let target_bpm: u32 = target.parse().ok()?;
    let over_measures: u32 = measures.parse().ok()?;
    (target_bpm >= 1 && over_measures >= 1).then_some(Token::Accelerando {
        target_bpm,
        over_measures,
    })
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chords_and_separators() {
        let tokens = tokenize("C G | Am F");
        assert_eq!(
            tokens,
            vec![
                Token::ChordSymbol("C".into()),
                Token::ChordSymbol("G".into()),
                Token::ChordSymbol("Am".into()),
                Token::ChordSymbol("F".into()),
            ]
        );
    }

    #[test]
    fn repeat_markers_stay_whole() {
        let tokens = tokenize("|: C G :|");
        assert_eq!(tokens[0], Token::RepeatOpen);
        assert_eq!(tokens[3], Token::RepeatClose { count: 2 });
    }

    #[test]
    fn repeat_close_with_count() {
        assert_eq!(tokenize(":|x3")[0], Token::RepeatClose { count: 3 });
        assert_eq!(tokenize(":|4")[0], Token::RepeatClose { count: 4 });
    }

    #[test]
    fn repeat_close_bad_count_defaults() {
        assert_eq!(tokenize(":|xzz")[0], Token::RepeatClose { count: 2 });
        assert_eq!(tokenize(":|x0")[0], Token::RepeatClose { count: 2 });
    }

    #[test]
    fn time_signature() {
        assert_eq!(
            tokenize("3/4")[0],
            Token::TimeSignature {
                beats_per_measure: 3
            }
        );
        // Non-quarter denominators are not time signatures here.
        assert_eq!(tokenize("6/8")[0], Token::ChordSymbol("6/8".into()));
    }

    #[test]
    fn tempo_directive() {
        assert_eq!(tokenize("Tempo=120")[0], Token::Tempo { bpm: 120 });
        assert_eq!(tokenize("[tempo=90]")[0], Token::Tempo { bpm: 90 });
    }

    #[test]
    fn malformed_tempo_falls_through() {
        assert_eq!(tokenize("Tempo=abc")[0], Token::ChordSymbol("Tempo=abc".into()));
    }

    #[test]
    fn accelerando() {
        assert_eq!(
            tokenize("Accel->160:4")[0],
            Token::Accelerando {
                target_bpm: 160,
                over_measures: 4
            }
        );
        assert_eq!(
            tokenize("accel=100:2")[0],
            Token::Accelerando {
                target_bpm: 100,
                over_measures: 2
            }
        );
    }

    #[test]
    fn form_keywords_case_insensitive() {
        assert_eq!(tokenize("segno")[0], Token::Segno);
        assert_eq!(tokenize("CODA")[0], Token::Coda);
        assert_eq!(tokenize("ToCoda")[0], Token::ToCoda);
        assert_eq!(tokenize("ds")[0], Token::DalSegno);
        assert_eq!(tokenize("Dc")[0], Token::DaCapo);
        assert_eq!(tokenize("fine")[0], Token::Fine);
    }

    #[test]
    fn rest_markers() {
        assert_eq!(tokenize("-")[0], Token::Rest);
        assert_eq!(tokenize("rest")[0], Token::Rest);
    }

    #[test]
    fn custom_note_list_is_a_chord_symbol() {
        // Dashes inside a word are for the resolver, not the tokenizer.
        assert_eq!(tokenize("C-E-G")[0], Token::ChordSymbol("C-E-G".into()));
    }

    #[test]
    fn bar_glued_to_chord() {
        assert_eq!(
            tokenize("C| G"),
            vec![
                Token::ChordSymbol("C".into()),
                Token::ChordSymbol("G".into()),
            ]
        );
        assert_eq!(tokenize("|C")[0], Token::ChordSymbol("C".into()));
    }

    #[test]
    fn empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n  ").is_empty());
    }

    #[test]
    fn full_progression() {
        let tokens = tokenize("4/4 Tempo=90 |: C G Am F :|x2 SEGNO Dm G CODA C FINE");
        assert_eq!(
            tokens[0],
            Token::TimeSignature {
                beats_per_measure: 4
            }
        );
        assert_eq!(tokens[1], Token::Tempo { bpm: 90 });
        assert_eq!(tokens[2], Token::RepeatOpen);
        assert_eq!(tokens[7], Token::RepeatClose { count: 2 });
        assert_eq!(tokens[8], Token::Segno);
        assert_eq!(tokens[11], Token::Coda);
        assert_eq!(tokens.last(), Some(&Token::Fine));
    }
}
