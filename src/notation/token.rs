//! Typed tokens produced by the notation tokenizer.

/// One classified token from the raw progression text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A chord-symbol token, passed through unmodified for the resolver.
    ChordSymbol(String),
    /// `-` or `REST`.
    Rest,
    /// `|:`
    RepeatOpen,
    /// `:|`, `:|xN`, or `:|N`. Total pass count, default 2.
    RepeatClose { count: u32 },
    /// `N/4`
    TimeSignature { beats_per_measure: u32 },
    /// `Tempo=NNN` or `[Tempo=NNN]`.
    Tempo { bpm: u32 },
    /// `Accel->target:measures` or `Accel=target:measures`.
    Accelerando { target_bpm: u32, over_measures: u32 },
    Segno,
    Coda,
    ToCoda,
    DalSegno,
    DaCapo,
    Fine,
}

impl Token {
    /// Whether this token is a playable slot (chord or rest) rather than a
    /// navigation or tempo marker.
    pub fn is_playable(&self) -> bool {
        matches!(self, Token::ChordSymbol(_) | Token::Rest)
    }
}
