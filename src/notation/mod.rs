//! Notation front-end — text → tokens → resolved chords.
//!
//! `tokenize` and `resolve` are pure; [`Progression`] ties them together and
//! carries the editable chord list. Markers pass through untouched for the
//! form expander.

pub mod chord;
pub mod error;
pub mod note;
pub mod progression;
pub mod quality;
pub mod resolver;
pub mod token;
pub mod tokenizer;

pub use chord::{Chord, ChordKind, ChordOrigin, Key, Mode, Sounding};
pub use error::{EditError, ParseWarning};
pub use note::Note;
pub use progression::Progression;
pub use token::Token;

pub use resolver::{resolve, resolve_at};
pub use tokenizer::tokenize;
