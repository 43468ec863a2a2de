//! Error and warning types for parsing and editing.
//!
//! Parsing is lenient by design: a bad token is skipped with a warning and
//! the rest of the progression still resolves. Edits are atomic and report
//! why they were rejected.

use std::fmt;

/// A non-fatal parse issue, naming the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub token: String,
    pub reason: String,
}

impl ParseWarning {
    pub fn new(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped '{}': {}", self.token, self.reason)
    }
}

/// Why a slot edit was rejected. Rejected edits leave the progression
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The index does not name an existing slot.
    SlotOutOfRange { index: usize, len: usize },
    /// The replacement token did not resolve to a chord.
    UnparseableToken { token: String },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::SlotOutOfRange { index, len } => {
                write!(f, "slot {index} does not exist (progression has {len})")
            }
            EditError::UnparseableToken { token } => {
                write!(f, "'{token}' is not a valid chord")
            }
        }
    }
}

impl std::error::Error for EditError {}
