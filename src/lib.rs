//! Chordflow — a terminal chord-progression notation player.

pub mod audio;
pub mod config;
pub mod form;
pub mod notation;
pub mod playback;
pub mod tuning;
