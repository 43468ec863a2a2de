//! Playback state machine — steps through a flat sequence in musical time.
//!
//! The scheduler is pure state: it never sleeps and never owns a timer.
//! Each [`step`](PlaybackScheduler::step) emits one beat to the injected
//! [`Player`] and reports the delay until the next one; the threaded
//! [`driver`] (or a test loop) supplies the actual waiting. Cancellation is
//! cooperative — a step fired after `pause`/`stop` emits nothing.
//!
//! Form signs resolve lazily here, not in the expander: Fine and ToCoda act
//! only after a da-capo/da-segno jump has been taken, and loop mode re-arms
//! them on every wrap.

pub mod driver;

use std::fmt;
use std::time::Duration;

use crate::form::{Entry, FlatSequence};
use crate::tuning::Tuning;

/// The collaborator that actually makes sound. One call per beat.
pub trait Player {
    /// Sound a chord. `drone` chords sustain until displaced instead of
    /// being re-struck.
    fn chord(&mut self, freqs: &[f64], drone: bool);
    /// Metronome tick, accented on beat 1 of the measure.
    fn metronome(&mut self, accented: bool);
    /// Cut all sounding voices.
    fn silence(&mut self);
}

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
    Paused,
}

/// Options fixed at session start.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackOptions {
    pub tempo_bpm: u32,
    pub tuning: Tuning,
    pub loop_mode: bool,
    pub metronome: bool,
    pub beats_per_measure: u32,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            tempo_bpm: 120,
            tuning: Tuning::Equal,
            loop_mode: false,
            metronome: false,
            beats_per_measure: 4,
        }
    }
}

/// What a step did, and when the next one is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A beat was emitted; the next step is due after `delay`.
    Scheduled { delay: Duration },
    /// The final beat was emitted; let it ring for `delay`, then the
    /// session is over (state is already Stopped).
    Finished { delay: Duration },
    /// Nothing happened — the session is not in the Playing state.
    Idle,
}

/// Starting an empty session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NothingToPlay;

impl fmt::Display for NothingToPlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nothing to play")
    }
}

impl std::error::Error for NothingToPlay {}

/// Linear tempo ramp toward a target, advanced once per beat.
#[derive(Debug, Clone, Copy)]
struct TempoRamp {
    per_beat: f64,
    target: f64,
}

/// The playback state machine over a snapshot of the flat sequence.
///
/// The sequence is owned (snapshotted) at construction, so editor changes
/// to the progression never corrupt an in-flight session. Indices are
/// clamped defensively anyway.
pub struct PlaybackScheduler {
    sequence: FlatSequence,
    options: PlaybackOptions,

    state: PlayState,
    current_index: usize,
    tempo_bpm: f64,
    beats_per_measure: u32,
    beat_in_measure: u32,
    ramp: Option<TempoRamp>,

    ds_taken: bool,
    dc_taken: bool,
    coda_taken: bool,
    /// A drone is ringing; rests do not displace it.
    drone_active: bool,
}

impl PlaybackScheduler {
    pub fn new(sequence: FlatSequence, options: PlaybackOptions) -> Self {
        Self {
            sequence,
            options,
            state: PlayState::Stopped,
            current_index: 0,
            tempo_bpm: options.tempo_bpm.max(1) as f64,
            beats_per_measure: options.beats_per_measure.max(1),
            beat_in_measure: 0,
            ramp: None,
            ds_taken: false,
            dc_taken: false,
            coda_taken: false,
            drone_active: false,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    pub fn sequence(&self) -> &FlatSequence {
        &self.sequence
    }

    /// Start playback from the top. Starting while active stops first, so
    /// re-entry restarts rather than stacking sessions. An empty sequence
    /// (no playable slots) reports [`NothingToPlay`] with no state change.
    pub fn start(&mut self) -> Result<(), NothingToPlay> {
        if self.sequence.chord_count() == 0 {
            return Err(NothingToPlay);
        }
        self.reset();
        self.state = PlayState::Playing;
        // Apply any leading tempo/time-signature events so the first beat
        // already plays at the written tempo.
        if self.navigate() == Navigation::Stop {
            self.stop();
            return Err(NothingToPlay);
        }
        Ok(())
    }

    /// Freeze the current position and cancel the pending step.
    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
        }
    }

    /// Continue from the frozen position.
    pub fn resume(&mut self) {
        if self.state == PlayState::Paused {
            self.state = PlayState::Playing;
        }
    }

    /// Reset to Stopped. Safe from any state, including Stopped.
    pub fn stop(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.state = PlayState::Stopped;
        self.current_index = 0;
        self.tempo_bpm = self.options.tempo_bpm.max(1) as f64;
        self.beats_per_measure = self.options.beats_per_measure.max(1);
        self.beat_in_measure = 0;
        self.ramp = None;
        self.ds_taken = false;
        self.dc_taken = false;
        self.coda_taken = false;
        self.drone_active = false;
    }

    /// Emit one beat to the player and advance.
    ///
    /// Checks the session state first, so a step that fires after a
    /// `pause`/`stop` is silently discarded.
    pub fn step(&mut self, player: &mut dyn Player) -> StepOutcome {
        if self.state != PlayState::Playing {
            return StepOutcome::Idle;
        }

        // Clamp against any outside interference with the snapshot.
        if self.current_index > self.sequence.len() {
            self.current_index = self.sequence.len();
        }

        // `navigate` left us on a chord entry; anything else means the
        // sequence ended exactly here.
        let chord = match self.sequence.entries.get(self.current_index) {
            Some(Entry::Chord(c)) => c.clone(),
            _ => {
                self.stop();
                return StepOutcome::Finished {
                    delay: Duration::ZERO,
                };
            }
        };

        let freqs = self.options.tuning.frequencies(&chord);
        let drone = chord.is_drone();
        if freqs.is_empty() {
            // Rests leave a ringing drone alone.
            if !self.drone_active {
                player.silence();
            }
        } else {
            player.chord(&freqs, drone);
            self.drone_active = drone;
        }

        if self.options.metronome {
            player.metronome(self.beat_in_measure == 0);
        }

        // The emitted beat rings at the tempo active when it was struck.
        let delay = Duration::from_millis((60_000.0 / self.tempo_bpm).round() as u64);

        self.beat_in_measure = (self.beat_in_measure + 1) % self.beats_per_measure;
        self.apply_ramp();
        self.current_index += 1;

        match self.navigate() {
            Navigation::Continue => StepOutcome::Scheduled { delay },
            Navigation::Stop => {
                self.stop();
                StepOutcome::Finished { delay }
            }
        }
    }

    /// Advance per-beat tempo ramp, if an accelerando is active.
    fn apply_ramp(&mut self) {
        if let Some(ramp) = self.ramp {
            let next = self.tempo_bpm + ramp.per_beat;
            let reached = (ramp.per_beat >= 0.0 && next >= ramp.target)
                || (ramp.per_beat < 0.0 && next <= ramp.target);
            if reached {
                self.tempo_bpm = ramp.target;
                self.ramp = None;
            } else {
                self.tempo_bpm = next;
            }
        }
    }

    /// Resolve markers, inline tempo events, wraps, and jumps until the
    /// index rests on a chord entry — or the session is over.
    fn navigate(&mut self) -> Navigation {
        loop {
            let i = self.current_index;
            let jumps = self.sequence.jumps;
            let jump_taken = self.ds_taken || self.dc_taken;

            // Fine ends playback only after a da-capo/da-segno return —
            // standard form convention, even under loop mode.
            if jumps.fine == Some(i) && jump_taken {
                return Navigation::Stop;
            }
            if jumps.to_coda == Some(i) && jump_taken && !self.coda_taken {
                if let Some(coda) = jumps.coda {
                    self.coda_taken = true;
                    self.current_index = coda;
                    continue;
                }
            }
            if jumps.da_capo == Some(i) && !self.dc_taken {
                self.dc_taken = true;
                self.current_index = 0;
                continue;
            }
            if jumps.da_segno == Some(i) && !self.ds_taken {
                self.ds_taken = true;
                self.current_index = jumps.segno.unwrap_or(0);
                continue;
            }

            if i >= self.sequence.len() {
                if self.options.loop_mode {
                    // Wrap and re-arm the one-shot jumps.
                    self.current_index = 0;
                    self.ds_taken = false;
                    self.dc_taken = false;
                    self.coda_taken = false;
                    self.beat_in_measure = 0;
                    continue;
                }
                return Navigation::Stop;
            }

            match &self.sequence.entries[i] {
                Entry::Chord(_) => return Navigation::Continue,
                Entry::Tempo { bpm } => {
                    // An explicit tempo cancels a running accelerando.
                    self.tempo_bpm = (*bpm).max(1) as f64;
                    self.ramp = None;
                }
                Entry::Accel {
                    target_bpm,
                    over_measures,
                } => {
                    let beats = (*over_measures as f64) * self.beats_per_measure as f64;
                    let target = (*target_bpm).max(1) as f64;
                    self.ramp = Some(TempoRamp {
                        per_beat: (target - self.tempo_bpm) / beats.max(1.0),
                        target,
                    });
                }
                Entry::TimeSignature { beats_per_measure } => {
                    self.beats_per_measure = (*beats_per_measure).max(1);
                    self.beat_in_measure = 0;
                }
            }
            self.current_index += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Navigation {
    Continue,
    Stop,
}
