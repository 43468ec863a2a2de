//! Additive sine synth — voice bank on the audio thread, player handle off it.
//!
//! Each chord becomes one sine voice per note with a short linear attack and
//! an exponential decay. Drone voices hold at sustain instead of decaying.
//! The metronome is a short blip, higher and louder on the accented beat.

use std::f64::consts::PI;

use ringbuf::traits::{Consumer, Producer};
use ringbuf::{HeapCons, HeapProd};

use crate::playback::Player;

use super::AudioCommand;

const ATTACK_SECS: f64 = 0.01;
/// Per-second amplitude multiplier for decaying voices (~ -6 dB / 250 ms).
const DECAY_PER_SEC: f64 = 0.06;
const VOICE_GAIN: f64 = 0.18;
const TICK_SECS: f64 = 0.03;

/// One sounding sine voice.
struct Voice {
    freq: f64,
    phase: f64,
    /// Seconds since the voice started.
    age: f64,
    drone: bool,
}

impl Voice {
    fn amplitude(&self) -> f64 {
        if self.age < ATTACK_SECS {
            self.age / ATTACK_SECS
        } else if self.drone {
            1.0
        } else {
            DECAY_PER_SEC.powf(self.age - ATTACK_SECS)
        }
    }
}

/// Metronome blip state.
struct Tick {
    freq: f64,
    gain: f64,
    phase: f64,
    remaining: f64,
}

/// The voice bank. Lives on the audio thread; drains the command queue at
/// the top of every block.
pub struct SynthBank {
    consumer: HeapCons<AudioCommand>,
    voices: Vec<Voice>,
    tick: Option<Tick>,
    channels: u16,
    sample_rate: u32,
}

impl SynthBank {
    pub fn new(consumer: HeapCons<AudioCommand>, channels: u16, sample_rate: u32) -> Self {
        Self {
            consumer,
            voices: Vec::new(),
            tick: None,
            channels,
            sample_rate,
        }
    }

    fn apply(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::SetNotes { freqs, drone } => {
                self.voices = freqs
                    .into_iter()
                    .map(|freq| Voice {
                        freq,
                        phase: 0.0,
                        age: 0.0,
                        drone,
                    })
                    .collect();
            }
            AudioCommand::Tick { accented } => {
                self.tick = Some(Tick {
                    freq: if accented { 1760.0 } else { 1320.0 },
                    gain: if accented { 0.5 } else { 0.3 },
                    phase: 0.0,
                    remaining: TICK_SECS,
                });
            }
            AudioCommand::Silence => {
                self.voices.clear();
                self.tick = None;
            }
        }
    }

    /// Fill one interleaved output block.
    pub fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            self.apply(cmd);
        }

        let dt = 1.0 / self.sample_rate as f64;
        let channels = self.channels as usize;

        for frame in output.chunks_mut(channels) {
            let mut sample = 0.0;

            for voice in &mut self.voices {
                sample += (voice.phase * 2.0 * PI).sin() * voice.amplitude() * VOICE_GAIN;
                voice.phase = (voice.phase + voice.freq * dt).fract();
                voice.age += dt;
            }

            if let Some(tick) = &mut self.tick {
                sample += (tick.phase * 2.0 * PI).sin() * tick.gain;
                tick.phase = (tick.phase + tick.freq * dt).fract();
                tick.remaining -= dt;
            }
            if self.tick.as_ref().is_some_and(|t| t.remaining <= 0.0) {
                self.tick = None;
            }

            let clamped = sample.clamp(-1.0, 1.0) as f32;
            for out in frame.iter_mut() {
                *out = clamped;
            }
        }

        // Drop voices that have decayed below hearing.
        self.voices
            .retain(|v| v.drone || v.amplitude() > 1.0e-4 || v.age < ATTACK_SECS);
    }
}

/// The playback-side handle: adapts the command queue to the scheduler's
/// [`Player`] contract. A full queue drops the command — better a missed
/// beat than a blocked playback thread.
pub struct SynthPlayer {
    producer: HeapProd<AudioCommand>,
}

impl SynthPlayer {
    pub fn new(producer: HeapProd<AudioCommand>) -> Self {
        Self { producer }
    }

    fn push(&mut self, cmd: AudioCommand) {
        let _ = self.producer.try_push(cmd);
    }
}

impl Player for SynthPlayer {
    fn chord(&mut self, freqs: &[f64], drone: bool) {
        self.push(AudioCommand::SetNotes {
            freqs: freqs.to_vec(),
            drone,
        });
    }

    fn metronome(&mut self, accented: bool) {
        self.push(AudioCommand::Tick { accented });
    }

    fn silence(&mut self) {
        self.push(AudioCommand::Silence);
    }
}
