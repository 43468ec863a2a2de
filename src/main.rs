//! Chordflow — play a chord progression written in plain text notation.
//!
//! Example:
//!   chordflow "Tempo=90 C Am F G7"
//!   chordflow --key A --minor "i iv v i"
//!   chordflow --tuning just --loop "|: C F G C :|"

use clap::Parser;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chordflow::audio::AudioEngine;
use chordflow::config;
use chordflow::form;
use chordflow::notation::{Key, Mode, Progression};
use chordflow::playback::driver::PlaybackDriver;
use chordflow::playback::{PlaybackOptions, PlaybackScheduler};
use chordflow::tuning::Tuning;

#[derive(Parser, Debug)]
#[command(name = "chordflow", about = "Play chord progressions from text notation")]
struct Cli {
    /// The progression, e.g. "C Am F G7" or "|: I vi IV V :|"
    notation: String,

    /// Key tonic (C, F#, Bb, ...)
    #[arg(short, long)]
    key: Option<String>,

    /// Interpret the key as natural minor
    #[arg(long)]
    minor: bool,

    /// Tempo in BPM
    #[arg(short, long)]
    tempo: Option<u32>,

    /// Tuning system: equal or just
    #[arg(long)]
    tuning: Option<String>,

    /// Base octave for chords
    #[arg(short, long)]
    octave: Option<i32>,

    /// Loop the progression until interrupted
    #[arg(long = "loop")]
    loop_mode: bool,

    /// Play a metronome click on every beat
    #[arg(short, long)]
    metronome: bool,

    /// Print the resolved progression without playing it
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    let cli = Cli::parse();
    let cfg = config::load();

    let mode = if cli.minor || cfg.minor {
        Mode::Minor
    } else {
        Mode::Major
    };
    let tonic = cli.key.as_deref().unwrap_or(&cfg.key);
    let key = match Key::parse(tonic, mode) {
        Some(key) => key,
        None => {
            eprintln!("unrecognized key: {tonic}");
            process::exit(1);
        }
    };

    let tuning = match cli.tuning.as_deref() {
        Some("equal") => Tuning::Equal,
        Some("just") => Tuning::Just,
        Some(other) => {
            eprintln!("unrecognized tuning: {other} (expected equal or just)");
            process::exit(1);
        }
        None => cfg.tuning,
    };

    let tempo = cli.tempo.unwrap_or(cfg.tempo);
    let octave = cli.octave.unwrap_or(cfg.octave);

    let progression = Progression::parse_at(&cli.notation, &key, octave);
    for warning in &progression.warnings {
        eprintln!("warning: {warning}");
    }
    if progression.is_empty() {
        eprintln!("nothing to play");
        process::exit(1);
    }

    println!("Key: {key}  Tempo: {tempo} BPM");
    for (i, chord) in progression.chords.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, chord);
    }

    if cli.dry_run {
        return;
    }

    let sequence = form::expand(&progression.tokens, &key, octave);
    let options = PlaybackOptions {
        tempo_bpm: tempo,
        tuning,
        loop_mode: cli.loop_mode || cfg.loop_mode,
        metronome: cli.metronome || cfg.metronome,
        ..PlaybackOptions::default()
    };
    let scheduler = PlaybackScheduler::new(sequence, options);

    // The engine owns the cpal stream and must stay on this thread; the
    // player half is what crosses into the playback thread.
    let mut engine = match AudioEngine::new() {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("audio setup failed: {err}");
            process::exit(1);
        }
    };
    let player = match engine.take_player() {
        Some(player) => player,
        None => {
            eprintln!("audio setup failed: player already taken");
            process::exit(1);
        }
    };

    let driver = PlaybackDriver::spawn(scheduler, player);
    driver.play();

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        if let Err(err) = ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
        }) {
            eprintln!("failed to install Ctrl-C handler: {err}");
        }
    }

    // Give the playback thread a moment to pick up the Play command.
    std::thread::sleep(Duration::from_millis(50));
    while driver.is_playing() && !interrupted.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }
    driver.stop();
}
