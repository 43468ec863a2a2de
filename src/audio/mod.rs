//! Audio output — cpal stream fed through a lock-free command queue.
//!
//! The playback thread never touches the audio callback directly: it pushes
//! [`AudioCommand`]s into a ring buffer and the callback drains them at the
//! top of each block. All voice state lives on the audio thread.

pub mod synth;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{traits::Split, HeapProd, HeapRb};

use synth::SynthBank;

pub use synth::SynthPlayer;

/// Ring buffer capacity (number of commands).
const RING_BUFFER_CAPACITY: usize = 256;

/// Commands sent from the playback thread to the audio thread.
#[derive(Debug)]
pub enum AudioCommand {
    /// Replace the sounding voices with these frequencies. Drone voices
    /// hold at full sustain instead of decaying.
    SetNotes { freqs: Vec<f64>, drone: bool },
    /// A metronome blip, higher and louder when accented.
    Tick { accented: bool },
    /// Release all voices.
    Silence,
}

/// Audio engine errors.
#[derive(Debug)]
pub enum AudioError {
    /// No audio output device found.
    NoOutputDevice,
    /// Failed to query device configuration.
    DeviceConfig(String),
    /// Failed to build the audio stream.
    StreamBuild(String),
    /// Failed to start the audio stream.
    StreamPlay(String),
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "no audio output device found"),
            AudioError::DeviceConfig(e) => write!(f, "device config error: {e}"),
            AudioError::StreamBuild(e) => write!(f, "stream build error: {e}"),
            AudioError::StreamPlay(e) => write!(f, "stream play error: {e}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// The audio engine. Owns the cpal stream and, until taken, the command
/// producer.
///
/// The stream is not `Send`, so the engine stays on the thread that built
/// it while the [`SynthPlayer`] (producer side of the queue) moves to the
/// playback thread. Dropping the engine tears the stream down.
pub struct AudioEngine {
    _stream: cpal::Stream,
    producer: Option<HeapProd<AudioCommand>>,
    sample_rate: u32,
    channels: u16,
}

impl AudioEngine {
    /// Create and start the engine on the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let rb = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY);
        let (producer, consumer) = rb.split();

        let mut bank = SynthBank::new(consumer, channels, sample_rate);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_fn = |err: cpal::StreamError| {
            eprintln!("audio stream error: {err}");
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    bank.process(data);
                },
                err_fn,
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            producer: Some(producer),
            sample_rate,
            channels,
        })
    }

    /// Hand the command producer to a [`SynthPlayer`] for the scheduler.
    /// Can be taken once; the engine must outlive the player's use.
    pub fn take_player(&mut self) -> Option<SynthPlayer> {
        self.producer.take().map(SynthPlayer::new)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}
