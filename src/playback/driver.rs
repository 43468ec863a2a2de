//! Threaded playback driver — turns the pure state machine into real time.
//!
//! A dedicated thread owns the scheduler and player, stepping and sleeping.
//! The wait between beats polls the command channel, so a pause or stop
//! lands before the pending step fires — there is no orphaned timer. The
//! step itself re-checks the session state, so even a command that slips in
//! mid-sleep discards the beat cleanly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{PlayState, PlaybackScheduler, Player, StepOutcome};

/// Poll interval while waiting out a beat.
const WAIT_SLICE: Duration = Duration::from_millis(5);

/// Commands accepted by the playback thread.
#[derive(Debug)]
enum Command {
    Play,
    Pause,
    Resume,
    Stop,
    Shutdown,
}

/// Handle to the playback thread. Dropping it shuts the thread down.
pub struct PlaybackDriver {
    tx: Sender<Command>,
    is_playing: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PlaybackDriver {
    /// Spawn the playback thread around a scheduler and player.
    pub fn spawn<P>(scheduler: PlaybackScheduler, player: P) -> Self
    where
        P: Player + Send + 'static,
    {
        let (tx, rx) = channel();
        let is_playing = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&is_playing);

        let handle = thread::spawn(move || {
            DriverLoop {
                scheduler,
                player,
                rx,
                is_playing: flag,
            }
            .run();
        });

        Self {
            tx,
            is_playing,
            handle: Some(handle),
        }
    }

    pub fn play(&self) {
        let _ = self.tx.send(Command::Play);
    }

    pub fn pause(&self) {
        let _ = self.tx.send(Command::Pause);
    }

    pub fn resume(&self) {
        let _ = self.tx.send(Command::Resume);
    }

    pub fn stop(&self) {
        let _ = self.tx.send(Command::Stop);
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing.load(Ordering::Relaxed)
    }

    /// Block until playback ends or `timeout` passes.
    pub fn wait_until_done(&self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        // Give the thread a moment to pick up a pending Play first.
        thread::sleep(WAIT_SLICE * 4);
        while self.is_playing() && Instant::now() < deadline {
            thread::sleep(WAIT_SLICE * 4);
        }
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct DriverLoop<P: Player> {
    scheduler: PlaybackScheduler,
    player: P,
    rx: Receiver<Command>,
    is_playing: Arc<AtomicBool>,
}

impl<P: Player> DriverLoop<P> {
    fn run(&mut self) {
        loop {
            if self.scheduler.state() == PlayState::Playing {
                match self.scheduler.step(&mut self.player) {
                    StepOutcome::Scheduled { delay } => {
                        if !self.sleep_with_commands(delay) {
                            break;
                        }
                    }
                    StepOutcome::Finished { delay } => {
                        // Let the final beat ring before going silent.
                        if !self.sleep_with_commands(delay) {
                            break;
                        }
                        self.player.silence();
                        self.is_playing.store(false, Ordering::Relaxed);
                    }
                    StepOutcome::Idle => {
                        self.is_playing.store(false, Ordering::Relaxed);
                    }
                }
            } else {
                // Nothing running — block until the next command.
                match self.rx.recv() {
                    Ok(cmd) => {
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        }
        self.player.silence();
        self.is_playing.store(false, Ordering::Relaxed);
    }

    /// Sleep out a beat delay, draining commands as they arrive. Returns
    /// false on shutdown.
    fn sleep_with_commands(&mut self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        loop {
            match self.rx.try_recv() {
                Ok(cmd) => {
                    if !self.handle_command(cmd) {
                        return false;
                    }
                    // A stop or pause cancels the rest of the wait.
                    if self.scheduler.state() != PlayState::Playing {
                        return true;
                    }
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => return false,
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(WAIT_SLICE.min(deadline - now));
        }
    }

    /// Apply one command. Returns false on shutdown.
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Play => {
                // Idempotent re-entry: an active session stops first.
                self.scheduler.stop();
                match self.scheduler.start() {
                    Ok(()) => self.is_playing.store(true, Ordering::Relaxed),
                    Err(e) => {
                        eprintln!("{e}");
                        self.is_playing.store(false, Ordering::Relaxed);
                    }
                }
            }
            Command::Pause => {
                self.scheduler.pause();
                self.player.silence();
            }
            Command::Resume => {
                self.scheduler.resume();
                if self.scheduler.state() == PlayState::Playing {
                    self.is_playing.store(true, Ordering::Relaxed);
                }
            }
            Command::Stop => {
                self.scheduler.stop();
                self.player.silence();
                self.is_playing.store(false, Ordering::Relaxed);
            }
            Command::Shutdown => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::expand;
    use crate::notation::chord::Key;
    use crate::notation::note::DEFAULT_OCTAVE;
    use crate::notation::tokenize;
    use crate::playback::PlaybackOptions;
    use std::sync::Mutex;

    /// Thread-safe emission counter for driver tests.
    #[derive(Clone, Default)]
    struct CountingPlayer {
        beats: Arc<Mutex<usize>>,
    }

    impl Player for CountingPlayer {
        fn chord(&mut self, _freqs: &[f64], _drone: bool) {
            *self.beats.lock().unwrap() += 1;
        }
        fn metronome(&mut self, _accented: bool) {}
        fn silence(&mut self) {}
    }

    fn driver(src: &str, tempo_bpm: u32) -> (PlaybackDriver, Arc<Mutex<usize>>) {
        let seq = expand(&tokenize(src), &Key::default(), DEFAULT_OCTAVE);
        let scheduler = PlaybackScheduler::new(
            seq,
            PlaybackOptions {
                tempo_bpm,
                ..Default::default()
            },
        );
        let player = CountingPlayer::default();
        let beats = Arc::clone(&player.beats);
        (PlaybackDriver::spawn(scheduler, player), beats)
    }

    #[test]
    fn plays_and_finishes() {
        // Four chords at 600 bpm = 100 ms per beat.
        let (driver, beats) = driver("C G Am F", 600);
        driver.play();
        driver.wait_until_done(Duration::from_secs(5));
        assert_eq!(*beats.lock().unwrap(), 4);
        assert!(!driver.is_playing());
    }

    #[test]
    fn stop_cancels_pending_step() {
        // Slow tempo: the first beat fires, the second is far away.
        let (driver, beats) = driver("C G Am F", 30);
        driver.play();
        thread::sleep(Duration::from_millis(100));
        driver.stop();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(*beats.lock().unwrap(), 1);
        assert!(!driver.is_playing());
    }

    #[test]
    fn pause_and_resume() {
        let (driver, beats) = driver("C G Am F C G Am F", 120);
        driver.play();
        thread::sleep(Duration::from_millis(100));
        driver.pause();
        thread::sleep(Duration::from_millis(50));
        let frozen = *beats.lock().unwrap();
        thread::sleep(Duration::from_millis(600));
        assert_eq!(*beats.lock().unwrap(), frozen);

        driver.resume();
        driver.wait_until_done(Duration::from_secs(10));
        assert_eq!(*beats.lock().unwrap(), 8);
    }

    #[test]
    fn empty_progression_never_starts() {
        let (driver, beats) = driver("", 120);
        driver.play();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(*beats.lock().unwrap(), 0);
        assert!(!driver.is_playing());
    }

    #[test]
    fn shutdown_on_drop() {
        let (driver, _beats) = driver("C G", 60);
        driver.play();
        drop(driver); // must not hang
    }
}
