//! Audio backend implementation using rodio.
//!
//! The output stream is opened once per process by [`AudioSubsystem`] and
//! kept on the thread that created it. Sessions talk to it through the
//! cloneable, `Send` [`AudioHandle`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::error::SoundError;
use super::{AudioBackend, AudioOutput};

type LoadedTrack = Buffered<Decoder<BufReader<File>>>;

/// Slot holding the sink that is currently playing, if any.
type ActiveSink = Arc<Mutex<Option<Arc<Sink>>>>;

/// Process-wide audio resource.
///
/// Acquired once at startup and released when dropped at process exit.
/// Not `Send`: the rodio output stream must stay on its creating thread.
pub struct AudioSubsystem {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    handle: AudioHandle,
}

impl AudioSubsystem {
    /// Opens the default audio output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::NoOutputDevice` if no audio output device
    /// is available.
    pub fn acquire() -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::NoOutputDevice(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            handle: AudioHandle {
                stream: stream_handle,
                active: Arc::new(Mutex::new(None)),
            },
        })
    }

    /// Returns a handle that can be moved to other threads.
    #[must_use]
    pub fn handle(&self) -> AudioHandle {
        self.handle.clone()
    }
}

impl std::fmt::Debug for AudioSubsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSubsystem").finish_non_exhaustive()
    }
}

/// Acquires the audio subsystem, returning None if audio is unavailable.
///
/// If initialization fails, a warning is logged and breaks run silently.
#[must_use]
pub fn try_acquire_audio() -> Option<AudioSubsystem> {
    match AudioSubsystem::acquire() {
        Ok(subsystem) => Some(subsystem),
        Err(e) => {
            warn!("Audio not available, breaks will be silent: {}", e);
            None
        }
    }
}

/// Cloneable handle to the process-wide audio output.
#[derive(Clone)]
pub struct AudioHandle {
    stream: OutputStreamHandle,
    active: ActiveSink,
}

impl AudioHandle {
    /// Stops whatever is currently playing.
    ///
    /// Used on process termination.
    pub fn stop_all(&self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sink) = active.take() {
            sink.stop();
            debug!("Active playback stopped");
        }
    }
}

impl std::fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let playing = self
            .active
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("AudioHandle")
            .field("playing", &playing)
            .finish_non_exhaustive()
    }
}

impl AudioOutput for AudioHandle {
    fn open(&self) -> Result<Box<dyn AudioBackend>, SoundError> {
        Ok(Box::new(RodioAudioBackend::new(self.clone())))
    }
}

/// Plays one track through a dedicated rodio sink.
pub struct RodioAudioBackend {
    handle: AudioHandle,
    track: Option<LoadedTrack>,
    sink: Option<Arc<Sink>>,
}

impl RodioAudioBackend {
    /// Creates a backend with nothing loaded.
    #[must_use]
    pub fn new(handle: AudioHandle) -> Self {
        Self {
            handle,
            track: None,
            sink: None,
        }
    }

    fn release_sink(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            let mut active = self.handle.active.lock().unwrap_or_else(|e| e.into_inner());
            if active.as_ref().is_some_and(|current| Arc::ptr_eq(current, &sink)) {
                *active = None;
            }
        }
    }
}

impl AudioBackend for RodioAudioBackend {
    fn load(&mut self, path: &Path) -> Result<(), SoundError> {
        let file = File::open(path)
            .map_err(|e| SoundError::MusicNotFound {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| SoundError::UnsupportedTrack {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        self.track = Some(decoder.buffered());
        debug!("Loaded track {}", path.display());
        Ok(())
    }

    fn play(&mut self, looped: bool) -> Result<(), SoundError> {
        let track = self
            .track
            .clone()
            .ok_or(SoundError::NoTrackLoaded)?;

        self.release_sink();

        let sink = Sink::try_new(&self.handle.stream)
            .map_err(|e| SoundError::Sink(e.to_string()))?;
        if looped {
            sink.append(track.repeat_infinite());
        } else {
            sink.append(track);
        }
        sink.play();

        let sink = Arc::new(sink);
        *self.handle.active.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&sink));
        self.sink = Some(sink);

        debug!("Playback started (looped: {})", looped);
        Ok(())
    }

    fn is_playing(&self) -> Result<bool, SoundError> {
        Ok(self
            .sink
            .as_ref()
            .is_some_and(|sink| !sink.empty() && !sink.is_paused()))
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        self.release_sink();
        Ok(())
    }
}

impl Drop for RodioAudioBackend {
    fn drop(&mut self) {
        self.release_sink();
    }
}

impl std::fmt::Debug for RodioAudioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioAudioBackend")
            .field("loaded", &self.track.is_some())
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}
