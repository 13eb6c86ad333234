//! Audio session: music and effect playback behind a backend seam
//!
//! The session owns what is audible right now. Music is exclusive (starting
//! a track stops the previous one) while effects are fire-and-forget. The
//! backend trait keeps playback testable and lets the host shell decide what
//! actually produces sound.

/// What actually plays the audio. Track names are asset keys, not paths.
pub trait AudioBackend {
    fn play_music(&mut self, track: &str) -> Result<(), String>;
    fn stop_music(&mut self);
    fn play_effect(&mut self, effect: &str) -> Result<(), String>;
    fn set_muted(&mut self, muted: bool);
}

/// Backend for builds without an audio device; accepts everything, plays
/// nothing.
#[derive(Default)]
pub struct NullAudioBackend;

impl AudioBackend for NullAudioBackend {
    fn play_music(&mut self, _track: &str) -> Result<(), String> {
        Ok(())
    }

    fn stop_music(&mut self) {}

    fn play_effect(&mut self, _effect: &str) -> Result<(), String> {
        Ok(())
    }

    fn set_muted(&mut self, _muted: bool) {}
}

pub struct AudioSession<B> {
    backend: B,
    current_track: Option<String>,
    muted: bool,
}

impl<B: AudioBackend> AudioSession<B> {
    pub fn new(backend: B) -> Self {
        AudioSession {
            backend,
            current_track: None,
            muted: false,
        }
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn current_track(&self) -> Option<&str> {
        self.current_track.as_deref()
    }

    /// Starts `track`, replacing whatever music was playing. Restarting the
    /// current track is a no-op.
    pub fn play_music(&mut self, track: &str) -> Result<(), String> {
        if self.current_track.as_deref() == Some(track) {
            return Ok(());
        }

        if self.current_track.is_some() {
            self.backend.stop_music();
        }
        self.backend.play_music(track)?;
        self.current_track = Some(track.to_string());
        Ok(())
    }

    pub fn stop_music(&mut self) {
        if self.current_track.take().is_some() {
            self.backend.stop_music();
        }
    }

    /// One-shot effect; muted sessions swallow it silently.
    pub fn play_effect(&mut self, effect: &str) -> Result<(), String> {
        if self.muted {
            return Ok(());
        }
        self.backend.play_effect(effect)
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.backend.set_muted(self.muted);
    }
}
