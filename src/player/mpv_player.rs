use libmpv2::Mpv;
use std::cell::RefCell;
use std::ffi::CString;
use std::rc::Rc;
use tracing::{debug, info, warn};

use super::types::{PlayerError, TrackInfo, TrackKind};
use crate::config::Config;

/// What the engine's `sid` property should be set to for a selector row:
/// mpv accepts either a numeric track id or "no" to disable subtitles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SidValue {
    Off,
    Track(i64),
}

/// The selectors' synthetic "Off" row carries track id 0.
fn sid_value(track_id: i64) -> SidValue {
    if track_id <= 0 {
        SidValue::Off
    } else {
        SidValue::Track(track_id)
    }
}

struct MpvPlayerInner {
    // None until the first load (or after shutdown). Every engine call is
    // guarded on this and turns into a no-op when the handle is absent.
    mpv: RefCell<Option<Mpv>>,
    label: String,
    verbose_logging: bool,
    initial_volume: i64,
}

/// One engine session. The player runs in floating-window mode: no window id
/// is handed to the engine, so it opens its own video window on the first
/// load and this wrapper only speaks the command/property API.
#[derive(Clone)]
pub struct MpvPlayer {
    inner: Rc<MpvPlayerInner>,
}

impl MpvPlayer {
    pub fn new(label: &str, config: &Config) -> Self {
        info!(
            "Creating MPV player '{}' (verbose_logging: {})",
            label, config.playback.mpv_verbose_logging
        );

        Self {
            inner: Rc::new(MpvPlayerInner {
                mpv: RefCell::new(None),
                label: label.to_string(),
                verbose_logging: config.playback.mpv_verbose_logging,
                initial_volume: config.playback.default_volume,
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.mpv.borrow().is_some()
    }

    /// Create and configure the engine if it is not already running.
    pub fn activate(&self) -> Result<(), PlayerError> {
        if self.inner.mpv.borrow().is_some() {
            return Ok(());
        }
        let mpv = self.inner.init_mpv()?;
        self.inner.mpv.replace(Some(mpv));
        Ok(())
    }

    /// Release the engine: pause, stop, then an asynchronous quit before
    /// dropping the handle, so teardown never blocks the UI thread waiting
    /// on the decoder. Safe to call on an already-closed player.
    pub fn shutdown(&self) {
        if let Some(mpv) = self.inner.mpv.borrow_mut().take() {
            let _ = mpv.set_property("pause", true);
            let _ = mpv.command("stop", &[]);
            let _ = mpv.command("quit", &[]);
            info!("{}: engine handle released", self.inner.label);
        }
    }

    /// Load a file, re-activating the engine first if it was shut down.
    pub fn load(&self, path: &str) -> Result<(), PlayerError> {
        self.activate()?;

        if let Some(ref mpv) = *self.inner.mpv.borrow() {
            info!("{}: loading {}", self.inner.label, path);
            mpv.command("loadfile", &[path, "replace"])
                .map_err(|e| PlayerError::Load(format!("{:?}", e)))?;
        }
        Ok(())
    }

    /// Unload the current file but keep the engine instance for the next load.
    pub fn unload(&self) {
        if let Some(ref mpv) = *self.inner.mpv.borrow() {
            debug!("{}: unloading current file", self.inner.label);
            if let Err(e) = mpv.command("stop", &[]) {
                warn!("{}: stop failed: {:?}", self.inner.label, e);
            }
        }
    }

    pub fn toggle_pause(&self) {
        if let Some(ref mpv) = *self.inner.mpv.borrow()
            && let Err(e) = mpv.command("cycle", &["pause"])
        {
            warn!("{}: cycle pause failed: {:?}", self.inner.label, e);
        }
    }

    /// Used by the global transport buttons, which set an explicit paused
    /// state on both players rather than toggling each.
    pub fn set_paused(&self, paused: bool) {
        if let Some(ref mpv) = *self.inner.mpv.borrow()
            && let Err(e) = mpv.set_property("pause", paused)
        {
            warn!("{}: set pause={} failed: {:?}", self.inner.label, paused, e);
        }
    }

    /// Relative seek; negative offsets seek backwards.
    pub fn seek(&self, seconds: f64) {
        if let Some(ref mpv) = *self.inner.mpv.borrow()
            && let Err(e) = mpv.command("seek", &[&seconds.to_string(), "relative"])
        {
            warn!("{}: seek {:+}s failed: {:?}", self.inner.label, seconds, e);
        }
    }

    pub fn set_volume(&self, volume: i64) {
        if let Some(ref mpv) = *self.inner.mpv.borrow() {
            let value = (volume as f64).clamp(0.0, 100.0);
            if let Err(e) = mpv.set_property("volume", value) {
                warn!("{}: set volume failed: {:?}", self.inner.label, e);
            }
        }
    }

    /// Current playback position in seconds. None while nothing is loaded or
    /// when the engine cannot answer (e.g. the user closed the video window);
    /// the caller leaves its display unchanged in that case.
    pub fn position(&self) -> Option<f64> {
        self.inner
            .mpv
            .borrow()
            .as_ref()
            .and_then(|mpv| mpv.get_property::<f64>("time-pos").ok())
    }

    pub fn duration(&self) -> Option<f64> {
        self.inner
            .mpv
            .borrow()
            .as_ref()
            .and_then(|mpv| mpv.get_property::<f64>("duration").ok())
    }

    pub fn audio_tracks(&self) -> Vec<TrackInfo> {
        self.tracks(TrackKind::Audio)
    }

    pub fn subtitle_tracks(&self) -> Vec<TrackInfo> {
        self.tracks(TrackKind::Subtitle)
    }

    fn tracks(&self, kind: TrackKind) -> Vec<TrackInfo> {
        let mut tracks = Vec::new();

        if let Some(ref mpv) = *self.inner.mpv.borrow()
            && let Ok(count) = mpv.get_property::<i64>("track-list/count")
        {
            debug!("{}: track-list/count={}", self.inner.label, count);
            for i in 0..count {
                match mpv.get_property::<String>(&format!("track-list/{}/type", i)) {
                    Ok(track_type) if track_type == kind.engine_type() => {}
                    Ok(_) => continue,
                    Err(e) => {
                        debug!("{}: failed to get track {} type: {:?}", self.inner.label, i, e);
                        continue;
                    }
                }

                let Ok(id) = mpv.get_property::<i64>(&format!("track-list/{}/id", i)) else {
                    continue;
                };

                tracks.push(TrackInfo {
                    id,
                    kind,
                    title: mpv
                        .get_property::<String>(&format!("track-list/{}/title", i))
                        .ok(),
                    lang: mpv
                        .get_property::<String>(&format!("track-list/{}/lang", i))
                        .ok(),
                    channels: mpv
                        .get_property::<i64>(&format!("track-list/{}/demux-channel-count", i))
                        .ok(),
                });
            }
        }

        tracks
    }

    pub fn select_audio(&self, track_id: i64) {
        if let Some(ref mpv) = *self.inner.mpv.borrow()
            && let Err(e) = mpv.set_property("aid", track_id)
        {
            warn!("{}: set aid={} failed: {:?}", self.inner.label, track_id, e);
        }
    }

    /// Track id 0 is the selectors' "Off" row and disables subtitles.
    pub fn select_subtitle(&self, track_id: i64) {
        if let Some(ref mpv) = *self.inner.mpv.borrow() {
            let result = match sid_value(track_id) {
                SidValue::Off => mpv.set_property("sid", "no"),
                SidValue::Track(id) => mpv.set_property("sid", id),
            };
            if let Err(e) = result {
                warn!("{}: set sid={} failed: {:?}", self.inner.label, track_id, e);
            }
        }
    }

    /// Currently selected audio track id; None when disabled or inactive.
    pub fn current_audio(&self) -> Option<i64> {
        self.inner
            .mpv
            .borrow()
            .as_ref()
            .and_then(|mpv| mpv.get_property::<i64>("aid").ok())
    }

    pub fn current_subtitle(&self) -> Option<i64> {
        self.inner
            .mpv
            .borrow()
            .as_ref()
            .and_then(|mpv| mpv.get_property::<i64>("sid").ok())
    }

    /// Side-load an external subtitle file into the current session.
    pub fn add_subtitle_file(&self, path: &str) {
        if let Some(ref mpv) = *self.inner.mpv.borrow() {
            info!("{}: adding external subtitles {}", self.inner.label, path);
            if let Err(e) = mpv.command("sub-add", &[path, "auto"]) {
                warn!("{}: sub-add failed: {:?}", self.inner.label, e);
            }
        }
    }
}

impl MpvPlayerInner {
    fn init_mpv(&self) -> Result<Mpv, PlayerError> {
        info!("{}: creating MPV instance", self.label);

        // MPV requires LC_NUMERIC to be set to "C"
        unsafe {
            let c_locale = CString::new("C").unwrap();
            libc::setlocale(libc::LC_NUMERIC, c_locale.as_ptr());
        }

        let option_err = |name: &'static str| {
            move |e: libmpv2::Error| PlayerError::Option {
                name,
                reason: format!("{:?}", e),
            }
        };

        let mpv = Mpv::new().map_err(|e| PlayerError::Create(format!("{:?}", e)))?;

        if self.verbose_logging {
            let _ = mpv.set_property("msg-level", "all=debug");
        } else {
            let _ = mpv.set_property("msg-level", "all=info");
        }

        if let Ok(version) = mpv.get_property::<String>("mpv-version") {
            info!("{}: MPV version: {}", self.label, version);
        }

        // No window id is set: the engine opens its own floating window when
        // a file loads. The title tells the two windows apart.
        mpv.set_property("title", self.label.as_str())
            .map_err(option_err("title"))?;

        // Hold the last frame instead of tearing the window down at EOF.
        mpv.set_property("keep-open", "yes")
            .map_err(option_err("keep-open"))?;

        mpv.set_property("volume", self.initial_volume as f64)
            .map_err(option_err("volume"))?;

        info!("{}: MPV instance configured", self.label);
        Ok(mpv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_row_disables_subtitles() {
        assert_eq!(sid_value(0), SidValue::Off);
    }

    #[test]
    fn negative_ids_also_disable() {
        assert_eq!(sid_value(-3), SidValue::Off);
    }

    #[test]
    fn positive_ids_select_the_track() {
        assert_eq!(sid_value(2), SidValue::Track(2));
    }
}
