use gtk4::{self, gio, glib, prelude::*};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::constants::{
    SEEK_STEP_LONG_SECS, SEEK_STEP_SHORT_SECS, SUBTITLE_FILE_PATTERNS, TRACK_REFRESH_DELAY_MS,
    VIDEO_FILE_PATTERNS,
};
use crate::player::{MpvPlayer, TrackInfo};

const TIME_PLACEHOLDER: &str = "--:--:-- / --:--:--";

/// Suspend/resume bookkeeping for the progress poll, kept apart from the
/// timer machinery so a transition (load/close/shutdown) can take the tick
/// down and a redundant start stays a no-op.
struct PollState<T> {
    timer: RefCell<Option<T>>,
}

impl<T> PollState<T> {
    fn new() -> Self {
        Self {
            timer: RefCell::new(None),
        }
    }

    /// Install a timer unless one is already running; the factory is only
    /// invoked when a new timer is actually needed.
    fn start_with(&self, make_timer: impl FnOnce() -> T) -> bool {
        let mut timer = self.timer.borrow_mut();
        if timer.is_some() {
            return false;
        }
        *timer = Some(make_timer());
        true
    }

    /// Take the running timer for removal; None when already suspended.
    fn suspend(&self) -> Option<T> {
        self.timer.borrow_mut().take()
    }

    #[allow(dead_code)]
    fn is_running(&self) -> bool {
        self.timer.borrow().is_some()
    }
}

struct PaneInner {
    widget: gtk4::Box,
    player: MpvPlayer,
    status_label: gtk4::Label,
    time_label: gtk4::Label,
    subtitle_dropdown: gtk4::DropDown,
    audio_dropdown: gtk4::DropDown,
    // Engine track ids aligned with the drop-down rows.
    subtitle_ids: RefCell<Vec<i64>>,
    audio_ids: RefCell<Vec<i64>>,
    // Set while the drop-downs are repopulated programmatically, so model
    // swaps do not fire selection commands at the engine.
    updating_tracks: Cell<bool>,
    volume_scale: gtk4::Scale,
    poll: PollState<glib::SourceId>,
    poll_interval: Duration,
}

/// One control pane: status and time readout, transport buttons, volume and
/// track selectors, all forwarding to this pane's engine instance. The video
/// itself lives in the engine's own floating window.
#[derive(Clone)]
pub struct PlayerPane {
    inner: Rc<PaneInner>,
}

impl PlayerPane {
    pub fn new(title: &str, config: &Config) -> Self {
        let player = MpvPlayer::new(title, config);

        let widget = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Vertical)
            .spacing(8)
            .margin_top(12)
            .margin_bottom(12)
            .margin_start(12)
            .margin_end(12)
            .hexpand(true)
            .build();
        widget.add_css_class("player-pane");

        let header = gtk4::Label::new(Some(title));
        header.add_css_class("title-4");
        widget.append(&header);

        // Info card: loaded file name plus the polled time readout
        let info_box = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Vertical)
            .spacing(4)
            .margin_top(8)
            .margin_bottom(8)
            .margin_start(8)
            .margin_end(8)
            .build();
        info_box.add_css_class("card");

        let status_label = gtk4::Label::new(Some("Ready"));
        status_label.add_css_class("heading");
        status_label.set_ellipsize(gtk4::pango::EllipsizeMode::Middle);
        info_box.append(&status_label);

        let time_label = gtk4::Label::new(Some(TIME_PLACEHOLDER));
        time_label.add_css_class("monospace");
        time_label.add_css_class("accent");
        info_box.append(&time_label);

        widget.append(&info_box);

        // Seek row
        let seek_row = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(4)
            .homogeneous(true)
            .build();
        let seek_buttons: Vec<(gtk4::Button, f64)> = seek_steps()
            .iter()
            .map(|&(label, offset)| {
                let button = gtk4::Button::with_label(label);
                seek_row.append(&button);
                (button, offset)
            })
            .collect();
        widget.append(&seek_row);

        // Transport row
        let controls_row = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(4)
            .homogeneous(true)
            .build();

        let load_button = gtk4::Button::with_label("Load");
        load_button.add_css_class("suggested-action");
        controls_row.append(&load_button);

        let close_button = gtk4::Button::with_label("Close");
        close_button.add_css_class("destructive-action");
        controls_row.append(&close_button);

        let play_button = gtk4::Button::with_label("Play");
        controls_row.append(&play_button);

        widget.append(&controls_row);

        // Volume row
        let volume_row = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(8)
            .build();
        volume_row.append(&gtk4::Label::new(Some("Vol:")));

        let volume_scale =
            gtk4::Scale::with_range(gtk4::Orientation::Horizontal, 0.0, 100.0, 1.0);
        volume_scale.set_value(config.playback.default_volume as f64);
        volume_scale.set_draw_value(false);
        volume_scale.set_hexpand(true);
        volume_row.append(&volume_scale);

        widget.append(&volume_row);

        // Track selectors
        let subtitle_row = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(8)
            .build();
        subtitle_row.append(&gtk4::Label::new(Some("Subs:")));

        let subtitle_dropdown = gtk4::DropDown::from_strings(&["Off"]);
        subtitle_dropdown.set_hexpand(true);
        subtitle_row.append(&subtitle_dropdown);

        let load_subs_button = gtk4::Button::with_label("Load Subs");
        load_subs_button.set_tooltip_text(Some("Load external subtitle file"));
        subtitle_row.append(&load_subs_button);

        widget.append(&subtitle_row);

        let audio_row = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Horizontal)
            .spacing(8)
            .build();
        audio_row.append(&gtk4::Label::new(Some("Audio:")));

        let audio_dropdown = gtk4::DropDown::from_strings(&[]);
        audio_dropdown.set_hexpand(true);
        audio_dropdown.set_sensitive(false);
        audio_row.append(&audio_dropdown);

        widget.append(&audio_row);

        let pane = Self {
            inner: Rc::new(PaneInner {
                widget,
                player,
                status_label,
                time_label,
                subtitle_dropdown: subtitle_dropdown.clone(),
                audio_dropdown: audio_dropdown.clone(),
                subtitle_ids: RefCell::new(vec![0]),
                audio_ids: RefCell::new(Vec::new()),
                updating_tracks: Cell::new(false),
                volume_scale: volume_scale.clone(),
                poll: PollState::new(),
                poll_interval: Duration::from_millis(config.playback.poll_interval_ms),
            }),
        };

        // Wiring
        for (button, offset) in seek_buttons {
            let pane_seek = pane.clone();
            button.connect_clicked(move |_| pane_seek.seek(offset));
        }

        let pane_load = pane.clone();
        load_button.connect_clicked(move |button| {
            pane_load.open_load_dialog(button);
        });

        let pane_close = pane.clone();
        close_button.connect_clicked(move |_| pane_close.close_video());

        let pane_play = pane.clone();
        play_button.connect_clicked(move |_| pane_play.inner.player.toggle_pause());

        let pane_volume = pane.clone();
        volume_scale.connect_value_changed(move |scale| {
            pane_volume.inner.player.set_volume(scale.value() as i64);
        });

        let pane_subs = pane.clone();
        subtitle_dropdown.connect_selected_notify(move |dropdown| {
            if pane_subs.inner.updating_tracks.get() {
                return;
            }
            let index = dropdown.selected() as usize;
            if let Some(&track_id) = pane_subs.inner.subtitle_ids.borrow().get(index) {
                debug!("Subtitle selection changed to track {}", track_id);
                pane_subs.inner.player.select_subtitle(track_id);
            }
        });

        let pane_audio = pane.clone();
        audio_dropdown.connect_selected_notify(move |dropdown| {
            if pane_audio.inner.updating_tracks.get() {
                return;
            }
            let index = dropdown.selected() as usize;
            if let Some(&track_id) = pane_audio.inner.audio_ids.borrow().get(index) {
                debug!("Audio selection changed to track {}", track_id);
                pane_audio.inner.player.select_audio(track_id);
            }
        });

        let pane_ext_subs = pane.clone();
        load_subs_button.connect_clicked(move |button| {
            pane_ext_subs.open_subtitle_dialog(button);
        });

        pane
    }

    pub fn widget(&self) -> &gtk4::Box {
        &self.inner.widget
    }

    pub fn player(&self) -> &MpvPlayer {
        &self.inner.player
    }

    pub fn load_video(&self, path: &Path) {
        // Suspend polling so no property query races the pending load.
        self.stop_poll();

        let Some(path_str) = path.to_str() else {
            error!("Media path is not valid UTF-8: {:?}", path);
            self.start_poll();
            return;
        };

        match self.inner.player.load(path_str) {
            Ok(()) => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(path_str);
                self.inner.status_label.set_text(name);
                // A fresh engine starts at the configured default volume;
                // re-apply the slider so a pre-load adjustment is not lost.
                self.inner
                    .player
                    .set_volume(self.inner.volume_scale.value() as i64);
            }
            Err(e) => {
                error!("Failed to load {:?}: {}", path, e);
                self.inner.status_label.set_text("Load failed");
            }
        }

        self.start_poll();

        // The engine reports tracks only once demuxing has started, so
        // refresh now and once more shortly after the load.
        self.refresh_tracks();
        let pane = self.clone();
        glib::timeout_add_local_once(Duration::from_millis(TRACK_REFRESH_DELAY_MS), move || {
            pane.refresh_tracks();
        });
    }

    /// Unload the file but keep the engine alive for the next load.
    pub fn close_video(&self) {
        self.stop_poll();
        self.inner.player.unload();
        self.inner.status_label.set_text("Ready");
        self.inner.time_label.set_text(TIME_PLACEHOLDER);
        self.clear_tracks();
        self.start_poll();
    }

    /// Release this pane's engine entirely. Called for both panes when the
    /// window closes, regardless of which was interacted with last.
    pub fn shutdown(&self) {
        self.stop_poll();
        self.inner.player.shutdown();
        self.inner.status_label.set_text("Player Closed");
        self.inner.time_label.set_text("--:--:--");
        self.clear_tracks();
    }

    pub fn seek(&self, seconds: f64) {
        self.inner.player.seek(seconds);
        // Reflect the jump immediately instead of waiting for the next tick.
        self.refresh_time_label();
    }

    fn open_load_dialog(&self, parent: &impl IsA<gtk4::Widget>) {
        let filter = gtk4::FileFilter::new();
        filter.set_name(Some("Videos"));
        for pattern in VIDEO_FILE_PATTERNS {
            filter.add_pattern(pattern);
        }
        let filters = gio::ListStore::new::<gtk4::FileFilter>();
        filters.append(&filter);

        let dialog = gtk4::FileDialog::builder()
            .title("Select Video")
            .modal(true)
            .build();
        dialog.set_filters(Some(&filters));

        let window = parent
            .as_ref()
            .root()
            .and_then(|r| r.downcast::<gtk4::Window>().ok());
        let pane = self.clone();
        dialog.open(window.as_ref(), gio::Cancellable::NONE, move |result| {
            if let Ok(file) = result
                && let Some(path) = file.path()
            {
                info!("Selected video: {:?}", path);
                pane.load_video(&path);
            }
        });
    }

    fn open_subtitle_dialog(&self, parent: &impl IsA<gtk4::Widget>) {
        let filter = gtk4::FileFilter::new();
        filter.set_name(Some("Subtitles"));
        for pattern in SUBTITLE_FILE_PATTERNS {
            filter.add_pattern(pattern);
        }
        let filters = gio::ListStore::new::<gtk4::FileFilter>();
        filters.append(&filter);

        let dialog = gtk4::FileDialog::builder()
            .title("Select Subtitle File")
            .modal(true)
            .build();
        dialog.set_filters(Some(&filters));

        let window = parent
            .as_ref()
            .root()
            .and_then(|r| r.downcast::<gtk4::Window>().ok());
        let pane = self.clone();
        dialog.open(window.as_ref(), gio::Cancellable::NONE, move |result| {
            if let Ok(file) = result
                && let Some(path) = file.path()
                && let Some(path_str) = path.to_str()
            {
                pane.inner.player.add_subtitle_file(path_str);
                pane.refresh_tracks();
            }
        });
    }

    fn start_poll(&self) {
        let pane = self.clone();
        let interval = self.inner.poll_interval;
        self.inner.poll.start_with(|| {
            glib::timeout_add_local(interval, move || {
                pane.refresh_time_label();
                glib::ControlFlow::Continue
            })
        });
    }

    fn stop_poll(&self) {
        if let Some(timer_id) = self.inner.poll.suspend() {
            timer_id.remove();
        }
    }

    fn refresh_time_label(&self) {
        // A failed query (nothing loaded, or the user closed the floating
        // window) leaves the label at its last value.
        if let Some(position) = self.inner.player.position() {
            let duration = self.inner.player.duration().unwrap_or(0.0);
            self.inner.time_label.set_text(&format!(
                "{} / {}",
                format_time(position),
                format_time(duration)
            ));
        }
    }

    fn refresh_tracks(&self) {
        let inner = &self.inner;
        inner.updating_tracks.set(true);

        let (labels, ids) = track_rows(&inner.player.subtitle_tracks(), true);
        set_dropdown_rows(&inner.subtitle_dropdown, &labels);
        let current = inner.player.current_subtitle().unwrap_or(0);
        let selected = ids.iter().position(|&id| id == current).unwrap_or(0);
        inner.subtitle_dropdown.set_selected(selected as u32);
        inner.subtitle_ids.replace(ids);

        let (labels, ids) = track_rows(&inner.player.audio_tracks(), false);
        inner.audio_dropdown.set_sensitive(!ids.is_empty());
        set_dropdown_rows(&inner.audio_dropdown, &labels);
        if let Some(current) = inner.player.current_audio()
            && let Some(selected) = ids.iter().position(|&id| id == current)
        {
            inner.audio_dropdown.set_selected(selected as u32);
        }
        inner.audio_ids.replace(ids);

        inner.updating_tracks.set(false);
    }

    fn clear_tracks(&self) {
        let inner = &self.inner;
        inner.updating_tracks.set(true);

        set_dropdown_rows(&inner.subtitle_dropdown, &["Off".to_string()]);
        inner.subtitle_dropdown.set_selected(0);
        inner.subtitle_ids.replace(vec![0]);

        set_dropdown_rows(&inner.audio_dropdown, &[]);
        inner.audio_dropdown.set_sensitive(false);
        inner.audio_ids.replace(Vec::new());

        inner.updating_tracks.set(false);
    }
}

fn set_dropdown_rows(dropdown: &gtk4::DropDown, labels: &[String]) {
    let refs: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
    dropdown.set_model(Some(&gtk4::StringList::new(&refs)));
}

/// Seek button labels and their relative offsets in pane order.
fn seek_steps() -> [(&'static str, f64); 4] {
    [
        ("<< 1m", -SEEK_STEP_LONG_SECS),
        ("< 10s", -SEEK_STEP_SHORT_SECS),
        ("10s >", SEEK_STEP_SHORT_SECS),
        ("1m >>", SEEK_STEP_LONG_SECS),
    ]
}

/// Drop-down rows for a track list. Subtitle selectors get a synthetic
/// "Off" row (track id 0) ahead of the real tracks; selecting it disables
/// subtitles.
fn track_rows(tracks: &[TrackInfo], with_off_row: bool) -> (Vec<String>, Vec<i64>) {
    let mut labels = Vec::with_capacity(tracks.len() + 1);
    let mut ids = Vec::with_capacity(tracks.len() + 1);

    if with_off_row {
        labels.push("Off".to_string());
        ids.push(0);
    }

    for track in tracks {
        labels.push(track.label());
        ids.push(track.id);
    }

    (labels, ids)
}

/// Zero-padded `HH:mm:ss`; negative input clamps to zero.
pub(crate) fn format_time(total_seconds: f64) -> String {
    let total = total_seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::TrackKind;

    fn track(id: i64, kind: TrackKind, lang: &str) -> TrackInfo {
        TrackInfo {
            id,
            kind,
            title: None,
            lang: Some(lang.to_string()),
            channels: None,
        }
    }

    #[test]
    fn negative_time_clamps_to_zero() {
        assert_eq!(format_time(-5.0), "00:00:00");
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_time(3661.0), "01:01:01");
    }

    #[test]
    fn fractional_seconds_truncate() {
        assert_eq!(format_time(59.9), "00:00:59");
    }

    #[test]
    fn rolls_past_24_hours_without_wrapping() {
        assert_eq!(format_time(90000.0), "25:00:00");
    }

    #[test]
    fn subtitle_rows_start_with_off() {
        let tracks = [
            track(1, TrackKind::Subtitle, "eng"),
            track(2, TrackKind::Subtitle, "jpn"),
        ];
        let (labels, ids) = track_rows(&tracks, true);
        assert_eq!(labels[0], "Off");
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(labels.len(), ids.len());
    }

    #[test]
    fn empty_subtitle_list_keeps_only_off() {
        let (labels, ids) = track_rows(&[], true);
        assert_eq!(labels, vec!["Off".to_string()]);
        assert_eq!(ids, vec![0]);
    }

    #[test]
    fn audio_rows_have_no_off_entry() {
        let tracks = [track(1, TrackKind::Audio, "eng")];
        let (labels, ids) = track_rows(&tracks, false);
        assert_eq!(labels, vec!["Audio Track 1 (eng)".to_string()]);
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn seek_steps_are_symmetric() {
        let steps = seek_steps();
        assert_eq!(steps[0].1, -steps[3].1);
        assert_eq!(steps[1].1, -steps[2].1);
        assert!(steps[1].1 < 0.0 && steps[2].1 > 0.0);
    }

    #[test]
    fn poll_starts_only_one_timer() {
        let poll = PollState::new();
        assert!(poll.start_with(|| 1u32));

        let mut second_created = false;
        assert!(!poll.start_with(|| {
            second_created = true;
            2u32
        }));
        assert!(!second_created);
        assert!(poll.is_running());
    }

    #[test]
    fn suspend_halts_polling_and_is_idempotent() {
        let poll = PollState::new();
        poll.start_with(|| 7u32);

        assert_eq!(poll.suspend(), Some(7));
        assert!(!poll.is_running());
        assert_eq!(poll.suspend(), None);
    }

    #[test]
    fn transition_suspends_then_resumes_polling() {
        // Mirrors the load/close path: take the tick down, transition,
        // then install a fresh timer.
        let poll = PollState::new();
        poll.start_with(|| 1u32);

        assert!(poll.suspend().is_some());
        assert!(!poll.is_running());

        assert!(poll.start_with(|| 2u32));
        assert!(poll.is_running());
    }
}
