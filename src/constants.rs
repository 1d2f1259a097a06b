// Transport and UI timing constants in one place for easy tuning.

// === Progress polling ===
// How often each pane re-queries time-pos/duration from its engine. The
// engine has no push notification for progress, so the label is poll-driven.
pub const PROGRESS_POLL_INTERVAL_MS: u64 = 500;

// Track lists are only populated once the demuxer has opened the file, so
// the drop-downs get a second refresh this long after a load.
pub const TRACK_REFRESH_DELAY_MS: u64 = 1000;

// === Relative seek steps (seconds) ===
pub const SEEK_STEP_SHORT_SECS: f64 = 10.0;
pub const SEEK_STEP_LONG_SECS: f64 = 60.0;

// === File dialog patterns ===
pub const VIDEO_FILE_PATTERNS: &[&str] = &["*.mp4", "*.mkv", "*.avi", "*.mov", "*.webm"];
pub const SUBTITLE_FILE_PATTERNS: &[&str] = &["*.srt", "*.ass", "*.ssa", "*.sub", "*.vtt"];
