/// Common types shared by the player wrapper and the track selectors.
use thiserror::Error;

/// Failures from the engine wrapper's fallible paths. The raw engine error
/// codes do not implement the standard error trait, so their debug form is
/// carried as the message.
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("failed to create engine: {0}")]
    Create(String),

    #[error("engine option {name} rejected: {reason}")]
    Option { name: &'static str, reason: String },

    #[error("load command failed: {0}")]
    Load(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Subtitle,
}

impl TrackKind {
    /// Value the engine reports in `track-list/N/type`.
    pub fn engine_type(self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "sub",
        }
    }
}

/// One selectable stream from the engine's track list. The engine owns the
/// truth; instances are rebuilt from `track-list` whenever the selectors
/// are refreshed, never cached across loads.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub id: i64,
    pub kind: TrackKind,
    pub title: Option<String>,
    pub lang: Option<String>,
    pub channels: Option<i64>,
}

impl TrackInfo {
    /// Human-readable row for the drop-downs: the container title when
    /// present, otherwise a numbered fallback with the language tag.
    pub fn label(&self) -> String {
        let noun = match self.kind {
            TrackKind::Audio => "Audio Track",
            TrackKind::Subtitle => "Subtitle",
        };

        let base = match (&self.title, &self.lang) {
            (Some(title), _) => title.clone(),
            (None, Some(lang)) => format!("{} {} ({})", noun, self.id, lang),
            (None, None) => format!("{} {}", noun, self.id),
        };

        match (self.kind, self.channels) {
            (TrackKind::Audio, Some(ch)) if ch > 0 => format!("{} [{}ch]", base, ch),
            _ => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(kind: TrackKind) -> TrackInfo {
        TrackInfo {
            id: 2,
            kind,
            title: None,
            lang: None,
            channels: None,
        }
    }

    #[test]
    fn title_wins_over_fallbacks() {
        let mut t = track(TrackKind::Subtitle);
        t.title = Some("Director's Commentary".to_string());
        t.lang = Some("eng".to_string());
        assert_eq!(t.label(), "Director's Commentary");
    }

    #[test]
    fn language_fallback_when_untitled() {
        let mut t = track(TrackKind::Subtitle);
        t.lang = Some("jpn".to_string());
        assert_eq!(t.label(), "Subtitle 2 (jpn)");
    }

    #[test]
    fn bare_numbered_fallback() {
        assert_eq!(track(TrackKind::Audio).label(), "Audio Track 2");
    }

    #[test]
    fn audio_channel_count_is_appended() {
        let mut t = track(TrackKind::Audio);
        t.lang = Some("eng".to_string());
        t.channels = Some(6);
        assert_eq!(t.label(), "Audio Track 2 (eng) [6ch]");
    }

    #[test]
    fn channel_count_ignored_for_subtitles() {
        let mut t = track(TrackKind::Subtitle);
        t.channels = Some(2);
        assert_eq!(t.label(), "Subtitle 2");
    }

    #[test]
    fn error_messages_name_the_failure() {
        let e = PlayerError::Create("oom".to_string());
        assert_eq!(e.to_string(), "failed to create engine: oom");

        let e = PlayerError::Option {
            name: "keep-open",
            reason: "bad value".to_string(),
        };
        assert_eq!(e.to_string(), "engine option keep-open rejected: bad value");
    }
}
