pub mod mpv_player;
pub mod types;

pub use mpv_player::MpvPlayer;
pub use types::{PlayerError, TrackInfo, TrackKind};
