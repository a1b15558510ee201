use crate::api::ApiError;
use crate::api::models::Track;
use crate::export::ExportedImage;
use crate::lyrics::LyricsDocument;
use image::RgbaImage;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    Network(NetworkEvent),
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize,
}

/// An API failure flattened for the UI, tagged with the credential
/// generation the request was sent under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub auth: bool,
    pub generation: u64,
    pub message: String,
}

impl RequestFailure {
    pub fn new(err: &ApiError, generation: u64) -> Self {
        Self {
            auth: err.is_auth(),
            generation,
            message: err.user_message(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NetworkEvent {
    SearchResults { seq: u64, query: String, tracks: Vec<Track> },
    SearchFailed { seq: u64, failure: RequestFailure },
    LyricsLoaded { track_id: String, doc: LyricsDocument },
    LyricsNotFound { track_id: String, message: String },
    LyricsFailed { track_id: String, failure: RequestFailure },
    /// `cover` is `None` when the download or decode failed.
    CoverLoaded { key: u64, cover: Option<Arc<RgbaImage>> },
    ExportFinished { result: Result<ExportedImage, String> },
}
