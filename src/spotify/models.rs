use crate::api::models::Track;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    pub tracks: Paging,
}

#[derive(Debug, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: SpotifyAlbum,
    pub duration_ms: u64,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
}

impl SpotifyAlbum {
    /// Smallest image by width. Images without a width sort last.
    pub fn smallest_image(&self) -> Option<&SpotifyImage> {
        self.images
            .iter()
            .min_by_key(|img| img.width.unwrap_or(u32::MAX))
    }
}

impl From<SpotifyTrack> for Track {
    fn from(t: SpotifyTrack) -> Self {
        let artist = t
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let thumbnail = t.album.smallest_image().map(|img| img.url.clone());
        Track {
            id: t.id,
            title: t.name,
            artist,
            album: t.album.name,
            duration_ms: t.duration_ms,
            thumbnail,
            preview_url: t.preview_url,
        }
    }
}
