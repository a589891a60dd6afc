use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Cheap change detector captured when a file's tags were extracted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch, when the
    /// platform reports one.
    pub modified_ns: Option<i64>,
}

impl Fingerprint {
    /// Exact match on every field. A missing mtime never matches, even when
    /// both sides are missing it.
    pub fn matches(&self, other: &Fingerprint) -> bool {
        match (self.modified_ns, other.modified_ns) {
            (Some(a), Some(b)) => a == b && self.size == other.size,
            _ => false,
        }
    }
}

/// One cache record: everything extracted from a single audio file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicProperties {
    pub path: String,
    pub fingerprint: Fingerprint,
    pub title: String,
    pub artist: String,
    pub album_artist: String,
    pub album: String,
    pub genre: String,
    pub duration_ms: u32,
    pub track_no: Option<u16>,
    pub disc_no: Option<u16>,
    pub year: Option<i32>,
    pub bitrate: Option<u32>,
}

impl MusicProperties {
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenreId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlbumId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongId(pub usize);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub artist_id: ArtistId,
    pub genre_id: GenreId,
    pub thumbnail: Option<Thumbnail>,
    /// Songs in the order they were first seen during the walk.
    pub songs: Vec<SongId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub album_id: AlbumId,
    pub artist_id: ArtistId,
    pub genre_id: GenreId,
    pub properties: MusicProperties,
}

impl Song {
    pub fn title(&self) -> &str {
        &self.properties.title
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailKind {
    Image,
    Icon,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub kind: ThumbnailKind,
    pub data: Vec<u8>,
    pub mime: Option<String>,
}

impl Thumbnail {
    pub fn empty() -> Self {
        Self {
            kind: ThumbnailKind::None,
            data: Vec::new(),
            mime: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == ThumbnailKind::Image && !self.data.is_empty()
    }
}

/// Cache keys use forward slashes regardless of platform.
pub fn path_key(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}
