//! Per-file collaborators: tag extraction and album artwork.

use common::{MusicProperties, Thumbnail, ThumbnailKind};
use metadata::{read_cover, read_tags, MetadataError, TagInfo};

use crate::fingerprint::live_fingerprint;
use crate::walk::MediaFile;

pub const DEFAULT_THUMBNAIL_SIZE: u32 = 300;

/// Builds a fresh cache record from a live file.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, file: &MediaFile) -> Result<MusicProperties, MetadataError>;
}

/// Best-effort cover art lookup, called once per newly created album.
pub trait ThumbnailProvider: Send + Sync {
    fn fetch_thumbnail(&self, file: &MediaFile, size_hint: u32)
        -> Result<Thumbnail, MetadataError>;
}

/// Reads embedded tags with lofty.
#[derive(Clone, Copy, Debug, Default)]
pub struct TagExtractor;

impl MetadataExtractor for TagExtractor {
    fn extract(&self, file: &MediaFile) -> Result<MusicProperties, MetadataError> {
        // Fingerprint first: if the file changes while tags are read the
        // next run sees a mismatch and extracts again.
        let fingerprint = live_fingerprint(&file.path)?;
        let tags = read_tags(&file.path)?;
        Ok(properties_from_tags(file.key.clone(), fingerprint, tags))
    }
}

pub fn properties_from_tags(
    path: String,
    fingerprint: common::Fingerprint,
    tags: TagInfo,
) -> MusicProperties {
    MusicProperties {
        path,
        fingerprint,
        title: tags.title.unwrap_or_default(),
        artist: tags.artist.unwrap_or_default(),
        album_artist: tags.album_artist.unwrap_or_default(),
        album: tags.album.unwrap_or_default(),
        genre: tags.genre.unwrap_or_default(),
        duration_ms: tags.duration_ms.unwrap_or(0),
        track_no: tags.track_no,
        disc_no: tags.disc_no,
        year: tags.year,
        bitrate: tags.bitrate,
    }
}

/// Uses the embedded front cover. The size hint is not applied; pictures are
/// returned as stored.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedArtwork;

impl ThumbnailProvider for EmbeddedArtwork {
    fn fetch_thumbnail(
        &self,
        file: &MediaFile,
        _size_hint: u32,
    ) -> Result<Thumbnail, MetadataError> {
        let cover = match read_cover(&file.path)? {
            Some(cover) => cover,
            None => return Ok(Thumbnail::empty()),
        };
        let kind = if cover.mime.is_some() {
            ThumbnailKind::Image
        } else {
            ThumbnailKind::Icon
        };
        Ok(Thumbnail {
            kind,
            data: cover.data,
            mime: cover.mime,
        })
    }
}
