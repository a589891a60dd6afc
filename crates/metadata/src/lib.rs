use std::path::Path;

use lofty::error::LoftyError;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagInfo {
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub track_no: Option<u16>,
    pub disc_no: Option<u16>,
    pub year: Option<i32>,
    pub duration_ms: Option<u32>,
    pub bitrate: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime: Option<String>,
}

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag error: {}", err),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

pub fn read_tags(path: &Path) -> Result<TagInfo, MetadataError> {
    let tagged_file = lofty::read_from_path(path)?;
    let properties = tagged_file.properties();

    let mut info = TagInfo::default();

    let duration_ms = properties.duration().as_millis();
    if duration_ms > 0 {
        let clamped = duration_ms.min(u128::from(u32::MAX)) as u32;
        info.duration_ms = Some(clamped);
    }
    info.bitrate = properties.audio_bitrate().or(properties.overall_bitrate());

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        info.title = tag.get_string(&ItemKey::TrackTitle).and_then(clean_text);
        info.album = tag.get_string(&ItemKey::AlbumTitle).and_then(clean_text);
        let album_artist = tag.get_string(&ItemKey::AlbumArtist).and_then(clean_text);
        let track_artist = tag.get_string(&ItemKey::TrackArtist).and_then(clean_text);
        info.artist = track_artist.clone().or_else(|| album_artist.clone());
        info.album_artist = album_artist.or(track_artist);
        info.track_no = tag
            .get_string(&ItemKey::TrackNumber)
            .and_then(parse_u16);
        info.disc_no = tag
            .get_string(&ItemKey::DiscNumber)
            .and_then(parse_u16);
        info.year = tag.get_string(&ItemKey::Year).and_then(parse_year);
        info.genre = tag.get_string(&ItemKey::Genre).and_then(primary_genre);
    }

    Ok(info)
}

pub fn read_cover(path: &Path) -> Result<Option<CoverArt>, MetadataError> {
    let tagged_file = lofty::read_from_path(path)?;
    let tag = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        Some(tag) => tag,
        None => return Ok(None),
    };

    let picture = match pick_picture(tag.pictures()) {
        Some(picture) => picture,
        None => return Ok(None),
    };

    let data = picture.data().to_vec();
    let mime = cover_mime(picture.mime_type().map(MimeType::as_str), &data);
    Ok(Some(CoverArt { data, mime }))
}

fn clean_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_u16(text: &str) -> Option<u16> {
    let head = text.split('/').next().unwrap_or(text).trim();
    head.parse().ok()
}

fn parse_year(text: &str) -> Option<i32> {
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            if digits.len() == 4 {
                break;
            }
        } else if !digits.is_empty() {
            break;
        }
    }
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Multi-valued genre tags collapse to their first entry.
fn primary_genre(text: &str) -> Option<String> {
    text.split(&[';', ',', '/', '|', '\0'][..])
        .map(str::trim)
        .find(|part| !part.is_empty())
        .map(str::to_string)
}

fn pick_picture(pictures: &[Picture]) -> Option<&Picture> {
    for picture in pictures {
        if picture.pic_type() == PictureType::CoverFront {
            return Some(picture);
        }
    }
    pictures.first()
}

/// Prefers the image type declared in the tag, sniffing the bytes when the
/// tag has none.
fn cover_mime(declared: Option<&str>, data: &[u8]) -> Option<String> {
    match declared.map(|mime| mime.trim().to_ascii_lowercase()) {
        Some(mime) if mime.starts_with("image/") => Some(mime),
        _ => guess_mime(data),
    }
}

pub fn guess_mime(bytes: &[u8]) -> Option<String> {
    let mime = if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.starts_with(b"BM") {
        "image/bmp"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        return None;
    };
    Some(mime.to_string())
}
