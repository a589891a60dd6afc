//! Fakes for the per-file collaborators. Track files hold `key=value` lines
//! instead of real audio so tests can control every tag.

use std::fs;
use std::path::{Path, PathBuf};

use common::{MusicProperties, Thumbnail, ThumbnailKind};
use metadata::MetadataError;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::fingerprint::live_fingerprint;
use crate::sources::{MetadataExtractor, ThumbnailProvider};
use crate::walk::MediaFile;

pub fn write_track(root: &Path, relpath: &str, title: &str, album: &str) -> PathBuf {
    write_tagged(
        root,
        relpath,
        &[
            ("title", title),
            ("artist", "Artist"),
            ("album", album),
            ("genre", "Genre"),
        ],
    )
}

pub fn write_tagged(root: &Path, relpath: &str, tags: &[(&str, &str)]) -> PathBuf {
    let path = root.join(relpath);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut contents = String::new();
    for (key, value) in tags {
        contents.push_str(key);
        contents.push('=');
        contents.push_str(value);
        contents.push('\n');
    }
    fs::write(&path, contents).unwrap();
    path
}

#[derive(Default)]
pub struct FakeExtractor {
    calls: Mutex<Vec<String>>,
    cancel_on: Mutex<Option<(usize, CancellationToken)>>,
}

impl FakeExtractor {
    /// Cancels `token` while serving the `call`-th extraction (1-based).
    pub fn cancel_on_call(&self, call: usize, token: CancellationToken) {
        *self.cancel_on.lock() = Some((call, token));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl MetadataExtractor for FakeExtractor {
    fn extract(&self, file: &MediaFile) -> Result<MusicProperties, MetadataError> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push(file.key.clone());
            calls.len()
        };
        if let Some((at, token)) = self.cancel_on.lock().as_ref() {
            if *at == call {
                token.cancel();
            }
        }
        let fingerprint = live_fingerprint(&file.path)?;
        let contents = fs::read_to_string(&file.path)?;

        let mut props = MusicProperties {
            path: file.key.clone(),
            fingerprint,
            title: String::new(),
            artist: String::new(),
            album_artist: String::new(),
            album: String::new(),
            genre: String::new(),
            duration_ms: 0,
            track_no: None,
            disc_no: None,
            year: None,
            bitrate: None,
        };
        for line in contents.lines() {
            let (key, value) = match line.split_once('=') {
                Some(pair) => pair,
                None => continue,
            };
            match key {
                "fail" => {
                    return Err(MetadataError::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        value.to_string(),
                    )))
                }
                "title" => props.title = value.to_string(),
                "artist" => {
                    props.artist = value.to_string();
                    if props.album_artist.is_empty() {
                        props.album_artist = value.to_string();
                    }
                }
                "album_artist" => props.album_artist = value.to_string(),
                "album" => props.album = value.to_string(),
                "genre" => props.genre = value.to_string(),
                "track" => props.track_no = value.parse().ok(),
                _ => {}
            }
        }
        Ok(props)
    }
}

/// Returns a JPEG-typed thumbnail, fails for files tagged `art=broken`, and
/// returns an icon for `art=icon`.
#[derive(Default)]
pub struct FakeArtwork {
    calls: Mutex<Vec<String>>,
}

impl FakeArtwork {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl ThumbnailProvider for FakeArtwork {
    fn fetch_thumbnail(
        &self,
        file: &MediaFile,
        _size_hint: u32,
    ) -> Result<Thumbnail, MetadataError> {
        self.calls.lock().push(file.key.clone());
        let contents = fs::read_to_string(&file.path)?;
        if contents.lines().any(|line| line == "art=broken") {
            return Err(MetadataError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "artwork unavailable",
            )));
        }
        if contents.lines().any(|line| line == "art=icon") {
            return Ok(Thumbnail {
                kind: ThumbnailKind::Icon,
                data: vec![1, 2, 3],
                mime: None,
            });
        }
        Ok(Thumbnail {
            kind: ThumbnailKind::Image,
            data: vec![0xFF, 0xD8, 0xFF, 0xE0],
            mime: Some("image/jpeg".to_string()),
        })
    }
}
