use std::sync::Arc;

use common::{Album, AlbumId, Artist, ArtistId, Genre, GenreId, Song, SongId};
use serde::Serialize;

/// Immutable result of one completed indexing run.
#[derive(Clone, Debug, Default)]
pub struct LibrarySnapshot {
    artists: Vec<Artist>,
    genres: Vec<Genre>,
    albums: Vec<Album>,
    songs: Vec<Song>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotCounts {
    pub artists: usize,
    pub genres: usize,
    pub albums: usize,
    pub songs: usize,
}

impl LibrarySnapshot {
    pub fn new(artists: Vec<Artist>, genres: Vec<Genre>, albums: Vec<Album>, songs: Vec<Song>) -> Self {
        Self {
            artists,
            genres,
            albums,
            songs,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn artist(&self, id: ArtistId) -> Option<&Artist> {
        self.artists.get(id.0)
    }

    pub fn genre(&self, id: GenreId) -> Option<&Genre> {
        self.genres.get(id.0)
    }

    pub fn album(&self, id: AlbumId) -> Option<&Album> {
        self.albums.get(id.0)
    }

    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.songs.get(id.0)
    }

    pub fn album_by_name(&self, name: &str) -> Option<&Album> {
        self.albums.iter().find(|album| album.name == name)
    }

    /// Songs of `album` in the order they were indexed.
    pub fn album_songs<'a>(&'a self, album: &'a Album) -> impl Iterator<Item = &'a Song> + 'a {
        album.songs.iter().filter_map(move |id| self.song(*id))
    }

    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            artists: self.artists.len(),
            genres: self.genres.len(),
            albums: self.albums.len(),
            songs: self.songs.len(),
        }
    }
}

/// Albums of one published snapshot. Holding a collection keeps its snapshot
/// alive even after a newer one is published.
#[derive(Clone, Debug)]
pub struct AlbumCollection {
    snapshot: Arc<LibrarySnapshot>,
}

impl AlbumCollection {
    pub fn new(snapshot: Arc<LibrarySnapshot>) -> Self {
        Self { snapshot }
    }

    pub fn len(&self) -> usize {
        self.snapshot.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.albums.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Album> {
        self.snapshot.albums.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Album> {
        self.snapshot.albums.iter()
    }

    pub fn snapshot(&self) -> &LibrarySnapshot {
        &self.snapshot
    }
}

#[derive(Clone, Debug)]
pub struct SongCollection {
    snapshot: Arc<LibrarySnapshot>,
}

impl SongCollection {
    pub fn new(snapshot: Arc<LibrarySnapshot>) -> Self {
        Self { snapshot }
    }

    pub fn len(&self) -> usize {
        self.snapshot.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.songs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.snapshot.songs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Song> {
        self.snapshot.songs.iter()
    }

    pub fn snapshot(&self) -> &LibrarySnapshot {
        &self.snapshot
    }
}
