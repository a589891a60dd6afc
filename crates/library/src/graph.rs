use std::collections::HashMap;

use common::{
    Album, AlbumId, Artist, ArtistId, Genre, GenreId, MusicProperties, Song, SongId, Thumbnail,
};

use crate::snapshot::LibrarySnapshot;

/// Accumulates the entity graph for one run. Artists, genres and albums are
/// keyed by exact name; the first song naming one creates it.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    artists: Vec<Artist>,
    artists_by_name: HashMap<String, ArtistId>,
    genres: Vec<Genre>,
    genres_by_name: HashMap<String, GenreId>,
    albums: Vec<Album>,
    albums_by_name: HashMap<String, AlbumId>,
    songs: Vec<Song>,
}

/// Returns the id stored under `name`, or stores a new item built by
/// `factory` from its position.
pub fn get_or_create<I: Copy, T>(
    index: &mut HashMap<String, I>,
    items: &mut Vec<T>,
    name: &str,
    factory: impl FnOnce(usize) -> (I, T),
) -> I {
    if let Some(id) = index.get(name) {
        return *id;
    }
    let (id, item) = factory(items.len());
    items.push(item);
    index.insert(name.to_string(), id);
    id
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_album(&self, name: &str) -> bool {
        self.albums_by_name.contains_key(name)
    }

    pub fn artist(&mut self, name: &str) -> ArtistId {
        get_or_create(&mut self.artists_by_name, &mut self.artists, name, |pos| {
            let id = ArtistId(pos);
            (
                id,
                Artist {
                    id,
                    name: name.to_string(),
                },
            )
        })
    }

    pub fn genre(&mut self, name: &str) -> GenreId {
        get_or_create(&mut self.genres_by_name, &mut self.genres, name, |pos| {
            let id = GenreId(pos);
            (
                id,
                Genre {
                    id,
                    name: name.to_string(),
                },
            )
        })
    }

    /// `thumbnail` is only consulted when the album is created here, and is
    /// attached only if it holds an image.
    pub fn album(
        &mut self,
        name: &str,
        artist_id: ArtistId,
        genre_id: GenreId,
        thumbnail: Option<Thumbnail>,
    ) -> AlbumId {
        get_or_create(&mut self.albums_by_name, &mut self.albums, name, |pos| {
            let id = AlbumId(pos);
            (
                id,
                Album {
                    id,
                    name: name.to_string(),
                    artist_id,
                    genre_id,
                    thumbnail: thumbnail.filter(Thumbnail::is_image),
                    songs: Vec::new(),
                },
            )
        })
    }

    /// Links a titled record into the graph.
    pub fn add_song(&mut self, properties: MusicProperties, thumbnail: Option<Thumbnail>) -> SongId {
        let artist_id = self.artist(&properties.artist);
        let album_artist_id = self.artist(&properties.album_artist);
        let genre_id = self.genre(&properties.genre);
        let album_id = self.album(&properties.album, album_artist_id, genre_id, thumbnail);

        let song_id = SongId(self.songs.len());
        self.albums[album_id.0].songs.push(song_id);
        self.songs.push(Song {
            id: song_id,
            album_id,
            artist_id,
            genre_id,
            properties,
        });
        song_id
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn finish(self) -> LibrarySnapshot {
        LibrarySnapshot::new(self.artists, self.genres, self.albums, self.songs)
    }
}
