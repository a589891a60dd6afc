pub mod cache;
pub mod fingerprint;
pub mod graph;
pub mod index;
pub mod snapshot;
pub mod sources;
pub mod walk;

#[cfg(test)]
mod testing;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

pub use common::{Album, Artist, Genre, MusicProperties, Song, Thumbnail, ThumbnailKind};
pub use index::{IndexStats, Indexer, IndexerOptions};
pub use snapshot::{AlbumCollection, LibrarySnapshot, SnapshotCounts, SongCollection};
pub use sources::{EmbeddedArtwork, MetadataExtractor, TagExtractor, ThumbnailProvider};
pub use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    Finalizing,
    Published,
}

#[derive(Debug)]
pub enum LibraryError {
    IndexingFailed { path: PathBuf, source: io::Error },
    Cancelled,
}

impl LibraryError {
    pub(crate) fn indexing_failed(path: &Path, source: io::Error) -> Self {
        LibraryError::IndexingFailed {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::IndexingFailed { path, source } => {
                write!(f, "indexing failed writing {:?}: {}", path, source)
            }
            LibraryError::Cancelled => write!(f, "indexing cancelled"),
        }
    }
}

impl std::error::Error for LibraryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LibraryError::IndexingFailed { source, .. } => Some(source),
            LibraryError::Cancelled => None,
        }
    }
}

/// Media library for one music folder. Each `load` rebuilds the whole
/// library; readers keep seeing the previous snapshot until the new one is
/// complete.
pub struct MediaLibrary {
    root: PathBuf,
    indexer: Indexer,
    snapshot: RwLock<Arc<LibrarySnapshot>>,
    state: RwLock<RunState>,
    run_lock: Mutex<()>,
}

impl MediaLibrary {
    pub fn new(root: PathBuf, options: IndexerOptions) -> Self {
        Self::with_indexer(root, Indexer::new(options))
    }

    pub fn with_indexer(root: PathBuf, indexer: Indexer) -> Self {
        Self {
            root,
            indexer,
            snapshot: RwLock::new(Arc::new(LibrarySnapshot::empty())),
            state: RwLock::new(RunState::Idle),
            run_lock: Mutex::new(()),
        }
    }

    /// Blocks until the rebuild finishes. `progress` receives strictly
    /// increasing percentages and always ends with 100.
    pub fn load(&self, progress: impl FnMut(u8)) -> Result<IndexStats, LibraryError> {
        self.load_with_cancel(progress, &CancellationToken::new())
    }

    pub fn load_with_cancel(
        &self,
        mut progress: impl FnMut(u8),
        cancel: &CancellationToken,
    ) -> Result<IndexStats, LibraryError> {
        let _run = self.run_lock.lock();
        *self.state.write() = RunState::Scanning;

        let (snapshot, stats) = match self.indexer.build_library(&self.root, &mut progress, cancel)
        {
            Ok(result) => result,
            Err(err) => {
                warn!("Library load failed: {}", err);
                *self.state.write() = RunState::Idle;
                return Err(err);
            }
        };

        *self.state.write() = RunState::Finalizing;
        *self.snapshot.write() = Arc::new(snapshot);
        *self.state.write() = RunState::Published;

        info!(
            "Library ready: {} songs, {} albums, {} artists, {} genres ({} reused, {} extracted, {} failed)",
            stats.library.songs,
            stats.library.albums,
            stats.library.artists,
            stats.library.genres,
            stats.reused,
            stats.extracted,
            stats.failed
        );
        Ok(stats)
    }

    pub fn snapshot(&self) -> Arc<LibrarySnapshot> {
        self.snapshot.read().clone()
    }

    pub fn albums(&self) -> AlbumCollection {
        AlbumCollection::new(self.snapshot())
    }

    pub fn songs(&self) -> SongCollection {
        SongCollection::new(self.snapshot())
    }

    pub fn state(&self) -> RunState {
        *self.state.read()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_path(&self) -> &Path {
        &self.indexer.options().cache_path
    }

    /// Drops the published snapshot. Collections handed out earlier stay
    /// valid.
    pub fn dispose(&self) {
        let _run = self.run_lock.lock();
        *self.snapshot.write() = Arc::new(LibrarySnapshot::empty());
        *self.state.write() = RunState::Idle;
    }
}
