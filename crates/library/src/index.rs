use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::MusicProperties;
use metadata::MetadataError;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{self, load_cache, CacheWriter, CACHE_FILE_NAME};
use crate::fingerprint::is_fresh;
use crate::graph::GraphBuilder;
use crate::snapshot::{LibrarySnapshot, SnapshotCounts};
use crate::sources::{
    EmbeddedArtwork, MetadataExtractor, TagExtractor, ThumbnailProvider, DEFAULT_THUMBNAIL_SIZE,
};
use crate::walk::{collect_media_files, MediaFile};
use crate::LibraryError;

#[derive(Clone, Debug)]
pub struct IndexerOptions {
    pub cache_path: PathBuf,
    pub thumbnail_size: u32,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            cache_path: env::temp_dir().join(CACHE_FILE_NAME),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

impl IndexerOptions {
    pub fn with_cache_dir(cache_dir: &Path) -> Self {
        Self {
            cache_path: cache_dir.join(CACHE_FILE_NAME),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub discovered: usize,
    pub reused: usize,
    pub extracted: usize,
    pub untitled: usize,
    pub failed: usize,
    pub library: SnapshotCounts,
}

/// Reports whole percentages, each strictly greater than the last.
struct ProgressTracker<'a> {
    total: usize,
    last: u8,
    callback: &'a mut dyn FnMut(u8),
}

impl<'a> ProgressTracker<'a> {
    fn new(total: usize, callback: &'a mut dyn FnMut(u8)) -> Self {
        Self {
            total,
            last: 0,
            callback,
        }
    }

    fn file_done(&mut self, index: usize) {
        if self.total == 0 {
            return;
        }
        let progress = (100 * index / self.total) as u8;
        if progress > self.last {
            self.last = progress;
            (self.callback)(progress);
        }
    }

    fn complete(self) {
        (self.callback)(100);
    }
}

pub struct Indexer {
    options: IndexerOptions,
    extractor: Arc<dyn MetadataExtractor>,
    thumbnails: Arc<dyn ThumbnailProvider>,
}

impl Indexer {
    pub fn new(options: IndexerOptions) -> Self {
        Self::with_sources(options, Arc::new(TagExtractor), Arc::new(EmbeddedArtwork))
    }

    pub fn with_sources(
        options: IndexerOptions,
        extractor: Arc<dyn MetadataExtractor>,
        thumbnails: Arc<dyn ThumbnailProvider>,
    ) -> Self {
        Self {
            options,
            extractor,
            thumbnails,
        }
    }

    pub fn options(&self) -> &IndexerOptions {
        &self.options
    }

    /// Runs one full indexing pass over `root`.
    ///
    /// The previous cache is read to completion before the new one is
    /// created at the same path. Every discovered file whose metadata could
    /// be obtained gets exactly one record in the new cache, whether or not
    /// it ends up in the graph. On cancellation the records written so far
    /// are flushed and no snapshot is produced.
    pub fn build_library(
        &self,
        root: &Path,
        progress: &mut dyn FnMut(u8),
        cancel: &CancellationToken,
    ) -> Result<(LibrarySnapshot, IndexStats), LibraryError> {
        let cache_path = &self.options.cache_path;
        let mut previous = load_cache(cache_path);

        let files = collect_media_files(root);
        let total = files.len();
        if total == 0 {
            info!("No audio files under {:?}", root);
        }

        let mut writer = CacheWriter::create(cache_path)
            .map_err(|source| LibraryError::indexing_failed(cache_path, source))?;
        let mut graph = GraphBuilder::new();
        let mut stats = IndexStats {
            discovered: total,
            ..IndexStats::default()
        };
        let mut tracker = ProgressTracker::new(total, progress);

        for (index, file) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                let written = writer
                    .finish()
                    .map_err(|source| LibraryError::indexing_failed(cache_path, source))?;
                info!("Indexing cancelled after {} of {} files", written, total);
                return Err(LibraryError::Cancelled);
            }

            let properties = match previous.remove(&file.key) {
                Some(cached) if is_fresh(&cached, file) => {
                    stats.reused += 1;
                    cached
                }
                _ => match self.extractor.extract(file) {
                    Ok(properties) => {
                        stats.extracted += 1;
                        properties
                    }
                    Err(err) => {
                        warn!("Failed to read tags for {:?}: {}", file.path, err);
                        stats.failed += 1;
                        tracker.file_done(index);
                        continue;
                    }
                },
            };

            if !cache::fits(&properties) {
                warn!("Metadata for {:?} is too large to cache", file.path);
                stats.failed += 1;
                tracker.file_done(index);
                continue;
            }

            writer
                .append(&properties)
                .map_err(|source| LibraryError::indexing_failed(cache_path, source))?;

            if !properties.has_title() {
                debug!("Skipping untitled track {:?}", file.path);
                stats.untitled += 1;
            } else if let Err(err) = self.link(&mut graph, file, properties) {
                warn!("Failed to index {:?}: {}", file.path, err);
                stats.failed += 1;
            }

            tracker.file_done(index);
        }

        writer
            .finish()
            .map_err(|source| LibraryError::indexing_failed(cache_path, source))?;
        tracker.complete();

        let snapshot = graph.finish();
        stats.library = snapshot.counts();
        Ok((snapshot, stats))
    }

    /// Artwork is fetched before touching the graph so a failure leaves no
    /// half-linked entities behind.
    fn link(
        &self,
        graph: &mut GraphBuilder,
        file: &MediaFile,
        properties: MusicProperties,
    ) -> Result<(), MetadataError> {
        let thumbnail = if graph.has_album(&properties.album) {
            None
        } else {
            Some(
                self.thumbnails
                    .fetch_thumbnail(file, self.options.thumbnail_size)?,
            )
        };
        graph.add_song(properties, thumbnail);
        Ok(())
    }
}
