//! On-disk metadata cache.
//!
//! The cache file is a plain concatenation of bincode-encoded
//! [`MusicProperties`] records. There is no header, count or trailer: the end
//! of the stream is the only terminator, which keeps a partially written file
//! readable up to its last complete record.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bincode::Options;
use common::MusicProperties;
use tracing::{debug, info, warn};

pub const CACHE_FILE_NAME: &str = "MediaLibrary.cache";

/// Upper bound for one encoded record. Anything larger is treated as a
/// corrupt length prefix.
const MAX_RECORD_BYTES: u64 = 1024 * 1024;

#[derive(Debug)]
pub enum CacheError {
    Malformed(Box<bincode::ErrorKind>),
    DuplicateKey(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Malformed(err) => write!(f, "malformed cache entry: {}", err),
            CacheError::DuplicateKey(path) => write!(f, "duplicate cache key: {}", path),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<Box<bincode::ErrorKind>> for CacheError {
    fn from(err: Box<bincode::ErrorKind>) -> Self {
        CacheError::Malformed(err)
    }
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_RECORD_BYTES)
}

/// Appends one record to `writer`.
pub fn write_record<W: Write>(writer: &mut W, record: &MusicProperties) -> io::Result<()> {
    codec()
        .serialize_into(writer, record)
        .map_err(|err| match *err {
            bincode::ErrorKind::Io(io_err) => io_err,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        })
}

/// Whether `record` can be stored. Oversized records are refused on write
/// because the reader would stop at them and drop everything after.
pub fn fits(record: &MusicProperties) -> bool {
    codec().serialized_size(record).is_ok()
}

/// Reads exactly one record. Fails if the stream ends mid-record or the
/// framing is invalid; callers check for a clean end of stream first.
pub fn read_record<R: Read>(reader: &mut R) -> Result<MusicProperties, CacheError> {
    Ok(codec().deserialize_from(reader)?)
}

/// Decodes records until end of stream. The first decode failure or
/// duplicate key ends the read; everything before it is kept.
pub fn read_records<R: Read>(reader: R) -> (HashMap<String, MusicProperties>, Option<CacheError>) {
    let mut reader = BufReader::new(reader);
    let mut entries = HashMap::new();

    loop {
        match reader.fill_buf() {
            Ok(buf) if buf.is_empty() => return (entries, None),
            Ok(_) => {}
            Err(err) => {
                return (
                    entries,
                    Some(CacheError::Malformed(Box::new(bincode::ErrorKind::Io(err)))),
                )
            }
        }

        let record = match read_record(&mut reader) {
            Ok(record) => record,
            Err(err) => return (entries, Some(err)),
        };
        if entries.contains_key(&record.path) {
            return (entries, Some(CacheError::DuplicateKey(record.path)));
        }
        entries.insert(record.path.clone(), record);
    }
}

/// Loads the previous run's cache. A missing, empty, unreadable or corrupt
/// file never fails the caller; at worst the map is empty.
pub fn load_cache(path: &Path) -> HashMap<String, MusicProperties> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("No metadata cache at {:?}", path);
            return HashMap::new();
        }
        Err(err) => {
            warn!("Failed to open metadata cache {:?}: {}", path, err);
            return HashMap::new();
        }
    };

    let (entries, error) = read_records(file);
    if let Some(err) = error {
        warn!(
            "Metadata cache {:?} truncated after {} entries: {}",
            path,
            entries.len(),
            err
        );
    } else {
        info!("Loaded {} cached entries from {:?}", entries.len(), path);
    }
    entries
}

/// Single writer for the cache produced by the current run.
pub struct CacheWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
}

impl CacheWriter {
    /// Truncates `path`. Only call this once the previous cache has been read
    /// to completion.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    pub fn append(&mut self, record: &MusicProperties) -> io::Result<()> {
        write_record(&mut self.writer, record)?;
        self.records += 1;
        Ok(())
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn finish(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(self.records)
    }
}
