use std::fs;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use common::{Fingerprint, MusicProperties};

use crate::walk::MediaFile;

/// Reads size and mtime without touching file contents.
pub fn live_fingerprint(path: &Path) -> io::Result<Fingerprint> {
    let metadata = fs::metadata(path)?;
    let modified_ns = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| i64::try_from(d.as_nanos()).ok());
    Ok(Fingerprint {
        size: metadata.len(),
        modified_ns,
    })
}

/// True only when the live file still carries the fingerprint stored in the
/// cached record. A file that can no longer be stat'ed is never fresh.
pub fn is_fresh(cached: &MusicProperties, file: &MediaFile) -> bool {
    match live_fingerprint(&file.path) {
        Ok(live) => cached.fingerprint.matches(&live),
        Err(_) => false,
    }
}
