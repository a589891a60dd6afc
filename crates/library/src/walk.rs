use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

/// A discovered audio file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    /// Cache key derived from `path`.
    pub key: String,
    pub content_type: String,
}

impl MediaFile {
    pub fn from_path(path: &Path) -> Option<Self> {
        let content_type = audio_content_type(path)?;
        Some(Self {
            path: path.to_path_buf(),
            key: common::path_key(path),
            content_type: content_type.to_string(),
        })
    }
}

/// Content type guessed from the extension, when it classifies as audio.
/// Playlist shortcuts (`audio/x-mpegurl` and friends) are not audio content.
pub fn audio_content_type(path: &Path) -> Option<&'static str> {
    let mime = mime_guess::from_path(path).first_raw()?;
    if mime.starts_with("audio/") && !mime.ends_with("url") {
        Some(mime)
    } else {
        None
    }
}

/// Collects every audio file below `root`. Within a folder, files come
/// before subfolders and both are ordered by name, so a fixed tree always
/// yields the same sequence. Unreadable folders are skipped. Symlinks to
/// files are indexed under the link's path; linked folders are not entered.
pub fn collect_media_files(root: &Path) -> Vec<MediaFile> {
    let mut files = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .sort_by(files_before_folders)
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable path {:?}: {}", err.path(), err);
                skipped += 1;
                continue;
            }
        };
        if !is_file_or_link_to_file(&entry) {
            continue;
        }
        if let Some(file) = MediaFile::from_path(entry.path()) {
            files.push(file);
        }
    }

    if skipped > 0 {
        info!(
            "Found {} audio files under {:?} ({} paths skipped)",
            files.len(),
            root,
            skipped
        );
    } else {
        info!("Found {} audio files under {:?}", files.len(), root);
    }
    files
}

fn is_file_or_link_to_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

fn files_before_folders(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn names(files: &[MediaFile], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| common::path_key(f.path.strip_prefix(root).unwrap()))
            .collect()
    }

    #[test]
    fn audio_classification_excludes_playlists() {
        assert_eq!(audio_content_type(Path::new("a.mp3")), Some("audio/mpeg"));
        assert!(audio_content_type(Path::new("a.MP3")).is_some());
        assert!(audio_content_type(Path::new("list.m3u")).is_none());
        assert!(audio_content_type(Path::new("cover.jpg")).is_none());
        assert!(audio_content_type(Path::new("notes")).is_none());
    }

    #[test]
    fn walk_is_recursive_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.mp3"));
        touch(&root.join("a.mp3"));
        touch(&root.join("cover.jpg"));
        touch(&root.join("Artist/Album/02.mp3"));
        touch(&root.join("Artist/Album/01.mp3"));
        touch(&root.join("Artist/Album/list.m3u"));
        touch(&root.join("Artist/single.mp3"));
        touch(&root.join("Another/x.mp3"));

        let files = collect_media_files(root);
        assert_eq!(
            names(&files, root),
            vec![
                "a.mp3",
                "b.mp3",
                "Another/x.mp3",
                "Artist/single.mp3",
                "Artist/Album/01.mp3",
                "Artist/Album/02.mp3",
            ]
        );
        assert!(files.iter().all(|f| f.content_type.starts_with("audio/")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_files_are_found_but_linked_folders_are_not_entered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("music");
        let elsewhere = dir.path().join("elsewhere");
        touch(&elsewhere.join("real.mp3"));
        touch(&elsewhere.join("inner/deep.mp3"));
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(elsewhere.join("real.mp3"), root.join("linked.mp3")).unwrap();
        std::os::unix::fs::symlink(elsewhere.join("inner"), root.join("inner")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.mp3"), root.join("dangling.mp3")).unwrap();

        let files = collect_media_files(&root);
        assert_eq!(names(&files, &root), vec!["linked.mp3"]);
    }

    #[test]
    fn walk_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["z.mp3", "m/a.mp3", "m/b.mp3", "c.mp3"] {
            touch(&dir.path().join(name));
        }
        assert_eq!(
            collect_media_files(dir.path()),
            collect_media_files(dir.path())
        );
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_media_files(&dir.path().join("absent")).is_empty());
    }
}
