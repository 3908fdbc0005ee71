//! The filesystem facade: path resolution and the tree operations.

use tracing::debug;

use crate::config::{CaseSensitivity, FsConfig};
use crate::error::{FsError, FsResult};
use crate::tree::{Directory, Entry, EntryKind, FileNode, ROOT_NAME};
use crate::types::{Attributes, DirEntryInfo, EntryView};

/// An in-memory filesystem: one root directory plus its configuration.
///
/// All operations resolve an absolute, `/`-separated path from the root on
/// every call; there is no handle state between calls. `.` and `..` are
/// ordinary literal names. The core holds no lock of its own. Callers that
/// share a `MemFs` across threads wrap it in a single reader-writer lock,
/// acquired shared for the `&self` operations and exclusive for the
/// `&mut self` ones, held for the whole call.
pub struct MemFs {
    config: FsConfig,
    root: Directory,
}

impl MemFs {
    /// An empty filesystem: a root directory with no entries.
    pub fn new(config: FsConfig) -> Self {
        Self {
            config,
            root: Directory::new(),
        }
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// The root directory. It is unnamed and can never be removed.
    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Non-empty path segments, in order. `/`, `//`, and trailing slashes
    /// all collapse to "no further segment".
    fn segments(path: &str) -> Vec<&str> {
        path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Look up the entry at `path`.
    ///
    /// The literal root resolves to a synthetic folder view named `/`.
    /// A missing segment fails with [`FsError::NotFound`], and so does a
    /// non-folder met before the final segment. The walk never backtracks.
    pub fn get_entry(&self, path: &str) -> FsResult<EntryView<'_>> {
        let segments = Self::segments(path);
        let Some((name, parents)) = segments.split_last() else {
            return Ok(EntryView::Folder {
                name: ROOT_NAME,
                dir: &self.root,
            });
        };
        let dir = descend(&self.root, self.config.case_sensitivity, parents)?;
        let entry = dir
            .find(name, self.config.case_sensitivity)
            .ok_or(FsError::NotFound)?;
        Ok(EntryView::from_entry(entry))
    }

    /// Kind and size of the entry at `path`, for stat-style callers.
    pub fn attributes(&self, path: &str) -> FsResult<Attributes> {
        let view = self.get_entry(path)?;
        Ok(Attributes {
            entry_type: view.entry_type(),
            size: view.size(),
        })
    }

    /// List the directory at `path`. Iteration order carries no meaning.
    pub fn read_dir(&self, path: &str) -> FsResult<Vec<DirEntryInfo>> {
        let dir = match self.get_entry(path)? {
            EntryView::Folder { dir, .. } => dir,
            EntryView::File { .. } => return Err(FsError::NotADirectory),
            EntryView::Link { .. } => return Err(FsError::Unsupported),
        };
        Ok(dir
            .entries()
            .map(|entry| DirEntryInfo {
                name: entry.name().to_string(),
                entry_type: EntryView::from_entry(entry).entry_type(),
                size: entry.size(),
            })
            .collect())
    }

    /// Create a zero-filled file of `size` bytes at `path`.
    pub fn create_file(&mut self, path: &str, size: u64) -> FsResult<()> {
        // Allocate before touching the tree so a failure leaves it unchanged.
        let size = usize::try_from(size).map_err(|_| FsError::OutOfMemory)?;
        let node = FileNode::with_size(size)?;
        self.create_entry(path, EntryKind::File(node))?;
        debug!(path, size, "created file");
        Ok(())
    }

    /// Create an empty directory at `path`.
    pub fn create_dir(&mut self, path: &str) -> FsResult<()> {
        self.create_entry(path, EntryKind::Folder(Directory::new()))?;
        debug!(path, "created directory");
        Ok(())
    }

    fn create_entry(&mut self, path: &str, kind: EntryKind) -> FsResult<()> {
        let case = self.config.case_sensitivity;
        let segments = Self::segments(path);
        let Some((name, parents)) = segments.split_last() else {
            // The path names the root, which always exists.
            return Err(FsError::AlreadyExists);
        };
        if name.len() > self.config.max_name_bytes {
            return Err(FsError::InvalidName);
        }
        let dir = descend_mut(&mut self.root, case, parents)?;
        if dir.find(name, case).is_some() {
            return Err(FsError::AlreadyExists);
        }
        dir.insert(Entry::new(name.to_string(), kind));
        Ok(())
    }

    /// Copy up to `buf.len()` bytes from the file at `path` starting at
    /// `offset`. Out-of-range offsets read zero bytes rather than failing.
    pub fn read(&self, path: &str, offset: u64, buf: &mut [u8]) -> FsResult<usize> {
        match self.get_entry(path)? {
            EntryView::File { file, .. } => Ok(file.read_at(offset, buf)),
            EntryView::Folder { .. } => Err(FsError::IsADirectory),
            EntryView::Link { .. } => Err(FsError::Unsupported),
        }
    }

    /// Write all of `data` into the file at `path` starting at `offset`,
    /// growing the file to exactly `offset + data.len()` when needed.
    /// Returns the full input length on success; partial writes are not
    /// modeled.
    pub fn write(&mut self, path: &str, offset: u64, data: &[u8]) -> FsResult<usize> {
        let file = self.resolve_file_mut(path)?;
        let written = file.write_at(offset, data)?;
        debug!(path, offset, written, "wrote to file");
        Ok(written)
    }

    /// Resize the file at `path` to exactly `new_size` bytes, zero-filling
    /// on growth and discarding the tail on shrink.
    pub fn resize_file(&mut self, path: &str, new_size: u64) -> FsResult<()> {
        let new_size = usize::try_from(new_size).map_err(|_| FsError::OutOfMemory)?;
        let file = self.resolve_file_mut(path)?;
        file.resize(new_size)?;
        debug!(path, new_size, "resized file");
        Ok(())
    }

    /// Remove the file (or reserved link) at `path`, releasing its buffer.
    pub fn remove_file(&mut self, path: &str) -> FsResult<()> {
        let case = self.config.case_sensitivity;
        let segments = Self::segments(path);
        let Some((name, parents)) = segments.split_last() else {
            return Err(FsError::IsADirectory);
        };
        let dir = descend_mut(&mut self.root, case, parents)?;
        let entry = dir.find(name, case).ok_or(FsError::NotFound)?;
        if matches!(entry.kind(), EntryKind::Folder(_)) {
            return Err(FsError::IsADirectory);
        }
        dir.remove(name, case);
        debug!(path, "removed file");
        Ok(())
    }

    /// Remove the empty directory at `path`. The root can never be removed,
    /// and emptiness is a precondition: removal is never recursive.
    pub fn remove_dir(&mut self, path: &str) -> FsResult<()> {
        let case = self.config.case_sensitivity;
        let segments = Self::segments(path);
        let Some((name, parents)) = segments.split_last() else {
            return Err(FsError::NotPermitted);
        };
        let dir = descend_mut(&mut self.root, case, parents)?;
        let entry = dir.find(name, case).ok_or(FsError::NotFound)?;
        match entry.kind() {
            EntryKind::Folder(sub) if !sub.is_empty() => return Err(FsError::NotEmpty),
            EntryKind::Folder(_) => {}
            EntryKind::File(_) | EntryKind::Link => return Err(FsError::NotADirectory),
        }
        dir.remove(name, case);
        debug!(path, "removed directory");
        Ok(())
    }

    fn resolve_file_mut(&mut self, path: &str) -> FsResult<&mut FileNode> {
        let case = self.config.case_sensitivity;
        let segments = Self::segments(path);
        let Some((name, parents)) = segments.split_last() else {
            return Err(FsError::IsADirectory);
        };
        let dir = descend_mut(&mut self.root, case, parents)?;
        let entry = dir.find_mut(name, case).ok_or(FsError::NotFound)?;
        match entry.kind_mut() {
            EntryKind::File(file) => Ok(file),
            EntryKind::Folder(_) => Err(FsError::IsADirectory),
            EntryKind::Link => Err(FsError::Unsupported),
        }
    }
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new(FsConfig::default())
    }
}

/// Walk from `start` through `segments`, descending only through folders.
/// A missing segment or a non-folder intermediate both collapse to
/// [`FsError::NotFound`].
fn descend<'a>(
    start: &'a Directory,
    case: CaseSensitivity,
    segments: &[&str],
) -> FsResult<&'a Directory> {
    let mut current = start;
    for segment in segments {
        match current.find(segment, case).map(Entry::kind) {
            Some(EntryKind::Folder(dir)) => current = dir,
            _ => return Err(FsError::NotFound),
        }
    }
    Ok(current)
}

fn descend_mut<'a>(
    start: &'a mut Directory,
    case: CaseSensitivity,
    segments: &[&str],
) -> FsResult<&'a mut Directory> {
    let mut current = start;
    for segment in segments {
        match current.find_mut(segment, case).map(Entry::kind_mut) {
            Some(EntryKind::Folder(dir)) => current = dir,
            _ => return Err(FsError::NotFound),
        }
    }
    Ok(current)
}
