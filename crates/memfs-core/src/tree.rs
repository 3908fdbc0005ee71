//! The entry tree: directories, files, and the reserved link variant.
//!
//! Every node is exclusively owned by its parent: a [`Directory`] owns its
//! child [`Entry`] values and a file entry owns its byte buffer. Dropping an
//! entry releases everything below it, which is safe because directory
//! removal requires the directory to be empty first.

use crate::config::CaseSensitivity;
use crate::error::{FsError, FsResult};

/// Name reported for the synthetic root entry.
pub const ROOT_NAME: &str = "/";

/// Variant-specific payload of an entry.
#[derive(Debug, PartialEq)]
pub enum EntryKind {
    Folder(Directory),
    File(FileNode),
    /// Reserved for links. Operations that land on one report
    /// [`FsError::Unsupported`] rather than silently succeeding.
    Link,
}

/// A named node in the tree.
#[derive(Debug, PartialEq)]
pub struct Entry {
    name: String,
    kind: EntryKind,
}

impl Entry {
    pub(crate) fn new(name: String, kind: EntryKind) -> Self {
        Self { name, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut EntryKind {
        &mut self.kind
    }

    /// Byte size of a file entry; zero for folders and links.
    pub fn size(&self) -> u64 {
        match &self.kind {
            EntryKind::File(file) => file.size(),
            EntryKind::Folder(_) | EntryKind::Link => 0,
        }
    }
}

/// A directory's unordered collection of uniquely named entries.
///
/// The directory does not know its own name; naming belongs to the parent
/// entry pointing at it. The root directory is unnamed.
#[derive(Debug, Default, PartialEq)]
pub struct Directory {
    entries: Vec<Entry>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn find(&self, name: &str, case: CaseSensitivity) -> Option<&Entry> {
        self.entries.iter().find(|e| case.names_equal(&e.name, name))
    }

    pub(crate) fn find_mut(&mut self, name: &str, case: CaseSensitivity) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| case.names_equal(&e.name, name))
    }

    /// Insert without a uniqueness check; callers verify the name is free.
    pub(crate) fn insert(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Detach an entry by name, dropping it and everything it owns.
    pub(crate) fn remove(&mut self, name: &str, case: CaseSensitivity) -> Option<Entry> {
        let idx = self.entries.iter().position(|e| case.names_equal(&e.name, name))?;
        Some(self.entries.swap_remove(idx))
    }
}

/// A file's byte buffer. The size of the file is always the buffer length;
/// there is no separate capacity notion, and bytes never explicitly written
/// are zero.
#[derive(Debug, Default, PartialEq)]
pub struct FileNode {
    data: Vec<u8>,
}

impl FileNode {
    /// A zero-filled file of the given size. Allocation failure is reported
    /// as [`FsError::OutOfMemory`] instead of aborting.
    pub(crate) fn with_size(size: usize) -> FsResult<Self> {
        let mut node = Self::default();
        node.grow_to(size)?;
        Ok(node)
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copy up to `buf.len()` bytes starting at `offset` into `buf`,
    /// clamping at end of file. An offset at or past the end reads zero
    /// bytes; this is never an error.
    pub(crate) fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= self.data.len() {
            return 0;
        }
        let end = std::cmp::min(start + buf.len(), self.data.len());
        let count = end - start;
        buf[..count].copy_from_slice(&self.data[start..end]);
        count
    }

    /// Copy all of `data` into the buffer at `offset`, growing the buffer to
    /// exactly `offset + data.len()` first when it is shorter. The gap
    /// between the old size and `offset` is zero-filled by the growth.
    /// On [`FsError::OutOfMemory`] the prior contents are untouched.
    pub(crate) fn write_at(&mut self, offset: u64, data: &[u8]) -> FsResult<usize> {
        let start = usize::try_from(offset).map_err(|_| FsError::OutOfMemory)?;
        let end = start.checked_add(data.len()).ok_or(FsError::OutOfMemory)?;
        if end > self.data.len() {
            self.grow_to(end)?;
        }
        self.data[start..end].copy_from_slice(data);
        Ok(data.len())
    }

    /// Reallocate to exactly `new_size`: zero-fill when growing, discard the
    /// tail when shrinking. Failure leaves the original buffer intact.
    pub(crate) fn resize(&mut self, new_size: usize) -> FsResult<()> {
        if new_size > self.data.len() {
            self.grow_to(new_size)
        } else {
            self.data.truncate(new_size);
            self.data.shrink_to_fit();
            Ok(())
        }
    }

    fn grow_to(&mut self, new_len: usize) -> FsResult<()> {
        let additional = new_len - self.data.len();
        self.data
            .try_reserve_exact(additional)
            .map_err(|_| FsError::OutOfMemory)?;
        self.data.resize(new_len, 0);
        Ok(())
    }
}
