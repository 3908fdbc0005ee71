//! View and info types crossing the core boundary

use crate::tree::{Directory, Entry, EntryKind, FileNode};

/// Entry kinds as seen by adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryType {
    Directory,
    File,
    Link,
}

/// Borrowing snapshot of a located entry.
///
/// The payload is shared by reference with the live tree, not deep-copied;
/// the view is only valid while the caller holds its read access to the tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntryView<'a> {
    Folder { name: &'a str, dir: &'a Directory },
    File { name: &'a str, file: &'a FileNode },
    Link { name: &'a str },
}

impl<'a> EntryView<'a> {
    pub(crate) fn from_entry(entry: &'a Entry) -> Self {
        match entry.kind() {
            EntryKind::Folder(dir) => EntryView::Folder { name: entry.name(), dir },
            EntryKind::File(file) => EntryView::File { name: entry.name(), file },
            EntryKind::Link => EntryView::Link { name: entry.name() },
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            EntryView::Folder { name, .. }
            | EntryView::File { name, .. }
            | EntryView::Link { name } => name,
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            EntryView::Folder { .. } => EntryType::Directory,
            EntryView::File { .. } => EntryType::File,
            EntryView::Link { .. } => EntryType::Link,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            EntryView::File { file, .. } => file.size(),
            _ => 0,
        }
    }
}

/// Attributes of an entry, for adapters building stat-style results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attributes {
    pub entry_type: EntryType,
    pub size: u64,
}

/// One record of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub entry_type: EntryType,
    pub size: u64,
}
