//! memfs Core — an in-memory hierarchical filesystem
//!
//! This crate provides the tree data model, path resolution, and the
//! mutation/read operations over it, with platform hosts providing the glue
//! to kernel filesystem interfaces.

pub mod config;
pub mod error;
pub mod print;
pub mod tree;
pub mod types;
pub mod vfs;

// Re-export key types for convenience
pub use config::{CaseSensitivity, FsConfig};
pub use error::{FsError, FsResult};
pub use print::render_tree;
pub use tree::{Directory, Entry, EntryKind, FileNode, ROOT_NAME};
pub use types::{Attributes, DirEntryInfo, EntryType, EntryView};
pub use vfs::MemFs;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(FsError::NotFound.to_string(), "not found");
        assert_eq!(FsError::NotEmpty.to_string(), "directory not empty");
    }

    #[test]
    fn test_default_config() {
        let config = FsConfig::default();
        assert_eq!(config.max_name_bytes, 63);
        assert!(matches!(
            config.case_sensitivity,
            CaseSensitivity::Sensitive
        ));
    }
}
