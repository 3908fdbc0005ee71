//! Debug rendering of the tree as indented ASCII.

use std::fmt::Write;

use crate::tree::{Directory, EntryKind};
use crate::vfs::MemFs;

/// Render the whole hierarchy, one `+-- name` row per entry, files
/// annotated with their byte size. Intended for logs and tests.
pub fn render_tree(fs: &MemFs) -> String {
    let mut out = String::new();
    out.push_str("+-- /\n");
    render_dir(fs.root(), 1, &mut out);
    out
}

fn render_dir(dir: &Directory, depth: usize, out: &mut String) {
    for entry in dir.entries() {
        for _ in 0..depth {
            out.push_str("|   ");
        }
        match entry.kind() {
            EntryKind::Folder(sub) => {
                let _ = writeln!(out, "+-- {}", entry.name());
                render_dir(sub, depth + 1, out);
            }
            EntryKind::File(file) => {
                let _ = writeln!(out, "+-- {} ({} bytes)", entry.name(), file.size());
            }
            EntryKind::Link => {
                let _ = writeln!(out, "+-- {} (link)", entry.name());
            }
        }
    }
}
