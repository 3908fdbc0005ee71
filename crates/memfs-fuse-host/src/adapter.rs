//! memfs FUSE adapter implementation
//!
//! Maps FUSE operations to memfs core calls. The adapter owns the single
//! reader-writer lock guarding the tree: lookups and reads take it shared,
//! every structural or content mutation takes it exclusive, and it is held
//! for the whole call including path resolution.

#[cfg(not(feature = "fuse"))]
compile_error!("This module requires the 'fuse' feature to be enabled");

use fuser::{
    FileAttr, FileType, KernelConfig, ReplyAttr, ReplyCreate, ReplyData, ReplyDirectory,
    ReplyEmpty, ReplyEntry, ReplyOpen, ReplyWrite, Request, TimeOrNow, FUSE_ROOT_ID,
};
use libc::c_int;
use memfs_core::{render_tree, Attributes, EntryType, FsConfig, FsError, MemFs};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

/// Kernel-side cache lifetime for attributes and entries.
const TTL: Duration = Duration::from_secs(1);

/// memfs FUSE filesystem adapter
pub struct MemFsFuse {
    /// The tree, behind the one lock shared by all operations.
    fs: RwLock<MemFs>,
    /// inode -> path. Paths are the only state the core understands.
    inode_paths: HashMap<u64, String>,
    /// path -> inode, so repeated lookups keep their inode stable.
    path_inodes: HashMap<String, u64>,
    next_inode: u64,
}

impl MemFsFuse {
    pub fn new(config: FsConfig) -> Self {
        let mut adapter = Self {
            fs: RwLock::new(MemFs::new(config)),
            inode_paths: HashMap::new(),
            path_inodes: HashMap::new(),
            next_inode: FUSE_ROOT_ID + 1,
        };
        adapter.inode_paths.insert(FUSE_ROOT_ID, "/".to_string());
        adapter.path_inodes.insert("/".to_string(), FUSE_ROOT_ID);
        adapter
    }

    fn path_of(&self, ino: u64) -> Option<String> {
        self.inode_paths.get(&ino).cloned()
    }

    fn inode_for(&mut self, path: &str) -> u64 {
        if let Some(&ino) = self.path_inodes.get(path) {
            return ino;
        }
        let ino = self.next_inode;
        self.next_inode += 1;
        self.inode_paths.insert(ino, path.to_string());
        self.path_inodes.insert(path.to_string(), ino);
        ino
    }

    fn drop_inode_for(&mut self, path: &str) {
        if let Some(ino) = self.path_inodes.remove(path) {
            self.inode_paths.remove(&ino);
        }
    }

    /// Join a parent path and a child name; `None` for non-UTF-8 names,
    /// which the core cannot represent.
    fn child_path(parent: &str, name: &OsStr) -> Option<String> {
        let name = name.to_str()?;
        if parent == "/" {
            Some(format!("/{name}"))
        } else {
            Some(format!("{parent}/{name}"))
        }
    }

    fn attr_to_fuse(attr: &Attributes, ino: u64) -> FileAttr {
        let (kind, perm, nlink) = match attr.entry_type {
            EntryType::Directory => (FileType::Directory, 0o755, 2),
            EntryType::File => (FileType::RegularFile, 0o644, 1),
            EntryType::Link => (FileType::Symlink, 0o777, 1),
        };

        FileAttr {
            ino,
            size: attr.size,
            blocks: attr.size.div_ceil(512),
            atime: SystemTime::UNIX_EPOCH,
            mtime: SystemTime::UNIX_EPOCH,
            ctime: SystemTime::UNIX_EPOCH,
            crtime: SystemTime::UNIX_EPOCH,
            kind,
            perm,
            nlink,
            uid: 0,
            gid: 0,
            rdev: 0,
            blksize: 512,
            flags: 0,
        }
    }

    /// Open-time behavior over a path: create a zero-length file on
    /// `O_CREAT` when the target is missing, refuse directories, and
    /// truncate on `O_TRUNC`.
    fn open_path(&mut self, path: &str, flags: i32) -> Result<(), c_int> {
        let looked_up = self.fs.read().unwrap().attributes(path);
        let attr = match looked_up {
            Ok(attr) => attr,
            Err(FsError::NotFound) if flags & libc::O_CREAT != 0 => {
                return self
                    .fs
                    .write()
                    .unwrap()
                    .create_file(path, 0)
                    .map_err(errno);
            }
            Err(err) => return Err(errno(err)),
        };
        if attr.entry_type == EntryType::Directory {
            return Err(libc::EISDIR);
        }
        if flags & libc::O_TRUNC != 0 {
            self.fs
                .write()
                .unwrap()
                .resize_file(path, 0)
                .map_err(errno)?;
        }
        Ok(())
    }
}

/// Translate a core error into the negated-errno convention FUSE expects.
fn errno(err: FsError) -> c_int {
    match err {
        FsError::NotFound => libc::ENOENT,
        FsError::AlreadyExists => libc::EEXIST,
        FsError::IsADirectory => libc::EISDIR,
        FsError::NotADirectory => libc::ENOTDIR,
        FsError::NotEmpty => libc::ENOTEMPTY,
        FsError::NotPermitted => libc::EPERM,
        FsError::InvalidName => libc::ENAMETOOLONG,
        FsError::OutOfMemory => libc::ENOSPC,
        FsError::Unsupported => libc::ENOTSUP,
    }
}

impl fuser::Filesystem for MemFsFuse {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), c_int> {
        info!("memfs FUSE adapter initialized");
        Ok(())
    }

    fn destroy(&mut self) {
        debug!(
            tree = %render_tree(&self.fs.read().unwrap()),
            "filesystem at unmount"
        );
        info!("memfs FUSE adapter destroyed");
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(parent_path) = self.path_of(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        let Some(path) = Self::child_path(&parent_path, name) else {
            reply.error(libc::ENOENT);
            return;
        };

        let result = self.fs.read().unwrap().attributes(&path);
        match result {
            Ok(attr) => {
                let ino = self.inode_for(&path);
                reply.entry(&TTL, &Self::attr_to_fuse(&attr, ino), 0);
            }
            Err(err) => reply.error(errno(err)),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };

        match self.fs.read().unwrap().attributes(&path) {
            Ok(attr) => reply.attr(&TTL, &Self::attr_to_fuse(&attr, ino)),
            Err(err) => reply.error(errno(err)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn setattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };

        // Size changes map to resize; everything else (times, modes) has no
        // core representation and is acknowledged as-is.
        if let Some(new_size) = size {
            if let Err(err) = self.fs.write().unwrap().resize_file(&path, new_size) {
                reply.error(errno(err));
                return;
            }
        }

        match self.fs.read().unwrap().attributes(&path) {
            Ok(attr) => reply.attr(&TTL, &Self::attr_to_fuse(&attr, ino)),
            Err(err) => reply.error(errno(err)),
        }
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        let Some(parent_path) = self.path_of(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        let Some(path) = Self::child_path(&parent_path, name) else {
            reply.error(libc::EINVAL);
            return;
        };

        let result = {
            let mut fs = self.fs.write().unwrap();
            fs.create_dir(&path).and_then(|()| fs.attributes(&path))
        };
        match result {
            Ok(attr) => {
                let ino = self.inode_for(&path);
                reply.entry(&TTL, &Self::attr_to_fuse(&attr, ino), 0);
            }
            Err(err) => reply.error(errno(err)),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let Some(parent_path) = self.path_of(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        let Some(path) = Self::child_path(&parent_path, name) else {
            reply.error(libc::ENOENT);
            return;
        };

        let result = self.fs.write().unwrap().remove_file(&path);
        match result {
            Ok(()) => {
                self.drop_inode_for(&path);
                reply.ok();
            }
            Err(err) => reply.error(errno(err)),
        }
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let Some(parent_path) = self.path_of(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        let Some(path) = Self::child_path(&parent_path, name) else {
            reply.error(libc::ENOENT);
            return;
        };

        let result = self.fs.write().unwrap().remove_dir(&path);
        match result {
            Ok(()) => {
                self.drop_inode_for(&path);
                reply.ok();
            }
            Err(err) => reply.error(errno(err)),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };

        match self.open_path(&path, flags) {
            // No handle state: every operation re-resolves its path.
            Ok(()) => reply.opened(0, 0),
            Err(err) => reply.error(err),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };

        let mut buf = vec![0u8; size as usize];
        let result = self
            .fs
            .read()
            .unwrap()
            .read(&path, offset.max(0) as u64, &mut buf);
        match result {
            Ok(bytes_read) => {
                buf.truncate(bytes_read);
                reply.data(&buf);
            }
            Err(err) => reply.error(errno(err)),
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };

        let result = self
            .fs
            .write()
            .unwrap()
            .write(&path, offset.max(0) as u64, data);
        match result {
            Ok(bytes_written) => reply.written(bytes_written as u32),
            Err(err) => reply.error(errno(err)),
        }
    }

    fn flush(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _lock_owner: u64,
        reply: ReplyEmpty,
    ) {
        // Nothing is buffered outside the tree itself.
        reply.ok();
    }

    fn fsync(&mut self, _req: &Request<'_>, _ino: u64, _fh: u64, _datasync: bool, reply: ReplyEmpty) {
        // No durable storage to sync to.
        reply.ok();
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let Some(path) = self.path_of(ino) else {
            reply.error(libc::ENOENT);
            return;
        };

        let listing = match self.fs.read().unwrap().read_dir(&path) {
            Ok(listing) => listing,
            Err(err) => {
                reply.error(errno(err));
                return;
            }
        };

        let mut rows: Vec<(u64, FileType, String)> = vec![
            (ino, FileType::Directory, ".".to_string()),
            (ino, FileType::Directory, "..".to_string()),
        ];
        for entry in listing {
            let Some(child) = Self::child_path(&path, OsStr::new(&entry.name)) else {
                continue;
            };
            let child_ino = self.inode_for(&child);
            let kind = match entry.entry_type {
                EntryType::Directory => FileType::Directory,
                EntryType::File => FileType::RegularFile,
                EntryType::Link => FileType::Symlink,
            };
            rows.push((child_ino, kind, entry.name));
        }

        for (i, (child_ino, kind, name)) in rows.iter().enumerate().skip(offset.max(0) as usize) {
            if reply.add(*child_ino, (i + 1) as i64, *kind, name) {
                break; // buffer full
            }
        }
        reply.ok();
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        let Some(parent_path) = self.path_of(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        let Some(path) = Self::child_path(&parent_path, name) else {
            reply.error(libc::EINVAL);
            return;
        };

        let result = {
            let mut fs = self.fs.write().unwrap();
            fs.create_file(&path, 0).and_then(|()| fs.attributes(&path))
        };
        match result {
            Ok(attr) => {
                let ino = self.inode_for(&path);
                reply.created(&TTL, &Self::attr_to_fuse(&attr, ino), 0, 0, 0);
            }
            Err(err) => reply.error(errno(err)),
        }
    }
}
