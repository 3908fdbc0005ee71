//! End-to-end exercises of the tree operations against one shared facade.

use memfs_core::{EntryType, EntryView, FsError, MemFs};

#[test]
fn create_files() {
    let mut fs = MemFs::default();
    fs.create_file("/hello", 10).unwrap();
    fs.create_file("/my file", 69).unwrap();
    fs.create_file("/rng", 5).unwrap();
    assert_eq!(fs.create_file("/rng", 0), Err(FsError::AlreadyExists));
    assert_eq!(
        fs.create_file("/non existing folder/file", 0),
        Err(FsError::NotFound)
    );
    assert_eq!(fs.create_file("/rng/rng", 0), Err(FsError::NotFound));
}

#[test]
fn create_folders() {
    let mut fs = MemFs::default();
    fs.create_dir("/hello").unwrap();
    fs.create_dir("/hello/world").unwrap();
    fs.create_dir("/hello/world/sup bro").unwrap();
    fs.create_dir("/another dir").unwrap();
    assert_eq!(fs.create_dir("/another dir"), Err(FsError::AlreadyExists));
    assert_eq!(
        fs.create_dir("/not found/directory/welp"),
        Err(FsError::NotFound)
    );
    fs.create_file("/another dir/file", 0).unwrap();
    fs.create_file("/hello/file", 0).unwrap();
    fs.create_file("/hello/world/file", 0).unwrap();
    fs.create_file("/hello/world/sup bro/file", 0).unwrap();
    assert_eq!(
        fs.create_file("/hello/file/bro/file", 0),
        Err(FsError::NotFound)
    );
    assert_eq!(fs.create_dir("/hello/file/nope"), Err(FsError::NotFound));
}

#[test]
fn get_entry_views() {
    let mut fs = MemFs::default();
    fs.create_dir("/hello").unwrap();
    fs.create_dir("/hello/world").unwrap();
    fs.create_file("/hello/file", 10).unwrap();
    fs.create_file("/hello/world/file", 20).unwrap();

    let root = fs.get_entry("/").unwrap();
    assert_eq!(root.name(), "/");
    assert_eq!(root.entry_type(), EntryType::Directory);
    match root {
        EntryView::Folder { dir, .. } => assert_eq!(dir.len(), 1),
        _ => panic!("root must be a folder"),
    }

    let hello = fs.get_entry("/hello").unwrap();
    assert_eq!(hello.name(), "hello");
    match hello {
        EntryView::Folder { dir, .. } => {
            let mut names: Vec<_> = dir.entries().map(|e| e.name().to_string()).collect();
            names.sort();
            assert_eq!(names, ["file", "world"]);
        }
        _ => panic!("/hello must be a folder"),
    }

    let file = fs.get_entry("/hello/file").unwrap();
    assert_eq!(file.name(), "file");
    match file {
        EntryView::File { file, .. } => {
            assert_eq!(file.size(), 10);
            assert!(file.bytes().iter().all(|&b| b == 0));
        }
        _ => panic!("/hello/file must be a file"),
    }

    assert_eq!(fs.get_entry("/hello world/"), Err(FsError::NotFound));
    assert_eq!(fs.get_entry("/hello/no"), Err(FsError::NotFound));
    assert_eq!(fs.get_entry("/hello/file/file"), Err(FsError::NotFound));
}

#[test]
fn read_write_within_fixed_size() {
    let mut fs = MemFs::default();
    let payload = b"Hello world!";
    fs.create_file("/file", 1024).unwrap();
    fs.create_dir("/folder").unwrap();
    assert_eq!(fs.write("/file", 0, payload).unwrap(), payload.len());
    assert_eq!(fs.write("/file", 100, payload).unwrap(), payload.len());
    // Writes inside the buffer must not have inflated the file.
    assert_eq!(fs.attributes("/file").unwrap().size, 1024);

    let mut expected = vec![0u8; 1024];
    expected[..payload.len()].copy_from_slice(payload);
    expected[100..100 + payload.len()].copy_from_slice(payload);

    let mut buf = vec![0u8; 1024];
    assert_eq!(fs.read("/file", 0, &mut buf).unwrap(), 1024);
    assert_eq!(buf, expected);

    // Reading from an offset shifts the window.
    let mut buf = vec![0u8; 1024];
    assert_eq!(fs.read("/file", 100, &mut buf).unwrap(), 1024 - 100);
    assert_eq!(&buf[..payload.len()], payload);
    assert!(buf[payload.len()..].iter().all(|&b| b == 0));

    // Reads at or past the end yield zero bytes, never an error.
    assert_eq!(fs.read("/file", 1024, &mut buf).unwrap(), 0);
    assert_eq!(fs.read("/file", 1025, &mut buf).unwrap(), 0);
}

#[test]
fn write_inflates_and_zero_fills_the_gap() {
    let mut fs = MemFs::default();
    let payload = b"Hello world!";
    fs.create_file("/a", 0).unwrap();
    assert_eq!(fs.write("/a", 0, payload).unwrap(), 12);
    assert_eq!(fs.write("/a", 100, payload).unwrap(), 12);
    assert_eq!(fs.attributes("/a").unwrap().size, 112);

    let mut buf = vec![0u8; 1024];
    assert_eq!(fs.read("/a", 0, &mut buf).unwrap(), 112);
    assert_eq!(&buf[..12], payload);
    assert!(buf[12..100].iter().all(|&b| b == 0));
    assert_eq!(&buf[100..112], payload);
}

#[test]
fn write_same_bytes_twice_is_idempotent() {
    let mut fs = MemFs::default();
    fs.create_file("/f", 0).unwrap();
    fs.write("/f", 3, b"abc").unwrap();
    let mut first = vec![0u8; 16];
    let n1 = fs.read("/f", 0, &mut first).unwrap();
    fs.write("/f", 3, b"abc").unwrap();
    let mut second = vec![0u8; 16];
    let n2 = fs.read("/f", 0, &mut second).unwrap();
    assert_eq!(n1, n2);
    assert_eq!(first, second);
}

#[test]
fn resize_file() {
    let mut fs = MemFs::default();
    let payload = b"Hello world!";
    fs.create_file("/file", 0).unwrap();
    fs.create_dir("/folder").unwrap();
    fs.write("/file", 0, payload).unwrap();

    // Inflate: old content stays, the rest reads back as zero.
    fs.resize_file("/file", 1024).unwrap();
    let mut buf = vec![0u8; 1024];
    assert_eq!(fs.read("/file", 0, &mut buf).unwrap(), 1024);
    assert_eq!(&buf[..payload.len()], payload);
    assert!(buf[payload.len()..].iter().all(|&b| b == 0));

    // Truncate to the first two bytes exactly.
    fs.resize_file("/file", 2).unwrap();
    let mut buf = vec![0u8; 1024];
    assert_eq!(fs.read("/file", 0, &mut buf).unwrap(), 2);
    assert_eq!(&buf[..2], &payload[..2]);
    assert!(buf[2..].iter().all(|&b| b == 0));

    assert_eq!(fs.resize_file("/folder", 1024), Err(FsError::IsADirectory));
    assert_eq!(fs.resize_file("/nope", 1024), Err(FsError::NotFound));
}

#[test]
fn delete_files() {
    let mut fs = MemFs::default();
    fs.create_dir("/folder1").unwrap();
    fs.create_dir("/folder2").unwrap();
    fs.create_file("/file", 100).unwrap();
    fs.create_file("/folder1/file", 10).unwrap();
    fs.create_file("/folder2/file1", 10).unwrap();
    fs.create_file("/folder2/file2", 10).unwrap();
    fs.create_file("/folder2/file3", 10).unwrap();

    fs.remove_file("/file").unwrap();
    fs.remove_file("/folder1/file").unwrap();
    fs.remove_file("/folder2/file1").unwrap();
    fs.remove_file("/folder2/file2").unwrap();
    fs.remove_file("/folder2/file3").unwrap();

    // A second pass finds nothing.
    assert_eq!(fs.remove_file("/file"), Err(FsError::NotFound));
    assert_eq!(fs.remove_file("/folder1/file"), Err(FsError::NotFound));
    assert_eq!(fs.remove_file("/folder2/file3"), Err(FsError::NotFound));
    assert_eq!(fs.remove_file("/folder2/file2"), Err(FsError::NotFound));
    assert_eq!(fs.remove_file("/folder2/file1"), Err(FsError::NotFound));

    assert_eq!(fs.remove_file("/folder"), Err(FsError::NotFound));
    assert_eq!(fs.remove_file("/folder1"), Err(FsError::IsADirectory));
    fs.create_file("/file", 100).unwrap();
    assert_eq!(fs.remove_file("/file/file"), Err(FsError::NotFound));
}

#[test]
fn delete_folders() {
    let mut fs = MemFs::default();
    fs.create_dir("/folder").unwrap();
    fs.create_dir("/folder/dir").unwrap();
    fs.create_dir("/folder/dir/help").unwrap();
    fs.create_dir("/folder/dir2").unwrap();
    fs.create_file("/folder/dir2/file", 0).unwrap();

    // Emptiness is a precondition, never a side effect.
    assert_eq!(fs.remove_dir("/folder"), Err(FsError::NotEmpty));
    assert_eq!(fs.remove_dir("/folder/dir"), Err(FsError::NotEmpty));
    fs.remove_dir("/folder/dir/help").unwrap();
    assert_eq!(fs.remove_dir("/folder/dir2"), Err(FsError::NotEmpty));
    assert_eq!(
        fs.remove_dir("/folder/dir2/file"),
        Err(FsError::NotADirectory)
    );
    fs.remove_file("/folder/dir2/file").unwrap();
    fs.remove_dir("/folder/dir2").unwrap();
    assert_eq!(fs.remove_dir("/folder"), Err(FsError::NotEmpty));
    fs.remove_dir("/folder/dir").unwrap();
    fs.remove_dir("/folder").unwrap();
    assert!(fs.root().is_empty());

    assert_eq!(fs.remove_dir("/"), Err(FsError::NotPermitted));
    assert_eq!(fs.remove_dir("/nope"), Err(FsError::NotFound));
    fs.create_file("/file", 0).unwrap();
    assert_eq!(fs.remove_dir("/file/folder"), Err(FsError::NotFound));
}

#[test]
fn names_stay_unique_across_operation_sequences() {
    let mut fs = MemFs::default();
    fs.create_dir("/d").unwrap();
    for round in 0..3 {
        fs.create_file("/d/n", round * 7).unwrap();
        assert_eq!(fs.create_file("/d/n", 0), Err(FsError::AlreadyExists));
        assert_eq!(fs.create_dir("/d/n"), Err(FsError::AlreadyExists));
        let listing = fs.read_dir("/d").unwrap();
        assert_eq!(listing.iter().filter(|e| e.name == "n").count(), 1);
        fs.remove_file("/d/n").unwrap();
    }
}

#[test]
fn size_always_matches_content_length() {
    let mut fs = MemFs::default();
    fs.create_file("/f", 17).unwrap();
    let check = |fs: &MemFs, want: u64| {
        let size = fs.attributes("/f").unwrap().size;
        assert_eq!(size, want);
        let mut buf = vec![0u8; (want + 64) as usize];
        assert_eq!(fs.read("/f", 0, &mut buf).unwrap() as u64, want);
    };
    check(&fs, 17);
    fs.write("/f", 40, b"x").unwrap();
    check(&fs, 41);
    fs.resize_file("/f", 9).unwrap();
    check(&fs, 9);
    fs.resize_file("/f", 0).unwrap();
    check(&fs, 0);
}
