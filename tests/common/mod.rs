// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use magepkg::archive::{EntryInfo, InputArchive, InputSource};
use magepkg::{EntryOwner, PackageMetadata, Packager, PackagerOptions};
use std::io::{Cursor, Write};
use std::path::Path;
use tar::{EntryType, Header};

/// Owner stamped on generated descriptors in tests
pub const TEST_OWNER: EntryOwner = EntryOwner { uid: 1000, gid: 1000 };

/// One entry of a fixture source tarball
pub enum Fixture<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8]),
    Symlink(&'a str, &'a str),
}

/// Build an uncompressed source tarball
///
/// Every entry gets distinct, non-default metadata so copies can be told
/// apart from regenerated headers.
pub fn source_tar(entries: &[Fixture<'_>]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    for (i, entry) in entries.iter().enumerate() {
        let mut header = Header::new_gnu();
        header.set_uid(500 + i as u64);
        header.set_gid(600 + i as u64);
        header.set_mtime(1_300_000_000 + i as u64);

        match entry {
            Fixture::Dir(path) => {
                header.set_entry_type(EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                builder.append_data(&mut header, path, std::io::empty()).unwrap();
            }
            Fixture::File(path, content) => {
                header.set_entry_type(EntryType::Regular);
                header.set_mode(0o640);
                header.set_size(content.len() as u64);
                builder.append_data(&mut header, path, *content).unwrap();
            }
            Fixture::Symlink(path, target) => {
                header.set_entry_type(EntryType::Symlink);
                header.set_mode(0o777);
                header.set_size(0);
                builder.append_link(&mut header, path, target).unwrap();
            }
        }
    }

    builder.into_inner().unwrap()
}

/// A small extension: code pool, layout, library and a loose file
pub fn module_tar() -> Vec<u8> {
    source_tar(&[
        Fixture::Dir("app/"),
        Fixture::Dir("app/code/"),
        Fixture::File("app/code/local/Foo/Bar.php", b"<?php"),
        Fixture::File("app/code/local/Foo/etc/config.xml", b"<config/>"),
        Fixture::File("app/design/frontend/base/default/layout/foo.xml", b"<layout/>"),
        Fixture::File("lib/Baz.php", b"x"),
        Fixture::Symlink("lib/Alias.php", "Baz.php"),
        Fixture::File("readme.txt", b"read me"),
    ])
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Options with a fixed descriptor owner
pub fn test_options() -> PackagerOptions {
    let mut options = PackagerOptions::default();
    options.descriptor.owner = TEST_OWNER;
    options
}

/// A packager reading `tar` as a non-seekable stream
pub fn stream_packager(
    tar: Vec<u8>,
    output_dir: &Path,
    metadata: Option<PackageMetadata>,
    options: PackagerOptions,
) -> Packager {
    Packager::new(
        InputSource::Stream(Box::new(Cursor::new(tar))),
        Some(output_dir),
        metadata,
        options,
    )
    .unwrap()
}

/// Every entry of an archive with its content, in order
pub fn read_entries(path: &Path) -> Vec<(EntryInfo, Vec<u8>)> {
    let archive = InputArchive::open(InputSource::Path(path.to_path_buf())).unwrap();
    let mut entries = Vec::new();
    archive
        .for_each_entry(|entry| {
            entries.push((entry.info, entry.content));
            Ok(())
        })
        .unwrap();
    entries
}
