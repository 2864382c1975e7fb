// tests/packaging.rs

//! End-to-end packaging runs: source tarball in, Connect package out.

mod common;

use chrono::{FixedOffset, TimeZone};
use common::{
    gzip, module_tar, read_entries, source_tar, stream_packager, test_options, Fixture, TEST_OWNER,
};
use magepkg::archive::{InputArchive, InputSource};
use magepkg::compression::CompressionFormat;
use magepkg::descriptor::DESCRIPTOR_FILE;
use magepkg::hash;
use magepkg::inspector::InspectedPackage;
use magepkg::{Error, PackageMetadata, Packager, PackagerConfig, PackagerState};
use std::fs;
use std::io::Cursor;
use tar::EntryType;

fn named(packager: &mut Packager) {
    packager.set_field("name", Some("Foo_Bar"), &[]);
    packager.set_field("version", Some("1.2.3"), &[]);
}

#[test]
fn test_end_to_end_contents() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tar = source_tar(&[
        Fixture::File("app/code/local/Foo/Bar.php", b"<?php"),
        Fixture::File("lib/Baz.php", b"x"),
    ]);

    let mut packager = stream_packager(tar, temp_dir.path(), None, test_options());
    named(&mut packager);
    let report = packager.save().unwrap();

    assert_eq!(report.output_path, temp_dir.path().join("Foo_Bar-1.2.3.tgz"));
    assert_eq!(report.entries, 2);
    assert_eq!(report.files, 2);

    let pkg = InspectedPackage::from_file(&report.output_path, DESCRIPTOR_FILE).unwrap();
    let contents = pkg.metadata.contents();
    assert_eq!(contents.targets().len(), 2);

    let magelocal = contents.target("magelocal").unwrap().root();
    assert_eq!(
        magelocal.dir("Foo").unwrap().files().get("Bar.php"),
        Some(&hash::md5(b"<?php"))
    );
    let magelib = contents.target("magelib").unwrap().root();
    assert_eq!(magelib.files().get("Baz.php"), Some(&hash::md5(b"x")));
    assert_eq!(hash::md5(b"x"), "9dd4e461268c8034f5c8564e155c67a6");
}

#[test]
fn test_every_entry_copied_unchanged() {
    let temp_dir = tempfile::tempdir().unwrap();
    let tar = module_tar();

    let source =
        InputArchive::open(InputSource::Stream(Box::new(Cursor::new(tar.clone())))).unwrap();
    let mut expected = Vec::new();
    source
        .for_each_entry(|entry| {
            expected.push((entry.info, entry.content));
            Ok(())
        })
        .unwrap();

    let mut packager = stream_packager(tar, temp_dir.path(), None, test_options());
    named(&mut packager);
    let report = packager.save().unwrap();
    assert_eq!(report.entries, expected.len());

    let actual = read_entries(&report.output_path);
    assert_eq!(actual.len(), expected.len() + 1);

    for ((want, want_content), (got, got_content)) in expected.iter().zip(&actual) {
        assert_eq!(got.name, want.name);
        assert_eq!(got_content, want_content, "content of {}", want.name);
        assert_eq!(got.entry_type(), want.entry_type());
        assert_eq!(got.mode(), want.mode());
        assert_eq!(got.header.uid().unwrap(), want.header.uid().unwrap());
        assert_eq!(got.header.gid().unwrap(), want.header.gid().unwrap());
        assert_eq!(got.header.mtime().unwrap(), want.header.mtime().unwrap());
        assert_eq!(got.link_name, want.link_name);
    }

    let (descriptor, xml) = actual.last().unwrap();
    assert_eq!(descriptor.name, "package.xml");
    assert_eq!(descriptor.entry_type(), EntryType::Regular);
    assert_eq!(descriptor.mode(), 0o664);
    assert_eq!(descriptor.header.uid().unwrap(), TEST_OWNER.uid);
    assert_eq!(descriptor.header.gid().unwrap(), TEST_OWNER.gid);
    assert!(xml.starts_with(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
}

#[test]
fn test_only_regular_files_are_listed() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut packager = stream_packager(module_tar(), temp_dir.path(), None, test_options());
    named(&mut packager);
    let report = packager.save().unwrap();

    // 8 entries: 2 directories, 5 files, 1 symlink
    assert_eq!(report.entries, 8);
    assert_eq!(report.files, 5);
    assert_eq!(
        report.targets,
        vec![
            ("magelocal".to_string(), 2),
            ("magedesign".to_string(), 1),
            ("magelib".to_string(), 1),
            ("mage".to_string(), 1),
        ]
    );

    let magelib = packager.metadata().contents().target("magelib").unwrap().root();
    assert!(magelib.files().get("Alias.php").is_none());

    let design = packager.metadata().contents().target("magedesign").unwrap().root();
    let layout = design
        .dir("frontend")
        .and_then(|d| d.dir("base"))
        .and_then(|d| d.dir("default"))
        .and_then(|d| d.dir("layout"))
        .unwrap();
    assert_eq!(layout.files().get("foo.xml"), Some(&hash::md5(b"<layout/>")));
}

#[test]
fn test_existing_package_is_replaced() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("Foo_Bar-1.2.3.tgz");
    fs::write(&path, b"stale contents from an earlier run").unwrap();

    let mut packager = stream_packager(module_tar(), temp_dir.path(), None, test_options());
    named(&mut packager);
    assert_eq!(packager.output_path().unwrap(), path);

    let report = packager.save().unwrap();
    assert!(report.replaced);
    assert_eq!(report.output_path, path);

    let pkg = InspectedPackage::from_file(&path, DESCRIPTOR_FILE).unwrap();
    assert_eq!(pkg.name(), "Foo_Bar");
    assert!(pkg.verify(&Default::default()).is_ok());
}

#[test]
fn test_missing_version_fails_before_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut packager = stream_packager(module_tar(), temp_dir.path(), None, test_options());
    packager.set_field("name", Some("Foo_Bar"), &[]);
    packager.set_field("version", Some("  "), &[]);

    assert!(matches!(packager.save(), Err(Error::Validation(_))));
    assert_eq!(packager.state(), PackagerState::MetadataInitialized);
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_skeleton_metadata_is_merged() {
    let skeleton = r#"<?xml version="1.0"?>
<package>
  <name>Foo_Bar</name>
  <version>1.2.3</version>
  <summary>Adds a bar to foo</summary>
  <contents>
    <target name="magelocal">
      <dir name="Foo">
        <file name="Legacy.php" hash="0cc175b9c0f1b6a831c399e269772661"/>
      </dir>
    </target>
  </contents>
  <dependencies/>
</package>
"#;
    let metadata = PackageMetadata::parse(skeleton).unwrap();

    let temp_dir = tempfile::tempdir().unwrap();
    let tar = source_tar(&[Fixture::File("app/code/local/Foo/Bar.php", b"<?php")]);
    let mut packager = stream_packager(tar, temp_dir.path(), Some(metadata), test_options());
    let report = packager.save().unwrap();

    let pkg = InspectedPackage::from_file(&report.output_path, DESCRIPTOR_FILE).unwrap();
    assert_eq!(pkg.metadata.field("summary"), Some("Adds a bar to foo"));

    let contents = pkg.metadata.contents();
    assert_eq!(contents.targets().len(), 1);
    let foo = contents.target("magelocal").unwrap().root().dir("Foo").unwrap();
    assert_eq!(foo.files().len(), 2);
    assert!(foo.files().contains_key("Legacy.php"));
    assert!(foo.files().contains_key("Bar.php"));

    // contents keeps its place ahead of <dependencies/>
    let (_, xml) = read_entries(&report.output_path).pop().unwrap();
    let xml = String::from_utf8(xml).unwrap();
    let contents_at = xml.find("<contents>").unwrap();
    let dependencies_at = xml.find("<dependencies/>").unwrap();
    assert!(contents_at < dependencies_at);
}

#[test]
fn test_release_date_fields() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut packager = stream_packager(module_tar(), temp_dir.path(), None, test_options());
    named(&mut packager);
    let date = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 6, 7, 8, 9)
        .unwrap();
    packager.set_release_date(&date);
    packager.set_field(
        "license",
        Some("OSL v3.0"),
        &[("uri", "http://opensource.org/licenses/osl-3.0.php")],
    );

    let report = packager.save().unwrap();
    let pkg = InspectedPackage::from_file(&report.output_path, DESCRIPTOR_FILE).unwrap();
    assert_eq!(pkg.metadata.field("date"), Some("2024-05-06"));
    assert_eq!(pkg.metadata.field("time"), Some("07:08:09"));
    assert_eq!(
        pkg.metadata.field_attribute("license", "uri"),
        Some("http://opensource.org/licenses/osl-3.0.php")
    );
}

#[test]
fn test_output_compressions() {
    for (compression, extension) in [
        (CompressionFormat::None, "tar"),
        (CompressionFormat::Xz, "txz"),
        (CompressionFormat::Zstd, "tzst"),
    ] {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut options = test_options();
        options.compression = compression;

        let mut packager = stream_packager(module_tar(), temp_dir.path(), None, options);
        named(&mut packager);
        let report = packager.save().unwrap();

        assert_eq!(
            report.output_path,
            temp_dir.path().join(format!("Foo_Bar-1.2.3.{}", extension))
        );
        let pkg = InspectedPackage::from_file(&report.output_path, DESCRIPTOR_FILE).unwrap();
        assert_eq!(pkg.compression, compression);
        assert_eq!(pkg.file_count(), 5);
    }
}

#[test]
fn test_gzip_source_from_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("module.tar.gz");
    fs::write(&source, gzip(&module_tar())).unwrap();
    let out_dir = temp_dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();

    let mut packager = Packager::new(
        InputSource::Path(source),
        Some(&out_dir),
        None,
        test_options(),
    )
    .unwrap();
    named(&mut packager);
    let report = packager.save().unwrap();

    assert_eq!(report.entries, 8);
    // the package itself is gzip regardless of the source compression
    let pkg = InspectedPackage::from_file(&report.output_path, DESCRIPTOR_FILE).unwrap();
    assert_eq!(pkg.compression, CompressionFormat::Gzip);
    assert!(pkg.verify(&Default::default()).is_ok());
}

#[test]
fn test_missing_output_directory_is_an_output_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("does/not/exist");

    let mut packager = stream_packager(module_tar(), &missing, None, test_options());
    named(&mut packager);
    assert!(matches!(packager.save(), Err(Error::Output { .. })));
}

#[test]
fn test_configured_rules_drive_classification() {
    let config = PackagerConfig::parse(
        r#"
[package]
name = "Foo_Bar"
version = "2.0.0"

[targets]
catch_all = "magemisc"

[[targets.rules]]
prefix = "app/code/local/"
target = "magelocal"
"#,
    )
    .unwrap();

    let mut metadata = PackageMetadata::new();
    config.apply_fields(&mut metadata);
    let options = config.options(TEST_OWNER).unwrap();
    let classifier = options.classifier.clone();

    let temp_dir = tempfile::tempdir().unwrap();
    let mut packager = stream_packager(module_tar(), temp_dir.path(), Some(metadata), options);
    let report = packager.save().unwrap();
    assert_eq!(report.output_path, temp_dir.path().join("Foo_Bar-2.0.0.tgz"));

    let pkg = InspectedPackage::from_file(&report.output_path, DESCRIPTOR_FILE).unwrap();
    let names: Vec<&str> = pkg.metadata.contents().targets().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["magelocal", "magemisc"]);
    assert_eq!(pkg.metadata.contents().target("magemisc").unwrap().root().file_count(), 3);
    assert!(pkg.verify(&classifier).is_ok());
}

#[test]
fn test_source_descriptor_is_listed_and_verified() {
    let temp_dir = tempfile::tempdir().unwrap();
    let upstream = b"<package><name>Upstream</name></package>";
    let tar = source_tar(&[
        Fixture::File("lib/Baz.php", b"x"),
        Fixture::File("package.xml", upstream),
    ]);

    let mut packager = stream_packager(tar, temp_dir.path(), None, test_options());
    named(&mut packager);
    let report = packager.save().unwrap();
    assert_eq!(report.files, 2);

    let entries = read_entries(&report.output_path);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].1, upstream.to_vec());

    // the generated descriptor wins; the copied one is an ordinary file
    let pkg = InspectedPackage::from_file(&report.output_path, DESCRIPTOR_FILE).unwrap();
    assert_eq!(pkg.name(), "Foo_Bar");
    let mage = pkg.metadata.contents().target("mage").unwrap().root();
    assert_eq!(mage.files().get("package.xml"), Some(&hash::md5(upstream)));

    let report = pkg.verify(&Default::default());
    assert_eq!(report.checked, 2);
    assert!(report.is_ok(), "{:?}", report);
}

#[test]
fn test_custom_descriptor_name_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut options = test_options();
    options.descriptor.name = "connect.xml".to_string();

    let mut packager = stream_packager(module_tar(), temp_dir.path(), None, options);
    named(&mut packager);
    let report = packager.save().unwrap();

    let (last, _) = read_entries(&report.output_path).pop().unwrap();
    assert_eq!(last.name, "connect.xml");

    let pkg = InspectedPackage::from_file(&report.output_path, "connect.xml").unwrap();
    assert_eq!(pkg.file_count(), 5);
    assert!(pkg.verify(&Default::default()).is_ok());

    assert!(matches!(
        InspectedPackage::from_file(&report.output_path, DESCRIPTOR_FILE),
        Err(Error::Validation(_))
    ));
}
