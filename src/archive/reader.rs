// src/archive/reader.rs

//! Source tarball reader

use crate::compression::{create_decoder, CompressionFormat};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::PathBuf;
use tar::{Archive, EntryType, Header};
use tracing::{debug, info};

/// Where the source tarball comes from
pub enum InputSource {
    /// A file on disk; FIFOs and devices are spooled like streams
    Path(PathBuf),
    /// Standard input
    Stdin,
    /// Any other non-seekable stream
    Stream(Box<dyn Read>),
}

impl InputSource {
    /// Interpret a command-line argument, `-` meaning stdin
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Stdin => "<stdin>".to_string(),
            Self::Stream(_) => "<stream>".to_string(),
        }
    }
}

impl std::fmt::Debug for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Header information of one archive entry
#[derive(Debug, Clone)]
pub struct EntryInfo {
    /// Entry path as stored in the archive
    pub name: String,
    /// Link target for symlinks and hard links
    pub link_name: Option<String>,
    /// Original header, carrying type, mode, owner and mtime
    pub header: Header,
}

impl EntryInfo {
    pub fn entry_type(&self) -> EntryType {
        self.header.entry_type()
    }

    /// Regular file entries are the ones recorded in package.xml
    pub fn is_regular_file(&self) -> bool {
        self.entry_type().is_file()
    }

    pub fn size(&self) -> u64 {
        self.header.size().unwrap_or(0)
    }

    pub fn mode(&self) -> u32 {
        self.header.mode().unwrap_or(0)
    }
}

/// An entry together with its full content
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub info: EntryInfo,
    pub content: Vec<u8>,
}

/// A source tarball opened for repeated scanning
///
/// Stream sources are copied into an anonymous temporary file, which is
/// removed when the archive is dropped.
pub struct InputArchive {
    file: File,
    compression: CompressionFormat,
    source_name: String,
    spooled: bool,
}

impl InputArchive {
    /// Open a source tarball
    pub fn open(source: InputSource) -> Result<Self> {
        let source_name = source.describe();
        let input_err = |e: io::Error| Error::Input {
            source_name: source_name.clone(),
            source: e,
        };

        let (mut file, spooled) = match source {
            InputSource::Path(path) => {
                let file = File::open(&path).map_err(input_err)?;
                if file.metadata().map_err(input_err)?.is_file() {
                    (file, false)
                } else {
                    debug!("{} is not a regular file, spooling", source_name);
                    (spool(file).map_err(input_err)?, true)
                }
            }
            InputSource::Stdin => (spool(io::stdin().lock()).map_err(input_err)?, true),
            InputSource::Stream(reader) => (spool(reader).map_err(input_err)?, true),
        };

        let compression = detect_compression(&mut file).map_err(input_err)?;
        info!(
            "Opened source archive {} (compression: {}{})",
            source_name,
            compression,
            if spooled { ", spooled" } else { "" }
        );

        Ok(Self {
            file,
            compression,
            source_name,
            spooled,
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn compression(&self) -> CompressionFormat {
        self.compression
    }

    /// Whether the input was copied into a temporary file
    pub fn is_spooled(&self) -> bool {
        self.spooled
    }

    /// Visit every entry in archive order with its content loaded
    pub fn for_each_entry<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(ArchiveEntry) -> Result<()>,
    {
        let mut archive = self.rewind()?;
        let entries = archive.entries().map_err(|e| self.input_err(e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| self.input_err(e))?;
            let info = entry_info(&entry).map_err(|e| self.input_err(e))?;

            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|e| self.input_err(e))?;

            debug!("Read entry {} ({} bytes)", info.name, content.len());
            visit(ArchiveEntry { info, content })?;
        }
        Ok(())
    }

    /// List entry headers without reading contents
    pub fn list(&self) -> Result<Vec<EntryInfo>> {
        let mut archive = self.rewind()?;
        let mut infos = Vec::new();
        for entry in archive.entries().map_err(|e| self.input_err(e))? {
            let entry = entry.map_err(|e| self.input_err(e))?;
            infos.push(entry_info(&entry).map_err(|e| self.input_err(e))?);
        }
        Ok(infos)
    }

    /// Extract the content of the first entry with the given name
    pub fn extract(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut archive = self.rewind()?;
        for entry in archive.entries().map_err(|e| self.input_err(e))? {
            let mut entry = entry.map_err(|e| self.input_err(e))?;
            if &*entry.path_bytes() != name.as_bytes() {
                continue;
            }
            let mut content = Vec::new();
            entry
                .read_to_end(&mut content)
                .map_err(|e| self.input_err(e))?;
            return Ok(Some(content));
        }
        Ok(None)
    }

    fn rewind(&self) -> Result<Archive<Box<dyn Read + '_>>> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))
            .map_err(|e| self.input_err(e))?;
        let decoder = create_decoder(BufReader::new(file), self.compression)?;
        Ok(Archive::new(decoder))
    }

    fn input_err(&self, source: io::Error) -> Error {
        Error::Input {
            source_name: self.source_name.clone(),
            source,
        }
    }
}

fn entry_info<R: Read>(entry: &tar::Entry<'_, R>) -> io::Result<EntryInfo> {
    Ok(EntryInfo {
        name: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
        link_name: entry
            .link_name_bytes()
            .map(|l| String::from_utf8_lossy(&l).into_owned()),
        header: entry.header().clone(),
    })
}

/// Copy a non-seekable stream into an anonymous temporary file
fn spool<R: Read>(mut reader: R) -> io::Result<File> {
    let mut file = tempfile::tempfile()?;
    let copied = io::copy(&mut reader, &mut file)?;
    debug!("Spooled {} bytes of input to a temporary file", copied);
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}

fn detect_compression(file: &mut File) -> io::Result<CompressionFormat> {
    let mut magic = [0u8; 6];
    let mut filled = 0;
    while filled < magic.len() {
        let n = file.read(&mut magic[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    file.seek(SeekFrom::Start(0))?;
    Ok(CompressionFormat::from_magic_bytes(&magic[..filled]))
}
