// src/compression/mod.rs
//! Compression layer for source and package tarballs
//!
//! Source tarballs may arrive plain or compressed with gzip, xz or zstd; the
//! format is detected from magic bytes. Packages are written through the
//! matching encoder, gzip (`.tgz`) being the Magento Connect default.

use std::io::{self, Read, Write};
use std::str::FromStr;
use thiserror::Error;

/// Compression-related errors
#[derive(Error, Debug)]
pub enum CompressionError {
    #[error("Failed to create {format} decoder: {source}")]
    DecoderCreation {
        format: &'static str,
        source: io::Error,
    },

    #[error("Failed to create {format} encoder: {source}")]
    EncoderCreation {
        format: &'static str,
        source: io::Error,
    },

    #[error("Unsupported compression format: {0}")]
    UnsupportedFormat(String),
}

/// Supported compression formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionFormat {
    /// No compression (plain tar)
    None,
    /// Gzip compression
    #[default]
    Gzip,
    /// XZ/LZMA compression
    Xz,
    /// Zstandard compression
    Zstd,
}

impl CompressionFormat {
    /// Detect compression format from magic bytes
    ///
    /// Magic bytes:
    /// - Gzip: `1f 8b`
    /// - XZ: `fd 37 7a 58 5a 00` (FD + "7zXZ" + NUL)
    /// - Zstd: `28 b5 2f fd`
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x1f, 0x8b]) {
            Self::Gzip
        } else if data.starts_with(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]) {
            Self::Xz
        } else if data.starts_with(&[0x28, 0xb5, 0x2f, 0xfd]) {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// File extension used for packages written with this format
    pub fn archive_extension(&self) -> &'static str {
        match self {
            Self::None => "tar",
            Self::Gzip => "tgz",
            Self::Xz => "txz",
            Self::Zstd => "tzst",
        }
    }

    /// Get a human-readable name for this format
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Zstd => "zstd",
        }
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CompressionFormat {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "tar" => Ok(Self::None),
            "gzip" | "gz" | "tgz" => Ok(Self::Gzip),
            "xz" | "txz" => Ok(Self::Xz),
            "zstd" | "zst" | "tzst" => Ok(Self::Zstd),
            _ => Err(CompressionError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Create a decompressing reader for the given format
///
/// For `CompressionFormat::None`, returns the reader unchanged.
pub fn create_decoder<'a, R: Read + 'a>(
    reader: R,
    format: CompressionFormat,
) -> Result<Box<dyn Read + 'a>, CompressionError> {
    match format {
        CompressionFormat::None => Ok(Box::new(reader)),
        CompressionFormat::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
        CompressionFormat::Xz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
        CompressionFormat::Zstd => {
            let decoder =
                zstd::Decoder::new(reader).map_err(|e| CompressionError::DecoderCreation {
                    format: "zstd",
                    source: e,
                })?;
            Ok(Box::new(decoder))
        }
    }
}

/// A compressing writer that must be explicitly finished
///
/// Each variant writes its trailer in [`Encoder::finish`]; dropping an
/// encoder without finishing it may leave a truncated stream.
pub enum Encoder<W: Write> {
    None(W),
    Gzip(flate2::write::GzEncoder<W>),
    Xz(xz2::write::XzEncoder<W>),
    Zstd(zstd::Encoder<'static, W>),
}

/// Create a compressing writer for the given format
pub fn create_encoder<W: Write>(
    writer: W,
    format: CompressionFormat,
) -> Result<Encoder<W>, CompressionError> {
    match format {
        CompressionFormat::None => Ok(Encoder::None(writer)),
        CompressionFormat::Gzip => Ok(Encoder::Gzip(flate2::write::GzEncoder::new(
            writer,
            flate2::Compression::default(),
        ))),
        CompressionFormat::Xz => Ok(Encoder::Xz(xz2::write::XzEncoder::new(writer, 6))),
        CompressionFormat::Zstd => {
            let encoder = zstd::Encoder::new(writer, zstd::DEFAULT_COMPRESSION_LEVEL).map_err(
                |e| CompressionError::EncoderCreation {
                    format: "zstd",
                    source: e,
                },
            )?;
            Ok(Encoder::Zstd(encoder))
        }
    }
}

impl<W: Write> Encoder<W> {
    /// Flush the compressed stream trailer and return the inner writer
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::None(mut w) => {
                w.flush()?;
                Ok(w)
            }
            Self::Gzip(e) => e.finish(),
            Self::Xz(e) => e.finish(),
            Self::Zstd(e) => e.finish(),
        }
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::None(w) => w.write(buf),
            Self::Gzip(e) => e.write(buf),
            Self::Xz(e) => e.write(buf),
            Self::Zstd(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::None(w) => w.flush(),
            Self::Gzip(e) => e.flush(),
            Self::Xz(e) => e.flush(),
            Self::Zstd(e) => e.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(format: CompressionFormat) -> Vec<u8> {
        let mut encoder = create_encoder(Vec::new(), format).unwrap();
        encoder.write_all(b"package payload").unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(CompressionFormat::from_magic_bytes(&compressed), format);

        let mut decoder = create_decoder(compressed.as_slice(), format).unwrap();
        let mut output = Vec::new();
        decoder.read_to_end(&mut output).unwrap();
        output
    }

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            CompressionFormat::from_magic_bytes(&[0x1f, 0x8b, 0x08, 0x00]),
            CompressionFormat::Gzip
        );
        assert_eq!(
            CompressionFormat::from_magic_bytes(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]),
            CompressionFormat::Xz
        );
        assert_eq!(
            CompressionFormat::from_magic_bytes(&[0x28, 0xb5, 0x2f, 0xfd]),
            CompressionFormat::Zstd
        );
        assert_eq!(
            CompressionFormat::from_magic_bytes(b"app/code/local/"),
            CompressionFormat::None
        );

        // Too short for any magic
        assert_eq!(CompressionFormat::from_magic_bytes(&[0x1f]), CompressionFormat::None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("gzip".parse::<CompressionFormat>().unwrap(), CompressionFormat::Gzip);
        assert_eq!("TGZ".parse::<CompressionFormat>().unwrap(), CompressionFormat::Gzip);
        assert_eq!("tar".parse::<CompressionFormat>().unwrap(), CompressionFormat::None);
        assert_eq!("zst".parse::<CompressionFormat>().unwrap(), CompressionFormat::Zstd);
        assert!("bzip2".parse::<CompressionFormat>().is_err());
    }

    #[test]
    fn test_archive_extension() {
        assert_eq!(CompressionFormat::default().archive_extension(), "tgz");
        assert_eq!(CompressionFormat::None.archive_extension(), "tar");
        assert_eq!(CompressionFormat::Xz.archive_extension(), "txz");
        assert_eq!(CompressionFormat::Zstd.archive_extension(), "tzst");
    }

    #[test]
    fn test_encoder_roundtrip_gzip() {
        assert_eq!(roundtrip(CompressionFormat::Gzip), b"package payload");
    }

    #[test]
    fn test_encoder_roundtrip_xz() {
        assert_eq!(roundtrip(CompressionFormat::Xz), b"package payload");
    }

    #[test]
    fn test_encoder_roundtrip_zstd() {
        assert_eq!(roundtrip(CompressionFormat::Zstd), b"package payload");
    }

    #[test]
    fn test_decompress_gzip_fixture() {
        // Minimal gzip of "hello"
        let gzip_data: &[u8] = &[
            0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xcb, 0x48, 0xcd, 0xc9,
            0xc9, 0x07, 0x00, 0x86, 0xa6, 0x10, 0x36, 0x05, 0x00, 0x00, 0x00,
        ];
        let mut decoder = create_decoder(gzip_data, CompressionFormat::Gzip).unwrap();
        let mut output = Vec::new();
        decoder.read_to_end(&mut output).unwrap();
        assert_eq!(output, b"hello");
    }
}
