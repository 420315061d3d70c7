//! HCL file loading functionality.
//!
//! This module provides functions to load HCL documents from files, stdin or
//! any reader, parsing them into `HclTree` structures. Gzip-compressed input
//! is decompressed transparently.

use crate::document::parser::parse_hcl;
use crate::document::tree::HclTree;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Loads and parses an HCL file from the filesystem.
///
/// Files whose name ends in `.gz`, or whose contents start with the gzip
/// magic bytes, are decompressed before parsing.
///
/// # Examples
///
/// ```no_run
/// use hclquill::file::loader::load_hcl_file;
///
/// let tree = load_hcl_file("job.nomad").unwrap();
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - The file cannot be read (missing, permissions, etc.)
/// - A `.gz` file is not valid gzip
/// - The contents are not valid UTF-8 or not valid HCL
pub fn load_hcl_file<P: AsRef<Path>>(path: P) -> Result<HclTree> {
    let path = path.as_ref();
    let raw = fs::read(path).with_context(|| format!("Failed to read file {}", path.display()))?;
    let gzipped = is_gzipped_path(path) || raw.starts_with(&GZIP_MAGIC);
    log::debug!(
        "read {} bytes from {} (gzip: {})",
        raw.len(),
        path.display(),
        gzipped
    );

    let content = decode_text(raw, gzipped)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    parse_hcl(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Loads and parses HCL from standard input.
///
/// Reads until EOF. Gzip input is detected by its magic bytes.
///
/// # Examples
///
/// ```no_run
/// use hclquill::file::loader::load_hcl_from_stdin;
///
/// // Usage: cat job.nomad | hclquill get job[web].datacenters
/// let tree = load_hcl_from_stdin().unwrap();
/// ```
pub fn load_hcl_from_stdin() -> Result<HclTree> {
    load_hcl_from_reader(std::io::stdin().lock()).context("Failed to load HCL from stdin")
}

/// Loads and parses HCL from any reader, detecting gzip by magic bytes.
pub fn load_hcl_from_reader<R: Read>(mut reader: R) -> Result<HclTree> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw).context("Failed to read input")?;
    let gzipped = raw.starts_with(&GZIP_MAGIC);
    parse_hcl(&decode_text(raw, gzipped)?)
}

/// True when the file name ends in `.gz`.
pub(crate) fn is_gzipped_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Turns raw input into document text, inflating it first when `gzipped`.
fn decode_text(raw: Vec<u8>, gzipped: bool) -> Result<String> {
    let bytes = if gzipped {
        let mut inflated = Vec::with_capacity(raw.len() * 4);
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut inflated)
            .context("Failed to decompress gzip data")?;
        inflated
    } else {
        raw
    };
    String::from_utf8(bytes).context("Invalid UTF-8 in input")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn gzip(content: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_is_gzipped_path() {
        assert!(is_gzipped_path(Path::new("job.nomad.gz")));
        assert!(is_gzipped_path(Path::new("dir/config.hcl.gz")));
        assert!(!is_gzipped_path(Path::new("config.hcl")));
        assert!(!is_gzipped_path(Path::new("gz")));
    }

    #[test]
    fn test_load_hcl_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.hcl");
        fs::write(&path, "obj {\n  val = 56\n}\n").unwrap();

        let tree = load_hcl_file(&path).unwrap();
        assert!(tree.get_item(&[0, 0]).unwrap().has_single_key("val"));
    }

    #[test]
    fn test_load_hcl_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = load_hcl_file(dir.path().join("nope.hcl")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_load_hcl_file_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.hcl");
        fs::write(&path, "obj {\n").unwrap();
        assert!(load_hcl_file(&path).is_err());
    }

    #[test]
    fn test_load_gzipped_hcl_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.hcl.gz");
        fs::write(&path, gzip("foo = true\n")).unwrap();

        let tree = load_hcl_file(&path).unwrap();
        assert!(tree.items()[0].has_single_key("foo"));
    }

    #[test]
    fn test_load_corrupted_gzip_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.hcl.gz");
        fs::write(&path, b"not gzip data").unwrap();

        let err = load_hcl_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("decompress"), "{:#}", err);
    }

    #[test]
    fn test_load_gzip_contents_without_gz_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.nomad");
        fs::write(&path, gzip("count = 3\n")).unwrap();

        let tree = load_hcl_file(&path).unwrap();
        assert!(tree.items()[0].has_single_key("count"));
    }

    #[test]
    fn test_load_from_reader_plain_and_gzip() {
        let plain = load_hcl_from_reader("a = 1\n".as_bytes()).unwrap();
        assert_eq!(plain.items().len(), 1);

        let bytes = gzip("a = 1\nb = 2\n");
        let zipped = load_hcl_from_reader(bytes.as_slice()).unwrap();
        assert_eq!(zipped.items().len(), 2);
    }

    #[test]
    fn test_load_from_reader_rejects_invalid_utf8() {
        let err = load_hcl_from_reader(&[0xff, 0xfe, 0x00][..]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }
}
