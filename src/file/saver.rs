//! HCL file saving functionality.
//!
//! This module writes `HclTree` structures to sinks and files. File saves are
//! atomic (temp file then rename), optionally keep a `.bak` copy of the
//! previous file, and gzip the output when the target name ends in `.gz`.

use super::loader::is_gzipped_path;
use crate::config::Config;
use crate::document::parser::parse_hcl;
use crate::document::printer::serialize_tree;
use crate::document::tree::HclTree;
use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Renders a tree with the configured indent, plus one trailing newline.
pub fn render_hcl(tree: &HclTree, config: &Config) -> String {
    let mut text = serialize_tree(tree, config.indent_size);
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

/// Writes the rendered document to `sink`.
///
/// # Examples
///
/// ```
/// use hclquill::config::Config;
/// use hclquill::document::parser::parse_hcl;
/// use hclquill::file::saver::write_hcl;
///
/// let tree = parse_hcl("foo=true").unwrap();
/// let mut out = Vec::new();
/// write_hcl(&mut out, &tree, &Config::default()).unwrap();
/// assert_eq!(out, b"foo = true\n");
/// ```
pub fn write_hcl<W: Write>(sink: &mut W, tree: &HclTree, config: &Config) -> Result<()> {
    sink.write_all(render_hcl(tree, config).as_bytes())
        .context("Failed to write HCL")?;
    sink.flush().context("Failed to flush output")?;
    Ok(())
}

/// `job.nomad` is backed up as `job.nomad.bak`, next to it.
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Saves an HCL tree to a file.
///
/// # Examples
///
/// ```no_run
/// use hclquill::config::Config;
/// use hclquill::document::parser::parse_hcl;
/// use hclquill::file::saver::save_hcl_file;
///
/// let tree = parse_hcl("foo = true\n").unwrap();
/// save_hcl_file("out.hcl", &tree, &Config::default()).unwrap();
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - The rendered text does not parse back as HCL (nothing is written)
/// - Backup creation fails (if requested)
/// - Writing the staged file or moving it over `path` fails
pub fn save_hcl_file<P: AsRef<Path>>(path: P, tree: &HclTree, config: &Config) -> Result<()> {
    let path = path.as_ref();
    let text = render_hcl(tree, config);

    // Validate the rendered HCL before touching the disk
    parse_hcl(&text).context("Generated invalid HCL - refusing to write it")?;

    if config.create_backup && path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).with_context(|| {
            format!("Failed to back up {} to {}", path.display(), backup.display())
        })?;
        log::debug!("backed up {} to {}", path.display(), backup.display());
    }

    replace_file(path, text.as_bytes(), is_gzipped_path(path))?;
    log::info!("saved {}", path.display());
    Ok(())
}

/// Stages `data` in an anonymous file beside `path`, then moves it over
/// `path` in one rename. An existing target keeps its permissions.
fn replace_file(path: &Path, data: &[u8], compress: bool) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;

    if let Ok(metadata) = fs::metadata(path) {
        staged
            .as_file()
            .set_permissions(metadata.permissions())
            .context("Failed to copy permissions to temp file")?;
    }

    if compress {
        let mut encoder = GzEncoder::new(staged.as_file_mut(), Compression::default());
        encoder.write_all(data).context("Failed to compress output")?;
        encoder.finish().context("Failed to compress output")?;
    } else {
        staged.write_all(data).context("Failed to write temp file")?;
    }
    staged.as_file().sync_all().context("Failed to sync temp file")?;

    staged
        .persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
