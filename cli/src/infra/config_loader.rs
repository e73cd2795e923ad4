//! Filesystem implementation of the `ConfigLoader` port, and the archive
//! format uploaded to the remote service.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::application::ports::ConfigLoader;
use crate::domain::ConfigSnapshot;

/// Extensions that mark a directory as holding configuration.
const CONFIG_EXTENSIONS: &[&str] = &[".tf", ".tf.json"];

/// Reads every non-hidden file under the configuration directory.
///
/// A directory that is missing, or that contains no configuration file,
/// yields an empty snapshot.
pub struct DirConfigLoader;

impl ConfigLoader for DirConfigLoader {
    fn load(&self, dir: &Path) -> Result<ConfigSnapshot> {
        if !dir.exists() {
            return Ok(ConfigSnapshot::empty(dir));
        }
        let mut files = Vec::new();
        collect(dir, Path::new(""), &mut files)?;
        let has_config = files.iter().any(|f| is_config_file(f));
        if !has_config {
            return Ok(ConfigSnapshot::empty(dir));
        }
        tracing::debug!(dir = %dir.display(), files = files.len(), "loaded configuration");
        Ok(ConfigSnapshot::new(dir, files))
    }
}

fn is_config_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    path.components().count() == 1 && CONFIG_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

fn collect(root: &Path, rel: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let dir = root.join(rel);
    let entries =
        fs::read_dir(&dir).with_context(|| format!("cannot read {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot read {}", dir.display()))?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let rel_path = rel.join(&name);
        let file_type = entry
            .file_type()
            .with_context(|| format!("cannot stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            collect(root, &rel_path, files)?;
        } else if file_type.is_file() {
            files.push(rel_path);
        }
    }
    Ok(())
}

/// Packs the snapshot as a gzip-compressed tar archive.
///
/// An empty snapshot produces a valid empty archive.
///
/// # Errors
///
/// Returns an error if a file cannot be read.
pub fn pack_snapshot(snapshot: &ConfigSnapshot) -> Result<Vec<u8>> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for file in &snapshot.files {
        let full = snapshot.dir.join(file);
        builder
            .append_path_with_name(&full, file)
            .with_context(|| format!("cannot add {} to archive", full.display()))?;
    }
    let encoder = builder.into_inner().context("cannot finish archive")?;
    encoder.finish().context("cannot compress archive")
}
