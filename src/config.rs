// Config persistence module
// Saves and restores the overlay placement as a small JSON document

use crate::error::{OverlayError, Result};
use crate::overlay::Offset;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Indentation used for saved config files
const INDENT: &[u8] = b"    ";

/// Persisted projection of the overlay state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub offset: Offset,
    pub scale_factor: f64,
    pub opacity: f64,
}

/// Name of the file a config for `image_path` is saved under
pub fn config_file_name(image_path: &Path) -> String {
    let base = image_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("config_{base}.json")
}

/// The scale factor must be finite and positive to be stored or applied
fn check_scale(path: &Path, scale_factor: f64) -> Result<()> {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        Ok(())
    } else {
        Err(OverlayError::parse(
            path,
            format!("scale_factor must be positive, got {scale_factor}"),
        ))
    }
}

/// Reads and writes config records.
///
/// Saves always land in `dir`; loads accept any path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the process working directory
    pub fn in_working_dir() -> Self {
        Self::new(PathBuf::new())
    }

    /// Write `record` to `config_<basename(image_path)>.json`, replacing any
    /// existing file, and return the path written.
    ///
    /// Records that `load` would reject are refused before anything is written.
    pub fn save(&self, record: &ConfigRecord, image_path: &Path) -> Result<PathBuf> {
        let path = self.dir.join(config_file_name(image_path));
        check_scale(&path, record.scale_factor)?;

        let mut document = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut document, formatter);
        record
            .serialize(&mut serializer)
            .map_err(|e| OverlayError::parse(&path, e.to_string()))?;
        document.push(b'\n');

        fs::write(&path, &document).map_err(|e| OverlayError::io(&path, e))?;
        info!("Config saved to {}", path.display());
        Ok(path)
    }

    /// Read and validate the record at `path`.
    ///
    /// Field ranges are not checked here except for the scale factor, which
    /// must be finite and positive.
    pub fn load(&self, path: &Path) -> Result<ConfigRecord> {
        let bytes = fs::read(path).map_err(|e| OverlayError::io(path, e))?;
        let record: ConfigRecord =
            serde_json::from_slice(&bytes).map_err(|e| OverlayError::parse(path, e.to_string()))?;
        check_scale(path, record.scale_factor)?;

        debug!("Loaded config {:?} from {}", record, path.display());
        Ok(record)
    }
}
