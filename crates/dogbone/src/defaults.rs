//! Persisted user defaults for the tool parameters.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::params::ToolParameters;

#[derive(Debug, thiserror::Error)]
pub enum DefaultsError {
    #[error("defaults file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("defaults file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A JSON file holding [`ToolParameters`].
#[derive(Debug, Clone)]
pub struct DefaultsFile {
    path: PathBuf,
}

impl DefaultsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored parameters. A missing file yields the defaults; an
    /// unreadable or invalid one is replaced by the defaults.
    pub fn load(&self) -> Result<ToolParameters, DefaultsError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no defaults file, using built-in defaults");
                return Ok(ToolParameters::default());
            }
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str::<ToolParameters>(&text) {
            Ok(params) if params.validate().is_ok() => Ok(params),
            Ok(params) => {
                error!(path = ?self.path, ?params, "stored defaults out of range, rewriting");
                self.reset()
            }
            Err(err) => {
                error!(path = ?self.path, %err, "corrupt defaults file, rewriting");
                self.reset()
            }
        }
    }

    /// Write `params` as pretty JSON, creating parent directories.
    pub fn save(&self, params: &ToolParameters) -> Result<(), DefaultsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(params)?)?;
        debug!(path = ?self.path, "defaults saved");
        Ok(())
    }

    fn reset(&self) -> Result<ToolParameters, DefaultsError> {
        let params = ToolParameters::default();
        self.save(&params)?;
        Ok(params)
    }
}
