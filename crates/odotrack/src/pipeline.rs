//! The ingestion state machine.
//!
//! An ingestion moves `Idle -> Reading -> Recognizing -> Idle`. Leaving
//! `Idle` is guarded: while any ingestion is in flight, [`PipelineState::begin`]
//! refuses, which keeps a single response from ever producing two store
//! mutations. Every attempt ends back in `Idle` with no file retained.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::reading::Reading;

/// Where the pipeline currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    /// Ready for a new file.
    #[default]
    Idle,
    /// Loading the selected file.
    Reading {
        /// The selected file.
        source: PathBuf,
    },
    /// Waiting for the recognition service.
    Recognizing {
        /// The selected file.
        source: PathBuf,
    },
}

impl PipelineState {
    /// Whether a new ingestion may start.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Enter `Reading` for `source`. Returns `false`, leaving the state
    /// untouched, if an ingestion is already in flight.
    pub fn begin(&mut self, source: &Path) -> bool {
        if !self.is_idle() {
            debug!("Ignoring {}: an ingestion is in progress", source.display());
            return false;
        }
        *self = Self::Reading {
            source: source.to_path_buf(),
        };
        true
    }

    /// Move from `Reading` to `Recognizing`.
    ///
    /// # Errors
    ///
    /// Returns an internal error from any other state.
    pub fn recognizing(&mut self) -> Result<()> {
        match std::mem::take(self) {
            Self::Reading { source } => {
                *self = Self::Recognizing { source };
                Ok(())
            }
            other => {
                let err = Error::internal(format!("cannot start recognition from {other:?}"));
                *self = other;
                Err(err)
            }
        }
    }

    /// Return to `Idle`, dropping the file reference.
    pub fn finish(&mut self) {
        *self = Self::Idle;
    }
}

/// Result of one Add Reading command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A reading was recognized and stored.
    Recorded(Reading),
    /// The attempt failed; carries the user-facing message.
    Failed(String),
    /// Another ingestion was in flight, so this one never started.
    Ignored,
}

impl IngestOutcome {
    /// The stored reading, if one was recorded.
    #[must_use]
    pub fn reading(&self) -> Option<&Reading> {
        match self {
            Self::Recorded(reading) => Some(reading),
            _ => None,
        }
    }
}

/// An image loaded into memory.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// MIME type derived from the file extension.
    pub mime_type: &'static str,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

impl ImageUpload {
    /// Read `path` into memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileRead`] if the file cannot be read.
    pub async fn load(path: &Path) -> Result<Self> {
        let mime_type = mime_type_for(path);
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| Error::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        debug!("Loaded {} ({} bytes, {})", path.display(), bytes.len(), mime_type);
        Ok(Self { bytes, mime_type })
    }
}

/// Sent when the extension does not name a known image type.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// MIME type for an image path, judged by its extension.
///
/// Unknown or missing extensions map to [`FALLBACK_MIME_TYPE`]; whether the
/// bytes are an image is left to the recognition service.
#[must_use]
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        _ => FALLBACK_MIME_TYPE,
    }
}
