//! The application controller.
//!
//! [`App`] owns all mutable application state: the reading store, the
//! ingestion pipeline state, the active view and the zero-readings flag, and
//! the most recent user-facing message. Every user command goes through it.
//!
//! The state lock is never held across the recognition call, so other
//! commands (and a refused second Add Reading) stay responsive while an
//! image is being recognized.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::{ImageUpload, IngestOutcome, PipelineState};
use crate::reading::Reading;
use crate::recognition::RecognitionAdapter;
use crate::storage::Storage;
use crate::store::{ReadingStats, ReadingStore};
use crate::view::{self, DisplayReading, ViewMode};

/// Mutable application state.
#[derive(Debug)]
pub struct AppState {
    /// The persisted readings.
    pub store: ReadingStore,
    /// Where the ingestion pipeline is.
    pub pipeline: PipelineState,
    /// Active presentation.
    pub view_mode: ViewMode,
    /// Show distance since the first reading instead of raw values.
    pub zero_mode: bool,
    /// The most recent error message, replaced by every attempt.
    pub message: Option<String>,
}

/// A consistent view of the application for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Projected readings in chronological order.
    pub readings: Vec<DisplayReading>,
    /// Active presentation.
    pub view_mode: ViewMode,
    /// Whether values are zero-based.
    pub zero_mode: bool,
    /// Chart dataset label for the current mode.
    pub label: &'static str,
    /// The most recent error message.
    pub message: Option<String>,
    /// Pipeline state at the time of the snapshot.
    pub pipeline: PipelineState,
    /// Summary statistics.
    pub stats: ReadingStats,
}

/// Handle to the application. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct App {
    state: Arc<Mutex<AppState>>,
    recognizer: RecognitionAdapter,
}

impl App {
    /// Create an app over an already loaded store, starting in table view
    /// with absolute values.
    #[must_use]
    pub fn new(store: ReadingStore, recognizer: RecognitionAdapter) -> Self {
        Self::with_display(store, recognizer, ViewMode::default(), false)
    }

    /// Create an app with an explicit initial view and zero mode.
    #[must_use]
    pub fn with_display(
        store: ReadingStore,
        recognizer: RecognitionAdapter,
        view_mode: ViewMode,
        zero_mode: bool,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState {
                store,
                pipeline: PipelineState::Idle,
                view_mode,
                zero_mode,
                message: None,
            })),
            recognizer,
        }
    }

    /// Open the database, load the readings and build the recognizer
    /// described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the HTTP client
    /// cannot be built. Corrupt stored readings are not an error.
    pub fn open(config: &Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        let store = ReadingStore::load(storage, config.storage.slot_key.clone())?;
        let recognizer = RecognitionAdapter::from_config(config)?;

        Ok(Self::with_display(
            store,
            recognizer,
            config.display.default_view,
            config.display.zero_readings,
        ))
    }

    /// Add a reading from the image at `path`.
    ///
    /// Runs the full ingestion: load the file, recognize the value, store a
    /// new reading. Failures are reported in the outcome and as the current
    /// message; nothing is retried. If another ingestion is in flight the
    /// call returns [`IngestOutcome::Ignored`] without side effects.
    pub async fn add_reading(&self, path: &Path) -> IngestOutcome {
        {
            let mut state = self.state.lock().await;
            if !state.pipeline.begin(path) {
                return IngestOutcome::Ignored;
            }
            state.message = None;
        }

        let recognized = self.recognize(path).await;

        let mut state = self.state.lock().await;
        let stored = recognized.and_then(|value| {
            let reading = Reading::new(value);
            state.store.append(reading.clone())?;
            Ok(reading)
        });
        state.pipeline.finish();

        match stored {
            Ok(reading) => {
                info!("Added reading {} from {}", reading.value, path.display());
                IngestOutcome::Recorded(reading)
            }
            Err(err) => {
                warn!("Could not add reading from {}: {}", path.display(), err);
                let message = err.user_message();
                state.message = Some(message.clone());
                IngestOutcome::Failed(message)
            }
        }
    }

    async fn recognize(&self, path: &Path) -> Result<u32> {
        let upload = ImageUpload::load(path).await?;
        self.state.lock().await.pipeline.recognizing()?;
        self.recognizer
            .recognize(&upload.bytes, upload.mime_type)
            .await
    }

    /// Switch between table and chart. Returns the new mode.
    pub async fn toggle_view(&self) -> ViewMode {
        let mut state = self.state.lock().await;
        state.view_mode = state.view_mode.toggle();
        state.view_mode
    }

    /// Set the active view.
    pub async fn set_view(&self, view_mode: ViewMode) {
        self.state.lock().await.view_mode = view_mode;
    }

    /// Flip zero-readings mode. Returns the new setting.
    pub async fn toggle_zero_mode(&self) -> bool {
        let mut state = self.state.lock().await;
        state.zero_mode = !state.zero_mode;
        state.zero_mode
    }

    /// Set zero-readings mode.
    pub async fn set_zero_mode(&self, zero_mode: bool) {
        self.state.lock().await.zero_mode = zero_mode;
    }

    /// Delete every reading and the persisted slot. Returns how many
    /// readings were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted slot cannot be removed.
    pub async fn clear_all(&self) -> Result<usize> {
        let mut state = self.state.lock().await;
        let count = state.store.len();
        state.store.clear()?;
        state.message = None;
        Ok(count)
    }

    /// Recompute the displayed view from the current state.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().await;
        Snapshot {
            readings: view::project(state.store.readings(), state.zero_mode),
            view_mode: state.view_mode,
            zero_mode: state.zero_mode,
            label: view::dataset_label(state.zero_mode),
            message: state.message.clone(),
            pipeline: state.pipeline.clone(),
            stats: state.store.stats(),
        }
    }

    /// The most recent error message.
    pub async fn message(&self) -> Option<String> {
        self.state.lock().await.message.clone()
    }

    /// Whether a credential for the recognition service is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.recognizer.has_credential()
    }
}
