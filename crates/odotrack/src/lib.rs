//! `odotrack` - An odometer log that reads its entries from photos
//!
//! This library provides the core functionality for recognizing odometer
//! values in images, persisting the resulting readings, and projecting them
//! into the table and chart views.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod reading;
pub mod recognition;
pub mod render;
pub mod storage;
pub mod store;
pub mod view;

pub use app::{App, Snapshot};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use pipeline::{IngestOutcome, PipelineState};
pub use reading::Reading;
pub use recognition::{GeminiClient, RecognitionAdapter, RecognitionService};
pub use storage::Storage;
pub use store::{ReadingStats, ReadingStore};
pub use view::{project, DisplayReading, ViewMode};
