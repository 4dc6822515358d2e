//! Core reading types for odotrack.
//!
//! A [`Reading`] is one odometer value recognized from a photo, stamped with
//! the time it was captured. Readings are immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest value a six-digit odometer can show.
pub const MAX_ODOMETER_VALUE: u32 = 999_999;

/// A recorded odometer reading.
///
/// Serializes as `{ "id": .., "value": .., "date": .. }` with `date` as an
/// ISO-8601 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Unique identifier for this reading.
    pub id: String,

    /// The odometer value.
    pub value: u32,

    /// When the reading was captured.
    pub date: DateTime<Utc>,
}

impl Reading {
    /// Create a new reading captured now, with a fresh random id.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self::at(value, Utc::now())
    }

    /// Create a new reading with an explicit capture time.
    #[must_use]
    pub fn at(value: u32, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            value,
            date,
        }
    }
}
