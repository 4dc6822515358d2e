//! The reading store.
//!
//! [`ReadingStore`] owns the in-process reading collection and mirrors it to a
//! single storage slot as a JSON array. Every mutation rewrites the whole
//! slot; clearing removes the slot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::reading::Reading;
use crate::storage::Storage;

/// The persisted collection of readings.
#[derive(Debug)]
pub struct ReadingStore {
    storage: Storage,
    key: String,
    readings: Vec<Reading>,
}

impl ReadingStore {
    /// Load the collection stored under `key`.
    ///
    /// A missing slot yields an empty collection. A slot that cannot be
    /// decoded is logged and also yields an empty collection; the corrupt
    /// value is left in place until the next write replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage itself cannot be read.
    pub fn load(storage: Storage, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let readings = match storage.get(&key)? {
            None => Vec::new(),
            Some(raw) => match decode(&raw) {
                Ok(readings) => readings,
                Err(err) => {
                    warn!("Ignoring stored readings in slot {}: {}", key, err);
                    Vec::new()
                }
            },
        };

        debug!("Loaded {} readings from slot {}", readings.len(), key);
        Ok(Self {
            storage,
            key,
            readings,
        })
    }

    /// Persist the full collection, overwriting the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn save(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.readings)?;
        self.storage.set(&self.key, &raw)
    }

    /// Add a reading and persist the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be persisted, in which case
    /// the reading is not added.
    pub fn append(&mut self, reading: Reading) -> Result<()> {
        let (value, id) = (reading.value, reading.id.clone());
        self.readings.push(reading);
        if let Err(err) = self.save() {
            self.readings.pop();
            return Err(err);
        }
        info!("Recorded reading {} ({})", value, id);
        Ok(())
    }

    /// Remove every reading and delete the persisted slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed; the readings are
    /// kept in that case.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(&self.key)?;
        info!("Cleared {} readings", self.readings.len());
        self.readings.clear();
        Ok(())
    }

    /// The readings in insertion order.
    #[must_use]
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Number of readings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// The slot the collection is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Summary statistics over the collection.
    #[must_use]
    pub fn stats(&self) -> ReadingStats {
        let earliest = self.readings.iter().min_by_key(|r| r.date);
        let latest = self.readings.iter().max_by_key(|r| r.date);

        ReadingStats {
            total_readings: self.readings.len(),
            first_reading: earliest.map(|r| r.date),
            last_reading: latest.map(|r| r.date),
            first_value: earliest.map(|r| r.value),
            last_value: latest.map(|r| r.value),
            distance: match (earliest, latest) {
                (Some(first), Some(last)) => i64::from(last.value) - i64::from(first.value),
                _ => 0,
            },
        }
    }
}

fn decode(raw: &str) -> Result<Vec<Reading>> {
    serde_json::from_str(raw).map_err(|source| Error::PersistenceParse { source })
}

/// Statistics about the stored readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingStats {
    /// Total number of readings.
    pub total_readings: usize,
    /// Capture time of the earliest reading.
    pub first_reading: Option<DateTime<Utc>>,
    /// Capture time of the latest reading.
    pub last_reading: Option<DateTime<Utc>>,
    /// Value of the earliest reading.
    pub first_value: Option<u32>,
    /// Value of the latest reading.
    pub last_value: Option<u32>,
    /// Latest value minus earliest value.
    pub distance: i64,
}
