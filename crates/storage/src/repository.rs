//! Repository Implementation

use crate::level::LevelInfo;
use crate::StorageError;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use session::{SessionError, SessionRecord, SessionSink};
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Default number of sessions kept
pub const DEFAULT_MAX_ENTRIES: usize = 1_000;

/// One stored session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub id: Uuid,
    /// Local wall time the session was saved
    pub recorded_at: NaiveDateTime,
    pub record: SessionRecord,
    /// Star rating, 1 to 5
    pub rating: Option<u8>,
}

/// History filter by the hour a session was saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    #[default]
    All,
    /// 05:00 to 11:59
    Morning,
    /// 12:00 to 17:59
    Afternoon,
    /// 18:00 to 04:59
    Evening,
}

impl TimeOfDay {
    pub fn matches(&self, at: &NaiveDateTime) -> bool {
        let hour = at.hour();
        match self {
            TimeOfDay::All => true,
            TimeOfDay::Morning => (5..12).contains(&hour),
            TimeOfDay::Afternoon => (12..18).contains(&hour),
            TimeOfDay::Evening => hour >= 18 || hour < 5,
        }
    }
}

/// Session history (in-memory, bounded)
pub struct HistoryRepository {
    /// Entries in insertion order
    entries: Mutex<VecDeque<SessionEntry>>,
    max_entries: usize,
}

impl HistoryRepository {
    /// Create a repository keeping up to `DEFAULT_MAX_ENTRIES` sessions
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        info!("Creating session history (max {} entries)", max_entries);
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Store a finished session
    pub fn record(
        &self,
        record: SessionRecord,
        rating: Option<u8>,
        recorded_at: NaiveDateTime,
    ) -> Result<Uuid, StorageError> {
        if let Some(r) = rating {
            validate_rating(r)?;
        }

        let entry = SessionEntry {
            id: Uuid::new_v4(),
            recorded_at,
            record,
            rating,
        };
        let id = entry.id;

        let mut entries = self.lock()?;
        while entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
        debug!("Stored session {} ({} chews)", id, record.chew_count);

        Ok(id)
    }

    /// Rate or re-rate a stored session
    pub fn rate(&self, id: Uuid, rating: u8) -> Result<(), StorageError> {
        validate_rating(rating)?;

        let mut entries = self.lock()?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StorageError::NotFound)?;
        entry.rating = Some(rating);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Result<SessionEntry, StorageError> {
        let entries = self.lock()?;
        entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    /// Sessions matching the filter; `All` is newest first, the rest chronological
    pub fn history(&self, filter: TimeOfDay) -> Result<Vec<SessionEntry>, StorageError> {
        let entries = self.lock()?;
        let mut selected: Vec<_> = entries
            .iter()
            .filter(|e| filter.matches(&e.recorded_at))
            .cloned()
            .collect();

        selected.sort_by_key(|e| e.recorded_at);
        if filter == TimeOfDay::All {
            selected.reverse();
        }
        Ok(selected)
    }

    /// Sum of chew counts over all stored sessions
    pub fn total_chews(&self) -> Result<u64, StorageError> {
        let entries = self.lock()?;
        entries
            .iter()
            .try_fold(0u64, |total, e| total.checked_add(e.record.chew_count))
            .ok_or(StorageError::Overflow)
    }

    pub fn level(&self) -> Result<LevelInfo, StorageError> {
        Ok(LevelInfo::from_total(self.total_chews()?))
    }

    /// Serialize the whole history
    pub fn export(&self) -> Result<Vec<u8>, StorageError> {
        let entries = self.lock()?;
        let list: Vec<&SessionEntry> = entries.iter().collect();
        postcard::to_allocvec(&list).map_err(|e| StorageError::SerializationError(e.to_string()))
    }

    /// Merge an exported history; entries already present are skipped
    pub fn import(&self, bytes: &[u8]) -> Result<usize, StorageError> {
        let incoming: Vec<SessionEntry> = postcard::from_bytes(bytes)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        for rating in incoming.iter().filter_map(|e| e.rating) {
            validate_rating(rating)?;
        }

        let mut entries = self.lock()?;
        let known: HashSet<Uuid> = entries.iter().map(|e| e.id).collect();

        let mut added = 0;
        for entry in incoming {
            if known.contains(&entry.id) {
                continue;
            }
            entries.push_back(entry);
            added += 1;
        }

        entries.make_contiguous().sort_by_key(|e| e.recorded_at);
        while entries.len() > self.max_entries {
            entries.pop_front();
        }

        info!("Imported {} sessions", added);
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all data
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<SessionEntry>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl Default for HistoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Unrated sessions handed over at the end of tracking
impl SessionSink for HistoryRepository {
    fn accept(&self, record: SessionRecord) -> Result<(), SessionError> {
        self.record(record, None, Local::now().naive_local())
            .map(|_| ())
            .map_err(|e| SessionError::Sink(e.to_string()))
    }
}

fn validate_rating(rating: u8) -> Result<(), StorageError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(StorageError::InvalidRating(rating))
    }
}
