//! The daily entry store: at most one record per day key, newest first,
//! rewritten in full to the key-value backend after every mutation.

use crate::day_key::{canonical_day_key, date_key, day_key, parse_day_key};
use crate::errors::StoreError;
use crate::models::{Choice, EntryRecord};
use crate::storage::{ENTRIES_KEY, KeyValueStore};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use std::collections::HashSet;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What `load` does with a blob that does not decode cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryPolicy {
    /// Any decode failure empties the collection.
    #[default]
    DiscardAll,
    /// Keep every array element that decodes on its own; drop the rest.
    KeepValid,
}

impl RecoveryPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discard" | "discard-all" => Some(Self::DiscardAll),
            "keep-valid" | "keep_valid" => Some(Self::KeepValid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Missing,
    Loaded { count: usize },
    Recovered { kept: usize, dropped: usize },
    Reset,
}

const SEED_CAPTIONS: [&str; 10] = [
    "Went to bed on time",
    "Short walk after lunch",
    "Cleared the inbox",
    "Cooked at home",
    "Read twenty pages",
    "Called an old friend",
    "No phone before breakfast",
    "Finished the draft",
    "Stretched in the morning",
    "Tidied the desk",
];

pub struct EntryStore<S> {
    backend: S,
    entries: Vec<EntryRecord>,
    policy: RecoveryPolicy,
    loaded: bool,
    changes: watch::Sender<u64>,
}

impl<S: KeyValueStore> EntryStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_policy(backend, RecoveryPolicy::default())
    }

    pub fn with_policy(backend: S, policy: RecoveryPolicy) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            backend,
            entries: Vec::new(),
            policy,
            loaded: false,
            changes,
        }
    }

    /// Snapshot of all records, most recent day first.
    pub fn entries(&self) -> &[EntryRecord] {
        &self.entries
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn policy(&self) -> RecoveryPolicy {
        self.policy
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Receiver whose value is bumped after every load and mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.changes.borrow()
    }

    pub fn load(&mut self) -> LoadOutcome {
        let outcome = match self.backend.get(ENTRIES_KEY) {
            Ok(Some(bytes)) => self.decode(&bytes),
            Ok(None) => {
                self.entries.clear();
                LoadOutcome::Missing
            }
            Err(err) => {
                warn!("{}", StoreError::PersistenceRead(err));
                self.entries.clear();
                LoadOutcome::Reset
            }
        };

        self.loaded = true;
        self.notify();
        info!(?outcome, entries = self.entries.len(), "entries loaded");
        outcome
    }

    pub fn save(&mut self, choice: Choice, caption: &str) -> Result<EntryRecord, StoreError> {
        self.save_at(choice, caption, &Local::now())
    }

    /// Saves the judgment for the local day of `at`, replacing any record
    /// already stored for that day.
    ///
    /// On a write failure the in-memory collection keeps the new record and
    /// the error is returned.
    pub fn save_at<Tz: TimeZone>(
        &mut self,
        choice: Choice,
        caption: &str,
        at: &DateTime<Tz>,
    ) -> Result<EntryRecord, StoreError> {
        let record = EntryRecord {
            day_key: day_key(at),
            created_at: at.with_timezone(&Utc),
            choice,
            caption: caption.trim().to_string(),
        };

        self.upsert(record.clone());
        debug!(day_key = %record.day_key, choice = record.choice.value(), "entry saved");
        self.commit()?;
        Ok(record)
    }

    /// Removes the record for `day_key`. An absent key is not an error.
    pub fn delete(&mut self, day_key: &str) -> Result<(), StoreError> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.day_key != day_key);
        debug!(day_key, removed = before - self.entries.len(), "entry deleted");
        self.commit()
    }

    pub fn entry(&self) -> Option<&EntryRecord> {
        self.entry_at(&Local::now())
    }

    pub fn entry_at<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> Option<&EntryRecord> {
        self.find(&day_key(at))
    }

    pub fn find(&self, day_key: &str) -> Option<&EntryRecord> {
        self.entries.iter().find(|entry| entry.day_key == day_key)
    }

    /// Looks up a caller-supplied key, accepting unpadded forms such as `2026-2-5`.
    pub fn find_key(&self, raw: &str) -> Result<Option<&EntryRecord>, StoreError> {
        let key = canonical_day_key(raw)?;
        Ok(self.find(&key))
    }

    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        debug!("all entries cleared");
        self.commit()
    }

    pub fn seed_test_data(&mut self) -> Result<(), StoreError> {
        self.seed_test_data_at(&Local::now())
    }

    /// Debug affordance: an `Up` record for each of the ten days ending at
    /// `now`, written in one pass.
    pub fn seed_test_data_at<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<(), StoreError> {
        let today = now.date_naive();
        for (offset, caption) in (0..SEED_CAPTIONS.len() as i64).rev().zip(SEED_CAPTIONS) {
            self.upsert(EntryRecord {
                day_key: date_key(today - Duration::days(offset)),
                created_at: now.with_timezone(&Utc) - Duration::days(offset),
                choice: Choice::Up,
                caption: caption.to_string(),
            });
        }
        debug!(count = SEED_CAPTIONS.len(), "test data seeded");
        self.commit()
    }

    fn upsert(&mut self, record: EntryRecord) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.day_key == record.day_key)
        {
            Some(existing) => *existing = record,
            None => self.entries.push(record),
        }
        sort_newest_first(&mut self.entries);
    }

    fn decode(&mut self, bytes: &[u8]) -> LoadOutcome {
        match self.policy {
            RecoveryPolicy::DiscardAll => match serde_json::from_slice::<Vec<EntryRecord>>(bytes) {
                Ok(entries) => {
                    self.entries = entries;
                    let duplicates = dedup_by_day_key(&mut self.entries);
                    if duplicates > 0 {
                        warn!(duplicates, "dropped duplicate day keys");
                    }
                    sort_newest_first(&mut self.entries);
                    LoadOutcome::Loaded {
                        count: self.entries.len(),
                    }
                }
                Err(err) => {
                    warn!("{}, discarding stored history", StoreError::Deserialization(err));
                    self.entries.clear();
                    LoadOutcome::Reset
                }
            },
            RecoveryPolicy::KeepValid => {
                let values = match serde_json::from_slice::<Vec<serde_json::Value>>(bytes) {
                    Ok(values) => values,
                    Err(err) => {
                        warn!("{}, discarding stored history", StoreError::Deserialization(err));
                        self.entries.clear();
                        return LoadOutcome::Reset;
                    }
                };

                let total = values.len();
                self.entries = values
                    .into_iter()
                    .filter_map(|value| serde_json::from_value::<EntryRecord>(value).ok())
                    .filter(|entry| parse_day_key(&entry.day_key).is_ok())
                    .collect();
                dedup_by_day_key(&mut self.entries);
                sort_newest_first(&mut self.entries);

                let kept = self.entries.len();
                if kept == total {
                    LoadOutcome::Loaded { count: kept }
                } else {
                    let dropped = total - kept;
                    warn!(kept, dropped, "recovered well-formed entries");
                    LoadOutcome::Recovered { kept, dropped }
                }
            }
        }
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.notify();
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(&self.entries).map_err(StoreError::Serialization)?;
        if let Err(err) = self.backend.set(ENTRIES_KEY, &payload) {
            let err = StoreError::PersistenceWrite(err);
            error!("{err}");
            return Err(err);
        }
        Ok(())
    }

    fn notify(&self) {
        self.changes.send_modify(|revision| *revision += 1);
    }
}

fn sort_newest_first(entries: &mut [EntryRecord]) {
    entries.sort_by(|a, b| b.day_key.cmp(&a.day_key));
}

/// Keeps the first record seen for each day key; returns how many were removed.
fn dedup_by_day_key(entries: &mut Vec<EntryRecord>) -> usize {
    let before = entries.len();
    let mut seen = HashSet::new();
    entries.retain(|entry| seen.insert(entry.day_key.clone()));
    before - entries.len()
}
