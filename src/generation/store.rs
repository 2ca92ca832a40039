//! Concurrent in-memory store for generation records

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

use crate::error::{AppError, Result};
use crate::generation::record::{GenerationRecord, GenerationUpdate};

/// Stored entry; `seq` breaks `created_at` ties so the recency ordering is
/// deterministic.
#[derive(Debug, Clone)]
struct StoredRecord {
    seq: u64,
    record: GenerationRecord,
}

/// Keyed table of generation records.
///
/// All state is process-local; nothing survives a restart. Updates are scoped
/// to one record by id, so dashmap's per-shard locking is the only
/// coordination needed.
pub struct GenerationStore {
    records: DashMap<String, StoredRecord>,
    next_seq: AtomicU64,
}

impl GenerationStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Create a pending record with a fresh identity and store it
    pub fn create(&self, prompt: String, image_urls: Vec<String>) -> GenerationRecord {
        let record = GenerationRecord::new(prompt, image_urls);
        // A v4 UUID collision would be a bug elsewhere; surface it loudly.
        if let Err(e) = self.insert(record.clone()) {
            warn!(error = %e, "Generated id collided with an existing record");
        }
        record
    }

    /// Insert a record under its own id, rejecting duplicates
    pub fn insert(&self, record: GenerationRecord) -> Result<()> {
        use dashmap::mapref::entry::Entry;

        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(AppError::DuplicateId(record.id)),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(StoredRecord { seq, record });
                Ok(())
            }
        }
    }

    /// Point lookup; absence is an ordinary outcome, never a failure
    pub fn get(&self, id: &str) -> Option<GenerationRecord> {
        self.records.get(id).map(|entry| entry.record.clone())
    }

    /// Merge the given fields into the record, returning the updated copy.
    ///
    /// Returns `None` when the id is unknown. Terminal records are sticky:
    /// an update arriving after `completed`/`failed` is dropped and the
    /// existing record returned unchanged.
    pub fn update(&self, id: &str, update: GenerationUpdate) -> Option<GenerationRecord> {
        let mut entry = self.records.get_mut(id)?;
        let record = &mut entry.record;

        if record.status.is_terminal() {
            warn!(id = %id, status = ?record.status, "Dropped update to terminal record");
            return Some(record.clone());
        }

        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(result_url) = update.result_url {
            record.result_url = Some(result_url);
        }
        if let Some(error) = update.error {
            record.error = Some(error);
        }
        if let Some(completed_at) = update.completed_at {
            record.completed_at = Some(completed_at);
        }

        Some(record.clone())
    }

    /// Up to `limit` most recently created records, newest first
    pub fn recent(&self, limit: usize) -> Vec<GenerationRecord> {
        let mut entries: Vec<StoredRecord> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        entries.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        entries.truncate(limit);
        entries.into_iter().map(|e| e.record).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for GenerationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::record::GenerationStatus;

    fn store_with(n: usize) -> GenerationStore {
        let store = GenerationStore::new();
        for i in 0..n {
            store.create(format!("prompt {i}"), vec!["https://x/a.png".to_string()]);
        }
        store
    }

    #[test]
    fn test_create_and_get() {
        let store = GenerationStore::new();
        let record = store.create("make it blue".to_string(), vec!["https://x/a.png".to_string()]);

        let fetched = store.get(&record.id).expect("record should exist");
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.status, GenerationStatus::Pending);
    }

    #[test]
    fn test_get_unknown_id_is_none() {
        let store = GenerationStore::new();
        assert!(store.get("no-such-id").is_none());
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let store = GenerationStore::new();
        let record = GenerationRecord::new("p".to_string(), vec![]);

        store.insert(record.clone()).unwrap();
        let err = store.insert(record).unwrap_err();
        assert!(matches!(err, AppError::DuplicateId(_)));
    }

    #[test]
    fn test_update_unknown_id_is_none() {
        let store = GenerationStore::new();
        assert!(store.update("no-such-id", GenerationUpdate::processing()).is_none());
    }

    #[test]
    fn test_update_merges_fields() {
        let store = GenerationStore::new();
        let record = store.create("p".to_string(), vec!["https://x/a.png".to_string()]);

        let updated = store.update(&record.id, GenerationUpdate::processing()).unwrap();
        assert_eq!(updated.status, GenerationStatus::Processing);
        assert!(updated.result_url.is_none());

        let done = store
            .update(&record.id, GenerationUpdate::completed("https://cdn/out.png".to_string()))
            .unwrap();
        assert_eq!(done.status, GenerationStatus::Completed);
        assert_eq!(done.result_url.as_deref(), Some("https://cdn/out.png"));
        assert!(done.error.is_none());
        assert!(done.completed_at.is_some());
    }

    #[test]
    fn test_terminal_records_are_sticky() {
        let store = GenerationStore::new();
        let record = store.create("p".to_string(), vec!["https://x/a.png".to_string()]);

        store
            .update(&record.id, GenerationUpdate::failed("model exploded".to_string()))
            .unwrap();

        let after = store
            .update(&record.id, GenerationUpdate::completed("https://cdn/out.png".to_string()))
            .unwrap();
        assert_eq!(after.status, GenerationStatus::Failed);
        assert!(after.result_url.is_none());
        assert_eq!(after.error.as_deref(), Some("model exploded"));
    }

    #[test]
    fn test_recent_is_bounded_and_newest_first() {
        let store = store_with(15);

        let recent = store.recent(10);
        assert_eq!(recent.len(), 10);
        for pair in recent.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        // Newest prompt was created last
        assert_eq!(recent[0].prompt, "prompt 14");
    }

    #[test]
    fn test_recent_with_fewer_records_than_limit() {
        let store = store_with(3);
        assert_eq!(store.recent(10).len(), 3);
    }
}
