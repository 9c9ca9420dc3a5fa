//! The `RecordStore` holds every record for the lifetime of the process.
//!
//! Records are kept in insertion order. All access goes through a single
//! mutex, so concurrent requests are serialized and no update is lost.

use std::{collections::HashSet, sync::Arc};

use api_types::record::{Record, RecordNew, RecordPatch, RecordType};
use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{ResultEngine, error::EngineError};

/// Cloneable handle to the in-memory record collection.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    records: Arc<Mutex<Vec<Record>>>,
}

impl RecordStore {
    /// Return a builder for `RecordStore`. Help to build the struct.
    pub fn builder() -> RecordStoreBuilder {
        RecordStoreBuilder::default()
    }

    /// All records, in insertion order.
    pub async fn list(&self) -> Vec<Record> {
        self.records.lock().await.clone()
    }

    /// Validates `new`, assigns a fresh id and appends the record.
    ///
    /// `created_at` is stamped with the current time when the caller did not
    /// provide one.
    pub async fn create(&self, new: RecordNew) -> ResultEngine<Record> {
        validate_title(&new.title)?;
        validate_amount(new.amount)?;

        let mut records = self.records.lock().await;
        let id = Uuid::new_v4().to_string();
        if records.iter().any(|r| r.id == id) {
            return Err(EngineError::ExistingKey(id));
        }

        let record = Record {
            id,
            title: new.title,
            amount: new.amount,
            kind: new.kind,
            created_at: new.created_at.unwrap_or_else(now),
            due_date: new.due_date,
            notes: new.notes,
        };
        records.push(record.clone());
        tracing::debug!("record {} created ({} total)", record.id, records.len());

        Ok(record)
    }

    /// Merges `patch` over the record with the given id.
    ///
    /// The patch is validated before the lock is taken; on any error the
    /// store is left untouched.
    pub async fn update(&self, id: &str, patch: RecordPatch) -> ResultEngine<Record> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }

        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;

        apply_patch(record, patch);
        Ok(record.clone())
    }

    /// Removes every record with the given id and returns how many were
    /// removed. Removing an unknown id is not an error.
    pub async fn delete(&self, id: &str) -> usize {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        before - records.len()
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

fn validate_title(title: &str) -> ResultEngine<()> {
    if title.trim().is_empty() {
        return Err(EngineError::InvalidRecord("title must not be empty".to_string()));
    }
    Ok(())
}

fn validate_amount(amount: i64) -> ResultEngine<()> {
    if amount < 0 {
        return Err(EngineError::InvalidRecord(format!(
            "amount must not be negative, got {amount}"
        )));
    }
    Ok(())
}

fn apply_patch(record: &mut Record, patch: RecordPatch) {
    if let Some(title) = patch.title {
        record.title = title;
    }
    if let Some(amount) = patch.amount {
        record.amount = amount;
    }
    if let Some(kind) = patch.kind {
        record.kind = kind;
    }
    if let Some(due_date) = patch.due_date {
        record.due_date = due_date;
    }
    if let Some(notes) = patch.notes {
        record.notes = notes;
    }
}

/// Records shipped with the demo service.
pub fn demo_seed() -> Vec<Record> {
    let jan_1 = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap_or_else(|_| now());
    let jan_2 = DateTime::parse_from_rfc3339("2026-01-02T00:00:00Z").unwrap_or_else(|_| now());

    [
        ("Salary", 60_000, RecordType::Income, jan_1),
        ("Rent", 15_000, RecordType::Expense, jan_1),
        ("Freelance Project", 20_000, RecordType::Income, jan_2),
        ("Groceries", 5_000, RecordType::Expense, jan_2),
    ]
    .into_iter()
    .map(|(title, amount, kind, created_at)| Record {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        amount,
        kind,
        created_at,
        due_date: None,
        notes: None,
    })
    .collect()
}

/// The builder for `RecordStore`
#[derive(Default)]
pub struct RecordStoreBuilder {
    seed: Vec<Record>,
}

impl RecordStoreBuilder {
    /// Records the store starts with.
    pub fn seed(mut self, records: Vec<Record>) -> RecordStoreBuilder {
        self.seed = records;
        self
    }

    /// Build the store. Fails if two seed records share an id.
    pub fn build(self) -> ResultEngine<RecordStore> {
        let mut seen = HashSet::new();
        for record in &self.seed {
            if !seen.insert(record.id.as_str()) {
                return Err(EngineError::ExistingKey(record.id.clone()));
            }
        }

        Ok(RecordStore {
            records: Arc::new(Mutex::new(self.seed)),
        })
    }
}
