//! Client-side view of the record store.
//!
//! The provider never edits its cached records: every mutation goes through
//! the API and is followed by a full refresh.

use std::future::Future;

use api_types::record::{Record, RecordNew, RecordPatch, RecordType};
use chrono::{DateTime, FixedOffset, Utc};

use crate::client::ClientError;

/// Operations the provider needs from the records service.
pub trait RecordsApi {
    fn list(&self) -> impl Future<Output = Result<Vec<Record>, ClientError>>;
    fn create(&self, new: &RecordNew) -> impl Future<Output = Result<Record, ClientError>>;
    fn update(
        &self,
        id: &str,
        patch: &RecordPatch,
    ) -> impl Future<Output = Result<Record, ClientError>>;
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), ClientError>>;
}

/// A record as entered by the user, before the creation time is stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub title: String,
    pub amount: i64,
    pub kind: RecordType,
    pub due_date: Option<DateTime<FixedOffset>>,
    pub notes: Option<String>,
}

impl RecordDraft {
    fn stamped(self, created_at: DateTime<FixedOffset>) -> RecordNew {
        RecordNew {
            title: self.title,
            amount: self.amount,
            kind: self.kind,
            created_at: Some(created_at),
            due_date: self.due_date,
            notes: self.notes,
        }
    }
}

/// Records as last seen by the client.
///
/// Refresh results are applied in the order the refreshes were issued: a
/// response older than the last applied one is dropped.
#[derive(Debug, Default)]
pub struct RecordsState {
    pub records: Vec<Record>,
    pub loading: bool,
    pub error: Option<String>,
    issued: u64,
    applied: u64,
}

impl RecordsState {
    /// Marks a refresh as in flight and returns its token.
    pub fn begin_refresh(&mut self) -> u64 {
        self.issued += 1;
        self.loading = true;
        self.issued
    }

    /// Applies the outcome of the refresh identified by `token`.
    ///
    /// Returns `false` if the result was stale and discarded. A failure keeps
    /// the previous records.
    pub fn finish_refresh(&mut self, token: u64, result: Result<Vec<Record>, ClientError>) -> bool {
        if token <= self.applied {
            tracing::debug!("discarding stale refresh {token} (applied {})", self.applied);
            return false;
        }
        self.applied = token;
        if token == self.issued {
            self.loading = false;
        }

        match result {
            Ok(records) => {
                self.records = records;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!("Failed to fetch records: {err}");
                self.error = Some(err.to_string());
            }
        }
        true
    }
}

pub struct RecordsProvider<A> {
    api: A,
    state: RecordsState,
}

impl<A: RecordsApi> RecordsProvider<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: RecordsState::default(),
        }
    }

    pub fn state(&self) -> &RecordsState {
        &self.state
    }

    pub fn records(&self) -> &[Record] {
        &self.state.records
    }

    /// Re-fetches the whole list.
    pub async fn refresh(&mut self) {
        let token = self.start_refresh();
        self.complete_refresh(token).await;
    }

    /// Marks a refresh as in flight without fetching yet, so the caller can
    /// show it before waiting on the network.
    pub fn start_refresh(&mut self) -> u64 {
        self.state.begin_refresh()
    }

    /// Fetches the list for a refresh handed out by `start_refresh`.
    pub async fn complete_refresh(&mut self, token: u64) {
        let result = self.api.list().await;
        self.state.finish_refresh(token, result);
    }

    /// Creates a record stamped with the current time, then refreshes.
    pub async fn add(&mut self, draft: RecordDraft) -> Result<Record, ClientError> {
        let new = draft.stamped(Utc::now().fixed_offset());
        let result = self.api.create(&new).await;
        self.settle("add record", result).await
    }

    pub async fn update(&mut self, id: &str, patch: RecordPatch) -> Result<Record, ClientError> {
        let result = self.api.update(id, &patch).await;
        self.settle("update record", result).await
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), ClientError> {
        let result = self.api.delete(id).await;
        self.settle("delete record", result).await
    }

    /// Refreshes after a mutation, whatever its outcome. A mutation error
    /// outlives the refresh.
    async fn settle<T>(
        &mut self,
        action: &str,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        self.refresh().await;
        if let Err(err) = &result {
            tracing::warn!("Failed to {action}: {err}");
            self.state.error = Some(format!("Failed to {action}: {err}"));
        }
        result
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use super::*;

    /// In-memory stand-in for the service. `fail_next` makes the next call
    /// fail with a server error.
    #[derive(Clone, Default)]
    pub(crate) struct FakeApi {
        records: Arc<Mutex<Vec<Record>>>,
        failures: Arc<Mutex<VecDeque<&'static str>>>,
        next_id: Arc<Mutex<u32>>,
    }

    impl FakeApi {
        pub(crate) fn fail_next(&self, call: &'static str) {
            self.failures.lock().unwrap().push_back(call);
        }

        fn check(&self, call: &str) -> Result<(), ClientError> {
            let mut failures = self.failures.lock().unwrap();
            if failures.front() == Some(&call) {
                failures.pop_front();
                return Err(ClientError::Server("boom".to_string()));
            }
            Ok(())
        }
    }

    impl RecordsApi for FakeApi {
        async fn list(&self) -> Result<Vec<Record>, ClientError> {
            self.check("list")?;
            Ok(self.records.lock().unwrap().clone())
        }

        async fn create(&self, new: &RecordNew) -> Result<Record, ClientError> {
            self.check("create")?;
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let record = Record {
                id: next_id.to_string(),
                title: new.title.clone(),
                amount: new.amount,
                kind: new.kind,
                created_at: new.created_at.unwrap_or_else(|| Utc::now().fixed_offset()),
                due_date: new.due_date,
                notes: new.notes.clone(),
            };
            self.records.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn update(&self, id: &str, patch: &RecordPatch) -> Result<Record, ClientError> {
            self.check("update")?;
            let mut records = self.records.lock().unwrap();
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(ClientError::NotFound)?;
            if let Some(amount) = patch.amount {
                record.amount = amount;
            }
            if let Some(title) = &patch.title {
                record.title = title.clone();
            }
            Ok(record.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), ClientError> {
            self.check("delete")?;
            self.records.lock().unwrap().retain(|r| r.id != id);
            Ok(())
        }
    }
}
