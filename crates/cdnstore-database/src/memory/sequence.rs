//! In-memory sequence counter repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use cdnstore_core::error::AppError;
use cdnstore_core::result::AppResult;
use cdnstore_entity::sequence::{CodePlan, DateTag, NewSequenceCounter, SequenceCounter};

use super::unavailable;
use crate::repositories::SequenceRepository;

#[derive(Debug, Default)]
struct InnerState {
    counters: BTreeMap<String, SequenceCounter>,
    /// Successful counter writes (seeds and advances).
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

/// Sequence repository holding counters in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySequenceRepository {
    state: Arc<Mutex<InnerState>>,
}

impl MemorySequenceRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make lookups fail.
    pub async fn fail_reads(&self, fail: bool) {
        self.state.lock().await.fail_reads = fail;
    }

    /// Make seeds and advances fail.
    pub async fn fail_writes(&self, fail: bool) {
        self.state.lock().await.fail_writes = fail;
    }

    /// Number of successful writes so far.
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.writes
    }

    /// Overwrite a stored counter's queue and separator without any checks.
    pub async fn force_state(&self, alias: &str, queue: i32, separator: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let counter = state
            .counters
            .get_mut(alias)
            .ok_or_else(|| AppError::not_found(format!("Sequence counter '{alias}' not found")))?;
        counter.queue = queue;
        counter.separator = separator.to_string();
        Ok(())
    }
}

#[async_trait]
impl SequenceRepository for MemorySequenceRepository {
    async fn find_by_alias(&self, alias: &str) -> AppResult<Option<SequenceCounter>> {
        let state = self.state.lock().await;
        if state.fail_reads {
            return Err(unavailable("Failed to find sequence counter"));
        }
        Ok(state.counters.get(alias).cloned())
    }

    async fn list(&self) -> AppResult<Vec<SequenceCounter>> {
        let state = self.state.lock().await;
        if state.fail_reads {
            return Err(unavailable("Failed to list sequence counters"));
        }
        Ok(state.counters.values().cloned().collect())
    }

    async fn create(&self, data: &NewSequenceCounter) -> AppResult<SequenceCounter> {
        data.validate()?;
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(unavailable("Failed to create sequence counter"));
        }
        if state.counters.contains_key(&data.alias) {
            return Err(AppError::conflict(format!(
                "Sequence counter '{}' already exists",
                data.alias
            )));
        }

        let now = Utc::now();
        let counter = SequenceCounter {
            id: Uuid::now_v7(),
            alias: data.alias.clone(),
            prefix: data.prefix.clone(),
            suffix: data.suffix.clone(),
            queue: data.queue,
            separator: data.separator.clone(),
            created_at: now,
            updated_at: now,
        };
        state.counters.insert(data.alias.clone(), counter.clone());
        state.writes += 1;
        Ok(counter)
    }

    async fn advance(&self, alias: &str, today: &DateTag) -> AppResult<Option<CodePlan>> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(unavailable("Failed to advance sequence counter"));
        }

        let Some(counter) = state.counters.get_mut(alias) else {
            return Ok(None);
        };
        let plan = counter.plan(today);
        counter.queue = plan.next_queue;
        counter.separator = plan.next_separator.clone();
        counter.updated_at = Utc::now();
        state.writes += 1;
        Ok(Some(plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdnstore_core::error::ErrorKind;

    fn seed() -> NewSequenceCounter {
        NewSequenceCounter::starting("gallery_group", &today())
    }

    fn today() -> DateTag {
        DateTag::parse("250615").unwrap()
    }

    #[tokio::test]
    async fn test_advance_stores_each_plan() {
        let repo = MemorySequenceRepository::new();
        repo.create(&seed()).await.unwrap();

        let first = repo.advance("gallery_group", &today()).await.unwrap().unwrap();
        let second = repo.advance("gallery_group", &today()).await.unwrap().unwrap();
        assert_eq!(first.code, "2506000115");
        assert_eq!(second.code, "2506000215");

        let counter = repo.find_by_alias("gallery_group").await.unwrap().unwrap();
        assert_eq!(counter.queue, 3);
        assert_eq!(repo.write_count().await, 3);

        assert!(repo.advance("missing", &today()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_alias_conflicts() {
        let repo = MemorySequenceRepository::new();
        repo.create(&seed()).await.unwrap();
        let err = repo.create(&seed()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let repo = MemorySequenceRepository::new();
        repo.create(&seed()).await.unwrap();

        repo.fail_reads(true).await;
        assert!(repo.find_by_alias("gallery_group").await.is_err());

        repo.fail_writes(true).await;
        let err = repo.advance("gallery_group", &today()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
    }
}
