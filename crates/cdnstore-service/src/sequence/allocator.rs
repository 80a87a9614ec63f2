//! Sequence code allocator.

use std::sync::Arc;

use tracing::{debug, info, warn};

use cdnstore_core::error::AppError;
use cdnstore_core::result::AppResult;
use cdnstore_database::repositories::SequenceRepository;
use cdnstore_entity::sequence::{DateTag, NewSequenceCounter, SequenceCounter, fallback_code};

/// Produces the next human-readable code for a named counter.
///
/// Committing hands the whole read-plan-write step to the repository,
/// which serializes callers per alias. A counter that is missing or
/// unreadable degrades to an `ER-NNNNN` code instead of failing.
#[derive(Debug, Clone)]
pub struct SequenceAllocator {
    /// Counter storage.
    repo: Arc<dyn SequenceRepository>,
}

impl SequenceAllocator {
    /// Creates a new allocator.
    pub fn new(repo: Arc<dyn SequenceRepository>) -> Self {
        Self { repo }
    }

    /// Next code for `alias` as of today.
    pub async fn next_code(&self, alias: &str, commit: bool) -> AppResult<String> {
        self.next_code_on(alias, commit, &DateTag::today()).await
    }

    /// Next code for `alias` as of `today`.
    ///
    /// Only a failure while writing the advanced counter back is an error.
    pub async fn next_code_on(&self, alias: &str, commit: bool, today: &DateTag) -> AppResult<String> {
        let counter = match self.repo.find_by_alias(alias).await {
            Ok(Some(counter)) => counter,
            Ok(None) => return Ok(fallback(alias, "No sequence counter")),
            Err(e) => {
                let code = fallback_code();
                warn!(alias, code = %code, error = %e, "Sequence lookup failed; using fallback code");
                return Ok(code);
            }
        };

        if !commit {
            return Ok(counter.plan(today).code);
        }

        let Some(plan) = self.repo.advance(alias, today).await? else {
            return Ok(fallback(alias, "Sequence counter removed before commit"));
        };
        if plan.rolled_over {
            info!(alias, separator = %plan.next_separator, "Sequence counter rolled over");
        }
        debug!(alias, code = %plan.code, next_queue = plan.next_queue, "Allocated code");
        Ok(plan.code)
    }

    /// Allocate and commit a group code.
    pub async fn allocate_group_code(&self, alias: &str) -> AppResult<String> {
        self.next_code(alias, true).await
    }

    /// Seed a counter for `alias` starting at 1 in today's period.
    pub async fn seed(
        &self,
        alias: &str,
        prefix: Option<String>,
        suffix: Option<String>,
    ) -> AppResult<SequenceCounter> {
        let data = NewSequenceCounter {
            prefix: prefix.filter(|p| !p.is_empty()),
            suffix: suffix.filter(|s| !s.is_empty()),
            ..NewSequenceCounter::starting(alias, &DateTag::today())
        };
        let counter = self.repo.create(&data).await?;
        info!(alias, "Seeded sequence counter");
        Ok(counter)
    }

    /// Look up a counter, failing with `NotFound` when absent.
    pub async fn counter(&self, alias: &str) -> AppResult<SequenceCounter> {
        self.repo
            .find_by_alias(alias)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Sequence counter '{alias}' not found")))
    }

    /// Every counter.
    pub async fn counters(&self) -> AppResult<Vec<SequenceCounter>> {
        self.repo.list().await
    }
}

fn fallback(alias: &str, reason: &str) -> String {
    let code = fallback_code();
    warn!(alias, code = %code, "{reason}; using fallback code");
    code
}
