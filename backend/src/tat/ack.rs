// backend/src/tat/ack.rs

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::TatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckTarget {
    Case,
    BulkUpload,
}

/// Storage of read flags. Implementations must only ever set flags
/// (false → true) and report how many actually flipped.
#[async_trait]
pub trait AckStore: Send + Sync {
    async fn set_seen(&self, target: AckTarget, ids: &[i64]) -> Result<u64, TatError>;
    async fn set_all_seen(&self, target: AckTarget) -> Result<u64, TatError>;
}

pub struct AcknowledgementTracker<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: AckStore + ?Sized> AcknowledgementTracker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns the number of flags that transitioned; 0 is a normal outcome.
    pub async fn mark_seen(&self, target: AckTarget, ids: &[i64]) -> Result<u64, TatError> {
        let unique: Vec<i64> = ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        if unique.is_empty() {
            return Ok(0);
        }

        let affected = self.store.set_seen(target, &unique).await?;
        tracing::info!(?target, requested = unique.len(), affected, "marked notifications seen");
        Ok(affected)
    }

    pub async fn mark_all_seen(&self, target: AckTarget) -> Result<u64, TatError> {
        let affected = self.store.set_all_seen(target).await?;
        tracing::info!(?target, affected, "marked all notifications seen");
        Ok(affected)
    }
}
