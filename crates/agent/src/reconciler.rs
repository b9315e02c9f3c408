//! Outbox reconciliation: drain, replay, clear on full success.

use crate::agent::OfflineAgent;
use crate::error::Error;
use vigil_client::Request;
use vigil_core::Category;

/// Outcome of one reconciliation attempt.
#[derive(Debug, Clone, Copy)]
pub struct SyncReport {
    pub category: Category,
    /// Records transmitted and acknowledged in this batch.
    pub replayed: usize,
}

impl OfflineAgent {
    /// Reconcile from a platform sync-trigger tag.
    pub async fn on_sync_tag(&self, tag: &str) -> Result<SyncReport, Error> {
        let category = Category::from_sync_tag(tag).map_err(Error::Store)?;
        self.on_sync(category).await
    }

    /// Drain a category and replay every record against the origin server.
    ///
    /// Records are POSTed sequentially, each awaited before the next. The
    /// category's store is cleared only after every record in the batch has
    /// been acknowledged; any transport error or non-2xx answer aborts the
    /// batch and leaves the store intact, so the next trigger retries the
    /// whole batch (at-least-once delivery). Attempts for one category are
    /// serialized; records enqueued mid-drain join the next batch.
    pub async fn on_sync(&self, category: Category) -> Result<SyncReport, Error> {
        let _gate = self.sync_gates.gate(category).lock().await;

        let records = self.outbox.drain_all(category).await?;
        let total = records.len();
        if total == 0 {
            tracing::trace!(category = %category, "outbox empty, nothing to replay");
            return Ok(SyncReport { category, replayed: 0 });
        }

        let endpoint = self.asset_url(category.endpoint())?;
        tracing::info!(category = %category, pending = total, "replaying outbox batch");

        for (sent, record) in records.iter().enumerate() {
            let request = Request::post_json(endpoint.clone(), record.payload.clone());
            match self.net.fetch(&request).await {
                Ok(response) if response.is_success() => {}
                Ok(response) => {
                    tracing::warn!(
                        category = %category,
                        record = record.id,
                        status = response.status.as_u16(),
                        "origin rejected replay, keeping batch for next trigger"
                    );
                    return Err(Error::SyncAborted { category, sent, total });
                }
                Err(err) => {
                    tracing::warn!(
                        category = %category,
                        record = record.id,
                        %err,
                        "replay transmission failed, keeping batch for next trigger"
                    );
                    return Err(Error::SyncAborted { category, sent, total });
                }
            }
        }

        self.outbox.clear_all(category).await?;
        tracing::info!(category = %category, replayed = total, "outbox batch replayed and cleared");
        Ok(SyncReport { category, replayed: total })
    }
}
