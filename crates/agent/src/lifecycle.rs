//! Install and activate: partition seeding and generation pruning.

use crate::agent::OfflineAgent;
use crate::error::Error;
use std::sync::atomic::Ordering;
use vigil_client::Request;
use vigil_core::cache::{LEGACY_PARTITION, request_key};
use vigil_core::{PartitionKind, Snapshot};

/// Where the agent is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Installing,
    /// Static partition seeded; ready to supersede a waiting version.
    Installed,
    Activating,
    /// Pruned and controlling all clients.
    Active,
}

impl OfflineAgent {
    /// Seed the static partition for the current version.
    ///
    /// Fetches every asset in the configured manifest and snapshots it.
    /// Any transport failure or non-2xx status aborts the whole install:
    /// the partially populated partition is deleted and the previously
    /// installed version keeps serving. On success the skip-waiting latch
    /// is set so this version supersedes any waiting one immediately.
    pub async fn on_install(&self) -> Result<(), Error> {
        self.set_state(LifecycleState::Installing);
        let partition = self.config.static_partition();

        self.cache.open_partition(&partition, PartitionKind::Static).await?;
        tracing::info!(partition = %partition, assets = self.config.static_assets.len(), "seeding static partition");

        for path in &self.config.static_assets {
            if let Err(err) = self.seed_asset(&partition, path).await {
                let _ = self.cache.delete_partition(&partition).await;
                self.set_state(LifecycleState::Idle);
                tracing::error!(partition = %partition, path = %path, %err, "install aborted, partial partition dropped");
                return Err(err);
            }
        }

        self.skip_waiting.store(true, Ordering::SeqCst);
        self.set_state(LifecycleState::Installed);
        tracing::info!(partition = %partition, "install complete, superseding any waiting version");
        Ok(())
    }

    async fn seed_asset(&self, partition: &str, path: &str) -> Result<(), Error> {
        let url = self.asset_url(path)?;
        let response = self.net.fetch(&Request::get(url.clone())).await?;

        if !response.is_success() {
            return Err(Error::InstallAsset { url: url.to_string(), status: response.status.as_u16() });
        }

        let snapshot = Snapshot::new(
            request_key("GET", url.as_str()),
            url.to_string(),
            response.status.as_u16(),
            response.content_type.clone(),
            response.bytes.to_vec(),
        );
        self.cache.put_entry(partition, PartitionKind::Static, &snapshot).await?;
        Ok(())
    }

    /// Delete every partition that is not part of the current generation.
    ///
    /// The keep-set is the current static and dynamic partitions plus the
    /// legacy umbrella name. After pruning, no request can ever be served
    /// from a stale-version snapshot. Sets the claim latch so this version
    /// controls all open clients without waiting for a reload.
    pub async fn on_activate(&self) -> Result<(), Error> {
        self.set_state(LifecycleState::Activating);

        let keep = [
            self.config.static_partition(),
            self.config.dynamic_partition(),
            LEGACY_PARTITION.to_string(),
        ];

        for name in self.cache.list_partitions().await? {
            if !keep.contains(&name) {
                self.cache.delete_partition(&name).await?;
                tracing::info!(partition = %name, "pruned stale cache partition");
            }
        }

        self.clients_claimed.store(true, Ordering::SeqCst);
        self.set_state(LifecycleState::Active);
        tracing::info!(version = %self.config.cache_version, "activation complete, controlling all clients");
        Ok(())
    }
}
