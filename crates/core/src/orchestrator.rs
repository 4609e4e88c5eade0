//! `Orchestrator`: drives `BlockExecutor` across every pending schedule
//! block, either as a single polling pass or as a long-running loop with
//! explicit lifecycle management.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mds_domain::{MdsError, Result, ScheduleStatus};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::block_executor::BlockExecutor;
use crate::ports::{ConfigStorePort, PendingBlocksQuery, ProviderClientPort, ScheduleRepoPort, SocrataSinkPort};

/// Resolves the provider HTTP client to use for a given provider profile.
/// Kept as a trait rather than a concrete map so the orchestrator never
/// needs to know how clients are constructed or cached.
pub trait ProviderClientResolver: Send + Sync {
    fn client_for(&self, provider_name: &str) -> Option<Arc<dyn ProviderClientPort>>;
}

/// Bounds how much of the pipeline a single polling pass drives.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound on schedule blocks processed concurrently.
    pub max_concurrent_blocks: usize,
    /// Interval between polling passes when run as a loop.
    pub poll_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { max_concurrent_blocks: 4, poll_interval: Duration::from_secs(60) }
    }
}

/// Tally of one polling pass, surfaced to callers for logging/metrics.
#[derive(Debug, Clone, Default)]
pub struct PassSummary {
    pub extracted: usize,
    pub db_synced: usize,
    pub socrata_synced: usize,
    pub failed: usize,
}

/// Drives schedule blocks through `BlockExecutor` with bounded concurrency.
pub struct Orchestrator {
    config_store: Arc<dyn ConfigStorePort>,
    schedule_repo: Arc<dyn ScheduleRepoPort>,
    socrata_sink: Arc<dyn SocrataSinkPort>,
    client_resolver: Arc<dyn ProviderClientResolver>,
    executor: Arc<BlockExecutor>,
    config: OrchestratorConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl Orchestrator {
    pub fn new(
        config_store: Arc<dyn ConfigStorePort>,
        schedule_repo: Arc<dyn ScheduleRepoPort>,
        socrata_sink: Arc<dyn SocrataSinkPort>,
        client_resolver: Arc<dyn ProviderClientResolver>,
        executor: Arc<BlockExecutor>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            config_store,
            schedule_repo,
            socrata_sink,
            client_resolver,
            executor,
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Runs one polling pass: drives every eligible `NEW` block through
    /// Extract, every `EXTRACTED` block through DB-Sync, and every
    /// DB-Sync-eligible block through Socrata-Sync, bounded by
    /// `max_concurrent_blocks`.
    pub async fn run_pass(&self) -> Result<PassSummary> {
        let mut summary = PassSummary::default();
        let profiles = self.config_store.all_provider_profiles().await?;
        let profiles_by_name: HashMap<String, _> = profiles.into_iter().map(|p| (p.name.clone(), p)).collect();

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_blocks.max(1)));

        let new_blocks = self
            .schedule_repo
            .pending_blocks(PendingBlocksQuery { status_id: Some(ScheduleStatus::NEW), ..Default::default() })
            .await?;
        let mut extract_handles: Vec<JoinHandle<Result<()>>> = Vec::new();
        for block in new_blocks {
            let Some(profile) = profiles_by_name.get(&block.provider_name).cloned() else {
                warn!(provider = %block.provider_name, "no provider profile configured, skipping extract");
                continue;
            };
            let Some(client) = self.client_resolver.client_for(&block.provider_name) else {
                warn!(provider = %block.provider_name, "no provider client available, skipping extract");
                continue;
            };
            let permit = Arc::clone(&semaphore).acquire_owned().await.map_err(|e| MdsError::Internal(e.to_string()))?;
            let executor = Arc::clone(&self.executor);
            extract_handles.push(tokio::spawn(async move {
                let _permit = permit;
                match executor.extract(&block, &profile, client.as_ref(), false).await {
                    Ok(_) => Ok(()),
                    Err(e) => {
                        error!(schedule_id = block.schedule_id, error = %e, "extract failed");
                        Err(e)
                    }
                }
            }));
        }
        for handle in extract_handles {
            match handle.await.map_err(|e| MdsError::Internal(e.to_string()))? {
                Ok(()) => summary.extracted += 1,
                Err(_) => summary.failed += 1,
            }
        }

        let extracted_blocks = self
            .schedule_repo
            .pending_blocks(PendingBlocksQuery { status_id: Some(ScheduleStatus::EXTRACTED), ..Default::default() })
            .await?;
        let mut db_sync_handles: Vec<JoinHandle<Result<()>>> = Vec::new();
        for block in extracted_blocks {
            let permit = Arc::clone(&semaphore).acquire_owned().await.map_err(|e| MdsError::Internal(e.to_string()))?;
            let executor = Arc::clone(&self.executor);
            db_sync_handles.push(tokio::spawn(async move {
                let _permit = permit;
                match executor.db_sync(&block, false).await {
                    Ok(_) => Ok(()),
                    Err(e) => {
                        error!(schedule_id = block.schedule_id, error = %e, "db-sync failed");
                        Err(e)
                    }
                }
            }));
        }
        for handle in db_sync_handles {
            match handle.await.map_err(|e| MdsError::Internal(e.to_string()))? {
                Ok(()) => summary.db_synced += 1,
                Err(_) => summary.failed += 1,
            }
        }

        let db_synced_blocks = self.schedule_repo.pending_blocks(PendingBlocksQuery::default()).await?;
        let mut socrata_handles: Vec<JoinHandle<Result<()>>> = Vec::new();
        for block in db_synced_blocks.into_iter().filter(|b| ScheduleStatus::is_socrata_eligible(b.status_id)) {
            let permit = Arc::clone(&semaphore).acquire_owned().await.map_err(|e| MdsError::Internal(e.to_string()))?;
            let executor = Arc::clone(&self.executor);
            let socrata_sink = Arc::clone(&self.socrata_sink);
            socrata_handles.push(tokio::spawn(async move {
                let _permit = permit;
                match executor.socrata_sync(&block, socrata_sink.as_ref()).await {
                    Ok(_) => Ok(()),
                    Err(e) => {
                        error!(schedule_id = block.schedule_id, error = %e, "socrata-sync failed");
                        Err(e)
                    }
                }
            }));
        }
        for handle in socrata_handles {
            match handle.await.map_err(|e| MdsError::Internal(e.to_string()))? {
                Ok(()) => summary.socrata_synced += 1,
                Err(_) => summary.failed += 1,
            }
        }

        debug!(?summary, "orchestrator pass complete");
        Ok(summary)
    }

    /// Starts a background task that calls `run_pass` on `poll_interval`
    /// until cancelled.
    pub fn start(&mut self) {
        if self.task_handle.is_some() {
            return;
        }
        self.cancellation = CancellationToken::new();
        let cancel = self.cancellation.clone();
        let poll_interval = self.config.poll_interval;

        let config_store = Arc::clone(&self.config_store);
        let schedule_repo = Arc::clone(&self.schedule_repo);
        let socrata_sink = Arc::clone(&self.socrata_sink);
        let client_resolver = Arc::clone(&self.client_resolver);
        let executor = Arc::clone(&self.executor);
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            let orchestrator =
                Orchestrator::new(config_store, schedule_repo, socrata_sink, client_resolver, executor, config);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("orchestrator loop cancelled");
                        break;
                    }
                    _ = tokio::time::sleep(poll_interval) => {
                        if let Err(e) = orchestrator.run_pass().await {
                            error!(error = %e, "orchestrator pass errored");
                        }
                    }
                }
            }
        });
        self.task_handle = Some(handle);
    }

    /// Cancels the background loop and waits for it to finish.
    pub async fn stop(&mut self) {
        self.cancellation.cancel();
        if let Some(handle) = self.task_handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "orchestrator task join failed");
            }
        }
    }
}
