//! Sequential per-host synchronization driver.
//!
//! Hosts are processed one after another. For each host the orchestrator opens
//! a session, lists the remote log directory, filters the names against the
//! host's watermark, downloads every accepted file, advances the watermark to
//! today's date and rewrites the whole host table. The session is closed on
//! every path once it has been opened.

use std::io;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use super::error::SyncError;
use super::filter::{FilterDecision, SkipReason, SyncFilter};
use super::report::{FailedTransfer, HostReport, RunSummary, TransferTask};
use super::state::HostState;
use super::transport::{Clock, Connector, RemoteSession, SystemClock};
use crate::models::{is_plain_file_name, HostSpec};
use crate::services::storage::ConfigStore;

/// Run options.
#[derive(Clone, Debug)]
pub struct SyncOptions {
    /// Local root; each host downloads into `dest_root/<folder>`.
    pub dest_root: PathBuf,
    /// List and filter only. No transfer, no watermark change.
    pub dry_run: bool,
    /// Treat every host as never synced when filtering.
    pub ignore_watermark: bool,
    /// Only process hosts whose address is listed. Empty means all.
    pub only_hosts: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dest_root: PathBuf::from("."),
            dry_run: false,
            ignore_watermark: false,
            only_hosts: Vec::new(),
        }
    }
}

pub struct SyncOrchestrator {
    connector: Box<dyn Connector>,
    store: Box<dyn ConfigStore>,
    clock: Box<dyn Clock>,
    filter: SyncFilter,
    options: SyncOptions,
}

impl SyncOrchestrator {
    pub fn new(connector: Box<dyn Connector>, store: Box<dyn ConfigStore>) -> Self {
        Self {
            connector,
            store,
            clock: Box::new(SystemClock),
            filter: SyncFilter::default(),
            options: SyncOptions::default(),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_filter(mut self, filter: SyncFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    fn is_selected(&self, host: &HostSpec) -> bool {
        self.options.only_hosts.is_empty()
            || self.options.only_hosts.iter().any(|h| *h == host.host)
    }

    /// Process every host in order. Never aborts early on a host failure.
    pub async fn run(&self, hosts: &mut [HostSpec]) -> RunSummary {
        let mut summary = RunSummary::default();
        debug!(
            "[SYNC] Starting run over {} hosts, prefix {:?}",
            hosts.len(),
            self.filter.prefix()
        );

        for idx in 0..hosts.len() {
            if !self.is_selected(&hosts[idx]) {
                debug!(host = %hosts[idx].identity(), "[SYNC] Not selected, skipping");
                continue;
            }
            let report = self.sync_host(hosts, idx).await;
            summary.reports.push(report);
        }

        info!(
            "[SYNC] Run finished: {} hosts, {} errored, {} files transferred, {} failed, {} bytes",
            summary.reports.len(),
            summary.errored_hosts().count(),
            summary.transferred_files(),
            summary.failed_files(),
            summary.total_bytes()
        );
        summary
    }

    async fn sync_host(&self, hosts: &mut [HostSpec], idx: usize) -> HostReport {
        let mut report = HostReport::new(hosts[idx].identity(), hosts[idx].last_sync);

        report.advance(HostState::Connecting);
        let session = match self.connector.open(&hosts[idx]).await {
            Ok(session) => session,
            Err(e) => {
                self.fail(&mut report, e);
                return report;
            }
        };
        report.advance(HostState::Connected);

        match self.fetch(session.as_ref(), &hosts[idx], &mut report).await {
            Ok(()) => self.finalize(hosts, idx, &mut report),
            Err(e) => self.fail(&mut report, e),
        }

        if let Err(e) = session.close().await {
            warn!(host = %report.host, "[SYNC] {}", e);
        }
        if report.state == HostState::Finalizing {
            report.advance(HostState::Done);
        }
        debug_assert!(report.state.is_terminal(), "host left in {}", report.state);

        info!(
            host = %report.host,
            "[SYNC] Host {}: {} listed, {} accepted, {} transferred, {} failed",
            report.state,
            report.listed,
            report.accepted.len(),
            report.transferred.len(),
            report.failed.len()
        );
        report
    }

    /// Connected -> Listing -> Filtering -> Transferring.
    async fn fetch(
        &self,
        session: &dyn RemoteSession,
        host: &HostSpec,
        report: &mut HostReport,
    ) -> Result<(), SyncError> {
        let channel = session.open_transfer_channel().await?;

        report.advance(HostState::Listing);
        let names = channel.list(&host.remote_log_dir).await?;
        report.listed = names.len();

        report.advance(HostState::Filtering);
        let watermark = if self.options.ignore_watermark {
            None
        } else {
            host.last_sync
        };
        let mut accepted = Vec::new();
        for name in names {
            match self.filter.evaluate(&name, watermark) {
                FilterDecision::Accept => accepted.push(name),
                FilterDecision::Skip(SkipReason::NoDateToken) => {
                    warn!(
                        host = %report.host,
                        path = %host.remote_path(&name),
                        "[SYNC] Skipping file without a date token"
                    );
                    report.skipped_no_date.push(name);
                }
                FilterDecision::Skip(reason) => {
                    debug!(host = %report.host, "[SYNC] Skipping {}: {:?}", name, reason);
                }
            }
        }

        // 未经 JsonConfigStore::load 校验的条目也要拦住
        if !is_plain_file_name(&host.local_folder) {
            return Err(SyncError::LocalDir {
                path: host.local_dir(&self.options.dest_root),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("folder {:?} is not a single directory name", host.local_folder),
                ),
            });
        }
        let local_dir = host.local_dir(&self.options.dest_root);
        if !self.options.dry_run {
            tokio::fs::create_dir_all(&local_dir)
                .await
                .map_err(|source| SyncError::LocalDir {
                    path: local_dir.clone(),
                    source,
                })?;
        }

        report.advance(HostState::Transferring);
        for name in &accepted {
            let task = match TransferTask::new(host, &local_dir, name) {
                Ok(task) => task,
                Err(e) => {
                    error!(host = %report.host, "[SYNC] {}", e);
                    report.failed.push(FailedTransfer {
                        name: name.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            if self.options.dry_run {
                info!(host = %report.host, "[SYNC] Would download: {}", task.remote);
                continue;
            }

            info!(host = %report.host, "[SYNC] Downloading: {}", task.remote);
            match channel.transfer(&task.remote, &task.local).await {
                Ok(bytes) => {
                    info!(
                        host = %report.host,
                        "[SYNC] Successfully downloaded {} ({} bytes)",
                        task.remote,
                        bytes
                    );
                    report.bytes += bytes;
                    report.transferred.push(name.clone());
                }
                Err(e) => {
                    error!(host = %report.host, path = %task.remote, "[SYNC] {}", e);
                    report.failed.push(FailedTransfer {
                        name: name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report.accepted = accepted;
        Ok(())
    }

    /// Transferring -> Finalizing: advance the watermark and rewrite the table.
    fn finalize(&self, hosts: &mut [HostSpec], idx: usize, report: &mut HostReport) {
        report.advance(HostState::Finalizing);

        if self.options.dry_run {
            debug!(host = %report.host, "[SYNC] Dry run, watermark unchanged");
            return;
        }

        let today = self.clock.today();
        let written = hosts[idx].advance_watermark(today);
        if written != today {
            warn!(
                host = %report.host,
                "[SYNC] Today ({}) is before the stored watermark ({}), keeping the watermark",
                today,
                written
            );
        }
        report.watermark = Some(written);

        if let Err(e) = self.store.persist(hosts) {
            let err = SyncError::Persist {
                host: report.host.clone(),
                message: format!("{:#}", e),
            };
            error!("[SYNC] {}", err);
            report.persist_error = Some(err.to_string());
        }
    }

    fn fail(&self, report: &mut HostReport, e: SyncError) {
        debug_assert!(e.is_host_fatal(), "file-level error escalated: {}", e);
        error!(host = %report.host, state = %report.state, "[SYNC] {}", e);
        report.advance(HostState::Errored);
        report.error = Some(e.to_string());
    }
}
