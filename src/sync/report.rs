// 同步结果汇总

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use super::error::SyncError;
use super::state::HostState;
use crate::models::{is_plain_file_name, HostSpec};

/// 单个文件的传输任务（远程绝对路径 -> 本地路径）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferTask {
    pub remote: String,
    pub local: PathBuf,
}

impl TransferTask {
    /// 远程返回的名称必须是单个路径段，否则可能写到本地目录之外
    pub fn new(host: &HostSpec, local_dir: &Path, name: &str) -> Result<Self, SyncError> {
        if !is_plain_file_name(name) {
            return Err(SyncError::UnsafeName {
                host: host.identity(),
                name: name.to_string(),
            });
        }
        Ok(Self {
            remote: host.remote_path(name),
            local: local_dir.join(name),
        })
    }
}

/// 传输失败的文件
#[derive(Clone, Debug)]
pub struct FailedTransfer {
    pub name: String,
    pub error: String,
}

/// 单个主机的处理结果
#[derive(Clone, Debug)]
pub struct HostReport {
    /// 主机标识 user@host:port
    pub host: String,
    pub state: HostState,
    /// 列出的条目数
    pub listed: usize,
    pub accepted: Vec<String>,
    pub transferred: Vec<String>,
    pub failed: Vec<FailedTransfer>,
    /// 有前缀但没有日期的文件名
    pub skipped_no_date: Vec<String>,
    pub bytes: u64,
    /// 处理结束时的水位线
    pub watermark: Option<NaiveDate>,
    /// 终止主机处理的错误
    pub error: Option<String>,
    /// 写回配置失败
    pub persist_error: Option<String>,
}

impl HostReport {
    pub fn new(host: String, watermark: Option<NaiveDate>) -> Self {
        Self {
            host,
            state: HostState::Idle,
            listed: 0,
            accepted: Vec::new(),
            transferred: Vec::new(),
            failed: Vec::new(),
            skipped_no_date: Vec::new(),
            bytes: 0,
            watermark,
            error: None,
            persist_error: None,
        }
    }

    /// 状态迁移
    pub fn advance(&mut self, to: HostState) {
        debug_assert!(
            self.state.can_transition_to(to),
            "invalid transition {} -> {}",
            self.state,
            to
        );
        debug!(host = %self.host, "[SYNC] {} -> {}", self.state, to);
        self.state = to;
    }

    pub fn is_errored(&self) -> bool {
        self.state == HostState::Errored
    }

    /// 主机失败或写回失败
    pub fn needs_attention(&self) -> bool {
        self.is_errored() || self.persist_error.is_some()
    }
}

/// 一次运行的结果
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<HostReport>,
}

impl RunSummary {
    pub fn errored_hosts(&self) -> impl Iterator<Item = &HostReport> {
        self.reports.iter().filter(|r| r.is_errored())
    }

    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(HostReport::needs_attention)
    }

    pub fn transferred_files(&self) -> usize {
        self.reports.iter().map(|r| r.transferred.len()).sum()
    }

    pub fn failed_files(&self) -> usize {
        self.reports.iter().map(|r| r.failed.len()).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.reports.iter().map(|r| r.bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_task_paths() {
        let host = HostSpec::new("h", "u", "k", "/srv/app/storage/logs/", "web1");
        let task =
            TransferTask::new(&host, Path::new("/data/web1"), "laravel-2024-01-10.log").unwrap();
        assert_eq!(task.remote, "/srv/app/storage/logs/laravel-2024-01-10.log");
        assert_eq!(task.local, PathBuf::from("/data/web1/laravel-2024-01-10.log"));
    }

    #[test]
    fn test_transfer_task_rejects_escaping_names() {
        let host = HostSpec::new("h", "u", "k", "/logs", "web1");
        for name in ["../laravel-2024-01-10.log", "/etc/laravel-2024-01-10", "a/laravel-2024-01-10"] {
            let err = TransferTask::new(&host, Path::new("/data/web1"), name).unwrap_err();
            assert!(matches!(err, SyncError::UnsafeName { .. }), "{name}");
        }
    }

    #[test]
    fn test_summary_flags_persist_errors() {
        let mut ok = HostReport::new("a".to_string(), None);
        ok.state = HostState::Done;
        let mut persisted_badly = HostReport::new("b".to_string(), None);
        persisted_badly.state = HostState::Done;

        let summary = RunSummary {
            reports: vec![ok.clone()],
        };
        assert!(!summary.has_failures());

        persisted_badly.persist_error = Some("disk full".to_string());
        let summary = RunSummary {
            reports: vec![ok, persisted_badly],
        };
        assert!(summary.has_failures());
        assert_eq!(summary.errored_hosts().count(), 0);
    }
}
