// 同步错误分类

use std::path::PathBuf;

use thiserror::Error;

use crate::ssh::SshError;

/// 同步过程中的错误
///
/// `Connect`、`Channel`、`List`、`LocalDir` 终止当前主机；
/// `Transfer`、`UnsafeName` 只影响单个文件；`Persist` 与 `Close` 仅记录。
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: SshError,
    },

    #[error("failed to open transfer channel on {host}: {source}")]
    Channel {
        host: String,
        #[source]
        source: SshError,
    },

    #[error("failed to list {dir} on {host}: {message}")]
    List {
        host: String,
        dir: String,
        message: String,
    },

    #[error("failed to prepare local directory {}: {source}", path.display())]
    LocalDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to transfer {remote} from {host} to {}: {message}", local.display())]
    Transfer {
        host: String,
        remote: String,
        local: PathBuf,
        message: String,
    },

    #[error("refusing to download {name:?} from {host}: not a plain file name")]
    UnsafeName { host: String, name: String },

    #[error("failed to persist host table after {host}: {message}")]
    Persist { host: String, message: String },

    #[error("failed to close session with {host}: {source}")]
    Close {
        host: String,
        #[source]
        source: SshError,
    },
}

impl SyncError {
    /// 是否终止当前主机的处理
    pub fn is_host_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Connect { .. }
                | SyncError::Channel { .. }
                | SyncError::List { .. }
                | SyncError::LocalDir { .. }
        )
    }
}
