// SSH 会话管理
// 连接成功后的会话对象，每个主机一个，最多提供一个传输通道

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use russh::client::Handle;
use russh::Disconnect;
use tracing::{debug, info, warn};

use super::error::SshError;
use super::handler::SyncClientHandler;
use crate::services::sftp::SftpService;
use crate::sync::{RemoteSession, SyncError, TransferChannel};

/// SSH 会话（连接成功后）
pub struct SshSession {
    /// russh Handle
    handle: Handle<SyncClientHandler>,
    /// 主机标识 user@host:port
    target: String,
    /// 是否已关闭
    closed: AtomicBool,
    /// 是否已打开过传输通道
    channel_taken: AtomicBool,
}

impl SshSession {
    pub fn new(handle: Handle<SyncClientHandler>, target: String) -> Self {
        Self {
            handle,
            target,
            closed: AtomicBool::new(false),
            channel_taken: AtomicBool::new(false),
        }
    }

    /// 检查会话是否活跃
    pub fn is_alive(&self) -> bool {
        !self.closed.load(Ordering::Acquire) && !self.handle.is_closed()
    }

    /// 打开 SFTP 通道
    pub async fn open_sftp(&self) -> Result<SftpService, SshError> {
        if !self.is_alive() {
            return Err(SshError::Disconnected(
                "Session is disconnected".to_string(),
            ));
        }
        if self.channel_taken.swap(true, Ordering::AcqRel) {
            return Err(SshError::Channel(
                "Transfer channel already opened for this session".to_string(),
            ));
        }

        let channel = self.handle.channel_open_session().await?;

        // 请求 SFTP 子系统
        channel.request_subsystem(true, "sftp").await?;

        SftpService::new(self.target.clone(), channel).await
    }

    /// 关闭会话（幂等）
    pub async fn close(&self) -> Result<(), SshError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!(host = %self.target, "[SSH] Session already closed");
            return Ok(());
        }
        info!(host = %self.target, "[SSH] Closing session");
        self.handle
            .disconnect(Disconnect::ByApplication, "sync finished", "en")
            .await?;
        Ok(())
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::Acquire) {
            warn!(host = %self.target, "[SSH] Session dropped without close");
        }
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn open_transfer_channel(&self) -> Result<Box<dyn TransferChannel>, SyncError> {
        let service = self.open_sftp().await.map_err(|source| SyncError::Channel {
            host: self.target.clone(),
            source,
        })?;
        Ok(Box::new(service))
    }

    async fn close(&self) -> Result<(), SyncError> {
        SshSession::close(self)
            .await
            .map_err(|source| SyncError::Close {
                host: self.target.clone(),
                source,
            })
    }
}
