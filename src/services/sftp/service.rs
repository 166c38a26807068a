// SFTP 服务 - 封装 russh-sftp 客户端

use std::path::Path;

use async_trait::async_trait;
use russh::client::Msg;
use russh_sftp::client::SftpSession;
use tokio::io::{AsyncRead, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::ssh::SshError;
use crate::sync::{SyncError, TransferChannel};

/// 远程读取缓冲大小
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// SFTP 服务
/// 一个主机会话对应的唯一传输通道，负责列目录与下载
pub struct SftpService {
    /// 主机标识
    target: String,
    /// russh-sftp 客户端会话
    sftp: SftpSession,
}

impl SftpService {
    /// 在已请求 sftp 子系统的通道上创建 SFTP 服务
    pub async fn new(target: String, channel: russh::Channel<Msg>) -> Result<Self, SshError> {
        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| SshError::Channel(format!("Failed to create SFTP session: {}", e)))?;

        info!(host = %target, "[SFTP] Transfer channel ready");
        Ok(Self { target, sftp })
    }

    /// 读取目录中的全部条目名（文件与目录），跳过 . 和 ..
    pub async fn read_dir_names(&self, path: &str) -> Result<Vec<String>, String> {
        debug!(host = %self.target, "[SFTP] Reading directory: {}", path);

        let dir = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|e| format!("Failed to read directory {}: {}", path, e))?;

        let names: Vec<String> = dir
            .map(|entry| entry.file_name())
            .filter(|name| name != "." && name != "..")
            .collect();

        debug!(host = %self.target, "[SFTP] Read {} entries from {}", names.len(), path);
        Ok(names)
    }

    /// 下载单个文件，覆盖本地同名文件
    /// 远程文件打不开时不触碰本地文件
    pub async fn download(&self, remote_path: &str, local_path: &Path) -> Result<u64, String> {
        let remote = self
            .sftp
            .open(remote_path)
            .await
            .map_err(|e| format!("Failed to open remote file {}: {}", remote_path, e))?;

        save_to_local(remote, local_path)
            .await
            .map_err(|e| format!("Failed to copy {}: {}", remote_path, e))
    }
}

/// 把读取端的全部内容写入本地文件（创建或截断）
/// 失败时删除不完整的本地文件，本地副本要么完整要么不存在
pub async fn save_to_local<R>(reader: R, local_path: &Path) -> Result<u64, String>
where
    R: AsyncRead + Unpin,
{
    let result = copy_to_file(reader, local_path).await;
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "[SFTP] Failed to remove incomplete file {}: {}",
                    local_path.display(),
                    e
                );
            }
        }
    }
    result
}

async fn copy_to_file<R>(reader: R, local_path: &Path) -> Result<u64, String>
where
    R: AsyncRead + Unpin,
{
    let mut local = tokio::fs::File::create(local_path)
        .await
        .map_err(|e| format!("Failed to create local file: {}", e))?;

    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, reader);
    let bytes = tokio::io::copy_buf(&mut reader, &mut local)
        .await
        .map_err(|e| format!("read interrupted: {}", e))?;

    local
        .flush()
        .await
        .map_err(|e| format!("Failed to flush local file: {}", e))?;

    Ok(bytes)
}

#[async_trait]
impl TransferChannel for SftpService {
    async fn list(&self, remote_dir: &str) -> Result<Vec<String>, SyncError> {
        self.read_dir_names(remote_dir)
            .await
            .map_err(|message| SyncError::List {
                host: self.target.clone(),
                dir: remote_dir.to_string(),
                message,
            })
    }

    async fn transfer(&self, remote_path: &str, local_path: &Path) -> Result<u64, SyncError> {
        self.download(remote_path, local_path)
            .await
            .map_err(|message| SyncError::Transfer {
                host: self.target.clone(),
                remote: remote_path.to_string(),
                local: local_path.to_path_buf(),
                message,
            })
    }
}

impl Drop for SftpService {
    fn drop(&mut self) {
        debug!(host = %self.target, "[SFTP] Dropping transfer channel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncReadExt, ReadBuf};

    /// 读取时总是报错，模拟传输中途断开
    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "channel closed",
            )))
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("laravel-2024-01-10.log");
        std::fs::write(&local, "old content that is longer than the new one\n").unwrap();

        let bytes = save_to_local(&b"fresh\n"[..], &local).await.unwrap();

        assert_eq!(bytes, 6);
        assert_eq!(std::fs::read_to_string(&local).unwrap(), "fresh\n");
    }

    #[tokio::test]
    async fn test_save_removes_partial_file_on_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("laravel-2024-01-10.log");
        std::fs::write(&local, "previous copy").unwrap();

        // 先读出一部分内容，然后连接中断
        let reader = (&b"partial line"[..]).chain(BrokenReader);
        let err = save_to_local(reader, &local).await.unwrap_err();

        assert!(err.contains("channel closed"), "{err}");
        assert!(!local.exists());
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("absent").join("laravel-2024-01-10.log");

        let err = save_to_local(&b"data"[..], &local).await.unwrap_err();

        assert!(err.contains("Failed to create local file"), "{err}");
        assert!(!local.exists());
    }
}
