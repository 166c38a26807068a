// 远程传输抽象：连接管理器、会话与传输通道

use std::path::Path;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::error::SyncError;
use crate::models::HostSpec;

/// 连接管理器：每个主机建立一个已认证会话
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, host: &HostSpec) -> Result<Box<dyn RemoteSession>, SyncError>;
}

/// 已认证的远程会话
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// 打开传输通道，每个会话只能打开一次
    async fn open_transfer_channel(&self) -> Result<Box<dyn TransferChannel>, SyncError>;

    /// 关闭会话，重复调用无副作用
    async fn close(&self) -> Result<(), SyncError>;
}

/// 文件传输通道
#[async_trait]
pub trait TransferChannel: Send + Sync {
    /// 列出目录中全部条目名（文件和目录，无序）
    async fn list(&self, remote_dir: &str) -> Result<Vec<String>, SyncError>;

    /// 下载单个文件，覆盖本地文件，返回字节数
    async fn transfer(&self, remote_path: &str, local_path: &Path) -> Result<u64, SyncError>;
}

/// 日期来源
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// 系统时钟（UTC）
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
