// 连接日志主机时可能出现的错误
// 任何一种都会让当前主机进入 Errored，水位线保持不变

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SshError {
    /// 主机名解析失败或没有可用地址
    #[error("Address resolution failed: {0}")]
    Resolve(String),

    /// TCP 连接被拒绝、重置等
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 服务器拒绝了配置的用户名与私钥
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// 握手或传输层失败
    #[error("SSH protocol error: {0}")]
    Protocol(String),

    /// 启动时读入的私钥无法解析（格式错误、口令错误）
    #[error("Key error: {0}")]
    Key(String),

    /// 解析、连接、握手与认证未在限定秒数内完成
    #[error("Connection timeout after {0}s")]
    Timeout(u64),

    /// SFTP 子系统无法打开，或同一会话重复打开传输通道
    #[error("Channel error: {0}")]
    Channel(String),

    /// 会话已关闭或被对端断开
    #[error("Session disconnected: {0}")]
    Disconnected(String),
}

impl From<russh::Error> for SshError {
    fn from(e: russh::Error) -> Self {
        SshError::Protocol(e.to_string())
    }
}

impl From<russh::keys::Error> for SshError {
    fn from(e: russh::keys::Error) -> Self {
        SshError::Key(e.to_string())
    }
}
