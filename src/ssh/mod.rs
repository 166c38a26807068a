// SSH 连接模块
//
// 模块结构:
// - config: 连接配置 (SshConfig, PrivateKeySource)
// - error: 错误类型 (SshError)
// - handler: russh Handler 实现
// - client: SSH 客户端核心与连接管理器 (SshClient, SshConnector)
// - session: SSH 会话 (SshSession)

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod session;

// 公开导出
pub use client::{SshClient, SshConnector};
pub use config::{SshConfig, DEFAULT_CONNECT_TIMEOUT};
pub use error::SshError;
pub use session::SshSession;
