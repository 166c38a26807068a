// SSH 客户端核心实现

use std::sync::Arc;

use async_trait::async_trait;
use russh::client::{AuthResult, Handle};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info};

use super::config::SshConfig;
use super::error::SshError;
use super::handler::SyncClientHandler;
use super::session::SshSession;
use crate::models::HostSpec;
use crate::sync::{Connector, RemoteSession, SyncError};

/// SSH 客户端
/// 负责建立 SSH 连接并返回 SshSession
pub struct SshClient {
    /// 连接配置
    config: SshConfig,
}

impl SshClient {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    /// 主机标识 user@host:port
    fn target(&self) -> String {
        format!(
            "{}@{}:{}",
            self.config.username, self.config.host, self.config.port
        )
    }

    /// 执行连接
    /// 整个过程（地址解析、TCP、握手、认证）受同一个超时约束
    pub async fn connect(&self) -> Result<SshSession, SshError> {
        let target = self.target();
        info!(host = %target, "[SSH] Connecting...");

        let handle = timeout(self.config.timeout(), self.establish())
            .await
            .map_err(|_| SshError::Timeout(self.config.connect_timeout))??;

        info!(host = %target, "[SSH] Connection established");
        Ok(SshSession::new(handle, target))
    }

    async fn establish(&self) -> Result<Handle<SyncClientHandler>, SshError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr = lookup_host(&addr)
            .await
            .map_err(|e| SshError::Resolve(format!("{}: {}", addr, e)))?
            .next()
            .ok_or_else(|| SshError::Resolve(format!("no address found for {}", addr)))?;

        debug!("[SSH] TCP connect to {}", socket_addr);
        let tcp_stream = TcpStream::connect(socket_addr).await?;

        let russh_config = Arc::new(self.config.to_russh_config());
        let handler = SyncClientHandler::new(self.target());

        let mut handle = russh::client::connect_stream(russh_config, tcp_stream, handler).await?;
        debug!("[SSH] Handshake completed with {}", socket_addr);

        self.authenticate(&mut handle).await?;
        Ok(handle)
    }

    /// 公钥认证
    async fn authenticate(&self, handle: &mut Handle<SyncClientHandler>) -> Result<(), SshError> {
        let key = self.decode_private_key()?;

        // RSA 密钥使用服务器支持的最佳哈希算法（rsa-sha2-*）
        let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
        let key_with_alg = russh::keys::PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg);

        debug!(
            "[SSH] Authenticating as '{}' with key {:?}",
            self.config.username, self.config.key.path
        );

        let auth_result = handle
            .authenticate_publickey(&self.config.username, key_with_alg)
            .await?;

        match auth_result {
            AuthResult::Success => Ok(()),
            AuthResult::Failure {
                remaining_methods,
                partial_success,
            } => {
                if partial_success {
                    return Err(SshError::Auth(
                        "Partial authentication - additional auth required".to_string(),
                    ));
                }
                Err(SshError::Auth(format!(
                    "Public key authentication failed. Server suggests: {:?}",
                    remaining_methods
                )))
            }
        }
    }

    /// 解析启动时读入的私钥
    fn decode_private_key(&self) -> Result<russh::keys::PrivateKey, SshError> {
        let source = &self.config.key;
        if source.pem.trim().is_empty() {
            return Err(SshError::Key(format!(
                "No key material loaded from {:?}",
                source.path
            )));
        }
        russh::keys::decode_secret_key(&source.pem, source.passphrase.as_deref()).map_err(|e| {
            SshError::Key(format!("Failed to decode key {:?}: {}", source.path, e))
        })
    }
}

/// 基于 russh 的连接管理器
pub struct SshConnector {
    /// 连接超时（秒）
    connect_timeout: u64,
}

impl SshConnector {
    pub fn new(connect_timeout: u64) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn open(&self, host: &HostSpec) -> Result<Box<dyn RemoteSession>, SyncError> {
        let client = SshClient::new(SshConfig::from_host(host, self.connect_timeout));
        let session = client.connect().await.map_err(|source| SyncError::Connect {
            host: host.identity(),
            source,
        })?;
        Ok(Box::new(session))
    }
}
