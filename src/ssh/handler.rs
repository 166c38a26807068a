// SSH 客户端 Handler 实现
// 实现 russh::client::Handler trait

use russh::keys::PublicKey;
use std::future::Future;
use tracing::debug;

/// SSH 客户端 Handler
pub struct SyncClientHandler {
    /// 主机标识（用于日志）
    host: String,
}

impl SyncClientHandler {
    pub fn new(host: String) -> Self {
        Self { host }
    }
}

impl russh::client::Handler for SyncClientHandler {
    type Error = russh::Error;

    /// 检查服务器公钥
    /// 不校验 known_hosts，仅记录指纹
    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        let fingerprint = server_public_key.fingerprint(russh::keys::ssh_key::HashAlg::Sha256);

        debug!(
            host = %self.host,
            "[SSH] Server key {} fingerprint: {}",
            server_public_key.algorithm(),
            fingerprint
        );

        async { Ok(true) }
    }
}
