// SSH 连接配置

use std::path::PathBuf;
use std::time::Duration;

use crate::models::HostSpec;

/// 默认连接超时（秒），覆盖地址解析、TCP、握手与认证全过程
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 20;

/// SSH 连接配置
#[derive(Clone, Debug)]
pub struct SshConfig {
    /// 目标主机
    pub host: String,
    /// 端口
    pub port: u16,
    /// 用户名
    pub username: String,
    /// 私钥
    pub key: PrivateKeySource,
    /// 连接超时（秒）
    pub connect_timeout: u64,
    /// 心跳配置
    pub keepalive: KeepaliveConfig,
}

/// 私钥来源
#[derive(Clone)]
pub struct PrivateKeySource {
    /// 私钥文件路径（用于日志）
    pub path: PathBuf,
    /// 启动时读入的私钥内容
    pub pem: String,
    /// 私钥密码（如果有）
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for PrivateKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeySource")
            .field("path", &self.path)
            .field("pem", &"<redacted>")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// 心跳配置
#[derive(Clone, Debug)]
pub struct KeepaliveConfig {
    /// 是否启用心跳
    pub enabled: bool,
    /// 心跳间隔（秒）
    pub interval: u64,
    /// 最大重试次数
    pub max_retries: u32,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 30,
            max_retries: 3,
        }
    }
}

impl SshConfig {
    /// 由主机条目构建连接配置
    pub fn from_host(host: &HostSpec, connect_timeout: u64) -> Self {
        Self {
            host: host.host.clone(),
            port: host.port,
            username: host.username.clone(),
            key: PrivateKeySource {
                path: host.private_key.clone(),
                pem: host.key_material().unwrap_or_default().to_string(),
                passphrase: host.passphrase.clone(),
            },
            connect_timeout,
            keepalive: KeepaliveConfig::default(),
        }
    }

    /// 连接超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// 构建 russh 配置
    pub fn to_russh_config(&self) -> russh::client::Config {
        let mut config = russh::client::Config::default();
        // 传输期间依赖心跳探测断线，不设置不活动超时
        config.inactivity_timeout = None;
        if self.keepalive.enabled {
            config.keepalive_interval = Some(Duration::from_secs(self.keepalive.interval));
            config.keepalive_max = self.keepalive.max_retries as usize;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_host_carries_identity() {
        let host: HostSpec = serde_json::from_str(
            r#"{"host":"10.0.0.5","username":"deploy","privateKey":"/keys/id",
                "remoteLogDir":"/var/www/storage/logs","folder":"web1"}"#,
        )
        .unwrap();
        let config = SshConfig::from_host(&host, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 22);
        assert_eq!(config.username, "deploy");
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert!(!format!("{:?}", config.key).contains("BEGIN"));
    }
}
