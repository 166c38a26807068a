// 后端服务：配置持久化与 SFTP 传输

pub mod sftp;
pub mod storage;
