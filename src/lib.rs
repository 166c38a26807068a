// logsync - 通过 SFTP 增量同步多台主机的日志文件

pub mod cli;
pub mod models;
pub mod services;
pub mod ssh;
pub mod sync;

pub use cli::Cli;
