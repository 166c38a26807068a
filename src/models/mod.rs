// 数据模型模块

pub mod host;

pub use host::{is_plain_file_name, join_remote_path, HostSpec};
