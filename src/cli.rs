// 命令行参数

use std::path::PathBuf;

use clap::Parser;

use crate::services::storage::DEFAULT_SERVERS_FILE;
use crate::ssh::DEFAULT_CONNECT_TIMEOUT;
use crate::sync::filter::DEFAULT_PREFIX;
use crate::sync::{SyncFilter, SyncOptions};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(name = "logsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Incrementally download dated log files from a fleet of hosts over SFTP")]
pub struct Cli {
    /// Hosts file (JSON array of host entries, rewritten with updated watermarks)
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_SERVERS_FILE)]
    pub config: PathBuf,

    /// Local root directory; each host downloads into <DEST>/<folder>
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dest: PathBuf,

    /// Only fetch files whose name starts with this prefix
    #[arg(long, default_value = DEFAULT_PREFIX, value_parser = non_empty_string)]
    pub prefix: String,

    /// Seconds allowed for connect, handshake and authentication
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_CONNECT_TIMEOUT,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub connect_timeout: u64,

    /// List and filter only; transfer nothing and keep watermarks
    #[arg(long)]
    pub dry_run: bool,

    /// Fetch every prefixed, dated file regardless of the stored watermark
    #[arg(long)]
    pub ignore_watermark: bool,

    /// Only sync this host address (repeatable)
    #[arg(long = "host", value_name = "ADDRESS")]
    pub hosts: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            dest_root: self.dest.clone(),
            dry_run: self.dry_run,
            ignore_watermark: self.ignore_watermark,
            only_hosts: self.hosts.clone(),
        }
    }

    pub fn filter(&self) -> SyncFilter {
        SyncFilter::new(self.prefix.clone())
    }
}
