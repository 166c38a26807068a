// logsync - 应用入口

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};

use logsync::services::storage::JsonConfigStore;
use logsync::ssh::SshConnector;
use logsync::sync::SyncOrchestrator;
use logsync::Cli;

/// 有主机失败或写回失败
const EXIT_HOST_FAILED: u8 = 1;
/// 启动失败（配置、日志）
const EXIT_STARTUP_FAILED: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 初始化日志系统，可通过 RUST_LOG 细化
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let store = JsonConfigStore::new(&cli.config);
    let mut hosts = match store.load() {
        Ok(hosts) => hosts,
        Err(e) => {
            error!("[CONFIG] {:#}", e);
            return ExitCode::from(EXIT_STARTUP_FAILED);
        }
    };

    if cli.dry_run {
        info!("[SYNC] Dry run: nothing will be downloaded or persisted");
    }

    let orchestrator = SyncOrchestrator::new(
        Box::new(SshConnector::new(cli.connect_timeout)),
        Box::new(store),
    )
    .with_filter(cli.filter())
    .with_options(cli.sync_options());

    let summary = orchestrator.run(&mut hosts).await;

    for report in summary.reports.iter().filter(|r| r.needs_attention()) {
        let reason = report
            .error
            .as_deref()
            .or(report.persist_error.as_deref())
            .unwrap_or("unknown error");
        error!(host = %report.host, "[SYNC] Host needs attention: {}", reason);
    }

    if summary.has_failures() {
        ExitCode::from(EXIT_HOST_FAILED)
    } else {
        ExitCode::SUCCESS
    }
}
