// 同步引擎
//
// 模块结构:
// - error: 错误分类 (SyncError)
// - filter: 文件名过滤 (SyncFilter)
// - state: 主机状态机 (HostState)
// - transport: 连接/会话/通道抽象 (Connector, RemoteSession, TransferChannel, Clock)
// - report: 运行结果 (HostReport, RunSummary, TransferTask)
// - orchestrator: 逐主机同步驱动 (SyncOrchestrator)

pub mod error;
pub mod filter;
pub mod orchestrator;
pub mod report;
pub mod state;
pub mod transport;

pub use error::SyncError;
pub use filter::{FilterDecision, SkipReason, SyncFilter};
pub use orchestrator::{SyncOptions, SyncOrchestrator};
pub use report::{HostReport, RunSummary};
pub use state::HostState;
pub use transport::{Clock, Connector, RemoteSession, SystemClock, TransferChannel};
