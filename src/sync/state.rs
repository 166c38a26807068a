// 单个主机的同步状态机

/// 主机同步阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostState {
    Idle,
    Connecting,
    Connected,
    Listing,
    Filtering,
    Transferring,
    Finalizing,
    Done,
    /// 终止状态：主机处理失败，水位线不变
    Errored,
}

impl HostState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Listing => "listing",
            Self::Filtering => "filtering",
            Self::Transferring => "transferring",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Errored => "errored",
        }
    }

    /// 正常流程中的下一阶段
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Connecting),
            Self::Connecting => Some(Self::Connected),
            Self::Connected => Some(Self::Listing),
            Self::Listing => Some(Self::Filtering),
            Self::Filtering => Some(Self::Transferring),
            Self::Transferring => Some(Self::Finalizing),
            Self::Finalizing => Some(Self::Done),
            Self::Done | Self::Errored => None,
        }
    }

    /// 可以从该阶段进入 Errored
    pub fn can_fail(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Connected | Self::Listing | Self::Filtering | Self::Transferring
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Errored)
    }

    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to) || (to == Self::Errored && self.can_fail())
    }
}

impl std::fmt::Display for HostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
