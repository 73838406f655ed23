/// 远程控制命令状态。`Responded` 与 `TimedOut` 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandState {
    Pending,
    Responded,
    TimedOut,
}

impl CommandState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Responded => "responded",
            Self::TimedOut => "timed_out",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "responded" => Some(Self::Responded),
            "timed_out" => Some(Self::TimedOut),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// 远程控制命令，以 `(sim_id, device_req_no)` 定位。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteControlCommand {
    pub device_req_no: String,
    pub sim_id: String,
    /// 目标 DO 端子号。
    pub do_no: i64,
    /// 下发时间（Unix 秒）。
    pub issued_at: i64,
    pub state: CommandState,
    /// 进入终态的时间（Unix 秒）。
    pub resolved_at: Option<i64>,
}
