use thiserror::Error;

/// 终止整次运行的错误。单条序列上的失败不走这里，而是记录在日志条目里。
#[derive(Error, Debug)]
pub enum RotateError {
    #[error("input sequence set is empty")]
    EmptyInput,

    #[error("anchor '{0}' is not present in the input set")]
    AnchorNotFound(String),

    #[error("duplicate sequence id '{0}'")]
    DuplicateId(String),

    #[error("cannot invoke {tool}: {reason}")]
    OracleUnavailable { tool: String, reason: String },

    #[error("{tool} failed: {message}")]
    OracleFailed { tool: String, message: String },
}

impl RotateError {
    pub fn unavailable(tool: &str, reason: impl ToString) -> Self {
        Self::OracleUnavailable { tool: tool.to_string(), reason: reason.to_string() }
    }

    pub fn failed(tool: &str, message: impl ToString) -> Self {
        Self::OracleFailed { tool: tool.to_string(), message: message.to_string() }
    }
}
