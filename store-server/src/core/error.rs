//! 服务器级错误
//!
//! 仅覆盖启动和运行阶段的失败。API 处理器统一使用
//! [`AppError`](crate::utils::AppError)，不经过这里。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

/// 服务器启动阶段的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
