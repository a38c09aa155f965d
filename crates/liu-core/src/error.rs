//! 统一错误类型定义.
//!
//! 所有 Liu crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// Liu 解码库统一错误类型
#[derive(Debug, Error)]
pub enum LiuError {
    /// 容器格式错误 (如缺失 MPEG-PS pack/system 头)
    #[error("格式错误: {0}")]
    Format(String),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 不支持的操作或特性
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 数据不足, 需要更多输入
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,
}

/// Liu 解码库统一 Result 类型
pub type LiuResult<T> = Result<T, LiuError>;
