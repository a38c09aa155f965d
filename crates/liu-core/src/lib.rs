//! # liu-core
//!
//! Liu 解码库核心 crate, 提供错误类型、字节源抽象和位流缓冲区.
//!
//! 所有上层组件 (解封装器、视频/音频解码器) 都建立在本 crate 的
//! [`BitBuffer`] 之上: 它维护一个可增长的字节窗口, 支持按位读取、
//! 起始码扫描和 VLC (变长编码) 树遍历, 并在数据不足时按需从
//! [`ByteSource`] 拉取更多字节.

pub mod bitbuf;
pub mod error;
pub mod source;

// 重导出常用类型
pub use bitbuf::{BitBuffer, Vlc, VlcUint};
pub use error::{LiuError, LiuResult};
pub use source::{ByteSource, FileSource, MemorySource, ReadSource};
