//! # liu-format
//!
//! Liu 解码库容器层: MPEG-PS (Program Stream) 解封装器.
//!
//! [`Demux`] 从位流缓冲区中解析 pack/system 头, 把复用的 PES 包
//! 拆成按流类型标记的 [`liu_codec::Packet`], 并提供按时间的
//! 二分估算 seek 与时长探测.

pub mod demux;

pub use demux::Demux;
