//! # liu-codec
//!
//! Liu 解码库编解码层: MPEG-1 视频解码器 ([`Video`]) 与 MPEG-1
//! Audio Layer II 解码器 ([`Audio`]), 以及两者的输出数据模型.
//!
//! 两个解码器各自拥有一个 [`liu_core::BitBuffer`] 作为输入.
//! 缓冲区既可以直接绑定字节源 (解码裸的 elementary stream),
//! 也可以由上层按包写入 (配合 MPEG-PS 解封装器).

pub mod audio;
pub mod frame;
pub mod packet;
pub mod samples;
pub mod video;

// 重导出常用类型
pub use audio::Audio;
pub use frame::{Frame, Plane};
pub use packet::Packet;
pub use samples::{AudioFormat, Samples, SAMPLES_PER_FRAME};
pub use video::Video;
