//! # Liu (流)
//!
//! 纯 Rust 实现的 MPEG-1 Program Stream 解码库: MPEG-PS 解封装 +
//! MPEG-1 视频解码 + MP2 (Layer II) 音频解码.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use liu::Mpeg;
//!
//! let mut mpeg = Mpeg::from_file("video.mpg").unwrap();
//! println!(
//!     "{}x{} @ {:.2} fps, 音频 {} Hz",
//!     mpeg.width(),
//!     mpeg.height(),
//!     mpeg.framerate(),
//!     mpeg.samplerate()
//! );
//!
//! while let Some(frame) = mpeg.decode_video() {
//!     // frame.y / frame.cb / frame.cr 为 YCbCr 4:2:0 平面
//!     println!("帧 @ {:.3}s", frame.time);
//! }
//! ```
//!
//! 高层接口 [`Mpeg`] 把解封装器与解码器组合成易用的播放器封装;
//! 逐帧拉取用 [`Mpeg::decode_video`] / [`Mpeg::decode_audio`],
//! 按墙钟推进并经回调产出用 [`Mpeg::decode`].
//!
//! 若手上是裸的 mpeg1video 或 mp2 数据, 或者只想分析 MPEG-PS 容器,
//! 可以直接使用底层的 [`codec::Video`], [`codec::Audio`] 与
//! [`format::Demux`].
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `liu-core` | 位流缓冲区, 字节源, 错误类型 |
//! | `liu-codec` | MPEG-1 视频与 MP2 音频解码器 |
//! | `liu-format` | MPEG-PS 解封装器 |

/// 核心设施 (位流缓冲区, 字节源, 错误类型)
pub use liu_core as core;

/// 编解码层 (MPEG-1 视频, MP2 音频)
pub use liu_codec as codec;

/// 容器层 (MPEG-PS 解封装)
pub use liu_format as format;

mod player;

pub use liu_codec::{AudioFormat, Frame, Plane, Samples, SAMPLES_PER_FRAME};
pub use liu_core::{ByteSource, LiuError, LiuResult};
pub use player::Mpeg;

/// 获取 Liu 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
