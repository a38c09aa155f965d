//! 解码后的音频采样 (Samples).
//!
//! MP2 每帧固定输出 1152 个 PCM 采样点 (每声道). 解码器内部以
//! 归一化 float 计算, 按选定的输出格式写入对应缓冲区.

/// 每帧 PCM 采样数 (每声道), 由 Layer II 规定
pub const SAMPLES_PER_FRAME: usize = 1152;

/// 音频输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioFormat {
    /// 32 位浮点, 归一化到 (-1, 1), 交错
    #[default]
    F32N,
    /// 32 位浮点, 归一化, 左右声道分离
    F32Nlr,
    /// 32 位浮点, 放大到 32 位整数值域, 交错
    F32,
    /// 有符号 16 位整数, 交错
    S16,
}

/// 解码后的一帧音频采样
///
/// 所有输出缓冲区常驻, 每次解码按当前格式就地覆写其中一种;
/// 内容在下一次解码调用前有效.
#[derive(Debug, Clone)]
pub struct Samples {
    /// 显示时间 (秒)
    pub time: f64,
    /// S16 交错输出 (`2 * SAMPLES_PER_FRAME`)
    pub s16: Vec<i16>,
    /// 放大的 F32 交错输出
    pub f32: Vec<f32>,
    /// 归一化左声道
    pub left: Vec<f32>,
    /// 归一化右声道
    pub right: Vec<f32>,
    /// 归一化交错输出
    pub interleaved: Vec<f32>,
}

impl Samples {
    pub(crate) fn alloc() -> Self {
        Self {
            time: 0.0,
            s16: vec![0; SAMPLES_PER_FRAME * 2],
            f32: vec![0.0; SAMPLES_PER_FRAME * 2],
            left: vec![0.0; SAMPLES_PER_FRAME],
            right: vec![0.0; SAMPLES_PER_FRAME],
            interleaved: vec![0.0; SAMPLES_PER_FRAME * 2],
        }
    }
}
