//! 解码后的视频帧 (Frame).
//!
//! 三个平面 (Y, Cb, Cr) 分别存储, 4:2:0 色度二次采样.

/// 视频平面
///
/// 数据长度为 `width * height`. 亮度平面 (Y) 的宽高是两个色度平面
/// (Cb, Cr) 的两倍. 平面尺寸总是向上取整到宏块边界 (16 像素),
/// 因此可能大于显示尺寸, 显示时由使用方裁剪.
#[derive(Debug, Clone, Default)]
pub struct Plane {
    /// 平面宽度 (像素)
    pub width: u32,
    /// 平面高度 (像素)
    pub height: u32,
    /// 像素数据
    pub data: Vec<u8>,
}

impl Plane {
    pub(crate) fn alloc(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width * height) as usize],
        }
    }
}

/// 解码后的视频帧
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// 显示时间 (秒)
    pub time: f64,
    /// 显示宽度 (像素, 可能小于平面宽度)
    pub width: u32,
    /// 显示高度 (像素, 可能小于平面高度)
    pub height: u32,
    /// 亮度平面
    pub y: Plane,
    /// 蓝色色度平面
    pub cb: Plane,
    /// 红色色度平面
    pub cr: Plane,
}
