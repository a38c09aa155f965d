//! 运动矢量解码与运动补偿.
//!
//! 每个方向 (前向/后向) 维护一组运动状态; 补偿拷贝按半像素奇偶分四种
//! 情形特化: 整数位移直接拷贝, 单轴半像素用 `(a+b+1)>>1` 舍入平均,
//! 双轴用 `(a+b+c+d+2)>>2` 双线性. B 图像双向预测时后向预测以
//! `(前向+后向+1)>>1` 平均叠加, 遵循 ISO 11172-2 的定义.

use super::tables;
use super::Video;
use crate::frame::Frame;

/// 单方向运动状态
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct Motion {
    /// 矢量以整像素为单位 (full_pel 标志)
    pub full_px: bool,
    /// 残差位数 (f_code - 1)
    pub r_size: u32,
    /// 水平分量 (半像素单位)
    pub h: i32,
    /// 垂直分量 (半像素单位)
    pub v: i32,
    /// 本宏块是否携带该方向的运动信息
    pub is_set: bool,
}

impl Video {
    /// 解码当前宏块的运动矢量
    pub(super) fn decode_motion_vectors(&mut self) {
        // 前向
        if self.motion_forward.is_set {
            let r_size = self.motion_forward.r_size;
            self.motion_forward.h = self.decode_motion_vector(r_size, self.motion_forward.h);
            self.motion_forward.v = self.decode_motion_vector(r_size, self.motion_forward.v);
        } else if self.picture_type == super::PICTURE_TYPE_PREDICTIVE {
            // P 图像中无运动信息的宏块重置矢量
            self.motion_forward.h = 0;
            self.motion_forward.v = 0;
        }

        if self.motion_backward.is_set {
            let r_size = self.motion_backward.r_size;
            self.motion_backward.h = self.decode_motion_vector(r_size, self.motion_backward.h);
            self.motion_backward.v = self.decode_motion_vector(r_size, self.motion_backward.v);
        }
    }

    /// 解码单个矢量分量: VLC 码 + 残差位, 结果回绕到合法区间
    fn decode_motion_vector(&mut self, r_size: u32, mut motion: i32) -> i32 {
        let fscale = 1i32 << r_size;
        let m_code = self.buf.read_vlc(&tables::MOTION);

        let d = if m_code != 0 && fscale != 1 {
            let r = self.buf.read(r_size as usize) as i32;
            let d = ((m_code.abs() - 1) << r_size) + r + 1;
            if m_code < 0 {
                -d
            } else {
                d
            }
        } else {
            m_code
        };

        motion += d;
        if motion > (fscale << 4) - 1 {
            motion -= fscale << 5;
        } else if motion < -fscale << 4 {
            motion += fscale << 5;
        }

        motion
    }

    /// 用当前运动状态预测宏块, 写入当前帧
    pub(super) fn predict_macroblock(&mut self) {
        let mut fw_h = self.motion_forward.h;
        let mut fw_v = self.motion_forward.v;

        if self.motion_forward.full_px {
            fw_h <<= 1;
            fw_v <<= 1;
        }

        if self.picture_type == super::PICTURE_TYPE_B {
            let mut bw_h = self.motion_backward.h;
            let mut bw_v = self.motion_backward.v;

            if self.motion_backward.full_px {
                bw_h <<= 1;
                bw_v <<= 1;
            }

            if self.motion_forward.is_set {
                self.copy_macroblock(fw_h, fw_v, self.forward, false);
                if self.motion_backward.is_set {
                    // 双向预测: 后向预测平均进前向结果
                    self.copy_macroblock(bw_h, bw_v, self.backward, true);
                }
            } else {
                self.copy_macroblock(bw_h, bw_v, self.backward, false);
            }
        } else {
            self.copy_macroblock(fw_h, fw_v, self.forward, false);
        }
    }

    /// 从参考帧拷贝 (或平均叠加) 一个宏块到当前帧
    fn copy_macroblock(&mut self, motion_h: i32, motion_v: i32, source: usize, blend: bool) {
        let (dst, src) = frames_pair(&mut self.frames, self.current, source);

        // 亮度: 16x16
        predict_plane(
            &src.y.data,
            &mut dst.y.data,
            self.luma_width,
            16,
            self.mb_row << 4,
            self.mb_col << 4,
            motion_h,
            motion_v,
            blend,
        );

        // 色度: 矢量向零截断减半, 8x8
        let ch = motion_h / 2;
        let cv = motion_v / 2;
        predict_plane(
            &src.cb.data,
            &mut dst.cb.data,
            self.chroma_width,
            8,
            self.mb_row << 3,
            self.mb_col << 3,
            ch,
            cv,
            blend,
        );
        predict_plane(
            &src.cr.data,
            &mut dst.cr.data,
            self.chroma_width,
            8,
            self.mb_row << 3,
            self.mb_col << 3,
            ch,
            cv,
            blend,
        );
    }
}

/// 从帧仓中同时取出目标帧 (可变) 与参考帧 (只读)
fn frames_pair(frames: &mut [Frame; 3], dst: usize, src: usize) -> (&mut Frame, &Frame) {
    debug_assert_ne!(dst, src);
    if dst < src {
        let (a, b) = frames.split_at_mut(src);
        (&mut a[dst], &b[0])
    } else {
        let (a, b) = frames.split_at_mut(dst);
        (&mut b[0], &a[src])
    }
}

/// 单平面的运动补偿预测
///
/// `block` 为块边长 (亮度 16, 色度 8), `row0`/`col0` 为目标块左上角.
/// 源区域越界的矢量按损坏码流处理, 丢弃该块的预测.
#[allow(clippy::too_many_arguments)]
fn predict_plane(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    block: usize,
    row0: usize,
    col0: usize,
    motion_h: i32,
    motion_v: i32,
    blend: bool,
) {
    let height = src.len() / width;

    let hp = motion_h >> 1;
    let vp = motion_v >> 1;
    let odd_h = (motion_h & 1) != 0;
    let odd_v = (motion_v & 1) != 0;

    let src_row = row0 as i32 + vp;
    let src_col = col0 as i32 + hp;
    let rows_needed = block as i32 + i32::from(odd_v);
    let cols_needed = block as i32 + i32::from(odd_h);

    if src_row < 0
        || src_col < 0
        || src_row + rows_needed > height as i32
        || src_col + cols_needed > width as i32
    {
        log::debug!("运动矢量 ({motion_h}, {motion_v}) 越界, 丢弃预测块");
        return;
    }

    let mut si = src_row as usize * width + src_col as usize;
    let mut di = row0 * width + col0;
    let scan = width - block;

    let store = |d: &mut u8, p: u32| {
        if blend {
            *d = ((u32::from(*d) + p + 1) >> 1) as u8;
        } else {
            *d = p as u8;
        }
    };

    match (odd_h, odd_v) {
        (false, false) => {
            for _ in 0..block {
                for _ in 0..block {
                    store(&mut dst[di], u32::from(src[si]));
                    si += 1;
                    di += 1;
                }
                si += scan;
                di += scan;
            }
        }
        (true, false) => {
            for _ in 0..block {
                for _ in 0..block {
                    let p = (u32::from(src[si]) + u32::from(src[si + 1]) + 1) >> 1;
                    store(&mut dst[di], p);
                    si += 1;
                    di += 1;
                }
                si += scan;
                di += scan;
            }
        }
        (false, true) => {
            for _ in 0..block {
                for _ in 0..block {
                    let p = (u32::from(src[si]) + u32::from(src[si + width]) + 1) >> 1;
                    store(&mut dst[di], p);
                    si += 1;
                    di += 1;
                }
                si += scan;
                di += scan;
            }
        }
        (true, true) => {
            for _ in 0..block {
                for _ in 0..block {
                    let p = (u32::from(src[si])
                        + u32::from(src[si + 1])
                        + u32::from(src[si + width])
                        + u32::from(src[si + width + 1])
                        + 2)
                        >> 2;
                    store(&mut dst[di], p);
                    si += 1;
                    di += 1;
                }
                si += scan;
                di += scan;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane_from(width: usize, data: &[u8]) -> Vec<u8> {
        assert_eq!(data.len() % width, 0);
        data.to_vec()
    }

    #[test]
    fn test_predict_plane_整数位移() {
        // 4x4 的块尺寸不在产品路径上, 用 8x8 平面验证位移语义
        let src: Vec<u8> = (0..64).collect();
        let mut dst = vec![0u8; 64];

        // 位移 (2, 0) 半像素 = 1 整像素右移
        predict_plane(&src, &mut dst, 8, 8, 0, 0, 2, 0, false);
        // 越界 (块右缘超出) -> 预测被丢弃, 目标不变
        assert!(dst.iter().all(|&v| v == 0));

        // 无位移: 纯拷贝
        predict_plane(&src, &mut dst, 8, 8, 0, 0, 0, 0, false);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_predict_plane_半像素平均() {
        // 16x8: 左半为源块, 右半提供水平相邻像素
        let width = 16;
        let mut src = vec![0u8; width * 8];
        for r in 0..8 {
            for c in 0..width {
                src[r * width + c] = (c * 10) as u8;
            }
        }
        let mut dst = vec![0u8; width * 8];

        // 水平半像素: (a + b + 1) >> 1
        predict_plane(&src, &mut dst, width, 8, 0, 0, 1, 0, false);
        assert_eq!(dst[0], 5); // (0 + 10 + 1) >> 1
        assert_eq!(dst[7], 75); // (70 + 80 + 1) >> 1
    }

    #[test]
    fn test_predict_plane_双向平均() {
        let width = 16;
        let src = plane_from(width, &[100u8; 16 * 8]);
        let mut dst = vec![0u8; width * 8];

        // 前向预测写入 100, 后向 blend 平均到 (0... 先铺 60)
        dst.iter_mut().for_each(|v| *v = 60);
        predict_plane(&src, &mut dst, width, 8, 0, 0, 0, 0, true);
        // (60 + 100 + 1) >> 1 = 80
        assert!(dst[..8].iter().all(|&v| v == 80));
    }
}
