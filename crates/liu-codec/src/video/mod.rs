//! MPEG-1 视频解码器.
//!
//! 把 mpeg1video elementary stream 解码为 YCbCr 4:2:0 平面帧.
//! 解码按 序列头 -> 图像 -> 条带 -> 宏块 -> 块 逐层推进, 参考帧
//! 在三个常驻帧缓冲之间以下标轮转, 平面数据在播放期间从不复制
//! 或重新分配.
//!
//! B 图像解码输出天然乱序, [`Video::decode`] 负责重排: B 图像直接
//! 输出, I/P 图像先输出之前缓存的参考帧; 流结束时把挂起的参考帧
//! 补发出去. 调用方看到的始终是显示顺序.

mod idct;
mod motion;
mod tables;

use liu_core::BitBuffer;
use log::debug;

use crate::frame::{Frame, Plane};
use motion::Motion;

/// I 图像 (帧内编码)
pub(crate) const PICTURE_TYPE_INTRA: u32 = 1;
/// P 图像 (前向预测)
pub(crate) const PICTURE_TYPE_PREDICTIVE: u32 = 2;
/// B 图像 (双向预测)
pub(crate) const PICTURE_TYPE_B: u32 = 3;

/// 图像起始码
pub(crate) const START_PICTURE: u8 = 0x00;
/// 条带起始码下界
const START_SLICE_FIRST: u8 = 0x01;
/// 条带起始码上界
const START_SLICE_LAST: u8 = 0xAF;
/// 用户数据起始码
const START_USER_DATA: u8 = 0xB2;
/// 序列头起始码
pub(crate) const START_SEQUENCE: u8 = 0xB3;
/// 扩展起始码
const START_EXTENSION: u8 = 0xB5;

/// 判断起始码是否为条带 (低字节编码条带起始行)
const fn start_is_slice(c: u8) -> bool {
    c >= START_SLICE_FIRST && c <= START_SLICE_LAST
}

/// 解码出的帧在帧仓中的槽位, 通过 [`Video::frame`] 取用
#[derive(Debug, Clone, Copy)]
pub struct FrameSlot(usize);

/// MPEG-1 视频解码器
pub struct Video {
    buf: BitBuffer,

    aspect_ratio: f64,
    framerate: f64,
    time: f64,
    bit_rate: u32,
    frames_decoded: usize,
    width: u32,
    height: u32,
    mb_width: usize,
    mb_height: usize,
    mb_size: usize,

    luma_width: usize,
    luma_height: usize,
    chroma_width: usize,
    chroma_height: usize,

    start_code: Option<u8>,
    picture_type: u32,

    motion_forward: Motion,
    motion_backward: Motion,

    has_sequence_header: bool,

    quantizer_scale: i32,
    slice_begin: bool,
    macroblock_address: i32,

    mb_row: usize,
    mb_col: usize,

    macroblock_type: i32,
    macroblock_intra: bool,

    dc_predictor: [i32; 3],

    /// 三个常驻帧缓冲, current/forward/backward 为其中的下标
    frames: [Frame; 3],
    current: usize,
    forward: usize,
    backward: usize,

    block_data: [i32; 64],
    intra_quant_matrix: [u8; 64],
    non_intra_quant_matrix: [u8; 64],

    has_reference_frame: bool,
    assume_no_b_frames: bool,
}

impl Video {
    /// 以 `buf` 为数据源创建视频解码器, 并尝试解析序列头
    pub fn new(buf: BitBuffer) -> Self {
        let mut video = Self {
            buf,
            aspect_ratio: 0.0,
            framerate: 0.0,
            time: 0.0,
            bit_rate: 0,
            frames_decoded: 0,
            width: 0,
            height: 0,
            mb_width: 0,
            mb_height: 0,
            mb_size: 0,
            luma_width: 0,
            luma_height: 0,
            chroma_width: 0,
            chroma_height: 0,
            start_code: None,
            picture_type: 0,
            motion_forward: Motion::default(),
            motion_backward: Motion::default(),
            has_sequence_header: false,
            quantizer_scale: 0,
            slice_begin: false,
            macroblock_address: 0,
            mb_row: 0,
            mb_col: 0,
            macroblock_type: 0,
            macroblock_intra: false,
            dc_predictor: [0; 3],
            frames: [Frame::default(), Frame::default(), Frame::default()],
            current: 0,
            forward: 1,
            backward: 2,
            block_data: [0; 64],
            intra_quant_matrix: [0; 64],
            non_intra_quant_matrix: [0; 64],
            has_reference_frame: false,
            assume_no_b_frames: false,
        };

        if video.buf.find_start_code(START_SEQUENCE) {
            video.start_code = Some(START_SEQUENCE);
            video.decode_sequence_header();
        }

        video
    }

    /// 输入缓冲区 (供上层按包写入)
    pub fn buffer_mut(&mut self) -> &mut BitBuffer {
        &mut self.buf
    }

    /// 是否已解析到序列头, 可以准确报告尺寸与帧率
    pub fn has_header(&mut self) -> bool {
        if self.has_sequence_header {
            return true;
        }

        if self.start_code != Some(START_SEQUENCE) {
            self.start_code = if self.buf.find_start_code(START_SEQUENCE) {
                Some(START_SEQUENCE)
            } else {
                None
            };
        }
        if self.start_code.is_none() {
            return false;
        }

        self.decode_sequence_header()
    }

    /// 帧率 (帧/秒)
    pub fn framerate(&mut self) -> f64 {
        if self.has_header() {
            self.framerate
        } else {
            0.0
        }
    }

    /// 显示宽度 (像素)
    pub fn width(&mut self) -> u32 {
        if self.has_header() {
            self.width
        } else {
            0
        }
    }

    /// 显示高度 (像素)
    pub fn height(&mut self) -> u32 {
        if self.has_header() {
            self.height
        } else {
            0
        }
    }

    /// 宽高比
    pub fn aspect_ratio(&mut self) -> f64 {
        if self.has_header() {
            self.aspect_ratio
        } else {
            0.0
        }
    }

    /// 码率 (bit/s), 序列头中的标称值
    pub fn bit_rate(&mut self) -> u32 {
        if self.has_header() {
            self.bit_rate
        } else {
            0
        }
    }

    /// 设置"无延迟"模式: 假定流中没有 B 图像, 省去重排延迟
    ///
    /// 适用于低延迟推流场景, 由调用方保证流中确实没有 B 图像.
    pub fn set_no_delay(&mut self, no_delay: bool) {
        self.assume_no_b_frames = no_delay;
    }

    /// 当前内部时钟 (秒)
    pub fn time(&self) -> f64 {
        self.time
    }

    /// 强制设置内部时钟 (秒)
    ///
    /// 仅在外部直接操纵输入缓冲区 (如 seek 后重新投喂) 时使用.
    pub fn set_time(&mut self, time: f64) {
        self.frames_decoded = (self.framerate * time) as usize;
        self.time = time;
    }

    /// 回绕输入缓冲区并重置解码状态
    pub fn rewind(&mut self) {
        self.buf.rewind();
        self.time = 0.0;
        self.frames_decoded = 0;
        self.has_reference_frame = false;
        self.start_code = None;
    }

    /// 是否已到达流末尾 (回绕后清除)
    pub fn has_ended(&self) -> bool {
        self.buf.has_ended()
    }

    /// 解码一帧, 内部时钟前进 1/帧率 秒
    ///
    /// 返回的帧借用解码器内部缓冲, 在下一次解码调用前有效.
    /// 数据不足或流中没有完整图像时返回 `None`.
    pub fn decode(&mut self) -> Option<&Frame> {
        let slot = self.decode_slot()?;
        Some(self.frame(slot))
    }

    /// 推进解码一步, 返回可通过 [`Video::frame`] 取用的槽位
    ///
    /// 与 [`Video::decode`] 等价, 但不持有借用, 便于调用方在重试
    /// 循环中交替投喂数据.
    pub fn decode_slot(&mut self) -> Option<FrameSlot> {
        if !self.has_header() {
            return None;
        }

        let slot = loop {
            if self.start_code != Some(START_PICTURE) {
                self.start_code = if self.buf.find_start_code(START_PICTURE) {
                    Some(START_PICTURE)
                } else {
                    None
                };

                if self.start_code.is_none() {
                    // 流已结束而上一幅是参考图像时, 仍要把它补发出去
                    if self.has_reference_frame
                        && !self.assume_no_b_frames
                        && self.buf.has_ended()
                        && (self.picture_type == PICTURE_TYPE_INTRA
                            || self.picture_type == PICTURE_TYPE_PREDICTIVE)
                    {
                        self.has_reference_frame = false;
                        break self.backward;
                    }

                    return None;
                }
            }

            // 解码前须确保整幅图像已在缓冲区内: 只能通过寻找下一幅
            // 图像的起始码来判定; 若找不到但源已结束, 视作最后一幅.
            if !self.buf.has_start_code(START_PICTURE) && !self.buf.has_ended() {
                return None;
            }
            self.buf.discard_read_bytes();

            self.decode_picture();

            if self.assume_no_b_frames {
                break self.backward;
            } else if self.picture_type == PICTURE_TYPE_B {
                break self.current;
            } else if self.has_reference_frame {
                break self.forward;
            }
            self.has_reference_frame = true;
        };

        self.frames[slot].time = self.time;
        self.frames_decoded += 1;
        self.time = self.frames_decoded as f64 / self.framerate;

        Some(FrameSlot(slot))
    }

    /// 取用一个已解码槽位中的帧
    pub fn frame(&self, slot: FrameSlot) -> &Frame {
        &self.frames[slot.0]
    }

    // ========================
    // 序列层
    // ========================

    fn decode_sequence_header(&mut self) -> bool {
        let max_header_size = 64 + 2 * 64 * 8; // 64 位头 + 两个 64 字节矩阵
        if !self.buf.has(max_header_size) {
            return false;
        }

        self.width = self.buf.read(12);
        self.height = self.buf.read(12);

        if self.width == 0 || self.height == 0 {
            return false;
        }

        self.aspect_ratio = tables::ASPECT_RATIO[self.buf.read(4) as usize];
        self.framerate = tables::PICTURE_RATE[self.buf.read(4) as usize];
        self.bit_rate = self.buf.read(18);

        // 跳过 marker, vbv_buffer_size 和 constrained 位
        self.buf.skip(1 + 10 + 1);

        // 自定义帧内量化矩阵按之字形顺序读入
        if self.buf.read(1) != 0 {
            for i in 0..64 {
                let idx = tables::ZIG_ZAG[i] as usize;
                self.intra_quant_matrix[idx] = self.buf.read(8) as u8;
            }
        } else {
            self.intra_quant_matrix = tables::INTRA_QUANT_MATRIX;
        }

        // 自定义帧间量化矩阵
        if self.buf.read(1) != 0 {
            for i in 0..64 {
                let idx = tables::ZIG_ZAG[i] as usize;
                self.non_intra_quant_matrix[idx] = self.buf.read(8) as u8;
            }
        } else {
            self.non_intra_quant_matrix = tables::NON_INTRA_QUANT_MATRIX;
        }

        self.mb_width = (self.width as usize + 15) >> 4;
        self.mb_height = (self.height as usize + 15) >> 4;
        self.mb_size = self.mb_width * self.mb_height;

        self.luma_width = self.mb_width << 4;
        self.luma_height = self.mb_height << 4;
        self.chroma_width = self.mb_width << 3;
        self.chroma_height = self.mb_height << 3;

        // 一次性分配三个帧缓冲, 此后仅轮转下标
        for frame in &mut self.frames {
            frame.width = self.width;
            frame.height = self.height;
            frame.y = Plane::alloc(self.luma_width as u32, self.luma_height as u32);
            frame.cb = Plane::alloc(self.chroma_width as u32, self.chroma_height as u32);
            frame.cr = Plane::alloc(self.chroma_width as u32, self.chroma_height as u32);
        }

        debug!(
            "序列头: {}x{} @ {:.3} fps, 宏块 {}x{}",
            self.width, self.height, self.framerate, self.mb_width, self.mb_height
        );

        self.has_sequence_header = true;
        true
    }

    // ========================
    // 图像层
    // ========================

    fn decode_picture(&mut self) {
        self.buf.skip(10); // temporal_reference
        self.picture_type = self.buf.read(3);
        self.buf.skip(16); // vbv_delay

        // D 图像或未知编码类型: 丢弃
        if self.picture_type == 0 || self.picture_type > PICTURE_TYPE_B {
            return;
        }

        // 前向 full_pel 与 f_code
        if self.picture_type == PICTURE_TYPE_PREDICTIVE || self.picture_type == PICTURE_TYPE_B {
            self.motion_forward.full_px = self.buf.read(1) != 0;
            let f_code = self.buf.read(3);
            if f_code == 0 {
                // f_code 为零的图像丢弃
                return;
            }
            self.motion_forward.r_size = f_code - 1;
        }

        // 后向 full_pel 与 f_code
        if self.picture_type == PICTURE_TYPE_B {
            self.motion_backward.full_px = self.buf.read(1) != 0;
            let f_code = self.buf.read(3);
            if f_code == 0 {
                return;
            }
            self.motion_backward.r_size = f_code - 1;
        }

        let frame_temp = self.forward;
        if self.picture_type == PICTURE_TYPE_INTRA || self.picture_type == PICTURE_TYPE_PREDICTIVE
        {
            self.forward = self.backward;
        }

        // 跳过扩展与用户数据, 停在第一个条带起始码上
        loop {
            self.start_code = self.buf.next_start_code();
            if self.start_code != Some(START_EXTENSION) && self.start_code != Some(START_USER_DATA)
            {
                break;
            }
        }

        // 解码所有条带
        while let Some(code) = self.start_code {
            if !start_is_slice(code) {
                break;
            }
            self.decode_slice(code as usize);
            if self.macroblock_address >= self.mb_size as i32 - 2 {
                break;
            }
            self.start_code = self.buf.next_start_code();
        }

        // 参考图像解码完成后轮转预测下标
        if self.picture_type == PICTURE_TYPE_INTRA || self.picture_type == PICTURE_TYPE_PREDICTIVE
        {
            self.backward = self.current;
            self.current = frame_temp;
        }
    }

    // ========================
    // 条带层
    // ========================

    fn decode_slice(&mut self, slice: usize) {
        self.slice_begin = true;
        self.macroblock_address = ((slice - 1) * self.mb_width) as i32 - 1;

        // 条带起点重置运动矢量与直流预测器
        self.motion_backward.h = 0;
        self.motion_forward.h = 0;
        self.motion_backward.v = 0;
        self.motion_forward.v = 0;
        self.dc_predictor = [128; 3];

        self.quantizer_scale = self.buf.read(5) as i32;

        // 跳过 extra_information
        while self.buf.read(1) != 0 {
            self.buf.skip(8);
        }

        loop {
            self.decode_macroblock();
            if self.macroblock_address >= self.mb_size as i32 - 1 || !self.buf.peek_non_zero(23) {
                break;
            }
        }
    }

    // ========================
    // 宏块层
    // ========================

    fn decode_macroblock(&mut self) {
        // 地址增量: 34 为填充码, 35 为转义码 (+33)
        let mut increment: i32 = 0;
        let mut t = self.buf.read_vlc(&tables::MACROBLOCK_ADDRESS_INCREMENT);

        while t == 34 {
            t = self.buf.read_vlc(&tables::MACROBLOCK_ADDRESS_INCREMENT);
        }
        while t == 35 {
            increment += 33;
            t = self.buf.read_vlc(&tables::MACROBLOCK_ADDRESS_INCREMENT);
        }
        increment += t;

        if self.slice_begin {
            // 条带的首个增量相对于起始行行首, 而非上一个宏块
            self.slice_begin = false;
            self.macroblock_address += increment;
        } else {
            if self.macroblock_address + increment >= self.mb_size as i32 {
                debug!("宏块地址越界, 丢弃条带剩余部分");
                return;
            }

            if increment > 1 {
                // 被跳过的宏块重置直流预测器
                self.dc_predictor = [128; 3];

                // P 图像中被跳过的宏块同时重置运动矢量
                if self.picture_type == PICTURE_TYPE_PREDICTIVE {
                    self.motion_forward.h = 0;
                    self.motion_forward.v = 0;
                }
            }

            // 被跳过的宏块按当前运动状态做预测
            while increment > 1 {
                self.macroblock_address += 1;
                self.mb_row = self.macroblock_address as usize / self.mb_width;
                self.mb_col = self.macroblock_address as usize % self.mb_width;

                self.predict_macroblock();
                increment -= 1;
            }
            self.macroblock_address += 1;
        }

        if self.macroblock_address < 0 {
            return; // 码流损坏
        }

        self.mb_row = self.macroblock_address as usize / self.mb_width;
        self.mb_col = self.macroblock_address as usize % self.mb_width;

        if self.mb_col >= self.mb_width || self.mb_row >= self.mb_height {
            return; // 码流损坏
        }

        // 宏块类型
        let Some(type_table) = tables::macroblock_type_table(self.picture_type) else {
            return;
        };
        self.macroblock_type = self.buf.read_vlc(type_table);

        self.macroblock_intra = (self.macroblock_type & 0x01) != 0;
        self.motion_forward.is_set = (self.macroblock_type & 0x08) != 0;
        self.motion_backward.is_set = (self.macroblock_type & 0x04) != 0;

        // 携带量化步长
        if (self.macroblock_type & 0x10) != 0 {
            self.quantizer_scale = self.buf.read(5) as i32;
        }

        if self.macroblock_intra {
            // 帧内宏块重置运动矢量
            self.motion_backward.h = 0;
            self.motion_forward.h = 0;
            self.motion_backward.v = 0;
            self.motion_forward.v = 0;
        } else {
            // 帧间宏块重置直流预测器
            self.dc_predictor = [128; 3];

            self.decode_motion_vectors();
            self.predict_macroblock();
        }

        // 编码块模式
        let cbp = if (self.macroblock_type & 0x02) != 0 {
            self.buf.read_vlc(&tables::CODE_BLOCK_PATTERN)
        } else if self.macroblock_intra {
            0x3f
        } else {
            0
        };

        // 依次解码 4 个亮度块, 然后 Cb, Cr
        let mut mask = 0x20;
        for block in 0..6 {
            if (cbp & mask) != 0 {
                self.decode_block(block);
            }
            mask >>= 1;
        }
    }

    // ========================
    // 块层
    // ========================

    fn decode_block(&mut self, block: usize) {
        let mut n = 0usize;

        if self.macroblock_intra {
            // 直流系数: 按平面选择长度表, 差分叠加预测器
            let plane_index = if block > 3 { block - 3 } else { 0 };
            let predictor = self.dc_predictor[plane_index];
            let dct_size = self.buf.read_vlc(tables::DCT_SIZE[plane_index]);

            if dct_size > 0 {
                let differential = self.buf.read(dct_size as usize) as i32;
                if (differential & (1 << (dct_size - 1))) != 0 {
                    self.block_data[0] = predictor + differential;
                } else {
                    self.block_data[0] = predictor + ((-1 << dct_size) | (differential + 1));
                }
            } else {
                self.block_data[0] = predictor;
            }

            self.dc_predictor[plane_index] = self.block_data[0];

            // 反量化 (直流步长 8) + 预乘 (32) 合并为左移 8 位
            self.block_data[0] <<= 8;

            n = 1;
        }

        // 交流系数 (帧间块包含直流)
        loop {
            let mut run: usize;
            let mut level: i32;
            let coeff = self.buf.read_vlc_uint(&tables::DCT_COEFF);

            if coeff == 0x0001 && n > 0 && self.buf.read(1) == 0 {
                // 块结束
                break;
            }

            if coeff == 0xffff {
                // 转义: 6 位 run + 8(或 16) 位 level
                run = self.buf.read(6) as usize;
                level = self.buf.read(8) as i32;
                if level == 0 {
                    level = self.buf.read(8) as i32;
                } else if level == 128 {
                    level = self.buf.read(8) as i32 - 256;
                } else if level > 128 {
                    level -= 256;
                }
            } else {
                run = (coeff >> 8) as usize;
                level = i32::from(coeff & 0xff);
                if self.buf.read(1) != 0 {
                    level = -level;
                }
            }

            n += run;
            if n >= 64 {
                debug!("DCT 系数位置越界, 丢弃当前块");
                return;
            }

            let de_zig_zagged = tables::ZIG_ZAG[n] as usize;
            n += 1;

            // 反量化, 取奇, 截断
            level <<= 1;
            if !self.macroblock_intra {
                level += if level < 0 { -1 } else { 1 };
            }
            let quant = i32::from(if self.macroblock_intra {
                self.intra_quant_matrix[de_zig_zagged]
            } else {
                self.non_intra_quant_matrix[de_zig_zagged]
            });
            level = (level * self.quantizer_scale * quant) >> 4;
            if (level & 1) == 0 {
                level -= if level > 0 { 1 } else { -1 };
            }
            level = level.clamp(-2048, 2047);

            // 保存预乘后的系数
            self.block_data[de_zig_zagged] =
                level * i32::from(tables::PREMULTIPLIER_MATRIX[de_zig_zagged]);
        }

        // 把块写到它在当前帧中的位置
        let cur = self.current;
        let (di, scan, is_luma) = if block < 4 {
            let mut di = (self.mb_row * self.luma_width + self.mb_col) << 4;
            if (block & 1) != 0 {
                di += 8;
            }
            if (block & 2) != 0 {
                di += self.luma_width << 3;
            }
            (di, self.luma_width - 8, true)
        } else {
            let di = ((self.mb_row * self.luma_width) << 2) + (self.mb_col << 3);
            (di, (self.luma_width >> 1) - 8, false)
        };

        let dest: &mut [u8] = if is_luma {
            &mut self.frames[cur].y.data
        } else if block == 4 {
            &mut self.frames[cur].cb.data
        } else {
            &mut self.frames[cur].cr.data
        };

        if self.macroblock_intra {
            // 覆写 (无预测)
            if n == 1 {
                idct::copy_value_to_dest((self.block_data[0] + 128) >> 8, dest, di, scan);
                self.block_data[0] = 0;
            } else {
                idct::idct(&mut self.block_data);
                idct::copy_block_to_dest(&self.block_data, dest, di, scan);
                self.block_data = [0; 64];
            }
        } else {
            // 叠加到预测出的宏块上
            if n == 1 {
                idct::add_value_to_dest((self.block_data[0] + 128) >> 8, dest, di, scan);
                self.block_data[0] = 0;
            } else {
                idct::idct(&mut self.block_data);
                idct::add_block_to_dest(&self.block_data, dest, di, scan);
                self.block_data = [0; 64];
            }
        }
    }
}
