//! MP2 (MPEG-1 Audio Layer II) 音频解码器.
//!
//! 把 MP2 elementary stream 解码为 PCM 采样. 每帧流程: 同步字搜索
//! 与重同步 -> 帧头解析 -> 位分配/比例因子/成组采样提取 -> 32 子带
//! 多相合成 (1024 字延迟线 + 32 点 IDCT). 每帧固定输出
//! [`SAMPLES_PER_FRAME`] 个采样点 (每声道).

mod synthesis;
mod tables;

use liu_core::BitBuffer;
use log::debug;

use crate::samples::{AudioFormat, Samples, SAMPLES_PER_FRAME};
use tables::{
    QuantizerSpec, BIT_RATE, QUANT_LUT_STEP_1, QUANT_LUT_STEP_2, QUANT_LUT_STEP_3,
    QUANT_LUT_STEP_4, QUANT_TAB, SAMPLE_RATE, SCALEFACTOR_BASE, SYNTHESIS_WINDOW,
};

/// 帧同步字 (11 位全 1)
const FRAME_SYNC: u32 = 0x7ff;

/// 版本字段: MPEG-1
const VERSION_MPEG_1: u32 = 0x3;
/// 层字段: Layer II
const LAYER_II: u32 = 0x2;

/// 声道模式: 联合立体声
const MODE_JOINT_STEREO: u32 = 0x1;
/// 声道模式: 单声道
const MODE_MONO: u32 = 0x3;

/// MP2 音频解码器
pub struct Audio {
    buf: BitBuffer,

    time: f64,
    samples_decoded: usize,
    samplerate_index: usize,
    bitrate_index: usize,
    version: u32,
    layer: u32,
    mode: u32,
    channels: u32,
    bound: usize,
    v_pos: usize,
    next_frame_data_size: usize,
    has_header: bool,

    allocation: [[Option<&'static QuantizerSpec>; 32]; 2],
    scale_factor_info: [[u8; 32]; 2],
    scale_factor: [[[i32; 3]; 32]; 2],
    sample: [[[i32; 3]; 32]; 2],

    samples: Samples,
    format: AudioFormat,

    /// 合成窗口的双份展开 (1024 字)
    d: [f32; 1024],
    /// 每声道的 V 延迟线
    v: [[f32; 1024]; 2],
    /// 窗口累加暂存
    u: [f32; 32],
}

impl Audio {
    /// 以 `buf` 为数据源创建音频解码器, 并尝试解析首个帧头
    pub fn new(buf: BitBuffer) -> Self {
        let mut d = [0.0f32; 1024];
        for (i, &w) in SYNTHESIS_WINDOW.iter().enumerate() {
            d[i] = w;
            d[i + 512] = w;
        }

        let mut audio = Self {
            buf,
            time: 0.0,
            samples_decoded: 0,
            samplerate_index: 3, // 3 表示尚无帧头
            bitrate_index: 0,
            version: 0,
            layer: 0,
            mode: 0,
            channels: 0,
            bound: 0,
            v_pos: 0,
            next_frame_data_size: 0,
            has_header: false,
            allocation: [[None; 32]; 2],
            scale_factor_info: [[0; 32]; 2],
            scale_factor: [[[0; 3]; 32]; 2],
            sample: [[[0; 3]; 32]; 2],
            samples: Samples::alloc(),
            format: AudioFormat::default(),
            d,
            v: [[0.0; 1024]; 2],
            u: [0.0; 32],
        };

        audio.next_frame_data_size = audio.decode_header();

        audio
    }

    /// 输入缓冲区 (供上层按包写入)
    pub fn buffer_mut(&mut self) -> &mut BitBuffer {
        &mut self.buf
    }

    /// 是否已解析到帧头, 可以准确报告采样率
    pub fn has_header(&mut self) -> bool {
        if self.has_header {
            return true;
        }

        self.next_frame_data_size = self.decode_header();

        self.has_header
    }

    /// 采样率 (Hz)
    pub fn samplerate(&mut self) -> u32 {
        if self.has_header() {
            SAMPLE_RATE[self.samplerate_index]
        } else {
            0
        }
    }

    /// 声道数 (1 或 2)
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// 当前输出格式
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// 设置输出格式 (每会话选定一次)
    pub fn set_format(&mut self, format: AudioFormat) {
        self.format = format;
    }

    /// 当前内部时钟 (秒)
    pub fn time(&self) -> f64 {
        self.time
    }

    /// 强制设置内部时钟 (秒)
    ///
    /// 仅在外部直接操纵输入缓冲区时使用.
    pub fn set_time(&mut self, time: f64) {
        self.samples_decoded = (time * f64::from(SAMPLE_RATE[self.samplerate_index])) as usize;
        self.time = time;
    }

    /// 回绕输入缓冲区并重置解码状态
    pub fn rewind(&mut self) {
        self.buf.rewind();
        self.time = 0.0;
        self.samples_decoded = 0;
        self.next_frame_data_size = 0;
    }

    /// 是否已到达流末尾 (回绕后清除)
    pub fn has_ended(&self) -> bool {
        self.buf.has_ended()
    }

    /// 解码一帧音频, 内部时钟前进 1152/采样率 秒
    ///
    /// 返回的采样借用解码器内部缓冲, 在下一次解码调用前有效.
    pub fn decode(&mut self) -> Option<&Samples> {
        if self.try_decode() {
            Some(&self.samples)
        } else {
            None
        }
    }

    /// 推进解码一步; 成功时采样可经 [`Audio::samples`] 取用
    pub fn try_decode(&mut self) -> bool {
        // 至少要有完整帧头才能得知帧长
        if self.next_frame_data_size == 0 {
            self.next_frame_data_size = self.decode_header();
        }

        if self.next_frame_data_size == 0 || !self.buf.has(self.next_frame_data_size << 3) {
            return false;
        }

        self.decode_frame();
        self.next_frame_data_size = 0;

        self.samples.time = self.time;

        self.samples_decoded += SAMPLES_PER_FRAME;
        self.time = self.samples_decoded as f64 / f64::from(SAMPLE_RATE[self.samplerate_index]);

        true
    }

    /// 最近一次解码出的采样
    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    // ========================
    // 帧头
    // ========================

    /// 解析帧头, 返回帧体字节数 (0 表示失败或数据不足)
    fn decode_header(&mut self) -> usize {
        if !self.buf.has(48) {
            return 0;
        }

        self.buf.skip_bytes(0x00);
        let sync = self.buf.read(11);

        // 同步字缺失时重新搜索. MP2 的同步字并不保证只出现在帧头,
        // 因此重同步后还要求帧参数与已锁定的帧头一致.
        if sync != FRAME_SYNC && !self.buf.find_frame_sync() {
            return 0;
        }

        self.version = self.buf.read(2);
        self.layer = self.buf.read(2);
        let has_crc = self.buf.read1() == 0;

        if self.version != VERSION_MPEG_1 || self.layer != LAYER_II {
            return 0;
        }

        let bitrate_index = self.buf.read(4) as usize;
        if bitrate_index == 0 || bitrate_index > 14 {
            return 0;
        }
        let bitrate_index = bitrate_index - 1;

        let samplerate_index = self.buf.read(2) as usize;
        if samplerate_index == 3 {
            return 0;
        }

        let padding = self.buf.read1() as usize;
        self.buf.skip(1); // private 位
        let mode = self.buf.read(2);

        // 已锁定帧头后, 采样率/码率/声道模式不得改变, 否则视为伪同步
        if self.has_header
            && (self.bitrate_index != bitrate_index
                || self.samplerate_index != samplerate_index
                || self.mode != mode)
        {
            debug!("帧头参数突变, 判定为伪同步");
            return 0;
        }

        self.bitrate_index = bitrate_index;
        self.samplerate_index = samplerate_index;
        self.mode = mode;
        self.has_header = true;

        self.channels = if mode == MODE_MONO { 1 } else { 2 };

        // 联合立体声由 mode_extension 决定 bound
        if mode == MODE_JOINT_STEREO {
            self.bound = ((self.buf.read(2) as usize) + 1) << 2;
        } else {
            self.buf.skip(2);
            self.bound = if mode == MODE_MONO { 0 } else { 32 };
        }

        // 丢弃帧头尾部 4 位与 CRC
        self.buf.skip(4); // copyright(1), original(1), emphasis(2)
        if has_crc {
            self.buf.skip(16);
        }

        // 计算帧大小
        let br = BIT_RATE[self.bitrate_index] as usize;
        let sr = SAMPLE_RATE[self.samplerate_index] as usize;
        let frame_size = 144_000 * br / sr + padding;

        frame_size - if has_crc { 6 } else { 4 }
    }

    // ========================
    // 帧体
    // ========================

    fn decode_frame(&mut self) {
        // 量化表查找: 码率类别 -> B.2 表与 sblimit
        let tab1 = if self.mode == MODE_MONO { 0 } else { 1 };
        let tab2 = QUANT_LUT_STEP_1[tab1][self.bitrate_index] as usize;
        let tab3 = QUANT_LUT_STEP_2[tab2][self.samplerate_index];

        let sblimit = (tab3 & 63) as usize;
        let tab3 = (tab3 >> 6) as usize;

        if self.bound > sblimit {
            self.bound = sblimit;
        }

        // 位分配信息
        for sb in 0..self.bound {
            self.allocation[0][sb] = self.read_allocation(sb, tab3);
            self.allocation[1][sb] = self.read_allocation(sb, tab3);
        }
        for sb in self.bound..sblimit {
            self.allocation[0][sb] = self.read_allocation(sb, tab3);
            self.allocation[1][sb] = self.allocation[0][sb];
        }

        // 比例因子选择信息
        let channels = if self.mode == MODE_MONO { 1 } else { 2 };
        for sb in 0..sblimit {
            for ch in 0..channels {
                if self.allocation[ch][sb].is_some() {
                    self.scale_factor_info[ch][sb] = self.buf.read(2) as u8;
                }
            }
            if self.mode == MODE_MONO {
                self.scale_factor_info[1][sb] = self.scale_factor_info[0][sb];
            }
        }

        // 比例因子 (4 种重复模式)
        for sb in 0..sblimit {
            for ch in 0..channels {
                if self.allocation[ch][sb].is_some() {
                    match self.scale_factor_info[ch][sb] {
                        0 => {
                            self.scale_factor[ch][sb][0] = self.buf.read(6) as i32;
                            self.scale_factor[ch][sb][1] = self.buf.read(6) as i32;
                            self.scale_factor[ch][sb][2] = self.buf.read(6) as i32;
                        }
                        1 => {
                            let tmp = self.buf.read(6) as i32;
                            self.scale_factor[ch][sb][0] = tmp;
                            self.scale_factor[ch][sb][1] = tmp;
                            self.scale_factor[ch][sb][2] = self.buf.read(6) as i32;
                        }
                        2 => {
                            let tmp = self.buf.read(6) as i32;
                            self.scale_factor[ch][sb] = [tmp; 3];
                        }
                        _ => {
                            self.scale_factor[ch][sb][0] = self.buf.read(6) as i32;
                            let tmp = self.buf.read(6) as i32;
                            self.scale_factor[ch][sb][1] = tmp;
                            self.scale_factor[ch][sb][2] = tmp;
                        }
                    }
                }
            }
            if self.mode == MODE_MONO {
                self.scale_factor[1][sb] = self.scale_factor[0][sb];
            }
        }

        // 系数读取与重建: 3 个部分, 每部分 4 个颗粒
        let mut out_pos = 0usize;
        for part in 0..3 {
            for _granule in 0..4 {
                // 读取采样
                for sb in 0..self.bound {
                    self.read_samples(0, sb, part);
                    self.read_samples(1, sb, part);
                }
                for sb in self.bound..sblimit {
                    self.read_samples(0, sb, part);
                    self.sample[1][sb] = self.sample[0][sb];
                }
                for sb in sblimit..32 {
                    self.sample[0][sb] = [0; 3];
                    self.sample[1][sb] = [0; 3];
                }

                // 合成: 每颗粒 3 个时隙, 每时隙输出 32 个采样
                for p in 0..3 {
                    // 延迟线回退 64 字
                    self.v_pos = (self.v_pos + 1024 - 64) & 1023;

                    for ch in 0..2 {
                        synthesis::idct32(&self.sample[ch], p, &mut self.v[ch], self.v_pos);

                        // 加窗累加
                        self.u = [0.0; 32];

                        let mut d_index = 512 - (self.v_pos >> 1);
                        let mut v_index = (self.v_pos % 128) >> 1;
                        while v_index < 1024 {
                            for i in 0..32 {
                                self.u[i] += self.d[d_index] * self.v[ch][v_index];
                                d_index += 1;
                                v_index += 1;
                            }

                            v_index += 128 - 32;
                            d_index += 64 - 32;
                        }

                        // 后半窗: V 下标镜像回扫
                        d_index -= 512 - 32;
                        v_index = (128 - 32 + 1024) - v_index;
                        while v_index < 1024 {
                            for i in 0..32 {
                                self.u[i] += self.d[d_index] * self.v[ch][v_index];
                                d_index += 1;
                                v_index += 1;
                            }

                            v_index += 128 - 32;
                            d_index += 64 - 32;
                        }

                        // 输出 (约 1/2^31 归一化)
                        for j in 0..32 {
                            let s = self.u[j] / 2_147_418_112.0;
                            let idx = ((out_pos + j) << 1) + ch;

                            match self.format {
                                AudioFormat::F32N => {
                                    self.samples.interleaved[idx] = s;
                                }
                                AudioFormat::F32Nlr => {
                                    if ch == 0 {
                                        self.samples.left[out_pos + j] = s;
                                    } else {
                                        self.samples.right[out_pos + j] = s;
                                    }
                                }
                                AudioFormat::S16 => {
                                    // 非对称定标, 避免正向削波
                                    self.samples.s16[idx] = if s < 0.0 {
                                        (s * 32768.0) as i16
                                    } else {
                                        (s * 32767.0) as i16
                                    };
                                }
                                AudioFormat::F32 => {
                                    self.samples.f32[idx] = if s < 0.0 {
                                        s * 2_147_483_648.0
                                    } else {
                                        s * 2_147_483_647.0
                                    };
                                }
                            }
                        }
                    }

                    out_pos += 32;
                }
            }
        }

        self.buf.align();
    }

    /// 读取一个子带的位分配, 映射到量化器规格
    fn read_allocation(&mut self, sb: usize, tab3: usize) -> Option<&'static QuantizerSpec> {
        let tab4 = QUANT_LUT_STEP_3[tab3][sb];
        let alloc = self.buf.read((tab4 >> 4) as usize) as usize;
        let qtab = QUANT_LUT_STEP_4[(tab4 & 15) as usize][alloc];

        if qtab != 0 {
            Some(&QUANT_TAB[(qtab - 1) as usize])
        } else {
            None
        }
    }

    /// 读取并反量化一个子带在一个部分内的 3 个采样
    fn read_samples(&mut self, ch: usize, sb: usize, part: usize) {
        let Some(q) = self.allocation[ch][sb] else {
            // 该子带无位分配
            self.sample[ch][sb] = [0; 3];
            return;
        };

        // 解析比例因子 (定点 2.26, 63 表示静音)
        let mut sf = self.scale_factor[ch][sb][part];
        if sf == 63 {
            sf = 0;
        } else {
            let shift = sf / 3;
            sf = (SCALEFACTOR_BASE[(sf % 3) as usize] + ((1 << shift) >> 1)) >> shift;
        }

        // 读取采样 (成组或直接编码)
        let mut adj = i32::from(q.levels);
        if q.group != 0 {
            let mut val = self.buf.read(q.bits as usize) as i32;
            self.sample[ch][sb][0] = val % adj;
            val /= adj;
            self.sample[ch][sb][1] = val % adj;
            self.sample[ch][sb][2] = val / adj;
        } else {
            self.sample[ch][sb][0] = self.buf.read(q.bits as usize) as i32;
            self.sample[ch][sb][1] = self.buf.read(q.bits as usize) as i32;
            self.sample[ch][sb][2] = self.buf.read(q.bits as usize) as i32;
        }

        // 反量化并按比例因子缩放
        let scale = 65536 / (adj + 1);
        adj = ((adj + 1) >> 1) - 1;

        for i in 0..3 {
            let val = (adj - self.sample[ch][sb][i]) * scale;
            self.sample[ch][sb][i] = (val * (sf >> 12) + ((val * (sf & 4095) + 2048) >> 12)) >> 12;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造 64 kbit/s, 44.1 kHz, 单声道, 全零分配的静音帧
    fn silent_mono_frame() -> Vec<u8> {
        // 帧头: FF FD (MPEG-1 Layer II 无 CRC) 40 (码率索引 4, 44.1kHz) C0 (单声道)
        let mut data = vec![0xFF, 0xFD, 0x40, 0xC0];
        // 帧大小 144000*64/44100 = 208 字节, 减 4 字节头 = 204 字节帧体
        data.extend_from_slice(&vec![0u8; 204]);
        data
    }

    #[test]
    fn test_decode_header() {
        let mut buf = BitBuffer::new();
        buf.write(&silent_mono_frame());
        buf.signal_end();

        let mut audio = Audio::new(buf);
        assert!(audio.has_header());
        assert_eq!(audio.samplerate(), 44100);
        assert_eq!(audio.channels(), 1);
    }

    #[test]
    fn test_decode_静音帧() {
        let mut buf = BitBuffer::new();
        buf.write(&silent_mono_frame());
        buf.signal_end();

        let mut audio = Audio::new(buf);
        let samples = audio.decode().expect("应解出一帧");

        assert_eq!(samples.time, 0.0);
        assert_eq!(samples.interleaved.len(), 2 * SAMPLES_PER_FRAME);
        assert!(samples.interleaved.iter().all(|&s| s == 0.0));

        // 时钟前进 1152/44100 秒
        let expected = SAMPLES_PER_FRAME as f64 / 44100.0;
        assert!((audio.time() - expected).abs() < 1e-9);

        // 没有第二帧了
        assert!(audio.decode().is_none());
    }

    #[test]
    fn test_resync_跳过噪声() {
        let mut data = vec![0xDE, 0xAD, 0xBE, 0xEF];
        data.extend_from_slice(&silent_mono_frame());

        let mut buf = BitBuffer::new();
        buf.write(&data);
        buf.signal_end();

        let mut audio = Audio::new(buf);
        assert!(audio.decode().is_some());
        assert_eq!(audio.samplerate(), 44100);
    }

    #[test]
    fn test_reject_layer3() {
        // 0xFB = MPEG-1 Layer III
        let mut buf = BitBuffer::new();
        buf.write(&[0xFF, 0xFB, 0x40, 0xC0, 0, 0, 0, 0, 0, 0]);
        buf.signal_end();

        let mut audio = Audio::new(buf);
        assert!(!audio.has_header());
        assert!(audio.decode().is_none());
    }
}
