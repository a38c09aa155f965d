//! 测试辅助: 按位构造 MPEG-PS / mpeg1video / mp2 码流.
#![allow(dead_code)]

/// MSB-first 位写入器, 与解码侧的位序一致
pub struct BitWriter {
    bytes: Vec<u8>,
    acc: u32,
    nbits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            acc: 0,
            nbits: 0,
        }
    }

    /// 写入 `count` 位 (值的低位有效)
    pub fn put(&mut self, count: u32, value: u32) {
        for i in (0..count).rev() {
            self.acc = (self.acc << 1) | ((value >> i) & 1);
            self.nbits += 1;
            if self.nbits == 8 {
                self.bytes.push(self.acc as u8);
                self.acc = 0;
                self.nbits = 0;
            }
        }
    }

    /// 按字符串写位, 如 "100 10" (空格忽略)
    pub fn put_bits(&mut self, pattern: &str) {
        for c in pattern.chars() {
            match c {
                '0' => self.put(1, 0),
                '1' => self.put(1, 1),
                _ => {}
            }
        }
    }

    /// 零填充到字节边界
    pub fn align(&mut self) {
        while self.nbits != 0 {
            self.put(1, 0);
        }
    }

    /// 写入整字节序列 (须已对齐)
    pub fn put_bytes(&mut self, data: &[u8]) {
        assert_eq!(self.nbits, 0, "put_bytes 需要字节对齐");
        self.bytes.extend_from_slice(data);
    }

    /// 写入起始码 `00 00 01 code`
    pub fn start_code(&mut self, code: u8) {
        self.align();
        self.put_bytes(&[0x00, 0x00, 0x01, code]);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.align();
        self.bytes
    }
}

/// 编码 33 位 90 kHz PTS 为 PES 头里的 5 字节 (前缀 0010)
pub fn encode_pts(seconds: f64) -> [u8; 5] {
    let pts = (seconds * 90_000.0).round() as u64;
    [
        0x21 | ((((pts >> 30) as u8) & 0x07) << 1),
        (pts >> 22) as u8,
        0x01 | ((((pts >> 15) as u8) & 0x7F) << 1),
        (pts >> 7) as u8,
        0x01 | (((pts as u8) & 0x7F) << 1),
    ]
}

/// 构造 MPEG-1 pack 头 (起始码 + 8 字节)
pub fn build_pack_header(w: &mut BitWriter, scr_seconds: f64) {
    let scr = (scr_seconds * 90_000.0).round() as u64;
    w.start_code(0xBA);
    w.put(4, 0x2); // MPEG-1 标志
    w.put(3, ((scr >> 30) & 0x7) as u32);
    w.put(1, 1);
    w.put(15, ((scr >> 15) & 0x7FFF) as u32);
    w.put(1, 1);
    w.put(15, (scr & 0x7FFF) as u32);
    w.put(1, 1);
    w.put(1, 1);
    w.put(22, 1000); // mux_rate
    w.put(1, 1);
}

/// 构造 system 头
pub fn build_system_header(w: &mut BitWriter, num_audio: u32, num_video: u32) {
    w.start_code(0xBB);
    w.put(16, 6); // 头长度
    w.put(1, 1);
    w.put(22, 1000); // rate bound
    w.put(1, 1);
    w.put(6, num_audio);
    w.put(5, 0b00001); // 杂项标志
    w.put(5, num_video);
}

/// 构造 PES 包 (带可选 PTS)
pub fn build_pes(w: &mut BitWriter, stream_id: u8, pts: Option<f64>, payload: &[u8]) {
    w.start_code(stream_id);
    match pts {
        Some(t) => {
            w.put(16, (payload.len() + 5) as u32);
            w.put_bytes(&encode_pts(t));
        }
        None => {
            w.put(16, (payload.len() + 1) as u32);
            w.put_bytes(&[0x0F]);
        }
    }
    w.put_bytes(payload);
}

/// 构造 32x32 的 mpeg1video 序列头 (30 fps, 默认量化矩阵)
pub fn build_sequence_header(w: &mut BitWriter) {
    w.start_code(0xB3);
    w.put(12, 32); // 宽
    w.put(12, 32); // 高
    w.put(4, 1); // 宽高比 1.0
    w.put(4, 5); // 30 fps
    w.put(18, 1000); // 码率
    w.put(1, 1); // marker
    w.put(10, 0); // vbv 缓冲
    w.put(1, 0); // constrained
    w.put(1, 0); // 无自定义帧内矩阵
    w.put(1, 0); // 无自定义帧间矩阵
}

/// 构造一幅 I 图像: 2x2 宏块, 每块仅直流 (全 128 灰)
///
/// 宏块编码: 地址增量 "1", 类型 "1" (帧内), 亮度块 "100 10"
/// (直流长度 0 + 块结束), 色度块 "00 10".
pub fn build_intra_picture(w: &mut BitWriter, temporal_ref: u32) {
    w.start_code(0x00);
    w.put(10, temporal_ref);
    w.put(3, 1); // I 图像
    w.put(16, 0xFFFF); // vbv_delay

    // 条带 1 (覆盖全部 2 行宏块: 地址从 (slice-1)*mbWidth - 1 起步)
    w.start_code(0x01);
    w.put(5, 1); // 量化步长
    w.put(1, 0); // 无额外信息
    for _ in 0..4 {
        w.put_bits("1 1"); // 地址增量 1, 帧内类型
        for _ in 0..4 {
            w.put_bits("100 10"); // 亮度直流 0 + EOB
        }
        for _ in 0..2 {
            w.put_bits("00 10"); // 色度直流 0 + EOB
        }
    }
}

/// 构造完整的 mpeg1video ES: 序列头 + n 幅全灰 I 图像
///
/// 末尾补零, 保证序列头解析所需的前瞻余量.
pub fn build_video_es(picture_count: u32) -> Vec<u8> {
    let mut w = BitWriter::new();
    build_sequence_header(&mut w);
    for i in 0..picture_count {
        build_intra_picture(&mut w, i);
    }
    let mut data = w.finish();
    data.extend_from_slice(&[0u8; 160]);
    data
}

/// 构造一帧静音 MP2: 64 kbit/s, 44.1 kHz, 单声道, 全零分配
pub fn build_silent_mp2_frame() -> Vec<u8> {
    let mut data = vec![0xFF, 0xFD, 0x40, 0xC0];
    data.extend_from_slice(&[0u8; 204]);
    data
}

/// 构造 1 视频流 + 1 音频流的完整 PS
///
/// 每幅图像与每帧音频各占一个 PES 包, 视频包带 PTS.
pub fn build_program_stream(picture_count: u32, audio_frames: u32) -> Vec<u8> {
    let mut w = BitWriter::new();
    build_pack_header(&mut w, 0.0);
    build_system_header(&mut w, 1, 1);

    let mut seq = BitWriter::new();
    build_sequence_header(&mut seq);
    let seq_bytes = seq.finish();

    for i in 0..picture_count {
        let mut pic = BitWriter::new();
        build_intra_picture(&mut pic, i);
        let mut payload = Vec::new();
        if i == 0 {
            payload.extend_from_slice(&seq_bytes);
        }
        payload.extend_from_slice(&pic.finish());

        build_pes(&mut w, 0xE0, Some(f64::from(i) / 30.0), &payload);

        if i < audio_frames {
            build_pes(&mut w, 0xC0, Some(f64::from(i) * 1152.0 / 44100.0), &build_silent_mp2_frame());
        }
    }

    w.finish()
}
