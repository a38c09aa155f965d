//! 位流缓冲区.
//!
//! [`BitBuffer`] 维护一个可增长的字节窗口和一个以位为单位的读取游标,
//! 是解封装器与视频/音频解码器共同的底层设施. 按大端位序读取
//! (MSB first), 这是多媒体编解码器中最常用的位序.
//!
//! 与一次性的切片读取器不同, 本缓冲区支持三种供数据方式:
//! - 绑定一个 [`ByteSource`], 读取不足时自动按块拉取 (默认 128 KiB);
//! - 由外部 (如播放器) 按包写入, 写入前压缩掉已消耗的字节;
//! - 一次性写入全部数据后调用 [`BitBuffer::signal_end`].
//!
//! 读取不足时 `read` 系列方法返回 0 而不报错, 调用方通过
//! [`BitBuffer::has`] 与 [`BitBuffer::has_ended`] 判断数据状态,
//! 这是 MPEG 解码器所要求的容错语义.

use bytes::{Buf, BytesMut};

use crate::source::ByteSource;

/// 按需加载时单次读取的字节数 (128 KiB)
pub const LOAD_CHUNK_SIZE: usize = 128 * 1024;

/// VLC (变长编码) 表项, 有符号值
///
/// `0` 为状态索引, `1` 为叶子值. 索引大于 0 表示继续读取 1 位并跳转;
/// 索引小于等于 0 表示叶子; 索引等于 -1 表示保留/非法的位序列.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vlc(pub i16, pub i16);

/// VLC 表项, 无符号值 (用于 DCT 系数表的 run/level 打包值)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlcUint(pub i16, pub u16);

/// 位流缓冲区
///
/// 字节窗口 + 位粒度游标. 不变式: `bit_index >> 3 <= len()`.
pub struct BitBuffer {
    /// 字节窗口
    bytes: BytesMut,
    /// 游标位置 (相对窗口起点的位数)
    bit_index: usize,
    /// 总大小提示 (0 表示未知)
    total_size: usize,
    /// 是否已到达流末尾且无更多数据
    has_ended: bool,
    /// 写入前是否压缩掉已读字节
    discard_read: bool,
    /// 上游字节源 (无源缓冲区由外部写入数据)
    source: Option<Box<dyn ByteSource>>,
    /// 按需加载的读暂存区
    scratch: Vec<u8>,
}

impl BitBuffer {
    /// 创建空缓冲区, 数据由外部写入 (如播放器按包投喂)
    pub fn new() -> Self {
        Self {
            bytes: BytesMut::new(),
            bit_index: 0,
            total_size: 0,
            has_ended: false,
            discard_read: true,
            source: None,
            scratch: Vec::new(),
        }
    }

    /// 从字节源创建缓冲区, 读取不足时自动拉取
    pub fn from_source(source: Box<dyn ByteSource>) -> Self {
        let total_size = source.size().unwrap_or(0) as usize;
        Self {
            bytes: BytesMut::with_capacity(LOAD_CHUNK_SIZE),
            bit_index: 0,
            total_size,
            has_ended: false,
            discard_read: true,
            source: Some(source),
            scratch: vec![0u8; LOAD_CHUNK_SIZE],
        }
    }

    /// 从内存数据创建缓冲区 (可定位)
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::from_source(Box::new(crate::source::MemorySource::from_data(data)))
    }

    // ========================
    // 观察方法
    // ========================

    /// 未读部分所在的完整字节窗口
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 游标所在的字节索引
    pub fn index(&self) -> usize {
        self.bit_index >> 3
    }

    /// 是否可随机定位 (上游源支持定位且总大小已知)
    pub fn seekable(&self) -> bool {
        self.source.as_ref().is_some_and(|s| s.is_seekable()) && self.total_size > 0
    }

    /// 总大小. 对可定位源返回源的总大小, 否则返回窗口内的字节数
    pub fn size(&self) -> usize {
        if self.total_size > 0 {
            self.total_size
        } else {
            self.bytes.len()
        }
    }

    /// 窗口内尚未读取的字节数, 可用于外部写入节流
    pub fn remaining(&self) -> usize {
        self.bytes.len() - (self.bit_index >> 3)
    }

    /// 读取位置是否已到达末尾且无更多数据
    pub fn has_ended(&self) -> bool {
        self.has_ended
    }

    // ========================
    // 写入与定位
    // ========================

    /// 追加数据到窗口末尾
    ///
    /// 若开启了读后丢弃, 先压缩掉已消耗的字节. 写入会清除流结束标志.
    pub fn write(&mut self, p: &[u8]) -> usize {
        if self.discard_read {
            self.discard_read_bytes();
        }

        self.bytes.extend_from_slice(p);
        self.has_ended = false;

        p.len()
    }

    /// 将当前长度钉为总大小, 声明之后不再有数据写入
    ///
    /// 应在最后一次 [`BitBuffer::write`] 之后立即调用.
    pub fn signal_end(&mut self) {
        self.total_size = self.bytes.len();
    }

    /// 回绕到流起点. 若上游源可定位, 同时物理定位源
    pub fn rewind(&mut self) {
        self.seek(0);
    }

    /// 定位到距流起点 `pos` 字节处
    ///
    /// 仅在上游源可定位时有效; 无源缓冲区只接受回绕到 0.
    pub fn seek(&mut self, pos: usize) {
        self.has_ended = false;

        if self.total_size > 0 {
            if let Some(source) = self.source.as_mut() {
                if source.is_seekable() {
                    let _ = source.seek_start(pos as u64);
                    self.bytes.clear();
                    self.bit_index = 0;
                }
                return;
            }
        }

        if self.source.is_none() {
            if pos != 0 {
                return;
            }
            self.bytes.clear();
            self.bit_index = 0;
            // 外部投喂的缓冲区回绕后会重新写入, 撤销终止标记
            self.total_size = 0;
        }
    }

    /// 当前游标的流内绝对字节偏移
    pub fn tell(&mut self) -> usize {
        if self.total_size > 0 {
            if let Some(source) = self.source.as_mut() {
                if source.is_seekable() {
                    let off = source.position().unwrap_or(0) as usize;
                    return (off + (self.bit_index >> 3)).saturating_sub(self.bytes.len());
                }
            }
        }

        self.bit_index >> 3
    }

    /// 压缩窗口: 丢弃游标之前的字节, 游标随之前移
    pub fn discard_read_bytes(&mut self) {
        let byte_pos = self.bit_index >> 3;
        if byte_pos == self.bytes.len() {
            self.bytes.clear();
            self.bit_index = 0;
        } else if byte_pos > 0 {
            self.bytes.advance(byte_pos);
            self.bit_index -= byte_pos << 3;
        }
    }

    // ========================
    // 位读取
    // ========================

    /// 检查窗口中是否还有 `count` 位可读
    ///
    /// 不足时先尝试从上游源拉取一次; 若总大小已知且窗口已满载,
    /// 置流结束标志.
    pub fn has(&mut self, count: usize) -> bool {
        if (self.bytes.len() << 3) - self.bit_index >= count {
            return true;
        }

        if self.source.is_some() {
            self.load_from_source();

            if (self.bytes.len() << 3) - self.bit_index >= count {
                return true;
            }
        }

        if self.total_size != 0 && self.bytes.len() == self.total_size {
            self.has_ended = true;
        }

        false
    }

    /// 读取 `count` 位 (1..=32), 大端位序
    ///
    /// 数据不足时返回 0; 调用方用 [`BitBuffer::has`] 区分这两种情形.
    pub fn read(&mut self, mut count: usize) -> u32 {
        if !self.has(count) {
            return 0;
        }

        let mut value: u32 = 0;
        while count != 0 {
            let current_byte = u32::from(self.bytes[self.bit_index >> 3]);

            let remaining = 8 - (self.bit_index & 7); // 当前字节的剩余位数
            let read = remaining.min(count);

            let shift = remaining - read;
            let mask = 0xffu32 >> (8 - read);

            value = (value << read) | ((current_byte & (mask << shift)) >> shift);

            self.bit_index += read;
            count -= read;
        }

        value
    }

    /// 读取 1 位
    pub fn read1(&mut self) -> u32 {
        if !self.has(1) {
            return 0;
        }

        let current_byte = u32::from(self.bytes[self.bit_index >> 3]);
        let shift = 7 - (self.bit_index & 7);
        self.bit_index += 1;

        (current_byte >> shift) & 1
    }

    /// 窥视 `count` 位是否可读且不全为零 (游标不动)
    pub fn peek_non_zero(&mut self, count: usize) -> bool {
        if !self.has(count) {
            return false;
        }

        let val = self.read(count);
        self.bit_index -= count;

        val != 0
    }

    /// 对齐到下一个字节边界
    pub fn align(&mut self) {
        self.bit_index = ((self.bit_index + 7) >> 3) << 3;
    }

    /// 跳过 `count` 位 (数据不足时不动)
    pub fn skip(&mut self, count: usize) {
        if self.has(count) {
            self.bit_index += count;
        }
    }

    /// 对齐后跳过所有连续等于 `v` 的字节, 返回跳过的数量
    pub fn skip_bytes(&mut self, v: u8) -> usize {
        self.align();

        let mut skipped = 0;
        while self.has(8) && self.bytes[self.bit_index >> 3] == v {
            self.bit_index += 8;
            skipped += 1;
        }

        skipped
    }

    // ========================
    // 起始码与同步字扫描
    // ========================

    /// 扫描下一个起始码 (`00 00 01 xx`), 返回第 4 字节 `xx`
    ///
    /// 命中时游标停在起始码之后. 扫描要求至少 5 字节前瞻,
    /// 避免窗口末尾的误报.
    pub fn next_start_code(&mut self) -> Option<u8> {
        self.align();

        while self.has(5 << 3) {
            let byte_index = self.bit_index >> 3;
            if self.bytes[byte_index] == 0x00
                && self.bytes[byte_index + 1] == 0x00
                && self.bytes[byte_index + 2] == 0x01
            {
                self.bit_index = (byte_index + 4) << 3;
                return Some(self.bytes[byte_index + 3]);
            }

            self.bit_index += 8;
        }

        None
    }

    /// 向前扫描直到找到指定起始码或数据耗尽
    pub fn find_start_code(&mut self, code: u8) -> bool {
        loop {
            match self.next_start_code() {
                Some(current) if current == code => return true,
                Some(_) => continue,
                None => return false,
            }
        }
    }

    /// 非破坏性检查指定起始码是否在窗口中
    ///
    /// 扫描期间关闭读后丢弃 (加载写入不得移动窗口), 结束后恢复游标.
    pub fn has_start_code(&mut self, code: u8) -> bool {
        let prev_bit_index = self.bit_index;
        let prev_discard_read = self.discard_read;

        self.discard_read = false;
        let found = self.find_start_code(code);

        self.bit_index = prev_bit_index;
        self.discard_read = prev_discard_read;

        found
    }

    /// 按字节扫描 MP2 帧同步字 (`0xFFF` + MPEG-1 Layer II 判别位)
    ///
    /// 命中时游标停在帧头的版本位上; 未命中时游标移到窗口末尾.
    pub fn find_frame_sync(&mut self) -> bool {
        let len = self.bytes.len();
        let mut i = self.bit_index >> 3;

        while i + 1 < len {
            if self.bytes[i] == 0xFF && (self.bytes[i + 1] & 0xFE) == 0xFC {
                self.bit_index = ((i + 1) << 3) + 3;
                return true;
            }
            i += 1;
        }

        self.bit_index = len << 3;
        false
    }

    // ========================
    // VLC 遍历
    // ========================

    /// 遍历 VLC 表: 从状态 0 出发, 每读 1 位跳转一次, 直到叶子
    ///
    /// 保留位序列 (索引 -1 的叶子) 返回 0, 由调用方按容错策略放弃
    /// 当前解码单元.
    pub fn read_vlc(&mut self, table: &[Vlc]) -> i32 {
        let mut state = Vlc(0, 0);

        loop {
            state = table[(state.0 as i32 + self.read1() as i32) as usize];
            if state.0 <= 0 {
                break;
            }
        }

        i32::from(state.1)
    }

    /// 同 [`BitBuffer::read_vlc`], 但叶子值为无符号 16 位
    pub fn read_vlc_uint(&mut self, table: &[VlcUint]) -> u16 {
        let mut state = VlcUint(0, 0);

        loop {
            state = table[(state.0 as i32 + self.read1() as i32) as usize];
            if state.0 <= 0 {
                break;
            }
        }

        state.1
    }

    // ========================
    // 内部: 按需加载
    // ========================

    /// 从上游源拉取一块数据并写入窗口
    ///
    /// 源读完或出错时置流结束标志 (I/O 失败按流结束向上呈现).
    fn load_from_source(&mut self) {
        if self.has_ended {
            return;
        }

        let Some(mut source) = self.source.take() else {
            return;
        };
        let mut scratch = std::mem::take(&mut self.scratch);

        let mut filled = 0;
        while filled < scratch.len() {
            match source.read(&mut scratch[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) => {
                    log::warn!("字节源读取失败, 按流结束处理: {err}");
                    break;
                }
            }
        }

        if filled == 0 {
            self.has_ended = true;
        } else {
            self.write(&scratch[..filled]);
        }

        self.scratch = scratch;
        self.source = Some(source);
    }
}

impl Default for BitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(data: &[u8]) -> BitBuffer {
        let mut buf = BitBuffer::new();
        buf.write(data);
        buf.signal_end();
        buf
    }

    #[test]
    fn test_read_bits_basic() {
        let mut buf = buffer_with(&[0b1011_0001, 0b0101_0101]);

        assert_eq!(buf.read(1), 1);
        assert_eq!(buf.read(1), 0);
        assert_eq!(buf.read(2), 0b11);
        assert_eq!(buf.read(4), 0b0001);
        assert_eq!(buf.read(8), 0b0101_0101);
    }

    #[test]
    fn test_read_跨字节() {
        let mut buf = buffer_with(&[0xFF, 0x00, 0xFF, 0x00]);
        assert_eq!(buf.read(32), 0xFF00_FF00);
    }

    #[test]
    fn test_read_underrun_returns_zero() {
        let mut buf = buffer_with(&[0xAB]);
        assert_eq!(buf.read(8), 0xAB);
        // 数据不足: 返回 0 且置流结束标志
        assert_eq!(buf.read(4), 0);
        assert!(buf.has_ended());
    }

    #[test]
    fn test_align_skip() {
        let mut buf = buffer_with(&[0b1011_0001, 0b0101_0101, 0xFF, 0xFF, 0x42]);

        buf.read(3);
        buf.align();
        assert_eq!(buf.index(), 1);
        buf.skip(8);
        assert_eq!(buf.skip_bytes(0xFF), 2);
        assert_eq!(buf.read(8), 0x42);
    }

    #[test]
    fn test_peek_non_zero_restores_cursor() {
        let mut buf = buffer_with(&[0b0000_0001, 0xAA]);

        assert!(buf.peek_non_zero(8));
        assert_eq!(buf.index(), 0);
        assert_eq!(buf.read(8), 1);

        // 末尾前瞻不足
        buf.read(8);
        assert!(!buf.peek_non_zero(8));
    }

    #[test]
    fn test_next_start_code() {
        let mut buf = buffer_with(&[0x12, 0x00, 0x00, 0x01, 0xB3, 0xAA, 0xBB, 0xCC, 0xDD]);

        assert_eq!(buf.next_start_code(), Some(0xB3));
        // 游标停在起始码之后
        assert_eq!(buf.index(), 5);
        assert_eq!(buf.read(8), 0xAA);
    }

    #[test]
    fn test_next_start_code_needs_lookahead() {
        // 窗口末尾不足 5 字节时不判定起始码
        let mut buf = buffer_with(&[0x00, 0x00, 0x01, 0xB3]);
        assert_eq!(buf.next_start_code(), None);
    }

    #[test]
    fn test_has_start_code_非破坏() {
        let mut buf = buffer_with(&[0xAA, 0x00, 0x00, 0x01, 0xE0, 0x00, 0x00, 0x00, 0x00]);

        assert!(buf.has_start_code(0xE0));
        assert_eq!(buf.index(), 0);
        assert!(!buf.has_start_code(0xB9));
        assert_eq!(buf.index(), 0);
    }

    #[test]
    fn test_find_frame_sync() {
        // 0xFF 0xFD = 同步字 + MPEG-1 + Layer II
        let mut buf = buffer_with(&[0x12, 0x34, 0xFF, 0xFD, 0x00, 0x00]);

        assert!(buf.find_frame_sync());
        // 游标位于版本位: 字节 3 的第 3 位
        assert_eq!(buf.index(), 3);
        assert_eq!(buf.read(2), 0b11);

        let mut miss = buffer_with(&[0x12, 0x34, 0x56]);
        assert!(!miss.find_frame_sync());
        assert_eq!(miss.index(), 3);
    }

    #[test]
    fn test_read_vlc_walk() {
        // 小树: "1" -> 7, "01" -> 3, "000" -> 5, "001" -> 保留
        const TABLE: [Vlc; 6] = [
            Vlc(1 << 1, 0),
            Vlc(0, 7),
            Vlc(2 << 1, 0),
            Vlc(0, 3),
            Vlc(0, 5),
            Vlc(-1, 0),
        ];

        let mut buf = buffer_with(&[0b1_01_00_00]);
        assert_eq!(buf.read_vlc(&TABLE), 7);
        assert_eq!(buf.read_vlc(&TABLE), 3);
        assert_eq!(buf.read_vlc(&TABLE), 5);
    }

    #[test]
    fn test_write_compaction_adjusts_cursor() {
        let mut buf = BitBuffer::new();
        buf.write(&[1, 2, 3, 4]);
        buf.read(16); // 消耗 2 字节

        // 再写入时压缩掉已读部分, 游标相对回退
        buf.write(&[5, 6]);
        assert_eq!(buf.index(), 0);
        assert_eq!(buf.bytes(), &[3, 4, 5, 6]);
        assert_eq!(buf.read(8), 3);
    }

    #[test]
    fn test_discard_read_透明性() {
        // 同样的读写序列在开关压缩时读取结果一致
        let data = [0x9A, 0x55, 0xC3, 0x71, 0x0F, 0xE2];

        let run = |discard: bool| -> Vec<u32> {
            let mut buf = BitBuffer::new();
            buf.discard_read = discard;
            let mut out = Vec::new();
            buf.write(&data[..3]);
            out.push(buf.read(5));
            out.push(buf.read(11));
            buf.write(&data[3..]);
            out.push(buf.read(8));
            out.push(buf.read(16));
            out
        };

        assert_eq!(run(true), run(false));
    }

    #[test]
    fn test_from_source_load_on_demand() {
        let data: Vec<u8> = (0..=255u8).collect();
        let mut buf = BitBuffer::from_bytes(data);

        assert!(buf.seekable());
        assert_eq!(buf.size(), 256);
        assert_eq!(buf.read(8), 0);
        assert_eq!(buf.read(8), 1);

        buf.seek(128);
        assert_eq!(buf.read(8), 128);
        assert_eq!(buf.tell(), 129);

        buf.rewind();
        assert_eq!(buf.read(8), 0);
        assert!(!buf.has_ended());
    }

    #[test]
    fn test_signal_end_sets_has_ended() {
        let mut buf = BitBuffer::new();
        buf.write(&[0xAA]);
        assert!(!buf.has(16));
        assert!(!buf.has_ended());

        buf.signal_end();
        assert!(!buf.has(16));
        assert!(buf.has_ended());
    }
}
