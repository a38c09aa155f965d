//! MPEG-PS (Program Stream) 解封装器.
//!
//! MPEG-PS 把一路 MPEG-1 视频和至多四路 MP2 音频复用在一个字节流里,
//! 由 `00 00 01 xx` 起始码分段:
//!
//! | 码 | 含义 |
//! |----|------|
//! | 0xBA | pack 头 (含系统时钟参考) |
//! | 0xBB | system 头 (含流数量) |
//! | 0xBD | 私有流 PES |
//! | 0xC0..0xC3 | 音频 PES |
//! | 0xE0 | 视频 PES |
//!
//! PTS 以 33 位 90 kHz 时钟编码, 按 3+15+15 位分段, 各段之间插有
//! 标记位. 解出的包载荷借用内部窗口, 在下一次解包前有效.

use liu_codec::packet::{is_audio_packet, Packet, PACKET_PRIVATE, PACKET_VIDEO_1};
use liu_core::{BitBuffer, LiuError, LiuResult};
use log::debug;

/// PS pack 头起始码
const START_PACK: u8 = 0xBA;
/// PS system 头起始码
const START_SYSTEM: u8 = 0xBB;

/// 时长探测的初始回退范围 (64 KiB)
const DURATION_SCAN_START: usize = 64 * 1024;
/// 时长探测的最大回退范围 (4 MiB)
const DURATION_SCAN_MAX: usize = 4096 * 1024;

/// 待完成的包 (头已解出, 载荷可能尚未就绪)
#[derive(Debug, Clone, Copy, Default)]
struct PendingPacket {
    ptype: u8,
    pts: Option<f64>,
    length: usize,
}

/// MPEG-PS 解封装器
pub struct Demux {
    buf: BitBuffer,

    sys_clock_ref: f64,
    last_file_size: usize,
    last_decoded_pts: f64,
    start_time: Option<f64>,
    duration: Option<f64>,

    start_code: Option<u8>,
    has_pack_header: bool,
    has_system_header: bool,
    has_headers: bool,

    num_audio_streams: u32,
    num_video_streams: u32,

    current_packet: PendingPacket,
    next_packet: PendingPacket,
}

impl Demux {
    /// 以 `buf` 为数据源创建解封装器
    ///
    /// 找不到合法的 pack/system 头时返回格式错误.
    pub fn new(buf: BitBuffer) -> LiuResult<Self> {
        let mut demux = Self {
            buf,
            sys_clock_ref: 0.0,
            last_file_size: 0,
            last_decoded_pts: 0.0,
            start_time: None,
            duration: None,
            start_code: None,
            has_pack_header: false,
            has_system_header: false,
            has_headers: false,
            num_audio_streams: 0,
            num_video_streams: 0,
            current_packet: PendingPacket::default(),
            next_packet: PendingPacket::default(),
        };

        if !demux.has_headers() {
            return Err(LiuError::Format("缺失 MPEG-PS pack/system 头".into()));
        }

        Ok(demux)
    }

    /// 是否已找到 pack 与 system 头 (未找到时尝试继续解析)
    pub fn has_headers(&mut self) -> bool {
        if self.has_headers {
            return true;
        }

        // pack 头
        if !self.has_pack_header {
            if self.start_code != Some(START_PACK) && !self.buf.find_start_code(START_PACK) {
                return false;
            }

            self.start_code = Some(START_PACK);
            if !self.buf.has(64) {
                return false;
            }
            self.start_code = None;

            if self.buf.read(4) != 0x02 {
                return false;
            }

            self.sys_clock_ref = self.decode_time();
            self.buf.skip(1);
            self.buf.skip(22); // mux_rate * 50
            self.buf.skip(1);

            debug!("pack 头: 系统时钟参考 {:.6}s", self.sys_clock_ref);
            self.has_pack_header = true;
        }

        // system 头
        if !self.has_system_header {
            if self.start_code != Some(START_SYSTEM) && !self.buf.find_start_code(START_SYSTEM) {
                return false;
            }

            self.start_code = Some(START_SYSTEM);
            if !self.buf.has(56) {
                return false;
            }
            self.start_code = None;

            self.buf.skip(16); // 头长度
            self.buf.skip(24); // rate bound
            self.num_audio_streams = self.buf.read(6);
            self.buf.skip(5); // 杂项标志
            self.num_video_streams = self.buf.read(5);

            debug!(
                "system 头: {} 路视频, {} 路音频",
                self.num_video_streams, self.num_audio_streams
            );
            self.has_system_header = true;
        }

        self.has_headers = true;
        true
    }

    /// system 头中声明的视频流数量
    pub fn num_video_streams(&mut self) -> u32 {
        if self.has_headers() {
            self.num_video_streams
        } else {
            0
        }
    }

    /// system 头中声明的音频流数量
    pub fn num_audio_streams(&mut self) -> u32 {
        if self.has_headers() {
            self.num_audio_streams
        } else {
            0
        }
    }

    /// 回绕到流起点
    pub fn rewind(&mut self) {
        self.buf.rewind();
        self.current_packet.length = 0;
        self.next_packet.length = 0;
        self.start_code = None;
    }

    /// 是否已到达流末尾 (seek 或回绕后清除)
    pub fn has_ended(&self) -> bool {
        self.buf.has_ended()
    }

    /// 解出下一个包
    ///
    /// 数据不足或流结束时返回 `None`; 前者在写入更多数据后可重试.
    pub fn decode(&mut self) -> Option<Packet<'_>> {
        if !self.has_headers() {
            return None;
        }

        // 跳过上一个包尚未消费的载荷
        if self.current_packet.length != 0 {
            let bits_till_next_packet = self.current_packet.length << 3;
            if !self.buf.has(bits_till_next_packet) {
                return None;
            }

            self.buf.skip(bits_till_next_packet);
            self.current_packet.length = 0;
        }

        // 载荷未就绪的包
        if self.next_packet.length != 0 {
            return self.packet();
        }

        // 头未就绪的包
        if let Some(code) = self.start_code {
            return self.decode_packet(code);
        }

        loop {
            match self.buf.next_start_code() {
                Some(code)
                    if code == PACKET_VIDEO_1 || code == PACKET_PRIVATE || is_audio_packet(code) =>
                {
                    // 先挂起流类型: 载荷不足时下一次调用从这里续解
                    self.start_code = Some(code);
                    return self.decode_packet(code);
                }
                Some(_) => continue,
                None => break,
            }
        }

        self.start_code = None;
        None
    }

    /// 按时间 seek 到指定流类型的包
    ///
    /// 用平均字节率估算目标偏移并迭代校正; `force_intra` 时只接受
    /// 载荷中含帧内图像头的包 (仅对视频流有意义). 目标时间以 0 为基,
    /// 与数据源的首个 PTS 无关.
    pub fn seek(&mut self, seek_time: f64, ptype: u8, force_intra: bool) -> Option<Packet<'_>> {
        if !self.has_headers {
            return None;
        }

        // 以当前时间、当前字节位置和平均字节率估算目标字节位置,
        // 期望落点的包的时间戳位于目标时间前一秒以内.
        //
        // 落点足够近时, 向前扫描所有包, 找目标时间之前最后一个含
        // 帧内图像的包; 否则用此次跳转观测到的 PTS/偏移差校正字节率
        // 再跳. 命中范围但没有帧内图像时, 指数扩大扫描窗口重试.
        //
        // 重试次数设有硬上限. 即使码率变化剧烈的文件通常也只需
        // 1-5 次跳转; 需要更多跳转往往说明文件本身有问题, 此上限
        // 只是避免死循环.

        let duration = self.duration(ptype)?;
        let file_size = self.buf.size();
        let mut byte_rate = file_size as f64 / duration;

        let mut cur_time = self.last_decoded_pts;
        let mut scan_span = 1.0f64;

        let mut seek_time = seek_time.clamp(0.0, duration);
        seek_time += self.start_time.unwrap_or(0.0);

        for _retry in 0..32 {
            let mut found_packet_with_pts = false;
            let mut found_packet_in_range = false;
            let mut last_valid_packet_start: Option<usize> = None;
            let mut first_packet_time: Option<f64> = None;

            let cur_pos = self.buf.tell();

            // 估算字节偏移并跳转
            let offset = (seek_time - cur_time - scan_span) * byte_rate;
            let seek_pos = ((cur_pos as f64 + offset) as i64)
                .clamp(0, file_size.saturating_sub(256) as i64) as usize;

            self.buffer_seek(seek_pos);

            // 扫描到目标时间为止, 记录最后一个合格的包
            while self.buf.find_start_code(ptype) {
                let packet_start = self.buf.tell();
                let scanned = match self.decode_packet(ptype) {
                    Some(p) => p.pts.map(|pts| (pts, force_intra && contains_intra(p.data))),
                    None => None,
                };

                // 无 PTS 的包跳过
                let Some((pts, is_intra)) = scanned else {
                    continue;
                };

                // 超出 [目标-窗口, 目标] 则停止本轮扫描, 并用观测到的
                // PTS/偏移差校正 cur_time 与 byte_rate, 让下一轮更准.
                if pts > seek_time || pts < seek_time - scan_span {
                    found_packet_with_pts = true;
                    byte_rate = (seek_pos as f64 - cur_pos as f64) / (pts - cur_time);
                    cur_time = pts;
                    break;
                }

                // 包落在目标附近. 记录本轮首个包的 PTS, 这样扫完整个
                // 范围仍没有帧内图像时, 下一轮可以降低目标避免重扫.
                if !found_packet_in_range {
                    found_packet_in_range = true;
                    first_packet_time = Some(pts);
                }

                if !force_intra || is_intra {
                    last_valid_packet_start = Some(packet_start);
                }
            }

            if let Some(pos) = last_valid_packet_start {
                // 扫描范围内有合格的包, 跳回去重新解出它
                self.buffer_seek(pos);
                return self.decode_packet(ptype);
            } else if found_packet_in_range {
                // 命中范围但没有帧内图像, 指数扩大扫描窗口.
                // 帧内图像稀少的文件也能收敛.
                scan_span *= 2.0;
                if let Some(t) = first_packet_time {
                    seek_time = t;
                }
            } else if !found_packet_with_pts {
                // 一个带 PTS 的包都没有, 多半已经扫到文件尾.
                // 据此校正字节率与当前时间.
                byte_rate = (seek_pos as f64 - cur_pos as f64) / (duration - cur_time);
                cur_time = duration;
            }
        }

        None
    }

    /// 指定流类型首个包的 PTS
    ///
    /// 从头扫描一次并缓存; 找不到该类型的带时间戳的包时返回 `None`.
    pub fn start_time(&mut self, ptype: u8) -> Option<f64> {
        if self.start_time.is_some() {
            return self.start_time;
        }

        let prev_pos = self.buf.tell();
        let prev_start_code = self.start_code;

        self.rewind();
        loop {
            let scanned = match self.decode() {
                Some(p) => (p.ptype, p.pts),
                None => break,
            };

            if scanned.0 == ptype {
                self.start_time = scanned.1;
            }
            if self.start_time.is_some() {
                break;
            }
        }

        self.buffer_seek(prev_pos);
        self.start_code = prev_start_code;

        self.start_time
    }

    /// 指定流类型的时长: 数据源中首末 PTS 之差
    ///
    /// 从距末尾 64 KiB 处向后扫描; 没扫到 PTS 时按倍数回退,
    /// 至多回退 4 MiB.
    pub fn duration(&mut self, ptype: u8) -> Option<f64> {
        let file_size = self.buf.size();
        if self.duration.is_some() && self.last_file_size == file_size {
            return self.duration;
        }

        let prev_pos = self.buf.tell();
        let prev_start_code = self.start_code;

        let mut r = DURATION_SCAN_START;
        while r <= DURATION_SCAN_MAX {
            let seek_pos = if file_size >= r {
                file_size - r
            } else {
                // 已覆盖整个文件, 本轮结束后不再回退
                r = DURATION_SCAN_MAX;
                0
            };
            self.buffer_seek(seek_pos);

            let mut last_pts: Option<f64> = None;
            loop {
                let scanned = match self.decode() {
                    Some(p) => (p.ptype, p.pts),
                    None => break,
                };

                if scanned.1.is_some() && scanned.0 == ptype {
                    last_pts = scanned.1;
                }
            }

            if let Some(last) = last_pts {
                self.duration = Some(last - self.start_time(ptype).unwrap_or(0.0));
                break;
            }

            r *= 2;
        }

        self.buffer_seek(prev_pos);
        self.start_code = prev_start_code;
        self.last_file_size = file_size;

        self.duration
    }

    // ========================
    // 内部
    // ========================

    /// 定位并丢弃所有未完成的包状态
    fn buffer_seek(&mut self, pos: usize) {
        self.buf.seek(pos);
        self.current_packet.length = 0;
        self.next_packet.length = 0;
        self.start_code = None;
    }

    /// 读取 33 位 90 kHz 时间戳 (3+15+15 位, 夹标记位), 换算为秒
    fn decode_time(&mut self) -> f64 {
        let mut clock = u64::from(self.buf.read(3)) << 30;
        self.buf.skip(1);
        clock |= u64::from(self.buf.read(15)) << 15;
        self.buf.skip(1);
        clock |= u64::from(self.buf.read(15));
        self.buf.skip(1);

        clock as f64 / 90_000.0
    }

    /// 解出一个 PES 包的头部与载荷
    fn decode_packet(&mut self, ptype: u8) -> Option<Packet<'_>> {
        if !self.buf.has(16 << 3) {
            return None;
        }

        self.start_code = None;

        self.next_packet.ptype = ptype;
        let mut length = self.buf.read(16) as usize;
        length = length.saturating_sub(self.buf.skip_bytes(0xff)); // 填充字节

        // 跳过 P-STD 缓冲区规模
        if self.buf.read(2) == 0x01 {
            self.buf.skip(16);
            length = length.saturating_sub(2);
        }

        let pts_dts_marker = self.buf.read(2);
        match pts_dts_marker {
            0x03 => {
                let pts = self.decode_time();
                self.next_packet.pts = Some(pts);
                self.last_decoded_pts = pts;
                self.buf.skip(40); // DTS
                length = length.saturating_sub(10);
            }
            0x02 => {
                let pts = self.decode_time();
                self.next_packet.pts = Some(pts);
                self.last_decoded_pts = pts;
                length = length.saturating_sub(5);
            }
            0x00 => {
                self.next_packet.pts = None;
                self.buf.skip(4);
                length = length.saturating_sub(1);
            }
            _ => {
                debug!("非法的 PTS/DTS 标志 {pts_dts_marker:#x}, 丢弃包");
                return None;
            }
        }

        self.next_packet.length = length;
        self.packet()
    }

    /// 载荷就绪时产出借用窗口的包
    fn packet(&mut self) -> Option<Packet<'_>> {
        if !self.buf.has(self.next_packet.length << 3) {
            return None;
        }

        self.current_packet = self.next_packet;
        self.next_packet.length = 0;

        let index = self.buf.index();
        Some(Packet {
            ptype: self.current_packet.ptype,
            pts: self.current_packet.pts,
            data: &self.buf.bytes()[index..index + self.current_packet.length],
        })
    }
}

/// 检查 PES 载荷里是否有帧内编码的图像头
///
/// 图像头起始码 `00 00 01 00` 之后第 2 字节的第 3..5 位是图像类型,
/// 1 表示帧内编码.
fn contains_intra(data: &[u8]) -> bool {
    if data.len() < 6 {
        return false;
    }
    for i in 0..data.len() - 6 {
        if data[i] == 0x00 && data[i + 1] == 0x00 && data[i + 2] == 0x01 && data[i + 3] == 0x00 {
            return (data[i + 5] & 0x38) == 8;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_intra() {
        // 图像头: 00 00 01 00 + 10 位时间参考 + 3 位类型
        // 类型位于第 6 字节的 3..5 位
        let intra = [0x00, 0x00, 0x01, 0x00, 0x00, 0x08, 0x00, 0x00];
        assert!(contains_intra(&intra));

        let predictive = [0x00, 0x00, 0x01, 0x00, 0x00, 0x10, 0x00, 0x00];
        assert!(!contains_intra(&predictive));

        let empty = [0u8; 4];
        assert!(!contains_intra(&empty));
    }

    #[test]
    fn test_invalid_header_被拒绝() {
        let mut buf = BitBuffer::new();
        buf.write(&[0x00, 0x00, 0x01, 0xB3, 0x00, 0x00, 0x00, 0x00]);
        buf.signal_end();

        assert!(Demux::new(buf).is_err());
    }
}
