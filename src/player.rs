//! 高层播放器封装.
//!
//! [`Mpeg`] 拥有一个解封装器和至多两个解码器 (视频/音频), 负责把
//! 解出的包路由进各解码器的位流缓冲区: 解码器喂不饱时从解封装器
//! 抽包重试, 直到产出一帧或数据枯竭. 另外实现按墙钟推进的解码循环,
//! seek 与循环播放.
//!
//! 音视频在实时播放中交错推进: 每个解码器各自推进到目标时间,
//! 音频目标额外加上提前量 (audio lead time), 对应音频输出缓冲的
//! 深度. 视频帧重排在视频解码器内部完成, 这里看到的都是显示顺序.

use liu_codec::packet::{PACKET_AUDIO_1, PACKET_VIDEO_1};
use liu_codec::video::FrameSlot;
use liu_codec::{Audio, AudioFormat, Frame, Samples, Video};
use liu_core::{BitBuffer, ByteSource, FileSource, LiuError, LiuResult, MemorySource};
use liu_format::Demux;
use log::debug;

/// MPEG-PS 播放器
///
/// 组合解封装器与解码器的高层接口. 所有时间均为秒.
pub struct Mpeg {
    demux: Demux,
    time: f64,

    looping: bool,
    has_ended: bool,
    has_decoders: bool,

    video_enabled: bool,
    /// 当前解码的视频流 PES 起始码, `None` 表示视频关闭
    video_packet_type: Option<u8>,
    video: Option<Video>,

    audio_enabled: bool,
    /// 当前解码的音频流 PES 起始码, `None` 表示音频关闭
    audio_packet_type: Option<u8>,
    audio_stream_index: u8,
    audio_lead_time: f64,
    audio: Option<Audio>,
}

impl Mpeg {
    /// 从字节源创建播放器
    ///
    /// 数据前 4 字节必须是 PS pack 起始码 `00 00 01 BA`,
    /// 否则返回格式错误, 不再做任何其他事情.
    pub fn new(source: Box<dyn ByteSource>) -> LiuResult<Self> {
        let mut buf = BitBuffer::from_source(source);

        if !buf.has(32) {
            return Err(LiuError::Format("数据不足以判定 MPEG-PS".into()));
        }
        if buf.bytes()[0..4] != [0x00, 0x00, 0x01, 0xBA] {
            return Err(LiuError::Format("不是 MPEG-PS 数据 (缺失 pack 起始码)".into()));
        }
        buf.rewind();

        let demux = Demux::new(buf)?;

        let mut mpeg = Self {
            demux,
            time: 0.0,
            looping: false,
            has_ended: false,
            has_decoders: false,
            video_enabled: true,
            video_packet_type: None,
            video: None,
            audio_enabled: true,
            audio_packet_type: None,
            audio_stream_index: 0,
            audio_lead_time: 0.0,
            audio: None,
        };
        mpeg.init_decoders();

        Ok(mpeg)
    }

    /// 从文件路径创建播放器
    pub fn from_file(path: impl AsRef<std::path::Path>) -> LiuResult<Self> {
        Self::new(Box::new(FileSource::open(path)?))
    }

    /// 从内存数据创建播放器
    pub fn from_bytes(data: Vec<u8>) -> LiuResult<Self> {
        Self::new(Box::new(MemorySource::from_data(data)))
    }

    // ========================
    // 流信息
    // ========================

    /// 所有可用流的头部是否都已就绪
    ///
    /// 就绪后才能准确报告流数量、视频尺寸、帧率与音频采样率.
    pub fn has_headers(&mut self) -> bool {
        if !self.demux.has_headers() {
            return false;
        }

        if !self.init_decoders() {
            return false;
        }

        if self.video.is_some()
            && !self.video.as_mut().unwrap().has_header()
            && !self.pump_for_video_header()
        {
            return false;
        }
        if self.audio.is_some()
            && !self.audio.as_mut().unwrap().has_header()
            && !self.pump_for_audio_header()
        {
            return false;
        }

        true
    }

    /// system 头声明的视频流数量 (0 或 1)
    pub fn num_video_streams(&mut self) -> u32 {
        self.demux.num_video_streams()
    }

    /// system 头声明的音频流数量 (0 到 4)
    pub fn num_audio_streams(&mut self) -> u32 {
        self.demux.num_audio_streams()
    }

    /// 视频显示宽度 (像素)
    pub fn width(&mut self) -> u32 {
        self.with_video_header(|video| video.width())
    }

    /// 视频显示高度 (像素)
    pub fn height(&mut self) -> u32 {
        self.with_video_header(|video| video.height())
    }

    /// 视频帧率 (帧/秒)
    pub fn framerate(&mut self) -> f64 {
        self.with_video_header(|video| video.framerate())
    }

    /// 音频采样率 (Hz)
    pub fn samplerate(&mut self) -> u32 {
        if !self.init_decoders() || self.audio.is_none() {
            return 0;
        }
        if self.audio.as_mut().unwrap().samplerate() == 0 {
            self.pump_for_audio_header();
        }
        self.audio.as_mut().unwrap().samplerate()
    }

    /// 音频声道数 (1 或 2)
    pub fn channels(&mut self) -> u32 {
        if !self.init_decoders() || self.audio.is_none() {
            return 0;
        }
        if self.audio.as_mut().unwrap().samplerate() == 0 {
            self.pump_for_audio_header();
        }
        self.audio.as_ref().unwrap().channels()
    }

    /// 视频流时长 (秒), 未知时为 0
    pub fn duration(&mut self) -> f64 {
        self.demux.duration(PACKET_VIDEO_1).unwrap_or(0.0)
    }

    /// 当前内部时钟 (秒)
    pub fn time(&self) -> f64 {
        self.time
    }

    // ========================
    // 配置
    // ========================

    /// 底层视频解码器 (如需 [`Video::set_no_delay`] 等低层配置)
    pub fn video_mut(&mut self) -> Option<&mut Video> {
        self.video.as_mut()
    }

    /// 底层音频解码器
    pub fn audio_mut(&mut self) -> Option<&mut Audio> {
        self.audio.as_mut()
    }

    /// 视频解码是否开启
    pub fn video_enabled(&self) -> bool {
        self.video_enabled
    }

    /// 开关视频解码. 只解音频时关闭视频可避免无谓的缓冲
    pub fn set_video_enabled(&mut self, enabled: bool) {
        self.video_enabled = enabled;

        if !enabled {
            self.video_packet_type = None;
            return;
        }

        self.video_packet_type = if self.init_decoders() && self.video.is_some() {
            Some(PACKET_VIDEO_1)
        } else {
            None
        };
    }

    /// 音频解码是否开启
    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    /// 开关音频解码
    pub fn set_audio_enabled(&mut self, enabled: bool) {
        self.audio_enabled = enabled;

        if !enabled {
            self.audio_packet_type = None;
            return;
        }

        self.audio_packet_type = if self.init_decoders() && self.audio.is_some() {
            Some(PACKET_AUDIO_1 + self.audio_stream_index)
        } else {
            None
        };
    }

    /// 选择要解码的音频流 (0..=3), 默认 0
    pub fn set_audio_stream(&mut self, stream_index: u8) {
        if stream_index > 3 {
            return;
        }
        self.audio_stream_index = stream_index;

        // 据此更新音频包类型
        self.set_audio_enabled(self.audio_enabled);
    }

    /// 音频输出格式
    pub fn audio_format(&self) -> AudioFormat {
        self.audio.as_ref().map(Audio::format).unwrap_or_default()
    }

    /// 设置音频输出格式
    pub fn set_audio_format(&mut self, format: AudioFormat) {
        if let Some(audio) = self.audio.as_mut() {
            audio.set_format(format);
        }
    }

    /// 音频提前量 (秒)
    pub fn audio_lead_time(&self) -> f64 {
        self.audio_lead_time
    }

    /// 设置音频提前量 (秒): 音频相对视频提前解码的时间
    ///
    /// 通常设为音频输出 API 的缓冲时长, 例如 SDL2 的
    /// `samples / samplerate`.
    pub fn set_audio_lead_time(&mut self, lead_time: f64) {
        self.audio_lead_time = lead_time.max(0.0);
    }

    /// 是否循环播放
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// 设置循环播放: 流结束时回绕重来
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// 流是否已结束. 循环播放时恒为 false
    pub fn has_ended(&self) -> bool {
        self.has_ended
    }

    /// 回绕所有缓冲区到起点
    pub fn rewind(&mut self) {
        if let Some(video) = self.video.as_mut() {
            video.rewind();
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.rewind();
        }
        self.demux.rewind();
        self.time = 0.0;
        self.has_ended = false;
    }

    // ========================
    // 解码
    // ========================

    /// 把内部时钟推进 `tick` 秒, 解码至此的所有音视频
    ///
    /// 两个回调可能被调用任意多次. 不实现跳帧: 截止当前时间的
    /// 内容都会被解码.
    pub fn decode<V, A>(&mut self, tick: f64, mut on_video: V, mut on_audio: A)
    where
        V: FnMut(&Frame),
        A: FnMut(&Samples),
    {
        if !self.init_decoders() {
            return;
        }

        let decode_video = self.video_packet_type.is_some();
        let decode_audio = self.audio_packet_type.is_some();

        if !decode_video && !decode_audio {
            // 无事可做
            return;
        }

        let mut decode_video_failed = false;
        let mut decode_audio_failed = false;

        let video_target_time = self.time + tick;
        let audio_target_time = self.time + tick + self.audio_lead_time;

        loop {
            let mut did_decode = false;

            if decode_video
                && self.video.as_ref().map_or(false, |v| v.time() < video_target_time)
            {
                match self.decode_video_slot() {
                    Some(slot) => {
                        on_video(self.video.as_ref().unwrap().frame(slot));
                        did_decode = true;
                    }
                    None => decode_video_failed = true,
                }
            }

            if decode_audio
                && self.audio.as_ref().map_or(false, |a| a.time() < audio_target_time)
            {
                if self.decode_audio_step() {
                    on_audio(self.audio.as_ref().unwrap().samples());
                    did_decode = true;
                } else {
                    decode_audio_failed = true;
                }
            }

            if !did_decode {
                break;
            }
        }

        if (!decode_video || decode_video_failed)
            && (!decode_audio || decode_audio_failed)
            && self.demux.has_ended()
        {
            self.handle_end();
            return;
        }

        self.time += tick;
    }

    /// 解码并返回一帧视频
    ///
    /// 源结束或数据损坏时返回 `None`. 只解视频时应关闭音频,
    /// 避免音频包在缓冲区里无限堆积. 返回的帧在下一次解码前有效.
    pub fn decode_video(&mut self) -> Option<&Frame> {
        if !self.init_decoders() {
            return None;
        }
        self.video_packet_type?;

        match self.decode_video_slot() {
            Some(slot) => {
                let frame = self.video.as_ref().unwrap().frame(slot);
                self.time = frame.time;
                Some(self.video.as_ref().unwrap().frame(slot))
            }
            None => {
                if self.demux.has_ended() {
                    self.handle_end();
                }
                None
            }
        }
    }

    /// 解码并返回一帧音频 (1152 采样)
    ///
    /// 源结束或数据损坏时返回 `None`. 只解音频时应关闭视频.
    /// 返回的采样在下一次解码前有效.
    pub fn decode_audio(&mut self) -> Option<&Samples> {
        if !self.init_decoders() {
            return None;
        }
        self.audio_packet_type?;

        if self.decode_audio_step() {
            let samples = self.audio.as_ref().unwrap().samples();
            self.time = samples.time;
            Some(self.audio.as_ref().unwrap().samples())
        } else {
            if self.demux.has_ended() {
                self.handle_end();
            }
            None
        }
    }

    /// seek 到指定时间并返回落点的帧, 不触发回调也不同步音频
    ///
    /// `seek_exact` 为 true 时解到精确时间 (在帧内图像之上逐帧推进,
    /// 可能较慢), 否则停在目标之前最近的帧内图像.
    /// 只在底层字节源可定位时可用.
    pub fn seek_frame(&mut self, seek_time: f64, seek_exact: bool) -> Option<&Frame> {
        let slot = self.seek_frame_slot(seek_time, seek_exact)?;
        Some(self.video.as_ref().unwrap().frame(slot))
    }

    /// seek 到指定时间 (0..时长)
    ///
    /// 成功时对目标帧调用一次 `on_video`; 若音频开启, 还会调用
    /// `on_audio` 直到满足音频提前量. 返回是否成功.
    pub fn seek<V, A>(
        &mut self,
        seek_time: f64,
        seek_exact: bool,
        mut on_video: V,
        mut on_audio: A,
    ) -> bool
    where
        V: FnMut(&Frame),
        A: FnMut(&Samples),
    {
        let Some(slot) = self.seek_frame_slot(seek_time, seek_exact) else {
            return false;
        };

        on_video(self.video.as_ref().unwrap().frame(slot));

        // 音频未开启, 到此为止
        let Some(audio_packet_type) = self.audio_packet_type else {
            return true;
        };

        // 音频重新同步: 继续解包, 直到遇到首个 PTS 超过当前时钟的
        // 音频包, 再解码足以满足音频提前量的数据.
        let vtype = self.video_packet_type.unwrap_or(PACKET_VIDEO_1);
        let start_time = self.demux.start_time(vtype).unwrap_or(0.0);
        if let Some(audio) = self.audio.as_mut() {
            audio.rewind();
        }

        loop {
            let mut resynced = false;
            {
                let Some(packet) = self.demux.decode() else {
                    break;
                };
                let ptype = packet.ptype;

                if Some(ptype) == self.video_packet_type {
                    self.video
                        .as_mut()
                        .unwrap()
                        .buffer_mut()
                        .write(packet.data);
                } else if ptype == audio_packet_type {
                    if let Some(pts) = packet.pts {
                        if pts - start_time > self.time {
                            let audio = self.audio.as_mut().unwrap();
                            audio.set_time(pts - start_time);
                            audio.buffer_mut().write(packet.data);
                            resynced = true;
                        }
                    }
                }
            }

            if resynced {
                // 解码期间先禁止音频缓冲区写入, 只把视频推进到当前时钟
                let prev_audio_packet_type = self.audio_packet_type.take();
                self.decode(0.0, &mut on_video, &mut on_audio);
                self.audio_packet_type = prev_audio_packet_type;

                // 再解音频
                self.decode(0.0, &mut on_video, &mut on_audio);
                break;
            }
        }

        true
    }

    // ========================
    // 内部
    // ========================

    /// 懒初始化解码器 (需要 system 头就绪)
    fn init_decoders(&mut self) -> bool {
        if self.has_decoders {
            return true;
        }

        if !self.demux.has_headers() {
            return false;
        }

        if self.demux.num_video_streams() > 0 {
            if self.video_enabled {
                self.video_packet_type = Some(PACKET_VIDEO_1);
            }
            if self.video.is_none() {
                self.video = Some(Video::new(BitBuffer::new()));
            }
        }

        if self.demux.num_audio_streams() > 0 {
            if self.audio_enabled {
                self.audio_packet_type = Some(PACKET_AUDIO_1 + self.audio_stream_index);
            }
            if self.audio.is_none() {
                self.audio = Some(Audio::new(BitBuffer::new()));
            }
        }

        self.has_decoders = true;
        true
    }

    /// 从解封装器抽包, 按类型路由进各解码器缓冲区
    ///
    /// 抽到 `requested` 类型的包即返回 true; 解封装器枯竭时
    /// 向各解码器缓冲区宣告流结束并返回 false.
    fn read_packets(&mut self, requested: u8) -> bool {
        loop {
            let Some(packet) = self.demux.decode() else {
                break;
            };
            let ptype = packet.ptype;

            if Some(ptype) == self.video_packet_type {
                self.video
                    .as_mut()
                    .unwrap()
                    .buffer_mut()
                    .write(packet.data);
            } else if Some(ptype) == self.audio_packet_type {
                self.audio
                    .as_mut()
                    .unwrap()
                    .buffer_mut()
                    .write(packet.data);
            }

            if ptype == requested {
                return true;
            }
        }

        if self.demux.has_ended() {
            if let Some(video) = self.video.as_mut() {
                video.buffer_mut().signal_end();
            }
            if let Some(audio) = self.audio.as_mut() {
                audio.buffer_mut().signal_end();
            }
        }

        false
    }

    /// 视频解码泵: 喂不饱就抽包重试, 直到产出一帧或数据枯竭
    fn decode_video_slot(&mut self) -> Option<FrameSlot> {
        let vtype = self.video_packet_type?;

        loop {
            if let Some(slot) = self.video.as_mut()?.decode_slot() {
                return Some(slot);
            }

            if !self.read_packets(vtype) {
                // 源已枯竭; 若刚宣告了流结束, 再试一次以冲刷
                // 解码器中挂起的参考帧
                if self.demux.has_ended() {
                    return self.video.as_mut()?.decode_slot();
                }
                return None;
            }
        }
    }

    /// 音频解码泵
    fn decode_audio_step(&mut self) -> bool {
        let Some(atype) = self.audio_packet_type else {
            return false;
        };

        loop {
            if self.audio.as_mut().map_or(false, Audio::try_decode) {
                return true;
            }

            if !self.read_packets(atype) {
                return false;
            }
        }
    }

    /// seek 的核心: 定位帧内图像包并在其上解码
    fn seek_frame_slot(&mut self, seek_time: f64, seek_exact: bool) -> Option<FrameSlot> {
        if !self.init_decoders() {
            return None;
        }
        let vtype = self.video_packet_type?;

        let start_time = self.demux.start_time(vtype).unwrap_or(0.0);
        let duration = self.demux.duration(vtype)?;
        let seek_time = seek_time.clamp(0.0, duration);

        // 解码期间禁止向音频缓冲区写入
        let prev_audio_packet_type = self.audio_packet_type.take();

        // 定位到目标之前最后一个含帧内图像的包, 清空视频缓冲区,
        // 从它开始重新解码
        let found = {
            match self.demux.seek(seek_time, vtype, true) {
                Some(packet) => {
                    let pts = packet.pts;
                    let video = self.video.as_mut().unwrap();
                    video.rewind();
                    video.set_time(pts.unwrap_or(0.0) - start_time);
                    video.buffer_mut().write(packet.data);
                    true
                }
                None => false,
            }
        };

        if !found {
            self.audio_packet_type = prev_audio_packet_type;
            return None;
        }

        let mut slot = self.decode_video_slot();

        // 精确 seek 时还要在帧内图像之上把之前的帧都解掉
        if seek_exact {
            while let Some(s) = slot {
                if self.video.as_ref().unwrap().frame(s).time >= seek_time {
                    break;
                }
                slot = self.decode_video_slot();
            }
        }

        self.audio_packet_type = prev_audio_packet_type;

        if let Some(s) = slot {
            self.time = self.video.as_ref().unwrap().frame(s).time;
        }
        self.has_ended = false;

        slot
    }

    /// 流结束: 循环播放则回绕, 否则置结束标志
    fn handle_end(&mut self) {
        if self.looping {
            debug!("流结束, 循环播放回绕");
            self.rewind();
        } else {
            self.has_ended = true;
        }
    }

    /// 读取视频头部信息 (必要时抽包直到序列头就绪)
    fn with_video_header<T: Default>(&mut self, f: impl Fn(&mut Video) -> T) -> T {
        if !self.init_decoders() || self.video.is_none() {
            return T::default();
        }
        if !self.video.as_mut().unwrap().has_header() {
            self.pump_for_video_header();
        }
        self.video.as_mut().map(f).unwrap_or_default()
    }

    /// 为视频序列头抽包
    fn pump_for_video_header(&mut self) -> bool {
        let Some(vtype) = self.video_packet_type else {
            return false;
        };
        loop {
            if self.video.as_mut().is_some_and(|v| v.has_header()) {
                return true;
            }
            if !self.read_packets(vtype) {
                return false;
            }
        }
    }

    /// 为音频帧头抽包
    fn pump_for_audio_header(&mut self) -> bool {
        let Some(atype) = self.audio_packet_type else {
            return false;
        };
        loop {
            if self.audio.as_mut().is_some_and(|a| a.has_header()) {
                return true;
            }
            if !self.read_packets(atype) {
                return false;
            }
        }
    }
}
