//! 高层播放器端到端测试: 合成的 1 视频 + 1 音频 MPEG-PS.

mod common;

use common::*;
use liu::{AudioFormat, Mpeg, SAMPLES_PER_FRAME};

#[test]
fn test_构造与头部信息() {
    let mut mpeg = Mpeg::from_bytes(build_program_stream(8, 4)).expect("合法 PS");

    assert!(mpeg.has_headers());
    assert_eq!(mpeg.num_video_streams(), 1);
    assert_eq!(mpeg.num_audio_streams(), 1);
    assert_eq!(mpeg.width(), 32);
    assert_eq!(mpeg.height(), 32);
    assert!((mpeg.framerate() - 30.0).abs() < 1e-9);
    assert_eq!(mpeg.samplerate(), 44100);
    assert_eq!(mpeg.channels(), 1);
}

#[test]
fn test_非_ps_输入拒绝构造() {
    // 前 4 字节不是 00 00 01 BA
    let err = Mpeg::from_bytes(vec![0x52, 0x49, 0x46, 0x46, 0x00, 0x00]);
    assert!(err.is_err());
}

#[test]
fn test_解码全部视频帧() {
    let mut mpeg = Mpeg::from_bytes(build_program_stream(8, 0)).expect("合法 PS");

    let mut frames = 0;
    let mut last_time = -1.0;
    while let Some(frame) = mpeg.decode_video() {
        assert_eq!(frame.y.data.len(), 32 * 32);
        assert_eq!(frame.cb.data.len(), 16 * 16);
        assert!(frame.time > last_time, "显示时间必须单调");
        last_time = frame.time;
        frames += 1;
    }

    assert_eq!(frames, 8);
    assert!(mpeg.has_ended());
}

#[test]
fn test_解码全部音频帧() {
    let mut mpeg = Mpeg::from_bytes(build_program_stream(8, 4)).expect("合法 PS");
    mpeg.set_video_enabled(false);

    let mut frames = 0;
    while let Some(samples) = mpeg.decode_audio() {
        assert_eq!(samples.interleaved.len(), 2 * SAMPLES_PER_FRAME);
        assert!(samples.interleaved.iter().all(|&s| s == 0.0));
        frames += 1;
    }

    assert_eq!(frames, 4);
    assert!(mpeg.has_ended());
}

#[test]
fn test_音视频交错推进() {
    let mut mpeg = Mpeg::from_bytes(build_program_stream(8, 4)).expect("合法 PS");
    mpeg.set_audio_format(AudioFormat::S16);

    let mut video_frames = 0;
    let mut audio_frames = 0;
    // 一次推进覆盖全部内容
    mpeg.decode(
        1.0,
        |_frame| video_frames += 1,
        |samples| {
            assert_eq!(samples.s16.len(), 2 * SAMPLES_PER_FRAME);
            audio_frames += 1;
        },
    );

    assert_eq!(video_frames, 8);
    assert_eq!(audio_frames, 4);
}

#[test]
fn test_end_与_rewind() {
    let mut mpeg = Mpeg::from_bytes(build_program_stream(4, 0)).expect("合法 PS");

    let (t0, y0) = {
        let frame = mpeg.decode_video().expect("首帧");
        (frame.time, frame.y.data.clone())
    };

    while mpeg.decode_video().is_some() {}
    assert!(mpeg.has_ended());

    mpeg.rewind();
    assert!(!mpeg.has_ended());

    let frame = mpeg.decode_video().expect("回绕后的首帧");
    assert_eq!(frame.time, t0);
    assert_eq!(frame.y.data, y0);
}

#[test]
fn test_循环播放不终止() {
    let mut mpeg = Mpeg::from_bytes(build_program_stream(4, 0)).expect("合法 PS");
    mpeg.set_looping(true);

    // 触发回绕的那次调用返回 None, 但全程不报告结束;
    // 10 次调用应产出两轮共 8 帧
    let mut frames = 0;
    for _ in 0..10 {
        if mpeg.decode_video().is_some() {
            frames += 1;
        }
        assert!(!mpeg.has_ended());
    }
    assert_eq!(frames, 8);
}

#[test]
fn test_seek_frame() {
    let mut mpeg = Mpeg::from_bytes(build_program_stream(8, 8)).expect("合法 PS");
    // 先确保序列头已锁定, seek 后的解码依赖它
    assert!(mpeg.has_headers());
    mpeg.set_audio_enabled(false);

    let frame = mpeg.seek_frame(0.1, false).expect("seek 命中");
    assert!(frame.time <= 0.1 + 1e-6);
    assert!(frame.y.data.iter().all(|&p| p == 128));

    // seek 清除结束状态并恢复正常解码
    assert!(mpeg.decode_video().is_some());
}

#[test]
fn test_时长() {
    let mut mpeg = Mpeg::from_bytes(build_program_stream(8, 0)).expect("合法 PS");
    assert!((mpeg.duration() - 7.0 / 30.0).abs() < 1e-3);
}
