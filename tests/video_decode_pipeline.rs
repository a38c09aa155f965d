//! MPEG-1 视频解码器集成测试: 手工合成的 elementary stream.

mod common;

use common::*;
use liu::codec::Video;
use liu::core::BitBuffer;

fn video_from(data: Vec<u8>) -> Video {
    let mut buf = BitBuffer::new();
    buf.write(&data);
    buf.signal_end();
    Video::new(buf)
}

#[test]
fn test_sequence_header() {
    let mut video = video_from(build_video_es(2));

    assert!(video.has_header());
    assert_eq!(video.width(), 32);
    assert_eq!(video.height(), 32);
    assert!((video.framerate() - 30.0).abs() < 1e-9);
}

#[test]
fn test_decode_全灰帧() {
    let mut video = video_from(build_video_es(2));

    let frame = video.decode().expect("第一帧");
    assert_eq!(frame.time, 0.0);
    assert_eq!(frame.width, 32);
    assert_eq!(frame.height, 32);

    // 平面尺寸按宏块取整: 亮度 32x32, 色度 16x16
    assert_eq!(frame.y.data.len(), 32 * 32);
    assert_eq!(frame.cb.data.len(), 16 * 16);
    assert_eq!(frame.cr.data.len(), 16 * 16);
    assert_eq!(frame.y.width, 2 * frame.cb.width);
    assert_eq!(frame.y.height, 2 * frame.cb.height);

    // 仅直流 128 的帧内块: 全平面灰 128
    assert!(frame.y.data.iter().all(|&p| p == 128));
    assert!(frame.cb.data.iter().all(|&p| p == 128));
    assert!(frame.cr.data.iter().all(|&p| p == 128));
}

#[test]
fn test_帧重排与末尾冲刷() {
    // 2 幅 I 图像: 第一幅在第二幅解码后经参考帧槽位输出,
    // 第二幅在流结束时冲刷
    let mut video = video_from(build_video_es(2));

    let t0 = video.decode().expect("第一帧").time;
    let t1 = video.decode().expect("第二帧 (冲刷)").time;
    assert_eq!(t0, 0.0);
    assert!((t1 - 1.0 / 30.0).abs() < 1e-9);
    assert!(t1 >= t0);

    assert!(video.decode().is_none());
    assert!(video.has_ended());
}

#[test]
fn test_时钟按帧率推进() {
    let mut video = video_from(build_video_es(4));

    let mut last = -1.0;
    let mut frames = 0;
    while let Some(frame) = video.decode() {
        assert!(frame.time > last);
        last = frame.time;
        frames += 1;
    }
    assert_eq!(frames, 4);
    assert!((video.time() - 4.0 / 30.0).abs() < 1e-9);
}

#[test]
fn test_rewind_复现首帧() {
    let mut video = Video::new(BitBuffer::from_bytes(build_video_es(3)));

    let (t0, y0) = {
        let frame = video.decode().expect("首帧");
        (frame.time, frame.y.data.clone())
    };
    video.decode();

    video.rewind();
    assert!(!video.has_ended());

    let frame = video.decode().expect("回绕后的首帧");
    assert_eq!(frame.time, t0);
    assert_eq!(frame.y.data, y0);
}

#[test]
fn test_no_delay_模式() {
    let mut video = video_from(build_video_es(2));
    video.set_no_delay(true);

    // 无 B 帧假定下第一次解码立即产出
    let frame = video.decode().expect("立即产出");
    assert_eq!(frame.time, 0.0);
    assert!(frame.y.data.iter().all(|&p| p == 128));
}

#[test]
fn test_无序列头时拒绝解码() {
    let mut w = BitWriter::new();
    build_intra_picture(&mut w, 0);
    let mut video = video_from(w.finish());

    assert!(!video.has_header());
    assert_eq!(video.width(), 0);
    assert!(video.decode().is_none());
}
