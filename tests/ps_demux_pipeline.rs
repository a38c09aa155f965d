//! MPEG-PS 解封装器集成测试: 在内存中合成码流逐项验证.

mod common;

use common::*;
use liu::core::BitBuffer;
use liu::format::Demux;

fn demux_from(data: Vec<u8>) -> Demux {
    Demux::new(BitBuffer::from_bytes(data)).expect("合法 PS 应能构造解封装器")
}

#[test]
fn test_headers_与流数量() {
    let mut w = BitWriter::new();
    build_pack_header(&mut w, 1.5);
    build_system_header(&mut w, 1, 1);
    build_pes(&mut w, 0xE0, None, &[0xAA; 8]);

    let mut demux = demux_from(w.finish());
    assert!(demux.has_headers());
    assert_eq!(demux.num_video_streams(), 1);
    assert_eq!(demux.num_audio_streams(), 1);
}

#[test]
fn test_无效头被拒绝() {
    // pack 起始码后的 MPEG-1 标志位错误
    let mut w = BitWriter::new();
    w.start_code(0xBA);
    w.put(4, 0x7);
    w.put(28, 0);
    w.put(32, 0);

    assert!(Demux::new(BitBuffer::from_bytes(w.finish())).is_err());
}

#[test]
fn test_packet_带_pts() {
    let mut w = BitWriter::new();
    build_pack_header(&mut w, 0.0);
    build_system_header(&mut w, 0, 1);
    build_pes(&mut w, 0xE0, Some(1.0), &[0x11, 0x22, 0x33, 0x44]);
    build_pes(&mut w, 0xE0, None, &[0x55; 3]);

    let mut demux = demux_from(w.finish());

    let packet = demux.decode().expect("第一个包");
    assert_eq!(packet.ptype, 0xE0);
    let pts = packet.pts.expect("应带 PTS");
    assert!((pts - 1.0).abs() < 1.0 / 90_000.0);
    assert_eq!(packet.data, &[0x11, 0x22, 0x33, 0x44]);

    let packet = demux.decode().expect("第二个包");
    assert_eq!(packet.pts, None);
    assert_eq!(packet.data, &[0x55; 3]);

    assert!(demux.decode().is_none());
}

#[test]
fn test_音频流类型与非流起始码跳过() {
    let mut w = BitWriter::new();
    build_pack_header(&mut w, 0.0);
    build_system_header(&mut w, 2, 0);
    // 夹一个用户数据起始码, 应被跳过
    w.start_code(0xB2);
    w.put_bytes(&[0x00; 4]);
    build_pes(&mut w, 0xC1, Some(0.5), &[0x99; 5]);

    let mut demux = demux_from(w.finish());
    let packet = demux.decode().expect("音频包");
    assert_eq!(packet.ptype, 0xC1);
    assert_eq!(packet.size(), 5);
}

#[test]
fn test_填充字节被剔除() {
    let mut w = BitWriter::new();
    build_pack_header(&mut w, 0.0);
    build_system_header(&mut w, 0, 1);

    // 手工构造带 3 个填充字节的 PES
    w.start_code(0xE0);
    w.put(16, 3 + 1 + 4); // 长度 = 填充 + 标志 + 载荷
    w.put_bytes(&[0xFF, 0xFF, 0xFF]); // 填充
    w.put_bytes(&[0x0F]); // 无时间戳标志
    w.put_bytes(&[1, 2, 3, 4]);

    let mut demux = demux_from(w.finish());
    let packet = demux.decode().expect("包");
    assert_eq!(packet.data, &[1, 2, 3, 4]);
}

#[test]
fn test_start_time_与时长() {
    let data = build_program_stream(8, 0);
    let mut demux = demux_from(data);

    let start = demux.start_time(0xE0).expect("首个视频 PTS");
    assert!(start.abs() < 1e-4);

    let duration = demux.duration(0xE0).expect("时长");
    assert!((duration - 7.0 / 30.0).abs() < 1e-3);

    // 时长探测不应扰动后续解包
    let packet = demux.decode().expect("第一个包");
    assert_eq!(packet.ptype, 0xE0);
    assert!(packet.pts.unwrap().abs() < 1e-4);
}

#[test]
fn test_seek_到帧内图像() {
    let data = build_program_stream(8, 0);
    let mut demux = demux_from(data);
    demux.start_time(0xE0);

    let packet = demux
        .seek(0.1, 0xE0, true)
        .expect("应命中帧内图像包");
    let pts = packet.pts.expect("目标包带 PTS");
    assert!(pts <= 0.1 + 1e-6, "落点 {pts} 应不晚于目标时间");

    // 载荷确实含帧内图像头
    let has_intra = packet
        .data
        .windows(4)
        .any(|win| win == [0x00, 0x00, 0x01, 0x00]);
    assert!(has_intra);
}

#[test]
fn test_rewind_后重解() {
    let data = build_program_stream(4, 0);
    let mut demux = demux_from(data);

    let first_pts = demux.decode().unwrap().pts;
    demux.decode();

    demux.rewind();
    assert_eq!(demux.decode().unwrap().pts, first_pts);
}
