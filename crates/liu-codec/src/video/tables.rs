//! MPEG-1 视频静态表.
//!
//! VLC 表编码为扁平数组: 表项 `(索引, 值)`, 索引大于 0 表示读 1 位后
//! 跳转到 `索引 + 位值`, 小于等于 0 表示叶子, -1 表示保留位序列.
//! 各表由 ISO 11172-2 的码表生成, 行注释标出该状态对应的前缀位.

use liu_core::{Vlc, VlcUint};

/// 图像速率索引表 (帧/秒)
pub(super) const PICTURE_RATE: [f64; 16] = [
    0.000, 23.976, 24.000, 25.000, 29.970, 30.000, 50.000, 59.940, //
    60.000, 0.000, 0.000, 0.000, 0.000, 0.000, 0.000, 0.000,
];

/// 宽高比索引表
pub(super) const ASPECT_RATIO: [f64; 16] = [
    0.0000, 1.0000, 0.6735, 0.7031, 0.7615, 0.8055, 0.8437, 0.8935, //
    0.9375, 0.9815, 1.0255, 1.0695, 1.1250, 1.1575, 1.2015, 0.0000,
];

/// 之字形扫描顺序: 线性系数序号 -> 自然顺序 (行优先) 索引
pub(super) const ZIG_ZAG: [u8; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, //
    17, 24, 32, 25, 18, 11, 4, 5, //
    12, 19, 26, 33, 40, 48, 41, 34, //
    27, 20, 13, 6, 7, 14, 21, 28, //
    35, 42, 49, 56, 57, 50, 43, 36, //
    29, 22, 15, 23, 30, 37, 44, 51, //
    58, 59, 52, 45, 38, 31, 39, 46, //
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// 默认帧内量化矩阵 (自然顺序; 码流中的自定义矩阵按之字形读入)
pub(super) const INTRA_QUANT_MATRIX: [u8; 64] = [
    8, 16, 19, 22, 26, 27, 29, 34, //
    16, 16, 22, 24, 27, 29, 34, 37, //
    19, 22, 26, 27, 29, 34, 34, 38, //
    22, 22, 26, 27, 29, 34, 37, 40, //
    22, 26, 27, 29, 32, 35, 40, 48, //
    26, 27, 29, 32, 35, 40, 48, 58, //
    26, 27, 29, 34, 38, 46, 56, 69, //
    27, 29, 35, 38, 46, 56, 69, 83,
];

/// 默认帧间量化矩阵
pub(super) const NON_INTRA_QUANT_MATRIX: [u8; 64] = [
    16, 16, 16, 16, 16, 16, 16, 16, //
    16, 16, 16, 16, 16, 16, 16, 16, //
    16, 16, 16, 16, 16, 16, 16, 16, //
    16, 16, 16, 16, 16, 16, 16, 16, //
    16, 16, 16, 16, 16, 16, 16, 16, //
    16, 16, 16, 16, 16, 16, 16, 16, //
    16, 16, 16, 16, 16, 16, 16, 16, //
    16, 16, 16, 16, 16, 16, 16, 16,
];

/// IDCT 预乘矩阵 (与定点 IDCT 的缩放约定配对)
pub(super) const PREMULTIPLIER_MATRIX: [u8; 64] = [
    32, 44, 42, 38, 32, 25, 17, 9, //
    44, 62, 58, 52, 44, 35, 24, 12, //
    42, 58, 55, 49, 42, 33, 23, 12, //
    38, 52, 49, 44, 38, 30, 20, 10, //
    32, 44, 42, 38, 32, 25, 17, 9, //
    25, 35, 33, 30, 25, 20, 14, 7, //
    17, 24, 23, 20, 17, 14, 9, 5, //
    9, 12, 12, 10, 9, 7, 5, 2,
];

/// 宏块地址增量 VLC (34 = 填充, 35 = 转义)
pub(super) const MACROBLOCK_ADDRESS_INCREMENT: [Vlc; 80] = [
    Vlc(1 << 1, 0), Vlc(0, 1), //   0: x
    Vlc(2 << 1, 0), Vlc(3 << 1, 0), //   1: 0x
    Vlc(4 << 1, 0), Vlc(5 << 1, 0), //   2: 00x
    Vlc(0, 3), Vlc(0, 2), //   3: 01x
    Vlc(6 << 1, 0), Vlc(7 << 1, 0), //   4: 000x
    Vlc(0, 5), Vlc(0, 4), //   5: 001x
    Vlc(8 << 1, 0), Vlc(9 << 1, 0), //   6: 0000x
    Vlc(0, 7), Vlc(0, 6), //   7: 0001x
    Vlc(10 << 1, 0), Vlc(11 << 1, 0), //   8: 0000 0x
    Vlc(12 << 1, 0), Vlc(13 << 1, 0), //   9: 0000 1x
    Vlc(14 << 1, 0), Vlc(15 << 1, 0), //  10: 0000 00x
    Vlc(16 << 1, 0), Vlc(17 << 1, 0), //  11: 0000 01x
    Vlc(18 << 1, 0), Vlc(19 << 1, 0), //  12: 0000 10x
    Vlc(0, 9), Vlc(0, 8), //  13: 0000 11x
    Vlc(-1, 0), Vlc(20 << 1, 0), //  14: 0000 000x
    Vlc(-1, 0), Vlc(21 << 1, 0), //  15: 0000 001x
    Vlc(22 << 1, 0), Vlc(23 << 1, 0), //  16: 0000 010x
    Vlc(0, 15), Vlc(0, 14), //  17: 0000 011x
    Vlc(0, 13), Vlc(0, 12), //  18: 0000 100x
    Vlc(0, 11), Vlc(0, 10), //  19: 0000 101x
    Vlc(24 << 1, 0), Vlc(25 << 1, 0), //  20: 0000 0001x
    Vlc(26 << 1, 0), Vlc(27 << 1, 0), //  21: 0000 0011x
    Vlc(28 << 1, 0), Vlc(29 << 1, 0), //  22: 0000 0100x
    Vlc(30 << 1, 0), Vlc(31 << 1, 0), //  23: 0000 0101x
    Vlc(32 << 1, 0), Vlc(-1, 0), //  24: 0000 0001 0x
    Vlc(-1, 0), Vlc(33 << 1, 0), //  25: 0000 0001 1x
    Vlc(34 << 1, 0), Vlc(35 << 1, 0), //  26: 0000 0011 0x
    Vlc(36 << 1, 0), Vlc(37 << 1, 0), //  27: 0000 0011 1x
    Vlc(38 << 1, 0), Vlc(39 << 1, 0), //  28: 0000 0100 0x
    Vlc(0, 21), Vlc(0, 20), //  29: 0000 0100 1x
    Vlc(0, 19), Vlc(0, 18), //  30: 0000 0101 0x
    Vlc(0, 17), Vlc(0, 16), //  31: 0000 0101 1x
    Vlc(0, 35), Vlc(-1, 0), //  32: 0000 0001 00x
    Vlc(-1, 0), Vlc(0, 34), //  33: 0000 0001 11x
    Vlc(0, 33), Vlc(0, 32), //  34: 0000 0011 00x
    Vlc(0, 31), Vlc(0, 30), //  35: 0000 0011 01x
    Vlc(0, 29), Vlc(0, 28), //  36: 0000 0011 10x
    Vlc(0, 27), Vlc(0, 26), //  37: 0000 0011 11x
    Vlc(0, 25), Vlc(0, 24), //  38: 0000 0100 00x
    Vlc(0, 23), Vlc(0, 22), //  39: 0000 0100 01x
];

/// 宏块类型 VLC, I 图像
///
/// 值为位掩码: 0x01 帧内, 0x02 有系数, 0x04 后向运动, 0x08 前向运动,
/// 0x10 携带量化步长.
const MACROBLOCK_TYPE_INTRA: [Vlc; 4] = [
    Vlc(1 << 1, 0), Vlc(0, 0x01), //   0: x
    Vlc(-1, 0), Vlc(0, 0x11), //   1: 0x
];

/// 宏块类型 VLC, P 图像
const MACROBLOCK_TYPE_PREDICTIVE: [Vlc; 14] = [
    Vlc(1 << 1, 0), Vlc(0, 0x0a), //   0: x
    Vlc(2 << 1, 0), Vlc(0, 0x02), //   1: 0x
    Vlc(3 << 1, 0), Vlc(0, 0x08), //   2: 00x
    Vlc(4 << 1, 0), Vlc(5 << 1, 0), //   3: 000x
    Vlc(6 << 1, 0), Vlc(0, 0x12), //   4: 0000x
    Vlc(0, 0x1a), Vlc(0, 0x01), //   5: 0001x
    Vlc(-1, 0), Vlc(0, 0x11), //   6: 0000 0x
];

/// 宏块类型 VLC, B 图像
const MACROBLOCK_TYPE_B: [Vlc; 22] = [
    Vlc(1 << 1, 0), Vlc(2 << 1, 0), //   0: x
    Vlc(3 << 1, 0), Vlc(4 << 1, 0), //   1: 0x
    Vlc(0, 0x0c), Vlc(0, 0x0e), //   2: 1x
    Vlc(5 << 1, 0), Vlc(6 << 1, 0), //   3: 00x
    Vlc(0, 0x04), Vlc(0, 0x06), //   4: 01x
    Vlc(7 << 1, 0), Vlc(8 << 1, 0), //   5: 000x
    Vlc(0, 0x08), Vlc(0, 0x0a), //   6: 001x
    Vlc(9 << 1, 0), Vlc(10 << 1, 0), //   7: 0000x
    Vlc(0, 0x1e), Vlc(0, 0x01), //   8: 0001x
    Vlc(-1, 0), Vlc(0, 0x11), //   9: 0000 0x
    Vlc(0, 0x16), Vlc(0, 0x1a), //  10: 0000 1x
];

/// 按图像类型 (1=I, 2=P, 3=B) 选择宏块类型表
pub(super) fn macroblock_type_table(picture_type: u32) -> Option<&'static [Vlc]> {
    match picture_type {
        super::PICTURE_TYPE_INTRA => Some(&MACROBLOCK_TYPE_INTRA[..]),
        super::PICTURE_TYPE_PREDICTIVE => Some(&MACROBLOCK_TYPE_PREDICTIVE[..]),
        super::PICTURE_TYPE_B => Some(&MACROBLOCK_TYPE_B[..]),
        _ => None,
    }
}

/// 编码块模式 (CBP) VLC
pub(super) const CODE_BLOCK_PATTERN: [Vlc; 126] = [
    Vlc(1 << 1, 0), Vlc(2 << 1, 0), //   0: x
    Vlc(3 << 1, 0), Vlc(4 << 1, 0), //   1: 0x
    Vlc(5 << 1, 0), Vlc(6 << 1, 0), //   2: 1x
    Vlc(7 << 1, 0), Vlc(8 << 1, 0), //   3: 00x
    Vlc(9 << 1, 0), Vlc(10 << 1, 0), //   4: 01x
    Vlc(11 << 1, 0), Vlc(12 << 1, 0), //   5: 10x
    Vlc(13 << 1, 0), Vlc(0, 60), //   6: 11x
    Vlc(14 << 1, 0), Vlc(15 << 1, 0), //   7: 000x
    Vlc(16 << 1, 0), Vlc(17 << 1, 0), //   8: 001x
    Vlc(18 << 1, 0), Vlc(19 << 1, 0), //   9: 010x
    Vlc(20 << 1, 0), Vlc(21 << 1, 0), //  10: 011x
    Vlc(22 << 1, 0), Vlc(23 << 1, 0), //  11: 100x
    Vlc(0, 32), Vlc(0, 16), //  12: 101x
    Vlc(0, 8), Vlc(0, 4), //  13: 110x
    Vlc(24 << 1, 0), Vlc(25 << 1, 0), //  14: 0000x
    Vlc(26 << 1, 0), Vlc(27 << 1, 0), //  15: 0001x
    Vlc(28 << 1, 0), Vlc(29 << 1, 0), //  16: 0010x
    Vlc(30 << 1, 0), Vlc(31 << 1, 0), //  17: 0011x
    Vlc(0, 62), Vlc(0, 2), //  18: 0100x
    Vlc(0, 61), Vlc(0, 1), //  19: 0101x
    Vlc(0, 56), Vlc(0, 52), //  20: 0110x
    Vlc(0, 44), Vlc(0, 28), //  21: 0111x
    Vlc(0, 40), Vlc(0, 20), //  22: 1000x
    Vlc(0, 48), Vlc(0, 12), //  23: 1001x
    Vlc(32 << 1, 0), Vlc(33 << 1, 0), //  24: 0000 0x
    Vlc(34 << 1, 0), Vlc(35 << 1, 0), //  25: 0000 1x
    Vlc(36 << 1, 0), Vlc(37 << 1, 0), //  26: 0001 0x
    Vlc(38 << 1, 0), Vlc(39 << 1, 0), //  27: 0001 1x
    Vlc(40 << 1, 0), Vlc(41 << 1, 0), //  28: 0010 0x
    Vlc(42 << 1, 0), Vlc(43 << 1, 0), //  29: 0010 1x
    Vlc(0, 63), Vlc(0, 3), //  30: 0011 0x
    Vlc(0, 36), Vlc(0, 24), //  31: 0011 1x
    Vlc(44 << 1, 0), Vlc(45 << 1, 0), //  32: 0000 00x
    Vlc(46 << 1, 0), Vlc(47 << 1, 0), //  33: 0000 01x
    Vlc(48 << 1, 0), Vlc(49 << 1, 0), //  34: 0000 10x
    Vlc(50 << 1, 0), Vlc(51 << 1, 0), //  35: 0000 11x
    Vlc(52 << 1, 0), Vlc(53 << 1, 0), //  36: 0001 00x
    Vlc(54 << 1, 0), Vlc(55 << 1, 0), //  37: 0001 01x
    Vlc(56 << 1, 0), Vlc(57 << 1, 0), //  38: 0001 10x
    Vlc(58 << 1, 0), Vlc(59 << 1, 0), //  39: 0001 11x
    Vlc(0, 34), Vlc(0, 18), //  40: 0010 00x
    Vlc(0, 10), Vlc(0, 6), //  41: 0010 01x
    Vlc(0, 33), Vlc(0, 17), //  42: 0010 10x
    Vlc(0, 9), Vlc(0, 5), //  43: 0010 11x
    Vlc(-1, 0), Vlc(60 << 1, 0), //  44: 0000 000x
    Vlc(61 << 1, 0), Vlc(62 << 1, 0), //  45: 0000 001x
    Vlc(0, 58), Vlc(0, 54), //  46: 0000 010x
    Vlc(0, 46), Vlc(0, 30), //  47: 0000 011x
    Vlc(0, 57), Vlc(0, 53), //  48: 0000 100x
    Vlc(0, 45), Vlc(0, 29), //  49: 0000 101x
    Vlc(0, 38), Vlc(0, 26), //  50: 0000 110x
    Vlc(0, 37), Vlc(0, 25), //  51: 0000 111x
    Vlc(0, 43), Vlc(0, 23), //  52: 0001 000x
    Vlc(0, 51), Vlc(0, 15), //  53: 0001 001x
    Vlc(0, 42), Vlc(0, 22), //  54: 0001 010x
    Vlc(0, 50), Vlc(0, 14), //  55: 0001 011x
    Vlc(0, 41), Vlc(0, 21), //  56: 0001 100x
    Vlc(0, 49), Vlc(0, 13), //  57: 0001 101x
    Vlc(0, 35), Vlc(0, 19), //  58: 0001 110x
    Vlc(0, 11), Vlc(0, 7), //  59: 0001 111x
    Vlc(0, 39), Vlc(0, 27), //  60: 0000 0001x
    Vlc(0, 59), Vlc(0, 55), //  61: 0000 0010x
    Vlc(0, 47), Vlc(0, 31), //  62: 0000 0011x
];

/// 运动矢量码 VLC (-16..=16)
pub(super) const MOTION: [Vlc; 68] = [
    Vlc(1 << 1, 0), Vlc(0, 0), //   0: x
    Vlc(2 << 1, 0), Vlc(3 << 1, 0), //   1: 0x
    Vlc(4 << 1, 0), Vlc(5 << 1, 0), //   2: 00x
    Vlc(0, 1), Vlc(0, -1), //   3: 01x
    Vlc(6 << 1, 0), Vlc(7 << 1, 0), //   4: 000x
    Vlc(0, 2), Vlc(0, -2), //   5: 001x
    Vlc(8 << 1, 0), Vlc(9 << 1, 0), //   6: 0000x
    Vlc(0, 3), Vlc(0, -3), //   7: 0001x
    Vlc(10 << 1, 0), Vlc(11 << 1, 0), //   8: 0000 0x
    Vlc(12 << 1, 0), Vlc(13 << 1, 0), //   9: 0000 1x
    Vlc(-1, 0), Vlc(14 << 1, 0), //  10: 0000 00x
    Vlc(15 << 1, 0), Vlc(16 << 1, 0), //  11: 0000 01x
    Vlc(17 << 1, 0), Vlc(18 << 1, 0), //  12: 0000 10x
    Vlc(0, 4), Vlc(0, -4), //  13: 0000 11x
    Vlc(-1, 0), Vlc(19 << 1, 0), //  14: 0000 001x
    Vlc(20 << 1, 0), Vlc(21 << 1, 0), //  15: 0000 010x
    Vlc(0, 7), Vlc(0, -7), //  16: 0000 011x
    Vlc(0, 6), Vlc(0, -6), //  17: 0000 100x
    Vlc(0, 5), Vlc(0, -5), //  18: 0000 101x
    Vlc(22 << 1, 0), Vlc(23 << 1, 0), //  19: 0000 0011x
    Vlc(24 << 1, 0), Vlc(25 << 1, 0), //  20: 0000 0100x
    Vlc(26 << 1, 0), Vlc(27 << 1, 0), //  21: 0000 0101x
    Vlc(28 << 1, 0), Vlc(29 << 1, 0), //  22: 0000 0011 0x
    Vlc(30 << 1, 0), Vlc(31 << 1, 0), //  23: 0000 0011 1x
    Vlc(32 << 1, 0), Vlc(33 << 1, 0), //  24: 0000 0100 0x
    Vlc(0, 10), Vlc(0, -10), //  25: 0000 0100 1x
    Vlc(0, 9), Vlc(0, -9), //  26: 0000 0101 0x
    Vlc(0, 8), Vlc(0, -8), //  27: 0000 0101 1x
    Vlc(0, 16), Vlc(0, -16), //  28: 0000 0011 00x
    Vlc(0, 15), Vlc(0, -15), //  29: 0000 0011 01x
    Vlc(0, 14), Vlc(0, -14), //  30: 0000 0011 10x
    Vlc(0, 13), Vlc(0, -13), //  31: 0000 0011 11x
    Vlc(0, 12), Vlc(0, -12), //  32: 0000 0100 00x
    Vlc(0, 11), Vlc(0, -11), //  33: 0000 0100 01x
];

/// DCT 直流系数长度 VLC, 亮度
const DCT_SIZE_LUMINANCE: [Vlc; 18] = [
    Vlc(1 << 1, 0), Vlc(2 << 1, 0), //   0: x
    Vlc(0, 1), Vlc(0, 2), //   1: 0x
    Vlc(3 << 1, 0), Vlc(4 << 1, 0), //   2: 1x
    Vlc(0, 0), Vlc(0, 3), //   3: 10x
    Vlc(0, 4), Vlc(5 << 1, 0), //   4: 11x
    Vlc(0, 5), Vlc(6 << 1, 0), //   5: 111x
    Vlc(0, 6), Vlc(7 << 1, 0), //   6: 1111x
    Vlc(0, 7), Vlc(8 << 1, 0), //   7: 1111 1x
    Vlc(0, 8), Vlc(-1, 0), //   8: 1111 11x
];

/// DCT 直流系数长度 VLC, 色度
const DCT_SIZE_CHROMINANCE: [Vlc; 18] = [
    Vlc(1 << 1, 0), Vlc(2 << 1, 0), //   0: x
    Vlc(0, 0), Vlc(0, 1), //   1: 0x
    Vlc(0, 2), Vlc(3 << 1, 0), //   2: 1x
    Vlc(0, 3), Vlc(4 << 1, 0), //   3: 11x
    Vlc(0, 4), Vlc(5 << 1, 0), //   4: 111x
    Vlc(0, 5), Vlc(6 << 1, 0), //   5: 1111x
    Vlc(0, 6), Vlc(7 << 1, 0), //   6: 1111 1x
    Vlc(0, 7), Vlc(8 << 1, 0), //   7: 1111 11x
    Vlc(0, 8), Vlc(-1, 0), //   8: 1111 111x
];

/// 按平面 (0=Y, 1=Cb, 2=Cr) 选择直流系数长度表
pub(super) const DCT_SIZE: [&[Vlc; 18]; 3] = [
    &DCT_SIZE_LUMINANCE,
    &DCT_SIZE_CHROMINANCE,
    &DCT_SIZE_CHROMINANCE,
];

/// DCT 系数 VLC
///
/// 叶子值打包为 `run << 8 | level`, level 无符号, 符号位跟随在码流中.
/// `0x0001` 在非首位时后随一个 0 位表示块结束; `0xffff` 表示转义.
pub(super) const DCT_COEFF: [VlcUint; 224] = [
    VlcUint(1 << 1, 0), VlcUint(0, 0x0001), //   0: x
    VlcUint(2 << 1, 0), VlcUint(3 << 1, 0), //   1: 0x
    VlcUint(4 << 1, 0), VlcUint(5 << 1, 0), //   2: 00x
    VlcUint(6 << 1, 0), VlcUint(0, 0x0101), //   3: 01x
    VlcUint(7 << 1, 0), VlcUint(8 << 1, 0), //   4: 000x
    VlcUint(9 << 1, 0), VlcUint(10 << 1, 0), //   5: 001x
    VlcUint(0, 0x0002), VlcUint(0, 0x0201), //   6: 010x
    VlcUint(11 << 1, 0), VlcUint(12 << 1, 0), //   7: 0000x
    VlcUint(13 << 1, 0), VlcUint(14 << 1, 0), //   8: 0001x
    VlcUint(15 << 1, 0), VlcUint(0, 0x0003), //   9: 0010x
    VlcUint(0, 0x0401), VlcUint(0, 0x0301), //  10: 0011x
    VlcUint(16 << 1, 0), VlcUint(0, 0xffff), //  11: 0000 0x
    VlcUint(17 << 1, 0), VlcUint(18 << 1, 0), //  12: 0000 1x
    VlcUint(0, 0x0701), VlcUint(0, 0x0601), //  13: 0001 0x
    VlcUint(0, 0x0102), VlcUint(0, 0x0501), //  14: 0001 1x
    VlcUint(19 << 1, 0), VlcUint(20 << 1, 0), //  15: 0010 0x
    VlcUint(21 << 1, 0), VlcUint(22 << 1, 0), //  16: 0000 00x
    VlcUint(0, 0x0202), VlcUint(0, 0x0901), //  17: 0000 10x
    VlcUint(0, 0x0004), VlcUint(0, 0x0801), //  18: 0000 11x
    VlcUint(23 << 1, 0), VlcUint(24 << 1, 0), //  19: 0010 00x
    VlcUint(25 << 1, 0), VlcUint(26 << 1, 0), //  20: 0010 01x
    VlcUint(27 << 1, 0), VlcUint(28 << 1, 0), //  21: 0000 000x
    VlcUint(29 << 1, 0), VlcUint(30 << 1, 0), //  22: 0000 001x
    VlcUint(0, 0x0d01), VlcUint(0, 0x0006), //  23: 0010 000x
    VlcUint(0, 0x0c01), VlcUint(0, 0x0b01), //  24: 0010 001x
    VlcUint(0, 0x0302), VlcUint(0, 0x0103), //  25: 0010 010x
    VlcUint(0, 0x0005), VlcUint(0, 0x0a01), //  26: 0010 011x
    VlcUint(31 << 1, 0), VlcUint(32 << 1, 0), //  27: 0000 0000x
    VlcUint(33 << 1, 0), VlcUint(34 << 1, 0), //  28: 0000 0001x
    VlcUint(35 << 1, 0), VlcUint(36 << 1, 0), //  29: 0000 0010x
    VlcUint(37 << 1, 0), VlcUint(38 << 1, 0), //  30: 0000 0011x
    VlcUint(39 << 1, 0), VlcUint(40 << 1, 0), //  31: 0000 0000 0x
    VlcUint(41 << 1, 0), VlcUint(42 << 1, 0), //  32: 0000 0000 1x
    VlcUint(43 << 1, 0), VlcUint(44 << 1, 0), //  33: 0000 0001 0x
    VlcUint(45 << 1, 0), VlcUint(46 << 1, 0), //  34: 0000 0001 1x
    VlcUint(0, 0x1001), VlcUint(0, 0x0502), //  35: 0000 0010 0x
    VlcUint(0, 0x0007), VlcUint(0, 0x0203), //  36: 0000 0010 1x
    VlcUint(0, 0x0104), VlcUint(0, 0x0f01), //  37: 0000 0011 0x
    VlcUint(0, 0x0e01), VlcUint(0, 0x0402), //  38: 0000 0011 1x
    VlcUint(47 << 1, 0), VlcUint(48 << 1, 0), //  39: 0000 0000 00x
    VlcUint(49 << 1, 0), VlcUint(50 << 1, 0), //  40: 0000 0000 01x
    VlcUint(51 << 1, 0), VlcUint(52 << 1, 0), //  41: 0000 0000 10x
    VlcUint(53 << 1, 0), VlcUint(54 << 1, 0), //  42: 0000 0000 11x
    VlcUint(55 << 1, 0), VlcUint(56 << 1, 0), //  43: 0000 0001 00x
    VlcUint(57 << 1, 0), VlcUint(58 << 1, 0), //  44: 0000 0001 01x
    VlcUint(59 << 1, 0), VlcUint(60 << 1, 0), //  45: 0000 0001 10x
    VlcUint(61 << 1, 0), VlcUint(62 << 1, 0), //  46: 0000 0001 11x
    VlcUint(-1, 0), VlcUint(63 << 1, 0), //  47: 0000 0000 000x
    VlcUint(64 << 1, 0), VlcUint(65 << 1, 0), //  48: 0000 0000 001x
    VlcUint(66 << 1, 0), VlcUint(67 << 1, 0), //  49: 0000 0000 010x
    VlcUint(68 << 1, 0), VlcUint(69 << 1, 0), //  50: 0000 0000 011x
    VlcUint(70 << 1, 0), VlcUint(71 << 1, 0), //  51: 0000 0000 100x
    VlcUint(72 << 1, 0), VlcUint(73 << 1, 0), //  52: 0000 0000 101x
    VlcUint(74 << 1, 0), VlcUint(75 << 1, 0), //  53: 0000 0000 110x
    VlcUint(76 << 1, 0), VlcUint(77 << 1, 0), //  54: 0000 0000 111x
    VlcUint(0, 0x000b), VlcUint(0, 0x0802), //  55: 0000 0001 000x
    VlcUint(0, 0x0403), VlcUint(0, 0x000a), //  56: 0000 0001 001x
    VlcUint(0, 0x0204), VlcUint(0, 0x0702), //  57: 0000 0001 010x
    VlcUint(0, 0x1501), VlcUint(0, 0x1401), //  58: 0000 0001 011x
    VlcUint(0, 0x0009), VlcUint(0, 0x1301), //  59: 0000 0001 100x
    VlcUint(0, 0x1201), VlcUint(0, 0x0105), //  60: 0000 0001 101x
    VlcUint(0, 0x0303), VlcUint(0, 0x0008), //  61: 0000 0001 110x
    VlcUint(0, 0x0602), VlcUint(0, 0x1101), //  62: 0000 0001 111x
    VlcUint(78 << 1, 0), VlcUint(79 << 1, 0), //  63: 0000 0000 0001x
    VlcUint(80 << 1, 0), VlcUint(81 << 1, 0), //  64: 0000 0000 0010x
    VlcUint(82 << 1, 0), VlcUint(83 << 1, 0), //  65: 0000 0000 0011x
    VlcUint(84 << 1, 0), VlcUint(85 << 1, 0), //  66: 0000 0000 0100x
    VlcUint(86 << 1, 0), VlcUint(87 << 1, 0), //  67: 0000 0000 0101x
    VlcUint(88 << 1, 0), VlcUint(89 << 1, 0), //  68: 0000 0000 0110x
    VlcUint(90 << 1, 0), VlcUint(91 << 1, 0), //  69: 0000 0000 0111x
    VlcUint(0, 0x0a02), VlcUint(0, 0x0902), //  70: 0000 0000 1000x
    VlcUint(0, 0x0503), VlcUint(0, 0x0304), //  71: 0000 0000 1001x
    VlcUint(0, 0x0205), VlcUint(0, 0x0107), //  72: 0000 0000 1010x
    VlcUint(0, 0x0106), VlcUint(0, 0x000f), //  73: 0000 0000 1011x
    VlcUint(0, 0x000e), VlcUint(0, 0x000d), //  74: 0000 0000 1100x
    VlcUint(0, 0x000c), VlcUint(0, 0x1a01), //  75: 0000 0000 1101x
    VlcUint(0, 0x1901), VlcUint(0, 0x1801), //  76: 0000 0000 1110x
    VlcUint(0, 0x1701), VlcUint(0, 0x1601), //  77: 0000 0000 1111x
    VlcUint(92 << 1, 0), VlcUint(93 << 1, 0), //  78: 0000 0000 0001 0x
    VlcUint(94 << 1, 0), VlcUint(95 << 1, 0), //  79: 0000 0000 0001 1x
    VlcUint(96 << 1, 0), VlcUint(97 << 1, 0), //  80: 0000 0000 0010 0x
    VlcUint(98 << 1, 0), VlcUint(99 << 1, 0), //  81: 0000 0000 0010 1x
    VlcUint(100 << 1, 0), VlcUint(101 << 1, 0), //  82: 0000 0000 0011 0x
    VlcUint(102 << 1, 0), VlcUint(103 << 1, 0), //  83: 0000 0000 0011 1x
    VlcUint(0, 0x001f), VlcUint(0, 0x001e), //  84: 0000 0000 0100 0x
    VlcUint(0, 0x001d), VlcUint(0, 0x001c), //  85: 0000 0000 0100 1x
    VlcUint(0, 0x001b), VlcUint(0, 0x001a), //  86: 0000 0000 0101 0x
    VlcUint(0, 0x0019), VlcUint(0, 0x0018), //  87: 0000 0000 0101 1x
    VlcUint(0, 0x0017), VlcUint(0, 0x0016), //  88: 0000 0000 0110 0x
    VlcUint(0, 0x0015), VlcUint(0, 0x0014), //  89: 0000 0000 0110 1x
    VlcUint(0, 0x0013), VlcUint(0, 0x0012), //  90: 0000 0000 0111 0x
    VlcUint(0, 0x0011), VlcUint(0, 0x0010), //  91: 0000 0000 0111 1x
    VlcUint(104 << 1, 0), VlcUint(105 << 1, 0), //  92: 0000 0000 0001 00x
    VlcUint(106 << 1, 0), VlcUint(107 << 1, 0), //  93: 0000 0000 0001 01x
    VlcUint(108 << 1, 0), VlcUint(109 << 1, 0), //  94: 0000 0000 0001 10x
    VlcUint(110 << 1, 0), VlcUint(111 << 1, 0), //  95: 0000 0000 0001 11x
    VlcUint(0, 0x0028), VlcUint(0, 0x0027), //  96: 0000 0000 0010 00x
    VlcUint(0, 0x0026), VlcUint(0, 0x0025), //  97: 0000 0000 0010 01x
    VlcUint(0, 0x0024), VlcUint(0, 0x0023), //  98: 0000 0000 0010 10x
    VlcUint(0, 0x0022), VlcUint(0, 0x0021), //  99: 0000 0000 0010 11x
    VlcUint(0, 0x0020), VlcUint(0, 0x010e), // 100: 0000 0000 0011 00x
    VlcUint(0, 0x010d), VlcUint(0, 0x010c), // 101: 0000 0000 0011 01x
    VlcUint(0, 0x010b), VlcUint(0, 0x010a), // 102: 0000 0000 0011 10x
    VlcUint(0, 0x0109), VlcUint(0, 0x0108), // 103: 0000 0000 0011 11x
    VlcUint(0, 0x0112), VlcUint(0, 0x0111), // 104: 0000 0000 0001 000x
    VlcUint(0, 0x0110), VlcUint(0, 0x010f), // 105: 0000 0000 0001 001x
    VlcUint(0, 0x0603), VlcUint(0, 0x1002), // 106: 0000 0000 0001 010x
    VlcUint(0, 0x0f02), VlcUint(0, 0x0e02), // 107: 0000 0000 0001 011x
    VlcUint(0, 0x0d02), VlcUint(0, 0x0c02), // 108: 0000 0000 0001 100x
    VlcUint(0, 0x0b02), VlcUint(0, 0x1f01), // 109: 0000 0000 0001 101x
    VlcUint(0, 0x1e01), VlcUint(0, 0x1d01), // 110: 0000 0000 0001 110x
    VlcUint(0, 0x1c01), VlcUint(0, 0x1b01), // 111: 0000 0000 0001 111x
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_是置换() {
        // 之字形扫描是 [0, 64) 上的置换: 逆映射复合恒等
        let mut inverse = [255u8; 64];
        for (i, &z) in ZIG_ZAG.iter().enumerate() {
            inverse[z as usize] = i as u8;
        }
        for i in 0..64 {
            assert_eq!(inverse[ZIG_ZAG[i] as usize] as usize, i);
            assert_eq!(ZIG_ZAG[inverse[i] as usize] as usize, i);
        }
    }

    #[test]
    fn test_vlc_tables_跳转索引在界内() {
        let check = |table: &[Vlc]| {
            for entry in table {
                if entry.0 > 0 {
                    assert!((entry.0 as usize) + 1 < table.len());
                }
            }
        };
        check(&MACROBLOCK_ADDRESS_INCREMENT);
        check(&MACROBLOCK_TYPE_INTRA);
        check(&MACROBLOCK_TYPE_PREDICTIVE);
        check(&MACROBLOCK_TYPE_B);
        check(&CODE_BLOCK_PATTERN);
        check(&MOTION);
        check(&DCT_SIZE_LUMINANCE);
        check(&DCT_SIZE_CHROMINANCE);

        for entry in &DCT_COEFF {
            if entry.0 > 0 {
                assert!((entry.0 as usize) + 1 < DCT_COEFF.len());
            }
        }
    }

    #[test]
    fn test_quant_matrix_dc_步长() {
        // 帧内矩阵的直流步长固定为 8, 帧间矩阵为全 16
        assert_eq!(INTRA_QUANT_MATRIX[0], 8);
        assert!(NON_INTRA_QUANT_MATRIX.iter().all(|&v| v == 16));
    }
}
