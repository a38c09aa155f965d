//! 多相合成滤波器组的 32 点快速 IDCT.
//!
//! 把一个颗粒 (granule) 内 32 个子带的同一时隙采样变换为 64 个
//! V 缓冲值, 写入 1024 字的旋转延迟线. 蝶形展开与系数来自
//! Layer II 参考实现, 输出布局带镜像与符号翻转.

/// 32 点 IDCT: `s[sb][ss]` -> `d[dp .. dp + 64]`
///
/// `ss` 为时隙 (0..3), `dp` 为延迟线中的写入位置 (64 对齐).
pub(super) fn idct32(s: &[[i32; 3]; 32], ss: usize, d: &mut [f32; 1024], dp: usize) {
    let mut t01 = (s[0][ss] + s[31][ss]) as f32;
    let mut t02 = (s[0][ss] - s[31][ss]) as f32 * 0.500_602_998_235;
    let mut t03 = (s[1][ss] + s[30][ss]) as f32;
    let mut t04 = (s[1][ss] - s[30][ss]) as f32 * 0.505_470_959_898;
    let mut t05 = (s[2][ss] + s[29][ss]) as f32;
    let mut t06 = (s[2][ss] - s[29][ss]) as f32 * 0.515_447_309_923;
    let mut t07 = (s[3][ss] + s[28][ss]) as f32;
    let mut t08 = (s[3][ss] - s[28][ss]) as f32 * 0.531_042_591_09;
    let mut t09 = (s[4][ss] + s[27][ss]) as f32;
    let mut t10 = (s[4][ss] - s[27][ss]) as f32 * 0.553_103_896_034;
    let mut t11 = (s[5][ss] + s[26][ss]) as f32;
    let mut t12 = (s[5][ss] - s[26][ss]) as f32 * 0.582_934_968_206;
    let mut t13 = (s[6][ss] + s[25][ss]) as f32;
    let mut t14 = (s[6][ss] - s[25][ss]) as f32 * 0.622_504_123_036;
    let mut t15 = (s[7][ss] + s[24][ss]) as f32;
    let mut t16 = (s[7][ss] - s[24][ss]) as f32 * 0.674_808_341_455;
    let mut t17 = (s[8][ss] + s[23][ss]) as f32;
    let mut t18 = (s[8][ss] - s[23][ss]) as f32 * 0.744_536_271_002;
    let mut t19 = (s[9][ss] + s[22][ss]) as f32;
    let mut t20 = (s[9][ss] - s[22][ss]) as f32 * 0.839_349_645_416;
    let mut t21 = (s[10][ss] + s[21][ss]) as f32;
    let mut t22 = (s[10][ss] - s[21][ss]) as f32 * 0.972_568_237_862;
    let mut t23 = (s[11][ss] + s[20][ss]) as f32;
    let mut t24 = (s[11][ss] - s[20][ss]) as f32 * 1.169_439_933_43;
    let mut t25 = (s[12][ss] + s[19][ss]) as f32;
    let mut t26 = (s[12][ss] - s[19][ss]) as f32 * 1.484_164_616_31;
    let mut t27 = (s[13][ss] + s[18][ss]) as f32;
    let mut t28 = (s[13][ss] - s[18][ss]) as f32 * 2.057_781_009_95;
    let mut t29 = (s[14][ss] + s[17][ss]) as f32;
    let mut t30 = (s[14][ss] - s[17][ss]) as f32 * 3.407_608_418_47;
    let mut t31 = (s[15][ss] + s[16][ss]) as f32;
    let mut t32 = (s[15][ss] - s[16][ss]) as f32 * 10.190_008_123_5;

    let mut t33 = t01 + t31;
    t31 = (t01 - t31) * 0.502_419_286_188;
    t01 = t03 + t29;
    t29 = (t03 - t29) * 0.522_498_614_94;
    t03 = t05 + t27;
    t27 = (t05 - t27) * 0.566_944_034_816;
    t05 = t07 + t25;
    t25 = (t07 - t25) * 0.646_821_783_36;
    t07 = t09 + t23;
    t23 = (t09 - t23) * 0.788_154_623_451;
    t09 = t11 + t21;
    t21 = (t11 - t21) * 1.060_677_685_99;
    t11 = t13 + t19;
    t19 = (t13 - t19) * 1.722_447_098_24;
    t13 = t15 + t17;
    t17 = (t15 - t17) * 5.101_148_618_69;
    t15 = t33 + t13;
    t13 = (t33 - t13) * 0.509_795_579_104;
    t33 = t01 + t11;
    t01 = (t01 - t11) * 0.601_344_886_935;
    t11 = t03 + t09;
    t09 = (t03 - t09) * 0.899_976_223_136;
    t03 = t05 + t07;
    t07 = (t05 - t07) * 2.562_915_447_74;
    t05 = t15 + t03;
    t15 = (t15 - t03) * 0.541_196_100_146;
    t03 = t33 + t11;
    t11 = (t33 - t11) * 1.306_562_964_88;
    t33 = t05 + t03;
    t05 = (t05 - t03) * 0.707_106_781_187;
    t03 = t15 + t11;
    t15 = (t15 - t11) * 0.707_106_781_187;
    t03 += t15;
    t11 = t13 + t07;
    t13 = (t13 - t07) * 0.541_196_100_146;
    t07 = t01 + t09;
    t09 = (t01 - t09) * 1.306_562_964_88;
    t01 = t11 + t07;
    t07 = (t11 - t07) * 0.707_106_781_187;
    t11 = t13 + t09;
    t13 = (t13 - t09) * 0.707_106_781_187;
    t11 += t13;
    t01 += t11;
    t11 += t07;
    t07 += t13;
    t09 = t31 + t17;
    t31 = (t31 - t17) * 0.509_795_579_104;
    t17 = t29 + t19;
    t29 = (t29 - t19) * 0.601_344_886_935;
    t19 = t27 + t21;
    t21 = (t27 - t21) * 0.899_976_223_136;
    t27 = t25 + t23;
    t23 = (t25 - t23) * 2.562_915_447_74;
    t25 = t09 + t27;
    t09 = (t09 - t27) * 0.541_196_100_146;
    t27 = t17 + t19;
    t19 = (t17 - t19) * 1.306_562_964_88;
    t17 = t25 + t27;
    t27 = (t25 - t27) * 0.707_106_781_187;
    t25 = t09 + t19;
    t19 = (t09 - t19) * 0.707_106_781_187;
    t25 += t19;
    t09 = t31 + t23;
    t31 = (t31 - t23) * 0.541_196_100_146;
    t23 = t29 + t21;
    t21 = (t29 - t21) * 1.306_562_964_88;
    t29 = t09 + t23;
    t23 = (t09 - t23) * 0.707_106_781_187;
    t09 = t31 + t21;
    t31 = (t31 - t21) * 0.707_106_781_187;
    t09 += t31;
    t29 += t09;
    t09 += t23;
    t23 += t31;
    t17 += t29;
    t29 += t25;
    t25 += t09;
    t09 += t27;
    t27 += t23;
    t23 += t19;
    t19 += t31;
    t21 = t02 + t32;
    t02 = (t02 - t32) * 0.502_419_286_188;
    t32 = t04 + t30;
    t04 = (t04 - t30) * 0.522_498_614_94;
    t30 = t06 + t28;
    t28 = (t06 - t28) * 0.566_944_034_816;
    t06 = t08 + t26;
    t08 = (t08 - t26) * 0.646_821_783_36;
    t26 = t10 + t24;
    t10 = (t10 - t24) * 0.788_154_623_451;
    t24 = t12 + t22;
    t22 = (t12 - t22) * 1.060_677_685_99;
    t12 = t14 + t20;
    t20 = (t14 - t20) * 1.722_447_098_24;
    t14 = t16 + t18;
    t16 = (t16 - t18) * 5.101_148_618_69;
    t18 = t21 + t14;
    t14 = (t21 - t14) * 0.509_795_579_104;
    t21 = t32 + t12;
    t32 = (t32 - t12) * 0.601_344_886_935;
    t12 = t30 + t24;
    t24 = (t30 - t24) * 0.899_976_223_136;
    t30 = t06 + t26;
    t26 = (t06 - t26) * 2.562_915_447_74;
    t06 = t18 + t30;
    t18 = (t18 - t30) * 0.541_196_100_146;
    t30 = t21 + t12;
    t12 = (t21 - t12) * 1.306_562_964_88;
    t21 = t06 + t30;
    t30 = (t06 - t30) * 0.707_106_781_187;
    t06 = t18 + t12;
    t12 = (t18 - t12) * 0.707_106_781_187;
    t06 += t12;
    t18 = t14 + t26;
    t26 = (t14 - t26) * 0.541_196_100_146;
    t14 = t32 + t24;
    t24 = (t32 - t24) * 1.306_562_964_88;
    t32 = t18 + t14;
    t14 = (t18 - t14) * 0.707_106_781_187;
    t18 = t26 + t24;
    t24 = (t26 - t24) * 0.707_106_781_187;
    t18 += t24;
    t32 += t18;
    t18 += t14;
    t26 = t14 + t24;
    t14 = t02 + t16;
    t02 = (t02 - t16) * 0.509_795_579_104;
    t16 = t04 + t20;
    t04 = (t04 - t20) * 0.601_344_886_935;
    t20 = t28 + t22;
    t22 = (t28 - t22) * 0.899_976_223_136;
    t28 = t08 + t10;
    t10 = (t08 - t10) * 2.562_915_447_74;
    t08 = t14 + t28;
    t14 = (t14 - t28) * 0.541_196_100_146;
    t28 = t16 + t20;
    t20 = (t16 - t20) * 1.306_562_964_88;
    t16 = t08 + t28;
    t28 = (t08 - t28) * 0.707_106_781_187;
    t08 = t14 + t20;
    t20 = (t14 - t20) * 0.707_106_781_187;
    t08 += t20;
    t14 = t02 + t10;
    t02 = (t02 - t10) * 0.541_196_100_146;
    t10 = t04 + t22;
    t22 = (t04 - t22) * 1.306_562_964_88;
    t04 = t14 + t10;
    t10 = (t14 - t10) * 0.707_106_781_187;
    t14 = t02 + t22;
    t02 = (t02 - t22) * 0.707_106_781_187;
    t14 += t02;
    t04 += t14;
    t14 += t10;
    t10 += t02;
    t16 += t04;
    t04 += t08;
    t08 += t14;
    t14 += t28;
    t28 += t10;
    t10 += t20;
    t20 += t02;
    t21 += t16;
    t16 += t32;
    t32 += t04;
    t04 += t06;
    t06 += t08;
    t08 += t18;
    t18 += t14;
    t14 += t30;
    t30 += t28;
    t28 += t26;
    t26 += t10;
    t10 += t12;
    t12 += t20;
    t20 += t24;
    t24 += t02;

    d[dp + 48] = -t33;
    d[dp + 49] = -t21;
    d[dp + 47] = -t21;
    d[dp + 50] = -t17;
    d[dp + 46] = -t17;
    d[dp + 51] = -t16;
    d[dp + 45] = -t16;
    d[dp + 52] = -t01;
    d[dp + 44] = -t01;
    d[dp + 53] = -t32;
    d[dp + 43] = -t32;
    d[dp + 54] = -t29;
    d[dp + 42] = -t29;
    d[dp + 55] = -t04;
    d[dp + 41] = -t04;
    d[dp + 56] = -t03;
    d[dp + 40] = -t03;
    d[dp + 57] = -t06;
    d[dp + 39] = -t06;
    d[dp + 58] = -t25;
    d[dp + 38] = -t25;
    d[dp + 59] = -t08;
    d[dp + 37] = -t08;
    d[dp + 60] = -t11;
    d[dp + 36] = -t11;
    d[dp + 61] = -t18;
    d[dp + 35] = -t18;
    d[dp + 62] = -t09;
    d[dp + 34] = -t09;
    d[dp + 63] = -t14;
    d[dp + 33] = -t14;
    d[dp + 32] = -t05;
    d[dp] = t05;
    d[dp + 31] = -t30;
    d[dp + 1] = t30;
    d[dp + 30] = -t27;
    d[dp + 2] = t27;
    d[dp + 29] = -t28;
    d[dp + 3] = t28;
    d[dp + 28] = -t07;
    d[dp + 4] = t07;
    d[dp + 27] = -t26;
    d[dp + 5] = t26;
    d[dp + 26] = -t23;
    d[dp + 6] = t23;
    d[dp + 25] = -t10;
    d[dp + 7] = t10;
    d[dp + 24] = -t15;
    d[dp + 8] = t15;
    d[dp + 23] = -t12;
    d[dp + 9] = t12;
    d[dp + 22] = -t19;
    d[dp + 10] = t19;
    d[dp + 21] = -t20;
    d[dp + 11] = t20;
    d[dp + 20] = -t13;
    d[dp + 12] = t13;
    d[dp + 19] = -t24;
    d[dp + 13] = t24;
    d[dp + 18] = -t31;
    d[dp + 14] = t31;
    d[dp + 17] = -t02;
    d[dp + 15] = t02;
    d[dp + 16] = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idct32_零输入() {
        let s = [[0i32; 3]; 32];
        let mut v = [1.0f32; 1024];

        idct32(&s, 0, &mut v, 64);
        assert!(v[64..128].iter().all(|&x| x == 0.0));
        // 写入范围之外不受影响
        assert!(v[..64].iter().all(|&x| x == 1.0));
        assert!(v[128..].iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_idct32_直流分量() {
        // 全子带同值输入: 变换应有能量, 且中心点 d[16] 恒为 0
        let mut s = [[0i32; 3]; 32];
        for sb in &mut s {
            sb[1] = 1000;
        }
        let mut v = [0.0f32; 1024];

        idct32(&s, 1, &mut v, 0);
        assert_eq!(v[16], 0.0);
        assert!(v.iter().any(|&x| x != 0.0));
        // 镜像对: d[15] = t02, d[17] = -t02
        assert_eq!(v[15], -v[17]);
        assert_eq!(v[14], -v[18]);
    }
}
