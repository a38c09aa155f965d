//! 定点 8x8 逆离散余弦变换与块写出.
//!
//! 两趟蝶形分解: 列变换不舍入, 行变换加 128 后右移 8 位.
//! 输入为预乘后的系数 (见 tables 中的预乘矩阵), 输出为像素域整数.

/// 8x8 两趟定点 IDCT
pub(super) fn idct(block: &mut [i32; 64]) {
    // 列变换
    for i in 0..8 {
        let b1 = block[4 * 8 + i];
        let b3 = block[2 * 8 + i] + block[6 * 8 + i];
        let b4 = block[5 * 8 + i] - block[3 * 8 + i];
        let tmp1 = block[8 + i] + block[7 * 8 + i];
        let tmp2 = block[3 * 8 + i] + block[5 * 8 + i];
        let b6 = block[8 + i] - block[7 * 8 + i];
        let b7 = tmp1 + tmp2;
        let m0 = block[i];
        let x4 = ((b6 * 473 - b4 * 196 + 128) >> 8) - b7;
        let x0 = x4 - (((tmp1 - tmp2) * 362 + 128) >> 8);
        let x1 = m0 - b1;
        let x2 = (((block[2 * 8 + i] - block[6 * 8 + i]) * 362 + 128) >> 8) - b3;
        let x3 = m0 + b1;
        let y3 = x1 + x2;
        let y4 = x3 + b3;
        let y5 = x1 - x2;
        let y6 = x3 - b3;
        let y7 = -x0 - ((b4 * 473 + b6 * 196 + 128) >> 8);
        block[i] = b7 + y4;
        block[8 + i] = x4 + y3;
        block[2 * 8 + i] = y5 - x0;
        block[3 * 8 + i] = y6 - y7;
        block[4 * 8 + i] = y6 + y7;
        block[5 * 8 + i] = x0 + y5;
        block[6 * 8 + i] = y3 - x4;
        block[7 * 8 + i] = y4 - b7;
    }

    // 行变换
    for i in (0..64).step_by(8) {
        let b1 = block[4 + i];
        let b3 = block[2 + i] + block[6 + i];
        let b4 = block[5 + i] - block[3 + i];
        let tmp1 = block[1 + i] + block[7 + i];
        let tmp2 = block[3 + i] + block[5 + i];
        let b6 = block[1 + i] - block[7 + i];
        let b7 = tmp1 + tmp2;
        let m0 = block[i];
        let x4 = ((b6 * 473 - b4 * 196 + 128) >> 8) - b7;
        let x0 = x4 - (((tmp1 - tmp2) * 362 + 128) >> 8);
        let x1 = m0 - b1;
        let x2 = (((block[2 + i] - block[6 + i]) * 362 + 128) >> 8) - b3;
        let x3 = m0 + b1;
        let y3 = x1 + x2;
        let y4 = x3 + b3;
        let y5 = x1 - x2;
        let y6 = x3 - b3;
        let y7 = -x0 - ((b4 * 473 + b6 * 196 + 128) >> 8);
        block[i] = (b7 + y4 + 128) >> 8;
        block[1 + i] = (x4 + y3 + 128) >> 8;
        block[2 + i] = (y5 - x0 + 128) >> 8;
        block[3 + i] = (y6 - y7 + 128) >> 8;
        block[4 + i] = (y6 + y7 + 128) >> 8;
        block[5 + i] = (x0 + y5 + 128) >> 8;
        block[6 + i] = (y3 - x4 + 128) >> 8;
        block[7 + i] = (y4 - b7 + 128) >> 8;
    }
}

/// 像素值截断到 [0, 255]
#[inline]
pub(super) fn clamp(n: i32) -> u8 {
    n.clamp(0, 255) as u8
}

/// 帧内块: 整块覆写到平面
pub(super) fn copy_block_to_dest(block: &[i32; 64], dest: &mut [u8], mut index: usize, scan: usize) {
    for n in (0..64).step_by(8) {
        for x in 0..8 {
            dest[index + x] = clamp(block[n + x]);
        }
        index += scan + 8;
    }
}

/// 帧间块: 叠加到预测结果上
pub(super) fn add_block_to_dest(block: &[i32; 64], dest: &mut [u8], mut index: usize, scan: usize) {
    for n in (0..64).step_by(8) {
        for x in 0..8 {
            dest[index + x] = clamp(i32::from(dest[index + x]) + block[n + x]);
        }
        index += scan + 8;
    }
}

/// 仅直流分量的快速路径: 常量覆写整个 8x8 块
pub(super) fn copy_value_to_dest(value: i32, dest: &mut [u8], mut index: usize, scan: usize) {
    let val = clamp(value);
    for _ in 0..8 {
        dest[index..index + 8].fill(val);
        index += scan + 8;
    }
}

/// 仅直流分量的快速路径: 常量叠加到整个 8x8 块
pub(super) fn add_value_to_dest(value: i32, dest: &mut [u8], mut index: usize, scan: usize) {
    for _ in 0..8 {
        for x in 0..8 {
            dest[index + x] = clamp(i32::from(dest[index + x]) + value);
        }
        index += scan + 8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::tables::PREMULTIPLIER_MATRIX;

    /// 浮点参考 IDCT (ISO 11172-2 定义式)
    fn idct_reference(coeffs: &[i32; 64]) -> [f64; 64] {
        let mut out = [0.0f64; 64];
        for y in 0..8 {
            for x in 0..8 {
                let mut sum = 0.0;
                for v in 0..8 {
                    for u in 0..8 {
                        let cu = if u == 0 { 1.0 / f64::sqrt(2.0) } else { 1.0 };
                        let cv = if v == 0 { 1.0 / f64::sqrt(2.0) } else { 1.0 };
                        sum += cu
                            * cv
                            * f64::from(coeffs[v * 8 + u])
                            * f64::cos((2.0 * x as f64 + 1.0) * u as f64 * std::f64::consts::PI / 16.0)
                            * f64::cos((2.0 * y as f64 + 1.0) * v as f64 * std::f64::consts::PI / 16.0);
                    }
                }
                out[y * 8 + x] = sum / 4.0;
            }
        }
        out
    }

    /// 按解码器的约定预乘系数后运行定点 IDCT
    fn idct_fixed(coeffs: &[i32; 64]) -> [i32; 64] {
        let mut block = [0i32; 64];
        for i in 0..64 {
            block[i] = coeffs[i] * i32::from(PREMULTIPLIER_MATRIX[i]);
        }
        idct(&mut block);
        block
    }

    #[test]
    fn test_idct_直流() {
        // 纯直流: 反量化系数 dc*8 -> 全块 dc
        let mut coeffs = [0i32; 64];
        coeffs[0] = 13 * 8;

        let out = idct_fixed(&coeffs);
        for &v in &out {
            assert!((v - 13).abs() <= 1, "直流输出 {v} 偏离 13");
        }
    }

    #[test]
    fn test_idct_接近浮点参考() {
        let mut coeffs = [0i32; 64];
        coeffs[0] = 40 * 8;
        coeffs[1] = 96;
        coeffs[8] = -64;
        coeffs[9] = 24;
        coeffs[18] = -120;

        let reference = idct_reference(&coeffs);
        let fixed = idct_fixed(&coeffs);

        for i in 0..64 {
            let diff = (f64::from(fixed[i]) - reference[i]).abs();
            assert!(diff <= 2.0, "样本 {i}: 定点 {} vs 参考 {:.3}", fixed[i], reference[i]);
        }
    }

    #[test]
    fn test_block_writers() {
        let block = {
            let mut b = [0i32; 64];
            for (i, v) in b.iter_mut().enumerate() {
                *v = i as i32 * 5 - 40;
            }
            b
        };

        // 8 像素间隔 (scan=0) 的紧凑目标
        let mut dest = vec![10u8; 64];
        copy_block_to_dest(&block, &mut dest, 0, 0);
        assert_eq!(dest[0], 0); // -40 截断
        assert_eq!(dest[63], clamp(63 * 5 - 40));

        let mut dest2 = vec![100u8; 64];
        add_block_to_dest(&block, &mut dest2, 0, 0);
        assert_eq!(dest2[0], 60); // 100 - 40
        assert_eq!(dest2[63], 255); // 溢出截断

        let mut dest3 = vec![0u8; 64];
        copy_value_to_dest(300, &mut dest3, 0, 0);
        assert!(dest3.iter().all(|&v| v == 255));

        let mut dest4 = vec![200u8; 64];
        add_value_to_dest(-250, &mut dest4, 0, 0);
        assert!(dest4.iter().all(|&v| v == 0));
    }
}
