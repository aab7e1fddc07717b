//! Gain Search and Lattice Quantization
//!
//! The bit cost of an RE8 point grows by about `5·log2` of its energy, so
//! the number of bits needed for a sub-vector `x` at gain `g` is predicted
//! as `5·log2(‖x‖²/2) - 10·log2(g)`. A bisection on the gain offset (in
//! bits) picks the global scale that brings the predicted total under 95%
//! of the budget left after the stop bits. The scaled sub-vectors are then
//! rounded to RE8.
//!
//! The prediction is approximate; the multiplexer enforces the exact budget.

use tracing::debug;

use crate::basic_ops::{
    add, extract_l, l_add, l_deposit_l, l_mac0, l_mult, l_shl, l_shr, log2, pow2, round, s_max,
    s_min, shl, sub,
};
use crate::lattice::round_to_re8;
use crate::types::{QuantizedGroup, Word16, Word32, DIM, GROUP_LEN, NSV_MAX};
use crate::voronoi::re8_vor;

/// Number of bisection steps of the gain search
pub const GAIN_SEARCH_STEPS: usize = 10;

/// Initial search step: 128 bits in Q4
const INITIAL_STEP: Word16 = 2048;

/// 0.95 in Q15
const BUDGET_MARGIN_Q15: Word16 = 31130;

/// 0.1 in Q15
const ONE_TENTH_Q15: Word16 = 3277;

/// Unit gain in Q30
const UNIT_GAIN_Q30: Word32 = 1 << 30;

/// Estimated bits of one sub-vector at unit gain, `5·log2(ener/2)` in Q4,
/// with `ener = 2 + Σx²` and `x` in Q(`q_in`)
pub fn estimate_bits(x: &[Word16], q_in: Word16) -> Word16 {
    let q2 = shl(q_in, 1);

    // 2 in Q(2·q_in) keeps the estimate non-negative
    let mut l_ener = l_shl(2, q2);
    for &v in x.iter() {
        l_ener = l_mac0(l_ener, v, v);
    }

    let (exponent, fraction) = log2(l_ener);

    // log2(ener/2) in Q15
    let l_tmp = l_add(
        l_shl(l_deposit_l(sub(sub(exponent, q2), 1)), 15),
        fraction as Word32,
    );

    s_max(extract_l(l_shr(l_tmp * 5, 11)), 0)
}

/// Predicted total bits at a gain offset, Q4
fn predicted_bits(ebits: &[Word16], offset: Word16) -> Word16 {
    ebits
        .iter()
        .fold(0, |acc, &e| add(acc, s_max(sub(e, offset), 0)))
}

/// Bisection on the gain offset (Q4 bits)
pub fn search_offset(ebits: &[Word16], bit_budget: usize, nsv: usize) -> Word16 {
    let available = sub(bit_budget.min(i16::MAX as usize) as Word16, nsv as Word16);
    let nbits_max = extract_l(l_shr(l_mult(BUDGET_MARGIN_Q15, available), 12));

    let mut fac = INITIAL_STEP;
    let mut offset: Word16 = 0;
    for _ in 0..GAIN_SEARCH_STEPS {
        offset = add(offset, fac);
        if predicted_bits(ebits, offset) <= nbits_max {
            offset = sub(offset, fac);
        }
        fac >>= 1;
    }
    offset
}

/// Inverse gain `2^(-offset/10)` in Q30, clamped to `(0, 1]`
pub fn inverse_gain(offset: Word16) -> Word32 {
    // offset/10 in Q20
    let l_tmp = l_mult(offset, ONE_TENTH_Q15);
    let integer = extract_l(l_shr(l_tmp, 20));
    let fraction = extract_l(l_shr(l_tmp, 5)) & 0x7fff;

    let (exponent, fraction) = if fraction == 0 {
        (sub(30, integer), 0)
    } else {
        (sub(29, integer), add(sub(i16::MAX, fraction), 1))
    };

    pow2(s_min(s_max(exponent, 0), 30), fraction).clamp(1, UNIT_GAIN_Q30)
}

/// Quantize a group of `nsv` sub-vectors in Q(`q_in`) onto RE8 under
/// `bit_budget` bits.
pub fn quantize_group(coeffs: &[Word16], q_in: Word16, bit_budget: usize, nsv: usize) -> QuantizedGroup {
    debug_assert!((1..=NSV_MAX).contains(&nsv));
    debug_assert!(bit_budget > 0);
    debug_assert!(coeffs.len() >= nsv * DIM);

    let mut ebits = [0 as Word16; NSV_MAX];
    for (e, x) in ebits.iter_mut().zip(coeffs.chunks_exact(DIM)).take(nsv) {
        *e = estimate_bits(x, q_in);
    }

    let offset = search_offset(&ebits[..nsv], bit_budget, nsv);
    let gain_inv = inverse_gain(offset);
    let gain_q15 = round(l_shl(gain_inv, 1));

    debug!(
        "AVQ gain search: nsv={} budget={} offset={} gain_inv={}",
        nsv, bit_budget, offset, gain_inv
    );

    let mut group = QuantizedGroup {
        nsv,
        coeffs: [0; GROUP_LEN],
        orders: [0; NSV_MAX],
        ebits,
        offset,
    };

    for i in 0..nsv {
        let mut x1 = [0 as Word32; DIM];
        for (j, x) in x1.iter_mut().enumerate() {
            // Q(q_in) * Q15 * 2 >> q_in = Q16
            *x = l_shr(l_mult(coeffs[i * DIM + j], gain_q15), q_in);
        }
        let y = round_to_re8(&x1);
        group.coeffs[i * DIM..(i + 1) * DIM].copy_from_slice(&y);
        group.orders[i] = re8_vor(&y).map_or(0, |d| d.order);
    }

    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::is_re8_point;

    #[test]
    fn test_estimate_bits_silence() {
        assert_eq!(estimate_bits(&[0; DIM], 3), 0);
        assert_eq!(estimate_bits(&[0; DIM], 0), 0);
    }

    #[test]
    fn test_estimate_bits_grows_with_energy() {
        // Σx² = 8·16² in Q0 → ener/2 = 1025 → 5·log2 ≈ 50 bits
        let x = [16 << 3; DIM];
        let e = estimate_bits(&x, 3);
        assert!((e - 50 * 16).abs() < 8, "ebits {e}");

        let louder = estimate_bits(&[32 << 3; DIM], 3);
        // Doubling the amplitude adds 10 bits
        assert!((louder - e - 160).abs() < 4);
    }

    #[test]
    fn test_search_offset_within_budget() {
        let ebits = [800, 600, 300, 0];
        let offset = search_offset(&ebits, 80, 4);
        // 0.95 * (80 - 4) bits = 1155 in Q4. The search stops one quarter
        // bit short of the boundary.
        assert_eq!(offset, 180);
        assert!(predicted_bits(&ebits, offset) > 1155);
        assert!(predicted_bits(&ebits, offset + 4) <= 1155);

        // Plenty of bits: no attenuation
        assert_eq!(search_offset(&[100, 50], 200, 2), 0);
    }

    #[test]
    fn test_inverse_gain() {
        assert_eq!(inverse_gain(0), UNIT_GAIN_Q30);
        // offset of 10 bits → gain 1/2 (0.1 in Q15 is slightly above)
        let half = UNIT_GAIN_Q30 >> 1;
        assert!((inverse_gain(160) - half).abs() < (1 << 16));
        // offset of 5 bits → 1/sqrt(2)
        let g = inverse_gain(80);
        let expected = (UNIT_GAIN_Q30 as f64 / 2f64.sqrt()) as Word32;
        assert!((g - expected).abs() < (1 << 16));
        assert!(inverse_gain(4092) > 0);
    }

    #[test]
    fn test_lattice_input_unchanged() {
        // A small Q2 point in Q3 fits easily and is not attenuated
        let mut coeffs = [0; DIM];
        coeffs[0] = 2 << 3;
        coeffs[1] = 2 << 3;
        let group = quantize_group(&coeffs, 3, 20, 1);
        assert_eq!(group.offset, 0);
        assert_eq!(group.subvector(0), [2, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(group.orders[0], 2);
    }

    #[test]
    fn test_output_is_on_lattice() {
        let coeffs: Vec<Word16> = (0..32).map(|i| ((i * 37) % 23 - 11) * 40).collect();
        let group = quantize_group(&coeffs, 3, 64, 4);
        for i in 0..4 {
            let y = group.subvector(i);
            assert!(is_re8_point(&y));
            assert_eq!(group.orders[i], re8_vor(&y).map_or(0, |d| d.order));
        }
        assert!(group.offset > 0);
    }

    #[test]
    fn test_silent_group() {
        let group = quantize_group(&[0; 16], 3, 40, 2);
        assert_eq!(group.coeffs(), &[0; 16]);
        assert_eq!(group.orders, [0; NSV_MAX]);
    }
}
