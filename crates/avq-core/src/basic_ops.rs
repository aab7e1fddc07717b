//! Fixed-Point Arithmetic Operations
//!
//! This module implements the ITU-T basic operators used by the AVQ
//! quantizer and lattice indexer, following the semantics of BASIC_OP.C:
//! every 16-bit and 32-bit operation saturates instead of wrapping.
//!
//! No overflow flag is kept.

use crate::tables::{TAB_LOG, TAB_POW};
use crate::types::{Word16, Word32};

/// Maximum 16-bit value
pub const MAX_16: Word16 = 0x7fff;

/// Minimum 16-bit value
pub const MIN_16: Word16 = -0x8000;

/// Maximum 32-bit value
pub const MAX_32: Word32 = 0x7fff_ffff;

/// Minimum 32-bit value
pub const MIN_32: Word32 = -0x8000_0000;

/// Limit 32-bit value to 16-bit range with saturation
#[inline]
pub fn saturate(l_var1: Word32) -> Word16 {
    l_var1.clamp(MIN_16 as Word32, MAX_16 as Word32) as Word16
}

/// 16-bit addition with saturation
#[inline]
pub fn add(var1: Word16, var2: Word16) -> Word16 {
    saturate(var1 as Word32 + var2 as Word32)
}

/// 16-bit subtraction with saturation
#[inline]
pub fn sub(var1: Word16, var2: Word16) -> Word16 {
    saturate(var1 as Word32 - var2 as Word32)
}

/// 16-bit absolute value with saturation
#[inline]
pub fn abs_s(var1: Word16) -> Word16 {
    if var1 == MIN_16 {
        MAX_16
    } else {
        var1.abs()
    }
}

/// 16-bit negation
#[inline]
pub fn negate(var1: Word16) -> Word16 {
    if var1 == MIN_16 {
        MAX_16
    } else {
        -var1
    }
}

/// Maximum of two 16-bit values
#[inline]
pub fn s_max(var1: Word16, var2: Word16) -> Word16 {
    var1.max(var2)
}

/// Minimum of two 16-bit values
#[inline]
pub fn s_min(var1: Word16, var2: Word16) -> Word16 {
    var1.min(var2)
}

/// 16-bit left shift with saturation (negative shift shifts right)
pub fn shl(var1: Word16, var2: Word16) -> Word16 {
    if var2 < 0 {
        return shr(var1, -var2);
    }
    if var2 >= 15 {
        return if var1 > 0 {
            MAX_16
        } else if var1 < 0 {
            MIN_16
        } else {
            0
        };
    }
    saturate((var1 as Word32) << var2)
}

/// 16-bit arithmetic right shift (negative shift shifts left)
pub fn shr(var1: Word16, var2: Word16) -> Word16 {
    if var2 < 0 {
        return shl(var1, -var2);
    }
    if var2 >= 15 {
        return if var1 < 0 { -1 } else { 0 };
    }
    var1 >> var2
}

/// 16-bit multiplication (Q15 * Q15 = Q15)
#[inline]
pub fn mult(var1: Word16, var2: Word16) -> Word16 {
    saturate((var1 as Word32 * var2 as Word32) >> 15)
}

/// 16-bit multiplication to 32-bit result with doubling (Q15 * Q15 = Q31)
#[inline]
pub fn l_mult(var1: Word16, var2: Word16) -> Word32 {
    if var1 == MIN_16 && var2 == MIN_16 {
        return MAX_32;
    }
    (var1 as Word32 * var2 as Word32) << 1
}

/// 16-bit multiplication to 32-bit result without doubling
#[inline]
pub fn l_mult0(var1: Word16, var2: Word16) -> Word32 {
    var1 as Word32 * var2 as Word32
}

/// 32-bit addition with saturation
#[inline]
pub fn l_add(l_var1: Word32, l_var2: Word32) -> Word32 {
    l_var1.saturating_add(l_var2)
}

/// 32-bit subtraction with saturation
#[inline]
pub fn l_sub(l_var1: Word32, l_var2: Word32) -> Word32 {
    l_var1.saturating_sub(l_var2)
}

/// 32-bit absolute value with saturation
#[inline]
pub fn l_abs(l_var1: Word32) -> Word32 {
    if l_var1 == MIN_32 {
        MAX_32
    } else {
        l_var1.abs()
    }
}

/// Multiply-accumulate: `l_var3 + var1 * var2 * 2`
#[inline]
pub fn l_mac(l_var3: Word32, var1: Word16, var2: Word16) -> Word32 {
    l_add(l_var3, l_mult(var1, var2))
}

/// Multiply-accumulate without doubling: `l_var3 + var1 * var2`
#[inline]
pub fn l_mac0(l_var3: Word32, var1: Word16, var2: Word16) -> Word32 {
    l_add(l_var3, l_mult0(var1, var2))
}

/// Multiply-subtract: `l_var3 - var1 * var2 * 2`
#[inline]
pub fn l_msu(l_var3: Word32, var1: Word16, var2: Word16) -> Word32 {
    l_sub(l_var3, l_mult(var1, var2))
}

/// 32-bit left shift with saturation (negative shift shifts right)
pub fn l_shl(l_var1: Word32, var2: Word16) -> Word32 {
    if var2 <= 0 {
        return l_shr(l_var1, -var2);
    }
    if l_var1 == 0 {
        return 0;
    }
    if var2 >= 31 {
        return if l_var1 > 0 { MAX_32 } else { MIN_32 };
    }
    let result = l_var1 << var2;
    if result >> var2 != l_var1 {
        if l_var1 > 0 {
            MAX_32
        } else {
            MIN_32
        }
    } else {
        result
    }
}

/// 32-bit arithmetic right shift (negative shift shifts left)
pub fn l_shr(l_var1: Word32, var2: Word16) -> Word32 {
    if var2 < 0 {
        return l_shl(l_var1, -var2);
    }
    if var2 >= 31 {
        return if l_var1 < 0 { -1 } else { 0 };
    }
    l_var1 >> var2
}

/// 32-bit right shift with rounding
pub fn l_shr_r(l_var1: Word32, var2: Word16) -> Word32 {
    if var2 > 31 {
        return 0;
    }
    let l_result = l_shr(l_var1, var2);
    if var2 > 0 && (l_var1 & (1 << (var2 - 1))) != 0 {
        l_result + 1
    } else {
        l_result
    }
}

/// Deposit 16-bit value in high part of 32-bit word
#[inline]
pub fn l_deposit_h(var1: Word16) -> Word32 {
    (var1 as Word32) << 16
}

/// Deposit 16-bit value in low part of 32-bit word (sign extended)
#[inline]
pub fn l_deposit_l(var1: Word16) -> Word32 {
    var1 as Word32
}

/// Extract high 16 bits from 32-bit value
#[inline]
pub fn extract_h(l_var1: Word32) -> Word16 {
    (l_var1 >> 16) as Word16
}

/// Extract low 16 bits from 32-bit value
#[inline]
pub fn extract_l(l_var1: Word32) -> Word16 {
    l_var1 as Word16
}

/// Round 32-bit value to 16-bit
#[inline]
pub fn round(l_var1: Word32) -> Word16 {
    extract_h(l_add(l_var1, 0x0000_8000))
}

/// Number of left shifts needed to normalize a 32-bit value
pub fn norm_l(l_var1: Word32) -> Word16 {
    match l_var1 {
        0 => 0,
        -1 => 31,
        v if v < 0 => ((!v).leading_zeros() - 1) as Word16,
        v => (v.leading_zeros() - 1) as Word16,
    }
}

/// Number of left shifts needed to normalize a 16-bit value
pub fn norm_s(var1: Word16) -> Word16 {
    match var1 {
        0 => 0,
        -1 => 15,
        v if v < 0 => ((!v).leading_zeros() - 1) as Word16,
        v => (v.leading_zeros() - 1) as Word16,
    }
}

/// Base-2 logarithm of a positive 32-bit value.
///
/// Returns `(exponent, fraction)` with `log2(l_x) = exponent + fraction/32768`,
/// using the 33-entry interpolation table of the ITU reference `Log2`.
/// Non-positive inputs yield `(0, 0)`.
pub fn log2(l_x: Word32) -> (Word16, Word16) {
    if l_x <= 0 {
        return (0, 0);
    }

    let exp = norm_l(l_x);
    let l_x = l_shl(l_x, exp);
    let exponent = sub(30, exp);

    let l_x = l_shr(l_x, 9);
    let i = extract_h(l_x) as usize - 32; // b25-b31
    let a = extract_l(l_shr(l_x, 1)) & 0x7fff; // b10-b24

    let mut l_y = l_deposit_h(TAB_LOG[i]);
    let tmp = sub(TAB_LOG[i], TAB_LOG[i + 1]);
    l_y = l_msu(l_y, tmp, a);

    (exponent, extract_h(l_y))
}

/// Power of two: `2^(exponent + fraction/32768)` for `exponent` in 0..=30
/// and `fraction` in Q15, as in the ITU reference `Pow2`.
pub fn pow2(exponent: Word16, fraction: Word16) -> Word32 {
    let l_x = l_mult(fraction, 32);
    let i = extract_h(l_x) as usize; // b10-b15
    let a = extract_l(l_shr(l_x, 1)) & 0x7fff; // b0-b9

    let mut l_x = l_deposit_h(TAB_POW[i]);
    let tmp = sub(TAB_POW[i], TAB_POW[i + 1]);
    l_x = l_msu(l_x, tmp, a);

    l_shr_r(l_x, sub(30, exponent))
}
