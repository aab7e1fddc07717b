//! RE8 Lattice Primitives
//!
//! RE8 is the union of `2D8` (even coordinates, sum a multiple of 4) and its
//! coset `2D8 + (1, ..., 1)`. This module rounds a Q16 vector to the nearest
//! RE8 point, converts points to and from coordinates in the generator basis
//!
//! ```text
//!     [4 0 0 0 0 0 0 0]
//!     [2 2 0 0 0 0 0 0]
//!     [2 0 2 0 0 0 0 0]
//! G = [2 0 0 2 0 0 0 0]
//!     [2 0 0 0 2 0 0 0]
//!     [2 0 0 0 0 2 0 0]
//!     [2 0 0 0 0 0 2 0]
//!     [1 1 1 1 1 1 1 1]
//! ```
//!
//! and computes the Voronoi coset representative used by the extension
//! codebooks.

use crate::basic_ops::{l_abs, l_add, l_deposit_h, l_shl, l_sub, saturate};
use crate::types::{Word16, Word32, DIM};

/// One in Q16
const ONE_Q16: Word32 = 1 << 16;

/// Nearest point of `2D8` to a Q16 vector
fn nearest_2d8(x: &[Word32; DIM]) -> [Word32; DIM] {
    let mut y = [0 as Word32; DIM];
    let mut sum: Word32 = 0;

    // Round each coordinate to the nearest even integer
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi = if xi >= 0 {
            (l_add(xi, ONE_Q16) >> 17) << 1
        } else {
            -((l_sub(ONE_Q16, xi) >> 17) << 1)
        };
        sum += *yi;
    }

    // Odd multiple of 2: move the worst rounded coordinate to the other side
    if sum & 2 != 0 {
        let mut j = 0;
        let mut e_max: Word32 = -1;
        for i in 0..DIM {
            let e = l_abs(l_sub(x[i], l_shl(y[i], 16)));
            if e > e_max {
                e_max = e;
                j = i;
            }
        }
        if x[j] >= l_shl(y[j], 16) {
            y[j] += 2;
        } else {
            y[j] -= 2;
        }
    }

    y
}

/// Squared distance between a Q16 vector and an integer point
fn distance(x: &[Word32; DIM], y: &[Word32; DIM]) -> i64 {
    x.iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| {
            let d = xi as i64 - ((yi as i64) << 16);
            d * d
        })
        .sum()
}

/// Nearest RE8 point of a Q16 vector.
///
/// Both cosets are searched and the closer one wins (the even coset on
/// ties). Coordinates beyond the 16-bit range saturate.
pub fn round_to_re8(x: &[Word32; DIM]) -> [Word16; DIM] {
    let y0 = nearest_2d8(x);

    let mut shifted = [0 as Word32; DIM];
    for (s, &xi) in shifted.iter_mut().zip(x.iter()) {
        *s = l_sub(xi, ONE_Q16);
    }
    let mut y1 = nearest_2d8(&shifted);
    for v in y1.iter_mut() {
        *v += 1;
    }

    let best = if distance(x, &y0) <= distance(x, &y1) {
        y0
    } else {
        y1
    };

    let mut y = [0 as Word16; DIM];
    for (out, &v) in y.iter_mut().zip(best.iter()) {
        *out = saturate(v);
    }
    y
}

/// Check lattice membership
pub fn is_re8_point(y: &[Word16; DIM]) -> bool {
    let parity = y[0] & 1;
    if y.iter().any(|&v| v & 1 != parity) {
        return false;
    }
    let sum: Word32 = y.iter().map(|&v| v as Word32).sum();
    sum % 4 == 0
}

/// Coordinates of an RE8 point in the generator basis
pub fn re8_coord(y: &[Word16; DIM]) -> [Word32; DIM] {
    let mut k = [0 as Word32; DIM];
    let y7 = y[7] as Word32;

    k[7] = y7;
    let mut sum: Word32 = 0;
    for i in 1..7 {
        k[i] = (y[i] as Word32 - y7) >> 1;
        sum += y[i] as Word32;
    }
    k[0] = (y[0] as Word32 + 5 * y7 - sum) >> 2;

    k
}

/// Coset representative `v = y - m·round_re8(y/m)` of `y = k·G`, `m = 2^r`.
///
/// The rounding uses the shifted point `(y - a)/m` with `a = (2, 0, ..., 0)`
/// so encoder and decoder resolve ties identically. The digits are
/// expected in `[0, 2^r)`.
pub fn re8_k2y(k: &[Word32; DIM], r: u16) -> [Word32; DIM] {
    debug_assert!((1..=15).contains(&r));

    let mut y = [0 as Word32; DIM];
    let k7 = k[7];
    let mut sum: Word32 = 0;
    for i in 1..7 {
        y[i] = k7 + 2 * k[i];
        sum += k[i];
    }
    y[7] = k7;
    y[0] = k7 + 4 * k[0] + 2 * sum;

    let shift = 16 - r as Word16;
    let mut z = [0 as Word32; DIM];
    z[0] = l_shl(y[0] - 2, shift);
    for i in 1..DIM {
        z[i] = l_shl(y[i], shift);
    }

    let w = round_to_re8(&z);
    let mut v = [0 as Word32; DIM];
    for i in 0..DIM {
        v[i] = y[i] - ((w[i] as Word32) << r);
    }
    v
}

/// Convert an integer vector to Q16
pub fn to_q16(y: &[Word16; DIM]) -> [Word32; DIM] {
    let mut x = [0 as Word32; DIM];
    for (xi, &yi) in x.iter_mut().zip(y.iter()) {
        *xi = l_deposit_h(yi);
    }
    x
}
