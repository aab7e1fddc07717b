//! Voronoi Extension
//!
//! Points outside Q2 ∪ Q3 ∪ Q4 are written as `y = m·c + v(k)` with
//! `m = 2^r`: `c` is a base codevector of Q3 or Q4, and `k` holds eight
//! `r`-bit digits selecting the coset representative `v` of `y` modulo
//! `m·RE8`. The extended codebook order is `n = n' + 2r`.

use tracing::{trace, warn};

use crate::basic_ops::{l_mac0, l_shl, saturate};
use crate::classifier::identify_absolute_leader;
use crate::index::{compute_base_index, decode_base_index};
use crate::lattice::{re8_coord, re8_k2y};
use crate::types::{
    base_order, voronoi_order, LatticeCode, LeaderClass, Subvector, Word32, DIM,
    MAX_CODEBOOK_ORDER, MAX_VORONOI_ORDER,
};

/// Decomposition of a lattice point into base codevector and Voronoi digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposition {
    /// Codebook order `n`
    pub order: u16,
    /// Leader class of the base codevector
    pub class: LeaderClass,
    /// Base codevector
    pub c: Subvector,
    /// Voronoi digits (all zero when `order <= 4`)
    pub k: [u16; DIM],
}

/// One decimation attempt at order `r`. Fails when `c` is zero or outside
/// the base codebooks.
///
/// A zero `c` has no base index at order `n' + 2r`. It only appears when
/// `y` lies in the Voronoi cell of `2^r·RE8`, whose covering radius² is
/// `16·4^(r-1)`; the starting `r` leaves `Σy² > 88·4^(r-1)` (`> 32` for
/// `r = 1`, as `y` is outside the base codebooks), so the first attempt
/// never sees it.
fn try_order(y: &Subvector, k_mod: &[Word32; DIM], r: u16) -> Option<Decomposition> {
    let mask = (1 << r) - 1;
    let mut k = [0 as Word32; DIM];
    for (ki, &v) in k.iter_mut().zip(k_mod.iter()) {
        *ki = v & mask;
    }

    let v = re8_k2y(&k, r);
    let mut c = [0; DIM];
    for i in 0..DIM {
        // y - v lies in m·RE8, the shift is exact
        c[i] = saturate((y[i] as Word32 - v[i]) >> r);
    }

    let class = identify_absolute_leader(&c);
    match class.codebook() {
        Some(nq) if nq > 0 => Some(Decomposition {
            order: nq.max(3) + 2 * r,
            class,
            c,
            k: k.map(|d| d as u16),
        }),
        _ => None,
    }
}

/// Decompose an RE8 point.
///
/// Returns `None` if no Voronoi order up to [`MAX_VORONOI_ORDER`] yields a
/// base codevector.
pub fn re8_vor(y: &Subvector) -> Option<Decomposition> {
    let class = identify_absolute_leader(y);
    if let Some(nq) = class.codebook() {
        return Some(Decomposition {
            order: nq,
            class,
            c: *y,
            k: [0; DIM],
        });
    }

    // Initial order from the energy: Σy² > 352·4^(r-1) means r is too small
    let energy = y.iter().fold(0, |acc, &v| l_mac0(acc, v, v));
    let mut r: u16 = 1;
    let mut threshold: Word32 = 352;
    while energy > threshold && r < MAX_VORONOI_ORDER {
        r += 1;
        threshold = l_shl(threshold, 2);
    }

    let k_mod = re8_coord(y);

    // Two refinement steps: up on failure, down after a success
    let mut best = None;
    for _ in 0..2 {
        match try_order(y, &k_mod, r) {
            Some(d) => {
                best = Some(d);
                if r == 1 {
                    break;
                }
                r -= 1;
            }
            None if r < MAX_VORONOI_ORDER => r += 1,
            None => break,
        }
    }

    if best.is_none() {
        while r <= MAX_VORONOI_ORDER && best.is_none() {
            best = try_order(y, &k_mod, r);
            r += 1;
        }
    }

    best
}

/// Lattice code of an RE8 point.
///
/// A point with no representation inside the supported orders is coded as
/// the zero vector.
pub fn re8_cod(y: &Subvector) -> LatticeCode {
    let Some(d) = re8_vor(y) else {
        warn!("RE8 point {:?} exceeds the largest codebook, coded as zero", y);
        return LatticeCode::ZERO;
    };

    let base_index = match d.class {
        LeaderClass::Leader(ka) => compute_base_index(&d.c, ka),
        _ => 0,
    };

    trace!(
        "re8_cod: order={} index={} voronoi={:?}",
        d.order,
        base_index,
        d.k
    );

    LatticeCode {
        order: d.order,
        base_index,
        voronoi: d.k,
    }
}

/// Rebuild an RE8 point from its lattice code.
///
/// Returns `None` for orders that do not exist or base indices outside
/// every class.
pub fn re8_dec(code: &LatticeCode) -> Option<Subvector> {
    let order = code.order;
    if order == 0 {
        return Some([0; DIM]);
    }
    if order == 1 || order > MAX_CODEBOOK_ORDER {
        return None;
    }

    let c = decode_base_index(base_order(order), code.base_index)?;
    let r = voronoi_order(order);
    if r == 0 {
        return Some(c);
    }

    let mut k = [0 as Word32; DIM];
    for (ki, &d) in k.iter_mut().zip(code.voronoi.iter()) {
        *ki = d as Word32;
    }
    let v = re8_k2y(&k, r);

    let mut y = [0; DIM];
    for i in 0..DIM {
        y[i] = saturate(((c[i] as Word32) << r) + v[i]);
    }
    Some(y)
}
