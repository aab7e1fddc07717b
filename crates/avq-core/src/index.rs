//! Base Index Encoding
//!
//! A codevector of class `ka` is a signed permutation of the absolute
//! leader `DA_LEADERS[ka]`. Its base index separates the two:
//!
//! ```text
//! I = DA_IS[ka] + position_code · 2^sign_bits + sign_code
//! ```
//!
//! The position code is built level by level, from the largest magnitude
//! of the leader to the smallest. At each level the positions holding that
//! magnitude are ranked as a subset of the slots still free, and the rank
//! is appended in mixed radix `C(free, count)`. The smallest magnitude takes
//! whatever is left, so it costs nothing.
//!
//! Sign bits are written MSB first in coordinate order, one per nonzero
//! coordinate. Odd leaders have no zeros and skip the last coordinate: its
//! sign follows from the lattice parity `Σy ≡ 0 (mod 4)`.

use once_cell::sync::Lazy;

use crate::tables::{DA_CARD, DA_IS, DA_LEADERS, DA_NQ, DA_SIGN_BITS, NB_LEADER, SELECT_TABLE};
use crate::types::{Subvector, Word16, Word32, DIM};

/// Classes reachable in each base codebook, indexed by codebook number
static CODEBOOK_CLASSES: Lazy<[Vec<usize>; 5]> = Lazy::new(|| {
    let members = |accept: &dyn Fn(u16) -> bool| -> Vec<usize> {
        (0..NB_LEADER).filter(|&ka| accept(DA_NQ[ka])).collect()
    };
    [
        Vec::new(),
        Vec::new(),
        members(&|nq| nq == 2),
        members(&|nq| nq <= 3),
        members(&|nq| nq == 4),
    ]
});

/// Distinct magnitudes of a leader, largest first, with multiplicities
#[derive(Debug, Clone, Copy)]
struct Levels {
    values: [Word16; DIM],
    counts: [usize; DIM],
    len: usize,
}

impl Levels {
    fn of(ka: usize) -> Self {
        let mut levels = Levels {
            values: [0; DIM],
            counts: [0; DIM],
            len: 0,
        };
        for &v in DA_LEADERS[ka].iter() {
            if levels.len > 0 && levels.values[levels.len - 1] == v {
                levels.counts[levels.len - 1] += 1;
            } else {
                levels.values[levels.len] = v;
                levels.counts[levels.len] = 1;
                levels.len += 1;
            }
        }
        levels
    }
}

/// Ordered set of coordinates not yet assigned to a magnitude level
#[derive(Debug, Clone, Copy)]
struct FreeSlots {
    slots: [usize; DIM],
    len: usize,
}

impl FreeSlots {
    fn all() -> Self {
        FreeSlots {
            slots: [0, 1, 2, 3, 4, 5, 6, 7],
            len: DIM,
        }
    }

    /// Remove the slots at the given (increasing) indices
    fn take(&mut self, picked: &[usize]) {
        let mut kept = 0;
        let mut next = 0;
        for i in 0..self.len {
            if next < picked.len() && picked[next] == i {
                next += 1;
            } else {
                self.slots[kept] = self.slots[i];
                kept += 1;
            }
        }
        self.len = kept;
    }
}

#[inline]
fn choose(n: usize, k: usize) -> u32 {
    SELECT_TABLE[k][n]
}

/// Build the per-codebook class lists ahead of the first decode
pub fn init_tables() {
    Lazy::force(&CODEBOOK_CLASSES);
}

/// Lexicographic rank of an increasing subset `pos` of `0..slots`
pub fn rank_positions(pos: &[usize], slots: usize) -> u32 {
    let k = pos.len();
    let mut rank = 0;
    let mut first_free = 0;
    for (i, &p) in pos.iter().enumerate() {
        rank += choose(slots - first_free, k - i) - choose(slots - p, k - i);
        first_free = p + 1;
    }
    rank
}

/// Inverse of [`rank_positions`]: fill `pos` with the subset of rank `rank`
pub fn unrank_positions(mut rank: u32, slots: usize, pos: &mut [usize]) {
    let k = pos.len();
    let mut q = 0;
    for i in 0..k {
        loop {
            let skipped = choose(slots - 1 - q, k - 1 - i);
            if rank < skipped {
                break;
            }
            rank -= skipped;
            q += 1;
        }
        pos[i] = q;
        q += 1;
    }
}

/// Base index of `c`, a member of leader class `ka`
pub fn compute_base_index(c: &Subvector, ka: usize) -> u32 {
    debug_assert!(ka < NB_LEADER);
    let odd = DA_LEADERS[ka][0] & 1 == 1;

    // Sign code
    let signed = if odd { DIM - 1 } else { DIM };
    let mut sign_code: u32 = 0;
    for &v in c[..signed].iter().filter(|&&v| v != 0) {
        sign_code = (sign_code << 1) | (v < 0) as u32;
    }

    // Position code, level by level
    let levels = Levels::of(ka);
    let mut free = FreeSlots::all();
    let mut position_code: u32 = 0;
    for level in 0..levels.len - 1 {
        let mut picked = [0usize; DIM];
        let mut n = 0;
        for i in 0..free.len {
            if c[free.slots[i]].abs() == levels.values[level] {
                picked[n] = i;
                n += 1;
            }
        }
        debug_assert_eq!(n, levels.counts[level]);

        position_code = position_code * choose(free.len, n) + rank_positions(&picked[..n], free.len);
        free.take(&picked[..n]);
    }

    DA_IS[ka] + (position_code << DA_SIGN_BITS[ka]) + sign_code
}

/// Class of base index `index` in codebook 2, 3 or 4, with the rank inside
/// the class
fn find_class(codebook: u16, index: u32) -> Option<(usize, u32)> {
    let classes = CODEBOOK_CLASSES.get(codebook as usize)?;
    let ka = classes
        .iter()
        .copied()
        .filter(|&ka| DA_IS[ka] <= index)
        .max_by_key(|&ka| DA_IS[ka])?;
    let rel = index - DA_IS[ka];
    (rel < DA_CARD[ka]).then_some((ka, rel))
}

/// Codevector of base index `index` in codebook 2, 3 or 4.
///
/// Returns `None` when no class holds the index (the unused tail of Q4, or
/// an unknown codebook).
pub fn decode_base_index(codebook: u16, index: u32) -> Option<Subvector> {
    let (ka, rel) = find_class(codebook, index)?;
    let sign_bits = DA_SIGN_BITS[ka];
    let mut position_code = rel >> sign_bits;
    let sign_code = rel & ((1 << sign_bits) - 1);

    // Split the mixed-radix position code, last level first
    let levels = Levels::of(ka);
    let mut ranks = [0u32; DIM];
    let mut free_len = DIM;
    let mut radices = [1u32; DIM];
    for level in 0..levels.len - 1 {
        radices[level] = choose(free_len, levels.counts[level]);
        free_len -= levels.counts[level];
    }
    for level in (0..levels.len - 1).rev() {
        ranks[level] = position_code % radices[level];
        position_code /= radices[level];
    }

    let mut c: Subvector = [levels.values[levels.len - 1]; DIM];
    let mut free = FreeSlots::all();
    for level in 0..levels.len - 1 {
        let mut picked = [0usize; DIM];
        let n = levels.counts[level];
        unrank_positions(ranks[level], free.len, &mut picked[..n]);
        for &i in picked[..n].iter() {
            c[free.slots[i]] = levels.values[level];
        }
        free.take(&picked[..n]);
    }

    // Apply signs, MSB first over the signed nonzero coordinates
    let odd = levels.values[0] & 1 == 1;
    let signed = if odd { DIM - 1 } else { DIM };
    let mut bit = sign_bits;
    for v in c[..signed].iter_mut().filter(|v| **v != 0) {
        bit -= 1;
        if (sign_code >> bit) & 1 == 1 {
            *v = -*v;
        }
    }
    if odd {
        let sum: Word32 = c.iter().map(|&v| v as Word32).sum();
        if sum & 3 != 0 {
            c[DIM - 1] = -c[DIM - 1];
        }
    }

    Some(c)
}
