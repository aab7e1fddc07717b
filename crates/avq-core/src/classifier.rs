//! Absolute Leader Classification
//!
//! Permutations and sign changes of an absolute leader share the shell
//! number `s = Σy²/8` and the quartic invariant `id = Σy⁴/8`. For the
//! shells covered by the codebooks the pair identifies the leader, so the
//! search is limited to the handful of leaders of one shell.

use crate::basic_ops::{l_mac0, l_shr};
use crate::tables::{DA_ID, DA_NB, DA_POS};
use crate::types::{LeaderClass, Subvector, Word32, NB_SPHERE};

/// Shell number `Σy²/8` (saturating)
pub fn shell_number(y: &Subvector) -> Word32 {
    let energy = y.iter().fold(0, |acc, &v| l_mac0(acc, v, v));
    l_shr(energy, 3)
}

/// Classify an RE8 point against the Q2, Q3 and Q4 leaders
pub fn identify_absolute_leader(y: &Subvector) -> LeaderClass {
    let s = shell_number(y);
    if s == 0 {
        return LeaderClass::Zero;
    }
    if s > NB_SPHERE {
        return LeaderClass::Outlier;
    }

    // |y_i| <= 16 on the searched shells, so the sum fits
    let id: Word32 = y
        .iter()
        .map(|&v| {
            let sq = v as Word32 * v as Word32;
            sq * sq
        })
        .sum::<Word32>()
        >> 3;

    let first = DA_POS[s as usize - 1] as usize;
    let count = DA_NB[s as usize - 1] as usize;
    (first..first + count)
        .find(|&ka| DA_ID[ka] as Word32 == id)
        .map_or(LeaderClass::Outlier, LeaderClass::Leader)
}

/// Base codebook of a class: `Some(0 | 2 | 3 | 4)`, `None` outside
pub fn codebook_of(class: LeaderClass) -> Option<u16> {
    class.codebook()
}
