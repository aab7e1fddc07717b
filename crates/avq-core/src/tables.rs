//! AVQ Tables and Constants
//!
//! Immutable tables of the RE8 lattice codebooks: the absolute leaders of
//! Q2, Q3 and Q4, their `(shell, quartic)` signatures, per-class index
//! offsets, the binomial select table used by the position ranker, and the
//! interpolation tables of the fixed-point `log2`/`pow2` operators.
//!
//! Leader classes are numbered `ka = 0..NB_LEADER` in increasing order of
//! shell number, and by quartic invariant inside a shell. Every leader of a
//! shell has a distinct invariant, so `(shell, id)` identifies the class.

use crate::types::Word16;

/// Number of absolute leaders covering Q2 ∪ Q3 ∪ Q4
pub const NB_LEADER: usize = 25;

/// Absolute leaders, magnitudes sorted in decreasing order
pub const DA_LEADERS: [[Word16; 8]; NB_LEADER] = [
    [1, 1, 1, 1, 1, 1, 1, 1], // shell 1
    [2, 2, 0, 0, 0, 0, 0, 0],
    [2, 2, 2, 2, 0, 0, 0, 0], // shell 2
    [3, 1, 1, 1, 1, 1, 1, 1],
    [4, 0, 0, 0, 0, 0, 0, 0],
    [2, 2, 2, 2, 2, 2, 0, 0], // shell 3
    [3, 3, 1, 1, 1, 1, 1, 1],
    [4, 2, 2, 0, 0, 0, 0, 0],
    [2, 2, 2, 2, 2, 2, 2, 2], // shell 4
    [3, 3, 3, 1, 1, 1, 1, 1],
    [4, 2, 2, 2, 2, 0, 0, 0],
    [4, 4, 0, 0, 0, 0, 0, 0],
    [5, 1, 1, 1, 1, 1, 1, 1],
    [3, 3, 3, 3, 1, 1, 1, 1], // shell 5
    [4, 2, 2, 2, 2, 2, 2, 0],
    [4, 4, 2, 2, 0, 0, 0, 0],
    [5, 3, 1, 1, 1, 1, 1, 1],
    [6, 2, 0, 0, 0, 0, 0, 0],
    [3, 3, 3, 3, 3, 1, 1, 1], // shell 6
    [4, 4, 4, 0, 0, 0, 0, 0],
    [6, 2, 2, 2, 0, 0, 0, 0],
    [8, 0, 0, 0, 0, 0, 0, 0], // shell 8
    [3, 3, 3, 3, 3, 3, 3, 3], // shell 9
    [6, 6, 0, 0, 0, 0, 0, 0],
    [8, 4, 0, 0, 0, 0, 0, 0], // shell 10
];

/// Quartic invariant `Σy⁴/8` of each leader
pub const DA_ID: [u16; NB_LEADER] = [
    1, 4, 8, 11, 32, 12, 21, 36, 16, 31, 40, 64, 79, 41, 44, 68, 89, 164, 51, 96, 168, 512, 81,
    324, 544,
];

/// Number of leaders on each shell `s = 1..=32` (indexed by `s - 1`)
pub const DA_NB: [u16; 32] = [
    2, 3, 3, 5, 5, 3, 0, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// First leader of each shell `s = 1..=32` (indexed by `s - 1`)
pub const DA_POS: [u16; 32] = [
    0, 2, 5, 8, 13, 18, 21, 21, 22, 24, 25, 25, 25, 25, 25, 25, 25, 25, 25, 25, 25, 25, 25, 25,
    25, 25, 25, 25, 25, 25, 25, 25,
];

/// Base codebook of each leader (2, 3 or 4).
///
/// Q3 contains Q2, so a class tagged 2 is also reachable in codebook 3.
pub const DA_NQ: [u16; NB_LEADER] = [
    2, 2, 3, 3, 2, 4, 4, 3, 4, 4, 4, 3, 4, 4, 4, 4, 4, 3, 4, 4, 4, 3, 4, 4, 4,
];

/// Offset of each class inside its codebook index space
pub const DA_IS: [u32; NB_LEADER] = [
    0, 128, 256, 1376, 240, 0, 1792, 2400, 5376, 5632, 12800, 3744, 21760, 22784, 31744, 38912,
    45632, 3856, 52800, 59968, 60416, 4080, 64896, 65024, 65136,
];

/// Number of codevectors in each class (permutations times sign patterns)
pub const DA_CARD: [u32; NB_LEADER] = [
    128, 112, 1120, 1024, 16, 1792, 3584, 1344, 256, 7168, 8960, 112, 1024, 8960, 7168, 6720, 7168,
    224, 7168, 448, 4480, 16, 128, 112, 224,
];

/// Number of explicit sign bits of each class.
///
/// Even leaders carry one bit per nonzero coordinate. Odd leaders carry
/// seven; the last sign follows from `Σy ≡ 0 (mod 4)`.
pub const DA_SIGN_BITS: [u16; NB_LEADER] = [
    7, 2, 4, 7, 1, 6, 7, 3, 8, 7, 5, 2, 7, 7, 7, 4, 7, 2, 7, 3, 4, 1, 7, 2, 2,
];

/// Binomial coefficients `SELECT_TABLE[k][n] = C(n, k)` for `n, k ≤ 8`
pub const SELECT_TABLE: [[u32; 9]; 9] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 1, 2, 3, 4, 5, 6, 7, 8],
    [0, 0, 1, 3, 6, 10, 15, 21, 28],
    [0, 0, 0, 1, 4, 10, 20, 35, 56],
    [0, 0, 0, 0, 1, 5, 15, 35, 70],
    [0, 0, 0, 0, 0, 1, 6, 21, 56],
    [0, 0, 0, 0, 0, 0, 1, 7, 28],
    [0, 0, 0, 0, 0, 0, 0, 1, 8],
    [0, 0, 0, 0, 0, 0, 0, 0, 1],
];

// ================ LOG2 / POW2 TABLES ================

/// `log2(1 + i/32)` in Q15, `i = 0..=32`
pub const TAB_LOG: [Word16; 33] = [
    0, 1455, 2866, 4236, 5568, 6863, 8124, 9352, 10549, 11716, 12855, 13967, 15054, 16117, 17156,
    18172, 19167, 20142, 21097, 22033, 22951, 23852, 24735, 25603, 26455, 27291, 28113, 28922,
    29716, 30497, 31266, 32023, 32767,
];

/// `2^(i/32)` in Q14, `i = 0..=32`
pub const TAB_POW: [Word16; 33] = [
    16384, 16743, 17109, 17484, 17867, 18258, 18658, 19066, 19484, 19911, 20347, 20792, 21247,
    21713, 22188, 22674, 23170, 23678, 24196, 24726, 25268, 25821, 26386, 26964, 27554, 28158,
    28774, 29405, 30048, 30706, 31379, 32066, 32767,
];
