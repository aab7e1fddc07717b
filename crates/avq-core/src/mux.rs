//! AVQ Bitstream Multiplexing
//!
//! Each sub-vector of a group is written as
//!
//! ```text
//! 1 1 ... 1  0  | base index (4n' bits) | 8 Voronoi digits (r bits each)
//! `-(n-1)-´ stop
//! ```
//!
//! The zero vector is the lone stop bit. A sub-vector of order `n` costs
//! `5n` bits in total, that is `5n - 1` more than the zero code.
//!
//! Sub-vectors are granted their bits in decreasing order of cost; one
//! that no longer fits after the larger ones is replaced by the zero
//! vector. Zero sub-vectors behind the last coded one may lose their stop
//! bit when the budget runs out exactly: the decoder reads the end of the
//! budget as order 0. Unused bits at the end of the group are zero padded.

use tracing::{debug, trace, warn};

use crate::g192::{BitSink, BitSource};
use crate::types::{
    DemuxedGroup, LatticeCode, Subvector, Word16, DIM, GROUP_LEN, MAX_CODEBOOK_ORDER, NSV_MAX,
};
use crate::voronoi::{re8_cod, re8_dec};

/// Bits needed by order `n` on top of the one-bit zero code
#[inline]
pub fn calc_bits(order: u16) -> usize {
    if order == 0 {
        0
    } else {
        5 * order as usize - 1
    }
}

/// Indices of `values` by decreasing value; the leftmost wins ties
pub fn sort_by_cost(values: &[usize], order: &mut [usize]) {
    debug_assert!(values.len() <= NSV_MAX && order.len() >= values.len());

    let mut taken = [false; NSV_MAX];
    for slot in order.iter_mut().take(values.len()) {
        let mut best: Option<usize> = None;
        for (i, &v) in values.iter().enumerate() {
            if taken[i] {
                continue;
            }
            if best.map_or(true, |b| v > values[b]) {
                best = Some(i);
            }
        }
        // At least one index is left on every pass
        let b = best.unwrap_or_default();
        taken[b] = true;
        *slot = b;
    }
}

fn subvector(coeffs: &[Word16], i: usize) -> Subvector {
    let mut y = [0; DIM];
    y.copy_from_slice(&coeffs[i * DIM..(i + 1) * DIM]);
    y
}

/// Multiplex `nsv` lattice points into exactly `bit_budget` bits.
///
/// Sub-vectors that do not fit are zeroed in `coeffs`. Returns the number of
/// padding bits.
pub fn encode<S: BitSink>(
    coeffs: &mut [Word16],
    bit_budget: usize,
    nsv: usize,
    sink: &mut S,
) -> usize {
    debug_assert!((1..=NSV_MAX).contains(&nsv));
    debug_assert!(bit_budget > 0);
    debug_assert!(coeffs.len() >= nsv * DIM);

    let mut codes = [LatticeCode::ZERO; NSV_MAX];
    let mut costs = [0usize; NSV_MAX];
    for i in 0..nsv {
        codes[i] = re8_cod(&subvector(coeffs, i));
        costs[i] = calc_bits(codes[i].order);
    }

    let mut sorted = [0usize; NSV_MAX];
    sort_by_cost(&costs[..nsv], &mut sorted[..nsv]);

    // Stop bits are reserved up to the last accepted nonzero sub-vector;
    // the ones after it may lose theirs to the end of the budget
    let mut used = 0;
    let mut stop_bits = 0;
    for &i in &sorted[..nsv] {
        if codes[i].order == 0 {
            // Unencodable points go out as zero too
            coeffs[i * DIM..(i + 1) * DIM].fill(0);
            continue;
        }
        let stops = stop_bits.max(i + 1);
        if used + costs[i] + stops > bit_budget {
            debug!(
                "AVQ sub-vector {} (order {}, {} bits) exceeds the budget, coded as zero",
                i, codes[i].order, costs[i]
            );
            codes[i] = LatticeCode::ZERO;
            coeffs[i * DIM..(i + 1) * DIM].fill(0);
        } else {
            used += costs[i];
            stop_bits = stops;
        }
    }

    let mut bits_left = bit_budget;
    let mut overflow = false;
    for (i, code) in codes.iter().take(nsv).enumerate() {
        let ones = code.order.saturating_sub(1) as usize;
        for _ in 0..ones {
            sink.write_bit(true);
        }
        bits_left -= ones;

        // No room left for the stop bit: the decoder infers it from the end
        // of the budget, here and for every following sub-vector
        if overflow || bits_left == 0 {
            overflow = true;
        } else {
            sink.write_bit(false);
            bits_left -= 1;
        }

        if code.order > 0 {
            sink.write_value(code.base_index, code.index_bits());
            let r = code.voronoi_order() as usize;
            if r > 0 {
                for &digit in code.voronoi.iter() {
                    sink.write_value(digit as u32, r);
                }
            }
            bits_left -= code.index_bits() + code.voronoi_bits();
        }

        trace!(
            "AVQ mux: sub-vector {} order={} index={} bits_left={}",
            i,
            code.order,
            code.base_index,
            bits_left
        );
    }

    for _ in 0..bits_left {
        sink.write_bit(false);
    }
    bits_left
}

/// Bit source limited to the group budget
struct BudgetedSource<'s, S: BitSource> {
    source: &'s mut S,
    left: usize,
    starved: bool,
}

impl<S: BitSource> BudgetedSource<'_, S> {
    fn read_bit(&mut self) -> Option<bool> {
        if self.left == 0 {
            return None;
        }
        match self.source.read_bit() {
            Some(bit) => {
                self.left -= 1;
                Some(bit)
            }
            None => {
                self.starved = true;
                self.left = 0;
                None
            }
        }
    }

    fn read_value(&mut self, num_bits: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..num_bits {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Some(value)
    }
}

/// Read one sub-vector code. `Err(())` marks a stream that cannot be
/// parsed any further.
fn read_code<S: BitSource>(source: &mut BudgetedSource<'_, S>) -> Result<LatticeCode, ()> {
    let mut ones: u16 = 0;
    while let Some(true) = source.read_bit() {
        ones = ones.saturating_add(1);
    }
    let order = if ones == 0 { 0 } else { ones.saturating_add(1) };
    if order > MAX_CODEBOOK_ORDER {
        return Err(());
    }

    let mut code = LatticeCode {
        order,
        ..LatticeCode::ZERO
    };
    if order == 0 {
        return Ok(code);
    }

    code.base_index = source.read_value(code.index_bits()).ok_or(())?;
    let r = code.voronoi_order() as usize;
    if r > 0 {
        for digit in code.voronoi.iter_mut() {
            *digit = source.read_value(r).ok_or(())? as u16;
        }
    }
    Ok(code)
}

/// Demultiplex a group of `nsv` sub-vectors from `bit_budget` bits.
///
/// Malformed streams decode best effort: a nonexistent class yields a zero
/// sub-vector, an unparsable code zeroes the rest of the group.
pub fn decode<S: BitSource>(source: &mut S, bit_budget: usize, nsv: usize) -> DemuxedGroup {
    debug_assert!((1..=NSV_MAX).contains(&nsv));

    let mut group = DemuxedGroup {
        nsv,
        coeffs: [0; GROUP_LEN],
        orders: [0; NSV_MAX],
        bits_read: 0,
        malformed: false,
    };

    let mut source = BudgetedSource {
        source,
        left: bit_budget,
        starved: false,
    };

    for i in 0..nsv {
        let Ok(code) = read_code(&mut source) else {
            warn!(
                "AVQ demux: malformed code for sub-vector {} of {}, rest of group zeroed",
                i, nsv
            );
            group.malformed = true;
            break;
        };

        match re8_dec(&code) {
            Some(y) => {
                group.coeffs[i * DIM..(i + 1) * DIM].copy_from_slice(&y);
                group.orders[i] = code.order;
            }
            None => {
                warn!(
                    "AVQ demux: no codevector for order {} index {}, sub-vector {} zeroed",
                    code.order, code.base_index, i
                );
            }
        }

        trace!(
            "AVQ demux: sub-vector {} order={} index={}",
            i,
            code.order,
            code.base_index
        );
    }

    group.bits_read = bit_budget - source.left;

    // Skip the padding
    while source.read_bit().is_some() {}

    if source.starved {
        warn!("AVQ demux: bit source shorter than the {} bit budget", bit_budget);
        group.malformed = true;
    }

    group
}
