//! End-to-end test suite for avq-core
//!
//! Scenario tests crossing the quantizer, the lattice indexer, the
//! multiplexer and the G.192 layer.

use crate::codec::AvqCodec;
use crate::g192::{g192_to_hard_bits, BitSink, SoftBitReader, SoftBitWriter};
use crate::index::decode_base_index;
use crate::mux;
use crate::types::*;

/// Common test utilities
pub mod utils {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Deterministic generator for reproducible failures
    pub fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// Random codevector of base codebook 2, 3 or 4
    pub fn random_base_point(rng: &mut StdRng, codebook: u16) -> Subvector {
        let size = match codebook {
            2 => 256,
            3 => 4096,
            _ => 65360,
        };
        loop {
            if let Some(c) = decode_base_index(codebook, rng.gen_range(0..size)) {
                return c;
            }
        }
    }

    /// Random spectral group in Q3 with a decaying envelope
    pub fn random_group(rng: &mut StdRng, nsv: usize, peak: i16) -> Vec<Word16> {
        (0..nsv * DIM)
            .map(|i| {
                let envelope = (peak as i32 * (nsv * DIM - i) as i32 / (nsv * DIM) as i32) as i16;
                rng.gen_range(-envelope..=envelope)
            })
            .collect()
    }
}

use utils::*;

#[test]
fn test_init() {
    assert!(crate::init().is_ok());
    assert!(crate::init().is_ok());
}

#[test]
fn test_scenario_single_q2_subvector() {
    // Shell 1, codebook Q2, 20-bit budget
    let mut coeffs = [2, 2, 0, 0, 0, 0, 0, 0];
    let mut writer = SoftBitWriter::new(20);
    let unused = mux::encode(&mut coeffs, 20, 1, &mut writer);

    let bits = g192_to_hard_bits(writer.as_slice());
    assert_eq!(bits.len(), 20);
    assert_eq!(&bits[..2], &[1, 0]);
    assert_eq!(mux::calc_bits(2), 9);
    assert_eq!(unused, 10);
    assert!(bits[10..].iter().all(|&b| b == 0));

    let mut reader = SoftBitReader::new(writer.as_slice());
    let group = mux::decode(&mut reader, 20, 1);
    assert_eq!(group.subvector(0), [2, 2, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_scenario_overflow_second_subvector() {
    let mut coeffs = [0; 16];
    coeffs[..8].copy_from_slice(&[4, 2, 2, 0, 0, 0, 0, 0]); // Q3
    coeffs[8..].copy_from_slice(&[3, 3, 1, 1, 1, 1, 1, 1]); // Q4, 19 bits

    let mut writer = SoftBitWriter::new(20);
    mux::encode(&mut coeffs, 20, 2, &mut writer);
    assert_eq!(writer.bits_written(), 20);

    let mut reader = SoftBitReader::new(writer.as_slice());
    let group = mux::decode(&mut reader, 20, 2);
    assert_eq!(group.subvector(0), [4, 2, 2, 0, 0, 0, 0, 0]);
    assert_eq!(group.subvector(1), [0; DIM]);
    assert_eq!(group.bits_read, 16);
}

#[test]
fn test_scenario_trailing_stop_bits_dropped() {
    // A Q3 point takes 15 of 16 bits: the next stop bit fills the budget
    // and the last one is dropped
    let mut coeffs = [0; 24];
    coeffs[..8].copy_from_slice(&[4, 2, 2, 0, 0, 0, 0, 0]);

    let mut writer = SoftBitWriter::new(16);
    let unused = mux::encode(&mut coeffs, 16, 3, &mut writer);
    assert_eq!(unused, 0);
    assert_eq!(writer.bits_written(), 16);

    let bits = g192_to_hard_bits(writer.as_slice());
    assert_eq!(&bits[..3], &[1, 1, 0]);
    assert_eq!(bits[15], 0);

    let mut reader = SoftBitReader::new(writer.as_slice());
    let group = mux::decode(&mut reader, 16, 3);
    assert_eq!(group.subvector(0), [4, 2, 2, 0, 0, 0, 0, 0]);
    assert_eq!(group.subvector(1), [0; DIM]);
    assert_eq!(group.subvector(2), [0; DIM]);
    assert_eq!(group.bits_read, 16);
    assert!(!group.malformed);
}

#[test]
fn test_base_codebooks_round_trip() {
    let mut rng = rng(7);
    for codebook in [2, 3, 4] {
        for _ in 0..200 {
            let y = random_base_point(&mut rng, codebook);
            let mut coeffs = y;
            let mut bits = Vec::new();
            mux::encode(&mut coeffs, 40, 1, &mut bits);
            assert_eq!(coeffs, y);

            let mut reader = SoftBitReader::new(&bits);
            let group = mux::decode(&mut reader, 40, 1);
            assert_eq!(group.subvector(0), y);
            assert!(group.orders[0] <= codebook);
        }
    }
}

#[test]
fn test_budget_invariant_random_groups() {
    let mut rng = rng(11);
    for nsv in 1..=NSV_MAX {
        for budget in [nsv, 10 * nsv, 20 * nsv, 37 * nsv] {
            let codec = AvqCodec::new(AvqConfig::new(budget, nsv)).expect("valid config");
            for peak in [40, 400, 4000] {
                let coeffs = random_group(&mut rng, nsv, peak);
                let encoded = codec.encode(&coeffs).expect("encode");
                assert_eq!(encoded.bits.len(), budget);

                // Payload plus the stop bits up to the last coded
                // sub-vector stay within the budget
                let orders = &encoded.quantized.orders[..nsv];
                let payload: usize = orders.iter().map(|&n| mux::calc_bits(n)).sum();
                let stops = orders.iter().rposition(|&n| n > 0).map_or(0, |i| i + 1);
                assert!(payload + stops <= budget);
                assert_eq!(budget.saturating_sub(payload + nsv), encoded.unused_bits);

                let decoded = codec.decode(&encoded.bits).expect("decode");
                assert_eq!(decoded.coeffs(), encoded.quantized.coeffs());
                assert!(!decoded.malformed);
            }
        }
    }
}

#[test]
fn test_more_bits_never_hurt() {
    let mut rng = rng(23);
    let coeffs = random_group(&mut rng, 4, 800);

    let low = AvqCodec::new(AvqConfig::new(40, 4))
        .and_then(|c| c.encode(&coeffs))
        .expect("encode");
    let high = AvqCodec::new(AvqConfig::new(160, 4))
        .and_then(|c| c.encode(&coeffs))
        .expect("encode");

    // A larger budget keeps a finer gain
    assert!(high.quantized.offset <= low.quantized.offset);
    assert!(high.unused_bits < 160);
}
