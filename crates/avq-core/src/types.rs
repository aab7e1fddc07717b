//! AVQ Types and Constants
//!
//! This module defines the fixed-point word types, the dimensioning constants
//! and the value types exchanged between the quantizer, the lattice indexer
//! and the bit multiplexer.

use crate::error::{AvqError, Result};

/// 16-bit word type (equivalent to ITU Word16)
pub type Word16 = i16;

/// 32-bit word type (equivalent to ITU Word32)
pub type Word32 = i32;

/// Dimension of one lattice sub-vector
pub const DIM: usize = 8;

/// Maximum number of sub-vectors quantized together
pub const NSV_MAX: usize = 4;

/// Coefficient capacity of one group buffer
pub const GROUP_LEN: usize = NSV_MAX * DIM;

/// Largest RE8 shell number searched by the leader classifier
pub const NB_SPHERE: Word32 = 32;

/// Largest Voronoi extension order `r` (digits are `r` bits wide)
pub const MAX_VORONOI_ORDER: u16 = 15;

/// Largest codebook order `n = 4 + 2r` the bitstream can carry
pub const MAX_CODEBOOK_ORDER: u16 = 4 + 2 * MAX_VORONOI_ORDER;

/// Default input format of the quantizer (Q-format of the coefficients)
pub const DEFAULT_INPUT_Q: Word16 = 3;

/// Largest accepted input Q-format
pub const MAX_INPUT_Q: Word16 = 14;

/// One 8-dimensional sub-vector
pub type Subvector = [Word16; DIM];

/// Class of an integer point with respect to the absolute-leader table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaderClass {
    /// The all-zero vector (codebook Q0)
    Zero,
    /// Index `ka` into the absolute-leader tables
    Leader(usize),
    /// Not a leader of Q2, Q3 or Q4
    Outlier,
}

impl LeaderClass {
    /// Base codebook number of the class: `Some(0 | 2 | 3 | 4)`, or `None`
    /// for outliers.
    pub fn codebook(self) -> Option<u16> {
        match self {
            Self::Zero => Some(0),
            Self::Leader(ka) => Some(crate::tables::DA_NQ[ka]),
            Self::Outlier => None,
        }
    }
}

/// Lattice code of one sub-vector: codebook order, base index and
/// Voronoi index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LatticeCode {
    /// Codebook order `n` (0, 2, 3, 4, or `n' + 2r`)
    pub order: u16,
    /// Base index `I` of the base codevector
    pub base_index: u32,
    /// Voronoi digits, meaningful only when `order > 4`
    pub voronoi: [u16; DIM],
}

impl LatticeCode {
    /// Code of the all-zero vector
    pub const ZERO: LatticeCode = LatticeCode {
        order: 0,
        base_index: 0,
        voronoi: [0; DIM],
    };

    /// Base codebook `n'` (2, 3 or 4), 0 for the zero codebook
    pub fn base_order(&self) -> u16 {
        base_order(self.order)
    }

    /// Voronoi order `r` (0 when no extension is used)
    pub fn voronoi_order(&self) -> u16 {
        voronoi_order(self.order)
    }

    /// Number of base index bits
    pub fn index_bits(&self) -> usize {
        4 * self.base_order() as usize
    }

    /// Number of Voronoi digit bits
    pub fn voronoi_bits(&self) -> usize {
        DIM * self.voronoi_order() as usize
    }

    /// Bits written for this sub-vector (unary code, stop bit and payload)
    pub fn total_bits(&self) -> usize {
        if self.order == 0 {
            1
        } else {
            5 * self.order as usize
        }
    }
}

/// Base codebook `n'` of an order `n`
pub fn base_order(order: u16) -> u16 {
    if order <= 4 {
        order
    } else if order % 2 == 0 {
        4
    } else {
        3
    }
}

/// Voronoi order `r` of an order `n`
pub fn voronoi_order(order: u16) -> u16 {
    if order <= 4 {
        0
    } else {
        (order - base_order(order)) / 2
    }
}

/// Output of the gain search for one group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizedGroup {
    /// Number of sub-vectors in the group
    pub nsv: usize,
    /// Lattice points, `nsv * 8` meaningful entries
    pub coeffs: [Word16; GROUP_LEN],
    /// Codebook order of each lattice point
    pub orders: [u16; NSV_MAX],
    /// Estimated bits of each sub-vector at unit gain (Q4)
    pub ebits: [Word16; NSV_MAX],
    /// Selected gain offset in bits (Q4)
    pub offset: Word16,
}

impl QuantizedGroup {
    /// Meaningful coefficients
    pub fn coeffs(&self) -> &[Word16] {
        &self.coeffs[..self.nsv * DIM]
    }

    /// Sub-vector `i`
    pub fn subvector(&self, i: usize) -> Subvector {
        let mut y = [0; DIM];
        y.copy_from_slice(&self.coeffs[i * DIM..(i + 1) * DIM]);
        y
    }
}

/// Output of the demultiplexer for one group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemuxedGroup {
    /// Number of sub-vectors in the group
    pub nsv: usize,
    /// Decoded lattice points, `nsv * 8` meaningful entries
    pub coeffs: [Word16; GROUP_LEN],
    /// Decoded codebook orders
    pub orders: [u16; NSV_MAX],
    /// Bits read before the trailing padding
    pub bits_read: usize,
    /// Set when the stream could not be parsed to the end
    pub malformed: bool,
}

impl DemuxedGroup {
    /// Meaningful coefficients
    pub fn coeffs(&self) -> &[Word16] {
        &self.coeffs[..self.nsv * DIM]
    }

    /// Sub-vector `i`
    pub fn subvector(&self, i: usize) -> Subvector {
        let mut y = [0; DIM];
        y.copy_from_slice(&self.coeffs[i * DIM..(i + 1) * DIM]);
        y
    }
}

/// Configuration of one AVQ group codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvqConfig {
    /// Bits available to the whole group
    pub bit_budget: usize,
    /// Number of sub-vectors per group (1 to 4)
    pub nsv: usize,
    /// Q-format of the input coefficients
    pub input_q: Word16,
}

impl Default for AvqConfig {
    fn default() -> Self {
        Self {
            bit_budget: 80,
            nsv: NSV_MAX,
            input_q: DEFAULT_INPUT_Q,
        }
    }
}

impl AvqConfig {
    /// Create a configuration for `nsv` sub-vectors sharing `bit_budget` bits
    pub fn new(bit_budget: usize, nsv: usize) -> Self {
        Self {
            bit_budget,
            nsv,
            ..Self::default()
        }
    }

    /// Set the bit budget
    pub fn with_bit_budget(mut self, bit_budget: usize) -> Self {
        self.bit_budget = bit_budget;
        self
    }

    /// Set the number of sub-vectors
    pub fn with_nsv(mut self, nsv: usize) -> Self {
        self.nsv = nsv;
        self
    }

    /// Set the Q-format of the input coefficients
    pub fn with_input_q(mut self, input_q: Word16) -> Self {
        self.input_q = input_q;
        self
    }

    /// Number of coefficients in one group
    pub fn group_len(&self) -> usize {
        self.nsv * DIM
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.nsv == 0 || self.nsv > NSV_MAX {
            return Err(AvqError::InvalidSubvectorCount { nsv: self.nsv });
        }

        // Widest possible group: every sub-vector at the maximum order
        let max_bits = self.nsv * 5 * MAX_CODEBOOK_ORDER as usize;
        if self.bit_budget == 0 || self.bit_budget > max_bits {
            return Err(AvqError::InvalidBitBudget {
                bits: self.bit_budget,
                max: max_bits,
            });
        }

        if !(0..=MAX_INPUT_Q).contains(&self.input_q) {
            return Err(AvqError::invalid_config(format!(
                "input Q-format {} outside 0..={}",
                self.input_q, MAX_INPUT_Q
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_split() {
        assert_eq!(base_order(0), 0);
        assert_eq!(base_order(2), 2);
        assert_eq!(base_order(4), 4);
        assert_eq!(base_order(5), 3);
        assert_eq!(base_order(6), 4);
        assert_eq!(voronoi_order(5), 1);
        assert_eq!(voronoi_order(6), 1);
        assert_eq!(voronoi_order(9), 3);
        assert_eq!(voronoi_order(MAX_CODEBOOK_ORDER), MAX_VORONOI_ORDER);
    }

    #[test]
    fn test_lattice_code_bits() {
        let code = LatticeCode {
            order: 7,
            ..LatticeCode::ZERO
        };
        assert_eq!(code.index_bits(), 12);
        assert_eq!(code.voronoi_bits(), 16);
        assert_eq!(code.total_bits(), 35);
        assert_eq!(LatticeCode::ZERO.total_bits(), 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(AvqConfig::default().validate().is_ok());
        assert!(AvqConfig::new(20, 1).validate().is_ok());

        assert!(matches!(
            AvqConfig::new(20, 0).validate(),
            Err(AvqError::InvalidSubvectorCount { nsv: 0 })
        ));
        assert!(matches!(
            AvqConfig::new(20, 5).validate(),
            Err(AvqError::InvalidSubvectorCount { nsv: 5 })
        ));
        assert!(matches!(
            AvqConfig::new(0, 2).validate(),
            Err(AvqError::InvalidBitBudget { .. })
        ));
        assert!(AvqConfig::new(20, 2).with_input_q(15).validate().is_err());
    }
}
