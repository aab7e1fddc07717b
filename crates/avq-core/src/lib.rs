//! # AVQ-Core: RE8 Algebraic Vector Quantization
//!
//! This library implements the algebraic vector quantizer of a super-wideband
//! extension codec: spectral coefficients are grouped into 8-dimensional
//! sub-vectors, scaled by a gain chosen for the group's bit budget, rounded
//! to the RE8 lattice and written as unary-coded codebook orders, base
//! indices and Voronoi digits.
//!
//! ## Features
//!
//! - **Gain search**: 10-step bisection on a logarithmic gain offset
//! - **RE8 indexing**: absolute-leader classification, combinatorial base
//!   indices for the Q2, Q3 and Q4 codebooks, Voronoi extension above
//! - **Budgeted multiplexing**: sub-vectors that overflow the budget degrade
//!   to the zero codebook
//! - **G.192 bitstreams**: soft-bit sinks and sources, frames, packing
//! - **Fixed point**: ITU-T basic operators, bit-exact and saturating
//!
//! ## Usage
//!
//! ```rust
//! use avq_core::{AvqCodec, AvqConfig};
//!
//! // Four sub-vectors sharing 80 bits, coefficients in Q3
//! let codec = AvqCodec::new(AvqConfig::new(80, 4))?;
//!
//! let coeffs = vec![24i16; 32];
//! let encoded = codec.encode(&coeffs)?;
//! assert_eq!(encoded.bits.len(), 80);
//!
//! let decoded = codec.decode(&encoded.bits)?;
//! assert_eq!(decoded.coeffs(), encoded.quantized.coeffs());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_range_loop)]

pub mod basic_ops;
pub mod classifier;
pub mod codec;
pub mod error;
pub mod g192;
pub mod index;
pub mod lattice;
pub mod mux;
pub mod quantizer;
pub mod tables;
pub mod types;
pub mod voronoi;

#[cfg(test)]
mod tests;

// Re-export commonly used types and functions
pub use codec::{AvqCodec, EncodedGroup};
pub use error::{AvqError, Result};
pub use g192::{BitSink, BitSource, G192Frame, SoftBitReader, SoftBitWriter};
pub use lattice::round_to_re8;
pub use quantizer::quantize_group;
pub use types::{
    AvqConfig, DemuxedGroup, LatticeCode, LeaderClass, QuantizedGroup, Subvector, Word16, Word32,
};

/// Version information for the AVQ library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the AVQ library
///
/// Installs a `tracing` subscriber if none is set and builds the derived
/// codebook tables. It's safe to call multiple times.
pub fn init() -> Result<()> {
    // Initialize logging if not already done
    let _ = tracing_subscriber::fmt::try_init();

    index::init_tables();

    tracing::info!("AVQ-Core v{} initialized", VERSION);

    Ok(())
}
