//! AVQ Group Codec
//!
//! Validating front end over the quantizer and the multiplexer. One
//! [`AvqCodec`] handles groups of a fixed shape: `nsv` sub-vectors sharing
//! `bit_budget` bits. Groups are independent, so batches are processed in
//! parallel.

use rayon::prelude::*;
use tracing::debug;

use crate::error::{AvqError, Result};
use crate::g192::{validate_soft_bits, G192Frame, SoftBitReader, SoftBitWriter};
use crate::mux;
use crate::quantizer::quantize_group;
use crate::types::{AvqConfig, DemuxedGroup, QuantizedGroup, Word16, DIM, GROUP_LEN, NSV_MAX};

/// Result of encoding one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedGroup {
    /// G.192 soft bits, exactly `bit_budget` words
    pub bits: Vec<u16>,
    /// Lattice points as transmitted (sub-vectors that did not fit are zero)
    pub quantized: QuantizedGroup,
    /// Padding bits at the end of the group
    pub unused_bits: usize,
}

/// Encoder and decoder for one group shape
#[derive(Debug, Clone)]
pub struct AvqCodec {
    config: AvqConfig,
}

impl AvqCodec {
    /// Create a codec, validating the configuration
    pub fn new(config: AvqConfig) -> Result<Self> {
        config.validate()?;

        debug!(
            "Created AVQ codec: {} bits, {} sub-vectors, input Q{}",
            config.bit_budget, config.nsv, config.input_q
        );

        Ok(Self { config })
    }

    /// Codec configuration
    pub fn config(&self) -> &AvqConfig {
        &self.config
    }

    /// Quantize and multiplex one group of `nsv * 8` coefficients
    pub fn encode(&self, coeffs: &[Word16]) -> Result<EncodedGroup> {
        let expected = self.config.group_len();
        if coeffs.len() != expected {
            return Err(AvqError::invalid_input_length(expected, coeffs.len()));
        }

        let AvqConfig {
            bit_budget,
            nsv,
            input_q,
        } = self.config;

        let mut quantized = quantize_group(coeffs, input_q, bit_budget, nsv);
        let mut writer = SoftBitWriter::new(bit_budget);
        let unused_bits = mux::encode(&mut quantized.coeffs[..nsv * DIM], bit_budget, nsv, &mut writer);

        // The multiplexer zeroes what did not fit
        for i in 0..nsv {
            if quantized.subvector(i).iter().all(|&v| v == 0) {
                quantized.orders[i] = 0;
            }
        }

        Ok(EncodedGroup {
            bits: writer.into_words(),
            quantized,
            unused_bits,
        })
    }

    /// Demultiplex one group from exactly `bit_budget` soft bits
    pub fn decode(&self, bits: &[u16]) -> Result<DemuxedGroup> {
        let expected = self.config.bit_budget;
        if bits.len() != expected {
            return Err(AvqError::invalid_input_length(expected, bits.len()));
        }
        validate_soft_bits(bits)?;

        let mut reader = SoftBitReader::new(bits);
        Ok(mux::decode(&mut reader, expected, self.config.nsv))
    }

    /// Encode one group into a good G.192 frame
    pub fn encode_frame(&self, coeffs: &[Word16]) -> Result<G192Frame> {
        let encoded = self.encode(coeffs)?;
        Ok(G192Frame::new(encoded.bits, true))
    }

    /// Decode one G.192 frame. An erased frame yields a zero group.
    pub fn decode_frame(&self, frame: &G192Frame) -> Result<DemuxedGroup> {
        frame.validate()?;
        if !frame.is_good_frame {
            debug!("AVQ erased frame, group decoded as zero");
            return Ok(DemuxedGroup {
                nsv: self.config.nsv,
                coeffs: [0; GROUP_LEN],
                orders: [0; NSV_MAX],
                bits_read: 0,
                malformed: false,
            });
        }
        self.decode(&frame.data_bits)
    }

    /// Encode consecutive groups in parallel
    pub fn encode_groups(&self, coeffs: &[Word16]) -> Result<Vec<EncodedGroup>> {
        let group_len = self.config.group_len();
        if coeffs.len() % group_len != 0 {
            return Err(AvqError::invalid_input_length(
                (coeffs.len() / group_len + 1) * group_len,
                coeffs.len(),
            ));
        }

        coeffs
            .par_chunks(group_len)
            .map(|group| self.encode(group))
            .collect()
    }

    /// Decode consecutive groups of `bit_budget` soft bits in parallel
    pub fn decode_groups(&self, bits: &[u16]) -> Result<Vec<DemuxedGroup>> {
        let budget = self.config.bit_budget;
        if bits.len() % budget != 0 {
            return Err(AvqError::invalid_input_length(
                (bits.len() / budget + 1) * budget,
                bits.len(),
            ));
        }

        bits.par_chunks(budget)
            .map(|group| self.decode(group))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::g192::{G192_ONE, G192_ZERO};

    fn codec(bit_budget: usize, nsv: usize) -> AvqCodec {
        AvqCodec::new(AvqConfig::new(bit_budget, nsv)).expect("valid config")
    }

    #[test]
    fn test_codec_creation() {
        let codec = AvqCodec::new(AvqConfig::default());
        assert!(codec.is_ok());

        assert!(matches!(
            AvqCodec::new(AvqConfig::new(40, 0)),
            Err(AvqError::InvalidSubvectorCount { nsv: 0 })
        ));
        assert!(AvqCodec::new(AvqConfig::new(0, 2)).is_err());
    }

    #[test]
    fn test_encode_decode_lattice_point() {
        let codec = codec(20, 1);
        let coeffs = [2 << 3, 2 << 3, 0, 0, 0, 0, 0, 0];
        let encoded = codec.encode(&coeffs).expect("encode");
        assert_eq!(encoded.bits.len(), 20);
        assert_eq!(encoded.unused_bits, 10);
        assert_eq!(encoded.quantized.orders[0], 2);

        let decoded = codec.decode(&encoded.bits).expect("decode");
        assert_eq!(decoded.coeffs(), encoded.quantized.coeffs());
    }

    #[test]
    fn test_decoded_matches_transmitted() {
        let codec = codec(48, 4);
        let coeffs: Vec<Word16> = (0..32).map(|i| (i % 7 - 3) * 90).collect();
        let encoded = codec.encode(&coeffs).expect("encode");
        assert_eq!(encoded.bits.len(), 48);

        let decoded = codec.decode(&encoded.bits).expect("decode");
        assert_eq!(decoded.coeffs(), encoded.quantized.coeffs());
        assert_eq!(decoded.orders, encoded.quantized.orders);
        assert!(!decoded.malformed);
    }

    #[test]
    fn test_length_errors() {
        let codec = codec(40, 2);
        assert_eq!(
            codec.encode(&[0; 8]),
            Err(AvqError::InvalidInputLength {
                expected: 16,
                actual: 8
            })
        );
        assert!(codec.decode(&[G192_ZERO; 39]).is_err());

        let mut bits = vec![G192_ZERO; 40];
        bits[5] = 0x0000;
        assert!(matches!(
            codec.decode(&bits),
            Err(AvqError::InvalidSoftBit { position: 5, .. })
        ));
    }

    #[test]
    fn test_frames() {
        let codec = codec(30, 2);
        let coeffs = [16; 16];
        let frame = codec.encode_frame(&coeffs).expect("encode");
        assert!(frame.is_good_frame);
        assert_eq!(frame.frame_length, 30);

        let decoded = codec.decode_frame(&frame).expect("decode");
        let direct = codec.decode(&frame.data_bits).expect("decode");
        assert_eq!(decoded, direct);

        let erased = G192Frame::erased(30);
        let decoded = codec.decode_frame(&erased).expect("erased frame");
        assert_eq!(decoded.coeffs(), &[0; 16]);
    }

    #[test]
    fn test_parallel_groups_match_sequential() {
        let codec = codec(36, 2);
        let coeffs: Vec<Word16> = (0..16 * 6).map(|i| ((i * 13) % 29 - 14) * 25).collect();

        let encoded = codec.encode_groups(&coeffs).expect("encode groups");
        assert_eq!(encoded.len(), 6);
        for (group, chunk) in encoded.iter().zip(coeffs.chunks(16)) {
            assert_eq!(group, &codec.encode(chunk).expect("encode"));
        }

        let bits: Vec<u16> = encoded.iter().flat_map(|g| g.bits.iter().copied()).collect();
        let decoded = codec.decode_groups(&bits).expect("decode groups");
        for (group, enc) in decoded.iter().zip(encoded.iter()) {
            assert_eq!(group.coeffs(), enc.quantized.coeffs());
        }

        assert!(codec.encode_groups(&coeffs[..20]).is_err());
        assert!(codec.decode_groups(&[G192_ONE; 35]).is_err());
    }
}
