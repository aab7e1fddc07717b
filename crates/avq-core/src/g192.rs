//! ITU-T G.192 Serial Bitstream
//!
//! The multiplexer emits one 16-bit word per bit, the soft-bit convention of
//! ITU-T G.192: `0x007F` for a zero and `0x0081` for a one. Frames carry a
//! sync word and a length header in front of the soft bits.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{AvqError, Result};

/// Soft bit '0'
pub const G192_ZERO: u16 = 0x007F;

/// Soft bit '1'
pub const G192_ONE: u16 = 0x0081;

/// Good frame sync
pub const G192_SYNC_GOOD: u16 = 0x6B21;

/// Bad frame sync (frame erasure)
pub const G192_SYNC_BAD: u16 = 0x6B20;

/// Soft bit of a hard bit
#[inline]
pub fn soft_bit(bit: bool) -> u16 {
    if bit {
        G192_ONE
    } else {
        G192_ZERO
    }
}

/// Destination of serial bits
pub trait BitSink {
    /// Append one bit
    fn write_bit(&mut self, bit: bool);

    /// Append the `num_bits` low bits of `value`, MSB first
    fn write_value(&mut self, value: u32, num_bits: usize) {
        for i in (0..num_bits).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    /// Bits written so far
    fn bits_written(&self) -> usize;
}

/// Origin of serial bits
pub trait BitSource {
    /// Next bit, `None` once the source is exhausted
    fn read_bit(&mut self) -> Option<bool>;

    /// Read `num_bits` bits MSB first, `None` if the source runs out
    fn read_value(&mut self, num_bits: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..num_bits {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Some(value)
    }

    /// Bits left to read
    fn remaining(&self) -> usize;
}

impl BitSink for Vec<u16> {
    fn write_bit(&mut self, bit: bool) {
        self.push(soft_bit(bit));
    }

    fn bits_written(&self) -> usize {
        self.len()
    }
}

/// Soft-bit sink with a fixed capacity
#[derive(Debug, Clone)]
pub struct SoftBitWriter {
    words: Vec<u16>,
    capacity: usize,
}

impl SoftBitWriter {
    /// Create a writer for at most `capacity` bits
    pub fn new(capacity: usize) -> Self {
        Self {
            words: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of bits
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Soft bits written so far
    pub fn as_slice(&self) -> &[u16] {
        &self.words
    }

    /// Consume the writer, returning the soft bits
    pub fn into_words(self) -> Vec<u16> {
        self.words
    }
}

impl BitSink for SoftBitWriter {
    fn write_bit(&mut self, bit: bool) {
        debug_assert!(self.words.len() < self.capacity, "soft-bit writer overflow");
        if self.words.len() < self.capacity {
            self.words.push(soft_bit(bit));
        }
    }

    fn bits_written(&self) -> usize {
        self.words.len()
    }
}

/// Soft-bit source over a slice.
///
/// A word equal to [`G192_ONE`] reads as 1, any other word as 0.
#[derive(Debug, Clone)]
pub struct SoftBitReader<'a> {
    words: &'a [u16],
    pos: usize,
}

impl<'a> SoftBitReader<'a> {
    /// Create a reader over G.192 soft bits
    pub fn new(words: &'a [u16]) -> Self {
        Self { words, pos: 0 }
    }

    /// Bits consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl BitSource for SoftBitReader<'_> {
    fn read_bit(&mut self) -> Option<bool> {
        let word = *self.words.get(self.pos)?;
        self.pos += 1;
        Some(word == G192_ONE)
    }

    fn remaining(&self) -> usize {
        self.words.len() - self.pos
    }
}

/// Check that every word is a G.192 soft bit
pub fn validate_soft_bits(words: &[u16]) -> Result<()> {
    match words
        .iter()
        .position(|&w| w != G192_ZERO && w != G192_ONE)
    {
        Some(position) => Err(AvqError::InvalidSoftBit {
            position,
            value: words[position],
        }),
        None => Ok(()),
    }
}

/// G.192 Frame structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct G192Frame {
    /// Sync header (0x6B21 for good frame, 0x6B20 for bad frame)
    pub sync_header: u16,
    /// Frame length in bits
    pub frame_length: u16,
    /// Data bits as G.192 soft bits
    pub data_bits: Vec<u16>,
    /// Whether this is a good frame (true) or bad frame (false)
    pub is_good_frame: bool,
}

impl G192Frame {
    /// Create a new G.192 frame
    pub fn new(data_bits: Vec<u16>, is_good_frame: bool) -> Self {
        let sync_header = if is_good_frame {
            G192_SYNC_GOOD
        } else {
            G192_SYNC_BAD
        };
        let frame_length = data_bits.len() as u16;

        Self {
            sync_header,
            frame_length,
            data_bits,
            is_good_frame,
        }
    }

    /// Erased frame of `num_bits` zero soft bits
    pub fn erased(num_bits: usize) -> Self {
        Self::new(vec![G192_ZERO; num_bits], false)
    }

    /// Check header consistency and soft-bit values
    pub fn validate(&self) -> Result<()> {
        let expected_sync = if self.is_good_frame {
            G192_SYNC_GOOD
        } else {
            G192_SYNC_BAD
        };
        if self.sync_header != expected_sync {
            return Err(AvqError::invalid_frame(format!(
                "sync word 0x{:04X}, expected 0x{:04X}",
                self.sync_header, expected_sync
            )));
        }
        if self.frame_length as usize != self.data_bits.len() {
            return Err(AvqError::invalid_frame(format!(
                "header announces {} bits, frame carries {}",
                self.frame_length,
                self.data_bits.len()
            )));
        }
        validate_soft_bits(&self.data_bits)
    }

    /// Serialize as little-endian 16-bit words: sync, length, soft bits
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(2 * (2 + self.data_bits.len()));
        buf.put_u16_le(self.sync_header);
        buf.put_u16_le(self.frame_length);
        for &word in &self.data_bits {
            buf.put_u16_le(word);
        }
        buf.freeze()
    }

    /// Parse one frame from the front of `buf`, advancing past it
    pub fn from_bytes(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < 4 {
            return Err(AvqError::BufferTooSmall {
                needed: 2,
                actual: buf.remaining() / 2,
            });
        }
        let sync_header = buf.get_u16_le();
        let frame_length = buf.get_u16_le();

        let is_good_frame = match sync_header {
            G192_SYNC_GOOD => true,
            G192_SYNC_BAD => false,
            other => {
                return Err(AvqError::invalid_frame(format!(
                    "unknown sync word 0x{other:04X}"
                )))
            }
        };

        let needed = frame_length as usize;
        if buf.remaining() < 2 * needed {
            return Err(AvqError::BufferTooSmall {
                needed,
                actual: buf.remaining() / 2,
            });
        }
        let data_bits: Vec<u16> = (0..needed).map(|_| buf.get_u16_le()).collect();

        let frame = Self {
            sync_header,
            frame_length,
            data_bits,
            is_good_frame,
        };
        frame.validate()?;
        Ok(frame)
    }
}

/// Convert hard bits (0/1) to G.192 soft bits
pub fn hard_bits_to_g192(bits: &[u8]) -> Vec<u16> {
    bits.iter().map(|&b| soft_bit(b != 0)).collect()
}

/// Convert G.192 soft bits to hard bits
pub fn g192_to_hard_bits(words: &[u16]) -> Vec<u8> {
    words.iter().map(|&w| (w == G192_ONE) as u8).collect()
}

/// Pack soft bits into bytes, MSB first; the last byte is zero padded
pub fn pack_g192(words: &[u16]) -> Vec<u8> {
    let mut packed = vec![0u8; words.len().div_ceil(8)];
    for (i, &w) in words.iter().enumerate() {
        if w == G192_ONE {
            packed[i / 8] |= 1 << (7 - i % 8);
        }
    }
    packed
}

/// Unpack the first `num_bits` bits of packed bytes into soft bits
pub fn unpack_g192(packed: &[u8], num_bits: usize) -> Result<Vec<u16>> {
    let needed = num_bits.div_ceil(8);
    if packed.len() < needed {
        return Err(AvqError::BufferTooSmall {
            needed,
            actual: packed.len(),
        });
    }
    Ok((0..num_bits)
        .map(|i| soft_bit((packed[i / 8] >> (7 - i % 8)) & 1 == 1))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_bit_conversion() {
        let hard_bits = vec![0, 1, 0, 1, 1, 0];
        let soft_bits = hard_bits_to_g192(&hard_bits);
        let expected = vec![G192_ZERO, G192_ONE, G192_ZERO, G192_ONE, G192_ONE, G192_ZERO];
        assert_eq!(soft_bits, expected);
        assert_eq!(g192_to_hard_bits(&soft_bits), hard_bits);
    }

    #[test]
    fn test_writer_reader_values() {
        let mut writer = SoftBitWriter::new(16);
        writer.write_value(0b1011, 4);
        writer.write_bit(false);
        writer.write_value(0x1F3, 9);
        assert_eq!(writer.bits_written(), 14);

        let words = writer.into_words();
        let mut reader = SoftBitReader::new(&words);
        assert_eq!(reader.read_value(4), Some(0b1011));
        assert_eq!(reader.read_bit(), Some(false));
        assert_eq!(reader.read_value(9), Some(0x1F3));
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.read_bit(), None);
        assert_eq!(reader.read_value(1), None);
    }

    #[test]
    fn test_reader_treats_unknown_words_as_zero() {
        let words = [G192_ONE, 0x1234, 0x0080, G192_ONE];
        let mut reader = SoftBitReader::new(&words);
        assert_eq!(reader.read_value(4), Some(0b1001));
        assert!(validate_soft_bits(&words).is_err());
    }

    #[test]
    fn test_frame_bytes() {
        let frame = G192Frame::new(hard_bits_to_g192(&[1, 0, 1]), true);
        assert!(frame.validate().is_ok());

        let bytes = frame.to_bytes();
        assert_eq!(&bytes[..4], &[0x21, 0x6B, 0x03, 0x00]);
        assert_eq!(&bytes[4..6], &[0x81, 0x00]);

        let mut buf = bytes.clone();
        let parsed = G192Frame::from_bytes(&mut buf).expect("valid frame");
        assert_eq!(parsed, frame);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_frame_errors() {
        let mut frame = G192Frame::new(vec![G192_ZERO; 8], true);
        frame.sync_header = 0x1234;
        assert!(matches!(frame.validate(), Err(AvqError::InvalidFrame { .. })));

        let mut frame = G192Frame::new(vec![G192_ZERO; 8], true);
        frame.data_bits[2] = 0x0042;
        assert_eq!(
            frame.validate(),
            Err(AvqError::InvalidSoftBit {
                position: 2,
                value: 0x0042
            })
        );

        let bytes = G192Frame::new(vec![G192_ZERO; 8], true).to_bytes();
        let mut truncated = bytes.slice(..10);
        assert!(matches!(
            G192Frame::from_bytes(&mut truncated),
            Err(AvqError::BufferTooSmall { .. })
        ));

        let erased = G192Frame::erased(4);
        assert_eq!(erased.sync_header, G192_SYNC_BAD);
        assert!(erased.validate().is_ok());
    }

    #[test]
    fn test_pack_unpack() {
        let words = hard_bits_to_g192(&[1, 0, 1, 1, 0, 0, 0, 1, 1, 1]);
        let packed = pack_g192(&words);
        assert_eq!(packed, vec![0b1011_0001, 0b1100_0000]);
        assert_eq!(unpack_g192(&packed, 10).expect("long enough"), words);
        assert!(unpack_g192(&packed, 17).is_err());
    }
}
