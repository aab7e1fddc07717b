//! Error handling for the AVQ library
//!
//! The quantizer core itself has no recoverable failures: budget overflow
//! degrades to the zero codebook and malformed bitstreams decode to zeros.
//! The errors below are raised by the validating facade when a caller hands
//! in a configuration or buffer that breaks the core's contract.

#![allow(missing_docs)]

use thiserror::Error;

/// Result type alias for AVQ operations
pub type Result<T> = std::result::Result<T, AvqError>;

/// Error type for AVQ operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvqError {
    /// Invalid codec configuration
    #[error("Invalid AVQ configuration: {details}")]
    InvalidConfig { details: String },

    /// Sub-vector count outside 1..=4
    #[error("Invalid sub-vector count: {nsv} (supported: 1-4)")]
    InvalidSubvectorCount { nsv: usize },

    /// Bit budget outside the representable range
    #[error("Invalid bit budget: {bits} bits (range: 1-{max})")]
    InvalidBitBudget { bits: usize, max: usize },

    /// Input slice length does not match the group size
    #[error("Invalid input length: expected {expected}, got {actual}")]
    InvalidInputLength { expected: usize, actual: usize },

    /// A serial word is neither G.192 zero nor G.192 one
    #[error("Invalid G.192 soft bit 0x{value:04X} at position {position}")]
    InvalidSoftBit { position: usize, value: u16 },

    /// G.192 frame header or length is inconsistent
    #[error("Invalid G.192 frame: {details}")]
    InvalidFrame { details: String },

    /// Buffer too small for operation
    #[error("Buffer too small: need {needed} words, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },
}

impl AvqError {
    /// Create a new invalid configuration error
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            details: details.into(),
        }
    }

    /// Create a new invalid frame error
    pub fn invalid_frame(details: impl Into<String>) -> Self {
        Self::InvalidFrame {
            details: details.into(),
        }
    }

    /// Create a new input length error
    pub fn invalid_input_length(expected: usize, actual: usize) -> Self {
        Self::InvalidInputLength { expected, actual }
    }

    /// Check if the error stems from caller configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::InvalidSubvectorCount { .. }
                | Self::InvalidBitBudget { .. }
        )
    }

    /// Check if the error stems from bitstream content
    pub fn is_bitstream_error(&self) -> bool {
        matches!(self, Self::InvalidSoftBit { .. } | Self::InvalidFrame { .. })
    }
}
