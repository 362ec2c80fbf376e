//! Core types and process-wide constants

use crate::{Error, Result};

/// Security parameter in bits
pub const SEC_PARAM: usize = 256;

/// Security parameter in bytes (decommitment and seed length)
pub const SEC_BYTES: usize = SEC_PARAM / 8;

/// Length of a transcript digest in bytes
pub const DIGEST_LENGTH_BYTES: usize = 32;

/// Number of base OT lanes, and the bit width of Δ and of every matrix column
pub const KAPPA: usize = 8 * DIGEST_LENGTH_BYTES;

/// Byte width of Δ and of one matrix column
pub const KAPPA_BYTES: usize = KAPPA / 8;

/// Random seed produced by one side of a base OT
pub type Seed = [u8; SEC_BYTES];

/// Transcript digest
pub type Digest = [u8; DIGEST_LENGTH_BYTES];

/// One output of an extended OT
pub type OtValue = [u8; DIGEST_LENGTH_BYTES];

/// Number of bytes needed to pack `bits` bits
pub(crate) fn packed_len(bits: usize) -> usize {
    bits.div_ceil(8)
}

/// Read bit `i` of an LSB-first packed bit string
#[inline]
pub(crate) fn bit(bytes: &[u8], i: usize) -> u8 {
    (bytes[i / 8] >> (i % 8)) & 1
}

/// Choice vector for a single extended OT call
///
/// Bits are packed LSB-first: choice `j` is bit `j % 8` of byte `j / 8`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceBits {
    bytes: Vec<u8>,
    len: usize,
}

impl ChoiceBits {
    /// Create a choice vector of `len` bits from its packed encoding
    ///
    /// Fails if `bytes` is not exactly `ceil(len / 8)` long, or if any
    /// padding bit past `len` is set.
    pub fn new(bytes: Vec<u8>, len: usize) -> Result<Self> {
        let expected = packed_len(len);
        if bytes.len() != expected {
            return Err(Error::MalformedInput(format!(
                "choice bits: expected {} bytes for {} choices, got {}",
                expected,
                len,
                bytes.len()
            )));
        }
        if len % 8 != 0 {
            let last = bytes[expected - 1];
            if last >> (len % 8) != 0 {
                return Err(Error::MalformedInput(
                    "choice bits: padding bits are set".into(),
                ));
            }
        }
        Ok(Self { bytes, len })
    }

    /// Use every bit of `bytes` as a choice
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let len = 8 * bytes.len();
        Self { bytes, len }
    }

    /// Pack a slice of booleans
    pub fn from_bools(choices: &[bool]) -> Self {
        let mut bytes = vec![0u8; packed_len(choices.len())];
        for (j, &c) in choices.iter().enumerate() {
            bytes[j / 8] |= (c as u8) << (j % 8);
        }
        Self {
            bytes,
            len: choices.len(),
        }
    }

    /// Number of choices
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no choices
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Choice `j`
    pub fn get(&self, j: usize) -> bool {
        j < self.len && bit(&self.bytes, j) == 1
    }

    /// Packed encoding
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
