//! Domain-separated transcript hashing
//!
//! A [`Transcript`] is an absorbing BLAKE3 state. Every value written into it
//! carries the static domain tag of its type plus length prefixes, so values
//! of different kinds, or different splits of the same bytes, never collide.
//!
//! Transcripts are plain values: clone one to fork independent challenges
//! from a shared prefix.

mod commit;

pub use commit::{Commitment, Decommitment};

use crate::types::{Digest, DIGEST_LENGTH_BYTES};
use crate::{Error, Result};

/// BLAKE3 derive-key context for every transcript
const TRANSCRIPT_CONTEXT: &str = "tss-ot-core 2024-03-01 transcript v1";

/// A value with a canonical byte encoding and a static domain tag
pub trait Absorb {
    /// Domain tag separating this kind of value from every other kind
    const DOMAIN: &'static str;

    /// Append the canonical encoding of `self` to `out`
    fn encode(&self, out: &mut Vec<u8>);
}

/// Object-safe view of [`Absorb`], for lists of mixed values
pub trait DynAbsorb {
    /// Domain tag of the underlying type
    fn domain(&self) -> &'static str;

    /// Append the canonical encoding to `out`
    fn encode_into(&self, out: &mut Vec<u8>);
}

impl<T: Absorb + ?Sized> DynAbsorb for T {
    fn domain(&self) -> &'static str {
        T::DOMAIN
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        self.encode(out)
    }
}

impl<T: Absorb + ?Sized> Absorb for &T {
    const DOMAIN: &'static str = T::DOMAIN;

    fn encode(&self, out: &mut Vec<u8>) {
        (**self).encode(out)
    }
}

impl Absorb for [u8] {
    const DOMAIN: &'static str = "Bytes";

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

impl<const N: usize> Absorb for [u8; N] {
    const DOMAIN: &'static str = "Bytes";

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

impl Absorb for Vec<u8> {
    const DOMAIN: &'static str = "Bytes";

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

impl Absorb for str {
    const DOMAIN: &'static str = "String";

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl Absorb for String {
    const DOMAIN: &'static str = "String";

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl Absorb for u64 {
    const DOMAIN: &'static str = "Integer";

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl Absorb for u32 {
    const DOMAIN: &'static str = "Integer";

    fn encode(&self, out: &mut Vec<u8>) {
        (*self as u64).encode(out)
    }
}

impl Absorb for usize {
    const DOMAIN: &'static str = "Integer";

    fn encode(&self, out: &mut Vec<u8>) {
        (*self as u64).encode(out)
    }
}

impl Absorb for bool {
    const DOMAIN: &'static str = "Bool";

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(*self as u8);
    }
}

/// Absorbing hash state used as random oracle and commitment hash
#[derive(Clone)]
pub struct Transcript {
    hasher: blake3::Hasher,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new_derive_key(TRANSCRIPT_CONTEXT),
        }
    }

    /// Absorb a value
    pub fn absorb<T: Absorb + ?Sized>(&mut self, value: &T) -> &mut Self {
        let mut payload = Vec::new();
        value.encode(&mut payload);
        self.write(T::DOMAIN, &payload)
    }

    /// Absorb a type-erased value
    pub fn absorb_dyn(&mut self, value: &dyn DynAbsorb) -> &mut Self {
        let mut payload = Vec::new();
        value.encode_into(&mut payload);
        self.write(value.domain(), &payload)
    }

    /// Written as `len(domain) || domain || len(payload) || payload`, lengths
    /// as little-endian u64.
    fn write(&mut self, domain: &str, payload: &[u8]) -> &mut Self {
        self.hasher.update(&(domain.len() as u64).to_le_bytes());
        self.hasher.update(domain.as_bytes());
        self.hasher.update(&(payload.len() as u64).to_le_bytes());
        self.hasher.update(payload);
        self
    }

    /// Clone the transcript and absorb `label` into the copy
    pub fn fork(&self, label: &str) -> Self {
        let mut forked = self.clone();
        forked.absorb(label);
        forked
    }

    /// Digest of everything absorbed so far
    ///
    /// Leaves the transcript untouched, so absorbing can continue.
    pub fn digest(&self) -> Digest {
        let mut out = [0u8; DIGEST_LENGTH_BYTES];
        self.hasher.finalize_xof().fill(&mut out);
        out
    }

    /// Extendable output stream of the current state
    pub(crate) fn output_reader(&self) -> blake3::OutputReader {
        self.hasher.finalize_xof()
    }

    /// Sample an integer uniformly from `[0, bound)`
    ///
    /// `bound` and the result are big-endian; the result has the length of
    /// `bound` with leading zero bytes stripped. Candidates are drawn from the
    /// transcript output and rejected until one falls below `bound`, so equal
    /// transcripts always produce the same value.
    pub fn sample_below(&self, bound: &[u8]) -> Result<Vec<u8>> {
        let start = bound.iter().position(|&b| b != 0).ok_or_else(|| {
            Error::MalformedInput("sample bound must be non-zero".into())
        })?;
        let bound = &bound[start..];
        let mask = u8::MAX >> bound[0].leading_zeros();

        let mut reader = self.fork("rejection sampling").output_reader();
        let mut candidate = vec![0u8; bound.len()];
        loop {
            reader.fill(&mut candidate);
            candidate[0] &= mask;
            if candidate.as_slice() < bound {
                return Ok(candidate);
            }
        }
    }

    /// Sample a `u64` uniformly from `[0, bound)`
    pub fn sample_u64_below(&self, bound: u64) -> Result<u64> {
        let sampled = self.sample_below(&bound.to_be_bytes())?;
        let mut buf = [0u8; 8];
        buf[8 - sampled.len()..].copy_from_slice(&sampled);
        Ok(u64::from_be_bytes(buf))
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
