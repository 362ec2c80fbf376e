//! Hash-based commitments
//!
//! `commitment = H(transcript || values || decommitment)` with a fresh random
//! decommitment of `SEC_BYTES` bytes.

use super::{Absorb, DynAbsorb, Transcript};
use crate::types::{DIGEST_LENGTH_BYTES, SEC_BYTES};
use crate::{Error, Result};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Binding, hiding commitment to a list of values
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Commitment([u8; DIGEST_LENGTH_BYTES]);

/// Opening for a [`Commitment`]
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Decommitment([u8; SEC_BYTES]);

fn parse_nonzero<const N: usize>(bytes: &[u8], what: &str) -> Result<[u8; N]> {
    let array: [u8; N] = bytes.try_into().map_err(|_| {
        Error::MalformedInput(format!(
            "{}: incorrect length (got {}, expected {})",
            what,
            bytes.len(),
            N
        ))
    })?;
    if array.iter().all(|&b| b == 0) {
        return Err(Error::MalformedInput(format!("{} is 0", what)));
    }
    Ok(array)
}

impl TryFrom<&[u8]> for Commitment {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        parse_nonzero(bytes, "commitment").map(Self)
    }
}

impl TryFrom<Vec<u8>> for Commitment {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::try_from(bytes.as_slice())
    }
}

impl From<Commitment> for Vec<u8> {
    fn from(c: Commitment) -> Self {
        c.0.to_vec()
    }
}

impl AsRef<[u8]> for Commitment {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for Commitment {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Commitment {}

impl std::fmt::Debug for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commitment({})", hex::encode(self.0))
    }
}

impl Absorb for Commitment {
    const DOMAIN: &'static str = "Commitment";

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }
}

impl TryFrom<&[u8]> for Decommitment {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        parse_nonzero(bytes, "decommitment").map(Self)
    }
}

impl TryFrom<Vec<u8>> for Decommitment {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::try_from(bytes.as_slice())
    }
}

impl From<Decommitment> for Vec<u8> {
    fn from(d: Decommitment) -> Self {
        d.0.to_vec()
    }
}

impl AsRef<[u8]> for Decommitment {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Decommitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Decommitment(..)")
    }
}

impl Absorb for Decommitment {
    const DOMAIN: &'static str = "Decommitment";

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }
}

impl Transcript {
    /// Commit to `values`
    ///
    /// The commitment is bound to everything already absorbed into this
    /// transcript, which is left unchanged.
    pub fn commit<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        values: &[&dyn DynAbsorb],
    ) -> Result<(Commitment, Decommitment)> {
        let mut bytes = [0u8; SEC_BYTES];
        rng.try_fill_bytes(&mut bytes).map_err(|e| {
            Error::RandomnessFailure(format!("failed to generate decommitment: {}", e))
        })?;
        // A zero decommitment would be rejected on opening.
        if bytes.iter().all(|&b| b == 0) {
            return Err(Error::RandomnessFailure(
                "entropy source returned all-zero decommitment".into(),
            ));
        }

        let decommitment = Decommitment(bytes);
        bytes.zeroize();
        let commitment = Commitment(self.compute_commitment(values, &decommitment));

        debug!(commitment = ?commitment, values = values.len(), "Created commitment");
        Ok((commitment, decommitment))
    }

    /// Check that `commitment` opens to `values` under `decommitment`
    ///
    /// Both byte strings are validated first; on a wrong length or an all-zero
    /// value this returns `false` without hashing. Only pass/fail is reported.
    pub fn decommit(
        &self,
        commitment: impl AsRef<[u8]>,
        decommitment: impl AsRef<[u8]>,
        values: &[&dyn DynAbsorb],
    ) -> bool {
        let Ok(commitment) = Commitment::try_from(commitment.as_ref()) else {
            return false;
        };
        let Ok(decommitment) = Decommitment::try_from(decommitment.as_ref()) else {
            return false;
        };

        let computed = self.compute_commitment(values, &decommitment);
        computed.ct_eq(&commitment.0).into()
    }

    fn compute_commitment(
        &self,
        values: &[&dyn DynAbsorb],
        decommitment: &Decommitment,
    ) -> [u8; DIGEST_LENGTH_BYTES] {
        let mut h = self.clone();
        for value in values {
            h.absorb_dyn(*value);
        }
        h.absorb(decommitment);
        h.digest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::BrokenRng;
    use rand::rngs::OsRng;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn test_commit_decommit_hello() {
        let t = Transcript::new();
        let (c, d) = t.commit(&mut OsRng, &[&"hello"]).unwrap();

        assert_eq!(c.as_ref().len(), DIGEST_LENGTH_BYTES);
        assert_eq!(d.as_ref().len(), SEC_BYTES);
        assert!(t.decommit(&c, &d, &[&"hello"]));
        assert!(!t.decommit(&c, &d, &[&"world"]));
    }

    #[test]
    fn test_single_byte_flips_rejected() {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        let t = Transcript::new();
        let value = b"some committed value".to_vec();
        let (c, d) = t.commit(&mut rng, &[&value, &42u64]).unwrap();
        assert!(t.decommit(&c, &d, &[&value, &42u64]));

        for i in 0..DIGEST_LENGTH_BYTES {
            let mut bad = c.as_ref().to_vec();
            bad[i] ^= 0x01;
            assert!(!t.decommit(&bad, &d, &[&value, &42u64]));
        }
        for i in 0..SEC_BYTES {
            let mut bad = d.as_ref().to_vec();
            bad[i] ^= 0x80;
            assert!(!t.decommit(&c, &bad, &[&value, &42u64]));
        }
        for i in 0..value.len() {
            let mut bad = value.clone();
            bad[i] ^= 0x01;
            assert!(!t.decommit(&c, &d, &[&bad, &42u64]));
        }
    }

    #[test]
    fn test_zero_values_rejected() {
        let t = Transcript::new();
        let (c, d) = t.commit(&mut OsRng, &[&"hello"]).unwrap();

        assert!(!t.decommit(&c, [0u8; SEC_BYTES], &[&"hello"]));
        assert!(!t.decommit([0u8; DIGEST_LENGTH_BYTES], &d, &[&"hello"]));
    }

    #[test]
    fn test_zero_decommitment_rejected_even_if_commitment_matches() {
        let t = Transcript::new();
        let zero = [0u8; SEC_BYTES];

        let mut h = t.clone();
        h.absorb("hello");
        h.absorb(&Decommitment(zero));
        let forged = h.digest();
        assert_ne!(forged, [0u8; DIGEST_LENGTH_BYTES]);
        assert!(!t.decommit(forged, zero, &[&"hello"]));
    }

    #[test]
    fn test_wrong_lengths_rejected() {
        let t = Transcript::new();
        let (c, d) = t.commit(&mut OsRng, &[&"hello"]).unwrap();

        assert!(!t.decommit(&c.as_ref()[1..], &d, &[&"hello"]));
        assert!(!t.decommit(&c, &d.as_ref()[1..], &[&"hello"]));

        let mut long = d.as_ref().to_vec();
        long.push(1);
        assert!(!t.decommit(&c, &long, &[&"hello"]));
    }

    #[test]
    fn test_decommit_idempotent() {
        let t = Transcript::new();
        let (c, d) = t.commit(&mut OsRng, &[&"hello"]).unwrap();
        assert_eq!(
            t.decommit(&c, &d, &[&"hello"]),
            t.decommit(&c, &d, &[&"hello"])
        );
        assert_eq!(
            t.decommit(&c, &d, &[&"world"]),
            t.decommit(&c, &d, &[&"world"])
        );
    }

    #[test]
    fn test_commitment_bound_to_transcript_prefix() {
        let mut t = Transcript::new();
        let (c, d) = t.commit(&mut OsRng, &[&"hello"]).unwrap();
        t.absorb(&1u64);
        assert!(!t.decommit(&c, &d, &[&"hello"]));
    }

    #[test]
    fn test_randomness_failure() {
        let t = Transcript::new();
        let err = t.commit(&mut BrokenRng, &[&"hello"]).unwrap_err();
        assert!(matches!(err, Error::RandomnessFailure(_)));
    }

    #[test]
    fn test_typed_construction_validates() {
        assert!(Commitment::try_from(&[0u8; DIGEST_LENGTH_BYTES][..]).is_err());
        assert!(Commitment::try_from(&[1u8; DIGEST_LENGTH_BYTES - 1][..]).is_err());
        assert!(Commitment::try_from(&[1u8; DIGEST_LENGTH_BYTES][..]).is_ok());
        assert!(Decommitment::try_from(vec![0u8; SEC_BYTES]).is_err());
        assert!(Decommitment::try_from(vec![3u8; SEC_BYTES]).is_ok());
    }

    #[test]
    fn test_serde_goes_through_validation() {
        let t = Transcript::new();
        let (c, _) = t.commit(&mut OsRng, &[&"hello"]).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let back: Commitment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);

        let zero = serde_json::to_string(&vec![0u8; DIGEST_LENGTH_BYTES]).unwrap();
        assert!(serde_json::from_str::<Commitment>(&zero).is_err());
    }
}
