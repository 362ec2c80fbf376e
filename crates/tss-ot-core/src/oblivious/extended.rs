//! Extended OT
//!
//! IKNP extension with the KOS15 consistency check, made non-interactive by
//! deriving the check weights from the transcript. One call of
//! [`extended_ot_receive`] and one of [`extended_ot_send`] produce `n` OTs:
//! the sender learns `V0[j]`, `V1[j]` and the receiver learns
//! `V1[j]` if its choice `j` is set, `V0[j]` otherwise.
//!
//! Both sides must pass transcripts with the same absorbed prefix, and that
//! prefix must be unique to the session. The PRG rows, check weights and
//! outputs are all bound to it, which is what allows one setup to serve any
//! number of sessions.

use super::correlated::{prg, CorreOtReceiveSetup, CorreOtSendSetup};
use super::matrix::{
    clmul, column, select, wide_to_bytes, xor_in_place, xor_wide, Column, Wide, WIDE_BYTES,
};
use crate::hash::{Absorb, Transcript};
use crate::pool::Pool;
use crate::types::{bit, packed_len, ChoiceBits, Digest, OtValue, KAPPA, KAPPA_BYTES};
use crate::{Error, Result};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{debug, instrument, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bytes per matrix row and number of matrix columns for `n` OTs
///
/// A row holds the choices plus `KAPPA` bits of padding that hide them in the
/// check value.
fn matrix_shape(n: usize) -> Result<(usize, usize)> {
    let width = packed_len(n).checked_add(KAPPA_BYTES);
    width
        .and_then(|w| w.checked_mul(8).map(|columns| (w, columns)))
        .ok_or_else(|| Error::MalformedInput(format!("cannot extend {} OTs", n)))
}

/// Message from the receiver to the sender for one extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionMessage {
    /// `u_i = t_i ^ G(k1_i) ^ r` for every lane
    rows: Vec<Vec<u8>>,
    /// Weighted sum of the choice bits
    check_x: Vec<u8>,
    /// Weighted sum of the receiver's columns
    check_t: Vec<u8>,
}

impl ExtensionMessage {
    fn validate(&self, width: usize) -> Result<()> {
        if self.rows.len() != KAPPA {
            return Err(Error::MalformedInput(format!(
                "extension message: expected {} rows, got {}",
                KAPPA,
                self.rows.len()
            )));
        }
        if let Some((i, row)) = self.rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::MalformedInput(format!(
                "extension message: row {} has {} bytes, expected {}",
                i,
                row.len(),
                width
            )));
        }
        if self.check_x.len() != KAPPA_BYTES || self.check_t.len() != WIDE_BYTES {
            return Err(Error::MalformedInput(
                "extension message: malformed check values".into(),
            ));
        }
        Ok(())
    }
}

/// Extension rows as absorbed into the check transcript
struct ExtensionRows<'a>(&'a [Vec<u8>]);

impl Absorb for ExtensionRows<'_> {
    const DOMAIN: &'static str = "OT Extension Rows";

    fn encode(&self, out: &mut Vec<u8>) {
        for row in self.0 {
            out.extend_from_slice(&(row.len() as u64).to_le_bytes());
            out.extend_from_slice(row);
        }
    }
}

/// Matrix column with its index, the input of the correlation-robust hash
struct IndexedColumn<'a> {
    index: usize,
    bits: &'a Column,
}

impl Absorb for IndexedColumn<'_> {
    const DOMAIN: &'static str = "OT Extension Column";

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.index as u64).to_le_bytes());
        out.extend_from_slice(self.bits);
    }
}

fn session_digest(transcript: &Transcript) -> Digest {
    transcript.fork("extended OT rows").digest()
}

/// Correlation-robust hash of column `index`, on a private clone of `base`
fn hash_column(base: &Transcript, index: usize, bits: &Column) -> OtValue {
    let mut h = base.clone();
    h.absorb(&IndexedColumn { index, bits });
    h.digest()
}

/// Check weights, one per column, derived from the transcript and the rows
fn challenges(transcript: &Transcript, rows: &[Vec<u8>], columns: usize) -> Vec<Column> {
    let mut h = transcript.fork("extended OT check");
    h.absorb(&ExtensionRows(rows));
    let mut reader = h.output_reader();
    (0..columns)
        .map(|_| {
            let mut chi = [0u8; KAPPA_BYTES];
            reader.fill(&mut chi);
            chi
        })
        .collect()
}

fn weighted_sum(pool: &Pool, chis: &[Column], cols: &[Column]) -> Wide {
    pool.parallelize(cols.len(), |j| clmul(&chis[j], &cols[j]))
        .iter()
        .fold(Wide::default(), |mut acc, p| {
            xor_wide(&mut acc, p);
            acc
        })
}

/// Sender's outputs of one extension
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ExtendedOtSendResult {
    v0: Vec<OtValue>,
    v1: Vec<OtValue>,
}

impl ExtendedOtSendResult {
    /// Number of OTs
    pub fn len(&self) -> usize {
        self.v0.len()
    }

    /// Whether no OTs were produced
    pub fn is_empty(&self) -> bool {
        self.v0.is_empty()
    }

    /// Values for choice 0
    pub fn v0(&self) -> &[OtValue] {
        &self.v0
    }

    /// Values for choice 1
    pub fn v1(&self) -> &[OtValue] {
        &self.v1
    }
}

/// Receiver's outputs of one extension
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ExtendedOtReceiveResult {
    v_choice: Vec<OtValue>,
}

impl ExtendedOtReceiveResult {
    /// Number of OTs
    pub fn len(&self) -> usize {
        self.v_choice.len()
    }

    /// Whether no OTs were produced
    pub fn is_empty(&self) -> bool {
        self.v_choice.is_empty()
    }

    /// Value selected by each choice bit
    pub fn v_choice(&self) -> &[OtValue] {
        &self.v_choice
    }
}

/// Receiver side of an extended OT
///
/// Returns the message for the sender together with the receiver's outputs.
#[instrument(skip_all, fields(n = choices.len()))]
pub fn extended_ot_receive<R: RngCore + CryptoRng>(
    pool: &Pool,
    transcript: &Transcript,
    setup: &CorreOtReceiveSetup,
    choices: &ChoiceBits,
    rng: &mut R,
) -> Result<(ExtensionMessage, ExtendedOtReceiveResult)> {
    let n = choices.len();
    let (width, columns) = matrix_shape(n)?;

    let mut r = Vec::with_capacity(width);
    r.extend_from_slice(choices.as_bytes());
    r.resize(width, 0);
    rng.try_fill_bytes(&mut r[packed_len(n)..]).map_err(|e| {
        Error::RandomnessFailure(format!("failed to sample choice padding: {}", e))
    })?;

    let session = session_digest(transcript);
    let (mut t_rows, u_rows): (Vec<Vec<u8>>, Vec<Vec<u8>>) = pool
        .parallelize(KAPPA, |i| {
            let [k0, k1] = setup.keys(i);
            let t = prg(k0, &session, width);
            let mut u = prg(k1, &session, width);
            xor_in_place(&mut u, &t);
            xor_in_place(&mut u, &r);
            (t, u)
        })
        .into_iter()
        .unzip();
    debug!(lanes = KAPPA, width, "Expanded receiver rows");

    let mut t_cols = pool.parallelize(columns, |j| column(&t_rows, j));
    t_rows.zeroize();

    let chis = challenges(transcript, &u_rows, columns);
    let check_t = weighted_sum(pool, &chis, &t_cols);
    let mut check_x = [0u8; KAPPA_BYTES];
    for (j, chi) in chis.iter().enumerate() {
        xor_in_place(&mut check_x, &select(bit(&r, j), chi));
    }
    r.zeroize();

    let base = transcript.fork("extended OT output");
    let v_choice = pool.parallelize(n, |j| hash_column(&base, j, &t_cols[j]));
    t_cols.zeroize();

    debug!(columns, outputs = v_choice.len(), "Extended OT receive complete");
    Ok((
        ExtensionMessage {
            rows: u_rows,
            check_x: check_x.to_vec(),
            check_t: wide_to_bytes(&check_t),
        },
        ExtendedOtReceiveResult { v_choice },
    ))
}

/// Sender side of an extended OT
///
/// `n` is the number of OTs the receiver asked for; `message` must have
/// exactly the shape that implies, or this fails with `MalformedInput`
/// before doing any work. A failed consistency check is reported as
/// `VerificationFailed`.
#[instrument(skip_all, fields(n = n))]
pub fn extended_ot_send(
    pool: &Pool,
    transcript: &Transcript,
    setup: &CorreOtSendSetup,
    n: usize,
    message: &ExtensionMessage,
) -> Result<ExtendedOtSendResult> {
    let (width, columns) = matrix_shape(n)?;
    message.validate(width)?;

    let session = session_digest(transcript);
    let mut q_rows = pool.parallelize(KAPPA, |i| {
        let mut q = prg(setup.key(i), &session, width);
        let mask = 0u8.wrapping_sub(setup.delta_bit(i));
        q.iter_mut()
            .zip(&message.rows[i])
            .for_each(|(q, u)| *q ^= u & mask);
        q
    });
    debug!(lanes = KAPPA, width, "Expanded sender rows");

    // q_j = t_j ^ r_j * Δ
    let mut q_cols = pool.parallelize(columns, |j| column(&q_rows, j));
    q_rows.zeroize();

    let chis = challenges(transcript, &message.rows, columns);
    let check_q = wide_to_bytes(&weighted_sum(pool, &chis, &q_cols));

    let mut check_x = [0u8; KAPPA_BYTES];
    check_x.copy_from_slice(&message.check_x);
    let mut expected = wide_to_bytes(&clmul(&check_x, setup.delta()));
    xor_in_place(&mut expected, &message.check_t);

    if !bool::from(check_q.ct_eq(&expected)) {
        q_cols.zeroize();
        warn!(columns, "Extended OT consistency check failed");
        return Err(Error::VerificationFailed(
            "extended OT consistency check".into(),
        ));
    }

    let base = transcript.fork("extended OT output");
    let (v0, v1): (Vec<OtValue>, Vec<OtValue>) = pool
        .parallelize(n, |j| {
            let mut flipped = q_cols[j];
            xor_in_place(&mut flipped, setup.delta());
            (
                hash_column(&base, j, &q_cols[j]),
                hash_column(&base, j, &flipped),
            )
        })
        .into_iter()
        .unzip();
    q_cols.zeroize();

    debug!(columns, outputs = v0.len(), "Extended OT send complete");
    Ok(ExtendedOtSendResult { v0, v1 })
}
