//! Correlated OT setup
//!
//! Turns base OT seeds into the persistent state of one party pair. The
//! roles are reversed with respect to the base OT: the extension sender was
//! the base OT receiver, and its choice bits become the correlation Δ. For
//! every lane `i` the sender's key equals the receiver's key number `Δ_i`.
//!
//! Both setups are immutable once derived and may be shared across any number
//! of concurrent extensions.

use super::base::{BaseOtReceiverSeeds, BaseOtSenderSeeds};
use super::matrix::Column;
use crate::hash::Transcript;
use crate::pool::Pool;
use crate::types::{bit, Digest, Seed, KAPPA};
use tracing::{debug, instrument};
use zeroize::{Zeroize, ZeroizeOnDrop};

const LANE_KEY_CONTEXT: &str = "tss-ot-core 2024-03-01 correlated OT lane key";

/// PRG key of a single lane
pub(crate) type LaneKey = [u8; blake3::KEY_LEN];

fn lane_key(setup: &Digest, lane: usize, seed: &Seed) -> LaneKey {
    let mut hasher = blake3::Hasher::new_derive_key(LANE_KEY_CONTEXT);
    hasher.update(setup);
    hasher.update(&(lane as u64).to_le_bytes());
    hasher.update(seed);
    *hasher.finalize().as_bytes()
}

/// Expand a lane key into a `len` byte row bound to one session
pub(crate) fn prg(key: &LaneKey, session: &Digest, len: usize) -> Vec<u8> {
    let mut hasher = blake3::Hasher::new_keyed(key);
    hasher.update(b"prg");
    hasher.update(session);
    hasher.update(&(len as u64).to_le_bytes());
    let mut row = vec![0u8; len];
    hasher.finalize_xof().fill(&mut row);
    row
}

fn setup_digest(transcript: &Transcript) -> Digest {
    transcript.fork("correlated OT setup").digest()
}

/// Persistent state of the extension sender
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CorreOtSendSetup {
    delta: Column,
    keys: Vec<LaneKey>,
}

impl CorreOtSendSetup {
    /// Derive the sender setup from the base OT where this party was receiver
    #[instrument(skip_all)]
    pub fn new(pool: &Pool, transcript: &Transcript, base: BaseOtReceiverSeeds) -> Self {
        let setup = setup_digest(transcript);
        let keys = pool.parallelize(KAPPA, |i| lane_key(&setup, i, base.seed(i)));
        let delta = *base.choices();

        debug!(lanes = keys.len(), "Derived correlated OT sender setup");
        Self { delta, keys }
    }

    /// The correlation Δ
    pub(crate) fn delta(&self) -> &Column {
        &self.delta
    }

    /// Bit `i` of Δ
    pub(crate) fn delta_bit(&self, i: usize) -> u8 {
        bit(&self.delta, i)
    }

    /// Key of lane `i`, the receiver's key number `Δ_i`
    pub(crate) fn key(&self, i: usize) -> &LaneKey {
        &self.keys[i]
    }
}

impl std::fmt::Debug for CorreOtSendSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorreOtSendSetup")
            .field("lanes", &self.keys.len())
            .finish_non_exhaustive()
    }
}

/// Persistent state of the extension receiver
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CorreOtReceiveSetup {
    keys: Vec<[LaneKey; 2]>,
}

impl CorreOtReceiveSetup {
    /// Derive the receiver setup from the base OT where this party was sender
    #[instrument(skip_all)]
    pub fn new(pool: &Pool, transcript: &Transcript, base: BaseOtSenderSeeds) -> Self {
        let setup = setup_digest(transcript);
        let keys = pool.parallelize(KAPPA, |i| {
            let [seed0, seed1] = base.pair(i);
            [lane_key(&setup, i, seed0), lane_key(&setup, i, seed1)]
        });

        debug!(lanes = keys.len(), "Derived correlated OT receiver setup");
        Self { keys }
    }

    /// Both keys of lane `i`
    pub(crate) fn keys(&self, i: usize) -> &[LaneKey; 2] {
        &self.keys[i]
    }
}

impl std::fmt::Debug for CorreOtReceiveSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorreOtReceiveSetup")
            .field("lanes", &self.keys.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oblivious::ideal;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_setups_are_shareable() {
        assert_send_sync::<CorreOtSendSetup>();
        assert_send_sync::<CorreOtReceiveSetup>();
    }

    #[test]
    fn test_sender_keys_follow_delta() {
        let pool = Pool::new(0).unwrap();
        let mut rng = ChaCha20Rng::from_seed([5u8; 32]);
        let (send, receive) = ideal::correlated_setup(&pool, &Transcript::new(), &mut rng).unwrap();

        let mut ones = 0;
        for i in 0..KAPPA {
            let d = send.delta_bit(i) as usize;
            ones += d;
            assert_eq!(send.key(i), &receive.keys(i)[d]);
            assert_ne!(send.key(i), &receive.keys(i)[1 - d]);
        }
        assert!(ones > 0 && ones < KAPPA);
    }

    #[test]
    fn test_keys_bound_to_setup_transcript() {
        let pool = Pool::new(2).unwrap();
        let (sender_seeds, receiver_seeds) =
            ideal::base_ot(&mut ChaCha20Rng::from_seed([6u8; 32])).unwrap();
        let (sender_seeds2, receiver_seeds2) =
            ideal::base_ot(&mut ChaCha20Rng::from_seed([6u8; 32])).unwrap();

        let mut other = Transcript::new();
        other.absorb("another relationship");

        let a = CorreOtReceiveSetup::new(&pool, &Transcript::new(), sender_seeds);
        let b = CorreOtReceiveSetup::new(&pool, &other, sender_seeds2);
        assert_ne!(a.keys(0), b.keys(0));

        let c = CorreOtSendSetup::new(&pool, &Transcript::new(), receiver_seeds);
        let d = CorreOtSendSetup::new(&pool, &other, receiver_seeds2);
        assert_eq!(c.delta(), d.delta());
        assert_ne!(c.key(0), d.key(0));
    }

    #[test]
    fn test_prg_depends_on_session_and_length() {
        let key = [9u8; blake3::KEY_LEN];
        let a = prg(&key, &[1u8; 32], 40);
        let b = prg(&key, &[2u8; 32], 40);
        let c = prg(&key, &[1u8; 32], 41);
        assert_eq!(a.len(), 40);
        assert_ne!(a, b);
        assert_ne!(&a[..], &c[..40]);
        assert_eq!(a, prg(&key, &[1u8; 32], 40));
    }
}
