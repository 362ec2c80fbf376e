//! Ideal base OT functionality
//!
//! Samples both sides of `KAPPA` random OTs in one place. Only suitable for
//! tests and local benchmarks, where one process plays both parties.

use super::base::{BaseOtReceiverSeeds, BaseOtSenderSeeds};
use super::correlated::{CorreOtReceiveSetup, CorreOtSendSetup};
use crate::hash::Transcript;
use crate::pool::Pool;
use crate::types::{bit, Seed, KAPPA, KAPPA_BYTES, SEC_BYTES};
use crate::Result;
use rand_core::{CryptoRng, RngCore};
use tracing::debug;
use zeroize::Zeroize;

/// Run `KAPPA` random OTs, returning the sender's and the receiver's output
pub fn base_ot<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<(BaseOtSenderSeeds, BaseOtReceiverSeeds)> {
    let mut choices = [0u8; KAPPA_BYTES];
    rng.try_fill_bytes(&mut choices)?;

    let mut pairs = Vec::with_capacity(KAPPA);
    let mut chosen = Vec::with_capacity(KAPPA);
    for i in 0..KAPPA {
        let mut pair: [Seed; 2] = [[0u8; SEC_BYTES]; 2];
        rng.try_fill_bytes(&mut pair[0])?;
        rng.try_fill_bytes(&mut pair[1])?;
        chosen.push(pair[bit(&choices, i) as usize]);
        pairs.push(pair);
    }

    let receiver = BaseOtReceiverSeeds::new(&choices, chosen)?;
    choices.zeroize();
    let sender = BaseOtSenderSeeds::new(pairs)?;
    Ok((sender, receiver))
}

/// Both correlated OT setups of one party pair, from an ideal base OT
///
/// The base OT receiver becomes the extension sender.
pub fn correlated_setup<R: RngCore + CryptoRng>(
    pool: &Pool,
    transcript: &Transcript,
    rng: &mut R,
) -> Result<(CorreOtSendSetup, CorreOtReceiveSetup)> {
    let (base_sender, base_receiver) = base_ot(rng)?;
    let send = CorreOtSendSetup::new(pool, transcript, base_receiver);
    let receive = CorreOtReceiveSetup::new(pool, transcript, base_sender);

    debug!("Ran ideal correlated OT setup");
    Ok((send, receive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::BrokenRng;
    use crate::Error;
    use rand::rngs::OsRng;

    #[test]
    fn test_receiver_holds_chosen_seeds() {
        let (sender, receiver) = base_ot(&mut OsRng).unwrap();
        for i in 0..KAPPA {
            let c = bit(receiver.choices(), i) as usize;
            assert_eq!(receiver.seed(i), &sender.pair(i)[c]);
            assert_ne!(receiver.seed(i), &sender.pair(i)[1 - c]);
        }
    }

    #[test]
    fn test_broken_rng() {
        assert!(matches!(
            base_ot(&mut BrokenRng),
            Err(Error::RandomnessFailure(_))
        ));
        let pool = Pool::new(1).unwrap();
        assert!(correlated_setup(&pool, &Transcript::new(), &mut BrokenRng).is_err());
    }
}
