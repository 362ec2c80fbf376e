//! Base OT boundary
//!
//! `KAPPA` independent 1-out-of-2 OTs over random seeds, run once per party
//! pair by a public-key OT protocol outside this crate. These types carry
//! its output into the correlated OT setup, which consumes them.

use crate::types::{packed_len, Seed, KAPPA, KAPPA_BYTES};
use crate::{Error, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Output of the base OT sender: both seeds of every lane
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BaseOtSenderSeeds {
    seeds: Vec<[Seed; 2]>,
}

impl BaseOtSenderSeeds {
    /// Wrap the sender's seed pairs, one per lane
    pub fn new(seeds: Vec<[Seed; 2]>) -> Result<Self> {
        if seeds.len() != KAPPA {
            return Err(Error::MalformedInput(format!(
                "base OT sender: expected {} seed pairs, got {}",
                KAPPA,
                seeds.len()
            )));
        }
        Ok(Self { seeds })
    }

    /// Seed pair of lane `i`
    pub(crate) fn pair(&self, i: usize) -> &[Seed; 2] {
        &self.seeds[i]
    }
}

/// Output of the base OT receiver: its choice bit and chosen seed per lane
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BaseOtReceiverSeeds {
    choices: [u8; KAPPA_BYTES],
    seeds: Vec<Seed>,
}

impl BaseOtReceiverSeeds {
    /// Wrap the receiver's packed choice bits (LSB-first) and chosen seeds
    pub fn new(choices: &[u8], seeds: Vec<Seed>) -> Result<Self> {
        let choices: [u8; KAPPA_BYTES] = choices.try_into().map_err(|_| {
            Error::MalformedInput(format!(
                "base OT receiver: expected {} choice bytes, got {}",
                packed_len(KAPPA),
                choices.len()
            ))
        })?;
        if seeds.len() != KAPPA {
            return Err(Error::MalformedInput(format!(
                "base OT receiver: expected {} seeds, got {}",
                KAPPA,
                seeds.len()
            )));
        }
        Ok(Self { choices, seeds })
    }

    /// Packed choice bits
    pub(crate) fn choices(&self) -> &[u8; KAPPA_BYTES] {
        &self.choices
    }

    /// Chosen seed of lane `i`
    pub(crate) fn seed(&self, i: usize) -> &Seed {
        &self.seeds[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bit;

    #[test]
    fn test_lane_count_enforced() {
        assert!(matches!(
            BaseOtSenderSeeds::new(vec![[[1u8; 32]; 2]; KAPPA - 1]),
            Err(Error::MalformedInput(_))
        ));
        assert!(BaseOtSenderSeeds::new(vec![[[1u8; 32]; 2]; KAPPA]).is_ok());

        assert!(BaseOtReceiverSeeds::new(&[0u8; KAPPA_BYTES], vec![[1u8; 32]; KAPPA + 1]).is_err());
        assert!(BaseOtReceiverSeeds::new(&[0u8; KAPPA_BYTES - 1], vec![[1u8; 32]; KAPPA]).is_err());
        assert!(BaseOtReceiverSeeds::new(&[0u8; KAPPA_BYTES], vec![[1u8; 32]; KAPPA]).is_ok());
    }

    #[test]
    fn test_receiver_choice_bits() {
        let mut choices = [0u8; KAPPA_BYTES];
        choices[1] = 0b0000_0100;
        let seeds = BaseOtReceiverSeeds::new(&choices, vec![[0u8; 32]; KAPPA]).unwrap();
        assert_eq!(bit(seeds.choices(), 10), 1);
        assert_eq!(bit(seeds.choices(), 9), 0);
    }
}
