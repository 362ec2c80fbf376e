//! # TSS OT Core
//!
//! Correlated oblivious transfer extension for threshold signing protocols.
//!
//! This crate provides:
//! - Domain-separated transcript hashing and hash commitments
//! - A correlated OT setup derived once per party pair from base OT seeds
//! - Extended OT, turning that setup into any number of OTs per session
//! - A worker pool for the lane and column parallel parts of the above
//!
//! ## Example
//!
//! ```rust,ignore
//! use tss_ot_core::oblivious::{extended_ot_receive, extended_ot_send, ideal};
//! use tss_ot_core::{ChoiceBits, Pool, Transcript};
//!
//! let pool = Pool::new(0)?;
//! let (send_setup, receive_setup) = ideal::correlated_setup(&pool, &Transcript::new(), &mut rng)?;
//!
//! let mut session = Transcript::new();
//! session.absorb("session").absorb(&session_id);
//!
//! let choices = ChoiceBits::from_bytes(choice_bytes);
//! let (message, received) =
//!     extended_ot_receive(&pool, &session, &receive_setup, &choices, &mut rng)?;
//! let sent = extended_ot_send(&pool, &session, &send_setup, choices.len(), &message)?;
//! ```

pub mod error;
pub mod hash;
pub mod oblivious;
pub mod pool;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use hash::{Absorb, Commitment, Decommitment, DynAbsorb, Transcript};
pub use pool::{Pool, PoolConfig};
pub use types::{
    ChoiceBits, Digest, OtValue, Seed, DIGEST_LENGTH_BYTES, KAPPA, KAPPA_BYTES, SEC_BYTES,
    SEC_PARAM,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
