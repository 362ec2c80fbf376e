//! Oblivious transfer extension
//!
//! - `base`: boundary to the one-time base OT
//! - `correlated`: persistent per-pair setup derived from the base OT
//! - `extended`: per-session extension of the setup into many OTs

pub mod base;
pub mod correlated;
pub mod extended;
#[cfg(any(test, feature = "ideal"))]
pub mod ideal;
pub(crate) mod matrix;

pub use base::{BaseOtReceiverSeeds, BaseOtSenderSeeds};
pub use correlated::{CorreOtReceiveSetup, CorreOtSendSetup};
pub use extended::{
    extended_ot_receive, extended_ot_send, ExtendedOtReceiveResult, ExtendedOtSendResult,
    ExtensionMessage,
};
