//! Wire types shared between the SwapIt feed server, the listing service that
//! feeds it, and the clients that read from it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;
