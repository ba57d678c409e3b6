#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod asynch;
pub mod command;
pub mod config;
pub mod dma;
pub mod engine;
pub mod error;
pub mod hex;
pub mod ingress;
pub mod parser;
pub mod registration;
pub mod socket;

#[cfg(test)]
mod test_helpers;

pub use asynch::{new, Control, Runner, State};
pub use engine::{Engine, Event};
pub use error::Error;
pub use socket::ConnId;
