//! Scripts for summarizing and verifying Foundry deployment broadcasts.
//!
//! `gen-deploy` condenses a broadcast into a deployment summary keyed by logical
//! contract name, and `verify` submits every contract the broadcast created to a
//! block explorer for source verification.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
pub mod constants;
pub mod errors;
pub mod summary;
pub mod types;
pub mod utils;
pub mod verify;
