// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel Strata Common Library
//!
//! Error definitions, constants, shared types, configuration and logging
//! used by every stage of the Strata attestation pipeline.
//!
//! # Features
//!
//! - `std`: Enable standard library support (disabled by default for embedded)
//! - `defmt`: Enable defmt formatting for embedded debugging
//!
//! # Security
//!
//! No heap allocations are performed; all buffers use fixed-size arrays or
//! heapless collections. Nothing in this crate holds key material.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod constants;
pub mod errors;
pub mod log;
pub mod types;

// Re-export commonly used items
pub use config::{ChainConfig, IdentityConfig, SecurityPolicy, StrataConfig};
pub use errors::{Error, Result};
pub use log::{LogBuffer, LogLevel, LogSink, NullLog};
pub use types::*;
