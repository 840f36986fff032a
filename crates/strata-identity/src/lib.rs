// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Strata Identity
//!
//! Everything that touches the hardware-unique secret:
//!
//! - **Acquisition**: one policy-gated read of the secret (`acquisition`)
//! - **Hiding**: the one-way roll-forward, scoped so it always runs (`hider`)
//! - **CDI**: `SHA256(secret)` and its measurement extension (`cdi`)
//! - **Identity seed**: the tagged record handed to later stages (`seed`)
//! - **Harness**: bring-up check that roll-forward really hides the key (`harness`)
//!
//! # Lifecycle
//!
//! ```text
//! ┌──────────┐  read   ┌──────────────┐  hash  ┌─────┐
//! │ Trusted/ │ ──────▶ │HardwareSecret│ ─────▶ │ CDI │ ──▶ key pairs
//! │ Secure   │         └──────┬───────┘        └─────┘
//! └────┬─────┘                │ scrub
//!      │ roll-forward         ▼
//!      ▼                   zeroed
//! ┌──────────┐
//! │  Normal  │  secret unreadable until power-on reset
//! └──────────┘
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod acquisition;
pub mod cdi;
pub mod harness;
pub mod hider;
pub mod seed;

pub use acquisition::{
    check_security_state, read_secret, HardwareSecret, SecretProvenance,
    TEST_PLACEHOLDER_SECRET,
};
pub use cdi::{derive_cdi, extend_cdi, Cdi, ExtendedCdi};
pub use harness::{verify_roll_forward, RollForwardReport};
pub use hider::{hide_secret, HideGuard, HideOutcome};
pub use seed::{provision_identity_seed, IdentitySeed, IDENTITY_SEED_SIZE};
