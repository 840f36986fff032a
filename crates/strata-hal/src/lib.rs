// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hardware Abstraction Layer for Qbitel Strata
//!
//! The attestation pipeline needs very little from the platform: a
//! hardware-unique secret that can be hidden with a one-way transition,
//! and a random number generator.
//!
//! # Architecture
//!
//! 1. **Traits**: Platform-agnostic interfaces (`traits` module)
//! 2. **Drivers**: the CAAM/SNVS secret source (`caam` module)
//! 3. **Simulation**: an instrumented host platform (`sim` module, `sim` feature)
//!
//! # Security
//!
//! - Implementations never gate reads themselves; callers check the
//!   security state through one shared predicate
//! - Roll-forward is one-way until the next power-on reset

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod caam;
pub mod error;
pub mod traits;

#[cfg(feature = "sim")]
pub mod sim;

// Re-export main traits
pub use error::{HalError, HalResult};
pub use traits::*;
