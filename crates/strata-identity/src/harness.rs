// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Roll-forward verification harness
//!
//! Bring-up check for new boards: read the key, roll forward, read again
//! and confirm the platform now returns something different. Must run in
//! place of a build, never after one, since it consumes the single
//! trusted read of this boot.

use strata_common::constants::HARDWARE_SECRET_SIZE;
use strata_common::{log_error, log_info};
use strata_common::{Error, LogSink, Result};
use strata_hal::SecretSource;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::acquisition::check_security_state;
use crate::hider::{hide_secret, HideOutcome};

const MODULE: &str = "harness";

/// What the harness observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollForwardReport {
    /// Outcome of the roll-forward
    pub outcome: HideOutcome,
    /// Whether the key could be read again after roll-forward
    pub reread: bool,
    /// Whether the readable key changed
    pub key_changed: bool,
}

impl RollForwardReport {
    /// Whether the platform hid its secret as expected
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.outcome, HideOutcome::Hidden) && (!self.reread || self.key_changed)
    }
}

/// Read, roll forward, re-read and compare
///
/// Both key copies are zeroized before returning. Neither is logged.
///
/// # Errors
///
/// - `HardwareUnavailable` if the state does not permit the first read
/// - `SecretReadFailure` if the first read fails
/// - `SecretHideFailure` if the roll-forward fails
pub fn verify_roll_forward<S, L>(source: &mut S, log: &mut L) -> Result<RollForwardReport>
where
    S: SecretSource + ?Sized,
    L: LogSink + ?Sized,
{
    let state = check_security_state(source);
    if !state.permits_secret_read() {
        log_error!(log, MODULE, "cannot read key in {} state", state);
        return Err(Error::HardwareUnavailable);
    }

    let mut before = [0u8; HARDWARE_SECRET_SIZE];
    let mut after = [0u8; HARDWARE_SECRET_SIZE];
    let result = compare_across_roll_forward(source, log, &mut before, &mut after);
    before.zeroize();
    after.zeroize();
    result
}

fn compare_across_roll_forward<S, L>(
    source: &mut S,
    log: &mut L,
    before: &mut [u8; HARDWARE_SECRET_SIZE],
    after: &mut [u8; HARDWARE_SECRET_SIZE],
) -> Result<RollForwardReport>
where
    S: SecretSource + ?Sized,
    L: LogSink + ?Sized,
{
    if let Err(e) = source.read_secret(before) {
        log_error!(log, MODULE, "initial key read failed: {}", e);
        // Hide even though the read failed.
        let _ = hide_secret(source);
        return Err(Error::SecretReadFailure);
    }

    let outcome = hide_secret(source)?;
    log_info!(log, MODULE, "roll-forward complete, state {}", check_security_state(source));

    let reread = match source.read_secret(after) {
        Ok(()) => true,
        Err(e) => {
            log_info!(log, MODULE, "key unreadable after roll-forward: {}", e);
            false
        }
    };
    let key_changed = reread && !bool::from(before[..].ct_eq(&after[..]));

    let report = RollForwardReport {
        outcome,
        reread,
        key_changed,
    };
    if report.passed() {
        log_info!(log, MODULE, "roll-forward verified");
    } else {
        log_error!(log, MODULE, "key still readable after roll-forward");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::{LogBuffer, LogLevel, SecurityState};
    use strata_hal::sim::SimulatedPlatform;

    #[test]
    fn test_sim_platform_passes() {
        let mut platform = SimulatedPlatform::trusted([0x42; 32]);
        let mut log = LogBuffer::new();
        let report = verify_roll_forward(&mut platform, &mut log).unwrap();
        assert!(report.passed());
        assert!(report.reread);
        assert!(report.key_changed);
        assert_eq!(platform.reads(), 2);
        assert!(log.contains(LogLevel::Info, "roll-forward verified"));
    }

    #[test]
    fn test_refuses_after_hide() {
        let mut platform = SimulatedPlatform::new(SecurityState::Normal, [0x42; 32]);
        let mut log = LogBuffer::new();
        assert_eq!(
            verify_roll_forward(&mut platform, &mut log),
            Err(Error::HardwareUnavailable)
        );
        assert_eq!(platform.reads(), 0);
    }

    #[test]
    fn test_failed_read_still_hides() {
        let mut platform = SimulatedPlatform::trusted([0x42; 32]).failing_reads();
        let mut log = LogBuffer::new();
        assert_eq!(
            verify_roll_forward(&mut platform, &mut log),
            Err(Error::SecretReadFailure)
        );
        assert!(platform.is_hidden());
    }
}
