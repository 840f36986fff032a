// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Identity hiding (roll-forward)
//!
//! [`hide_secret`] performs the one-way transition to `Normal`.
//! [`HideGuard`] owns the borrow of the secret source for the duration of
//! a build and hides the secret exactly once, either when the caller
//! calls [`HideGuard::finish`] or, on early return, when it is dropped.

use strata_common::{Error, Result};
use strata_hal::{RollForward, SecretSource};

/// Result of a hide request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideOutcome {
    /// The secret was hidden by this call
    Hidden,
    /// The secret was already hidden; nothing changed
    AlreadyHidden,
}

/// Perform the one-way transition to `Normal`
///
/// Hiding an already hidden secret is not an error.
///
/// # Errors
///
/// `SecretHideFailure` if the platform could not complete the transition.
pub fn hide_secret<S: SecretSource + ?Sized>(source: &mut S) -> Result<HideOutcome> {
    match source.roll_forward() {
        Ok(RollForward::Performed) => Ok(HideOutcome::Hidden),
        Ok(RollForward::AlreadyNormal) => Ok(HideOutcome::AlreadyHidden),
        Err(_) => Err(Error::SecretHideFailure),
    }
}

/// Scoped hide: the secret is hidden exactly once when the guard ends
pub struct HideGuard<'p, S: SecretSource + ?Sized> {
    source: &'p mut S,
    outcome: Option<Result<HideOutcome>>,
}

impl<'p, S: SecretSource + ?Sized> HideGuard<'p, S> {
    /// Take the secret source for the duration of the guard
    pub fn new(source: &'p mut S) -> Self {
        Self {
            source,
            outcome: None,
        }
    }

    /// Access the guarded source
    pub fn source(&mut self) -> &mut S {
        &mut *self.source
    }

    /// Hide now and return the outcome
    ///
    /// # Errors
    ///
    /// `SecretHideFailure` if the transition failed.
    pub fn finish(mut self) -> Result<HideOutcome> {
        self.hide_once()
    }

    fn hide_once(&mut self) -> Result<HideOutcome> {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let outcome = hide_secret(&mut *self.source);
        self.outcome = Some(outcome);
        outcome
    }
}

impl<S: SecretSource + ?Sized> Drop for HideGuard<'_, S> {
    fn drop(&mut self) {
        let _ = self.hide_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_common::SecurityState;
    use strata_hal::sim::SimulatedPlatform;

    #[test]
    fn test_hide_is_idempotent() {
        let mut platform = SimulatedPlatform::trusted([1; 32]);
        assert_eq!(hide_secret(&mut platform), Ok(HideOutcome::Hidden));
        assert_eq!(hide_secret(&mut platform), Ok(HideOutcome::AlreadyHidden));
        assert_eq!(platform.transitions(), 1);
        assert_eq!(platform.security_state(), SecurityState::Normal);
    }

    #[test]
    fn test_guard_hides_on_drop() {
        let mut platform = SimulatedPlatform::trusted([1; 32]);
        {
            let _guard = HideGuard::new(&mut platform);
        }
        assert!(platform.is_hidden());
        assert_eq!(platform.roll_forward_calls(), 1);
    }

    #[test]
    fn test_finish_hides_exactly_once() {
        let mut platform = SimulatedPlatform::trusted([1; 32]);
        let guard = HideGuard::new(&mut platform);
        assert_eq!(guard.finish(), Ok(HideOutcome::Hidden));
        assert_eq!(platform.roll_forward_calls(), 1);
    }

    #[test]
    fn test_hide_failure_reported() {
        let mut platform = SimulatedPlatform::trusted([1; 32]).failing_roll_forward();
        let guard = HideGuard::new(&mut platform);
        assert_eq!(guard.finish(), Err(Error::SecretHideFailure));
        assert_eq!(platform.roll_forward_calls(), 1);
    }
}
