//! Explicit session context.
//!
//! A [`Session`] is what a login hands back: a snapshot of the active profile plus
//! at most one money movement waiting for PIN confirmation. Handlers receive it
//! as a parameter; there is no process-wide "current user".

use crate::models::UserProfile;

/// A validated money movement waiting for the PIN gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Credit `amount`; `fee` is paid outside the wallet
    TopUp {
        /// Amount credited
        amount: i64,
        /// Fee shown to the user
        fee: i64,
    },
    /// Send `amount` to `recipient`
    Transfer {
        /// Amount debited
        amount: i64,
        /// Display name of the receiving party
        recipient: String,
    },
    /// Cash out `amount`, debiting `amount + fee`
    Withdraw {
        /// Amount paid out
        amount: i64,
        /// Fixed withdrawal fee
        fee: i64,
    },
}

/// Session context for one authenticated user.
#[derive(Debug, Clone)]
pub struct Session {
    profile: UserProfile,
    pending: Option<PendingAction>,
}

impl Session {
    pub(crate) const fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            pending: None,
        }
    }

    /// Profile snapshot as of the last login or committed change.
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Balance of the snapshot; handlers validate against this value.
    #[must_use]
    pub const fn balance(&self) -> i64 {
        self.profile.balance
    }

    /// The action awaiting PIN confirmation, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Discards the pending action without executing it.
    pub fn cancel_pending(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    pub(crate) fn stage(&mut self, action: PendingAction) -> &PendingAction {
        self.pending.insert(action)
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    pub(crate) fn refresh(&mut self, profile: UserProfile) {
        self.profile = profile;
    }
}
