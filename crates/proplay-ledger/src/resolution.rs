//! Outcome of an idempotent state transition.

/// Whether a resolve/complete call changed anything.
///
/// Repeating an approval, rejection or match completion is not an error:
/// the second call reports [`Resolution::NoOp`] and leaves state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The transition ran and balances were adjusted as required.
    Applied,
    /// The record was already in a terminal state.
    NoOp,
}

impl Resolution {
    #[must_use]
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}
