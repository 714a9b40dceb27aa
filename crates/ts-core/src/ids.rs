use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 1-based trial identifier.
///
/// - `u32` keeps rows small
/// - `NonZero` enables `Option<TrialId>` to be pointer-optimized and makes
///   id 0 unrepresentable
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TrialId(NonZeroU32);

impl TrialId {
    /// The id handed to the first trial of a session.
    pub const FIRST: TrialId = TrialId(NonZeroU32::MIN);

    pub fn new(value: u32) -> CoreResult<Self> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(CoreError::InvalidArg { what: "trial id 0" })
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The id that follows this one. Saturates at `u32::MAX`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<u32> for TrialId {
    type Error = CoreError;

    fn try_from(value: u32) -> CoreResult<Self> {
        Self::new(value)
    }
}

impl From<TrialId> for u32 {
    fn from(id: TrialId) -> u32 {
        id.get()
    }
}

impl Default for TrialId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Debug for TrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrialId({})", self.get())
    }
}

impl fmt::Display for TrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Run generation. Bumped whenever the active simulation changes so that
/// timers armed for an older generation can be recognised as stale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn bump(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_ids_start_at_one() {
        assert_eq!(TrialId::FIRST.get(), 1);
        assert_eq!(TrialId::default(), TrialId::FIRST);
        assert_eq!(TrialId::FIRST.next().get(), 2);
    }

    #[test]
    fn zero_is_rejected() {
        assert!(TrialId::new(0).is_err());
        assert!(serde_json::from_str::<TrialId>("0").is_err());
        assert_eq!(serde_json::from_str::<TrialId>("7").unwrap().get(), 7);
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<TrialId>(),
            core::mem::size_of::<Option<TrialId>>()
        );
    }

    #[test]
    fn generation_bump_is_monotonic() {
        let g = Generation::default();
        assert!(g.bump() > g);
        assert_eq!(g.bump().get(), 1);
    }
}
