//! Day/night clock derived from wall-clock time.
//!
//! The clock stores two authoritative fields, the start of the current
//! phase and the night flag. Everything else is derived from them plus
//! "now". Recomputation counts how many whole phase lengths have elapsed
//! since the phase started, advances the start by that many lengths, and
//! flips the flag when the count is odd. A clock that was suspended for
//! several phases therefore catches up in one step with the right parity.
//!
//! The derivation is the pure [`advance`] function. [`DayNightClock`] wraps
//! it with the phase length and reports actual flips to the caller.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use village_ledger::BalanceTable;
use village_types::{ClockSnapshot, Phase};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// A phase must last at least one millisecond.
    #[error("phase duration must be non-zero")]
    ZeroPhaseDuration,

    /// Phase duration does not fit in a signed millisecond count.
    #[error("phase duration too large: {0:?}")]
    PhaseDurationTooLarge(Duration),
}

/// A phase change observed by [`DayNightClock::recompute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseFlip {
    /// The phase now in effect.
    pub phase: Phase,
    /// Whole phase lengths that elapsed (odd by construction).
    pub transitions: u64,
}

/// Advance `snapshot` to `now`.
///
/// Returns the updated snapshot and the number of whole phase lengths that
/// elapsed. A `now` earlier than the phase start yields zero transitions.
pub fn advance(
    snapshot: ClockSnapshot,
    now: DateTime<Utc>,
    phase_ms: i64,
) -> (ClockSnapshot, u64) {
    let elapsed_ms = now
        .signed_duration_since(snapshot.phase_started_at)
        .num_milliseconds();
    let transitions = elapsed_ms.checked_div(phase_ms).unwrap_or(0);
    if transitions <= 0 {
        return (snapshot, 0);
    }

    let advanced = transitions
        .checked_mul(phase_ms)
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|delta| snapshot.phase_started_at.checked_add_signed(delta))
        .unwrap_or(now);
    let transitions = transitions.unsigned_abs();
    let flipped = transitions & 1 == 1;

    (
        ClockSnapshot {
            phase_started_at: advanced,
            game_started_at: snapshot.game_started_at,
            is_night: snapshot.is_night ^ flipped,
        },
        transitions,
    )
}

/// Running day/night clock for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayNightClock {
    state: ClockSnapshot,
    phase_ms: i64,
}

impl DayNightClock {
    /// A fresh game clock: day, started at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if `phase_duration` is zero or too large.
    pub fn new(now: DateTime<Utc>, phase_duration: Duration) -> Result<Self, ClockError> {
        Self::from_snapshot(
            ClockSnapshot {
                phase_started_at: now,
                game_started_at: now,
                is_night: false,
            },
            phase_duration,
        )
    }

    /// Restore from a persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if `phase_duration` is zero or too large.
    pub fn from_snapshot(
        state: ClockSnapshot,
        phase_duration: Duration,
    ) -> Result<Self, ClockError> {
        let phase_ms = i64::try_from(phase_duration.as_millis())
            .map_err(|_| ClockError::PhaseDurationTooLarge(phase_duration))?;
        if phase_ms == 0 {
            return Err(ClockError::ZeroPhaseDuration);
        }
        Ok(Self { state, phase_ms })
    }

    /// The persisted fields.
    pub const fn snapshot(&self) -> ClockSnapshot {
        self.state
    }

    /// Whether it is currently night, as of the last recompute.
    pub const fn is_night(&self) -> bool {
        self.state.is_night
    }

    /// Current phase, as of the last recompute.
    pub const fn phase(&self) -> Phase {
        Phase::from_is_night(self.state.is_night)
    }

    /// Catch the clock up to `now`.
    ///
    /// Returns `Some` only when the night flag actually changed. An even
    /// number of elapsed phases advances the start without a flip.
    pub fn recompute(&mut self, now: DateTime<Utc>) -> Option<PhaseFlip> {
        let before = self.state.is_night;
        let (next, transitions) = advance(self.state, now, self.phase_ms);
        self.state = next;
        if transitions > 0 {
            tracing::debug!(transitions, is_night = next.is_night, "phase boundary crossed");
        }
        (next.is_night != before).then(|| PhaseFlip {
            phase: self.phase(),
            transitions,
        })
    }

    /// Whole seconds until the next boundary, rounded up. Display only.
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> u64 {
        let elapsed_ms = now
            .signed_duration_since(self.state.phase_started_at)
            .num_milliseconds()
            .max(0);
        let remaining_ms = self.phase_ms.saturating_sub(elapsed_ms).max(0).unsigned_abs();
        remaining_ms.div_ceil(1000)
    }
}

/// Player-facing text announcing `phase` and its gather bonus.
pub fn phase_message(phase: Phase, balance: &BalanceTable) -> String {
    match phase {
        Phase::Day => format!(
            "Day has come: food gathering +{}",
            balance.day_food_bonus
        ),
        Phase::Night => format!(
            "Night has fallen: gold gathering +{}",
            balance.night_gold_bonus
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PHASE: Duration = Duration::from_secs(300);

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000_i64.saturating_add(secs), 0).unwrap()
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(matches!(
            DayNightClock::new(at(0), Duration::ZERO),
            Err(ClockError::ZeroPhaseDuration)
        ));
    }

    #[test]
    fn no_flip_inside_a_phase() {
        let mut clock = DayNightClock::new(at(0), PHASE).unwrap();
        assert!(clock.recompute(at(299)).is_none());
        assert!(!clock.is_night());
        assert_eq!(clock.snapshot().phase_started_at, at(0));
    }

    #[test]
    fn single_boundary_flips_to_night() {
        let mut clock = DayNightClock::new(at(0), PHASE).unwrap();
        let flip = clock.recompute(at(300)).unwrap();
        assert_eq!(flip.phase, Phase::Night);
        assert_eq!(flip.transitions, 1);
        assert_eq!(clock.snapshot().phase_started_at, at(300));
        // Same instant again: no second flip.
        assert!(clock.recompute(at(300)).is_none());
    }

    #[test]
    fn three_phases_of_catch_up_flip_once() {
        let start = ClockSnapshot {
            phase_started_at: at(0),
            game_started_at: at(0),
            is_night: false,
        };
        let mut clock = DayNightClock::from_snapshot(start, PHASE).unwrap();
        let flip = clock.recompute(at(900)).unwrap();
        assert_eq!(flip.transitions, 3);
        assert!(clock.is_night());
        assert_eq!(clock.snapshot().phase_started_at, at(900));
        assert_eq!(clock.snapshot().game_started_at, at(0));
    }

    #[test]
    fn even_catch_up_advances_without_flip() {
        let mut clock = DayNightClock::new(at(0), PHASE).unwrap();
        assert!(clock.recompute(at(650)).is_none());
        assert!(!clock.is_night());
        assert_eq!(clock.snapshot().phase_started_at, at(600));
    }

    #[test]
    fn clock_running_backwards_changes_nothing() {
        let mut clock = DayNightClock::new(at(100), PHASE).unwrap();
        assert!(clock.recompute(at(0)).is_none());
        assert_eq!(clock.snapshot().phase_started_at, at(100));
    }

    #[test]
    fn seconds_remaining_rounds_up() {
        let clock = DayNightClock::new(at(0), PHASE).unwrap();
        assert_eq!(clock.seconds_remaining(at(0)), 300);
        let half = at(0)
            .checked_add_signed(TimeDelta::milliseconds(100_500))
            .unwrap();
        assert_eq!(clock.seconds_remaining(half), 200);
        assert_eq!(clock.seconds_remaining(at(1000)), 0);
    }

    #[test]
    fn phase_message_names_bonus() {
        let balance = BalanceTable::default();
        assert!(phase_message(Phase::Night, &balance).contains("gold"));
        assert!(phase_message(Phase::Day, &balance).contains("food"));
    }
}
