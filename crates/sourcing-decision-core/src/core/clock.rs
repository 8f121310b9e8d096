// crates/sourcing-decision-core/src/core/clock.rs
// ============================================================================
// Module: Sourcing Decision Time Sources
// Description: Injectable clock used to timestamp gate evaluations.
// Purpose: Keep audit timestamps replaceable so tests and replays stay deterministic.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Traversal itself is a pure function of the context and never reads time.
//! Only the gate manager stamps evaluation records, and it does so through a
//! [`Clock`] the host supplies. [`SystemClock`] reads UTC wall-clock time;
//! [`FixedClock`] returns a constant and is intended for tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of evaluation timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Clock backed by UTC wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    /// Instant returned by every call.
    instant: OffsetDateTime,
}

impl FixedClock {
    /// Creates a clock pinned to `instant`.
    #[must_use]
    pub const fn new(instant: OffsetDateTime) -> Self {
        Self {
            instant,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.instant
    }
}
