//! Fixed tuning constants for the progression ledger.

/// Width of one level band. The curve is a fixed constant, not
/// configurable state: level N covers `[(N-1) * 1000, N * 1000)` XP.
pub const XP_PER_LEVEL: u64 = 1_000;

/// Levels never drop below 1, including at zero XP.
pub const MIN_LEVEL: u32 = 1;

/// How many quests the board keeps active at once.
pub const DEFAULT_ACTIVE_QUESTS: usize = 3;
