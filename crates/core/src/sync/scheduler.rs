//! Cadence and sizing constants for the sync core.

/// Delay before a settled resync status decays back to idle.
pub const RESYNC_STATUS_RESET_SECS: u64 = 3;

/// Page size requested from paged endpoints unless the caller overrides it.
pub const DEFAULT_PAGE_SIZE: u32 = 9;
